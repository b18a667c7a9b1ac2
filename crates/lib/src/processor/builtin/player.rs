//! Processors overriding player settings of the target's group.

use std::path::PathBuf;

use tracing::debug;

use crate::processor::{BuildProcessor, ProcessorContext, ProcessorError};

/// Largest texture size the override accepts.
const MAX_TEXTURE_SIZE: u32 = 16384;

pub struct ApplicationIdentifier {
  name: String,
  identifier: String,
  previous: Option<Option<String>>,
}

impl ApplicationIdentifier {
  pub fn new(identifier: impl Into<String>) -> Self {
    let identifier = identifier.into();
    Self {
      name: format!("application_identifier({identifier})"),
      identifier,
      previous: None,
    }
  }
}

impl BuildProcessor for ApplicationIdentifier {
  fn name(&self) -> &str {
    &self.name
  }

  fn kind(&self) -> &'static str {
    "application_identifier"
  }

  fn apply(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    if self.identifier.trim().is_empty() {
      return Err(ProcessorError::Precondition("application identifier is empty".to_string()));
    }
    let group = ctx.target.group();
    let previous = ctx.env.application_identifier(group).map(str::to_string);
    debug!(group = %group, previous = ?previous, identifier = %self.identifier, "setting application identifier");
    ctx.env.set_application_identifier(group, self.identifier.clone());
    self.previous = Some(previous);
    Ok(())
  }

  fn restore(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    let previous = self.previous.take().ok_or(ProcessorError::NotApplied)?;
    let group = ctx.target.group();
    match previous {
      Some(identifier) => ctx.env.set_application_identifier(group, identifier),
      None => {
        ctx.env.player.application_identifiers.remove(&group);
      }
    }
    Ok(())
  }
}

pub struct Icon {
  name: String,
  path: PathBuf,
  previous: Option<Option<PathBuf>>,
}

impl Icon {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    let path = path.into();
    Self {
      name: format!("icon({})", path.display()),
      path,
      previous: None,
    }
  }
}

impl BuildProcessor for Icon {
  fn name(&self) -> &str {
    &self.name
  }

  fn kind(&self) -> &'static str {
    "icon"
  }

  fn apply(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    let resolved = ctx.env.project().resolve(&self.path);
    if !resolved.is_file() {
      return Err(ProcessorError::MissingFile(resolved));
    }
    let group = ctx.target.group();
    let previous = ctx.env.player.icons.insert(group, self.path.clone());
    self.previous = Some(previous);
    Ok(())
  }

  fn restore(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    let previous = self.previous.take().ok_or(ProcessorError::NotApplied)?;
    let group = ctx.target.group();
    match previous {
      Some(path) => {
        ctx.env.player.icons.insert(group, path);
      }
      None => {
        ctx.env.player.icons.remove(&group);
      }
    }
    Ok(())
  }
}

pub struct MaxTextureSize {
  name: String,
  size: u32,
  previous: Option<u32>,
}

impl MaxTextureSize {
  pub fn new(size: u32) -> Self {
    Self {
      name: format!("max_texture_size({size})"),
      size,
      previous: None,
    }
  }
}

impl BuildProcessor for MaxTextureSize {
  fn name(&self) -> &str {
    &self.name
  }

  fn kind(&self) -> &'static str {
    "max_texture_size"
  }

  fn apply(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    if self.size != 0 && (!self.size.is_power_of_two() || self.size > MAX_TEXTURE_SIZE) {
      return Err(ProcessorError::Precondition(format!(
        "texture size {} must be 0 or a power of two up to {MAX_TEXTURE_SIZE}",
        self.size
      )));
    }
    self.previous = Some(ctx.env.player.override_max_texture_size);
    ctx.env.player.override_max_texture_size = self.size;
    Ok(())
  }

  fn restore(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    ctx.env.player.override_max_texture_size = self.previous.take().ok_or(ProcessorError::NotApplied)?;
    Ok(())
  }
}

pub struct ScriptingDefines {
  name: String,
  symbols: Vec<String>,
  previous: Option<Option<Vec<String>>>,
}

impl ScriptingDefines {
  pub fn new(symbols: Vec<String>) -> Self {
    Self {
      name: format!("scripting_defines({})", symbols.join(";")),
      symbols,
      previous: None,
    }
  }
}

impl BuildProcessor for ScriptingDefines {
  fn name(&self) -> &str {
    &self.name
  }

  fn kind(&self) -> &'static str {
    "scripting_defines"
  }

  fn apply(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    if let Some(bad) = self
      .symbols
      .iter()
      .find(|s| s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == ';'))
    {
      return Err(ProcessorError::Precondition(format!("invalid scripting define {bad:?}")));
    }

    let group = ctx.target.group();
    let previous = ctx.env.player.scripting_defines.get(&group).cloned();
    let defines = ctx.env.player.scripting_defines.entry(group).or_default();
    for symbol in &self.symbols {
      if !defines.contains(symbol) {
        defines.push(symbol.clone());
      }
    }
    self.previous = Some(previous);
    Ok(())
  }

  fn restore(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    let previous = self.previous.take().ok_or(ProcessorError::NotApplied)?;
    let group = ctx.target.group();
    match previous {
      Some(defines) => {
        ctx.env.player.scripting_defines.insert(group, defines);
      }
      None => {
        ctx.env.player.scripting_defines.remove(&group);
      }
    }
    Ok(())
  }
}
