use anyhow::{Context, Result};

use buildtool_lib::environment::BuildEnvironment;
use buildtool_lib::project::ProjectPaths;
use buildtool_lib::settings::ToolSettings;
use buildtool_lib::target::BuildTarget;

use crate::output::{print_info, print_success};

pub fn cmd_switch(project: &ProjectPaths, target: BuildTarget) -> Result<()> {
  let settings = ToolSettings::load(project).context("Failed to load tool settings")?;
  let mut env = BuildEnvironment::load_or_new(project, target, settings.current_build_settings())
    .context("Failed to load build environment")?;

  if env.active_target == target && project.environment_file().exists() {
    print_info(&format!("Active target is already {}", target));
    return Ok(());
  }

  env.active_target = target;
  env.save(project).context("Failed to save build environment")?;
  print_success(&format!("Switched active target to {}", target));
  Ok(())
}
