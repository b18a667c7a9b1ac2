//! List command implementation.

use anyhow::{Context, Result};

use buildtool_lib::config::{list_configurations, read_configuration};
use buildtool_lib::project::ProjectPaths;
use buildtool_lib::settings::ToolSettings;

use crate::output::{OutputFormat, print_error, print_info, print_json, print_stat};

pub fn cmd_list(project: &ProjectPaths, output: OutputFormat) -> Result<()> {
  let settings = ToolSettings::load(project).context("Failed to load tool settings")?;
  let dir = project.config_dir(&settings.default_config_dir);
  let paths = list_configurations(&dir).with_context(|| format!("Failed to list {}", dir.display()))?;

  if output.is_json() {
    let mut items = Vec::new();
    for path in &paths {
      let config = read_configuration(path)?;
      items.push(serde_json::json!({
        "name": config.name,
        "target": config.target,
        "path": path,
        "processors": config.processors.iter().map(|p| p.kind()).collect::<Vec<_>>(),
        "pending_migration": config.legacy_modifiers.len(),
      }));
    }
    return print_json(&items);
  }

  if paths.is_empty() {
    print_info(&format!("No configurations in {}", dir.display()));
    return Ok(());
  }

  for path in &paths {
    match read_configuration(path) {
      Ok(config) => {
        println!("{}", config.name);
        print_stat("Target", config.target.as_str());
        print_stat("Processors", &config.processors.len().to_string());
        if !config.legacy_modifiers.is_empty() {
          print_stat("Pending migration", &config.legacy_modifiers.len().to_string());
        }
      }
      Err(e) => print_error(&e.to_string()),
    }
  }
  Ok(())
}
