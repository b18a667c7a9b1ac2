//! Implementation of the `bt migrate` command.
//!
//! Migration also runs on every `bt build`; this command lets a project
//! convert all of its configurations up front.

use anyhow::{Context, Result};

use buildtool_lib::config::{list_configurations, migrate_and_persist, read_configuration};
use buildtool_lib::project::ProjectPaths;
use buildtool_lib::settings::ToolSettings;

use super::config_path;
use crate::output::{print_info, print_success};

pub fn cmd_migrate(project: &ProjectPaths, config: Option<&str>) -> Result<()> {
  let settings = ToolSettings::load(project).context("Failed to load tool settings")?;
  let paths = match config {
    Some(config) => vec![config_path(project, &settings, config)],
    None => {
      let dir = project.config_dir(&settings.default_config_dir);
      list_configurations(&dir).with_context(|| format!("Failed to list {}", dir.display()))?
    }
  };

  let mut migrated = 0;
  for path in &paths {
    let mut config = read_configuration(path)?;
    if migrate_and_persist(path, &mut config)? {
      print_success(&format!("Migrated {}", config.name));
      migrated += 1;
    }
  }

  if migrated == 0 {
    print_info("Nothing to migrate");
  }
  Ok(())
}
