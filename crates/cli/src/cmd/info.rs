use anyhow::{Context, Result};

use buildtool_lib::environment::BuildEnvironment;
use buildtool_lib::project::ProjectPaths;
use buildtool_lib::settings::ToolSettings;

use crate::output::print_stat;

pub fn cmd_info(project: &ProjectPaths) -> Result<()> {
  let settings = ToolSettings::load(project).context("Failed to load tool settings")?;

  println!("Project:");
  print_stat("Root", &project.root().display().to_string());
  print_stat(
    "Configurations",
    &project.config_dir(&settings.default_config_dir).display().to_string(),
  );
  print_stat("Builder", settings.builder.program.as_deref().unwrap_or("(not configured)"));

  println!();
  println!("Environment:");
  match BuildEnvironment::load(project).context("Failed to load build environment")? {
    Some(env) => {
      let group = env.active_target.group();
      print_stat("Active target", env.active_target.as_str());
      print_stat("Build number", &env.build_number_for(env.active_target));
      print_stat("Identifier", env.application_identifier(group).unwrap_or("(unset)"));
      print_stat("Scenes", &env.scenes.len().to_string());
    }
    None => print_stat("Active target", "(no environment file)"),
  }
  Ok(())
}
