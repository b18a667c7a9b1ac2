mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use buildtool_lib::project::ProjectPaths;
use buildtool_lib::target::BuildTarget;

use crate::cmd::BuildCommand;
use crate::output::OutputFormat;

/// bt - transactional build configurations for game projects
#[derive(Parser)]
#[command(name = "bt")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Project root (default: $BUILDTOOL_PROJECT or the current directory)
  #[arg(short, long, global = true)]
  project: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build a configuration
  Build {
    /// Configuration name or path to a configuration file
    config: String,

    /// Build number passed as -buildNumber
    #[arg(long)]
    build_number: Option<String>,

    /// Output directory passed as -outputDir
    #[arg(long)]
    output_dir: Option<String>,

    /// Extra build argument (KEY=VALUE, repeatable). Without any build
    /// arguments the local build arguments from the tool settings are used
    #[arg(short = 'a', long = "arg", value_name = "KEY=VALUE", allow_hyphen_values = true)]
    args: Vec<String>,

    /// Builder program, overriding the tool settings
    #[arg(long)]
    builder: Option<String>,

    /// Argument for the builder program (repeatable)
    #[arg(long = "builder-arg", value_name = "ARG", allow_hyphen_values = true)]
    builder_args: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// List build configurations
  List {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Migrate legacy modifiers into processors
  Migrate {
    /// Configuration name or path (default: all configurations)
    config: Option<String>,
  },

  /// Switch the project's active build target
  Switch {
    /// Target to switch to (e.g. ios, android, webgl)
    target: BuildTarget,
  },

  /// Manage encrypted secrets
  Secret {
    #[command(subcommand)]
    action: SecretAction,
  },

  /// Show project and environment information
  Info,
}

#[derive(Subcommand)]
pub enum SecretAction {
  /// Store a secret
  Set { key: String, value: String },
  /// Print a secret
  Get { key: String },
  /// Remove a secret
  Remove { key: String },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let project = match cli.project {
    Some(root) => ProjectPaths::new(dunce::canonicalize(&root).unwrap_or(root)),
    None => ProjectPaths::current(),
  };

  match cli.command {
    Commands::Build {
      config,
      build_number,
      output_dir,
      args,
      builder,
      builder_args,
      output,
    } => cmd::cmd_build(
      &project,
      BuildCommand {
        config,
        build_number,
        output_dir,
        args,
        builder,
        builder_args,
        output,
      },
    ),
    Commands::List { output } => cmd::cmd_list(&project, output),
    Commands::Migrate { config } => cmd::cmd_migrate(&project, config.as_deref()),
    Commands::Switch { target } => cmd::cmd_switch(&project, target),
    Commands::Secret { action } => cmd::cmd_secret(&project, action),
    Commands::Info => cmd::cmd_info(&project),
  }
}
