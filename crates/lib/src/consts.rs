/// Argument overriding the build number for a single build.
pub const BUILD_NUMBER_ARG: &str = "-buildNumber";
/// Argument overriding the directory the build output is placed in.
pub const OUTPUT_DIR_ARG: &str = "-outputDir";

pub const PROJECT_SETTINGS_DIR: &str = "ProjectSettings";
pub const SETTINGS_FILENAME: &str = "BuildToolSettings.toml";
pub const LEGACY_SETTINGS_FILENAME: &str = "BuildToolSettings.json";
pub const ENVIRONMENT_FILENAME: &str = "BuildEnvironment.json";
pub const STORAGE_DIR: &str = "BuildToolSettings/Storage";

pub const DEFAULT_CONFIG_DIR: &str = "BuildConfigs";
pub const DEFAULT_BUILD_DIR: &str = "build";
pub const DEFAULT_BUILD_INFO_PATH: &str = "Assets/Resources/BuildInfo.json";

/// Environment variables handed to the external builder process.
pub const OPTIONS_ENV_VAR: &str = "BUILDTOOL_OPTIONS";
pub const REPORT_ENV_VAR: &str = "BUILDTOOL_REPORT";

pub const PROJECT_ENV_VAR: &str = "BUILDTOOL_PROJECT";
pub const STORAGE_PASSPHRASE_ENV_VAR: &str = "BUILDTOOL_STORAGE_PASSPHRASE";
