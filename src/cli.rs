use clap::Parser;

pub const APP_NAME: &str = "todos";

#[derive(Debug, Parser)]
#[command(name = "todos-api", about = "Todo JSON API server", disable_version_flag = true)]
pub struct Cli {
    /// Print version and build information, then exit
    #[arg(short = 'V', long)]
    pub version: bool,
}

/// Name, version and build details. `BUILD_STAMP` and `GIT_REVISION` are
/// read from the build environment.
pub fn version_string() -> String {
    format!(
        "{APP_NAME} Ver: {}, Build: {}, rev: {}",
        env!("CARGO_PKG_VERSION"),
        option_env!("BUILD_STAMP").unwrap_or("unknown"),
        option_env!("GIT_REVISION").unwrap_or("unknown"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_flag_is_parsed() {
        assert!(Cli::try_parse_from(["todos-api", "--version"]).unwrap().version);
        assert!(Cli::try_parse_from(["todos-api", "-V"]).unwrap().version);
        assert!(!Cli::try_parse_from(["todos-api"]).unwrap().version);
        assert!(Cli::try_parse_from(["todos-api", "--bogus"]).is_err());
    }

    #[test]
    fn version_string_names_the_app_and_version() {
        let version = version_string();
        assert!(version.starts_with("todos Ver: "));
        assert!(version.contains(env!("CARGO_PKG_VERSION")));
        assert!(version.contains("rev: "));
    }
}
