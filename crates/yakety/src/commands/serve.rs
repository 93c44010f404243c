//! `yakety serve` command implementation.

use std::convert::Infallible;
use std::path::PathBuf;

use clap::Args;
use yakety_config::{CliSettings, Config};
use yakety_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover yakety.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Development mode: watch files and enable live reload.
    ///
    /// From the environment only `DEV=true` enables it.
    #[arg(long, env = "DEV", value_parser = parse_dev)]
    dev: bool,

    /// Directory watched for live reload (overrides config).
    #[arg(long)]
    root: Option<PathBuf>,

    /// Directory served as static files (overrides config).
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Enable verbose output (connection and reload logs).
    #[arg(short, long)]
    pub verbose: bool,
}

/// Anything other than exactly `true` means production mode.
#[allow(clippy::unnecessary_wraps)]
fn parse_dev(value: &str) -> Result<bool, Infallible> {
    Ok(value == "true")
}

impl ServeArgs {
    /// Build config overrides from the command line.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            host: self.host.clone(),
            port: self.port,
            // Absent flag leaves the config file's value in place
            dev: self.dev.then_some(true),
            static_dir: self.static_dir.clone(),
            watch_root: self.root.clone(),
        }
    }

    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;

        output.highlight(&format!(
            "Starting server on http://{}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Static directory: {}",
            config.static_resolved.dir.display()
        ));

        if config.server.dev {
            let root = &config.live_reload_resolved.root;
            if root.is_dir() {
                output.info(&format!("Live reload: enabled (watching {})", root.display()));
            } else {
                output.warning(&format!(
                    "Live reload: disabled (watch root {} does not exist)",
                    root.display()
                ));
            }
        } else {
            output.info("Live reload: disabled");
        }

        let server_config = server_config_from_config(&config, version.to_owned());
        run_server(server_config).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        serve: ServeArgs,
    }

    fn parse(args: &[&str]) -> ServeArgs {
        let argv = std::iter::once("serve").chain(args.iter().copied());
        TestCli::try_parse_from(argv).unwrap().serve
    }

    #[test]
    fn test_absent_flags_leave_config_alone() {
        let settings = parse(&[]).cli_settings();

        assert_eq!(settings.host, None);
        assert_eq!(settings.static_dir, None);
        assert_eq!(settings.watch_root, None);
    }

    #[test]
    fn test_flags_become_overrides() {
        let settings = parse(&[
            "--host",
            "0.0.0.0",
            "--dev",
            "--root",
            "site",
            "--static-dir",
            "public",
        ])
        .cli_settings();

        assert_eq!(settings.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(settings.dev, Some(true));
        assert_eq!(settings.watch_root, Some(PathBuf::from("site")));
        assert_eq!(settings.static_dir, Some(PathBuf::from("public")));
    }

    #[test]
    fn test_parse_dev_accepts_only_true() {
        assert_eq!(parse_dev("true"), Ok(true));
        for value in ["false", "1", "yes", "TRUE", ""] {
            assert_eq!(parse_dev(value), Ok(false), "DEV={value}");
        }
    }

    #[test]
    fn test_dev_flag_without_value() {
        assert_eq!(parse(&["--dev"]).cli_settings().dev, Some(true));
    }

    #[test]
    fn test_explicit_port() {
        let settings = parse(&["--port", "8080"]).cli_settings();
        assert_eq!(settings.port, Some(8080));
    }
}
