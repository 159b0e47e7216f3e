//! Validate and print the effective configuration.

use std::path::PathBuf;

use clap::Args;
use polykey_config::EngineConfig;

use super::common::load_config;

/// Check a configuration file and print it with defaults filled in.
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration file to check
    #[arg(value_name = "PATH", conflicts_with = "defaults")]
    pub path: Option<PathBuf>,

    /// Print the factory configuration
    #[arg(long)]
    pub defaults: bool,
}

/// Run the config command.
pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let config = if args.defaults {
        EngineConfig::default()
    } else {
        load_config(args.path.as_deref())?
    };

    if let Err(err) = config.validate() {
        let errors = err.into_errors();
        for error in &errors {
            tracing::error!("{error}");
        }
        anyhow::bail!("configuration has {} error(s)", errors.len());
    }

    print!("{}", config.to_toml()?);
    Ok(())
}
