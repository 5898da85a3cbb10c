//! Command dispatch: routes parsed CLI commands to their handlers.

pub mod config_cmd;
pub mod devices;
pub mod import;
pub mod substations;

use clap::ValueEnum;

use postes_config::Config;
use postes_core::Engine;

use crate::cli::{ColorMode, Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Output settings after merging CLI flags over config defaults.
#[derive(Debug, Clone, Copy)]
pub struct OutputOpts {
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl OutputOpts {
    pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<Self, CliError> {
        let format = match global.output {
            Some(format) => format,
            None => OutputFormat::from_str(&cfg.defaults.output, true).map_err(|reason| {
                CliError::Validation {
                    field: "defaults.output".into(),
                    reason,
                }
            })?,
        };
        let color = match global.color {
            Some(mode) => mode,
            None => ColorMode::from_str(&cfg.defaults.color, true).map_err(|reason| {
                CliError::Validation {
                    field: "defaults.color".into(),
                    reason,
                }
            })?,
        };
        Ok(Self {
            format,
            color: output::should_color(color),
            quiet: global.quiet,
        })
    }
}

/// Dispatch a read command against the engine.
pub async fn dispatch(cmd: Command, engine: &Engine, opts: OutputOpts) -> Result<(), CliError> {
    match cmd {
        Command::List(args) => substations::list(engine, &args, opts).await,
        Command::Show { id } => substations::show(engine, id, opts).await,
        Command::Summary(args) => substations::summary(engine, &args, opts).await,
        Command::Owners => substations::owners(engine, opts).await,
        Command::Devices { id } => devices::handle(engine, id, opts).await,

        // Handled before an engine is built
        Command::Import(_) | Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
