pub mod classify;
pub mod cli;
pub mod column;
pub mod config;
pub mod emit;
pub mod error;
pub mod generate;
pub mod infer;
pub mod inspect;
pub mod interval_set;
pub mod io_utils;
pub mod table;
pub mod uniqueness;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

/// `--progress` lowers the crate's default level to debug; an explicit
/// `RUST_LOG` always wins.
fn init_logging(progress: bool) {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            let level = if progress {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            };
            builder.filter_module("csv_sqlgen", level);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.progress);
    match cli.command {
        Commands::Generate(args) => {
            debug!(
                "Generating from {} file(s) with separator '{}'",
                args.files.len(),
                printable_char(args.inference.separator.0)
            );
            generate::execute(&args)
        }
        Commands::Inspect(args) => inspect::execute(&args),
    }
}

pub(crate) fn printable_char(value: Option<u8>) -> String {
    match value {
        None => "none".to_string(),
        Some(b'\t') => "\\t".to_string(),
        Some(b'\n') => "\\n".to_string(),
        Some(other) => char::from(other).to_string(),
    }
}
