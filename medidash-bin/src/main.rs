//! `medidash` is a terminal front-end for the clinical patient dashboard.
//!
//! It browses the paginated patient list of the dashboard API, registers
//! new patients and shows the recommendations stored for them. Commands are
//! read line by line from standard input:
//!
//! ```sh
//! medidash --base-url http://localhost:8000/api
//! ```
//!
//! Search as you type, with the query sent once you stop typing:
//! ```sh
//! echo "search fever" | medidash --search-debounce 200ms
//! ```
//!
//! Script a session with plain output:
//! ```sh
//! printf 'filter female\nnext\nstats\n' | medidash --mode plain
//! ```
#![warn(clippy::all, clippy::pedantic)]
#![warn(
    absolute_paths_not_starting_with_crate,
    rustdoc::invalid_html_tags,
    missing_copy_implementations,
    missing_debug_implementations,
    semicolon_in_expressions_from_macros,
    unreachable_pub,
    unused_extern_crates,
    variant_size_differences,
    clippy::missing_const_for_fn
)]
#![deny(anonymous_parameters, macro_use_extern_crate)]
#![deny(missing_docs)]

use std::io;
use std::path::PathBuf;

use anyhow::{Error, Result, bail};
use clap::Parser;
use formatters::log::init_logging;
use log::error;

mod client;
mod commands;
mod formatters;
mod options;
mod verbosity;

use crate::{
    commands::CommandParams,
    options::{Config, MEDIDASH_CONFIG_FILE, MedidashOptions},
};

/// A C-like enum that can be cast to `i32` and used as process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitCode {
    Success = 0,
    // NOTE: exit code 1 is used for any `Result::Err` bubbled up to `main()`
    // using the `?` operator.
    ConfigFile = 3,
}

fn main() -> Result<()> {
    // std::process::exit doesn't guarantee that all destructors will be run,
    // therefore we wrap the main code in another function to ensure that.
    let exit_code = run_main()?;
    std::process::exit(exit_code);
}

/// Merge all provided config options into one.
/// This includes a potential config file, command-line- and environment variables
fn load_config() -> Result<MedidashOptions> {
    let mut opts = MedidashOptions::parse();

    init_logging(&opts.config.verbose, opts.config.mode);

    // Load a potentially existing config file and merge it into the config from
    // the CLI
    if let Some(config_file) = &opts.config_file {
        match Config::load_from_file(config_file) {
            Ok(c) => opts.config.merge(c),
            Err(e) => {
                bail!(
                    "Cannot load configuration file `{}`: {e:?}",
                    config_file.display()
                );
            }
        }
    } else {
        // If no config file was explicitly provided, we try to load the default
        // config file from the current directory if the file exits. This will
        // raise an error if the file is invalid, just like the explicit provided
        // config file.
        let default_config = PathBuf::from(MEDIDASH_CONFIG_FILE);
        if default_config.is_file() {
            match Config::load_from_file(&default_config) {
                Ok(c) => opts.config.merge(c),
                Err(e) => {
                    bail!(
                        "Cannot load default configuration file `{}`: {e:?}",
                        default_config.display()
                    );
                }
            }
        }
    }

    Ok(opts)
}

/// Set up runtime and call the dashboard
fn run_main() -> Result<i32> {
    let opts = match load_config() {
        Ok(opts) => opts,
        Err(e) => {
            error!("Error while loading config: {e}");
            return Ok(ExitCode::ConfigFile as i32);
        }
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(&opts));
    // Reading stdin blocks a worker thread that cannot be cancelled, so
    // don't wait for it after `quit`.
    runtime.shutdown_background();

    match result {
        Err(e) if Some(io::ErrorKind::BrokenPipe) == underlying_io_error_kind(&e) => {
            Ok(ExitCode::Success as i32)
        }
        Err(e) => Err(e),
        Ok(()) => Ok(ExitCode::Success as i32),
    }
}

/// Check if the given error can be traced back to an `io::ErrorKind`
/// This is helpful for troubleshooting the root cause of an error.
/// Code is taken from the anyhow documentation.
fn underlying_io_error_kind(error: &Error) -> Option<io::ErrorKind> {
    for cause in error.chain() {
        if let Some(io_error) = cause.downcast_ref::<io::Error>() {
            return Some(io_error.kind());
        }
    }
    None
}

/// Run the dashboard on stdin and stdout
async fn run(opts: &MedidashOptions) -> Result<()> {
    let params = CommandParams {
        client: client::create(&opts.config)?,
        formatter: formatters::get_formatter(opts.config.mode),
        rate_limits: opts.config.rate_limits(),
    };

    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut output = io::stdout();
    commands::dashboard(params, input, &mut output).await
}
