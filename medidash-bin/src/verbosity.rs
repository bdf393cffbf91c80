//! `-v`/`-q` flags controlling how much the dashboard logs.
//!
//! By default warnings and errors are shown, so failed fetches are visible.
//! - `-q` only shows errors, `-qq` silences logging
//! - `-v` shows info
//! - `-vv` shows debug, including discarded stale responses
//! - `-vvv` shows trace

use std::fmt;

use log::LevelFilter;
use serde::Deserialize;

const LEVELS: [LevelFilter; 6] = [
    LevelFilter::Off,
    LevelFilter::Error,
    LevelFilter::Warn,
    LevelFilter::Info,
    LevelFilter::Debug,
    LevelFilter::Trace,
];

/// Index of [`LevelFilter::Warn`] in [`LEVELS`]
const DEFAULT_LEVEL: i16 = 2;

#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Verbosity {
    /// More output per occurrence
    ///
    /// By default only warnings and errors are logged. Passing `-v` one time
    /// also logs info messages, `-vv` enables debug, and `-vvv` trace.
    #[arg(
        long,
        short = 'v',
        action = clap::ArgAction::Count,
        global = true,
        conflicts_with = "quiet",
    )]
    verbose: u8,

    /// Less output per occurrence
    #[arg(
        long,
        short = 'q',
        action = clap::ArgAction::Count,
        global = true,
        conflicts_with = "verbose",
    )]
    quiet: u8,
}

impl Verbosity {
    /// Log level filter for the dashboard's own crates
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub(crate) fn log_level_filter(&self) -> LevelFilter {
        let index = DEFAULT_LEVEL + i16::from(self.verbose) - i16::from(self.quiet);
        LEVELS[index.clamp(0, LEVELS.len() as i16 - 1) as usize]
    }
}

// A config file names the level directly, e.g. `verbose = "debug"`
impl<'de> Deserialize<'de> for Verbosity {
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let level = match s.to_lowercase().as_str() {
            "warning" => LevelFilter::Warn,
            other => other
                .parse::<LevelFilter>()
                .map_err(|_| serde::de::Error::custom(format!("invalid log level `{s}`")))?,
        };
        let index = LEVELS.iter().position(|l| *l == level).unwrap_or(0);
        let delta = index as i16 - DEFAULT_LEVEL;
        Ok(Self {
            verbose: delta.max(0) as u8,
            quiet: (-delta).max(0) as u8,
        })
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.log_level_filter())
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use log::LevelFilter;
    use pretty_assertions::assert_eq;

    use super::Verbosity;

    #[derive(Debug, Parser)]
    struct Cli {
        #[clap(flatten)]
        verbose: Verbosity,
    }

    #[test]
    fn verify_app() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_log_level() {
        assert_eq!(Verbosity::default().log_level_filter(), LevelFilter::Warn);
    }

    #[test]
    fn test_flags() {
        let level = |args: &[&str]| {
            Cli::parse_from(std::iter::once("medidash").chain(args.iter().copied()))
                .verbose
                .log_level_filter()
        };
        assert_eq!(level(&["-v"]), LevelFilter::Info);
        assert_eq!(level(&["-vv"]), LevelFilter::Debug);
        assert_eq!(level(&["-vvvvv"]), LevelFilter::Trace);
        assert_eq!(level(&["-q"]), LevelFilter::Error);
        assert_eq!(level(&["-qqq"]), LevelFilter::Off);
    }

    #[test]
    fn test_deserialize() {
        #[derive(serde::Deserialize)]
        struct File {
            verbose: Verbosity,
        }
        let parse = |s: &str| toml::from_str::<File>(s).map(|f| f.verbose.log_level_filter());

        assert_eq!(parse(r#"verbose = "debug""#).unwrap(), LevelFilter::Debug);
        assert_eq!(parse(r#"verbose = "Warning""#).unwrap(), LevelFilter::Warn);
        assert_eq!(parse(r#"verbose = "error""#).unwrap(), LevelFilter::Error);
        assert!(parse(r#"verbose = "loud""#).is_err());
    }
}
