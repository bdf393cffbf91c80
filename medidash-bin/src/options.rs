use crate::verbosity::Verbosity;
use anyhow::{Context, Error, Result, anyhow};
use clap::{Parser, builder::TypedValueParser};
use const_format::{concatcp, formatcp};
use http::{
    HeaderMap,
    header::{HeaderName, HeaderValue},
};
use medidash_lib::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, RateLimitConfig};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::Path;
use std::{fs, path::PathBuf, str::FromStr, time::Duration};
use strum::{Display, EnumIter, EnumString, VariantNames};

pub(crate) const MEDIDASH_CONFIG_FILE: &str = "medidash.toml";

// clap wants `&str` defaults whereas serde expects owned values
const TIMEOUT_STR: &str = concatcp!(DEFAULT_TIMEOUT_SECS);
// Show the default config file without making clap fill it in, so that a
// missing default file is not an error.
const HELP_MSG_CONFIG_FILE: &str = formatcp!(
    "Configuration file to use\n\n[default: {}]",
    MEDIDASH_CONFIG_FILE,
);

/// How the dashboard prints pages, stats and log lines
#[derive(
    Debug, Deserialize, Default, Clone, Copy, Display, EnumIter, EnumString, VariantNames, PartialEq, Eq,
)]
#[non_exhaustive]
pub(crate) enum OutputMode {
    /// Plain text, for terminals without color support or for piping the
    /// output into another program.
    #[serde(rename = "plain")]
    #[strum(serialize = "plain", ascii_case_insensitive)]
    Plain,

    /// Colorful output.
    ///
    /// This is the default output mode. It falls back to plain text if the
    /// terminal does not support colors.
    #[serde(rename = "color")]
    #[strum(serialize = "color", ascii_case_insensitive)]
    #[default]
    Color,
}

impl OutputMode {
    /// Returns `true` if the output mode is `Plain`
    pub(crate) const fn is_plain(self) -> bool {
        matches!(self, OutputMode::Plain)
    }
}

// Macro for generating default functions to be used by serde
macro_rules! default_function {
    ( $( $name:ident : $T:ty = $e:expr; )* ) => {
        $(
            #[allow(clippy::missing_const_for_fn)]
            fn $name() -> $T {
                $e
            }
        )*
    };
}

// Generate the functions for serde defaults
default_function! {
    base_url: String = DEFAULT_BASE_URL.to_string();
    user_agent: String = DEFAULT_USER_AGENT.to_string();
    timeout: usize = DEFAULT_TIMEOUT_SECS;
    verbosity: Verbosity = Verbosity::default();
}

// Macro for merging configuration values
macro_rules! fold_in {
    ($cli:ident , $toml:ident ; $ty:ident { $(..$ignore:ident,)* $( $key:ident : $default:expr, )* } ) => {
        if (false) {
            #[allow(dead_code, unused, clippy::diverging_sub_expression)]
            let _check_fold_in_exhaustivity = $ty {
                $($key: unreachable!(), )*
                $($ignore: unreachable!(), )*
            };
        };
        $(
            if $cli.$key == $default && $toml.$key != $default {
                $cli.$key = $toml.$key;
            }
        )*
    };
}

/// Parse a single header into a [`HeaderName`] and [`HeaderValue`]
///
/// Headers are expected to be in format `Header-Name: Header-Value`.
/// The header name and value are trimmed of whitespace.
///
/// # Errors
///
/// This fails if the header does not contain a `:` character or if the
/// name or value is not a valid header.
fn parse_single_header(header: &str) -> Result<(HeaderName, HeaderValue)> {
    let (name, value) = header.split_once(':').ok_or_else(|| {
        anyhow!("Invalid header format. Expected colon-separated string in the format 'HeaderName: HeaderValue'")
    })?;
    let name = name.trim();
    let name = HeaderName::from_str(name)
        .map_err(|e| anyhow!("Unable to convert header name '{name}': {e}"))?;
    let value = HeaderValue::from_str(value.trim())
        .map_err(|e| anyhow!("Unable to read value of header with name '{name}': {e}"))?;
    Ok((name, value))
}

/// Parses a `--header` argument into a `(name, value)` pair
#[derive(Clone, Debug)]
struct HeaderParser;

impl TypedValueParser for HeaderParser {
    type Value = (String, String);

    fn parse_ref(
        &self,
        _cmd: &clap::Command,
        _arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let invalid = |msg: String| clap::Error::raw(clap::error::ErrorKind::InvalidValue, msg);

        let header_str = value
            .to_str()
            .ok_or_else(|| invalid("Header value contains invalid UTF-8".into()))?;
        let (name, value) = parse_single_header(header_str).map_err(|e| invalid(e.to_string()))?;
        let value = value
            .to_str()
            .map_err(|_| invalid("Header value contains invalid UTF-8".into()))?;
        Ok((name.to_string(), value.to_string()))
    }
}

impl clap::builder::ValueParserFactory for HeaderParser {
    type Parser = HeaderParser;
    fn value_parser() -> Self::Parser {
        HeaderParser
    }
}

/// Extension trait for converting a Vec of header pairs to a `HeaderMap`
pub(crate) trait HeaderMapExt {
    /// Convert a collection of header key-value pairs to a `HeaderMap`
    fn from_header_pairs(headers: &[(String, String)]) -> Result<HeaderMap, Error>;
}

impl HeaderMapExt for HeaderMap {
    fn from_header_pairs(headers: &[(String, String)]) -> Result<HeaderMap, Error> {
        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| anyhow!("Invalid header name '{name}': {e}"))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| anyhow!("Invalid header value '{value}': {e}"))?;
            header_map.insert(header_name, header_value);
        }
        Ok(header_map)
    }
}

/// medidash browses the patient list of the clinical dashboard API from the
/// terminal.
///
/// Commands are read line by line from standard input:
/// `search <text>`, `filter <male|female|other|all>`, `page <n>`, `next`,
/// `prev`, `refresh`, `stats`, `show <id>`, `admit <json>`, `help` and
/// `quit`.
#[derive(Parser, Debug)]
#[command(version, about, next_display_order = None)]
pub(crate) struct MedidashOptions {
    /// Configuration file to use
    #[arg(short, long = "config")]
    #[arg(help = HELP_MSG_CONFIG_FILE)]
    pub(crate) config_file: Option<PathBuf>,

    #[clap(flatten)]
    pub(crate) config: Config,
}

// Custom deserializer function for the header field
fn deserialize_headers<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = HashMap::<String, String>::deserialize(deserializer)?;
    Ok(map.into_iter().collect())
}

/// The main configuration for medidash
#[derive(Parser, Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    /// Verbose program output
    #[clap(flatten)]
    #[serde(default = "verbosity")]
    pub(crate) verbose: Verbosity,

    /// Output display mode
    #[arg(
        long,
        default_value_t = OutputMode::default(),
        value_parser = clap::builder::PossibleValuesParser::new(OutputMode::VARIANTS)
            .map(|s| s.parse::<OutputMode>().unwrap_or_default()),
    )]
    #[serde(default)]
    pub(crate) mode: OutputMode,

    /// Root of the patient API
    #[arg(long, env = "MEDIDASH_BASE_URL", default_value = DEFAULT_BASE_URL)]
    #[serde(default = "base_url")]
    pub(crate) base_url: String,

    /// Request timeout in seconds from connect to response finished
    #[arg(short, long, default_value = &TIMEOUT_STR)]
    #[serde(default = "timeout")]
    pub(crate) timeout: usize,

    /// User agent
    #[arg(short, long, default_value = DEFAULT_USER_AGENT)]
    #[serde(default = "user_agent")]
    pub(crate) user_agent: String,

    /// Set custom header for requests
    #[arg(
        short = 'H',
        long = "header",
        value_parser = HeaderParser,
        long_help = "Set custom header for requests

Specify custom headers in the format 'Name: Value', for example
'Authorization: Bearer <token>'. The flag can be given multiple times.
The headers are sent with every request to the patient API."
    )]
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_headers")]
    pub(crate) header: Vec<(String, String)>,

    /// Quiet period after the last search edit before the list is queried,
    /// e.g. `500ms` [default: 500ms]
    #[arg(long, value_parser = humantime::parse_duration)]
    #[serde(default, with = "humantime_serde")]
    pub(crate) search_debounce: Option<Duration>,

    /// Minimum time between two page changes, e.g. `800ms` [default: 800ms]
    #[arg(long, value_parser = humantime::parse_duration)]
    #[serde(default, with = "humantime_serde")]
    pub(crate) page_throttle: Option<Duration>,
}

impl Config {
    /// Load configuration from a file
    pub(crate) fn load_from_file(path: &Path) -> Result<Config> {
        // Read configuration file
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).with_context(|| "Failed to parse configuration file")
    }

    /// Overwrites existing headers in `self` with the values from `other`.
    fn merge_headers(&mut self, other: &[(String, String)]) {
        let self_map = self.header.iter().cloned().collect::<HashMap<_, _>>();
        let other_map = other.iter().cloned().collect::<HashMap<_, _>>();
        self.header = self_map.into_iter().chain(other_map).collect();
    }

    /// Merge the configuration from TOML into the CLI configuration
    pub(crate) fn merge(&mut self, toml: Config) {
        self.merge_headers(&toml.header);

        // NOTE: if you see an error within this macro call, check to make sure that
        // that the fields provided to fold_in! match all the fields of the Config struct.
        fold_in! {
            // Destination and source configs
            self, toml;

            Config {
                // Keys which are handled outside of fold_in
                ..header,

                // Keys with defaults to assign
                verbose: Verbosity::default(),
                mode: OutputMode::default(),
                base_url: DEFAULT_BASE_URL,
                timeout: DEFAULT_TIMEOUT_SECS,
                user_agent: DEFAULT_USER_AGENT,
                search_debounce: None,
                page_throttle: None,
            }
        }
    }

    /// Timing of the search debouncer and page throttle
    pub(crate) fn rate_limits(&self) -> RateLimitConfig {
        RateLimitConfig::from_options(self.search_debounce, self.page_throttle)
    }
}
