//! Parsing of the line-oriented commands read from standard input.

use std::str::FromStr;

use anyhow::{Context, Error, Result, anyhow, bail};
use medidash_lib::{Gender, NewPatient};
use strum::VariantNames;

pub(crate) const HELP: &str = "\
Commands:
  search <text>                  search names, symptoms and history (empty clears)
  filter <male|female|other|all> toggle the gender filter
  page <n>, next, prev           navigate pages
  refresh                        reload the current page and the stats
  stats                          show patient counters
  show <id>                      show a patient and its recommendation
  admit <json>                   register a patient, e.g. admit {\"name\":\"Asha Rao\",\"age\":47,\"gender\":\"Female\"}
  quit                           wait for pending requests and exit";

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Search(String),
    Filter(Option<Gender>),
    Page(u32),
    Next,
    Prev,
    Refresh,
    Stats,
    Show(String),
    Admit(NewPatient),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        let command = match word.to_lowercase().as_str() {
            "search" => Command::Search(rest.to_string()),
            "filter" => Command::Filter(parse_filter(rest)?),
            "page" => Command::Page(
                rest.parse()
                    .with_context(|| format!("Invalid page number `{rest}`"))?,
            ),
            "next" => Command::Next,
            "prev" | "previous" => Command::Prev,
            "refresh" => Command::Refresh,
            "stats" => Command::Stats,
            "show" if rest.is_empty() => bail!("Usage: show <patient id>"),
            "show" => Command::Show(rest.to_string()),
            "admit" => Command::Admit(
                serde_json::from_str(rest).context("Cannot parse patient JSON")?,
            ),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("Unknown command `{other}`, type `help` for a list of commands"),
        };
        Ok(command)
    }
}

/// `all` and an empty filter clear the gender filter
fn parse_filter(value: &str) -> Result<Option<Gender>> {
    match value.to_lowercase().as_str() {
        "" | "all" => Ok(None),
        other => other.parse().map(Some).map_err(|_| {
            anyhow!(
                "Unknown filter `{value}`, expected one of {} or all",
                Gender::VARIANTS.join(", ")
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use medidash_lib::{Gender, NewPatient};
    use pretty_assertions::assert_eq;

    use super::Command;

    fn parse(line: &str) -> Command {
        line.parse().unwrap()
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("next"), Command::Next);
        assert_eq!(parse("  PREV "), Command::Prev);
        assert_eq!(parse("refresh"), Command::Refresh);
        assert_eq!(parse("stats"), Command::Stats);
        assert_eq!(parse("?"), Command::Help);
        assert_eq!(parse("exit"), Command::Quit);
    }

    #[test]
    fn test_search_keeps_inner_whitespace() {
        assert_eq!(parse("search  ann  marie "), Command::Search("ann  marie".into()));
        assert_eq!(parse("search"), Command::Search(String::new()));
    }

    #[test]
    fn test_filter() {
        assert_eq!(parse("filter male"), Command::Filter(Some(Gender::Male)));
        assert_eq!(parse("filter Female"), Command::Filter(Some(Gender::Female)));
        assert_eq!(parse("filter all"), Command::Filter(None));
        assert_eq!(parse("filter"), Command::Filter(None));

        let err = "filter unknown".parse::<Command>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown filter `unknown`, expected one of Male, Female, Other or all"
        );
    }

    #[test]
    fn test_page() {
        assert_eq!(parse("page 3"), Command::Page(3));
        assert!("page three".parse::<Command>().is_err());
        assert!("page -1".parse::<Command>().is_err());
    }

    #[test]
    fn test_show_requires_id() {
        assert_eq!(parse("show 65f1"), Command::Show("65f1".into()));
        assert!("show".parse::<Command>().is_err());
    }

    #[test]
    fn test_admit() {
        let command = parse(r#"admit {"name": "Asha Rao", "age": 47, "gender": "Female", "symptoms": ["fever"]}"#);
        assert_eq!(
            command,
            Command::Admit(NewPatient {
                name: "Asha Rao".into(),
                age: 47,
                gender: "Female".into(),
                symptoms: vec!["fever".into()],
                ..NewPatient::default()
            })
        );
        assert!("admit {not json".parse::<Command>().is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = "discharge 42".parse::<Command>().unwrap_err();
        assert!(err.to_string().contains("Unknown command `discharge`"));
    }
}
