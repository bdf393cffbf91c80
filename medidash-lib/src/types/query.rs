use std::fmt::Display;

use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumIter, EnumString, VariantNames};

/// Number of patients on one page of the remote collection.
pub const PAGE_SIZE: u32 = 10;

/// Gender category used to filter the patient list.
///
/// The remote API matches on the exact capitalized spelling, which is what
/// [`Display`] and serde produce. Parsing is case-insensitive so that user
/// input like `male` works as well.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    StrumDisplay,
    EnumString,
    EnumIter,
    VariantNames,
)]
#[strum(ascii_case_insensitive)]
pub enum Gender {
    /// Male patients
    Male,
    /// Female patients
    Female,
    /// Everyone else
    Other,
}

/// The page/search/filter tuple which fully determines one fetch against the
/// remote collection.
///
/// Descriptors are plain values: the coordinator builds a fresh one for every
/// query it issues and never mutates one that is already in flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryDescriptor {
    /// One-based page number
    pub page: u32,
    /// Substring searched in the indexed text fields, empty for no search
    pub search_term: String,
    /// Exact gender filter, `None` for no filter
    pub gender: Option<Gender>,
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self {
            page: 1,
            search_term: String::new(),
            gender: None,
        }
    }
}

impl QueryDescriptor {
    /// Query-string parameters for this descriptor.
    ///
    /// `search` and `gender` are left out entirely when unset so the server
    /// applies no filter for them.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.max(1).to_string()),
            ("limit", PAGE_SIZE.to_string()),
        ];
        if !self.search_term.is_empty() {
            pairs.push(("search", self.search_term.clone()));
        }
        if let Some(gender) = self.gender {
            pairs.push(("gender", gender.to_string()));
        }
        pairs
    }

    /// `true` if neither a search term nor a filter narrows the result set.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.search_term.is_empty() && self.gender.is_none()
    }
}

impl Display for QueryDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page {}", self.page)?;
        if !self.search_term.is_empty() {
            write!(f, ", search `{}`", self.search_term)?;
        }
        if let Some(gender) = self.gender {
            write!(f, ", gender {gender}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("male", Gender::Male)]
    #[case("Female", Gender::Female)]
    #[case("OTHER", Gender::Other)]
    fn test_parse_gender(#[case] input: &str, #[case] expected: Gender) {
        assert_eq!(Gender::from_str(input).unwrap(), expected);
    }

    #[test]
    fn test_parse_invalid_gender() {
        assert!(Gender::from_str("unknown").is_err());
    }

    #[test]
    fn test_default_query_pairs() {
        assert_eq!(
            QueryDescriptor::default().query_pairs(),
            vec![("page", "1".to_string()), ("limit", "10".to_string())]
        );
    }

    #[test]
    fn test_full_query_pairs() {
        let query = QueryDescriptor {
            page: 3,
            search_term: "ann".into(),
            gender: Some(Gender::Female),
        };
        assert_eq!(
            query.query_pairs(),
            vec![
                ("page", "3".to_string()),
                ("limit", "10".to_string()),
                ("search", "ann".to_string()),
                ("gender", "Female".to_string()),
            ]
        );
        assert!(!query.is_unfiltered());
        assert_eq!(query.to_string(), "page 3, search `ann`, gender Female");
    }
}
