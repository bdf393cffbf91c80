use http::StatusCode;
use serde::{Serialize, Serializer};
use std::hash::Hash;
use thiserror::Error;

/// Possible errors when talking to the patient API
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Network error while sending a request (includes timeouts)
    #[error("Network error while trying to reach the patient API: {0}")]
    NetworkRequest(#[source] reqwest::Error),
    /// The response body could not be read or decoded
    #[error("Error reading response body: {0}")]
    ReadResponseBody(#[source] reqwest::Error),
    /// The API answered with a status code that signals failure
    #[error("The patient API rejected the request with status {0}")]
    RejectedStatusCode(StatusCode),
    /// The API refused a submitted record
    #[error("Patient record was rejected: {0}")]
    Validation(String),
    /// No patient is stored under the given identifier
    #[error("Patient `{0}` not found")]
    PatientNotFound(String),
    /// The configured base URL cannot be parsed
    #[error("Invalid base URL `{0}`: {1}")]
    InvalidBaseUrl(String, #[source] url::ParseError),
    /// A header value could not be built
    #[error("Header could not be parsed.")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
    /// The underlying `reqwest` client could not be created
    #[error("Error creating request client: {0}")]
    BuildRequestClient(#[source] reqwest::Error),
}

impl ErrorKind {
    /// Returns `true` if the failure happened on the wire (connect, send,
    /// timeout) rather than being an answer from the API.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::NetworkRequest(_) | Self::ReadResponseBody(_))
    }

    /// Returns `true` if the request timed out
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::NetworkRequest(e) | Self::ReadResponseBody(e) => e.is_timeout(),
            _ => false,
        }
    }
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NetworkRequest(e1), Self::NetworkRequest(e2))
            | (Self::ReadResponseBody(e1), Self::ReadResponseBody(e2))
            | (Self::BuildRequestClient(e1), Self::BuildRequestClient(e2)) => {
                e1.to_string() == e2.to_string()
            }
            (Self::RejectedStatusCode(c1), Self::RejectedStatusCode(c2)) => c1 == c2,
            (Self::Validation(m1), Self::Validation(m2))
            | (Self::PatientNotFound(m1), Self::PatientNotFound(m2)) => m1 == m2,
            (Self::InvalidBaseUrl(s1, e1), Self::InvalidBaseUrl(s2, e2)) => s1 == s2 && e1 == e2,
            (Self::InvalidHeader(_), Self::InvalidHeader(_)) => true,
            _ => false,
        }
    }
}

impl Eq for ErrorKind {}

impl Hash for ErrorKind {
    fn hash<H>(&self, state: &mut H)
    where
        H: std::hash::Hasher,
    {
        match self {
            Self::NetworkRequest(e) | Self::ReadResponseBody(e) | Self::BuildRequestClient(e) => {
                e.to_string().hash(state);
            }
            Self::RejectedStatusCode(c) => c.hash(state),
            Self::Validation(m) | Self::PatientNotFound(m) => m.hash(state),
            Self::InvalidBaseUrl(s, e) => (s, e.to_string()).hash(state),
            Self::InvalidHeader(e) => e.to_string().hash(state),
        }
    }
}

impl Serialize for ErrorKind {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
