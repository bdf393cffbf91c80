//! HTTP access to the patient API.
//!
//! This module defines two structs, [`Client`] and [`ClientBuilder`].
//! `Client` talks to the remote collection and implements
//! [`RemoteCollection`] for the query coordinator. `ClientBuilder` exposes a
//! finer level of granularity for building a `Client`.
#![allow(clippy::module_name_repetitions)]
use std::time::Duration;

use async_trait::async_trait;
use http::{
    StatusCode,
    header::{self, HeaderMap, HeaderValue},
};
use reqwest::Response;
use serde::{Deserialize, de::DeserializeOwned};
use typed_builder::TypedBuilder;
use url::Url;

use crate::{
    Admission, ErrorKind, NewPatient, PatientDetails, PatientPage, QueryDescriptor, Result, Stats,
    collection::RemoteCollection,
};

/// Default API root, the address the dashboard backend listens on.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
/// Default timeout in seconds before a request is deemed as failed, 20.
pub const DEFAULT_TIMEOUT_SECS: usize = 20;
/// Default user agent, `medidash-<PKG_VERSION>`.
pub const DEFAULT_USER_AGENT: &str = concat!("medidash/", env!("CARGO_PKG_VERSION"));

/// Builder for [`Client`].
///
/// ```
/// use std::time::Duration;
/// use medidash_lib::ClientBuilder;
///
/// let client = ClientBuilder::builder()
///     .base_url("http://localhost:8000/api")
///     .timeout(Duration::from_secs(5))
///     .build()
///     .client()
///     .unwrap();
/// assert_eq!(client.base_url().as_str(), "http://localhost:8000/api/");
/// ```
#[derive(TypedBuilder, Debug, Clone)]
#[builder(field_defaults(default, setter(into)))]
pub struct ClientBuilder {
    /// Root of the patient API; the collection lives under `patients/`.
    #[builder(default_code = "String::from(DEFAULT_BASE_URL)")]
    base_url: String,
    /// User-agent sent with every request.
    #[builder(default_code = "String::from(DEFAULT_USER_AGENT)")]
    user_agent: String,
    /// Sets the default [headers] for every request, e.g. an
    /// `Authorization` header for a protected deployment.
    ///
    /// [headers]: https://docs.rs/http/latest/http/header/struct.HeaderName.html
    custom_headers: HeaderMap,
    /// Response timeout per request.
    #[builder(default_code = "Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS as u64))")]
    timeout: Option<Duration>,
}

impl Default for ClientBuilder {
    #[inline]
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClientBuilder {
    /// Instantiates a [`Client`].
    ///
    /// # Errors
    ///
    /// Returns an `Err` if:
    /// - The base URL cannot be parsed or cannot hold a path.
    /// - The user-agent is invalid.
    /// - The request client cannot be created.
    ///   See [here](https://docs.rs/reqwest/latest/reqwest/struct.ClientBuilder.html#errors).
    pub fn client(self) -> Result<Client> {
        let Self {
            base_url,
            user_agent,
            custom_headers: mut headers,
            timeout,
        } = self;

        let base_url = parse_base_url(&base_url)?;

        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_str(&user_agent).map_err(ErrorKind::InvalidHeader)?,
        );

        let builder = reqwest::ClientBuilder::new()
            .gzip(true)
            .default_headers(headers);

        let reqwest_client = (match timeout {
            Some(t) => builder.timeout(t),
            None => builder,
        })
        .build()
        .map_err(ErrorKind::BuildRequestClient)?;

        Ok(Client {
            reqwest_client,
            base_url,
        })
    }
}

/// Parse the API root and make sure relative joins stay below it.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).map_err(|e| ErrorKind::InvalidBaseUrl(raw.to_string(), e))?;
    if url.cannot_be_a_base() {
        return Err(ErrorKind::InvalidBaseUrl(
            raw.to_string(),
            url::ParseError::RelativeUrlWithCannotBeABaseBase,
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Error body of the API, `{"detail": ...}`.
///
/// `detail` is a plain string for handled errors and a list of
/// `{loc, msg, type}` objects for rejected payloads.
#[derive(Debug, Deserialize)]
struct ApiError {
    detail: serde_json::Value,
}

impl ApiError {
    fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| {
                    let field = item["loc"]
                        .as_array()
                        .and_then(|loc| loc.last())
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    let msg = item["msg"].as_str().unwrap_or("invalid value");
                    if field.is_empty() {
                        msg.to_string()
                    } else {
                        format!("{}: {msg}", field.trim_matches('"'))
                    }
                })
                .collect::<Vec<_>>()
                .join(", "),
            other => other.to_string(),
        }
    }
}

/// Talks to the patient API.
///
/// See [`ClientBuilder`] which contains sane defaults for all configuration options.
#[derive(Debug, Clone)]
pub struct Client {
    /// Underlying `reqwest` client instance that handles the HTTP requests.
    reqwest_client: reqwest::Client,
    /// API root, always ending in `/`.
    base_url: Url,
}

impl Client {
    /// The API root requests are resolved against
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch one page of the patient list.
    ///
    /// # Errors
    ///
    /// Fails on network errors, undecodable bodies and non-success status codes.
    pub async fn patients(&self, query: &QueryDescriptor) -> Result<PatientPage> {
        let response = self
            .reqwest_client
            .get(self.endpoint("patients/"))
            .query(&query.query_pairs())
            .send()
            .await
            .map_err(ErrorKind::NetworkRequest)?;
        read_json(response).await
    }

    /// Fetch the dashboard counters.
    ///
    /// # Errors
    ///
    /// Fails on network errors, undecodable bodies and non-success status codes.
    pub async fn stats(&self) -> Result<Stats> {
        let response = self
            .reqwest_client
            .get(self.endpoint("patients/stats"))
            .send()
            .await
            .map_err(ErrorKind::NetworkRequest)?;
        read_json(response).await
    }

    /// Register a patient. The API runs its analysis agent on the new record
    /// and answers with the resulting recommendation.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Validation`] if the API refuses the payload, and
    /// network or status errors otherwise.
    pub async fn create_patient(&self, patient: &NewPatient) -> Result<Admission> {
        let response = self
            .reqwest_client
            .post(self.endpoint("patients/"))
            .json(patient)
            .send()
            .await
            .map_err(ErrorKind::NetworkRequest)?;

        match response.status() {
            StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => {
                Err(ErrorKind::Validation(error_message(response).await))
            }
            _ => read_json(response).await,
        }
    }

    /// Fetch a single patient and the recommendation stored for it.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::PatientNotFound`] for unknown identifiers, and
    /// network or status errors otherwise.
    pub async fn patient(&self, id: &str) -> Result<PatientDetails> {
        let mut url = self.endpoint("patients/");
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id);
        }

        let response = self
            .reqwest_client
            .get(url)
            .send()
            .await
            .map_err(ErrorKind::NetworkRequest)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ErrorKind::PatientNotFound(id.to_string()));
        }
        read_json(response).await
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}{path}", self.base_url.path()));
        url
    }
}

#[async_trait]
impl RemoteCollection for Client {
    async fn fetch(&self, query: &QueryDescriptor) -> Result<PatientPage> {
        self.patients(query).await
    }

    async fn fetch_stats(&self) -> Result<Stats> {
        self.stats().await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(ErrorKind::RejectedStatusCode(status));
    }
    response.json().await.map_err(ErrorKind::ReadResponseBody)
}

async fn error_message(response: Response) -> String {
    let status = response.status();
    match response.json::<ApiError>().await {
        Ok(error) => error.message(),
        Err(_) => status.to_string(),
    }
}
