use crate::options::{Config, HeaderMapExt};
use anyhow::{Context, Result};
use http::HeaderMap;
use medidash_lib::{Client, ClientBuilder};
use std::time::Duration;

/// Creates a client according to the command-line config
pub(crate) fn create(cfg: &Config) -> Result<Client> {
    let headers = HeaderMap::from_header_pairs(&cfg.header)?;

    ClientBuilder::builder()
        .base_url(cfg.base_url.clone())
        .user_agent(cfg.user_agent.clone())
        .custom_headers(headers)
        .timeout(Duration::from_secs(cfg.timeout as u64))
        .build()
        .client()
        .context("Failed to create request client")
}
