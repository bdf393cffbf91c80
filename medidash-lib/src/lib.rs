//! `medidash` coordinates the queries behind a paginated patient list.
//!
//! Free-text search, a gender filter and page navigation all change what the
//! list should show. The [`QueryCoordinator`] turns these inputs into one
//! ordered series of fetches and only ever displays the answer to the most
//! recent one, no matter in which order responses arrive.
//!
//! ```no_run
//! use medidash_lib::{ClientBuilder, Gender, QueryCoordinator, RateLimitConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!   let client = ClientBuilder::default().client()?;
//!   let mut coordinator = QueryCoordinator::new(client, RateLimitConfig::default());
//!
//!   coordinator.start();
//!   coordinator.set_gender_filter(Some(Gender::Female));
//!   coordinator.settle().await;
//!
//!   for patient in &coordinator.visible().results {
//!       println!("{}", patient.name);
//!   }
//!   Ok(())
//! }
//! ```
//!
//! The HTTP [`Client`] can also be used on its own to register patients and
//! read their recommendations.
#![warn(missing_docs)]

mod client;
mod collection;
mod coordinator;
mod types;

pub mod ratelimit;

pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
pub use collection::RemoteCollection;
pub use coordinator::{Outcome, QueryCoordinator, VisibleState};
pub use ratelimit::RateLimitConfig;
pub use types::*;
