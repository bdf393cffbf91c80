//! The paginated data source behind the patient list.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{PatientPage, QueryDescriptor, Result, Stats};

/// A remote, paginated, filterable and searchable patient collection.
///
/// [`Client`](crate::Client) implements this over HTTP. The
/// [`QueryCoordinator`](crate::QueryCoordinator) only ever talks to this
/// trait, so tests can plug in collections with scripted latency.
#[async_trait]
pub trait RemoteCollection: Send + Sync + 'static {
    /// Fetch the page described by `query`.
    async fn fetch(&self, query: &QueryDescriptor) -> Result<PatientPage>;

    /// Fetch the dashboard counters.
    ///
    /// Stats are not tied to a query and may be refreshed in any order.
    async fn fetch_stats(&self) -> Result<Stats>;
}

#[async_trait]
impl<C: RemoteCollection + ?Sized> RemoteCollection for Arc<C> {
    async fn fetch(&self, query: &QueryDescriptor) -> Result<PatientPage> {
        (**self).fetch(query).await
    }

    async fn fetch_stats(&self) -> Result<Stats> {
        (**self).fetch_stats().await
    }
}
