pub(crate) mod dashboard;
pub(crate) mod input;

pub(crate) use dashboard::dashboard;

use medidash_lib::{Client, RateLimitConfig};

use crate::formatters::page::DashboardFormatter;

/// Parameters passed to every command
pub(crate) struct CommandParams {
    pub(crate) client: Client,
    pub(crate) formatter: Box<dyn DashboardFormatter>,
    pub(crate) rate_limits: RateLimitConfig,
}
