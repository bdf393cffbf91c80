//! Rate limiting for user input channels.
//!
//! Two small owned primitives sit between user input and the query
//! coordinator:
//!
//! - [`Debounce`]: waits for input to go quiet, then runs once with the last
//!   arguments (used for free-text search)
//! - [`Throttle`]: runs immediately, then drops calls for a cooling period
//!   (used for page navigation)
//!
//! Both own at most one timer task and release it on `dispose()` or drop.
//! Neither holds a reference to the state it eventually changes; they only
//! invoke the action they were built with.

mod config;
mod debounce;
mod throttle;

pub use config::RateLimitConfig;
pub use debounce::Debounce;
pub use throttle::Throttle;
