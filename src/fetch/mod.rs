//! HTTP fetching with retries.
//!
//! Every scraper talks to its site through a [`Session`]. Failed attempts are
//! retried per the session's [`RetryPolicy`]; a request that exhausts its
//! attempts yields `None` and the caller skips whatever depended on it.

mod retry;
mod session;

pub use retry::{retry_on_failure, DelayPolicy, RetryPolicy};
pub use session::{Session, SessionConfig};
