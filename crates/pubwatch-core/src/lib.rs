//! Pubwatch Core - shared plumbing for publication tracking pipelines
//!
//! Logging, progress display, the blocking HTTP bridge and request pacing.
//! Nothing in here knows about a particular bibliographic provider.

pub mod http;
pub mod logging;
pub mod pacing;
pub mod progress;

// Re-exports for convenience
pub use http::{FetchError, SHARED_RUNTIME, http_client};
pub use logging::{IndicatifLogger, init_logging};
pub use pacing::Pacer;
pub use progress::{ProgressContext, SharedProgress, fmt_num};
