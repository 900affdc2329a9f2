//! Request orchestration in front of the OpenAlex API.
//!
//! Three independent layers, innermost first:
//!
//! - [`transport`]: one HTTP GET with a hard deadline ([`Transport`]).
//! - [`retry`]: bounded exponential backoff that prefers the server's
//!   `Retry-After` on HTTP 429 ([`RetryPolicy`]).
//! - [`scheduler`]: global concurrency ceiling plus a priority-proportional
//!   pre-delay that staggers batches ([`RequestScheduler`]).

pub mod retry;
pub mod scheduler;
pub mod transport;

pub use retry::{RetryConfig, RetryPolicy};
pub use scheduler::{RequestScheduler, SchedulerConfig};
pub use transport::{DEFAULT_TIMEOUT, HttpResponse, ReqwestTransport, Transport};
