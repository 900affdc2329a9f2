//! OpenLens - institution comparison on top of the OpenAlex API
//!
//! This crate holds the request orchestration and comparison state behind
//! an institution explorer: up to five institutions compared side by side,
//! optionally scoped to one research topic, with the selection mirrored
//! into a shareable query string.
//!
//! Layers, bottom-up:
//!
//! - [`http`]: fetch-with-timeout ([`http::Transport`]), retry with
//!   exponential backoff ([`RetryPolicy`]) and concurrency-limited,
//!   staggered admission ([`RequestScheduler`]).
//! - [`cache`]: TTL + oldest-write-eviction caches ([`CacheService`]).
//! - [`openalex`]: the OpenAlex endpoints ([`OpenAlexClient`]).
//! - [`data`]: cached batch resolution of terms into institutions
//!   ([`InstitutionDataService`]).
//! - [`stores`]: observable session state: terms, topic, loading.
//! - [`explorer`]: one session wiring it all together ([`Explorer`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use openlens::Explorer;
//!
//! #[tokio::main]
//! async fn main() -> openlens::Result<()> {
//!     let explorer = Explorer::builder().build()?;
//!     explorer.initialize("q=MIT,Stanford&topic=T10017").await;
//!
//!     for term in explorer.terms().terms() {
//!         if let Some(institution) = term.data {
//!             println!("{}: {} works", institution.display_name, institution.works_count);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
#[cfg(feature = "cli")]
pub mod config;
pub mod data;
pub mod error;
pub mod explorer;
pub mod http;
pub mod openalex;
pub mod stores;
pub mod telemetry;
pub mod types;

/// Crate version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export main types at crate root
pub use cache::{CacheConfig, CacheService, CacheStats};
pub use data::InstitutionDataService;
pub use error::{OpenLensError, Result};
pub use explorer::{Explorer, ExplorerBuilder};
pub use http::{RequestScheduler, RetryConfig, RetryPolicy, SchedulerConfig};
pub use openalex::OpenAlexClient;
pub use types::{Institution, Term, TermType, Topic, WorksSummary};
