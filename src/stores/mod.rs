//! Reactive state stores.
//!
//! Each store owns one piece of session state, publishes snapshots through
//! a `tokio::sync::watch` channel (`subscribe()` / `stream()`), and exposes
//! discrete mutators. Stores are plain values owned by an
//! [`Explorer`](crate::Explorer) session, not globals.
//!
//! - [`TermStore`]: comparison slots, drives institution fetches.
//! - [`TopicStore`]: the topic filter.
//! - [`LoadingStore`]: global loading flag and error message.
//!
//! URL synchronisation is one-way (store → [`Navigator`]) and replaces the
//! current history entry; see [`query`] for the parameter contract.

mod loading;
mod navigator;
pub mod query;
mod term;
mod topic;

pub use loading::{LoadingState, LoadingStore};
pub use navigator::{MemoryNavigator, Navigator};
pub use term::TermStore;
pub use topic::TopicStore;
