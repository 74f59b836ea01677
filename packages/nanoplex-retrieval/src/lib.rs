//! Deadline-bounded concurrent page retrieval.
//!
//! A [`RetrievalScheduler`] runs one fetch per candidate URL through a [`PageSource`] (normally
//! the HTTP [`PageFetcher`]) and folds the successful outcomes into an [`EvidenceMap`]. A single
//! [`Deadline`] bounds the whole phase and dominates every per-item timeout.

pub mod deadline;
pub mod evidence;
pub mod fetch;
pub mod scheduler;

mod error;

pub use deadline::Deadline;
pub use error::{Error, Result};
pub use evidence::{Evidence, EvidenceMap, truncate_chars};
pub use fetch::{FailureReason, FetchOutcome, PageFetcher, extract_paragraph_text};
pub use scheduler::RetrievalScheduler;

use std::{future::Future, pin::Pin};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Anything that can turn a URL into a fetch outcome before `deadline`.
pub trait PageSource
where
	Self: Send + Sync,
{
	fn fetch_page<'a>(&'a self, url: &'a str, deadline: Deadline) -> BoxFuture<'a, FetchOutcome>;
}
