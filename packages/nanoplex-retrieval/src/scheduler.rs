use std::sync::Arc;

use tokio::{sync::Semaphore, task::JoinSet, time::Instant};

use crate::{Deadline, EvidenceMap, FailureReason, FetchOutcome, PageSource};

/// Fetches candidate URLs concurrently and keeps whatever succeeds.
///
/// At most `parallelism` fetches are in flight. Outcomes are folded into the evidence map by
/// this task alone, in completion order, so the map's order is a property of the run rather
/// than of the input.
#[derive(Clone)]
pub struct RetrievalScheduler {
	source: Arc<dyn PageSource>,
	parallelism: usize,
}
impl RetrievalScheduler {
	pub fn new(source: Arc<dyn PageSource>, parallelism: usize) -> Self {
		Self { source, parallelism: parallelism.max(1) }
	}

	pub fn parallelism(&self) -> usize {
		self.parallelism
	}

	/// Waits for every dispatched fetch. Never fails: failures only shrink the result.
	pub async fn retrieve(&self, urls: Vec<String>, deadline: Deadline) -> EvidenceMap {
		let mut evidence = EvidenceMap::new();

		if urls.is_empty() {
			return evidence;
		}

		let started = Instant::now();
		let requested = urls.len();
		let permits = Arc::new(Semaphore::new(self.parallelism));
		let mut tasks = JoinSet::new();

		for url in urls {
			let source = self.source.clone();
			let permits = permits.clone();

			tasks.spawn(async move {
				let Ok(_permit) = permits.acquire_owned().await else {
					let reason = FailureReason::Network { message: "Fetch pool closed.".to_string() };

					return FetchOutcome::Failure { url, reason };
				};

				source.fetch_page(&url, deadline).await
			});
		}

		let mut failed = 0_usize;
		let mut empty = 0_usize;

		while let Some(joined) = tasks.join_next().await {
			match joined {
				Ok(FetchOutcome::Success { url, text }) => {
					if text.is_empty() {
						tracing::debug!(url = %url, "Page has no paragraph text.");

						empty += 1;

						continue;
					}

					tracing::debug!(url = %url, chars = text.chars().count(), "Page fetched.");

					evidence.insert(url, text);
				},
				Ok(FetchOutcome::Failure { url, reason }) => {
					tracing::warn!(url = %url, kind = reason.kind(), reason = %reason, "Page fetch failed.");

					failed += 1;
				},
				Err(err) => {
					tracing::warn!(error = %err, "Page fetch task did not finish.");

					failed += 1;
				},
			}
		}

		tracing::info!(
			requested,
			kept = evidence.len(),
			failed,
			empty,
			elapsed_ms = started.elapsed().as_millis() as u64,
			"Retrieval finished."
		);

		evidence
	}
}
