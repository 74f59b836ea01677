use std::{
	fs,
	path::{Path, PathBuf},
};

use nanoplex_domain::{
	NormalizedAnswer, SearchDecision, SourceList, artifact, prompt, renumber_citations,
	resolve_sources,
};
use nanoplex_providers::chat::Usage;
use nanoplex_retrieval::{Deadline, EvidenceMap, RetrievalScheduler};

use crate::{AnswerService, Error, Result};

/// Everything one query produced, ready to be rendered.
#[derive(Debug, Clone)]
pub struct Answer {
	pub query: String,
	pub decision: SearchDecision,
	pub evidence: EvidenceMap,
	pub raw_text: String,
	pub normalized: NormalizedAnswer,
	pub sources: SourceList,
	pub usage: Option<Usage>,
}
impl Answer {
	pub fn to_markdown(&self) -> String {
		let sources = (!self.normalized.mapping.is_empty()).then(|| self.sources.render());

		artifact::render_markdown(&self.query, sources.as_deref(), &self.normalized.text)
	}

	/// Writes `{query}.md` into `dir` and returns its path.
	pub fn save(&self, dir: &Path) -> Result<PathBuf> {
		let path = dir.join(artifact::file_name(&self.query));

		fs::create_dir_all(dir)
			.and_then(|()| fs::write(&path, self.to_markdown()))
			.map_err(|err| Error::WriteArtifact { path: path.clone(), source: err })?;

		Ok(path)
	}
}

impl AnswerService {
	pub async fn answer(&self, query: &str) -> Result<Answer> {
		let query = query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must be non-empty.".to_string() });
		}

		let decision = self.classify(query).await?;
		let evidence = match &decision {
			SearchDecision::Skip => {
				tracing::info!("No web search required.");

				EvidenceMap::new()
			},
			SearchDecision::Search { query: search_query } => self.gather_evidence(search_query).await,
		};
		let max_chars = self.cfg.retrieval.max_content_chars as usize;
		let messages = prompt::answer_messages(query, &evidence.context(max_chars));
		let completion = self.providers.chat.complete(&messages).await?;
		let normalized = renumber_citations(&completion.content);
		let sources = resolve_sources(&normalized.mapping, &evidence.urls());

		for fault in sources.faults() {
			tracing::warn!(
				old = fault.old,
				new = fault.new,
				available = fault.available,
				"Answer cites a source that was not retrieved."
			);
		}

		Ok(Answer {
			query: query.to_string(),
			decision,
			evidence,
			raw_text: completion.content,
			normalized,
			sources,
			usage: completion.usage,
		})
	}

	pub async fn classify(&self, query: &str) -> Result<SearchDecision> {
		let messages = prompt::classification_messages(query);
		let completion = self.providers.chat.complete(&messages).await?;
		let decision = prompt::parse_classification(&completion.content, query);

		tracing::debug!(reply = %completion.content, ?decision, "Query classified.");

		Ok(decision)
	}

	/// Search, then fetch. A failed search degrades to an answer without evidence.
	pub async fn gather_evidence(&self, search_query: &str) -> EvidenceMap {
		tracing::info!(query = search_query, "Performing web search.");

		let urls = match self.providers.search.search(search_query).await {
			Ok(urls) => urls,
			Err(err) => {
				tracing::warn!(error = %err, "Web search failed; answering without evidence.");

				return EvidenceMap::new();
			},
		};
		let limit = self.cfg.search.num_results as usize;
		let urls = urls.into_iter().take(limit).collect();

		self.retrieve(urls).await
	}

	/// The retrieval phase alone, under a fresh global deadline.
	pub async fn retrieve(&self, urls: Vec<String>) -> EvidenceMap {
		let deadline = Deadline::after(self.cfg.retrieval.total_timeout());
		let scheduler = RetrievalScheduler::new(
			self.providers.pages.clone(),
			self.cfg.retrieval.effective_parallelism(),
		);

		scheduler.retrieve(urls, deadline).await
	}
}
