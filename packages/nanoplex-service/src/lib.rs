pub mod answer;

mod error;

pub use answer::Answer;
pub use error::{Error, Result};
pub use nanoplex_retrieval::BoxFuture;

use std::sync::Arc;

use nanoplex_config::Config;
use nanoplex_domain::ChatMessage;
use nanoplex_providers::{
	chat::{ChatClient, ChatCompletion},
	search::WebSearch,
};
use nanoplex_retrieval::{PageFetcher, PageSource};

pub trait ChatProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, nanoplex_providers::Result<ChatCompletion>>;
}

pub trait SearchProvider
where
	Self: Send + Sync,
{
	fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, nanoplex_providers::Result<Vec<String>>>;
}

pub struct Providers {
	pub chat: Arc<dyn ChatProvider>,
	pub search: Arc<dyn SearchProvider>,
	pub pages: Arc<dyn PageSource>,
}
impl Providers {
	pub fn new(
		chat: Arc<dyn ChatProvider>,
		search: Arc<dyn SearchProvider>,
		pages: Arc<dyn PageSource>,
	) -> Self {
		Self { chat, search, pages }
	}

	/// The HTTP-backed providers described by `cfg`. Built once per run.
	pub fn from_config(cfg: &Config) -> Result<Self> {
		let chat = ChatClient::new(&cfg.llm)?;
		let search = WebSearch::new(&cfg.search, &cfg.service.user_agent)?;
		let pages = PageFetcher::new(&cfg.service.user_agent, cfg.retrieval.fetch_timeout())?;

		Ok(Self::new(Arc::new(chat), Arc::new(search), Arc::new(pages)))
	}
}

pub struct AnswerService {
	pub cfg: Config,
	pub providers: Providers,
}
impl AnswerService {
	pub fn new(cfg: Config) -> Result<Self> {
		let providers = Providers::from_config(&cfg)?;

		Ok(Self { cfg, providers })
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers }
	}
}

impl ChatProvider for ChatClient {
	fn complete<'a>(
		&'a self,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, nanoplex_providers::Result<ChatCompletion>> {
		Box::pin(ChatClient::complete(self, messages))
	}
}

impl SearchProvider for WebSearch {
	fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, nanoplex_providers::Result<Vec<String>>> {
		Box::pin(WebSearch::search(self, query))
	}
}
