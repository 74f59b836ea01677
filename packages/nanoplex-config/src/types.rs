use std::{path::PathBuf, time::Duration};

use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_LLM_API_BASE: &str = "http://127.0.0.1:8080/v1";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
pub const DEFAULT_USER_AGENT: &str =
	"Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	pub service: Service,
	pub llm: LlmProviderConfig,
	pub search: SearchProviderConfig,
	pub retrieval: Retrieval,
	pub output: Output,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Service {
	pub log_level: String,
	/// Sent on every outbound request except the language model calls.
	pub user_agent: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: "info".to_string(), user_agent: DEFAULT_USER_AGENT.to_string() }
	}
}

/// An OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub max_tokens: u32,
	pub temperature: Option<f32>,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}
impl Default for LlmProviderConfig {
	fn default() -> Self {
		Self {
			api_base: DEFAULT_LLM_API_BASE.to_string(),
			api_key: String::new(),
			path: "/chat/completions".to_string(),
			model: String::new(),
			max_tokens: 1_000,
			temperature: None,
			timeout_ms: 120_000,
			default_headers: Map::new(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchProviderConfig {
	pub endpoint: String,
	/// Upper bound on candidate URLs handed to retrieval.
	pub num_results: u32,
	pub timeout_ms: u64,
}
impl Default for SearchProviderConfig {
	fn default() -> Self {
		Self { endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(), num_results: 10, timeout_ms: 10_000 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	/// Budget for a single page fetch.
	pub fetch_timeout_ms: u64,
	/// Wall-clock budget for the whole retrieval phase. Dominates `fetch_timeout_ms`.
	pub total_timeout_ms: u64,
	/// Characters of each page shown to the language model.
	pub max_content_chars: u32,
	/// Concurrent fetches. Zero means the available hardware parallelism.
	pub parallelism: u32,
}
impl Retrieval {
	pub fn fetch_timeout(&self) -> Duration {
		Duration::from_millis(self.fetch_timeout_ms)
	}

	pub fn total_timeout(&self) -> Duration {
		Duration::from_millis(self.total_timeout_ms)
	}

	pub fn effective_parallelism(&self) -> usize {
		if self.parallelism > 0 {
			return self.parallelism as usize;
		}

		std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
	}
}
impl Default for Retrieval {
	fn default() -> Self {
		Self {
			fetch_timeout_ms: 3_000,
			total_timeout_ms: 6_000,
			max_content_chars: 500,
			parallelism: 0,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Output {
	pub dir: PathBuf,
}
impl Default for Output {
	fn default() -> Self {
		Self { dir: PathBuf::from(".") }
	}
}
