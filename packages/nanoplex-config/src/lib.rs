mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, DEFAULT_LLM_API_BASE, DEFAULT_SEARCH_ENDPOINT, DEFAULT_USER_AGENT, LlmProviderConfig,
	Output, Retrieval, SearchProviderConfig, Service,
};

use std::{env, fs, path::Path};

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_API_BASE: &str = "OPENAI_BASE_URL";
pub const ENV_MODEL: &str = "LLM_MODEL";
pub const ENV_LOG: &str = "NANOPLEX_LOG";

const MAX_SEARCH_RESULTS: u32 = 50;

/// Loads the optional config file, layers the process environment on top, then validates.
pub fn load(path: Option<&Path>) -> Result<Config> {
	let mut cfg = match path {
		Some(path) => {
			let raw = fs::read_to_string(path)
				.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

			toml::from_str(&raw)
				.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?
		},
		None => Config::default(),
	};

	apply_env(&mut cfg, |key| env::var(key).ok());
	normalize(&mut cfg);
	validate(&cfg)?;

	Ok(cfg)
}

/// Environment values win over the file. Blank values are ignored.
pub fn apply_env<F>(cfg: &mut Config, lookup: F)
where
	F: Fn(&str) -> Option<String>,
{
	let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

	if let Some(key) = read(ENV_API_KEY) {
		cfg.llm.api_key = key;
	}
	if let Some(base) = read(ENV_API_BASE) {
		cfg.llm.api_base = base;
	}
	if let Some(model) = read(ENV_MODEL) {
		cfg.llm.model = model;
	}
	if let Some(level) = read(ENV_LOG) {
		cfg.service.log_level = level;
	}
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.llm.api_key.trim().is_empty() {
		return Err(Error::MissingCredential { field: "llm.api_key", env: ENV_API_KEY });
	}
	if cfg.llm.model.trim().is_empty() {
		return Err(Error::MissingModel { field: "llm.model", env: ENV_MODEL });
	}
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}

	for (label, value) in [
		("llm.api_base", &cfg.llm.api_base),
		("llm.path", &cfg.llm.path),
		("search.endpoint", &cfg.search.endpoint),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.llm.max_tokens == 0 {
		return Err(Error::Validation {
			message: "llm.max_tokens must be greater than zero.".to_string(),
		});
	}
	if let Some(temperature) = cfg.llm.temperature
		&& !(temperature.is_finite() && (0.0..=2.0).contains(&temperature))
	{
		return Err(Error::Validation {
			message: "llm.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}
	if cfg.llm.default_headers.values().any(|value| !value.is_string()) {
		return Err(Error::Validation {
			message: "llm.default_headers values must be strings.".to_string(),
		});
	}
	if cfg.search.num_results == 0 {
		return Err(Error::Validation {
			message: "search.num_results must be greater than zero.".to_string(),
		});
	}
	if cfg.search.num_results > MAX_SEARCH_RESULTS {
		return Err(Error::Validation {
			message: format!("search.num_results must be {MAX_SEARCH_RESULTS} or less."),
		});
	}

	for (label, value) in [
		("llm.timeout_ms", cfg.llm.timeout_ms),
		("search.timeout_ms", cfg.search.timeout_ms),
		("retrieval.fetch_timeout_ms", cfg.retrieval.fetch_timeout_ms),
		("retrieval.total_timeout_ms", cfg.retrieval.total_timeout_ms),
	] {
		if value == 0 {
			return Err(Error::Validation { message: format!("{label} must be greater than zero.") });
		}
	}

	if cfg.retrieval.max_content_chars == 0 {
		return Err(Error::Validation {
			message: "retrieval.max_content_chars must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.llm.api_base.trim().is_empty() {
		cfg.llm.api_base = DEFAULT_LLM_API_BASE.to_string();
	}

	let trimmed = cfg.llm.api_base.trim().trim_end_matches('/').to_string();

	cfg.llm.api_base = trimmed;
	cfg.llm.api_key = cfg.llm.api_key.trim().to_string();
	cfg.llm.model = cfg.llm.model.trim().to_string();

	if !cfg.llm.path.is_empty() && !cfg.llm.path.starts_with('/') {
		cfg.llm.path.insert(0, '/');
	}
	if cfg.service.user_agent.trim().is_empty() {
		cfg.service.user_agent = DEFAULT_USER_AGENT.to_string();
	}
}
