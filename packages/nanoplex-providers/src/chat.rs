use std::time::Duration;

use reqwest::{Client, header::HeaderMap};
use serde::Deserialize;
use serde_json::Value;

use nanoplex_config::LlmProviderConfig;
use nanoplex_domain::ChatMessage;

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
	pub prompt_tokens: Option<u64>,
	pub completion_tokens: Option<u64>,
	pub total_tokens: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCompletion {
	pub content: String,
	pub usage: Option<Usage>,
}

/// One configured chat endpoint, built at startup and shared by every call in a run.
#[derive(Debug, Clone)]
pub struct ChatClient {
	http: Client,
	url: String,
	headers: HeaderMap,
	model: String,
	max_tokens: u32,
	temperature: Option<f32>,
}
impl ChatClient {
	pub fn new(cfg: &LlmProviderConfig) -> Result<Self> {
		let http = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
		let headers = crate::auth_headers(&cfg.api_key, &cfg.default_headers)?;

		Ok(Self {
			http,
			url: format!("{}{}", cfg.api_base, cfg.path),
			headers,
			model: cfg.model.clone(),
			max_tokens: cfg.max_tokens,
			temperature: cfg.temperature,
		})
	}

	pub async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatCompletion> {
		let mut body = serde_json::json!({
			"model": self.model,
			"max_tokens": self.max_tokens,
			"messages": messages,
		});

		if let Some(temperature) = self.temperature {
			body["temperature"] = serde_json::json!(temperature);
		}

		let res =
			self.http.post(&self.url).headers(self.headers.clone()).json(&body).send().await?;
		let json: Value = res.error_for_status()?.json().await?;
		let completion = parse_chat_response(json)?;

		if let Some(usage) = completion.usage.as_ref() {
			tracing::info!(
				model = %self.model,
				prompt_tokens = ?usage.prompt_tokens,
				completion_tokens = ?usage.completion_tokens,
				total_tokens = ?usage.total_tokens,
				"Chat completion finished."
			);
		}

		Ok(completion)
	}
}

fn parse_chat_response(json: Value) -> Result<ChatCompletion> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Chat response is missing choices[0].message.content.".to_string(),
		})?
		.to_string();
	let usage = match json.get("usage") {
		Some(raw) if !raw.is_null() => Some(serde_json::from_value(raw.clone())?),
		_ => None,
	};

	Ok(ChatCompletion { content, usage })
}
