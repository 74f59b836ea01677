pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	/// A `usage` object that does not match the expected token counts.
	#[error("Malformed provider payload: {0}")]
	SerdeJson(#[from] serde_json::Error),
	#[error("Invalid header name in llm.default_headers: {0}")]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error("Invalid header value for a provider request: {0}")]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("Invalid provider configuration: {message}")]
	InvalidConfig { message: String },
	#[error("Invalid provider response: {message}")]
	InvalidResponse { message: String },
}
