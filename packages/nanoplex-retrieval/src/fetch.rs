use std::{fmt, time::Duration};

use reqwest::Client;
use scraper::{Html, Selector};
use tokio::time;

use crate::{BoxFuture, Deadline, PageSource, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
	/// Connection, DNS, malformed response, or unreadable body.
	Network { message: String },
	/// 4xx or 5xx.
	Http { status: u16 },
	/// The per-item timeout or the global deadline elapsed first.
	Timeout,
}
impl FailureReason {
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Network { .. } => "network-error",
			Self::Http { .. } => "http-error",
			Self::Timeout => "timeout",
		}
	}
}
impl fmt::Display for FailureReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Network { message } => write!(f, "network-error: {message}"),
			Self::Http { status } => write!(f, "http-error: status {status}"),
			Self::Timeout => f.write_str("timeout"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
	Success { url: String, text: String },
	Failure { url: String, reason: FailureReason },
}

/// Fetches one page over HTTP and reduces it to its paragraph text. Never retries.
#[derive(Debug, Clone)]
pub struct PageFetcher {
	http: Client,
	timeout: Duration,
}
impl PageFetcher {
	pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
		let http = Client::builder().user_agent(user_agent).timeout(timeout).build()?;

		Ok(Self { http, timeout })
	}

	pub async fn fetch(&self, url: &str, deadline: Deadline) -> FetchOutcome {
		let Some(budget) = deadline.bound(self.timeout) else {
			tracing::debug!(url, "Skipping fetch after the retrieval deadline.");

			return failure(url, FailureReason::Timeout);
		};

		tracing::debug!(url, budget_ms = budget.as_millis() as u64, "Fetching page.");

		// The request timeout bounds the socket I/O; the race bounds everything else.
		let request = self.request_body(url, budget);

		match time::timeout_at(deadline.instant(), request).await {
			Err(_) => failure(url, FailureReason::Timeout),
			Ok(Err(err)) => failure(url, classify(&err)),
			Ok(Ok(Err(reason))) => failure(url, reason),
			Ok(Ok(Ok(body))) => {
				let text = extract_paragraph_text(&body);

				FetchOutcome::Success { url: url.to_string(), text }
			},
		}
	}

	async fn request_body(
		&self,
		url: &str,
		budget: Duration,
	) -> reqwest::Result<std::result::Result<String, FailureReason>> {
		let res = self.http.get(url).timeout(budget).send().await?;
		let status = res.status();

		if status.is_client_error() || status.is_server_error() {
			return Ok(Err(FailureReason::Http { status: status.as_u16() }));
		}

		Ok(Ok(res.text().await?))
	}
}
impl PageSource for PageFetcher {
	fn fetch_page<'a>(&'a self, url: &'a str, deadline: Deadline) -> BoxFuture<'a, FetchOutcome> {
		Box::pin(self.fetch(url, deadline))
	}
}

/// Text of every `<p>`, whitespace collapsed, joined by single spaces.
pub fn extract_paragraph_text(html: &str) -> String {
	let Ok(selector) = Selector::parse("p") else {
		return String::new();
	};
	let doc = Html::parse_document(html);

	doc.select(&selector)
		.map(|paragraph| paragraph.text().collect::<String>())
		.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
		.filter(|text| !text.is_empty())
		.collect::<Vec<_>>()
		.join(" ")
}

fn classify(err: &reqwest::Error) -> FailureReason {
	if err.is_timeout() {
		return FailureReason::Timeout;
	}
	if let Some(status) = err.status() {
		return FailureReason::Http { status: status.as_u16() };
	}

	FailureReason::Network { message: err.to_string() }
}

fn failure(url: &str, reason: FailureReason) -> FetchOutcome {
	FetchOutcome::Failure { url: url.to_string(), reason }
}
