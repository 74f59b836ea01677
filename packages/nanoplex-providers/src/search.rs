use std::time::Duration;

use reqwest::{Client, Url};
use scraper::{Html, Selector};

use nanoplex_config::SearchProviderConfig;

use crate::{Error, Result};

const RESULT_LINK_SELECTOR: &str = "a.result__a";
const REDIRECT_BASE: &str = "https://duckduckgo.com";

/// Web search over the DuckDuckGo HTML endpoint. Results keep the provider's order.
#[derive(Debug, Clone)]
pub struct WebSearch {
	http: Client,
	endpoint: String,
	num_results: usize,
}
impl WebSearch {
	pub fn new(cfg: &SearchProviderConfig, user_agent: &str) -> Result<Self> {
		let http = Client::builder()
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.user_agent(user_agent)
			.build()?;

		Ok(Self { http, endpoint: cfg.endpoint.clone(), num_results: cfg.num_results as usize })
	}

	pub async fn search(&self, query: &str) -> Result<Vec<String>> {
		let res = self
			.http
			.post(&self.endpoint)
			.form(&[("q", query)])
			.header("Accept", "text/html")
			.send()
			.await?;
		let body = res.error_for_status()?.text().await?;
		let urls = parse_result_links(&body, self.num_results)?;

		tracing::info!(query, results = urls.len(), "Web search finished.");

		Ok(urls)
	}
}

/// Extracts up to `limit` result URLs from a results page. `Html` is not `Send`, so this stays
/// synchronous and the document never lives across an await point.
pub fn parse_result_links(body: &str, limit: usize) -> Result<Vec<String>> {
	let selector = Selector::parse(RESULT_LINK_SELECTOR).map_err(|err| Error::InvalidConfig {
		message: format!("Invalid result selector: {err:?}."),
	})?;
	let doc = Html::parse_document(body);
	let urls = doc
		.select(&selector)
		.filter_map(|link| link.value().attr("href"))
		.filter_map(resolve_result_href)
		.take(limit)
		.collect();

	Ok(urls)
}

/// Result links are usually `//duckduckgo.com/l/?uddg=<target>`; anything that does not land
/// on an external http(s) page is dropped.
fn resolve_result_href(href: &str) -> Option<String> {
	let base = Url::parse(REDIRECT_BASE).ok()?;
	let url = base.join(href).ok()?;
	let target = match url.query_pairs().find(|(key, _)| key == "uddg") {
		Some((_, value)) => Url::parse(&value).ok()?,
		None => url,
	};

	if !matches!(target.scheme(), "http" | "https") {
		return None;
	}
	if target.host_str().map(|host| host.ends_with("duckduckgo.com")).unwrap_or(true) {
		return None;
	}

	Some(target.to_string())
}
