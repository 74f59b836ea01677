mod error;

pub use error::{Error, Result};

use std::{net::SocketAddr, time::Duration};

use axum::{
	Router,
	extract::Path,
	http::{StatusCode, header},
	response::{Html, IntoResponse},
	routing::get,
};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle, time};

pub const ARTICLE_HTML: &str = r#"<!doctype html>
<html>
	<head><title>Ferris</title></head>
	<body>
		<h1>Ferris the crab</h1>
		<p>Ferris is the unofficial mascot of Rust.</p>
		<div><p>Rustaceans <b>love</b> Ferris.</p></div>
		<footer>Not a paragraph.</footer>
	</body>
</html>"#;

/// Paragraph text of [`ARTICLE_HTML`] joined the way the page fetcher joins it.
pub const ARTICLE_TEXT: &str = "Ferris is the unofficial mascot of Rust. Rustaceans love Ferris.";

pub const NO_PARAGRAPHS_HTML: &str =
	"<html><body><h1>Heading only</h1><div>No paragraph elements here.</div></body></html>";

/// Local HTTP server for network tests. Shuts down when dropped.
pub struct FixtureServer {
	addr: SocketAddr,
	shutdown: Option<oneshot::Sender<()>>,
	handle: JoinHandle<()>,
}
impl FixtureServer {
	pub async fn start(router: Router) -> Result<Self> {
		let listener = TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let (shutdown, signal) = oneshot::channel::<()>();
		let handle = tokio::spawn(async move {
			let server = axum::serve(listener, router).with_graceful_shutdown(async move {
				let _ = signal.await;
			});

			if let Err(err) = server.await {
				eprintln!("Fixture server stopped with an error: {err}.");
			}
		});

		Ok(Self { addr, shutdown: Some(shutdown), handle })
	}

	/// Serves [`pages`].
	pub async fn pages() -> Result<Self> {
		Self::start(pages()).await
	}

	pub fn url(&self, path: &str) -> String {
		format!("http://{}/{}", self.addr, path.trim_start_matches('/'))
	}
}
impl Drop for FixtureServer {
	fn drop(&mut self) {
		if let Some(shutdown) = self.shutdown.take() {
			let _ = shutdown.send(());
		}

		self.handle.abort();
	}
}

/// Canned pages covering every fetch outcome:
///
/// - `/article`: two paragraphs, see [`ARTICLE_TEXT`]
/// - `/no-paragraphs`: a page without `<p>` elements
/// - `/missing`: 404
/// - `/broken`: 500
/// - `/slow/{ms}`: the article after `ms` milliseconds
/// - `/echo/{name}`: a single paragraph containing `name`
pub fn pages() -> Router {
	Router::new()
		.route("/article", get(|| async { Html(ARTICLE_HTML) }))
		.route("/no-paragraphs", get(|| async { Html(NO_PARAGRAPHS_HTML) }))
		.route("/missing", get(|| async { (StatusCode::NOT_FOUND, "not found") }))
		.route("/broken", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }))
		.route("/slow/{ms}", get(slow_article))
		.route("/echo/{name}", get(echo))
}

/// A URL on a port nothing listens on, for connection failures.
pub async fn unreachable_url() -> Result<String> {
	let listener = TcpListener::bind("127.0.0.1:0").await?;
	let addr = listener.local_addr()?;

	drop(listener);

	Ok(format!("http://{addr}/"))
}

async fn slow_article(Path(ms): Path<u64>) -> impl IntoResponse {
	time::sleep(Duration::from_millis(ms)).await;

	Html(ARTICLE_HTML)
}

async fn echo(Path(name): Path<String>) -> impl IntoResponse {
	(
		[(header::CONTENT_TYPE, "text/html; charset=utf-8")],
		format!("<html><body><p>{name}</p></body></html>"),
	)
}
