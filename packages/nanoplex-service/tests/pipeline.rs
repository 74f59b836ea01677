use std::{
	collections::{HashMap, VecDeque},
	env, fs,
	path::PathBuf,
	sync::{
		Arc, Mutex,
		atomic::{AtomicU64, AtomicUsize, Ordering},
	},
	time::{SystemTime, UNIX_EPOCH},
};

use nanoplex_config::Config;
use nanoplex_domain::{ChatMessage, SearchDecision, SourceLine};
use nanoplex_providers::chat::ChatCompletion;
use nanoplex_retrieval::{Deadline, FailureReason, FetchOutcome, PageSource};
use nanoplex_service::{
	AnswerService, BoxFuture, ChatProvider, Error, Providers, SearchProvider,
};

static DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replies in order; the first call is classification, the second is generation.
struct ScriptedChat {
	replies: Mutex<VecDeque<String>>,
	seen: Mutex<Vec<Vec<ChatMessage>>>,
}
impl ScriptedChat {
	fn new(replies: &[&str]) -> Self {
		Self {
			replies: Mutex::new(replies.iter().map(|reply| reply.to_string()).collect()),
			seen: Mutex::new(Vec::new()),
		}
	}

	fn calls(&self) -> Vec<Vec<ChatMessage>> {
		self.seen.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl ChatProvider for ScriptedChat {
	fn complete<'a>(
		&'a self,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, nanoplex_providers::Result<ChatCompletion>> {
		Box::pin(async move {
			self.seen.lock().unwrap_or_else(|err| err.into_inner()).push(messages.to_vec());

			let reply = self.replies.lock().unwrap_or_else(|err| err.into_inner()).pop_front();

			match reply {
				Some(content) => Ok(ChatCompletion { content, usage: None }),
				None => Err(nanoplex_providers::Error::InvalidResponse {
					message: "No scripted reply left.".to_string(),
				}),
			}
		})
	}
}

struct StaticSearch {
	urls: Option<Vec<String>>,
	calls: AtomicUsize,
	last_query: Mutex<Option<String>>,
}
impl StaticSearch {
	fn returning(urls: &[&str]) -> Self {
		Self {
			urls: Some(urls.iter().map(|url| url.to_string()).collect()),
			calls: AtomicUsize::new(0),
			last_query: Mutex::new(None),
		}
	}

	fn failing() -> Self {
		Self { urls: None, calls: AtomicUsize::new(0), last_query: Mutex::new(None) }
	}
}
impl SearchProvider for StaticSearch {
	fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, nanoplex_providers::Result<Vec<String>>> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);
			*self.last_query.lock().unwrap_or_else(|err| err.into_inner()) = Some(query.to_string());

			self.urls.clone().ok_or_else(|| nanoplex_providers::Error::InvalidResponse {
				message: "Search endpoint unavailable.".to_string(),
			})
		})
	}
}

/// Pages keyed by URL; anything unknown is a 404.
struct StaticPages {
	pages: HashMap<String, String>,
	calls: AtomicUsize,
}
impl StaticPages {
	fn new(pages: &[(&str, &str)]) -> Self {
		Self {
			pages: pages.iter().map(|(url, text)| (url.to_string(), text.to_string())).collect(),
			calls: AtomicUsize::new(0),
		}
	}
}
impl PageSource for StaticPages {
	fn fetch_page<'a>(&'a self, url: &'a str, _deadline: Deadline) -> BoxFuture<'a, FetchOutcome> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);

			match self.pages.get(url) {
				Some(text) => FetchOutcome::Success { url: url.to_string(), text: text.clone() },
				None => FetchOutcome::Failure {
					url: url.to_string(),
					reason: FailureReason::Http { status: 404 },
				},
			}
		})
	}
}

fn service(
	chat: Arc<ScriptedChat>,
	search: Arc<StaticSearch>,
	pages: Arc<StaticPages>,
) -> AnswerService {
	let mut cfg = Config::default();

	cfg.llm.api_key = "test-key".to_string();
	cfg.llm.model = "test-model".to_string();
	cfg.retrieval.parallelism = 1;

	AnswerService::with_providers(cfg, Providers::new(chat, search, pages))
}

fn temp_dir() -> PathBuf {
	let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
	let counter = DIR_COUNTER.fetch_add(1, Ordering::Relaxed);

	env::temp_dir().join(format!("nanoplex_service_test_{nanos}_{counter}"))
}

#[tokio::test]
async fn skip_decision_answers_without_searching() {
	let chat = Arc::new(ScriptedChat::new(&["No.", "Two plus two is four."]));
	let search = Arc::new(StaticSearch::returning(&["https://unused.example"]));
	let pages = Arc::new(StaticPages::new(&[]));
	let service = service(chat.clone(), search.clone(), pages.clone());
	let answer = service.answer("What is 2 + 2?").await.expect("Answer failed.");

	assert_eq!(answer.decision, SearchDecision::Skip);
	assert_eq!(search.calls.load(Ordering::SeqCst), 0);
	assert_eq!(pages.calls.load(Ordering::SeqCst), 0);
	assert!(answer.evidence.is_empty());
	assert_eq!(answer.to_markdown(), "# What is 2 + 2?\n\n## Answer\nTwo plus two is four.");
	assert_eq!(chat.calls().len(), 2);
}

#[tokio::test]
async fn citations_are_renumbered_against_retrieved_sources() {
	let chat = Arc::new(ScriptedChat::new(&[
		"ferris mascot",
		"Ferris is a crab [3]. It is the Rust mascot [(1)][3].",
	]));
	let search = Arc::new(StaticSearch::returning(&[
		"https://a.example",
		"https://b.example",
		"https://missing.example",
		"https://c.example",
	]));
	let pages = Arc::new(StaticPages::new(&[
		("https://a.example", "Ferris is the Rust mascot."),
		("https://b.example", "Rust is a language."),
		("https://c.example", "Ferris is a crab."),
	]));
	let service = service(chat.clone(), search.clone(), pages);
	let answer = service.answer("Who is Ferris?").await.expect("Answer failed.");

	assert_eq!(answer.decision, SearchDecision::Search { query: "ferris mascot".to_string() });
	assert_eq!(
		search.last_query.lock().unwrap_or_else(|err| err.into_inner()).as_deref(),
		Some("ferris mascot")
	);
	assert_eq!(answer.evidence.len(), 3);
	// Distinct markers {1, 3} become {1 -> 1, 3 -> 2}.
	assert_eq!(answer.normalized.text, "Ferris is a crab [2]. It is the Rust mascot [1][2].");

	// With one fetch in flight, evidence order follows the search order.
	let expected_sources = "1. https://a.example\n2. https://c.example";

	assert_eq!(answer.sources.render(), expected_sources);
	assert!(answer.sources.faults().is_empty());
	assert!(answer.to_markdown().contains(&format!("## Sources\n{expected_sources}\n\n## Answer\n")));

	let generation = &chat.calls()[1];
	let context = &generation[0].content;

	assert!(context.contains("[1](https://a.example): Ferris is the Rust mascot."));
	assert!(context.contains("[2](https://b.example): Rust is a language."));
	assert!(context.contains("[3](https://c.example): Ferris is a crab."));
	assert_eq!(generation[1].content, "Who is Ferris?");
}

#[tokio::test]
async fn failed_retrieval_still_answers() {
	let chat = Arc::new(ScriptedChat::new(&["rust news", "Nothing was found."]));
	let search = Arc::new(StaticSearch::returning(&["https://gone.example"]));
	let pages = Arc::new(StaticPages::new(&[]));
	let service = service(chat, search, pages.clone());
	let answer = service.answer("Rust news").await.expect("Answer failed.");

	assert_eq!(pages.calls.load(Ordering::SeqCst), 1);
	assert!(answer.evidence.is_empty());
	assert!(answer.sources.is_empty());
	assert_eq!(answer.to_markdown(), "# Rust news\n\n## Answer\nNothing was found.");
}

#[tokio::test]
async fn search_failure_degrades_to_no_evidence() {
	let chat = Arc::new(ScriptedChat::new(&["rust news", "From memory only."]));
	let search = Arc::new(StaticSearch::failing());
	let pages = Arc::new(StaticPages::new(&[]));
	let service = service(chat, search.clone(), pages.clone());
	let answer = service.answer("Rust news").await.expect("Answer failed.");

	assert_eq!(search.calls.load(Ordering::SeqCst), 1);
	assert_eq!(pages.calls.load(Ordering::SeqCst), 0);
	assert!(answer.evidence.is_empty());
	assert_eq!(answer.normalized.text, "From memory only.");
}

#[tokio::test]
async fn hallucinated_citations_are_reported() {
	let chat = Arc::new(ScriptedChat::new(&["ferris", "Known [1]. Invented [7]."]));
	let search = Arc::new(StaticSearch::returning(&["https://a.example"]));
	let pages = Arc::new(StaticPages::new(&[("https://a.example", "Ferris.")]));
	let service = service(chat, search, pages);
	let answer = service.answer("Ferris").await.expect("Answer failed.");
	let faults = answer.sources.faults();

	assert_eq!(answer.normalized.text, "Known [1]. Invented [2].");
	assert_eq!(faults.len(), 1);
	assert_eq!((faults[0].old, faults[0].new, faults[0].available), (7, 2, 1));
	assert_eq!(answer.sources.lines()[1], SourceLine::Unresolved { new: 2, old: 7 });
}

#[tokio::test]
async fn search_results_are_capped_by_config() {
	let chat = Arc::new(ScriptedChat::new(&["q", "a"]));
	let urls: Vec<String> = (0..8).map(|idx| format!("https://{idx}.example")).collect();
	let url_refs: Vec<&str> = urls.iter().map(String::as_str).collect();
	let search = Arc::new(StaticSearch::returning(&url_refs));
	let pages = Arc::new(StaticPages::new(&[]));
	let mut service = service(chat, search, pages.clone());

	service.cfg.search.num_results = 3;
	service.answer("q").await.expect("Answer failed.");

	assert_eq!(pages.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn empty_query_is_rejected() {
	let chat = Arc::new(ScriptedChat::new(&[]));
	let service = service(
		chat.clone(),
		Arc::new(StaticSearch::returning(&[])),
		Arc::new(StaticPages::new(&[])),
	);
	let err = service.answer("   ").await.expect_err("Expected an empty query to fail.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
	assert!(chat.calls().is_empty());
}

#[tokio::test]
async fn chat_failure_is_fatal() {
	let chat = Arc::new(ScriptedChat::new(&["search me"]));
	let service = service(
		chat,
		Arc::new(StaticSearch::returning(&[])),
		Arc::new(StaticPages::new(&[])),
	);
	let err = service.answer("q").await.expect_err("Expected generation to fail.");

	assert!(matches!(err, Error::Provider { .. }));
}

#[tokio::test]
async fn saved_artifact_matches_rendered_markdown() {
	let chat = Arc::new(ScriptedChat::new(&["ferris", "Crab [1]."]));
	let search = Arc::new(StaticSearch::returning(&["https://a.example"]));
	let pages = Arc::new(StaticPages::new(&[("https://a.example", "Ferris.")]));
	let service = service(chat, search, pages);
	let answer = service.answer("What is AI/ML?").await.expect("Answer failed.");
	let dir = temp_dir();
	let path = answer.save(&dir).expect("Save failed.");

	assert_eq!(path, dir.join("What is AI_ML?.md"));
	assert_eq!(fs::read_to_string(&path).expect("Failed to read artifact."), answer.to_markdown());

	let _ = fs::remove_dir_all(&dir);
}
