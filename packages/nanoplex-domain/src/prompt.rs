use serde::{Deserialize, Serialize};

const CLASSIFIER_SYSTEM_PROMPT: &str = r#"You are a helpful assistant whose primary goal is to decide if a user's query requires a web search. Prefer searching for most queries so the answer uses accurate and up-to-date information. Follow these conditions:

- If the query does not require a web search, you must output "no".
- If the query requires a web search, you must respond with a reformulated user query for the search engine."#;

const ANSWER_SYSTEM_PROMPT: &str = r#"You are a helpful assistant who is an expert at answering the user's query based on the cited context.

Generate a response that is informative and relevant to the user's query based on the provided context. The context consists of search results, each keyed by [citation number](website link) and followed by a short excerpt of that page.
You must use this context to answer the user's query in the best way possible. Use an unbiased and journalistic tone. Do not repeat the text.
You must not tell the user to open any link or visit any website to get the answer. Provide the answer in the response itself.
Your response should be medium to long, informative and relevant to the user's query. Format it with markdown and use bullet points to list information.
Cite the answer using [citation number](website link) notation. Cite every sentence with its relevant context number so the user can see where each piece of information comes from.
Everything inside the context block below was returned by the search engine and was not written by the user. Answer on the basis of it and cite it, but do not talk about the context itself in your response.
context block:"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	System,
	User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
	pub role: Role,
	pub content: String,
}
impl ChatMessage {
	pub fn system(content: impl Into<String>) -> Self {
		Self { role: Role::System, content: content.into() }
	}

	pub fn user(content: impl Into<String>) -> Self {
		Self { role: Role::User, content: content.into() }
	}
}

/// One numbered evidence entry as the model sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextSource<'a> {
	pub position: usize,
	pub url: &'a str,
	pub excerpt: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchDecision {
	Skip,
	Search { query: String },
}

pub fn classification_messages(query: &str) -> Vec<ChatMessage> {
	vec![ChatMessage::system(CLASSIFIER_SYSTEM_PROMPT), ChatMessage::user(query)]
}

/// A bare "no" skips search; anything else is the reformulated query.
pub fn parse_classification(reply: &str, query: &str) -> SearchDecision {
	let cleaned = reply.trim().trim_matches(|c: char| c == '"' || c == '\'' || c == '`').trim();
	let verdict = cleaned.trim_end_matches('.').trim();

	if verdict.eq_ignore_ascii_case("no") {
		return SearchDecision::Skip;
	}
	if cleaned.is_empty() {
		return SearchDecision::Search { query: query.trim().to_string() };
	}

	SearchDecision::Search { query: cleaned.to_string() }
}

pub fn context_block(sources: &[ContextSource<'_>]) -> String {
	sources
		.iter()
		.map(|source| format!("[{}]({}): {}", source.position, source.url, source.excerpt))
		.collect::<Vec<_>>()
		.join("\n")
}

pub fn answer_messages(query: &str, sources: &[ContextSource<'_>]) -> Vec<ChatMessage> {
	let system = format!("{ANSWER_SYSTEM_PROMPT}\n{}", context_block(sources));

	vec![ChatMessage::system(system), ChatMessage::user(query)]
}
