use nanoplex_domain::ContextSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evidence {
	pub url: String,
	pub text: String,
}

/// URL → page text in insertion order. Positions are 1-indexed and are what citation markers
/// refer to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvidenceMap {
	entries: Vec<Evidence>,
}
impl EvidenceMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// A repeated URL keeps its first position and takes the newest text. Returns `true` for a
	/// new key.
	pub fn insert(&mut self, url: impl Into<String>, text: impl Into<String>) -> bool {
		let url = url.into();
		let text = text.into();

		match self.entries.iter_mut().find(|entry| entry.url == url) {
			Some(existing) => {
				existing.text = text;

				false
			},
			None => {
				self.entries.push(Evidence { url, text });

				true
			},
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, url: &str) -> Option<&str> {
		self.entries.iter().find(|entry| entry.url == url).map(|entry| entry.text.as_str())
	}

	pub fn iter(&self) -> impl Iterator<Item = &Evidence> {
		self.entries.iter()
	}

	pub fn urls(&self) -> Vec<&str> {
		self.entries.iter().map(|entry| entry.url.as_str()).collect()
	}

	pub fn url_at(&self, position: usize) -> Option<&str> {
		position.checked_sub(1).and_then(|idx| self.entries.get(idx)).map(|entry| entry.url.as_str())
	}

	/// Model-facing view: every entry, numbered from 1, text cut to `max_chars` characters.
	pub fn context(&self, max_chars: usize) -> Vec<ContextSource<'_>> {
		self.entries
			.iter()
			.enumerate()
			.map(|(idx, entry)| ContextSource {
				position: idx + 1,
				url: &entry.url,
				excerpt: truncate_chars(&entry.text, max_chars),
			})
			.collect()
	}
}

pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
	match text.char_indices().nth(max_chars) {
		Some((end, _)) => &text[..end],
		None => text,
	}
}
