//! Dense renumbering of `[k]` citation markers and the matching source list.
//!
//! Marker values are 1-indexed positions into the evidence URLs as they were listed in the
//! prompt. The model is free to cite any subset, in any order, any number of times; the
//! normalizer maps the distinct values it finds onto `1..=K` while keeping their relative order.

use std::{collections::BTreeSet, fmt, sync::LazyLock};

use regex::{Captures, Regex};

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\[\(?(\d+)\)?\]").expect("Citation marker pattern must compile.")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationEntry {
	pub old: usize,
	pub new: usize,
}

/// Order-preserving bijection from raw marker values to `1..=K`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitationMapping {
	entries: Vec<CitationEntry>,
}
impl CitationMapping {
	pub fn from_text(text: &str) -> Self {
		let distinct: BTreeSet<usize> = MARKER
			.captures_iter(text)
			.filter_map(|caps| marker_value(&caps))
			.collect();
		let entries = distinct
			.into_iter()
			.enumerate()
			.map(|(idx, old)| CitationEntry { old, new: idx + 1 })
			.collect();

		Self { entries }
	}

	pub fn entries(&self) -> &[CitationEntry] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, old: usize) -> Option<usize> {
		self.entries
			.binary_search_by_key(&old, |entry| entry.old)
			.ok()
			.map(|idx| self.entries[idx].new)
	}

	pub fn is_identity(&self) -> bool {
		self.entries.iter().all(|entry| entry.old == entry.new)
	}

	/// Rewrites every marker in one pass so a freshly written `[2]` is never renumbered again.
	pub fn apply(&self, text: &str) -> String {
		if self.is_empty() {
			return text.to_string();
		}

		MARKER
			.replace_all(text, |caps: &Captures| {
				match marker_value(caps).and_then(|old| self.get(old)) {
					Some(new) => format!("[{new}]"),
					None => caps[0].to_string(),
				}
			})
			.into_owned()
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAnswer {
	pub text: String,
	pub mapping: CitationMapping,
}

pub fn renumber_citations(text: &str) -> NormalizedAnswer {
	let mapping = CitationMapping::from_text(text);
	let text = mapping.apply(text);

	NormalizedAnswer { text, mapping }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLine {
	Resolved { new: usize, url: String },
	/// The model cited a position with no evidence behind it.
	Unresolved { new: usize, old: usize },
}
impl SourceLine {
	pub fn new_index(&self) -> usize {
		match self {
			Self::Resolved { new, .. } | Self::Unresolved { new, .. } => *new,
		}
	}
}
impl fmt::Display for SourceLine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Resolved { new, url } => write!(f, "{new}. {url}"),
			Self::Unresolved { new, old } => write!(f, "{new}. [unresolved citation {old}]"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationFault {
	pub old: usize,
	pub new: usize,
	pub available: usize,
}
impl fmt::Display for CitationFault {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"citation [{}] (renumbered [{}]) points past the {} available sources",
			self.old, self.new, self.available
		)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceList {
	lines: Vec<SourceLine>,
	available: usize,
}
impl SourceList {
	pub fn lines(&self) -> &[SourceLine] {
		&self.lines
	}

	pub fn is_empty(&self) -> bool {
		self.lines.is_empty()
	}

	pub fn faults(&self) -> Vec<CitationFault> {
		self.lines
			.iter()
			.filter_map(|line| match line {
				SourceLine::Unresolved { new, old } => {
					Some(CitationFault { old: *old, new: *new, available: self.available })
				},
				SourceLine::Resolved { .. } => None,
			})
			.collect()
	}

	pub fn render(&self) -> String {
		self.lines.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
	}
}

/// Resolves each old marker against `urls`, the evidence keys in the order they were prompted.
pub fn resolve_sources<S>(mapping: &CitationMapping, urls: &[S]) -> SourceList
where
	S: AsRef<str>,
{
	let lines = mapping
		.entries()
		.iter()
		.map(|entry| match urls.get(entry.old - 1) {
			Some(url) => SourceLine::Resolved { new: entry.new, url: url.as_ref().to_string() },
			None => SourceLine::Unresolved { new: entry.new, old: entry.old },
		})
		.collect();

	SourceList { lines, available: urls.len() }
}

/// Only positive values that fit a `usize` count as markers; `[0]` stays plain text.
fn marker_value(caps: &Captures) -> Option<usize> {
	caps.get(1)?.as_str().parse::<usize>().ok().filter(|value| *value > 0)
}
