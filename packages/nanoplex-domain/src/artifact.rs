const MAX_FILE_STEM_BYTES: usize = 200;
const FALLBACK_FILE_STEM: &str = "answer";

/// Markdown document for one run. `sources` is `None` when the answer cites nothing.
pub fn render_markdown(query: &str, sources: Option<&str>, answer: &str) -> String {
	match sources {
		Some(sources) => format!("# {query}\n\n## Sources\n{sources}\n\n## Answer\n{answer}"),
		None => format!("# {query}\n\n## Answer\n{answer}"),
	}
}

/// `{query}.md`, with characters that would escape the output directory replaced.
pub fn file_name(query: &str) -> String {
	let stem: String = query
		.trim()
		.chars()
		.map(|c| if matches!(c, '/' | '\\' | '\0') || c.is_control() { '_' } else { c })
		.collect();
	let mut end = stem.len().min(MAX_FILE_STEM_BYTES);

	while !stem.is_char_boundary(end) {
		end -= 1;
	}

	let stem = &stem[..end];

	if stem.is_empty() || stem.chars().all(|c| c == '.') {
		return format!("{FALLBACK_FILE_STEM}.md");
	}

	format!("{stem}.md")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn omits_sources_without_citations() {
		assert_eq!(render_markdown("q", None, "a"), "# q\n\n## Answer\na");
	}

	#[test]
	fn includes_sources_before_the_answer() {
		assert_eq!(
			render_markdown("q", Some("1. https://a.example"), "a [1]"),
			"# q\n\n## Sources\n1. https://a.example\n\n## Answer\na [1]"
		);
	}

	#[test]
	fn file_name_keeps_the_literal_query() {
		assert_eq!(file_name("What is Rust?"), "What is Rust?.md");
	}

	#[test]
	fn file_name_cannot_escape_the_directory() {
		assert_eq!(file_name("../etc/passwd"), ".._etc_passwd.md");
		assert_eq!(file_name(".."), "answer.md");
		assert_eq!(file_name("   "), "answer.md");
		assert_eq!(file_name("a\\b\nc"), "a_b_c.md");
	}

	#[test]
	fn file_name_is_bounded_on_a_char_boundary() {
		let name = file_name(&"é".repeat(150));

		assert!(name.len() <= MAX_FILE_STEM_BYTES + 3);
		assert!(name.ends_with(".md"));
	}
}
