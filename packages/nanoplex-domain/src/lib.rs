pub mod artifact;
pub mod citation;
pub mod prompt;

pub use citation::{
	CitationEntry, CitationFault, CitationMapping, NormalizedAnswer, SourceLine, SourceList,
	renumber_citations, resolve_sources,
};
pub use prompt::{ChatMessage, ContextSource, Role, SearchDecision};
