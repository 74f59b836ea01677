pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Failed to write answer to {path:?}.")]
	WriteArtifact { path: std::path::PathBuf, source: std::io::Error },
}
impl From<nanoplex_providers::Error> for Error {
	fn from(err: nanoplex_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<nanoplex_retrieval::Error> for Error {
	fn from(err: nanoplex_retrieval::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
