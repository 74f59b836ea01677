pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Fixture server I/O failed: {0}.")]
	Io(#[from] std::io::Error),
}
