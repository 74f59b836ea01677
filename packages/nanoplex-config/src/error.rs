pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read config file at {path:?}.")]
	ReadConfig { path: std::path::PathBuf, source: std::io::Error },
	#[error("Failed to parse config file at {path:?}.")]
	ParseConfig { path: std::path::PathBuf, source: toml::de::Error },
	#[error("{field} is not set. Set it in the config file or through the {env} environment variable.")]
	MissingCredential { field: &'static str, env: &'static str },
	#[error("{field} is not set. Set it in the config file or through the {env} environment variable.")]
	MissingModel { field: &'static str, env: &'static str },
	#[error("{message}")]
	Validation { message: String },
}
