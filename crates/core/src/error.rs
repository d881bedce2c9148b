use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// Inbound frame is not a CDP command.
	#[error("malformed inspector message: {0}")]
	Malformed(#[source] serde_json::Error),

	#[error("invalid params for {method}: {source}")]
	InvalidParams {
		method: String,
		#[source]
		source: serde_json::Error,
	},

	#[error("'{0}' wasn't found")]
	UnknownMethod(String),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}
