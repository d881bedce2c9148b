use axum::extract::rejection::QueryRejection;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Reasons the relay refuses a connection before upgrading it.
#[derive(Debug, Error)]
pub enum RelayError {
	#[error("unknown connection kind '{0}'")]
	UnknownKind(String),

	#[error(transparent)]
	Query(#[from] QueryRejection),

	#[error(transparent)]
	Upgrade(#[from] WebSocketUpgradeRejection),
}

impl IntoResponse for RelayError {
	fn into_response(self) -> Response {
		match self {
			RelayError::UnknownKind(_) => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
			RelayError::Query(rejection) => rejection.into_response(),
			RelayError::Upgrade(rejection) => rejection.into_response(),
		}
	}
}
