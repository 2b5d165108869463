use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        invalid_config_error(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        io_error(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.code {
            1..=99 => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
            200..=299 => (StatusCode::SERVICE_UNAVAILABLE, self.message.as_str()),
            _ => (StatusCode::BAD_REQUEST, self.message.as_str()),
        };

        let body = Json(json!({
            "code": self.code,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        code: 101,
        message: "invalid input".into(),
    }
}

pub fn missing_location_error() -> Error {
    Error {
        code: 102,
        message: "pickup and dropoff locations are required".into(),
    }
}

pub fn invalid_coordinates_error() -> Error {
    Error {
        code: 103,
        message: "location coordinates are out of range".into(),
    }
}

pub fn no_fares_error() -> Error {
    Error {
        code: 200,
        message: "no fares are available for this route".into(),
    }
}

pub fn env_var_error(_: env::VarError) -> Error {
    Error {
        code: 1,
        message: "environment variable error".into(),
    }
}

pub fn reqwest_error(_: reqwest::Error) -> Error {
    Error {
        code: 3,
        message: "reqwest error".into(),
    }
}

pub fn upstream_error() -> Error {
    Error {
        code: 4,
        message: "upstream error".into(),
    }
}

pub fn unexpected_error() -> Error {
    Error {
        code: 5,
        message: "unexpected error".into(),
    }
}

pub fn invalid_config_error(detail: impl Into<String>) -> Error {
    Error {
        code: 6,
        message: format!("invalid configuration: {}", detail.into()),
    }
}

pub fn io_error(err: std::io::Error) -> Error {
    Error {
        code: 7,
        message: format!("io error: {}", err),
    }
}

/// Failure of a single fallback tier for one provider. Never surfaced to
/// callers directly; the pipeline records it and moves to the next tier.
#[derive(Clone, Debug, PartialEq)]
pub enum ProviderError {
    Timeout(Duration),
    Upstream(String),
    UnsupportedCity(String),
    Blocked,
    Malformed(String),
    Empty,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(budget) => write!(f, "timed out after {}ms", budget.as_millis()),
            Self::Upstream(reason) => write!(f, "upstream unavailable: {}", reason),
            Self::UnsupportedCity(city) => write!(f, "city {} is not served", city),
            Self::Blocked => write!(f, "request was blocked"),
            Self::Malformed(reason) => write!(f, "malformed response: {}", reason),
            Self::Empty => write!(f, "response contained no usable rides"),
        }
    }
}

impl std::error::Error for ProviderError {}

#[test]
fn error_status_mapping_test() {
    let response = invalid_input_error().into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = no_fares_error().into_response();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = upstream_error().into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
