use crate::config::ConfigError;
use crate::mastery::{BadgeConfigError, CatalogError, MasteryError, MasteryServiceError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Badges(BadgeConfigError),
    Catalog(CatalogError),
    Mastery(MasteryServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Badges(err) => write!(f, "badge table error: {}", err),
            AppError::Catalog(err) => write!(f, "lesson catalog error: {}", err),
            AppError::Mastery(err) => write!(f, "mastery error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Badges(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Mastery(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Mastery(MasteryServiceError::Mastery(MasteryError::InvalidInput(_))) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Mastery(MasteryServiceError::Mastery(MasteryError::NotFound(_))) => {
                StatusCode::NOT_FOUND
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Badges(_)
            | AppError::Catalog(_)
            | AppError::Mastery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<BadgeConfigError> for AppError {
    fn from(value: BadgeConfigError) -> Self {
        Self::Badges(value)
    }
}

impl From<CatalogError> for AppError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<MasteryServiceError> for AppError {
    fn from(value: MasteryServiceError) -> Self {
        Self::Mastery(value)
    }
}

impl From<MasteryError> for AppError {
    fn from(value: MasteryError) -> Self {
        Self::Mastery(MasteryServiceError::Mastery(value))
    }
}
