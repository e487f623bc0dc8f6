use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::report::{
    ImageError, LocationError, StoreError, SubmitError, UnknownVariant, ValidationError,
};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Store(StoreError),
    Submit(SubmitError),
    Location(LocationError),
    Image(ImageError),
    Input(UnknownVariant),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Store(err) => write!(f, "storage error: {}", err),
            AppError::Submit(err) => write!(f, "submission error: {}", err),
            AppError::Location(err) => write!(f, "location error: {}", err),
            AppError::Image(err) => write!(f, "image error: {}", err),
            AppError::Input(err) => write!(f, "invalid input: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Submit(err) => Some(err),
            AppError::Location(err) => Some(err),
            AppError::Image(err) => Some(err),
            AppError::Input(err) => Some(err),
        }
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

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<SubmitError> for AppError {
    fn from(value: SubmitError) -> Self {
        Self::Submit(value)
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        Self::Submit(SubmitError::Validation(value))
    }
}

impl From<LocationError> for AppError {
    fn from(value: LocationError) -> Self {
        Self::Location(value)
    }
}

impl From<ImageError> for AppError {
    fn from(value: ImageError) -> Self {
        Self::Image(value)
    }
}

impl From<UnknownVariant> for AppError {
    fn from(value: UnknownVariant) -> Self {
        Self::Input(value)
    }
}
