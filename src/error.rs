use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("QR source unavailable: {0}")] SourceUnavailable(String),

    #[error("Badge decode failed: {0}")] BadgeDecodeFailed(String),

    #[error("Invalid platform: {0}")] InvalidPlatform(String),

    #[error("Invalid input: {0}")] InvalidInput(String),

    #[error("Image encode error: {0}")] Encode(String),

    #[error("IO error: {0}")] Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")] Config(String),

    #[error("Internal error: {0}")] Internal(String),
}

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl AppError {
    /// Stable machine-readable code for the outer UI layer.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::SourceUnavailable(_) => "SOURCE_UNAVAILABLE",
            AppError::BadgeDecodeFailed(_) => "BADGE_DECODE_FAILED",
            AppError::InvalidPlatform(_) => "INVALID_PLATFORM",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Encode(_) => "ENCODE_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the end user can fix this by retrying or changing input.
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::SourceUnavailable(_) | AppError::BadgeDecodeFailed(_) | AppError::Io(_)
        )
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
