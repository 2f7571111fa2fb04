use core::fmt;

#[derive(Debug)]
pub enum AppError {
    Io(std::io::Error),
    Json(serde_json::Error),
    NotImplemented(String),
    Permission(String),
    StoreOperation(String),
    StoreUnavailable(String),
    Validation(String),
}

impl AppError {
    /// Machine-readable code sent back over the channel.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "INVALID_ARGUMENT",
            AppError::Permission(_) => "PERMISSION_DENIED",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::StoreOperation(_) | AppError::Io(_) | AppError::Json(_) => "STORE_ERROR",
            AppError::NotImplemented(_) => "NOT_IMPLEMENTED",
        }
    }

    pub fn missing_argument(key: &str) -> Self {
        AppError::Validation(format!("Missing argument: {}", key))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Json(err)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Io(e) => {
                write!(f, "I/O error while accessing the contacts store: {}", e)
            }
            AppError::Json(e) => {
                write!(f, "Invalid JSON: {}", e)
            }
            AppError::NotImplemented(method) => {
                write!(f, "Method '{}' is not implemented", method)
            }
            AppError::Permission(msg) => {
                write!(f, "{}", msg)
            }
            AppError::StoreOperation(msg) => {
                write!(f, "{}", msg)
            }
            AppError::StoreUnavailable(msg) => {
                write!(f, "{}", msg)
            }
            AppError::Validation(msg) => {
                write!(f, "{}", msg)
            }
        }
    }
}

impl std::error::Error for AppError {}
