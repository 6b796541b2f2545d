//! Error types for GoBus

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GobusError>;

#[derive(Error, Debug)]
pub enum GobusError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl GobusError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            GobusError::InvalidInput(_) => 3,
            GobusError::Api(ApiError::Unauthorized) => 2,
            GobusError::Api(_) => 1,
            GobusError::Config(_) => 1,
            GobusError::Storage(_) => 1,
            GobusError::Io(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database operation failed: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors surfaced by the backend API, classified by HTTP status at the
/// transport boundary. Every store action propagates these typed rather
/// than logging and swallowing them.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Session expired, please log in again")]
    Unauthorized,

    #[error("You are not allowed to perform this action")]
    Forbidden,

    #[error("Server error (HTTP {status})")]
    Server { status: u16 },

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Bad response from server: {0}")]
    Decode(String),

    #[error("Unexpected response (HTTP {status}): {message}")]
    Unexpected { status: u16, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_input() {
        let error = GobusError::InvalidInput("Email is required".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_unauthorized() {
        let error = GobusError::Api(ApiError::Unauthorized);
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_other_api_errors() {
        assert_eq!(GobusError::Api(ApiError::Forbidden).exit_code(), 1);
        assert_eq!(GobusError::Api(ApiError::Server { status: 502 }).exit_code(), 1);
        assert_eq!(GobusError::Api(ApiError::Timeout).exit_code(), 1);
        assert_eq!(
            GobusError::Api(ApiError::Network("connection refused".to_string())).exit_code(),
            1
        );
    }

    #[test]
    fn test_exit_code_config_error() {
        let config_error = ConfigError::MissingField("database.path".to_string());
        let error = GobusError::Config(config_error);
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_storage_error() {
        let db_error = DbError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "File not found",
        ));
        let error = GobusError::Storage(db_error);
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_io_error() {
        let error: GobusError =
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdin closed").into();
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_io_error_formatting_names_no_other_subsystem() {
        let error: GobusError =
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdin closed").into();
        assert!(matches!(error, GobusError::Io(_)));
        assert_eq!(format!("{}", error), "IO error: stdin closed");
    }

    #[test]
    fn test_error_message_formatting_invalid_input() {
        let error = GobusError::InvalidInput("Feedback message cannot be empty".to_string());
        assert_eq!(
            format!("{}", error),
            "Invalid input: Feedback message cannot be empty"
        );
    }

    #[test]
    fn test_error_message_formatting_unauthorized() {
        let error = GobusError::Api(ApiError::Unauthorized);
        assert_eq!(
            format!("{}", error),
            "API error: Session expired, please log in again"
        );
    }

    #[test]
    fn test_error_message_formatting_server() {
        let error = GobusError::Api(ApiError::Server { status: 503 });
        assert_eq!(format!("{}", error), "API error: Server error (HTTP 503)");
    }

    #[test]
    fn test_error_message_formatting_config() {
        let config_error = ConfigError::MissingField("api.base_url".to_string());
        let error = GobusError::Config(config_error);
        assert_eq!(
            format!("{}", error),
            "Configuration error: Missing required field: api.base_url"
        );
    }

    #[test]
    fn test_error_conversion_from_api_error() {
        let api_error = ApiError::Forbidden;
        let error: GobusError = api_error.into();
        assert!(matches!(error, GobusError::Api(_)));
    }

    #[test]
    fn test_error_conversion_from_db_error() {
        let db_error = DbError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "test"));
        let error: GobusError = db_error.into();
        assert!(matches!(error, GobusError::Storage(_)));
    }

    #[test]
    fn test_api_error_clone() {
        let original = ApiError::Unexpected {
            status: 418,
            message: "teapot".to_string(),
        };
        let cloned = original.clone();
        assert_eq!(format!("{}", original), format!("{}", cloned));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<String> {
            Ok("success".to_string())
        }

        fn returns_err() -> Result<String> {
            Err(GobusError::InvalidInput("test".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
