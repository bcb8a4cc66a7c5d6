use thiserror::Error;

/// Top-level error type for the Yaad skill.
///
/// Subsystem crates define their own error types and implement
/// `From<YaadError>` so that the `?` operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum YaadError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Durable store unavailable: {0}")]
    DurableUnavailable(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for YaadError {
    fn from(err: toml::de::Error) -> Self {
        YaadError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for YaadError {
    fn from(err: toml::ser::Error) -> Self {
        YaadError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for YaadError {
    fn from(err: serde_json::Error) -> Self {
        YaadError::Serialization(err.to_string())
    }
}

impl From<regex::Error> for YaadError {
    fn from(err: regex::Error) -> Self {
        YaadError::Config(format!("invalid vocabulary pattern: {}", err))
    }
}

/// A specialized `Result` type for Yaad operations.
pub type Result<T> = std::result::Result<T, YaadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = YaadError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(YaadError, &str)> = vec![
            (
                YaadError::Config("bad key".to_string()),
                "Configuration error: bad key",
            ),
            (
                YaadError::Storage("disk full".to_string()),
                "Storage error: disk full",
            ),
            (
                YaadError::DurableUnavailable("no table".to_string()),
                "Durable store unavailable: no table",
            ),
            (
                YaadError::MalformedRequest("no user".to_string()),
                "Malformed request: no user",
            ),
            (
                YaadError::Api("bind failed".to_string()),
                "API error: bind failed",
            ),
            (
                YaadError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: YaadError = io_err.into();
        assert!(matches!(err, YaadError::Io(_)));
        assert!(err.to_string().starts_with("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let yaad_err: YaadError = err.unwrap_err().into();
        assert!(matches!(yaad_err, YaadError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let yaad_err: YaadError = err.unwrap_err().into();
        assert!(matches!(yaad_err, YaadError::Serialization(_)));
    }

    #[test]
    fn test_error_from_regex() {
        let err = regex::Regex::new("(unclosed").unwrap_err();
        let yaad_err: YaadError = err.into();
        assert!(matches!(yaad_err, YaadError::Config(_)));
        assert!(yaad_err.to_string().contains("invalid vocabulary pattern"));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let value = io_result?;
            Ok(value.to_string())
        }

        assert_eq!(inner().unwrap(), "42");
    }
}
