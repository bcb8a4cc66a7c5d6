//! Error types for the dialogue engine.

use yaad_core::error::YaadError;

/// Errors raised while handling a turn. The skill turns every one of these
/// into a spoken apology.
#[derive(Debug, thiserror::Error)]
pub enum DialogueError {
    #[error("storage error: {0}")]
    StorageError(String),
}

impl From<YaadError> for DialogueError {
    fn from(err: YaadError) -> Self {
        DialogueError::StorageError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialogue_error_display() {
        let err = DialogueError::StorageError("lock poisoned".to_string());
        assert_eq!(err.to_string(), "storage error: lock poisoned");
    }

    #[test]
    fn test_dialogue_error_from_yaad_error() {
        let err: DialogueError = YaadError::Storage("disk full".to_string()).into();
        assert!(matches!(err, DialogueError::StorageError(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
