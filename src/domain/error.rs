//! Domain error types.

/// Top-level error type for stockscreen.
///
/// Per-symbol quote failures are not represented here: they are values
/// ([`crate::domain::quote::FetchError`]) handled inside the collection loop.
/// Only failures that end a run reach this type.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("storage error: {reason}")]
    Storage { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&CollectorError> for std::process::ExitCode {
    fn from(err: &CollectorError) -> Self {
        let code: u8 = match err {
            CollectorError::Io(_) => 1,
            CollectorError::ConfigParse { .. }
            | CollectorError::ConfigMissing { .. }
            | CollectorError::ConfigInvalid { .. } => 2,
            CollectorError::Storage { .. } => 3,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::ExitCode;

    #[test]
    fn storage_error_formats_reason() {
        let err = CollectorError::Storage {
            reason: "disk full".into(),
        };
        assert_eq!(err.to_string(), "storage error: disk full");
    }

    #[test]
    fn config_missing_names_section_and_key() {
        let err = CollectorError::ConfigMissing {
            section: "collector".into(),
            key: "output_file".into(),
        };
        assert_eq!(err.to_string(), "missing config key [collector] output_file");
    }

    #[test]
    fn exit_codes_by_category() {
        let io = CollectorError::Io(std::io::Error::other("x"));
        let config = CollectorError::ConfigMissing {
            section: "a".into(),
            key: "b".into(),
        };
        let storage = CollectorError::Storage { reason: "x".into() };

        assert_eq!(
            format!("{:?}", ExitCode::from(&io)),
            format!("{:?}", ExitCode::from(1u8))
        );
        assert_eq!(
            format!("{:?}", ExitCode::from(&config)),
            format!("{:?}", ExitCode::from(2u8))
        );
        assert_eq!(
            format!("{:?}", ExitCode::from(&storage)),
            format!("{:?}", ExitCode::from(3u8))
        );
    }
}
