use std::fmt;

/// Pipeline stage a codec failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Tags,
    Audio,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Tags => "tags",
            Stage::Audio => "audio",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types for chapcut
#[derive(Debug)]
pub enum ChapcutError {
    /// File system related errors
    FileSystem { source: std::io::Error, path: std::path::PathBuf },

    /// FFmpeg/ffprobe process errors
    FFmpeg { message: String, stderr: Option<String> },

    /// Input could not be parsed by the tag or audio codec
    Decode { stage: Stage, message: String },

    /// Output could not be serialized by the tag or audio codec
    Encode { stage: Stage, message: String },

    /// Configuration validation errors
    Config { field: String, message: String },

    /// Unsupported file format
    UnsupportedFormat { extension: String, supported: Vec<String> },

    /// Missing external dependency
    MissingDependency { name: String, suggestion: String },

    /// General processing error
    Processing { message: String },
}

impl fmt::Display for ChapcutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChapcutError::FileSystem { source, path } => {
                write!(f, "File system error for '{}': {}", path.display(), source)
            }
            ChapcutError::FFmpeg { message, stderr } => {
                write!(f, "FFmpeg error: {}", message)?;
                if let Some(stderr) = stderr {
                    write!(f, "\nStderr: {}", stderr)?;
                }
                Ok(())
            }
            ChapcutError::Decode { stage, message } => {
                write!(f, "Failed to decode {}: {}", stage, message)
            }
            ChapcutError::Encode { stage, message } => {
                write!(f, "Failed to encode {}: {}", stage, message)
            }
            ChapcutError::Config { field, message } => {
                write!(f, "Configuration error in '{}': {}", field, message)
            }
            ChapcutError::UnsupportedFormat { extension, supported } => {
                write!(
                    f,
                    "Unsupported file format '{}'. Supported formats: {}",
                    extension,
                    supported.join(", ")
                )
            }
            ChapcutError::MissingDependency { name, suggestion } => {
                write!(f, "Missing dependency '{}': {}", name, suggestion)
            }
            ChapcutError::Processing { message } => {
                write!(f, "Processing error: {}", message)
            }
        }
    }
}

impl std::error::Error for ChapcutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChapcutError::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias for chapcut operations
pub type Result<T> = std::result::Result<T, ChapcutError>;

/// Helper function to create FFmpeg errors
pub fn ffmpeg_error(message: impl Into<String>, stderr: Option<String>) -> ChapcutError {
    ChapcutError::FFmpeg {
        message: message.into(),
        stderr,
    }
}

pub fn decode_error(stage: Stage, message: impl Into<String>) -> ChapcutError {
    ChapcutError::Decode {
        stage,
        message: message.into(),
    }
}

pub fn encode_error(stage: Stage, message: impl Into<String>) -> ChapcutError {
    ChapcutError::Encode {
        stage,
        message: message.into(),
    }
}

/// Helper function to create configuration errors
pub fn config_error(field: impl Into<String>, message: impl Into<String>) -> ChapcutError {
    ChapcutError::Config {
        field: field.into(),
        message: message.into(),
    }
}

/// Helper function to create file system errors
pub fn fs_error(source: std::io::Error, path: std::path::PathBuf) -> ChapcutError {
    ChapcutError::FileSystem { source, path }
}

/// Attach the offending path to io results
pub trait IntoChapcutError<T> {
    fn with_path(self, path: std::path::PathBuf) -> Result<T>;
}

impl<T> IntoChapcutError<T> for std::result::Result<T, std::io::Error> {
    fn with_path(self, path: std::path::PathBuf) -> Result<T> {
        self.map_err(|e| fs_error(e, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_decode_error_names_stage() {
        let err = decode_error(Stage::Audio, "no audio stream");
        assert_eq!(err.to_string(), "Failed to decode audio: no audio stream");

        let err = encode_error(Stage::Tags, "disk full");
        assert_eq!(err.to_string(), "Failed to encode tags: disk full");
    }

    #[test]
    fn test_ffmpeg_error_includes_stderr() {
        let err = ffmpeg_error("exit status 1", Some("Invalid data found".to_string()));
        let text = err.to_string();
        assert!(text.starts_with("FFmpeg error: exit status 1"));
        assert!(text.contains("Stderr: Invalid data found"));
    }

    #[test]
    fn test_fs_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Result<()> = Err(io).with_path("/tmp/missing.mp3".into());
        let err = err.unwrap_err();
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/tmp/missing.mp3"));
    }
}
