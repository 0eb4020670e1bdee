//! Error types for overlay rendering.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for overlay operations.
pub(crate) type OverlayResult<T> = Result<T, OverlayError>;

/// Everything a render attempt can report back to the user.
#[derive(Debug, Error)]
pub(crate) enum OverlayError {
    #[error("No audio track found to generate captions.")]
    NoAudioTrack,

    #[error("Overlay text is empty.")]
    EmptyOverlayText,

    #[error("{component} is not available in the linked FFmpeg libraries (libavcodec {version}); install an FFmpeg build that provides it")]
    MediaToolMissing { component: String, version: String },

    #[error("Failed to load font {path}: {message}")]
    FontLoad { path: PathBuf, message: String },

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("FFmpeg error: {0}")]
    Ffmpeg(#[from] ffmpeg_next::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OverlayError {
    /// Create a missing-component error tagged with the linked libavcodec version.
    pub(crate) fn media_tool_missing(component: impl Into<String>) -> Self {
        let version = ffmpeg_next::codec::version();
        Self::MediaToolMissing {
            component: component.into(),
            version: format!(
                "{}.{}.{}",
                version >> 16,
                (version >> 8) & 0xff,
                version & 0xff
            ),
        }
    }

    pub(crate) fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    pub(crate) fn transcription(message: impl Into<String>) -> Self {
        Self::Transcription(message.into())
    }

    /// Recover a domain error carried through `anyhow`, or flatten the chain into a render error.
    pub(crate) fn from_anyhow(error: anyhow::Error) -> Self {
        match error.downcast::<OverlayError>() {
            Ok(overlay) => overlay,
            Err(other) => match other.downcast::<ffmpeg_next::Error>() {
                Ok(ffmpeg) => Self::Ffmpeg(ffmpeg),
                Err(other) => Self::Render(format!("{other:#}")),
            },
        }
    }
}
