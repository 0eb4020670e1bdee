//! Speech-to-text through the OpenAI transcription endpoint.

use std::path::Path;
use std::sync::OnceLock;

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    AudioResponseFormat, CreateTranscriptionRequestArgs, TimestampGranularity,
};
use async_openai::Client;
use tracing::{debug, info};

use crate::error::{OverlayError, OverlayResult};

pub(crate) const DEFAULT_MODEL: &str = "whisper-1";

/// Largest audio upload the transcription endpoint accepts.
pub(crate) const MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

/// Reject audio the endpoint would refuse, before uploading it.
pub(crate) fn check_upload_size(bytes: u64) -> OverlayResult<()> {
    if bytes > MAX_UPLOAD_BYTES {
        return Err(OverlayError::transcription(format!(
            "audio is {:.1} MB, over the {} MB upload limit; use a shorter clip",
            bytes as f64 / (1024.0 * 1024.0),
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// One timed line of recognized speech.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CaptionSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl CaptionSegment {
    pub(crate) fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

pub(crate) struct Transcriber {
    client: Client<OpenAIConfig>,
}

static TRANSCRIBER: OnceLock<Transcriber> = OnceLock::new();

/// Process-wide transcription client, created on first use.
///
/// The CLI runs one command per process, so the handle is never invalidated.
pub(crate) fn transcriber() -> &'static Transcriber {
    TRANSCRIBER.get_or_init(|| {
        debug!("Creating transcription client");
        Transcriber {
            client: Client::new(),
        }
    })
}

impl Transcriber {
    pub(crate) async fn transcribe(
        &self,
        audio_path: &Path,
        model: &str,
    ) -> OverlayResult<Vec<CaptionSegment>> {
        let request = CreateTranscriptionRequestArgs::default()
            .file(audio_path)
            .model(model)
            .response_format(AudioResponseFormat::VerboseJson)
            .timestamp_granularities(vec![TimestampGranularity::Segment])
            .build()
            .map_err(|e| OverlayError::transcription(e.to_string()))?;

        let response = tokio::time::timeout(
            tokio::time::Duration::from_secs(300),
            self.client.audio().transcribe_verbose_json(request),
        )
        .await
        .map_err(|_| OverlayError::transcription("timed out after 300 seconds"))?
        .map_err(|e| OverlayError::transcription(e.to_string()))?;

        let segments: Vec<CaptionSegment> = response
            .segments
            .unwrap_or_default()
            .into_iter()
            .map(|segment| {
                CaptionSegment::new(
                    f64::from(segment.start),
                    f64::from(segment.end),
                    segment.text,
                )
            })
            .collect();

        info!(
            segments = segments.len(),
            language = %response.language,
            "Transcription finished"
        );
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_new() {
        let segment = CaptionSegment::new(1.5, 2.0, String::from(" hi "));
        assert_eq!(segment.start, 1.5);
        assert_eq!(segment.end, 2.0);
        assert_eq!(segment.text, " hi ");
    }

    #[test]
    fn test_upload_size_limit() {
        assert!(check_upload_size(0).is_ok());
        assert!(check_upload_size(MAX_UPLOAD_BYTES).is_ok());
        match check_upload_size(MAX_UPLOAD_BYTES + 1) {
            Err(OverlayError::Transcription(message)) => assert!(message.contains("25 MB")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
