//! One render attempt: probe, optionally transcribe, plan layers, encode.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{OverlayError, OverlayResult};
use crate::fonts::{FontLocator, FontRequest};
use crate::layout::{AnimationSpec, Frame, Placement};
use crate::media::{self, AudioTarget};
use crate::plan::{flatten, text_layer_count, OverlayPlan, OverlaySource};
use crate::style::OverlayStyle;
use crate::text::{FontPainter, BUILTIN_FONT_NAME};
use crate::transcribe::{check_upload_size, transcriber, CaptionSegment};

/// Where overlay text comes from, before transcription has run.
#[derive(Debug, Clone)]
pub(crate) enum TextSource {
    Manual(String),
    Captions { model: String },
}

#[derive(Debug, Clone)]
pub(crate) struct RenderRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Render only the first N seconds.
    pub limit: Option<f64>,
    pub text: TextSource,
    pub placement: Placement,
    pub animation: Option<AnimationSpec>,
    pub style: OverlayStyle,
    pub font: FontRequest,
}

/// Load the font for `request`, falling back to the built-in face when no file is found.
pub(crate) fn load_painter(locator: &FontLocator, request: &FontRequest) -> OverlayResult<FontPainter> {
    match locator.resolve(request) {
        Some(path) => FontPainter::load(&path),
        None => {
            warn!(
                family = request.family.display_name(),
                font = BUILTIN_FONT_NAME,
                "No font file found, using the default face"
            );
            FontPainter::builtin()
        }
    }
}

pub(crate) async fn render_overlay(
    request: &RenderRequest,
    painter: &FontPainter,
) -> OverlayResult<()> {
    media::init().map_err(OverlayError::from_anyhow)?;
    let info = media::probe(&request.input).map_err(OverlayError::from_anyhow)?;

    let (clip_duration, limit) = clip_window(info.duration, request.limit);

    let source = match &request.text {
        TextSource::Manual(text) => OverlaySource::Manual(text.clone()),
        TextSource::Captions { model } => {
            if !info.has_audio {
                return Err(OverlayError::NoAudioTrack);
            }
            OverlaySource::Captions(generate_captions(&request.input, limit, model).await?)
        }
    };

    let frame = Frame {
        width: info.width,
        height: info.height,
    };
    let plan = OverlayPlan {
        frame,
        clip_duration,
        placement: request.placement,
        animation: request.animation,
        style: &request.style,
    };
    let segments = plan.build(&source, painter)?;
    let layers = flatten(segments);
    info!(
        input = %request.input.display(),
        font = painter.source(),
        width = info.width,
        height = info.height,
        duration = clip_duration,
        segments = text_layer_count(&layers),
        layers = layers.len(),
        "Rendering overlay"
    );

    media::render(&request.input, &request.output, &layers, limit)
        .map_err(OverlayError::from_anyhow)?;
    info!(output = %request.output.display(), "Render finished");
    Ok(())
}

/// Visible clip length and the cut point passed to the encoder.
///
/// A limit past the end of the source is dropped. An unknown source duration
/// keeps the limit as given, or shows the overlay until the stream ends.
fn clip_window(source_duration: f64, limit: Option<f64>) -> (f64, Option<f64>) {
    if source_duration <= 0.0 {
        return (limit.unwrap_or(f64::INFINITY), limit);
    }
    match limit {
        Some(limit) if limit < source_duration => (limit, Some(limit)),
        _ => (source_duration, None),
    }
}

async fn generate_captions(
    input: &Path,
    limit: Option<f64>,
    model: &str,
) -> OverlayResult<Vec<CaptionSegment>> {
    let audio = tempfile::Builder::new()
        .prefix("overlai-audio-")
        .suffix(&format!(".{}", AudioTarget::SPEECH.extension))
        .tempfile()?;
    media::extract_audio(input, audio.path(), limit).map_err(OverlayError::from_anyhow)?;

    check_upload_size(fs::metadata(audio.path())?.len())?;

    let segments = transcriber().transcribe(audio.path(), model).await;
    if let Err(e) = audio.close() {
        warn!(error = %e, "Failed to remove temporary audio file");
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontFamily;

    #[test]
    fn test_clip_window() {
        assert_eq!(clip_window(12.0, Some(5.0)), (5.0, Some(5.0)));
        assert_eq!(clip_window(3.0, Some(5.0)), (3.0, None));
        assert_eq!(clip_window(12.0, None), (12.0, None));
        assert_eq!(clip_window(0.0, Some(5.0)), (5.0, Some(5.0)));
        assert_eq!(clip_window(0.0, None), (f64::INFINITY, None));
    }

    #[test]
    fn test_load_painter_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let request = FontRequest {
            family: FontFamily::Georgia,
            bold: false,
            italic: false,
            custom_file: None,
        };
        let locator = FontLocator::bundled_only(dir.path());
        let painter = load_painter(&locator, &request).unwrap();
        assert_eq!(painter.source(), BUILTIN_FONT_NAME);
    }

    #[test]
    fn test_load_painter_bad_custom_file() {
        let dir = tempfile::tempdir().unwrap();
        let request = FontRequest {
            family: FontFamily::Impact,
            bold: false,
            italic: false,
            custom_file: Some(dir.path().join("missing.ttf")),
        };
        let locator = FontLocator::for_host(Some(dir.path().to_path_buf()));
        assert!(matches!(
            load_painter(&locator, &request),
            Err(OverlayError::FontLoad { .. })
        ));
    }
}
