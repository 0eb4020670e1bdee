//! Apply one overlay configuration to every video in a directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::error::OverlayResult;
use crate::render::{render_overlay, RenderRequest};
use crate::text::FontPainter;

const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mov", "avi", "mkv"];
const OUTPUT_PREFIX: &str = "overlay_";

#[derive(Debug, Default)]
pub(crate) struct BatchSummary {
    pub rendered: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Video files directly inside `dir`, sorted by name.
pub(crate) fn video_inputs(dir: &Path) -> OverlayResult<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_video(&path) {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

pub(crate) fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{OUTPUT_PREFIX}{name}"))
}

/// Render each input with `template`. A failing file is logged and skipped.
pub(crate) async fn run_batch(
    template: &RenderRequest,
    painter: &FontPainter,
    input_dir: &Path,
    output_dir: &Path,
) -> OverlayResult<BatchSummary> {
    fs::create_dir_all(output_dir)?;
    let inputs = video_inputs(input_dir)?;
    info!(count = inputs.len(), dir = %input_dir.display(), "Starting batch");

    let mut summary = BatchSummary::default();
    for input in inputs {
        let output = output_path(output_dir, &input);
        info!(input = %input.display(), "Processing");
        let request = RenderRequest {
            input: input.clone(),
            output: output.clone(),
            ..template.clone()
        };
        match render_overlay(&request, painter).await {
            Ok(()) => summary.rendered.push(output),
            Err(e) => {
                error!(input = %input.display(), error = %e, "Batch item failed");
                summary.failed.push((input, e.to_string()));
            }
        }
    }

    info!(
        rendered = summary.rendered.len(),
        failed = summary.failed.len(),
        "Batch processing complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_inputs_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.MP4", "a.mov", "clip.mkv", "old.AVI", "notes.txt", "cover.png", "noext"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.mp4")).unwrap();

        let names: Vec<String> = video_inputs(dir.path())
            .unwrap()
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.mov", "b.MP4", "clip.mkv", "old.AVI"]);
    }

    #[test]
    fn test_output_path_prefixes_name() {
        let out = output_path(Path::new("/tmp/out"), Path::new("/videos/holiday.mp4"));
        assert_eq!(out, PathBuf::from("/tmp/out/overlay_holiday.mp4"));
    }

    #[test]
    fn test_missing_input_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(video_inputs(&dir.path().join("missing")).is_err());
    }
}
