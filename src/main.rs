mod batch;
mod compose;
mod error;
mod fonts;
mod layers;
mod layout;
mod media;
mod plan;
mod render;
mod sample;
mod style;
mod text;
mod transcribe;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::fonts::{FontFamily, FontLocator, FontRequest};
use crate::layout::{AnimationSpec, Edge, Placement};
use crate::render::{load_painter, render_overlay, RenderRequest, TextSource};
use crate::style::{BoxStyle, OverlayStyle, ShadowStyle};

#[derive(Parser)]
#[command(name = "overlai")]
#[command(about = "Burn styled text or generated captions into videos", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the whole video.
    Render {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        overlay: OverlayArgs,
    },
    /// Render only the first few seconds.
    Preview {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=10))]
        seconds: u32,
        #[command(flatten)]
        overlay: OverlayArgs,
    },
    /// Write a PNG showing the font and style.
    Sample {
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        text: Option<String>,
        #[command(flatten)]
        font: FontArgs,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Apply the same overlay to every video in a directory.
    Batch {
        input_dir: PathBuf,
        output_dir: PathBuf,
        #[command(flatten)]
        overlay: OverlayArgs,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Text to burn in for the whole clip.
    #[arg(long)]
    text: Option<String>,
    /// Transcribe the audio track and show one caption per segment.
    #[arg(long)]
    captions: bool,
}

#[derive(Args)]
struct AnimationArgs {
    /// Slide the text in from this edge.
    #[arg(long, value_enum)]
    animate_from: Option<Edge>,
    #[arg(long, default_value_t = 0.6)]
    animate_duration: f64,
}

impl AnimationArgs {
    fn spec(&self) -> Option<AnimationSpec> {
        self.animate_from
            .map(|edge| AnimationSpec::new(edge, self.animate_duration))
    }
}

#[derive(Args)]
struct FontArgs {
    #[arg(long, value_enum, default_value_t = FontFamily::Arial)]
    font_family: FontFamily,
    #[arg(long)]
    bold: bool,
    #[arg(long)]
    italic: bool,
    /// TTF/OTF file used instead of the family lookup.
    #[arg(long)]
    font_file: Option<PathBuf>,
    /// Directory of bundled fonts searched after the system fonts.
    #[arg(long, env = "OVERLAI_FONTS_DIR", default_value = "fonts")]
    fonts_dir: PathBuf,
}

impl FontArgs {
    fn request(&self) -> FontRequest {
        FontRequest {
            family: self.font_family,
            bold: self.bold,
            italic: self.italic,
            custom_file: self.font_file.clone(),
        }
    }

    fn locator(&self) -> FontLocator {
        FontLocator::for_host(Some(self.fonts_dir.clone()))
    }
}

#[derive(Args)]
struct StyleArgs {
    #[arg(long, default_value_t = 50.0)]
    font_size: f32,
    #[arg(long, default_value = "#FFFFFF")]
    color: String,
    /// Outline width in pixels.
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(0..=12))]
    stroke_width: u32,
    #[arg(long, default_value = "#000000")]
    stroke_color: String,
    #[arg(long)]
    no_shadow: bool,
    #[arg(long, default_value = "#000000")]
    shadow_color: String,
    #[arg(long, default_value_t = 0.5)]
    shadow_opacity: f32,
    #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
    shadow_dx: i32,
    #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
    shadow_dy: i32,
    /// Draw a filled box behind the text.
    #[arg(long = "box")]
    show_box: bool,
    #[arg(long, default_value = "#000000")]
    box_color: String,
    #[arg(long, default_value_t = 0.25)]
    box_opacity: f32,
    #[arg(long, default_value_t = 16)]
    box_padding: u32,
}

impl StyleArgs {
    fn style(&self) -> OverlayStyle {
        OverlayStyle {
            font_size: self.font_size,
            color: self.color.clone(),
            stroke_width: self.stroke_width,
            stroke_color: self.stroke_color.clone(),
            shadow: ShadowStyle {
                enabled: !self.no_shadow,
                color: self.shadow_color.clone(),
                opacity: self.shadow_opacity,
                dx: self.shadow_dx,
                dy: self.shadow_dy,
            },
            background: BoxStyle {
                enabled: self.show_box,
                color: self.box_color.clone(),
                opacity: self.box_opacity,
                padding: self.box_padding,
            },
        }
    }
}

#[derive(Args)]
struct OverlayArgs {
    #[command(flatten)]
    source: SourceArgs,
    #[arg(long, default_value = transcribe::DEFAULT_MODEL)]
    whisper_model: String,
    #[arg(long, value_enum, default_value_t = Placement::Center)]
    position: Placement,
    #[command(flatten)]
    animation: AnimationArgs,
    #[command(flatten)]
    font: FontArgs,
    #[command(flatten)]
    style: StyleArgs,
}

impl OverlayArgs {
    fn request(&self, input: PathBuf, output: PathBuf, limit: Option<f64>) -> RenderRequest {
        let text = if self.source.captions {
            TextSource::Captions {
                model: self.whisper_model.clone(),
            }
        } else {
            TextSource::Manual(self.source.text.clone().unwrap_or_default())
        };
        RenderRequest {
            input,
            output,
            limit,
            text,
            placement: self.position,
            animation: self.animation.spec(),
            style: self.style.style(),
            font: self.font.request(),
        }
    }
}

const DEFAULT_LOG_DIRECTIVE: &str = "overlai=info";

/// `RUST_LOG` when set, otherwise info-level logs for this crate.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    match rust_log.map(str::trim).filter(|value| !value.is_empty()) {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::new(DEFAULT_LOG_DIRECTIVE),
    }
}

fn init_tracing() {
    let env_filter = log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref());
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(env_filter)
        .init();
}

async fn render_one(request: RenderRequest, locator: FontLocator) -> anyhow::Result<()> {
    anyhow::ensure!(
        request.input.is_file(),
        "Input video not found: {}",
        request.input.display()
    );
    let painter = load_painter(&locator, &request.font)?;
    render_overlay(&request, &painter).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Render {
            input,
            output,
            overlay,
        } => {
            let request = overlay.request(input, output, None);
            render_one(request, overlay.font.locator()).await?;
        }
        Command::Preview {
            input,
            output,
            seconds,
            overlay,
        } => {
            let request = overlay.request(input, output, Some(f64::from(seconds)));
            render_one(request, overlay.font.locator()).await?;
        }
        Command::Sample {
            output,
            text,
            font,
            style,
        } => {
            let painter = load_painter(&font.locator(), &font.request())?;
            let image = sample::render_sample(
                &painter,
                &sample::sample_text(text.as_deref()),
                &style.style(),
                sample::SAMPLE_WIDTH,
                sample::SAMPLE_HEIGHT,
            );
            sample::save_sample(&image, &output)?;
            info!(output = %output.display(), font = painter.source(), "Sample written");
        }
        Command::Batch {
            input_dir,
            output_dir,
            overlay,
        } => {
            let template = overlay.request(input_dir.clone(), output_dir.clone(), None);
            let painter = load_painter(&overlay.font.locator(), &template.font)?;
            let summary = batch::run_batch(&template, &painter, &input_dir, &output_dir).await?;
            for (input, reason) in &summary.failed {
                warn!(input = %input.display(), reason = %reason, "Not rendered");
            }
            anyhow::ensure!(
                summary.failed.is_empty(),
                "{} of {} videos failed",
                summary.failed.len(),
                summary.failed.len() + summary.rendered.len()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_defaults() {
        let cli = Cli::try_parse_from(["overlai", "render", "in.mp4", "-o", "out.mp4", "--text", "Hi"])
            .unwrap();
        let Command::Render {
            input,
            output,
            overlay,
        } = cli.command
        else {
            panic!("expected render");
        };
        let request = overlay.request(input, output, None);
        assert!(matches!(request.text, TextSource::Manual(ref text) if text == "Hi"));
        assert_eq!(request.placement, Placement::Center);
        assert_eq!(request.animation, None);
        assert_eq!(request.style, OverlayStyle::default());
        assert_eq!(request.font.family, FontFamily::Arial);
        assert_eq!(request.font.custom_file, None);
    }

    #[test]
    fn test_captions_and_styling_flags() {
        let cli = Cli::try_parse_from([
            "overlai",
            "preview",
            "in.mp4",
            "-o",
            "out.mp4",
            "--captions",
            "--position",
            "bottom",
            "--animate-from",
            "left",
            "--font-family",
            "times-new-roman",
            "--bold",
            "--no-shadow",
            "--box",
            "--box-opacity",
            "0.8",
            "--shadow-dx",
            "-3",
        ])
        .unwrap();
        let Command::Preview {
            input,
            output,
            seconds,
            overlay,
        } = cli.command
        else {
            panic!("expected preview");
        };
        assert_eq!(seconds, 5);
        let request = overlay.request(input, output, Some(f64::from(seconds)));
        assert!(matches!(request.text, TextSource::Captions { ref model } if model == "whisper-1"));
        assert_eq!(request.placement, Placement::Bottom);
        assert_eq!(request.animation, Some(AnimationSpec::new(Edge::Left, 0.6)));
        assert_eq!(request.font.family, FontFamily::TimesNewRoman);
        assert!(request.font.bold);
        assert!(!request.style.shadow.enabled);
        assert_eq!(request.style.shadow.dx, -3);
        assert!(request.style.background.enabled);
        assert_eq!(request.style.background.opacity, 0.8);
        assert_eq!(request.limit, Some(5.0));
    }

    #[test]
    fn test_text_source_is_required_and_exclusive() {
        assert!(Cli::try_parse_from(["overlai", "render", "in.mp4", "-o", "out.mp4"]).is_err());
        assert!(Cli::try_parse_from([
            "overlai", "render", "in.mp4", "-o", "out.mp4", "--text", "Hi", "--captions",
        ])
        .is_err());
    }

    #[test]
    fn test_preview_seconds_range() {
        let parse = |seconds: &str| {
            Cli::try_parse_from([
                "overlai", "preview", "in.mp4", "-o", "out.mp4", "--text", "Hi", "--seconds",
                seconds,
            ])
        };
        assert!(parse("1").is_ok());
        assert!(parse("10").is_ok());
        assert!(parse("0").is_err());
        assert!(parse("11").is_err());
    }

    #[test]
    fn test_stroke_width_range() {
        let parse = |width: &str| {
            Cli::try_parse_from(["overlai", "sample", "-o", "sample.png", "--stroke-width", width])
        };
        assert!(parse("0").is_ok());
        assert!(parse("12").is_ok());
        assert!(parse("13").is_err());
        assert!(parse("500").is_err());
    }

    #[test]
    fn test_rust_log_overrides_default_level() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(Some("  ")).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            log_filter(Some("overlai=debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(log_filter(Some("warn")).max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_unknown_family_rejected() {
        assert!(Cli::try_parse_from([
            "overlai",
            "sample",
            "-o",
            "sample.png",
            "--font-family",
            "comic-sans",
        ])
        .is_err());
    }
}
