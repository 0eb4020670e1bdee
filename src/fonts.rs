//! Font family resolution across operating systems.
//!
//! Lookup order: uploaded font file, the platform font directory, the bundled
//! `fonts/` directory, then common Linux system fonts. The first candidate that
//! exists on disk wins.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tracing::{debug, warn};

const WINDOWS_FONTS_DIR: &str = "C:\\Windows\\Fonts";
const MACOS_FONTS_DIR: &str = "/System/Library/Fonts/Supplemental";

const DEJAVU_DIR: &str = "/usr/share/fonts/truetype/dejavu";
const LIBERATION_FALLBACKS: &[&str] = &[
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Italic.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-BoldItalic.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum FontFamily {
    Arial,
    Helvetica,
    Courier,
    #[value(name = "times-new-roman")]
    TimesNewRoman,
    Impact,
    Georgia,
    Verdana,
}

impl FontFamily {
    pub(crate) fn display_name(self) -> &'static str {
        match self {
            Self::Arial => "Arial",
            Self::Helvetica => "Helvetica",
            Self::Courier => "Courier",
            Self::TimesNewRoman => "Times New Roman",
            Self::Impact => "Impact",
            Self::Georgia => "Georgia",
            Self::Verdana => "Verdana",
        }
    }

    /// Windows file names as `[regular, bold, italic, bold italic]`.
    fn windows_files(self) -> [&'static str; 4] {
        match self {
            Self::Arial | Self::Helvetica => ["arial.ttf", "arialbd.ttf", "ariali.ttf", "arialbi.ttf"],
            Self::Courier => ["cour.ttf", "courbd.ttf", "couri.ttf", "courbi.ttf"],
            Self::TimesNewRoman => ["times.ttf", "timesbd.ttf", "timesi.ttf", "timesbi.ttf"],
            Self::Georgia => ["georgia.ttf", "georgiab.ttf", "georgiai.ttf", "georgiaz.ttf"],
            Self::Verdana => ["verdana.ttf", "verdanab.ttf", "verdanai.ttf", "verdanaz.ttf"],
            Self::Impact => ["impact.ttf"; 4],
        }
    }

    /// Family name used in "Family Style.ttf" file names.
    fn file_family(self) -> &'static str {
        match self {
            Self::Arial | Self::Helvetica => "Arial",
            Self::Courier => "Courier New",
            Self::TimesNewRoman => "Times New Roman",
            Self::Impact => "Impact",
            Self::Georgia => "Georgia",
            Self::Verdana => "Verdana",
        }
    }

    fn dejavu_stem(self) -> (&'static str, &'static str) {
        // (stem, italic suffix)
        match self {
            Self::Arial | Self::Helvetica | Self::Verdana | Self::Impact => ("DejaVuSans", "Oblique"),
            Self::Courier => ("DejaVuSansMono", "Oblique"),
            Self::TimesNewRoman | Self::Georgia => ("DejaVuSerif", "Italic"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl Variant {
    fn new(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (true, true) => Self::BoldItalic,
            (true, false) => Self::Bold,
            (false, true) => Self::Italic,
            (false, false) => Self::Regular,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Regular => 0,
            Self::Bold => 1,
            Self::Italic => 2,
            Self::BoldItalic => 3,
        }
    }

    fn style_words(self) -> Option<&'static str> {
        match self {
            Self::Regular => None,
            Self::Bold => Some("Bold"),
            Self::Italic => Some("Italic"),
            Self::BoldItalic => Some("Bold Italic"),
        }
    }
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FontRequest {
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
    pub custom_file: Option<PathBuf>,
}

/// Directories searched for font files.
#[derive(Debug, Clone)]
pub(crate) struct FontLocator {
    /// Platform font directory and whether it uses Windows file names.
    platform_dir: Option<(PathBuf, bool)>,
    bundled_dir: Option<PathBuf>,
    include_system_fallbacks: bool,
}

impl FontLocator {
    /// Locator for the current operating system.
    pub(crate) fn for_host(bundled_dir: Option<PathBuf>) -> Self {
        let platform_dir = if cfg!(windows) {
            Some((PathBuf::from(WINDOWS_FONTS_DIR), true))
        } else if cfg!(target_os = "macos") {
            Some((PathBuf::from(MACOS_FONTS_DIR), false))
        } else {
            None
        };
        Self {
            platform_dir,
            bundled_dir,
            include_system_fallbacks: true,
        }
    }

    /// Locator that only looks in the bundled directory.
    #[cfg(test)]
    pub(crate) fn bundled_only(dir: &Path) -> Self {
        Self {
            platform_dir: None,
            bundled_dir: Some(dir.to_path_buf()),
            include_system_fallbacks: false,
        }
    }

    /// Every path considered for `request`, in priority order.
    fn candidates(&self, request: &FontRequest) -> Vec<PathBuf> {
        let variant = Variant::new(request.bold, request.italic);
        let windows_name = request.family.windows_files()[variant.index()];
        let mut candidates: Vec<PathBuf> = Vec::new();
        let mut push = |path: PathBuf| {
            if !candidates.contains(&path) {
                candidates.push(path);
            }
        };

        if let Some((dir, windows_names)) = &self.platform_dir {
            if *windows_names {
                push(dir.join(windows_name));
            } else {
                push(dir.join(styled_file_name(request.family, variant)));
            }
        }

        if let Some(dir) = &self.bundled_dir {
            if matches!(request.family, FontFamily::Arial | FontFamily::Helvetica) {
                for name in arial_aliases(variant) {
                    push(dir.join(name));
                }
            }
            push(dir.join(windows_name));
        }

        if self.include_system_fallbacks {
            for path in dejavu_candidates(request.family) {
                push(path);
            }
            for path in LIBERATION_FALLBACKS {
                push(PathBuf::from(path));
            }
        }

        candidates
    }

    /// First existing font file for `request`, if any.
    pub(crate) fn resolve(&self, request: &FontRequest) -> Option<PathBuf> {
        if let Some(custom) = &request.custom_file {
            if request.bold || request.italic {
                warn!(
                    font = %custom.display(),
                    "Bold/italic are not derived for a custom font file; pass the styled variant instead"
                );
            }
            return Some(custom.clone());
        }

        let candidates = self.candidates(request);
        let found = candidates.iter().position(|path| path.is_file());
        match found {
            Some(index) => {
                let path = candidates[index].clone();
                if index > 0 {
                    warn!(
                        family = request.family.display_name(),
                        font = %path.display(),
                        "Requested font not found, using fallback"
                    );
                } else {
                    debug!(font = %path.display(), "Resolved font");
                }
                Some(path)
            }
            None => None,
        }
    }
}

fn styled_file_name(family: FontFamily, variant: Variant) -> String {
    match variant.style_words() {
        Some(style) => format!("{} {}.ttf", family.file_family(), style),
        None => format!("{}.ttf", family.file_family()),
    }
}

fn arial_aliases(variant: Variant) -> &'static [&'static str] {
    match variant {
        Variant::BoldItalic => &["arialbi.ttf", "Arial Bold Italic.ttf", "Arial-BoldItalic.ttf"],
        Variant::Bold => &["arialbd.ttf", "Arial Bold.ttf", "Arial-Bold.ttf"],
        Variant::Italic => &["ariali.ttf", "Arial Italic.ttf", "Arial-Italic.ttf"],
        Variant::Regular => &["arial.ttf", "Arial.ttf"],
    }
}

/// DejaVu files for the family's class, regular first.
fn dejavu_candidates(family: FontFamily) -> Vec<PathBuf> {
    let (stem, italic) = family.dejavu_stem();
    [
        format!("{stem}.ttf"),
        format!("{stem}-Bold.ttf"),
        format!("{stem}-{italic}.ttf"),
        format!("{stem}-Bold{italic}.ttf"),
    ]
    .iter()
    .map(|file| Path::new(DEJAVU_DIR).join(file))
    .collect()
}
