//! Per-format acceptance rules for uploaded creatives.
//!
//! Every validator is a pure function of its arguments and reports all
//! failures it finds, in check order, rather than stopping at the first.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::creative::sniff::Dimensions;
use crate::violations::Verdict;

pub const DISPLAY_IMAGE_MAX_BYTES: usize = 5 * 1024 * 1024;
pub const DISPLAY_IMAGE_MIN: Dimensions = Dimensions {
    width: 177,
    height: 100,
};
pub const DISPLAY_IMAGE_MAX: Dimensions = Dimensions {
    width: 38200,
    height: 20000,
};
pub const DISPLAY_IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "tiff", "gif"];
pub const HTML5_ZIP_MAX_BYTES: usize = 10 * 1024 * 1024;
pub const VIDEO_FILE_EXTENSIONS: &[&str] = &["mp4", "mov", "gif"];
pub const VAST_TAG_MAX_BYTES: usize = 50 * 1024;
pub const TRACKING_TAGS_MAX: usize = 5;

/// Width/height ratios accepted for display images, matched within
/// [`ASPECT_TOLERANCE`] relative error.
const ASPECT_RATIOS: &[(f64, f64)] = &[
    (1.91, 1.0),
    (1.0, 1.0),
    (4.0, 5.0),
    (2.0, 3.0),
    (9.0, 16.0),
    (16.0, 9.0),
    (3.0, 2.0),
    (2.0, 1.0),
    (300.0, 250.0),
    (336.0, 280.0),
    (728.0, 90.0),
    (160.0, 600.0),
    (320.0, 50.0),
    (300.0, 600.0),
    (320.0, 100.0),
    (300.0, 100.0),
    (468.0, 60.0),
    (250.0, 250.0),
];
const ASPECT_TOLERANCE: f64 = 0.05;

const DCM_PREFIXES: &[&str] = &[
    "<ins class='dcmads'",
    "<ins class=\"dcmads\"",
    "<iframe src='",
    "<iframe src=\"",
    "<script src='",
    "<script src=\"",
];
const DOUBLECLICK_HOST: &str = "doubleclick.net";

static PIXEL_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://").expect("pixel url pattern is valid"));

/// Lowercased text after the last `.`, or empty when there is none.
pub fn extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

fn aspect_matches(dimensions: Dimensions) -> bool {
    if dimensions.width == 0 || dimensions.height == 0 {
        return false;
    }

    let ratio = f64::from(dimensions.width) / f64::from(dimensions.height);
    ASPECT_RATIOS.iter().any(|(w, h)| {
        let expected = w / h;
        (ratio - expected).abs() / expected.max(1e-6) <= ASPECT_TOLERANCE
    })
}

/// Dimension checks only run when the dimensions could be sniffed.
pub fn validate_display_image(
    filename: &str,
    size: usize,
    dimensions: Option<Dimensions>,
) -> Verdict {
    let mut verdict = Verdict::new();

    if !DISPLAY_IMAGE_EXTENSIONS.contains(&extension(filename).as_str()) {
        verdict.push("file", "Supported formats: jpeg, jpg, png, tiff, gif.");
    }
    if size > DISPLAY_IMAGE_MAX_BYTES {
        verdict.push("file", "File size must be at most 5 MB.");
    }

    if let Some(dimensions) = dimensions {
        if dimensions.width < DISPLAY_IMAGE_MIN.width
            || dimensions.height < DISPLAY_IMAGE_MIN.height
        {
            verdict.push(
                "file",
                format!(
                    "Minimum dimensions: {}x{} px.",
                    DISPLAY_IMAGE_MIN.width, DISPLAY_IMAGE_MIN.height
                ),
            );
        }
        if dimensions.width > DISPLAY_IMAGE_MAX.width
            || dimensions.height > DISPLAY_IMAGE_MAX.height
        {
            verdict.push(
                "file",
                format!(
                    "Maximum dimensions: {}x{} px.",
                    DISPLAY_IMAGE_MAX.width, DISPLAY_IMAGE_MAX.height
                ),
            );
        }
        if !aspect_matches(dimensions) {
            verdict.push("file", "Aspect ratio is not in the allowed list.");
        }
    }

    verdict
}

pub fn validate_dcm_tag(tag_text: &str) -> Verdict {
    let mut verdict = Verdict::new();

    let tag = tag_text.trim();
    if tag.is_empty() {
        verdict.push("tagText", "Paste a full DCM tag (HTML).");
        return verdict;
    }

    let lowered = tag.to_lowercase();
    let has_prefix = DCM_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(&prefix.to_lowercase()));
    if !has_prefix && !lowered.contains(DOUBLECLICK_HOST) {
        verdict.push(
            "tagText",
            "Tag must start with <ins class='dcmads'... or <iframe src='...doubleclick.net...' or <script src='...doubleclick.net/adx...'.",
        );
    }
    if !tag.contains('<') || !tag.contains('>') {
        verdict.push("tagText", "Tag must be valid HTML (contains tags).");
    }

    verdict
}

pub fn validate_html5_zip(filename: &str, size: usize) -> Verdict {
    let mut verdict = Verdict::new();

    if !filename.to_lowercase().ends_with(".zip") {
        verdict.push("file", "HTML5 ad must be a .zip file.");
    }
    if size > HTML5_ZIP_MAX_BYTES {
        verdict.push("file", "ZIP size must be at most 10 MB.");
    }

    verdict
}

/// Extension only. Codecs and sizes are not inspected.
pub fn validate_video_file(filename: &str) -> Verdict {
    let mut verdict = Verdict::new();

    if !VIDEO_FILE_EXTENSIONS.contains(&extension(filename).as_str()) {
        verdict.push("file", "Video file must be .mp4, .mov, or .gif.");
    }

    verdict
}

pub fn validate_vast_tag(tag_text: &str) -> Verdict {
    let mut verdict = Verdict::new();

    if tag_text.len() > VAST_TAG_MAX_BYTES {
        verdict.push("tagText", "VAST tag must be at most 50 KB.");
    }

    let tag = tag_text.trim();
    if !tag.is_empty() {
        let like_xml = tag.starts_with("<?xml") || tag.starts_with("<VAST") || tag.starts_with("<vast");
        let like_script = tag.contains("<script");
        if !like_xml && !like_script {
            verdict.push("tagText", "Paste VAST XML or script content.");
        }
    }

    verdict
}

/// Blank entries are skipped but still count toward the limit and keep
/// their index in field names.
pub fn validate_tracking_tags(tags: &[String]) -> Verdict {
    let mut verdict = Verdict::new();

    if tags.len() > TRACKING_TAGS_MAX {
        verdict.push(
            "trackingTags",
            format!("Maximum {} tracking tags allowed.", TRACKING_TAGS_MAX),
        );
    }

    for (i, tag) in tags.iter().enumerate() {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if !PIXEL_URL.is_match(tag) && !tag.contains("<img") && !tag.contains("<script") {
            verdict.push(
                format!("trackingTags[{}]", i),
                "Tag must be a URL pixel (http(s):// or <img) or JavaScript (<script).",
            );
        }
    }

    verdict
}
