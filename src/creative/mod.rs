//! Creative ingestion.
//!
//! Raw uploads and pasted tags are turned into a validated [`Creative`] here.
//! The functions in this module never touch the store; callers decide where
//! the result ends up.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Error;
use crate::violations::Verdict;

pub mod bulk;
pub mod macros;
pub mod sniff;
pub mod validate;
pub mod vast;

use macros::{detect_macro_tokens, substitute_macros};
use sniff::{inspect, Dimensions};
use validate::{
    validate_dcm_tag, validate_display_image, validate_html5_zip, validate_tracking_tags,
    validate_vast_tag, validate_video_file,
};
use vast::generate_vast_wrapper;

const TAG_TEXT_MAX_CHARS: usize = 50_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreativeType {
    DisplayImage,
    DisplayHtml5Zip,
    DisplayThirdPartyTag,
    VideoFile,
    VideoVastTag,
}

impl CreativeType {
    pub const FILE_TYPES: &'static [CreativeType] = &[
        CreativeType::DisplayImage,
        CreativeType::DisplayHtml5Zip,
        CreativeType::VideoFile,
    ];
    pub const TAG_TYPES: &'static [CreativeType] = &[
        CreativeType::DisplayThirdPartyTag,
        CreativeType::VideoVastTag,
    ];

    pub fn source(self) -> CreativeSource {
        if CreativeType::TAG_TYPES.contains(&self) {
            CreativeSource::Tag
        } else {
            CreativeSource::File
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreativeSource {
    File,
    Tag,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub file_type: String,
    pub file_size_bytes: usize,
    pub asset_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Html5Metadata {
    pub file_type: String,
    pub file_size_bytes: usize,
    pub asset_url: Option<String>,
    pub filename: String,
}

/// Placeholder facts for video uploads; container contents are not decoded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub duration: Option<f64>,
    pub bitrate: String,
    pub resolution: String,
    pub file_size_bytes: usize,
    pub asset_url: Option<String>,
    pub codec_note: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreativeMetadata {
    Html5(Html5Metadata),
    Video(VideoMetadata),
    Image(ImageMetadata),
    Other(Map<String, Value>),
}

impl Default for CreativeMetadata {
    fn default() -> CreativeMetadata {
        CreativeMetadata::Other(Map::new())
    }
}

impl CreativeMetadata {
    pub fn image(bytes: &[u8], content_type: &str, dimensions: Option<Dimensions>) -> CreativeMetadata {
        CreativeMetadata::Image(ImageMetadata {
            file_type: content_type.to_owned(),
            file_size_bytes: bytes.len(),
            asset_url: None,
            width: dimensions.map(|d| d.width),
            height: dimensions.map(|d| d.height),
            size: dimensions.map(|d| format!("{}x{}", d.width, d.height)),
        })
    }

    pub fn html5(bytes: &[u8], content_type: &str, filename: &str) -> CreativeMetadata {
        CreativeMetadata::Html5(Html5Metadata {
            file_type: content_type.to_owned(),
            file_size_bytes: bytes.len(),
            asset_url: None,
            filename: filename.to_owned(),
        })
    }

    pub fn video(bytes: &[u8]) -> CreativeMetadata {
        CreativeMetadata::Video(VideoMetadata {
            duration: None,
            bitrate: "—".to_owned(),
            resolution: "—".to_owned(),
            file_size_bytes: bytes.len(),
            asset_url: None,
            codec_note: "Codec validation is best-effort in demo.".to_owned(),
        })
    }
}

/// The validated, enriched form of one uploaded creative.
#[derive(Clone, Debug, PartialEq)]
pub struct Creative {
    pub creative_type: CreativeType,
    pub source: CreativeSource,
    pub macro_tokens: Vec<String>,
    pub tracking_tags: Vec<String>,
    pub metadata: CreativeMetadata,
    pub substituted_preview: Option<String>,
    pub generated_vast: Option<String>,
}

/// A raw file as received, before any checks.
#[derive(Clone, Copy, Debug)]
pub struct FileUpload<'a> {
    pub creative_type: CreativeType,
    pub filename: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

fn check_tracking_tags(tracking_tags: &[String]) -> Result<(), Error> {
    Error::check("Invalid tracking tags", validate_tracking_tags(tracking_tags))
}

fn detect_in_all<'a>(texts: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut tokens: Vec<String> = vec![];
    for text in texts {
        for token in detect_macro_tokens(text) {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
    }
    tokens
}

/// Substituted tracking tags, one per line, or `None` if there are none.
fn stitch_tracking_tags(tracking_tags: &[String]) -> Option<String> {
    let parts = tracking_tags
        .iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(substitute_macros)
        .collect::<Vec<_>>();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

/// Validates a file upload. `content_url` is where the stored bytes will be
/// served from and only matters for video, whose VAST wrapper points at it.
#[tracing::instrument(skip(upload, tracking_tags), fields(filename = upload.filename, len = upload.bytes.len()))]
pub fn ingest_file(
    upload: FileUpload<'_>,
    tracking_tags: Vec<String>,
    content_url: &str,
) -> Result<Creative, Error> {
    if !CreativeType::FILE_TYPES.contains(&upload.creative_type) {
        return Err(Error::invalid_field(
            "Invalid inputType",
            "inputType",
            "inputType for file must be one of [DISPLAY_IMAGE, DISPLAY_HTML5_ZIP, VIDEO_FILE].",
        ));
    }
    check_tracking_tags(&tracking_tags)?;

    let macro_tokens = detect_in_all(tracking_tags.iter().map(String::as_str));
    let facts = inspect(upload.bytes);

    let creative = match upload.creative_type {
        CreativeType::DisplayImage => {
            let dimensions = facts.dimensions;
            Error::check(
                "Display image validation failed",
                validate_display_image(upload.filename, upload.bytes.len(), dimensions),
            )?;

            Creative {
                creative_type: upload.creative_type,
                source: CreativeSource::File,
                macro_tokens,
                metadata: CreativeMetadata::image(upload.bytes, upload.content_type, dimensions),
                substituted_preview: stitch_tracking_tags(&tracking_tags),
                generated_vast: None,
                tracking_tags,
            }
        }
        CreativeType::DisplayHtml5Zip => {
            Error::check(
                "HTML5 ZIP validation failed",
                validate_html5_zip(upload.filename, upload.bytes.len()),
            )?;

            Creative {
                creative_type: upload.creative_type,
                source: CreativeSource::File,
                macro_tokens,
                metadata: CreativeMetadata::html5(upload.bytes, upload.content_type, upload.filename),
                substituted_preview: None,
                generated_vast: None,
                tracking_tags,
            }
        }
        CreativeType::VideoFile => {
            Error::check(
                "Video file validation failed",
                validate_video_file(upload.filename),
            )?;

            Creative {
                creative_type: upload.creative_type,
                source: CreativeSource::File,
                macro_tokens,
                metadata: CreativeMetadata::video(upload.bytes),
                substituted_preview: None,
                generated_vast: Some(generate_vast_wrapper(content_url, &tracking_tags)),
                tracking_tags,
            }
        }
        other => {
            return Err(Error::ExistentialState(format!(
                "{:?} passed the file type check",
                other
            )))
        }
    };

    debug!(
        creative_type = ?creative.creative_type,
        container = ?facts.kind,
        "ingested file creative"
    );

    Ok(creative)
}

/// Validates a pasted third-party or VAST tag.
#[tracing::instrument(skip(tag_text, tracking_tags), fields(len = tag_text.len()))]
pub fn ingest_tag(
    creative_type: CreativeType,
    tag_text: &str,
    tracking_tags: Vec<String>,
) -> Result<Creative, Error> {
    if !CreativeType::TAG_TYPES.contains(&creative_type) {
        return Err(Error::invalid_field(
            "Invalid inputType",
            "inputType",
            "inputType for tag must be one of [DISPLAY_THIRD_PARTY_TAG, VIDEO_VAST_TAG].",
        ));
    }
    if tag_text.is_empty() {
        return Err(Error::invalid_field(
            "Tag validation failed",
            "tagText",
            "Tag text is required.",
        ));
    }
    if tag_text.chars().count() > TAG_TEXT_MAX_CHARS {
        return Err(Error::invalid_field(
            "Tag validation failed",
            "tagText",
            "Tag text must be at most 50000 characters.",
        ));
    }
    check_tracking_tags(&tracking_tags)?;

    let verdict: Verdict = if creative_type == CreativeType::DisplayThirdPartyTag {
        validate_dcm_tag(tag_text)
    } else {
        validate_vast_tag(tag_text)
    };
    let detail = if creative_type == CreativeType::DisplayThirdPartyTag {
        "DCM tag validation failed"
    } else {
        "VAST tag validation failed"
    };
    Error::check(detail, verdict)?;

    let macro_tokens = detect_in_all(
        std::iter::once(tag_text).chain(tracking_tags.iter().map(String::as_str)),
    );

    debug!(creative_type = ?creative_type, macros = macro_tokens.len(), "ingested tag creative");

    Ok(Creative {
        creative_type,
        source: CreativeSource::Tag,
        macro_tokens,
        tracking_tags,
        metadata: CreativeMetadata::default(),
        substituted_preview: Some(substitute_macros(tag_text)),
        generated_vast: None,
    })
}

/// Turns an error-free bulk entry into a creative of the archive's kind.
pub fn from_bulk_item(item: &bulk::BulkItem, mode: bulk::BulkMode, content_url: &str) -> Creative {
    match mode {
        bulk::BulkMode::Display => Creative {
            creative_type: CreativeType::DisplayImage,
            source: CreativeSource::File,
            macro_tokens: detect_in_all(item.tracking_tags.iter().map(String::as_str)),
            tracking_tags: item.tracking_tags.clone(),
            metadata: CreativeMetadata::image(&item.bytes, &item.content_type, item.dimensions),
            substituted_preview: None,
            generated_vast: None,
        },
        bulk::BulkMode::Video => Creative {
            creative_type: CreativeType::VideoFile,
            source: CreativeSource::File,
            macro_tokens: detect_in_all(item.tracking_tags.iter().map(String::as_str)),
            tracking_tags: item.tracking_tags.clone(),
            metadata: CreativeMetadata::video(&item.bytes),
            substituted_preview: None,
            generated_vast: Some(generate_vast_wrapper(content_url, &item.tracking_tags)),
        },
    }
}
