//! Bulk creative uploads: a ZIP of assets with an optional `manifest.csv`
//! assigning tracking tags to files by name.
//!
//! A malformed archive is the only archive-level failure. Everything wrong
//! with an individual entry, including being unreadable, stays on that entry
//! so the remaining entries are still reported.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::creative::sniff::{image_dimensions, Dimensions};
use crate::creative::validate::{
    extension, validate_display_image, validate_tracking_tags, validate_video_file,
    DISPLAY_IMAGE_EXTENSIONS, TRACKING_TAGS_MAX,
};
use crate::violations::{Verdict, Violation};

const MANIFEST_NAME: &str = "manifest.csv";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulkMode {
    Display,
    Video,
}

#[derive(Clone, Debug)]
pub struct BulkItem {
    /// Base name of the entry, without any directory prefix.
    pub filename: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub tracking_tags: Vec<String>,
    pub dimensions: Option<Dimensions>,
    pub errors: Verdict,
}

#[derive(Clone, Debug, Default)]
pub struct BulkArchive {
    pub items: Vec<BulkItem>,
    pub errors: Verdict,
}

impl BulkArchive {
    fn invalid() -> BulkArchive {
        BulkArchive {
            items: vec![],
            errors: Verdict::from(vec![Violation::new("file", "Invalid ZIP file.")]),
        }
    }

    /// True when neither the archive nor any of its items failed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_valid() && self.items.iter().all(|item| item.errors.is_valid())
    }
}

#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn parse_bulk_archive(bytes: &[u8], mode: BulkMode) -> BulkArchive {
    let mut archive = match ZipArchive::new(Cursor::new(bytes)) {
        Ok(archive) => archive,
        Err(err) => {
            warn!(%err, "rejecting bulk upload that is not a zip archive");
            return BulkArchive::invalid();
        }
    };

    let entries = (0..archive.len())
        .map(|index| read_entry(&mut archive, index))
        .collect::<Vec<_>>();

    let manifest = entries
        .iter()
        .find(|entry| is_manifest(&entry.name))
        .and_then(|entry| entry.data.as_deref().ok())
        .map(parse_manifest)
        .unwrap_or_default();

    let items = entries
        .into_iter()
        .filter(|entry| !entry.name.ends_with('/') && !is_manifest(&entry.name))
        .map(|entry| build_item(entry, &manifest, mode))
        .collect::<Vec<BulkItem>>();

    debug!(items = items.len(), manifest_rows = manifest.len(), "parsed bulk archive");

    BulkArchive {
        items,
        errors: Verdict::new(),
    }
}

struct RawEntry {
    name: String,
    data: Result<Vec<u8>, String>,
}

fn read_entry(archive: &mut ZipArchive<Cursor<&[u8]>>, index: usize) -> RawEntry {
    let name = match archive.by_index_raw(index) {
        Ok(file) => file.name().to_owned(),
        Err(err) => {
            return RawEntry {
                name: format!("#{}", index),
                data: Err(err.to_string()),
            }
        }
    };

    let data = archive
        .by_index(index)
        .map_err(|err| err.to_string())
        .and_then(|mut file| {
            let mut data = Vec::new();
            file.read_to_end(&mut data).map_err(|err| err.to_string())?;
            Ok(data)
        });

    RawEntry { name, data }
}

fn is_manifest(name: &str) -> bool {
    name.to_lowercase().ends_with(MANIFEST_NAME)
}

fn base_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn build_item(entry: RawEntry, manifest: &HashMap<String, Vec<String>>, mode: BulkMode) -> BulkItem {
    let filename = base_name(&entry.name).to_owned();

    let bytes = match entry.data {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(%err, entry = %entry.name, "could not read bulk archive entry");
            return BulkItem {
                filename,
                bytes: vec![],
                content_type: "application/octet-stream".to_owned(),
                tracking_tags: vec![],
                dimensions: None,
                errors: Verdict::from(vec![Violation::new("file", "Could not read archive entry.")]),
            };
        }
    };

    if mode == BulkMode::Video && extension(&filename) != "mp4" {
        return BulkItem {
            filename,
            bytes,
            content_type: "application/octet-stream".to_owned(),
            tracking_tags: vec![],
            dimensions: None,
            errors: Verdict::from(vec![Violation::new(
                "file",
                "Only .mp4 files allowed in video bulk upload.",
            )]),
        };
    }

    let tracking_tags: Vec<String> = manifest
        .get(&filename)
        .map(|tags| tags.iter().take(TRACKING_TAGS_MAX).cloned().collect())
        .unwrap_or_default();

    let mut errors = Verdict::new();
    let (content_type, dimensions) = match mode {
        BulkMode::Display => {
            let ext = extension(&filename);
            let dimensions = if DISPLAY_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                image_dimensions(&bytes)
            } else {
                None
            };
            errors.merge(validate_display_image(&filename, bytes.len(), dimensions));
            (display_content_type(&ext), dimensions)
        }
        BulkMode::Video => {
            errors.merge(validate_video_file(&filename));
            ("video/mp4", None)
        }
    };

    let tracking_field = format!("{}:tracking", filename);
    for violation in validate_tracking_tags(&tracking_tags).into_violations() {
        errors.push(tracking_field.clone(), violation.message);
    }

    BulkItem {
        filename,
        bytes,
        content_type: content_type.to_owned(),
        tracking_tags,
        dimensions,
        errors,
    }
}

fn display_content_type(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "tiff" => "image/tiff",
        _ => "image/png",
    }
}

/// Maps base filename to its tracking tags. Without a `filename` column the
/// manifest contributes nothing. Rows that fail to parse are skipped.
fn parse_manifest(data: &[u8]) -> HashMap<String, Vec<String>> {
    let text = String::from_utf8_lossy(data);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(err) => {
            warn!(%err, "unreadable manifest header");
            return HashMap::new();
        }
    };

    let filename_index = match headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case("filename"))
    {
        Some(index) => index,
        None => return HashMap::new(),
    };

    let tracking_indices = headers
        .iter()
        .enumerate()
        .filter(|(index, header)| {
            *index != filename_index && header.to_lowercase().starts_with("tracking")
        })
        .map(|(index, _)| index)
        .take(TRACKING_TAGS_MAX)
        .collect::<Vec<_>>();

    let mut rows = HashMap::new();
    for record in reader.records().filter_map(Result::ok) {
        let filename = match record.get(filename_index) {
            Some(filename) => filename.trim_start_matches(|c| c == '.' || c == '/'),
            None => continue,
        };

        let tags = tracking_indices
            .iter()
            .filter_map(|index| record.get(*index))
            .filter(|tag| !tag.is_empty())
            .map(str::to_owned)
            .collect();

        rows.insert(filename.to_owned(), tags);
    }
    rows
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::FileOptions;
    use zip::ZipWriter;

    use super::*;
    use crate::creative::sniff::fixtures;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn garbage_is_an_invalid_archive() {
        let archive = parse_bulk_archive(b"definitely not a zip", BulkMode::Display);

        assert!(archive.items.is_empty());
        assert_eq!(
            archive.errors.violations(),
            &[Violation::new("file", "Invalid ZIP file.")]
        );
        assert!(!archive.is_clean());
    }

    #[test]
    fn bad_entry_does_not_affect_siblings() {
        let png = fixtures::png(300, 250);
        let gif = fixtures::gif(300, 600);
        let jpeg = fixtures::jpeg(1920, 1080);
        let data = build_zip(&[
            ("a.png", &png),
            ("b.gif", &gif),
            ("nested/c.jpg", &jpeg),
            ("notes.txt", b"hello"),
        ]);

        let archive = parse_bulk_archive(&data, BulkMode::Display);

        assert!(archive.errors.is_valid());
        assert_eq!(archive.items.len(), 4);
        let failing = archive
            .items
            .iter()
            .filter(|item| !item.errors.is_valid())
            .map(|item| item.filename.as_str())
            .collect::<Vec<_>>();
        assert_eq!(failing, vec!["notes.txt"]);
        assert_eq!(archive.items[2].filename, "c.jpg");
        assert_eq!(archive.items[2].content_type, "image/jpeg");
        assert_eq!(archive.items[2].dimensions, Some(Dimensions::new(1920, 1080)));
    }

    #[test]
    fn manifest_assigns_tracking_tags_by_base_name() {
        let png = fixtures::png(300, 250);
        let manifest = b"Filename,tracking1,tracking2,notes\n\
            ./a.png,https://t.example.com/1,<img src='x'>,ignored\n\
            other.png,https://t.example.com/9\n";
        let data = build_zip(&[("creatives/a.png", &png), ("creatives/manifest.csv", manifest)]);

        let archive = parse_bulk_archive(&data, BulkMode::Display);

        assert_eq!(archive.items.len(), 1);
        assert_eq!(
            archive.items[0].tracking_tags,
            vec!["https://t.example.com/1", "<img src='x'>"]
        );
        assert!(archive.items[0].errors.is_valid());
    }

    #[test]
    fn manifest_reads_at_most_five_tracking_columns() {
        let png = fixtures::png(300, 250);
        let manifest = b"filename,tracking1,tracking2,tracking3,tracking4,tracking5,tracking6\n\
            a.png,https://t.example.com/1,https://t.example.com/2,https://t.example.com/3,\
            https://t.example.com/4,https://t.example.com/5,https://t.example.com/6\n";
        let data = build_zip(&[("a.png", &png), ("manifest.csv", manifest)]);

        let archive = parse_bulk_archive(&data, BulkMode::Display);

        assert_eq!(archive.items[0].tracking_tags.len(), 5);
        assert_eq!(archive.items[0].tracking_tags[4], "https://t.example.com/5");
        assert!(archive.is_clean());
    }

    #[test]
    fn tracking_errors_are_keyed_by_file() {
        let png = fixtures::png(300, 250);
        let manifest = b"filename,tracking1\na.png,not a pixel\n";
        let data = build_zip(&[("a.png", &png), ("manifest.csv", manifest)]);

        let archive = parse_bulk_archive(&data, BulkMode::Display);

        assert_eq!(archive.items[0].errors.violations()[0].field, "a.png:tracking");
    }

    #[test]
    fn manifest_without_filename_column_is_ignored() {
        let png = fixtures::png(300, 250);
        let manifest = b"name,tracking1\na.png,https://t.example.com/1\n";
        let data = build_zip(&[("a.png", &png), ("manifest.csv", manifest)]);

        let archive = parse_bulk_archive(&data, BulkMode::Display);

        assert!(archive.items[0].tracking_tags.is_empty());
    }

    #[test]
    fn video_mode_rejects_non_mp4_entries() {
        let manifest = b"filename,tracking1\nclip.mov,https://t.example.com/1\n";
        let data = build_zip(&[
            ("clip.mp4", b"\x00\x00\x00\x18ftypmp42"),
            ("clip.mov", b"\x00\x00\x00\x14ftypqt  "),
            ("manifest.csv", manifest),
        ]);

        let archive = parse_bulk_archive(&data, BulkMode::Video);

        assert_eq!(archive.items.len(), 2);
        assert!(archive.items[0].errors.is_valid());
        assert_eq!(archive.items[0].content_type, "video/mp4");
        assert_eq!(
            archive.items[1].errors.violations(),
            &[Violation::new("file", "Only .mp4 files allowed in video bulk upload.")]
        );
        assert!(archive.items[1].tracking_tags.is_empty());
    }

    #[test]
    fn directories_are_skipped() {
        let png = fixtures::png(300, 250);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.add_directory("assets/", FileOptions::default()).unwrap();
        writer.start_file("assets/a.png", FileOptions::default()).unwrap();
        writer.write_all(&png).unwrap();
        let data = writer.finish().unwrap().into_inner();

        let archive = parse_bulk_archive(&data, BulkMode::Display);

        assert_eq!(archive.items.len(), 1);
        assert!(archive.is_clean());
    }
}
