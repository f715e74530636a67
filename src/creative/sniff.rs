//! Header-level inspection of uploaded bytes.
//!
//! Nothing here decodes pixels or frames. Dimensions come from fixed offsets in
//! the container header and every read is bounds-checked, so truncated or
//! mislabelled input yields `None` instead of a panic.

use serde::{Deserialize, Serialize};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const GIF87_SIGNATURE: &[u8] = b"GIF87a";
const GIF89_SIGNATURE: &[u8] = b"GIF89a";
const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";
const ZIP_EMPTY_SIGNATURE: &[u8] = b"PK\x05\x06";
const TIFF_LE_SIGNATURE: &[u8] = b"II*\x00";
const TIFF_BE_SIGNATURE: &[u8] = b"MM\x00*";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }
}

/// Container kind as recognized from the leading magic bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainerKind {
    Png,
    Jpeg,
    Gif,
    Tiff,
    Zip,
    Mp4,
    Unknown,
}

/// Coarse facts about an upload that do not depend on its declared type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FileFacts {
    pub kind: ContainerKind,
    pub len: usize,
    pub dimensions: Option<Dimensions>,
}

pub fn inspect(data: &[u8]) -> FileFacts {
    FileFacts {
        kind: container_kind(data),
        len: data.len(),
        dimensions: image_dimensions(data),
    }
}

pub fn container_kind(data: &[u8]) -> ContainerKind {
    if data.starts_with(PNG_SIGNATURE) {
        ContainerKind::Png
    } else if is_jpeg(data) {
        ContainerKind::Jpeg
    } else if data.starts_with(GIF87_SIGNATURE) || data.starts_with(GIF89_SIGNATURE) {
        ContainerKind::Gif
    } else if data.starts_with(TIFF_LE_SIGNATURE) || data.starts_with(TIFF_BE_SIGNATURE) {
        ContainerKind::Tiff
    } else if data.starts_with(ZIP_SIGNATURE) || data.starts_with(ZIP_EMPTY_SIGNATURE) {
        ContainerKind::Zip
    } else if data.get(4..8) == Some(b"ftyp") {
        // ISO base media and QuickTime both open with an ftyp box
        ContainerKind::Mp4
    } else {
        ContainerKind::Unknown
    }
}

/// Reads pixel dimensions out of a PNG, JPEG or GIF header.
pub fn image_dimensions(data: &[u8]) -> Option<Dimensions> {
    if data.starts_with(PNG_SIGNATURE) {
        return png_dimensions(data);
    }
    if is_jpeg(data) {
        return jpeg_dimensions(data);
    }
    if data.starts_with(GIF87_SIGNATURE) || data.starts_with(GIF89_SIGNATURE) {
        return gif_dimensions(data);
    }
    None
}

fn is_jpeg(data: &[u8]) -> bool {
    matches!(data.get(0..2), Some([0xFF, 0xD8]) | Some([0xFF, 0xD9]))
}

fn png_dimensions(data: &[u8]) -> Option<Dimensions> {
    // IHDR is always the first chunk: width and height follow its type field
    let width = read_u32_be(data, 16)?;
    let height = read_u32_be(data, 20)?;
    Some(Dimensions::new(width, height))
}

fn jpeg_dimensions(data: &[u8]) -> Option<Dimensions> {
    let mut i = 2;
    while i + 9 < data.len() {
        if data[i] == 0xFF && matches!(data[i + 1], 0xC0 | 0xC2) {
            let height = read_u16_be(data, i + 5)?;
            let width = read_u16_be(data, i + 7)?;
            return Some(Dimensions::new(u32::from(width), u32::from(height)));
        }
        if data[i] != 0xFF {
            i += 1;
            continue;
        }
        let segment_len = read_u16_be(data, i + 2)?;
        i += 2 + usize::from(segment_len);
    }
    None
}

fn gif_dimensions(data: &[u8]) -> Option<Dimensions> {
    let width = read_u16_le(data, 6)?;
    let height = read_u16_le(data, 8)?;
    Some(Dimensions::new(u32::from(width), u32::from(height)))
}

fn read_u16_be(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn read_u16_le(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32_be(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Minimal headers for tests elsewhere in the crate.
#[cfg(test)]
pub(crate) mod fixtures {
    pub fn png(width: u32, height: u32) -> Vec<u8> {
        let mut data = super::PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&13u32.to_be_bytes());
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[8, 6, 0, 0, 0]);
        data
    }

    pub fn gif(width: u16, height: u16) -> Vec<u8> {
        let mut data = super::GIF89_SIGNATURE.to_vec();
        data.extend_from_slice(&width.to_le_bytes());
        data.extend_from_slice(&height.to_le_bytes());
        data.extend_from_slice(&[0, 0, 0]);
        data
    }

    pub fn jpeg(width: u16, height: u16) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8];
        // APP0 segment the scanner has to skip over
        data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
        data.extend_from_slice(b"JFIF\x00\x01\x01\x00\x00\x01\x00\x01\x00\x00");
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&[0x03, 0x01, 0x22, 0x00, 0xFF, 0xD9]);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures;
    use super::*;

    #[test]
    fn reads_png_dimensions() {
        let data = fixtures::png(300, 250);

        assert_eq!(image_dimensions(&data), Some(Dimensions::new(300, 250)));
        assert_eq!(container_kind(&data), ContainerKind::Png);
    }

    #[test]
    fn reads_gif_dimensions() {
        let data = fixtures::gif(728, 90);

        assert_eq!(image_dimensions(&data), Some(Dimensions::new(728, 90)));
    }

    #[test]
    fn reads_jpeg_dimensions_past_app_segment() {
        let data = fixtures::jpeg(1920, 1080);

        assert_eq!(image_dimensions(&data), Some(Dimensions::new(1920, 1080)));
        assert_eq!(container_kind(&data), ContainerKind::Jpeg);
    }

    #[test]
    fn truncated_headers_yield_none() {
        let png = fixtures::png(300, 250);
        let jpeg = fixtures::jpeg(300, 250);

        assert_eq!(image_dimensions(&png[..20]), None);
        assert_eq!(image_dimensions(&jpeg[..12]), None);
        assert_eq!(image_dimensions(b"GIF89a\x01"), None);
        assert_eq!(image_dimensions(&[]), None);
    }

    #[test]
    fn jpeg_with_oversized_segment_length_does_not_panic() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0xFF, 0xFF, 0, 0, 0, 0, 0, 0, 0];

        assert_eq!(image_dimensions(&data), None);
    }

    #[test]
    fn recognizes_other_containers() {
        assert_eq!(container_kind(b"PK\x03\x04rest"), ContainerKind::Zip);
        assert_eq!(container_kind(b"\x00\x00\x00\x18ftypmp42"), ContainerKind::Mp4);
        assert_eq!(container_kind(b"II*\x00...."), ContainerKind::Tiff);
        assert_eq!(container_kind(b"plain text"), ContainerKind::Unknown);
    }

    #[test]
    fn inspect_reports_length() {
        let data = fixtures::gif(250, 250);

        let facts = inspect(&data);

        assert_eq!(facts.len, data.len());
        assert_eq!(facts.kind, ContainerKind::Gif);
        assert_eq!(facts.dimensions, Some(Dimensions::new(250, 250)));
    }
}
