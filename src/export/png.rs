//! Structural PNG probe.
//!
//! Walks the chunk list of a PNG stream and reports whether the image can
//! carry alpha: an alpha colour type in `IHDR` or any `tRNS` chunk. Pixel
//! data is never decoded; each chunk costs one 8-byte header read, at most
//! 12 payload bytes and a seek.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{ExportError, Result};

/// The 8-byte signature every PNG file starts with.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Payload bytes read from each chunk. Enough for everything up to the
/// colour type in `IHDR`.
const PAYLOAD_PEEK: u32 = 12;

/// CRC trailing every chunk.
const CRC_LEN: i64 = 4;

/// What a chunk walk found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PngSummary {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bit_depth: Option<u8>,
    pub color_type: Option<u8>,
    pub has_transparency_chunk: bool,
    /// Chunk tags in stream order.
    pub chunks: Vec<String>,
    /// The stream ended before `IEND`.
    pub truncated: bool,
}

impl PngSummary {
    /// Colour type 4 (grey + alpha) or 6 (RGBA).
    pub fn has_alpha_channel(&self) -> bool {
        matches!(self.color_type, Some(4) | Some(6))
    }

    pub fn has_alpha(&self) -> bool {
        self.has_alpha_channel() || self.has_transparency_chunk
    }

    pub fn color_type_name(&self) -> &'static str {
        match self.color_type {
            Some(0) => "greyscale",
            Some(2) => "rgb",
            Some(3) => "indexed",
            Some(4) => "greyscale+alpha",
            Some(6) => "rgba",
            Some(_) => "invalid",
            None => "unknown",
        }
    }
}

/// Walk the chunks of a PNG stream positioned just after the signature.
pub fn inspect_png<R: Read + Seek>(reader: &mut R) -> Result<PngSummary> {
    let mut summary = PngSummary::default();

    loop {
        let mut header = [0u8; 8];
        if !read_full(reader, &mut header)? {
            summary.truncated = true;
            break;
        }

        let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        let tag = [header[4], header[5], header[6], header[7]];

        let peek = length.min(PAYLOAD_PEEK) as usize;
        let mut payload = Vec::with_capacity(peek);
        reader.by_ref().take(peek as u64).read_to_end(&mut payload)?;

        match &tag {
            b"IHDR" => read_ihdr(&payload, &mut summary),
            b"tRNS" => summary.has_transparency_chunk = true,
            _ => {}
        }
        summary.chunks.push(String::from_utf8_lossy(&tag).into_owned());

        if &tag == b"IEND" {
            break;
        }
        if payload.len() < peek {
            summary.truncated = true;
            break;
        }

        let skip = i64::from(length.saturating_sub(PAYLOAD_PEEK)) + CRC_LEN;
        reader.seek(SeekFrom::Current(skip))?;
    }

    Ok(summary)
}

/// Whether a PNG stream positioned after the signature carries alpha.
pub fn scan_png_alpha<R: Read + Seek>(reader: &mut R) -> Result<bool> {
    Ok(inspect_png(reader)?.has_alpha())
}

/// Check the signature of a PNG file and walk its chunks.
pub fn inspect_png_file(path: &Path) -> Result<PngSummary> {
    let file = File::open(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to open PNG: {}", e),
    })?;
    let mut reader = BufReader::new(file);

    let mut signature = [0u8; 8];
    if !read_full(&mut reader, &mut signature)? || signature != PNG_SIGNATURE {
        return Err(ExportError::Parse {
            message: format!("{} is not a PNG file", path.display()),
            help: None,
        });
    }

    inspect_png(&mut reader)
}

/// Whether the PNG file at `path` carries alpha.
pub fn png_file_has_alpha(path: &Path) -> Result<bool> {
    Ok(inspect_png_file(path)?.has_alpha())
}

fn read_ihdr(payload: &[u8], summary: &mut PngSummary) {
    if payload.len() >= 8 {
        summary.width = Some(u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]));
        summary.height = Some(u32::from_be_bytes([payload[4], payload[5], payload[6], payload[7]]));
    }
    if payload.len() >= 10 {
        summary.bit_depth = Some(payload[8]);
        summary.color_type = Some(payload[9]);
    }
}

/// Fill `buf` completely. Returns false if the stream ends first.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Ok(false),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(tag);
        out.extend_from_slice(payload);
        out.extend_from_slice(&[0, 0, 0, 0]); // CRC is not checked
        out
    }

    fn ihdr(width: u32, height: u32, color_type: u8) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(&width.to_be_bytes());
        payload.extend_from_slice(&height.to_be_bytes());
        payload.extend_from_slice(&[8, color_type, 0, 0, 0]);
        chunk(b"IHDR", &payload)
    }

    /// A structurally valid PNG body (after the signature).
    pub(crate) fn png_body(color_type: u8, with_trns: bool) -> Vec<u8> {
        let mut out = ihdr(4, 2, color_type);
        if color_type == 3 {
            out.extend(chunk(b"PLTE", &[0, 0, 0, 255, 255, 255]));
        }
        if with_trns {
            out.extend(chunk(b"tRNS", &[0]));
        }
        out.extend(chunk(b"IDAT", &[0u8; 40]));
        out.extend(chunk(b"IEND", &[]));
        out
    }

    pub(crate) fn png_file(color_type: u8, with_trns: bool) -> Vec<u8> {
        let mut out = PNG_SIGNATURE.to_vec();
        out.extend(png_body(color_type, with_trns));
        out
    }

    #[test]
    fn test_rgba_has_alpha() {
        assert!(scan_png_alpha(&mut Cursor::new(png_body(6, false))).unwrap());
    }

    #[test]
    fn test_grey_alpha_has_alpha() {
        assert!(scan_png_alpha(&mut Cursor::new(png_body(4, false))).unwrap());
    }

    #[test]
    fn test_rgb_without_trns_is_opaque() {
        assert!(!scan_png_alpha(&mut Cursor::new(png_body(2, false))).unwrap());
    }

    #[test]
    fn test_indexed_with_trns_has_alpha() {
        assert!(scan_png_alpha(&mut Cursor::new(png_body(3, true))).unwrap());
    }

    #[test]
    fn test_summary_reads_ihdr_and_chunk_order() {
        let summary = inspect_png(&mut Cursor::new(png_body(3, true))).unwrap();
        assert_eq!(summary.width, Some(4));
        assert_eq!(summary.height, Some(2));
        assert_eq!(summary.bit_depth, Some(8));
        assert_eq!(summary.color_type_name(), "indexed");
        assert_eq!(summary.chunks, vec!["IHDR", "PLTE", "tRNS", "IDAT", "IEND"]);
        assert!(!summary.truncated);
    }

    #[test]
    fn test_stops_at_iend() {
        let mut body = png_body(2, false);
        // Anything after IEND is ignored, even a tRNS chunk
        body.extend(chunk(b"tRNS", &[0]));
        let summary = inspect_png(&mut Cursor::new(body)).unwrap();
        assert!(!summary.has_alpha());
        assert_eq!(summary.chunks.last().map(String::as_str), Some("IEND"));
    }

    #[test]
    fn test_truncated_stream_does_not_fail() {
        let mut body = ihdr(4, 4, 2);
        body.extend_from_slice(&1000u32.to_be_bytes());
        body.extend_from_slice(b"IDAT");
        body.extend_from_slice(&[1, 2, 3]);

        let summary = inspect_png(&mut Cursor::new(body)).unwrap();
        assert!(summary.truncated);
        assert!(!summary.has_alpha());
    }

    #[test]
    fn test_missing_iend_ends_at_eof() {
        let mut body = ihdr(1, 1, 6);
        body.extend(chunk(b"IDAT", &[0u8; 3]));
        let summary = inspect_png(&mut Cursor::new(body)).unwrap();
        assert!(summary.truncated);
        assert!(summary.has_alpha());
    }

    #[test]
    fn test_short_ihdr_contributes_nothing() {
        let mut body = chunk(b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8]);
        body.extend(chunk(b"IEND", &[]));
        let summary = inspect_png(&mut Cursor::new(body)).unwrap();
        assert_eq!(summary.color_type, None);
        assert!(!summary.has_alpha());
    }

    #[test]
    fn test_small_chunks_skip_only_crc() {
        // A 2-byte chunk must not swallow the following header
        let mut body = ihdr(1, 1, 0);
        body.extend(chunk(b"gAMA", &[1, 2]));
        body.extend(chunk(b"tRNS", &[0, 0]));
        body.extend(chunk(b"IEND", &[]));
        assert!(scan_png_alpha(&mut Cursor::new(body)).unwrap());
    }

    #[test]
    fn test_file_signature_checked() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        let bad = dir.path().join("bad.png");
        std::fs::write(&good, png_file(6, false)).unwrap();
        std::fs::write(&bad, b"GIF89a not a png").unwrap();

        assert!(png_file_has_alpha(&good).unwrap());
        assert!(matches!(
            png_file_has_alpha(&bad).unwrap_err(),
            ExportError::Parse { .. }
        ));
    }

    #[test]
    fn test_real_encoder_output() {
        let dir = tempfile::tempdir().unwrap();
        let rgb = dir.path().join("rgb.png");
        let rgba = dir.path().join("rgba.png");
        image::RgbImage::new(3, 3).save(&rgb).unwrap();
        image::RgbaImage::new(3, 3).save(&rgba).unwrap();

        assert!(!png_file_has_alpha(&rgb).unwrap());
        assert!(png_file_has_alpha(&rgba).unwrap());
    }
}
