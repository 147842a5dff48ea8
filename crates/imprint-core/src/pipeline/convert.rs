//! Image conversion: decode, flatten alpha, JPEG-encode, stamp author EXIF.

use std::io::Cursor;
use std::path::Path;

use chrono::{DateTime, Datelike, Local};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageReader, RgbImage};
use img_parts::jpeg::Jpeg;
use img_parts::ImageEXIF;

use crate::error::ConvertError;
use crate::pipeline::author::{sanitize_component, sanitize_stem};
use crate::pipeline::hash::short_fingerprint;
use crate::types::ConvertedImage;

// TIFF tag ids, ascending order as IFD0 requires.
const TAG_IMAGE_DESCRIPTION: u16 = 0x010E;
const TAG_ARTIST: u16 = 0x013B;
const TAG_COPYRIGHT: u16 = 0x8298;

/// Converts source images to author-stamped JPGs.
pub struct Converter {
    quality: u8,
}

impl Converter {
    /// Create a converter with the given JPEG quality (1-100).
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }

    /// Convert the image at `source`, writing the result into `output_dir`.
    ///
    /// Reads the file and delegates to [`Converter::convert_bytes`].
    pub fn convert(
        &self,
        source: &Path,
        author: &str,
        fingerprint: &str,
        timestamp: DateTime<Local>,
        output_dir: &Path,
    ) -> Result<ConvertedImage, ConvertError> {
        let bytes = std::fs::read(source).map_err(|source_err| ConvertError::Read {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        self.convert_bytes(&bytes, source, author, fingerprint, timestamp, output_dir)
    }

    /// Convert already-read source bytes.
    ///
    /// The pipeline reads each source once, fingerprints the buffer, then
    /// hands the same buffer here so no file is read twice.
    pub fn convert_bytes(
        &self,
        bytes: &[u8],
        source: &Path,
        author: &str,
        fingerprint: &str,
        timestamp: DateTime<Local>,
        output_dir: &Path,
    ) -> Result<ConvertedImage, ConvertError> {
        let decoded = decode(bytes, source)?;
        let rgb = flatten_to_rgb(decoded);
        let (width, height) = rgb.dimensions();

        let encoded = self.encode_jpeg(&rgb, source)?;
        let exif = build_exif_segment(&author_exif_entries(author, timestamp));
        let stamped = embed_exif(encoded, exif, source)?;

        let output_filename = output_filename(author, source, fingerprint, timestamp);
        let output_path = output_dir.join(&output_filename);
        std::fs::write(&output_path, &stamped).map_err(|source_err| ConvertError::Write {
            path: output_path.clone(),
            source: source_err,
        })?;

        tracing::info!(
            "Converted {:?} -> {} ({}x{})",
            source.file_name().unwrap_or_default(),
            output_filename,
            width,
            height
        );

        Ok(ConvertedImage {
            output_filename,
            width,
            height,
            bytes_written: stamped.len() as u64,
        })
    }

    /// Encode flattened RGB pixels as JPEG at the configured quality.
    ///
    /// Dimensions are preserved exactly; no resizing or downsampling.
    fn encode_jpeg(&self, rgb: &RgbImage, source: &Path) -> Result<Vec<u8>, ConvertError> {
        let mut buffer = Cursor::new(Vec::new());
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
        encoder
            .encode(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| ConvertError::Encode {
                path: source.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(buffer.into_inner())
    }
}

/// Decode source bytes, routing HEIC/HEIF to libheif.
fn decode(bytes: &[u8], path: &Path) -> Result<DynamicImage, ConvertError> {
    if is_heif(path) {
        return decode_heif(bytes, path);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ConvertError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot detect image format: {}", e),
        })?;
    reader.decode().map_err(|e| ConvertError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn is_heif(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            ext == "heic" || ext == "heif"
        })
        .unwrap_or(false)
}

#[cfg(feature = "heic")]
fn decode_heif(bytes: &[u8], path: &Path) -> Result<DynamicImage, ConvertError> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let decode_err = |message: String| ConvertError::Decode {
        path: path.to_path_buf(),
        message,
    };

    let lib_heif = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(bytes).map_err(|e| decode_err(e.to_string()))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| decode_err(e.to_string()))?;
    let decoded = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(|e| decode_err(e.to_string()))?;

    let planes = decoded.planes();
    let interleaved = planes
        .interleaved
        .ok_or_else(|| decode_err("no interleaved RGB plane".to_string()))?;

    let width = interleaved.width;
    let height = interleaved.height;
    let stride = interleaved.stride;

    // Rows are stride-padded; copy pixel data row by row.
    let mut rgb = RgbImage::new(width, height);
    for (y, row) in interleaved
        .data
        .chunks(stride)
        .take(height as usize)
        .enumerate()
    {
        for x in 0..width as usize {
            let i = x * 3;
            rgb.put_pixel(
                x as u32,
                y as u32,
                image::Rgb([row[i], row[i + 1], row[i + 2]]),
            );
        }
    }

    Ok(DynamicImage::ImageRgb8(rgb))
}

#[cfg(not(feature = "heic"))]
fn decode_heif(_bytes: &[u8], path: &Path) -> Result<DynamicImage, ConvertError> {
    Err(ConvertError::UnsupportedFormat {
        path: path.to_path_buf(),
        format: "heic/heif (rebuild with the `heic` feature)".to_string(),
    })
}

/// Flatten any alpha channel onto an opaque white background.
///
/// JPG has no alpha; compositing onto white keeps transparent regions from
/// rendering as black fringes.
fn flatten_to_rgb(image: DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.into_rgb8();
    }

    let rgba = image.into_rgba8();
    let (width, height) = rgba.dimensions();
    let mut rgb = RgbImage::new(width, height);
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let a = a as u16;
        let blend = |c: u8| ((c as u16 * a + 255 * (255 - a)) / 255) as u8;
        rgb.put_pixel(x, y, image::Rgb([blend(r), blend(g), blend(b)]));
    }
    rgb
}

/// The three ASCII tags stamped into every output, in ascending tag order.
fn author_exif_entries(author: &str, timestamp: DateTime<Local>) -> Vec<(u16, String)> {
    vec![
        (TAG_IMAGE_DESCRIPTION, format!("Author: {}", author)),
        (TAG_ARTIST, author.to_string()),
        (TAG_COPYRIGHT, format!("Copyright {} {}", timestamp.year(), author)),
    ]
}

/// Build a little-endian TIFF structure with one IFD0 holding ASCII entries.
///
/// `entries` must be sorted ascending by tag id. The returned bytes are the
/// raw TIFF payload; the JPEG APP1 `Exif\0\0` identifier is added by the
/// container writer.
fn build_exif_segment(entries: &[(u16, String)]) -> Vec<u8> {
    let ifd_offset: u32 = 8;
    let ifd_size = 2 + 12 * entries.len() + 4;
    let data_offset = ifd_offset + ifd_size as u32;

    let mut exif = Vec::new();
    exif.extend_from_slice(b"II");
    exif.extend_from_slice(&42u16.to_le_bytes());
    exif.extend_from_slice(&ifd_offset.to_le_bytes());

    exif.extend_from_slice(&(entries.len() as u16).to_le_bytes());

    let mut data_area: Vec<u8> = Vec::new();
    for (tag, value) in entries {
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0); // ASCII values are NUL-terminated
        let count = bytes.len() as u32;

        exif.extend_from_slice(&tag.to_le_bytes());
        exif.extend_from_slice(&2u16.to_le_bytes()); // type: ASCII
        exif.extend_from_slice(&count.to_le_bytes());

        if count <= 4 {
            let mut inline = [0u8; 4];
            inline[..bytes.len()].copy_from_slice(&bytes);
            exif.extend_from_slice(&inline);
        } else {
            exif.extend_from_slice(&(data_offset + data_area.len() as u32).to_le_bytes());
            if bytes.len() % 2 == 1 {
                bytes.push(0); // keep value offsets even
            }
            data_area.extend_from_slice(&bytes);
        }
    }

    exif.extend_from_slice(&0u32.to_le_bytes()); // no next IFD
    exif.extend_from_slice(&data_area);
    exif
}

/// Embed the EXIF payload into encoded JPEG bytes.
fn embed_exif(encoded: Vec<u8>, exif: Vec<u8>, source: &Path) -> Result<Vec<u8>, ConvertError> {
    let encode_err = |message: String| ConvertError::Encode {
        path: source.to_path_buf(),
        message,
    };

    let mut jpeg = Jpeg::from_bytes(encoded.into()).map_err(|e| encode_err(e.to_string()))?;
    jpeg.set_exif(Some(exif.into()));

    let mut output = Vec::new();
    jpeg.encoder()
        .write_to(&mut output)
        .map_err(|e| encode_err(e.to_string()))?;
    Ok(output)
}

/// Generate the unique output filename:
/// `{author}_{YYYYMMDD_HHMMSS}_{original_stem}_{8-hex fingerprint}.jpg`.
pub fn output_filename(
    author: &str,
    source: &Path,
    fingerprint: &str,
    timestamp: DateTime<Local>,
) -> String {
    let stamp = timestamp.format("%Y%m%d_%H%M%S");
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    format!(
        "{}_{}_{}_{}.jpg",
        sanitize_component(author),
        stamp,
        sanitize_stem(stem),
        short_fingerprint(fingerprint)
    )
}
