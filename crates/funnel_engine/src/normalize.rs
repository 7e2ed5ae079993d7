use base64::{engine::general_purpose::STANDARD, Engine as _};
use funnel_core::{NormalizedImage, RawImageInput};
use funnel_logging::funnel_debug;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use crate::DecodeError;

pub const JPEG_DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerSettings {
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: u8,
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            max_width: 800,
            max_height: 600,
            jpeg_quality: 75,
        }
    }
}

/// Output size for a `width` x `height` image.
///
/// Landscape and square images are bounded by `max_width` only, portrait
/// images by `max_height` only. The other side scales proportionally and is
/// rounded to the nearest pixel.
pub fn target_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width >= height {
        if width > max_width {
            (max_width, scale(height, max_width, width))
        } else {
            (width, height)
        }
    } else if height > max_height {
        (scale(width, max_height, height), max_height)
    } else {
        (width, height)
    }
}

fn scale(side: u32, bound: u32, longer: u32) -> u32 {
    let scaled = (f64::from(side) * (f64::from(bound) / f64::from(longer))).round();
    (scaled as u32).max(1)
}

/// Decode, bound and re-encode one image as a JPEG data URL. CPU-bound.
pub fn normalize_bytes(
    input: &RawImageInput,
    settings: &NormalizerSettings,
) -> Result<NormalizedImage, DecodeError> {
    let decoded = decode(input)?;
    let (width, height) = target_dimensions(
        decoded.width(),
        decoded.height(),
        settings.max_width,
        settings.max_height,
    );
    let resized = if (width, height) == (decoded.width(), decoded.height()) {
        decoded
    } else {
        decoded.resize_exact(width, height, FilterType::Lanczos3)
    };

    // JPEG has no alpha channel.
    let rgb = resized.to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, settings.jpeg_quality)
        .encode_image(&rgb)
        .map_err(|err| DecodeError::Encode {
            label: input.label.clone(),
            message: err.to_string(),
        })?;

    let data_url = format!("{JPEG_DATA_URL_PREFIX}{}", STANDARD.encode(&jpeg));
    Ok(NormalizedImage::new(data_url, rgb.width(), rgb.height()))
}

/// The declared format is tried first; a mislabeled file still decodes from
/// what its bytes actually are.
fn decode(input: &RawImageInput) -> Result<DynamicImage, DecodeError> {
    let result = match declared_format(input.media_type.as_deref())? {
        Some(format) => image::load_from_memory_with_format(&input.bytes, format).or_else(|err| {
            funnel_debug!(
                "{} is not {:?} as declared ({}); sniffing its format",
                input.label,
                format,
                err
            );
            image::load_from_memory(&input.bytes).map_err(|_| err)
        }),
        None => image::load_from_memory(&input.bytes),
    };
    result.map_err(|err| DecodeError::Decode {
        label: input.label.clone(),
        message: err.to_string(),
    })
}

/// `Ok(None)` means "sniff the bytes".
fn declared_format(media_type: Option<&str>) -> Result<Option<ImageFormat>, DecodeError> {
    let Some(raw) = media_type else {
        return Ok(None);
    };
    let essence = raw.split(';').next().unwrap_or(raw).trim();
    if essence.is_empty() || essence.eq_ignore_ascii_case("application/octet-stream") {
        return Ok(None);
    }
    let lowered = essence.to_ascii_lowercase();
    if !lowered.starts_with("image/") {
        return Err(DecodeError::UnsupportedMediaType {
            media_type: essence.to_string(),
        });
    }
    Ok(ImageFormat::from_mime_type(&lowered))
}

#[async_trait::async_trait]
pub trait ImageNormalizer: Send + Sync {
    async fn normalize(&self, input: RawImageInput) -> Result<NormalizedImage, DecodeError>;
}

/// Normalizes on tokio's blocking pool so concurrent inputs interleave.
#[derive(Debug, Clone, Default)]
pub struct JpegNormalizer {
    settings: NormalizerSettings,
}

impl JpegNormalizer {
    pub fn new(settings: NormalizerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &NormalizerSettings {
        &self.settings
    }
}

#[async_trait::async_trait]
impl ImageNormalizer for JpegNormalizer {
    async fn normalize(&self, input: RawImageInput) -> Result<NormalizedImage, DecodeError> {
        let settings = self.settings.clone();
        tokio::task::spawn_blocking(move || normalize_bytes(&input, &settings))
            .await
            .map_err(|err| DecodeError::Worker {
                message: err.to_string(),
            })?
    }
}
