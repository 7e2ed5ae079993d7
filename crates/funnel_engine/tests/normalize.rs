use std::io::Cursor;
use std::sync::Once;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use funnel_core::{NormalizedImage, RawImageInput};
use funnel_engine::{
    normalize_batch, normalize_bytes, DecodeError, ImageNormalizer, JpegNormalizer,
    NormalizerSettings, JPEG_DATA_URL_PREFIX,
};
use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(funnel_logging::initialize_for_tests);
}

fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 160, 40, 128]));
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()),
        _ => DynamicImage::ImageRgba8(img),
    };
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

fn png_input(label: &str, width: u32, height: u32) -> RawImageInput {
    RawImageInput::new(
        label,
        Some("image/png".to_string()),
        encoded(width, height, ImageFormat::Png),
    )
}

fn decode_output(image: &NormalizedImage) -> DynamicImage {
    let payload = image
        .data_url()
        .strip_prefix(JPEG_DATA_URL_PREFIX)
        .expect("jpeg data url");
    let bytes = STANDARD.decode(payload).unwrap();
    image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap()
}

#[test]
fn wide_image_is_resized_to_width_bound() {
    let settings = NormalizerSettings::default();
    let out = normalize_bytes(&png_input("wide.png", 1600, 900), &settings).unwrap();

    assert_eq!((out.width(), out.height()), (800, 450));
    assert_eq!(decode_output(&out).dimensions(), (800, 450));
}

#[test]
fn tall_image_is_resized_to_height_bound() {
    let settings = NormalizerSettings::default();
    let out = normalize_bytes(&png_input("tall.png", 1000, 1500), &settings).unwrap();

    assert_eq!((out.width(), out.height()), (400, 600));
    assert_eq!(decode_output(&out).dimensions(), (400, 600));
}

#[test]
fn small_image_keeps_dimensions_but_is_reencoded() {
    let settings = NormalizerSettings::default();
    let input = RawImageInput::new("small.jpg", None, encoded(320, 240, ImageFormat::Jpeg));
    let out = normalize_bytes(&input, &settings).unwrap();

    assert_eq!((out.width(), out.height()), (320, 240));
    assert!(out.data_url().starts_with(JPEG_DATA_URL_PREFIX));
}

#[test]
fn square_image_uses_width_bound() {
    let settings = NormalizerSettings::default();
    let out = normalize_bytes(&png_input("square.png", 1000, 1000), &settings).unwrap();
    assert_eq!((out.width(), out.height()), (800, 800));
}

#[test]
fn corrupt_bytes_fail_with_decode_error() {
    let settings = NormalizerSettings::default();
    let input = RawImageInput::new(
        "broken.png",
        Some("image/png".to_string()),
        b"definitely not a png".to_vec(),
    );
    let err = normalize_bytes(&input, &settings).unwrap_err();
    assert!(matches!(err, DecodeError::Decode { ref label, .. } if label == "broken.png"));
}

#[test]
fn mislabeled_image_decodes_from_its_bytes() {
    let settings = NormalizerSettings::default();
    let input = RawImageInput::new(
        "photo.png",
        Some("image/png".to_string()),
        encoded(1200, 900, ImageFormat::Jpeg),
    );
    let out = normalize_bytes(&input, &settings).unwrap();
    assert_eq!((out.width(), out.height()), (800, 600));
}

#[test]
fn non_image_media_type_is_rejected() {
    let settings = NormalizerSettings::default();
    let input = RawImageInput::new("notes.txt", Some("text/plain".to_string()), b"hi".to_vec());
    assert_eq!(
        normalize_bytes(&input, &settings),
        Err(DecodeError::UnsupportedMediaType {
            media_type: "text/plain".to_string()
        })
    );
}

#[tokio::test]
async fn async_normalizer_runs_on_blocking_pool() {
    init_logging();
    let normalizer = JpegNormalizer::default();
    let out = normalizer
        .normalize(png_input("async.png", 2400, 600))
        .await
        .unwrap();
    assert_eq!((out.width(), out.height()), (800, 200));
}

#[tokio::test]
async fn batch_skips_failures_and_keeps_order() {
    init_logging();
    let normalizer = JpegNormalizer::default();
    let inputs = vec![
        png_input("first.png", 100, 50),
        RawImageInput::new("broken.png", None, vec![0, 1, 2, 3]),
        png_input("third.png", 60, 120),
    ];

    let outcome = normalize_batch(&normalizer, inputs).await;

    let dims: Vec<(u32, u32)> = outcome
        .images
        .iter()
        .map(|img| (img.width(), img.height()))
        .collect();
    assert_eq!(dims, vec![(100, 50), (60, 120)]);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].index, 1);
    assert_eq!(outcome.failures[0].label, "broken.png");
}

#[tokio::test]
async fn batch_of_valid_images_keeps_every_image() {
    init_logging();
    let normalizer = JpegNormalizer::new(NormalizerSettings {
        max_width: 80,
        max_height: 60,
        jpeg_quality: 90,
    });
    let inputs: Vec<RawImageInput> = (1..=5)
        .map(|i| png_input(&format!("{i}.png"), 40 * i, 30))
        .collect();

    let outcome = normalize_batch(&normalizer, inputs).await;

    assert!(outcome.failures.is_empty());
    let widths: Vec<u32> = outcome.images.iter().map(|img| img.width()).collect();
    assert_eq!(widths, vec![40, 80, 80, 80, 80]);
}
