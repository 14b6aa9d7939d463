//! Downscaling to a maximum edge length.

use super::{DecodeError, DecodedImage, FilterType};

/// Shrink an image so its longer edge is at most `max_edge`, preserving
/// aspect ratio.
///
/// Images that already fit are returned unchanged; this never upscales.
///
/// # Errors
///
/// Returns `DecodeError::CorruptedFile` if `max_edge` is zero or the pixel
/// buffer does not match the declared dimensions.
pub fn resize_to_fit(
    image: DecodedImage,
    max_edge: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if max_edge == 0 {
        return Err(DecodeError::CorruptedFile(
            "maximum dimension must be non-zero".to_string(),
        ));
    }

    if image.longest_edge() <= max_edge {
        return Ok(image);
    }

    let (new_width, new_height) = fit_dimensions(image.width, image.height, max_edge);

    let view = image
        .as_rgb_image()
        .ok_or_else(|| DecodeError::CorruptedFile("pixel buffer size mismatch".to_string()))?;

    let resized = image::imageops::resize(&view, new_width, new_height, filter.to_image_filter());

    Ok(DecodedImage::from_rgb_image(resized))
}

/// Dimensions that fit within `max_edge` with the aspect ratio preserved.
///
/// The longer edge becomes exactly `max_edge`; the shorter edge is rounded
/// and never collapses below one pixel.
pub fn fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        let new_height = (max_edge as f64 / ratio).round() as u32;
        (max_edge, new_height.max(1))
    } else {
        let new_width = (max_edge as f64 * ratio).round() as u32;
        (new_width.max(1), max_edge)
    }
}
