use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

/// An image resized and padded to a model's input size.
pub struct Letterboxed {
    pub image: RgbImage,
    /// Factor applied to the original image, divide input coordinates by it to go back.
    pub scale: f32,
}

/// Pads an rgb8 image by adding black pixels to the right and bottom of the image.
pub fn pad_right_bottom_img_rgb8(
    original_image: &RgbImage,
    new_width: u32,
    new_height: u32,
) -> RgbImage {
    let mut padded_image: RgbImage = RgbImage::from_pixel(new_width, new_height, Rgb([0, 0, 0]));
    imageops::replace(&mut padded_image, original_image, 0, 0);
    padded_image
}

/// Resizes keeping the aspect ratio so the image fits `width` x `height`, then pads.
///
/// The content stays anchored at the top-left corner so that a single scale factor maps
/// coordinates back to the original image.
pub fn letterbox_rgb8(original_image: &RgbImage, width: u32, height: u32) -> Letterboxed {
    let (original_width, original_height) = original_image.dimensions();
    let scale = (width as f32 / original_width as f32).min(height as f32 / original_height as f32);
    let resized_width = ((original_width as f32 * scale).round() as u32).clamp(1, width);
    let resized_height = ((original_height as f32 * scale).round() as u32).clamp(1, height);
    let resized = if (resized_width, resized_height) == (original_width, original_height) {
        original_image.clone()
    } else {
        imageops::resize(original_image, resized_width, resized_height, FilterType::Triangle)
    };
    Letterboxed {
        image: pad_right_bottom_img_rgb8(&resized, width, height),
        scale,
    }
}
