use crate::annotations::bounding_box::BoundingBoxGeometry;
use crate::annotations::detection::Detection;
use crate::fusion::report::FusionReport;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

pub const VERIFIED_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const UNVERIFIED_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const DETECTION_COLOR: Rgb<u8> = Rgb([0, 128, 255]);

/// Outline thickness in pixels.
const LINE_WIDTH: u32 = 2;

/// Draws the outline of every detection, `color_for` picks the colour from the detection index.
///
/// Boxes are clipped to the image. Boxes smaller than a pixel are skipped.
pub fn draw_detections<T, F>(image: &mut RgbImage, detections: &[Detection<T>], color_for: F)
where
    T: BoundingBoxGeometry,
    F: Fn(usize) -> Rgb<u8>,
{
    let (width, height) = image.dimensions();
    for (index, detection) in detections.iter().enumerate() {
        let (left, top, right, bottom) = detection.annotation.as_xyxy();
        let left = left.round().clamp(0.0, width as f32) as u32;
        let top = top.round().clamp(0.0, height as f32) as u32;
        let right = right.round().clamp(0.0, width as f32) as u32;
        let bottom = bottom.round().clamp(0.0, height as f32) as u32;
        if right <= left || bottom <= top {
            continue;
        }
        let color = color_for(index);
        for inset in 0..LINE_WIDTH {
            let box_width = (right - left).saturating_sub(2 * inset);
            let box_height = (bottom - top).saturating_sub(2 * inset);
            if box_width == 0 || box_height == 0 {
                break;
            }
            let rect = Rect::at((left + inset) as i32, (top + inset) as i32)
                .of_size(box_width, box_height);
            draw_hollow_rect_mut(image, rect, color);
        }
    }
}

/// Highlights EO detections of a fusion run: green when an IR detection verified them.
pub fn draw_fusion_report(image: &mut RgbImage, report: &FusionReport) {
    let detections: Vec<_> = report
        .eo_detections
        .iter()
        .map(|fused| fused.detection.clone())
        .collect();
    draw_detections(image, &detections, |index| {
        if report.eo_detections[index].verified {
            VERIFIED_COLOR
        } else {
            UNVERIFIED_COLOR
        }
    });
}
