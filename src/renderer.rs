use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, ColorImage};

pub fn render_rgba(width_px: usize, height_px: usize, rgba: &[u8]) -> ColorImage {
    let pixel_count = width_px.saturating_mul(height_px);
    let mut pixels = Vec::with_capacity(pixel_count);

    for chunk in rgba.chunks_exact(4).take(pixel_count) {
        pixels.push(Color32::from_rgba_unmultiplied(
            chunk[0], chunk[1], chunk[2], chunk[3],
        ));
    }

    if pixels.len() < pixel_count {
        pixels.resize(pixel_count, Color32::BLACK);
    }

    ColorImage {
        size: [width_px, height_px],
        pixels,
    }
}

pub fn load_color_image(path: &Path) -> Result<ColorImage> {
    let decoded = image::open(path)
        .with_context(|| format!("Could not open {}", path.display()))?
        .to_rgba8();
    let (width, height) = decoded.dimensions();
    Ok(render_rgba(
        width as usize,
        height as usize,
        decoded.as_raw(),
    ))
}

/// Largest size with the image's aspect ratio that fits `available`, never above 1:1.
pub fn fit_size(image_size: egui::Vec2, available: egui::Vec2) -> egui::Vec2 {
    let width = image_size.x.max(1.0);
    let height = image_size.y.max(1.0);
    let scale = (available.x / width)
        .min(available.y / height)
        .clamp(0.0, 1.0);
    egui::vec2(width * scale, height * scale)
}
