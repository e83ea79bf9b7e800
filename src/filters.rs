use crate::surface::PixelSurface;
use image::{imageops, GenericImage, GenericImageView, Rgba};
use serde::{Deserialize, Serialize};

/// Whole-surface color filters. Alpha is left as is.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Filter {
    Grayscale,
    Invert,
}

impl Filter {
    pub fn name(self) -> &'static str {
        match self {
            Filter::Grayscale => "Grayscale",
            Filter::Invert => "Invert",
        }
    }

    pub fn apply(self, surface: &mut PixelSurface) {
        let mut image = surface.image().clone();
        let pixels: &mut [[u8; 4]] = bytemuck::cast_slice_mut(&mut *image);
        match self {
            Filter::Grayscale => {
                for p in pixels.iter_mut() {
                    let luma = p[0] as f64 * 0.3 + p[1] as f64 * 0.59 + p[2] as f64 * 0.11;
                    let v = luma.round_ties_even().clamp(0.0, 255.0) as u8;
                    p[0] = v;
                    p[1] = v;
                    p[2] = v;
                }
            }
            Filter::Invert => {
                for p in pixels.iter_mut() {
                    p[0] = 255 - p[0];
                    p[1] = 255 - p[1];
                    p[2] = 255 - p[2];
                }
            }
        }
        if let Err(e) = surface.set_region(&image) {
            log::error!("Failed to apply {} filter: {}", self.name(), e);
        }
    }
}

/// Gaussian blur of the `w` x `h` region at `(x, y)`, clipped to the surface.
///
/// Blurs premultiplied color so transparent neighbours do not darken edges.
pub fn blur_region(surface: &mut PixelSurface, x: u32, y: u32, w: u32, h: u32, sigma: f32) {
    let w = w.min(surface.width().saturating_sub(x));
    let h = h.min(surface.height().saturating_sub(y));
    if w == 0 || h == 0 || sigma <= 0.0 {
        return;
    }

    let mut patch = surface.image().view(x, y, w, h).to_image();
    for p in patch.pixels_mut() {
        let a = p[3] as f32 / 255.0;
        *p = Rgba([
            (p[0] as f32 * a).round() as u8,
            (p[1] as f32 * a).round() as u8,
            (p[2] as f32 * a).round() as u8,
            p[3],
        ]);
    }
    let mut blurred = imageops::blur(&patch, sigma);
    for p in blurred.pixels_mut() {
        if p[3] == 0 {
            *p = Rgba([0, 0, 0, 0]);
            continue;
        }
        let a = p[3] as f32 / 255.0;
        let un = |c: u8| (c as f32 / a).round().clamp(0.0, 255.0) as u8;
        *p = Rgba([un(p[0]), un(p[1]), un(p[2]), p[3]]);
    }

    let mut image = surface.image().clone();
    if image.copy_from(&blurred, x, y).is_err() {
        return;
    }
    if let Err(e) = surface.set_region(&image) {
        log::error!("Failed to commit blur: {}", e);
    }
}
