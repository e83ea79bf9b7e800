use crate::blend::{blend_pixel, erase_pixel, BlendMode};
use crate::error::EditorError;
use crate::paint::{CompositeOp, DrawStyle, Paint};
use crate::raster::{stroke_bounds, Mask};
use egui::{Pos2, Rect};
use image::{imageops, ImageBuffer, Rgba, RgbaImage};
use std::ops::{Deref, DerefMut};

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// A fixed-size RGBA raster with the current draw style.
///
/// The buffer is always `width * height * 4` bytes in R, G, B, A order.
#[derive(Clone)]
pub struct PixelSurface {
    buffer: RgbaImage,
    style: DrawStyle,
}

impl PixelSurface {
    /// A fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: ImageBuffer::new(width, height),
            style: DrawStyle::default(),
        }
    }

    pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> Self {
        Self {
            buffer: ImageBuffer::from_pixel(width, height, color),
            style: DrawStyle::default(),
        }
    }

    pub fn from_image(buffer: RgbaImage) -> Self {
        Self {
            buffer,
            style: DrawStyle::default(),
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.buffer
    }

    pub fn raw(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    pub fn into_image(self) -> RgbaImage {
        self.buffer
    }

    pub fn clear(&mut self) {
        self.fill(TRANSPARENT);
    }

    pub fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.buffer.pixels_mut() {
            *pixel = color;
        }
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x < self.width() && y < self.height() {
            Some(*self.buffer.get_pixel(x, y))
        } else {
            None
        }
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        if x < self.width() && y < self.height() {
            self.buffer.put_pixel(x, y, color);
        }
    }

    /// Replaces the whole buffer. A buffer of another size is rejected and the
    /// surface is left untouched.
    pub fn set_region(&mut self, image: &RgbaImage) -> Result<(), EditorError> {
        if image.dimensions() != self.buffer.dimensions() {
            return Err(EditorError::SizeMismatch {
                expected: self.buffer.dimensions(),
                actual: image.dimensions(),
            });
        }
        self.buffer.copy_from_slice(image.as_raw());
        Ok(())
    }

    /// Alpha-composites `image` with its top-left corner at `(x, y)`.
    pub fn draw_image(&mut self, image: &RgbaImage, x: i64, y: i64) {
        imageops::overlay(&mut self.buffer, image, x, y);
    }

    /// Composites `source` onto this surface, back to front.
    pub fn composite_from(&mut self, source: &PixelSurface, opacity: f32, blend: BlendMode) {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return;
        }
        for (dst, src) in self.buffer.pixels_mut().zip(source.buffer.pixels()) {
            *dst = blend_pixel(*dst, *src, blend, opacity);
        }
    }

    pub fn style(&self) -> &DrawStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: DrawStyle) {
        self.style = style;
    }

    /// Installs `style` until the returned scope is dropped, then restores the
    /// previous one.
    pub fn scoped_style(&mut self, style: DrawStyle) -> StyleScope<'_> {
        let saved = std::mem::replace(&mut self.style, style);
        StyleScope {
            surface: self,
            saved,
        }
    }

    /// Strokes a polyline with the current style. All segments of one path share
    /// a coverage mask, so overlaps are painted once.
    pub fn stroke_path(&mut self, points: &[Pos2], closed: bool) {
        let style = self.style;
        let bounds = stroke_bounds(points, style.width, style.join);
        if let Some(mut mask) = Mask::covering(bounds, self.width(), self.height()) {
            mask.stroke(points, closed, style.width, style.cap, style.join);
            self.paint_mask(&mask, &style.paint);
        }
    }

    /// Fills a closed polygon with the current paint.
    pub fn fill_path(&mut self, points: &[Pos2]) {
        if let Some(mut mask) = Mask::covering(Rect::from_points(points), self.width(), self.height()) {
            mask.fill_polygon(points);
            let paint = self.style.paint;
            self.paint_mask(&mask, &paint);
        }
    }

    /// Fills the pixels whose centers fall in `[min, max)`.
    pub fn fill_rect(&mut self, min: Pos2, max: Pos2) {
        if let Some(mut mask) = Mask::covering(Rect::from_min_max(min, max), self.width(), self.height()) {
            mask.fill_rect(min, max);
            let paint = self.style.paint;
            self.paint_mask(&mask, &paint);
        }
    }

    pub fn fill_ellipse(&mut self, center: Pos2, rx: f32, ry: f32) {
        let bounds = Rect::from_center_size(center, egui::vec2(rx * 2.0, ry * 2.0)).expand(1.0);
        if let Some(mut mask) = Mask::covering(bounds, self.width(), self.height()) {
            mask.fill_ellipse(center, rx, ry);
            let paint = self.style.paint;
            self.paint_mask(&mask, &paint);
        }
    }

    /// Blends `paint` into every covered pixel using the style's opacity and
    /// composite operation.
    pub fn paint_mask(&mut self, mask: &Mask, paint: &Paint) {
        let opacity = self.style.opacity.clamp(0.0, 1.0);
        let composite = self.style.composite;
        for (x, y) in mask.iter() {
            let pixel = self.buffer.get_pixel_mut(x, y);
            let color = paint.color_at(Pos2::new(x as f32 + 0.5, y as f32 + 0.5));
            *pixel = match composite {
                CompositeOp::SourceOver => blend_pixel(*pixel, color, BlendMode::Normal, opacity),
                CompositeOp::DestinationOut => {
                    erase_pixel(*pixel, color[3] as f32 / 255.0 * opacity)
                }
            };
        }
    }
}

impl std::fmt::Debug for PixelSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelSurface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Restores a surface's previous draw style when dropped.
pub struct StyleScope<'a> {
    surface: &'a mut PixelSurface,
    saved: DrawStyle,
}

impl Deref for StyleScope<'_> {
    type Target = PixelSurface;

    fn deref(&self) -> &PixelSurface {
        self.surface
    }
}

impl DerefMut for StyleScope<'_> {
    fn deref_mut(&mut self) -> &mut PixelSurface {
        self.surface
    }
}

impl Drop for StyleScope<'_> {
    fn drop(&mut self) {
        self.surface.style = self.saved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::{BrushShape, LineCap};
    use egui::pos2;

    #[test]
    fn new_surface_is_transparent() {
        let surface = PixelSurface::new(7, 3);
        assert_eq!(surface.raw().len(), 7 * 3 * 4);
        assert!(surface.raw().iter().all(|b| *b == 0));
        assert_eq!(surface.get_pixel(7, 0), None);
    }

    #[test]
    fn set_region_rejects_wrong_size() {
        let mut surface = PixelSurface::filled(4, 4, WHITE);
        let other = RgbaImage::new(5, 4);
        assert!(surface.set_region(&other).is_err());
        assert_eq!(surface.get_pixel(0, 0), Some(WHITE));

        let red = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        surface.set_region(&red).unwrap();
        assert_eq!(surface.image(), &red);
    }

    #[test]
    fn scoped_style_restores_on_drop() {
        let mut surface = PixelSurface::new(10, 10);
        let before = *surface.style();
        {
            let mut scope = surface.scoped_style(
                DrawStyle::solid(Rgba([1, 2, 3, 255]), 9.0).with_brush(BrushShape::Square),
            );
            assert_eq!(scope.style().cap, LineCap::Square);
            scope.stroke_path(&[pos2(1.0, 1.0), pos2(8.0, 8.0)], false);
        }
        assert_eq!(*surface.style(), before);
    }

    #[test]
    fn scoped_style_restores_on_panic() {
        let mut surface = PixelSurface::new(4, 4);
        let before = *surface.style();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _scope = surface.scoped_style(DrawStyle::solid(Rgba([9, 9, 9, 255]), 3.0));
            panic!("draw failed");
        }));
        assert!(result.is_err());
        assert_eq!(*surface.style(), before);
    }

    #[test]
    fn stroke_opacity_blends_each_pixel_once() {
        let mut surface = PixelSurface::new(30, 30);
        surface.set_style(
            DrawStyle::solid(Rgba([0, 0, 0, 255]), 4.0)
                .with_opacity(0.5)
                .with_brush(BrushShape::Round),
        );
        // Segments fold back over each other.
        surface.stroke_path(&[pos2(5.0, 15.0), pos2(25.0, 15.0), pos2(5.0, 15.0)], false);
        let alphas: Vec<u8> = surface.image().pixels().map(|p| p[3]).filter(|a| *a > 0).collect();
        assert!(!alphas.is_empty());
        assert!(alphas.iter().all(|a| *a == 128));
    }

    #[test]
    fn destination_out_erases() {
        let mut surface = PixelSurface::filled(10, 10, Rgba([200, 10, 10, 255]));
        surface.set_style(
            DrawStyle::solid(Rgba([0, 0, 0, 255]), 2.0).with_composite(CompositeOp::DestinationOut),
        );
        surface.fill_rect(pos2(0.0, 0.0), pos2(5.0, 10.0));
        assert_eq!(surface.get_pixel(2, 2), Some(TRANSPARENT));
        assert_eq!(surface.get_pixel(7, 2), Some(Rgba([200, 10, 10, 255])));
    }

    #[test]
    fn composite_skips_zero_opacity() {
        let mut base = PixelSurface::filled(2, 2, WHITE);
        let top = PixelSurface::filled(2, 2, Rgba([0, 0, 0, 255]));
        base.composite_from(&top, 0.0, BlendMode::Normal);
        assert_eq!(base.get_pixel(1, 1), Some(WHITE));
        base.composite_from(&top, 1.0, BlendMode::Screen);
        assert_eq!(base.get_pixel(1, 1), Some(WHITE));
        base.composite_from(&top, 1.0, BlendMode::Multiply);
        assert_eq!(base.get_pixel(1, 1), Some(Rgba([0, 0, 0, 255])));
    }
}
