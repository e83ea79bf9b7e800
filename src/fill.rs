//! Scanline seed fill over a surface's raw pixel buffer.

use crate::surface::PixelSurface;
use image::{Rgba, RgbaImage};

/// Replaces the four-connected region of pixels exactly matching the seed
/// pixel at `(x, y)` with `color`.
///
/// Works on a copy of the buffer and commits it in one write. Returns `false`
/// without touching the surface when the seed already has `color` or lies
/// outside the surface.
pub fn flood_fill(surface: &mut PixelSurface, x: u32, y: u32, color: Rgba<u8>) -> bool {
    let (width, height) = (surface.width(), surface.height());
    if x >= width || y >= height {
        log::warn!("Flood fill seed ({x}, {y}) is outside the {width}x{height} surface");
        return false;
    }

    let mut raw = surface.raw().to_vec();
    let run = fill_pixels(
        bytemuck::cast_slice_mut(raw.as_mut_slice()),
        width as usize,
        height as usize,
        x as usize,
        y as usize,
        color.0,
    );
    if run.filled == 0 {
        return false;
    }

    let Some(image) = RgbaImage::from_raw(width, height, raw) else {
        return false;
    };
    if let Err(e) = surface.set_region(&image) {
        log::error!("Failed to commit flood fill: {}", e);
        return false;
    }
    log::debug!(
        "Flood fill at ({x}, {y}) replaced {} pixels, peak queue {}",
        run.filled,
        run.peak_queue
    );
    true
}

#[derive(Debug, Default, PartialEq, Eq)]
struct FillRun {
    filled: usize,
    /// Most seeds waiting at once.
    peak_queue: usize,
}

/// The fill proper.
fn fill_pixels(
    pixels: &mut [[u8; 4]],
    width: usize,
    height: usize,
    x0: usize,
    y0: usize,
    fill: [u8; 4],
) -> FillRun {
    let seed = pixels[y0 * width + x0];
    if seed == fill {
        return FillRun::default();
    }

    let mut run = FillRun {
        filled: 0,
        peak_queue: 1,
    };
    let mut stack = vec![(x0, y0)];
    while let Some((x, y)) = stack.pop() {
        let row = y * width;
        // Already taken by an earlier run.
        if pixels[row + x] != seed {
            continue;
        }

        let mut left = x;
        while left > 0 && pixels[row + left - 1] == seed {
            left -= 1;
        }
        let mut right = x;
        while right + 1 < width && pixels[row + right + 1] == seed {
            right += 1;
        }
        pixels[row + left..=row + right].fill(fill);
        run.filled += right - left + 1;

        let above = y.checked_sub(1);
        let below = (y + 1 < height).then_some(y + 1);
        for ny in [above, below].into_iter().flatten() {
            let nrow = ny * width;
            let mut queued = false;
            for nx in left..=right {
                if pixels[nrow + nx] == seed {
                    if !queued {
                        stack.push((nx, ny));
                        queued = true;
                    }
                } else {
                    queued = false;
                }
            }
        }
        run.peak_queue = run.peak_queue.max(stack.len());
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::TRANSPARENT;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    #[test]
    fn fills_whole_transparent_surface() {
        let mut surface = PixelSurface::new(10, 10);
        assert!(flood_fill(&mut surface, 5, 5, RED));
        assert!(surface.image().pixels().all(|p| *p == RED));
        assert_eq!(surface.image().pixels().count(), 100);
    }

    #[test]
    fn seed_with_fill_color_is_a_no_op() {
        let mut surface = PixelSurface::filled(6, 6, RED);
        surface.put_pixel(0, 0, BLACK);
        let before = surface.image().clone();
        assert!(!flood_fill(&mut surface, 3, 3, RED));
        assert_eq!(surface.image(), &before);
    }

    #[test]
    fn idempotent() {
        let mut surface = PixelSurface::new(12, 12);
        for i in 0..12 {
            surface.put_pixel(i, 6, BLACK);
            surface.put_pixel(6, i, BLACK);
        }
        flood_fill(&mut surface, 1, 1, RED);
        let once = surface.image().clone();
        flood_fill(&mut surface, 1, 1, RED);
        assert_eq!(surface.image(), &once);
    }

    #[test]
    fn stops_at_boundaries_and_is_four_connected() {
        // A diagonal wall; four-connectivity must not leak through it.
        let mut surface = PixelSurface::new(8, 8);
        for i in 0..8 {
            surface.put_pixel(i, 7 - i, BLACK);
        }
        assert!(flood_fill(&mut surface, 0, 0, RED));
        for y in 0..8u32 {
            for x in 0..8u32 {
                let expected = if x + y < 7 {
                    RED
                } else if x + y == 7 {
                    BLACK
                } else {
                    TRANSPARENT
                };
                assert_eq!(surface.get_pixel(x, y), Some(expected), "({x}, {y})");
            }
        }
    }

    #[test]
    fn matches_exact_rgba_only() {
        let mut surface = PixelSurface::new(4, 1);
        surface.put_pixel(2, 0, Rgba([0, 0, 0, 1]));
        flood_fill(&mut surface, 0, 0, RED);
        assert_eq!(surface.get_pixel(1, 0), Some(RED));
        assert_eq!(surface.get_pixel(2, 0), Some(Rgba([0, 0, 0, 1])));
        assert_eq!(surface.get_pixel(3, 0), Some(TRANSPARENT));
    }

    #[test]
    fn fills_around_concave_obstacles() {
        // A "U" shaped wall forces runs to be discovered from both sides.
        let mut surface = PixelSurface::new(9, 9);
        for y in 2..8 {
            surface.put_pixel(2, y, BLACK);
            surface.put_pixel(6, y, BLACK);
        }
        for x in 2..7 {
            surface.put_pixel(x, 7, BLACK);
        }
        assert!(flood_fill(&mut surface, 4, 0, RED));
        // Inside of the U is reachable from the open top.
        assert_eq!(surface.get_pixel(4, 6), Some(RED));
        assert_eq!(surface.get_pixel(0, 8), Some(RED));
        let transparent = surface.image().pixels().filter(|p| **p == TRANSPARENT).count();
        assert_eq!(transparent, 0);
    }

    #[test]
    fn one_seed_per_open_run() {
        // Open top row over a comb: walls at every fourth column leave four
        // gaps three pixels wide.
        let (width, height) = (16usize, 9usize);
        let wall = [0, 0, 0, 255];
        let mut pixels = vec![[0u8; 4]; width * height];
        for y in 1..height {
            for x in [3, 7, 11, 15] {
                pixels[y * width + x] = wall;
            }
        }
        let run = fill_pixels(&mut pixels, width, height, 0, 0, RED.0);
        assert_eq!(run.filled, 16 + 4 * 3 * 8);
        assert_eq!(run.peak_queue, 4);
        let walls = pixels.iter().filter(|p| **p == wall).count();
        assert_eq!(walls, 4 * 8);
        assert!(pixels.iter().all(|p| *p == RED.0 || *p == wall));
    }

    #[test]
    fn seed_outside_is_ignored() {
        let mut surface = PixelSurface::new(3, 3);
        assert!(!flood_fill(&mut surface, 3, 0, RED));
        assert!(surface.raw().iter().all(|b| *b == 0));
    }
}
