//! Binary coverage rasterization.
//!
//! Every draw call first marks the pixels it touches in a [`Mask`] and then
//! blends each marked pixel exactly once. A pixel is covered when its center
//! `(x + 0.5, y + 0.5)` lies inside the geometry; spans are half-open, so a
//! rectangle from 10.0 to 50.0 covers pixels 10..50.

use crate::paint::{LineCap, LineJoin};
use egui::{Pos2, Rect, Vec2};

/// Canvas-style limit on the ratio of miter length to line width.
const MITER_LIMIT: f32 = 10.0;

#[derive(Clone, Debug)]
pub struct Mask {
    x0: u32,
    y0: u32,
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

/// First pixel index whose center is at or after `v`.
fn center_start(v: f32) -> i64 {
    (v - 0.5).ceil() as i64
}

impl Mask {
    /// A mask over `bounds` clipped to a `surface_w` x `surface_h` surface.
    /// Returns `None` when nothing of `bounds` is on the surface.
    pub fn covering(bounds: Rect, surface_w: u32, surface_h: u32) -> Option<Self> {
        if !(bounds.min.x <= bounds.max.x && bounds.min.y <= bounds.max.y) {
            return None;
        }
        let x0 = bounds.min.x.floor().max(0.0);
        let y0 = bounds.min.y.floor().max(0.0);
        let x1 = bounds.max.x.ceil().min(surface_w as f32);
        let y1 = bounds.max.y.ceil().min(surface_h as f32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        let (x0, y0) = (x0 as u32, y0 as u32);
        let (width, height) = (x1 as u32 - x0, y1 as u32 - y0);
        Some(Self {
            x0,
            y0,
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        })
    }

    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    /// The covered window in surface coordinates.
    pub fn window(&self) -> (u32, u32, u32, u32) {
        (self.x0, self.y0, self.width, self.height)
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        if x < self.x0 || y < self.y0 || x >= self.x0 + self.width || y >= self.y0 + self.height {
            return false;
        }
        self.bits[((y - self.y0) * self.width + (x - self.x0)) as usize]
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// Covered pixels in surface coordinates, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let (x0, y0, w) = (self.x0, self.y0, self.width);
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, covered)| **covered)
            .map(move |(i, _)| (x0 + i as u32 % w, y0 + i as u32 / w))
    }

    fn rows(&self, from: f32, to: f32) -> std::ops::Range<i64> {
        let lo = center_start(from).max(self.y0 as i64);
        let hi = center_start(to).min((self.y0 + self.height) as i64);
        lo..hi.max(lo)
    }

    /// Marks `[x_start, x_end)` on row `y`, clipped to the window.
    fn span(&mut self, x_start: i64, x_end: i64, y: i64) {
        if y < self.y0 as i64 || y >= (self.y0 + self.height) as i64 {
            return;
        }
        let lo = x_start.max(self.x0 as i64);
        let hi = x_end.min((self.x0 + self.width) as i64);
        if hi <= lo {
            return;
        }
        let row = (y - self.y0 as i64) as usize * self.width as usize;
        let lo = row + (lo - self.x0 as i64) as usize;
        let hi = row + (hi - self.x0 as i64) as usize;
        self.bits[lo..hi].fill(true);
    }

    pub fn fill_rect(&mut self, min: Pos2, max: Pos2) {
        let (xs, xe) = (center_start(min.x), center_start(max.x));
        for y in self.rows(min.y, max.y) {
            self.span(xs, xe, y);
        }
    }

    /// Even-odd scanline fill of a closed polygon.
    pub fn fill_polygon(&mut self, points: &[Pos2]) {
        if points.len() < 3 {
            return;
        }
        let (min_y, max_y) = points
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));

        let n = points.len();
        let mut crossings: Vec<f32> = Vec::with_capacity(n);
        for y in self.rows(min_y, max_y) {
            crossings.clear();
            let yc = y as f32 + 0.5;
            for i in 0..n {
                let a = points[i];
                let b = points[(i + 1) % n];
                if (a.y <= yc && b.y > yc) || (b.y <= yc && a.y > yc) {
                    crossings.push(a.x + (yc - a.y) / (b.y - a.y) * (b.x - a.x));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for pair in crossings.chunks_exact(2) {
                self.span(center_start(pair[0]), center_start(pair[1]), y);
            }
        }
    }

    pub fn fill_disc(&mut self, center: Pos2, radius: f32) {
        self.fill_ellipse(center, radius, radius);
    }

    pub fn fill_ellipse(&mut self, center: Pos2, rx: f32, ry: f32) {
        if !(rx > 0.0 && ry > 0.0) {
            return;
        }
        for y in self.rows(center.y - ry, center.y + ry) {
            let dy = (y as f32 + 0.5 - center.y) / ry;
            if dy.abs() > 1.0 {
                continue;
            }
            let half = rx * (1.0 - dy * dy).sqrt();
            self.span(center_start(center.x - half), center_start(center.x + half), y);
        }
    }

    /// Marks the outline of a polyline drawn `width` wide.
    ///
    /// Widths under one pixel are widened to one so hairlines stay visible.
    pub fn stroke(&mut self, points: &[Pos2], closed: bool, width: f32, cap: LineCap, join: LineJoin) {
        let hw = width.max(1.0) / 2.0;

        let mut pts: Vec<Pos2> = Vec::with_capacity(points.len());
        for &p in points {
            if pts.last().map_or(true, |q| q.distance(p) > f32::EPSILON) {
                pts.push(p);
            }
        }
        if closed && pts.len() > 2 && pts[0].distance(pts[pts.len() - 1]) <= f32::EPSILON {
            pts.pop();
        }

        let n = pts.len();
        if n == 0 {
            return;
        }
        if n == 1 {
            // A zero-length stroke only leaves a mark through its caps.
            match cap {
                LineCap::Butt => {}
                LineCap::Round => self.fill_disc(pts[0], hw),
                LineCap::Square => {
                    let half = Vec2::splat(hw);
                    self.fill_rect(pts[0] - half, pts[0] + half);
                }
            }
            return;
        }

        let closed = closed && n > 2;
        let segments = if closed { n } else { n - 1 };
        for i in 0..segments {
            let (mut a, mut b) = (pts[i], pts[(i + 1) % n]);
            let dir = (b - a).normalized();
            if !closed && cap == LineCap::Square {
                if i == 0 {
                    a -= dir * hw;
                }
                if i == segments - 1 {
                    b += dir * hw;
                }
            }
            let normal = Vec2::new(-dir.y, dir.x) * hw;
            self.fill_polygon(&[a + normal, b + normal, b - normal, a - normal]);
        }

        if !closed && cap == LineCap::Round {
            self.fill_disc(pts[0], hw);
            self.fill_disc(pts[n - 1], hw);
        }

        for i in 0..n {
            if !closed && (i == 0 || i == n - 1) {
                continue;
            }
            self.join(pts[(i + n - 1) % n], pts[i], pts[(i + 1) % n], hw, join);
        }
    }

    fn join(&mut self, prev: Pos2, at: Pos2, next: Pos2, hw: f32, join: LineJoin) {
        if join == LineJoin::Round {
            self.fill_disc(at, hw);
            return;
        }
        let d0 = (at - prev).normalized();
        let d1 = (next - at).normalized();
        let n0 = Vec2::new(-d0.y, d0.x) * hw;
        let n1 = Vec2::new(-d1.y, d1.x) * hw;

        // The outer side is the one the next segment turns away from.
        let side = n0.dot(d1);
        if side.abs() <= f32::EPSILON {
            return;
        }
        let s = if side < 0.0 { 1.0 } else { -1.0 };
        let p = at + n0 * s;
        let q = at + n1 * s;

        if join == LineJoin::Miter {
            if let Some(m) = intersect(p, d0, q, d1) {
                if m.distance(at) <= MITER_LIMIT * hw {
                    self.fill_polygon(&[at, p, m, q]);
                    return;
                }
            }
        }
        self.fill_polygon(&[at, p, q]);
    }
}

fn intersect(p: Pos2, dp: Vec2, q: Pos2, dq: Vec2) -> Option<Pos2> {
    let cross = dp.x * dq.y - dp.y * dq.x;
    if cross.abs() < 1e-6 {
        return None;
    }
    let w = q - p;
    let t = (w.x * dq.y - w.y * dq.x) / cross;
    Some(p + dp * t)
}

/// Bounds that enclose a stroke of `points`, including caps and miters.
pub fn stroke_bounds(points: &[Pos2], width: f32, join: LineJoin) -> Rect {
    let hw = width.max(1.0) / 2.0;
    let pad = match join {
        LineJoin::Miter => hw * MITER_LIMIT,
        _ => hw * std::f32::consts::SQRT_2,
    };
    Rect::from_points(points).expand(pad + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn rect_covers_half_open_pixel_range() {
        let mut mask = Mask::full(100, 100);
        mask.fill_rect(pos2(10.0, 10.0), pos2(50.0, 40.0));
        assert_eq!(mask.count(), 40 * 30);
        assert!(mask.contains(10, 10));
        assert!(mask.contains(49, 39));
        assert!(!mask.contains(50, 39));
        assert!(!mask.contains(49, 40));
        assert!(!mask.contains(9, 10));
    }

    #[test]
    fn polygon_matches_rect_for_axis_aligned_box() {
        let mut poly = Mask::full(64, 64);
        poly.fill_polygon(&[
            pos2(4.0, 6.0),
            pos2(20.0, 6.0),
            pos2(20.0, 30.0),
            pos2(4.0, 30.0),
        ]);
        let mut rect = Mask::full(64, 64);
        rect.fill_rect(pos2(4.0, 6.0), pos2(20.0, 30.0));
        assert_eq!(poly.count(), rect.count());
        assert!(poly.iter().all(|(x, y)| rect.contains(x, y)));
    }

    #[test]
    fn one_pixel_horizontal_line() {
        let mut mask = Mask::full(20, 20);
        mask.stroke(
            &[pos2(2.0, 10.0), pos2(12.0, 10.0)],
            false,
            1.0,
            LineCap::Butt,
            LineJoin::Miter,
        );
        assert_eq!(mask.count(), 10);
        assert!((2..12).all(|x| mask.contains(x, 9)));
    }

    #[test]
    fn zero_length_stroke_depends_on_cap() {
        for (cap, marked) in [
            (LineCap::Butt, false),
            (LineCap::Round, true),
            (LineCap::Square, true),
        ] {
            let mut mask = Mask::full(20, 20);
            let p = pos2(10.0, 10.0);
            mask.stroke(&[p, p], false, 4.0, cap, LineJoin::Round);
            assert_eq!(mask.count() > 0, marked, "{cap:?}");
        }
    }

    #[test]
    fn covering_clips_to_surface() {
        let bounds = Rect::from_min_max(pos2(-10.0, -10.0), pos2(5.5, 300.0));
        let mask = Mask::covering(bounds, 50, 50).unwrap();
        assert_eq!(mask.window(), (0, 0, 6, 50));
        let outside = Rect::from_min_max(pos2(60.0, 60.0), pos2(70.0, 70.0));
        assert!(Mask::covering(outside, 50, 50).is_none());
        assert!(Mask::covering(Rect::NOTHING, 50, 50).is_none());
    }

    #[test]
    fn miter_join_fills_the_corner() {
        let mut miter = Mask::full(40, 40);
        let corner = [pos2(5.0, 20.0), pos2(20.0, 20.0), pos2(20.0, 5.0)];
        miter.stroke(&corner, false, 6.0, LineCap::Butt, LineJoin::Miter);
        let mut bevel = Mask::full(40, 40);
        bevel.stroke(&corner, false, 6.0, LineCap::Butt, LineJoin::Bevel);
        // The outer corner pixel only belongs to the miter.
        assert!(miter.contains(22, 22));
        assert!(!bevel.contains(22, 22));
        assert!(miter.count() > bevel.count());
    }
}
