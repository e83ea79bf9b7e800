//! Parametric shapes rasterized onto a surface.
//!
//! Apart from Line, Rectangle and Circle, anchor `a` is the shape's center and
//! `b` sets its extent.

use crate::paint::DrawStyle;
use crate::surface::PixelSurface;
use egui::{pos2, Pos2, Vec2};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_6, TAU};

/// Upper bound of the arrow head length.
pub const ARROW_HEAD_MAX: f32 = 30.0;
const BEZIER_STEPS: usize = 24;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ShapeKind {
    Line,
    Rectangle,
    Circle,
    Triangle,
    Hexagon,
    Pentagon,
    Star,
    Heart,
    Diamond,
    Arrow,
    Curve,
}

impl ShapeKind {
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Line => "Line",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Circle => "Circle",
            ShapeKind::Triangle => "Triangle",
            ShapeKind::Hexagon => "Hexagon",
            ShapeKind::Pentagon => "Pentagon",
            ShapeKind::Star => "Star",
            ShapeKind::Heart => "Heart",
            ShapeKind::Diamond => "Diamond",
            ShapeKind::Arrow => "Arrow",
            ShapeKind::Curve => "Curve",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ShapeDescriptor {
    pub kind: ShapeKind,
    pub a: Pos2,
    pub b: Pos2,
    /// Only used by [`ShapeKind::Curve`].
    pub points: Vec<Pos2>,
    /// Closed shapes are filled instead of outlined.
    pub fill: bool,
    pub style: DrawStyle,
}

impl ShapeDescriptor {
    pub fn new(kind: ShapeKind, a: Pos2, b: Pos2, style: DrawStyle) -> Self {
        Self {
            kind,
            a,
            b,
            points: Vec::new(),
            fill: false,
            style,
        }
    }

    pub fn curve(points: Vec<Pos2>, style: DrawStyle) -> Self {
        let a = points.first().copied().unwrap_or(Pos2::ZERO);
        let b = points.last().copied().unwrap_or(Pos2::ZERO);
        Self {
            kind: ShapeKind::Curve,
            a,
            b,
            points,
            fill: false,
            style,
        }
    }

    pub fn filled(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }
}

/// An outline in surface coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Outline {
    pub points: Vec<Pos2>,
    pub closed: bool,
}

impl Outline {
    fn closed(points: Vec<Pos2>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    fn open(points: Vec<Pos2>) -> Self {
        Self {
            points,
            closed: false,
        }
    }
}

/// Draws `shape` onto `surface`. The surface's own style is restored
/// afterwards.
pub fn render_shape(surface: &mut PixelSurface, shape: &ShapeDescriptor) {
    let mut target = surface.scoped_style(shape.style);
    let (a, b) = (shape.a, shape.b);

    match shape.kind {
        ShapeKind::Rectangle if shape.fill => {
            target.fill_rect(a.min(b), a.max(b));
        }
        ShapeKind::Circle if shape.fill => {
            let r = a.distance(b);
            target.fill_ellipse(a, r, r);
        }
        ShapeKind::Arrow => {
            let arrow = arrow_geometry(a, b, shape.style.width);
            target.stroke_path(&[a, arrow.shaft_end], false);
            target.fill_path(&arrow.head);
        }
        ShapeKind::Curve => {
            if shape.points.len() >= 2 {
                target.stroke_path(&shape.points, false);
            }
        }
        kind => {
            let outline = outline(kind, a, b);
            if shape.fill && outline.closed {
                target.fill_path(&outline.points);
            } else {
                target.stroke_path(&outline.points, outline.closed);
            }
        }
    }
}

/// Outline of every kind except Arrow (whose head is filled separately) and
/// Curve (which carries its own points).
pub fn outline(kind: ShapeKind, a: Pos2, b: Pos2) -> Outline {
    let radius = a.distance(b);
    match kind {
        ShapeKind::Line | ShapeKind::Arrow | ShapeKind::Curve => Outline::open(vec![a, b]),
        ShapeKind::Rectangle => {
            let (min, max) = (a.min(b), a.max(b));
            Outline::closed(vec![
                min,
                pos2(max.x, min.y),
                max,
                pos2(min.x, max.y),
            ])
        }
        ShapeKind::Circle => Outline::closed(circle_points(a, radius)),
        ShapeKind::Triangle => Outline::closed(vec![a, b, pos2(a.x * 2.0 - b.x, b.y)]),
        ShapeKind::Hexagon => Outline::closed(regular_polygon(a, &[radius], 6, 0.0)),
        ShapeKind::Pentagon => Outline::closed(regular_polygon(a, &[radius], 5, -FRAC_PI_2)),
        ShapeKind::Star => {
            Outline::closed(regular_polygon(a, &[radius, radius / 2.0], 10, -FRAC_PI_2))
        }
        ShapeKind::Heart => Outline::closed(heart_points(a, b)),
        ShapeKind::Diamond => {
            let half = (b - a).abs() / 2.0;
            Outline::closed(vec![
                pos2(a.x, a.y - half.y),
                pos2(a.x + half.x, a.y),
                pos2(a.x, a.y + half.y),
                pos2(a.x - half.x, a.y),
            ])
        }
    }
}

/// `count` vertices evenly spaced from `start_angle`, cycling through `radii`.
fn regular_polygon(center: Pos2, radii: &[f32], count: usize, start_angle: f32) -> Vec<Pos2> {
    (0..count)
        .map(|i| {
            let angle = start_angle + TAU * i as f32 / count as f32;
            center + Vec2::angled(angle) * radii[i % radii.len()]
        })
        .collect()
}

fn circle_points(center: Pos2, radius: f32) -> Vec<Pos2> {
    let segments = ((TAU * radius / 2.0).ceil() as usize).clamp(16, 720);
    regular_polygon(center, &[radius], segments, 0.0)
}

fn heart_points(center: Pos2, corner: Pos2) -> Vec<Pos2> {
    let extent = (corner - center).abs();
    let size = extent.x.min(extent.y) / 2.0;
    let (cx, cy) = (center.x, center.y);

    let top = pos2(cx, cy - size / 2.0);
    let bottom = pos2(cx, cy + size);
    let mut points = vec![top];
    points.extend(cubic_bezier(
        top,
        pos2(cx + size, cy - size),
        pos2(cx + size, cy + size / 2.0),
        bottom,
    ));
    points.extend(cubic_bezier(
        bottom,
        pos2(cx - size, cy + size / 2.0),
        pos2(cx - size, cy - size),
        top,
    ));
    points
}

/// Points after `p0` along a cubic Bezier, ending exactly at `p3`.
fn cubic_bezier(p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2) -> impl Iterator<Item = Pos2> {
    (1..=BEZIER_STEPS).map(move |i| {
        let t = i as f32 / BEZIER_STEPS as f32;
        let u = 1.0 - t;
        let v = p0.to_vec2() * (u * u * u)
            + p1.to_vec2() * (3.0 * u * u * t)
            + p2.to_vec2() * (3.0 * u * t * t)
            + p3.to_vec2() * (t * t * t);
        v.to_pos2()
    })
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArrowGeometry {
    pub shaft_end: Pos2,
    pub head: [Pos2; 3],
}

/// Shaft ends one head length short of `b` so the head sits flush at `b`.
pub fn arrow_geometry(a: Pos2, b: Pos2, line_width: f32) -> ArrowGeometry {
    let head_len = ARROW_HEAD_MAX.min(line_width * 3.0);
    let d = b - a;
    let angle = d.y.atan2(d.x);
    let back = |theta: f32| b - Vec2::angled(theta) * head_len;
    ArrowGeometry {
        shaft_end: back(angle),
        head: [b, back(angle - FRAC_PI_6), back(angle + FRAC_PI_6)],
    }
}
