use egui::Pos2;
use image::Rgba;
use serde::{Deserialize, Serialize};

/// Where a draw call gets its color from.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Paint {
    Solid(Rgba<u8>),
    /// Two-stop gradient along `from -> to`, padded past both ends.
    Linear {
        from: Pos2,
        to: Pos2,
        start: Rgba<u8>,
        end: Rgba<u8>,
    },
    /// Two-stop gradient by distance from `center`, reaching `end` at `radius`.
    Radial {
        center: Pos2,
        radius: f32,
        start: Rgba<u8>,
        end: Rgba<u8>,
    },
}

impl Paint {
    pub fn color_at(&self, pos: Pos2) -> Rgba<u8> {
        match *self {
            Paint::Solid(color) => color,
            Paint::Linear {
                from,
                to,
                start,
                end,
            } => {
                let axis = to - from;
                let len_sq = axis.length_sq();
                let t = if len_sq <= f32::EPSILON {
                    0.0
                } else {
                    (pos - from).dot(axis) / len_sq
                };
                lerp_color(start, end, t)
            }
            Paint::Radial {
                center,
                radius,
                start,
                end,
            } => {
                let t = if radius <= f32::EPSILON {
                    0.0
                } else {
                    pos.distance(center) / radius
                };
                lerp_color(start, end, t)
            }
        }
    }
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Solid(Rgba([0, 0, 0, 255]))
    }
}

/// Per-channel interpolation, `t` clamped to [0, 1].
pub fn lerp_color(a: Rgba<u8>, b: Rgba<u8>, t: f32) -> Rgba<u8> {
    if t <= 0.0 {
        return a;
    }
    if t >= 1.0 {
        return b;
    }
    let mix = |x: u8, y: u8| (x as f32 + t * (y as f32 - x as f32)).round() as u8;
    Rgba([
        mix(a[0], b[0]),
        mix(a[1], b[1]),
        mix(a[2], b[2]),
        mix(a[3], b[3]),
    ])
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// How painted coverage is combined with what is already on the surface.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CompositeOp {
    #[default]
    SourceOver,
    /// Removes alpha where painted; the paint's color is ignored.
    DestinationOut,
}

/// The brush tip picked in the toolbar, applied to both cap and join.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum BrushShape {
    #[default]
    Round,
    Square,
    Butt,
}

impl BrushShape {
    pub fn cap(self) -> LineCap {
        match self {
            BrushShape::Round => LineCap::Round,
            BrushShape::Square => LineCap::Square,
            BrushShape::Butt => LineCap::Butt,
        }
    }

    pub fn join(self) -> LineJoin {
        match self {
            BrushShape::Round => LineJoin::Round,
            BrushShape::Square => LineJoin::Miter,
            BrushShape::Butt => LineJoin::Bevel,
        }
    }
}

/// Style attributes a surface draws with.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct DrawStyle {
    pub paint: Paint,
    pub width: f32,
    pub opacity: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub composite: CompositeOp,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            paint: Paint::default(),
            width: 1.0,
            opacity: 1.0,
            cap: LineCap::default(),
            join: LineJoin::default(),
            composite: CompositeOp::default(),
        }
    }
}

impl DrawStyle {
    pub fn solid(color: Rgba<u8>, width: f32) -> Self {
        Self {
            paint: Paint::Solid(color),
            width,
            ..Default::default()
        }
    }

    pub fn with_paint(mut self, paint: Paint) -> Self {
        self.paint = paint;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_brush(mut self, shape: BrushShape) -> Self {
        self.cap = shape.cap();
        self.join = shape.join();
        self
    }

    pub fn with_composite(mut self, composite: CompositeOp) -> Self {
        self.composite = composite;
        self
    }
}
