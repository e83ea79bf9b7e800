pub mod curve;
pub mod fill;
pub mod freehand;
pub mod shape;
pub mod spray;

use crate::config::EditorConfig;
use crate::shapes::ShapeKind;
use crate::state::ToolSettings;
use crate::surface::PixelSurface;
use egui::Pos2;
use rand::rngs::StdRng;

pub use curve::CurveTool;
pub use fill::FillTool;
pub use freehand::{Brush, FreehandTool};
pub use shape::ShapeTool;
pub use spray::SprayTool;

/// One pointer or timer event, in canvas coordinates.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ToolInput {
    Press(Pos2),
    Drag(Pos2),
    Release(Pos2),
    /// The pointer left the canvas; treated as a release at the last position.
    Leave,
    /// Periodic timer while the pointer is held.
    Tick,
}

/// What a tool did with an input, so the session knows whether to redraw or
/// record history.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ToolOutcome {
    Idle,
    /// Only the preview surface changed.
    Preview,
    /// The active layer changed mid-gesture.
    Changed,
    /// The gesture finished and is one history entry.
    Committed,
}

/// Everything a tool may touch while handling one input.
pub struct ToolContext<'a> {
    pub layer: &'a mut PixelSurface,
    pub preview: &'a mut PixelSurface,
    pub settings: &'a ToolSettings,
    pub config: &'a EditorConfig,
    pub rng: &'a mut StdRng,
    pub messages: &'a mut Vec<String>,
}

impl ToolContext<'_> {
    /// Length of the canvas diagonal, the span of stroke gradients.
    pub fn diagonal(&self) -> f32 {
        let (w, h) = (self.layer.width() as f32, self.layer.height() as f32);
        (w * w + h * h).sqrt()
    }

    /// Integer pixel under `pos`, clamped to the layer.
    pub fn pixel_at(&self, pos: Pos2) -> (u32, u32) {
        let clamp = |v: f32, len: u32| {
            if v.is_nan() {
                0
            } else {
                (v.floor().max(0.0) as u32).min(len.saturating_sub(1))
            }
        };
        (clamp(pos.x, self.layer.width()), clamp(pos.y, self.layer.height()))
    }
}

pub trait Tool {
    fn name(&self) -> &str;

    fn update(&mut self, ctx: &mut ToolContext<'_>, input: ToolInput) -> ToolOutcome;

    /// True between a press and the matching release.
    fn is_active(&self) -> bool;
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub enum ToolKind {
    #[default]
    Pencil,
    Pen,
    Marker,
    Eraser,
    Spray,
    Fill,
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

impl ToolKind {
    pub const ALL: [ToolKind; 17] = [
        ToolKind::Pencil,
        ToolKind::Pen,
        ToolKind::Marker,
        ToolKind::Eraser,
        ToolKind::Spray,
        ToolKind::Fill,
        ToolKind::Line,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Triangle,
        ToolKind::Hexagon,
        ToolKind::Pentagon,
        ToolKind::Star,
        ToolKind::Heart,
        ToolKind::Diamond,
        ToolKind::Arrow,
        ToolKind::Curve,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Pencil => "Pencil",
            ToolKind::Pen => "Pen",
            ToolKind::Marker => "Marker",
            ToolKind::Eraser => "Eraser",
            ToolKind::Spray => "Spray",
            ToolKind::Fill => "Fill",
            other => other.shape().map_or("Shape", ShapeKind::name),
        }
    }

    /// The shape a drag-to-draw tool renders, if any. Curve has its own tool.
    pub fn shape(self) -> Option<ShapeKind> {
        Some(match self {
            ToolKind::Line => ShapeKind::Line,
            ToolKind::Rectangle => ShapeKind::Rectangle,
            ToolKind::Circle => ShapeKind::Circle,
            ToolKind::Triangle => ShapeKind::Triangle,
            ToolKind::Hexagon => ShapeKind::Hexagon,
            ToolKind::Pentagon => ShapeKind::Pentagon,
            ToolKind::Star => ShapeKind::Star,
            ToolKind::Heart => ShapeKind::Heart,
            ToolKind::Diamond => ShapeKind::Diamond,
            ToolKind::Arrow => ShapeKind::Arrow,
            ToolKind::Curve => ShapeKind::Curve,
            _ => return None,
        })
    }

    pub fn create(self) -> Box<dyn Tool> {
        match self {
            ToolKind::Pencil => Box::new(FreehandTool::new(Brush::Pencil)),
            ToolKind::Pen => Box::new(FreehandTool::new(Brush::Pen)),
            ToolKind::Marker => Box::new(FreehandTool::new(Brush::Marker)),
            ToolKind::Eraser => Box::new(FreehandTool::new(Brush::Eraser)),
            ToolKind::Spray => Box::new(SprayTool::new()),
            ToolKind::Fill => Box::new(FillTool::new()),
            ToolKind::Curve => Box::new(CurveTool::new()),
            other => match other.shape() {
                Some(kind) => Box::new(ShapeTool::new(kind)),
                None => Box::new(FreehandTool::new(Brush::Pencil)),
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod harness {
    use super::*;
    use rand::SeedableRng;

    /// Owns everything a [`ToolContext`] borrows.
    pub struct Harness {
        pub layer: PixelSurface,
        pub preview: PixelSurface,
        pub settings: ToolSettings,
        pub config: EditorConfig,
        pub rng: StdRng,
        pub messages: Vec<String>,
    }

    impl Harness {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                layer: PixelSurface::new(width, height),
                preview: PixelSurface::new(width, height),
                settings: ToolSettings::default(),
                config: EditorConfig::default().with_size(width, height),
                rng: StdRng::seed_from_u64(7),
                messages: Vec::new(),
            }
        }

        pub fn run(&mut self, tool: &mut dyn Tool, input: ToolInput) -> ToolOutcome {
            let mut ctx = ToolContext {
                layer: &mut self.layer,
                preview: &mut self.preview,
                settings: &self.settings,
                config: &self.config,
                rng: &mut self.rng,
                messages: &mut self.messages,
            };
            tool.update(&mut ctx, input)
        }

        pub fn painted(surface: &PixelSurface) -> usize {
            surface.image().pixels().filter(|p| p[3] > 0).count()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_creates_its_tool() {
        for kind in ToolKind::ALL {
            let tool = kind.create();
            assert_eq!(tool.name(), kind.name());
            assert!(!tool.is_active());
        }
    }

    #[test]
    fn only_drag_shapes_map_to_shape_kinds() {
        assert_eq!(ToolKind::Star.shape(), Some(ShapeKind::Star));
        assert_eq!(ToolKind::Spray.shape(), None);
        assert_eq!(ToolKind::Curve.name(), "Curve");
    }
}
