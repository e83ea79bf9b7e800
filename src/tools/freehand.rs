use crate::filters::blur_region;
use crate::paint::{BrushShape, CompositeOp, DrawStyle, Paint};
use crate::raster::stroke_bounds;
use crate::tools::{Tool, ToolContext, ToolInput, ToolOutcome};
use egui::Pos2;
use image::Rgba;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Brush {
    Pencil,
    /// Pencil at a wider width.
    Pen,
    /// Translucent round stroke, softened after each segment.
    Marker,
    Eraser,
}

/// Draws straight segments between successive pointer samples directly onto
/// the active layer.
pub struct FreehandTool {
    brush: Brush,
    start: Pos2,
    last_pos: Option<Pos2>,
}

impl FreehandTool {
    pub fn new(brush: Brush) -> Self {
        Self {
            brush,
            start: Pos2::ZERO,
            last_pos: None,
        }
    }

    fn style(&self, ctx: &ToolContext<'_>) -> DrawStyle {
        let settings = ctx.settings;
        let base = DrawStyle::default()
            .with_paint(settings.stroke_paint(self.start, ctx.diagonal()))
            .with_brush(settings.brush);
        let mut style = match self.brush {
            Brush::Pencil => base.with_opacity(settings.opacity),
            Brush::Pen => base.with_opacity(settings.opacity),
            Brush::Marker => base
                .with_opacity(settings.opacity * ctx.config.marker_alpha_factor)
                .with_brush(BrushShape::Round),
            Brush::Eraser => base
                .with_paint(Paint::Solid(Rgba([0, 0, 0, 255])))
                .with_composite(CompositeOp::DestinationOut),
        };
        style.width = match self.brush {
            Brush::Pen => settings.line_width * ctx.config.pen_width_factor,
            _ => settings.line_width,
        };
        style
    }

    fn draw_segment(&self, ctx: &mut ToolContext<'_>, from: Pos2, to: Pos2) {
        let style = self.style(ctx);
        ctx.layer.scoped_style(style).stroke_path(&[from, to], false);

        if self.brush == Brush::Marker {
            let sigma = ctx.config.marker_blur_radius;
            let dirty = stroke_bounds(&[from, to], style.width, style.join).expand(sigma * 3.0 + 1.0);
            let x = dirty.min.x.floor().max(0.0) as u32;
            let y = dirty.min.y.floor().max(0.0) as u32;
            let w = (dirty.max.x.ceil().max(0.0) as u32).saturating_sub(x);
            let h = (dirty.max.y.ceil().max(0.0) as u32).saturating_sub(y);
            blur_region(ctx.layer, x, y, w, h, sigma);
        }
    }
}

impl Tool for FreehandTool {
    fn name(&self) -> &str {
        match self.brush {
            Brush::Pencil => "Pencil",
            Brush::Pen => "Pen",
            Brush::Marker => "Marker",
            Brush::Eraser => "Eraser",
        }
    }

    fn update(&mut self, ctx: &mut ToolContext<'_>, input: ToolInput) -> ToolOutcome {
        match input {
            ToolInput::Press(pos) => {
                self.start = pos;
                self.last_pos = Some(pos);
                ToolOutcome::Idle
            }
            ToolInput::Drag(pos) => {
                let Some(last) = self.last_pos else {
                    return ToolOutcome::Idle;
                };
                self.draw_segment(ctx, last, pos);
                self.last_pos = Some(pos);
                ToolOutcome::Changed
            }
            ToolInput::Release(pos) => {
                let Some(last) = self.last_pos.take() else {
                    return ToolOutcome::Idle;
                };
                if last != pos {
                    self.draw_segment(ctx, last, pos);
                }
                ToolOutcome::Committed
            }
            ToolInput::Leave => match self.last_pos.take() {
                Some(_) => ToolOutcome::Committed,
                None => ToolOutcome::Idle,
            },
            ToolInput::Tick => ToolOutcome::Idle,
        }
    }

    fn is_active(&self) -> bool {
        self.last_pos.is_some()
    }
}
