use crate::paint::DrawStyle;
use crate::tools::{Tool, ToolContext, ToolInput, ToolOutcome};
use egui::{Pos2, Vec2};
use rand::Rng;
use std::f32::consts::TAU;

const DOT_RADIUS: f32 = 1.0;

/// Scatters opaque dots around the pointer on every timer tick while held.
pub struct SprayTool {
    start: Pos2,
    pos: Option<Pos2>,
}

impl SprayTool {
    pub fn new() -> Self {
        Self {
            start: Pos2::ZERO,
            pos: None,
        }
    }

    fn spray(&self, ctx: &mut ToolContext<'_>, at: Pos2) {
        let radius = ctx.settings.line_width.max(0.0);
        let dots = (radius * ctx.config.spray_density as f32).round() as usize;
        let color = ctx
            .settings
            .stroke_paint(self.start, ctx.diagonal())
            .color_at(at);

        let mut surface = ctx.layer.scoped_style(DrawStyle::solid(color, 1.0));
        for _ in 0..dots {
            let angle = ctx.rng.gen::<f32>() * TAU;
            let distance = ctx.rng.gen::<f32>() * radius;
            let center = at + Vec2::angled(angle) * distance;
            surface.fill_ellipse(center, DOT_RADIUS, DOT_RADIUS);
        }
        log::trace!("Sprayed {dots} dots at {at:?}");
    }
}

impl Default for SprayTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for SprayTool {
    fn name(&self) -> &str {
        "Spray"
    }

    fn update(&mut self, ctx: &mut ToolContext<'_>, input: ToolInput) -> ToolOutcome {
        match input {
            ToolInput::Press(pos) => {
                self.start = pos;
                self.pos = Some(pos);
                ToolOutcome::Idle
            }
            ToolInput::Drag(pos) => {
                if self.pos.is_some() {
                    self.pos = Some(pos);
                }
                ToolOutcome::Idle
            }
            ToolInput::Tick => match self.pos {
                Some(at) => {
                    self.spray(ctx, at);
                    ToolOutcome::Changed
                }
                None => ToolOutcome::Idle,
            },
            ToolInput::Release(_) | ToolInput::Leave => match self.pos.take() {
                Some(_) => ToolOutcome::Committed,
                None => ToolOutcome::Idle,
            },
        }
    }

    fn is_active(&self) -> bool {
        self.pos.is_some()
    }
}
