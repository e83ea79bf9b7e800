use crate::shapes::{render_shape, ShapeDescriptor};
use crate::tools::{Tool, ToolContext, ToolInput, ToolOutcome};
use egui::Pos2;

/// Freeform open polyline through every sample of one drag, previewed while
/// dragging and drawn on release.
pub struct CurveTool {
    points: Vec<Pos2>,
}

impl CurveTool {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    fn shape(&self, ctx: &ToolContext<'_>) -> ShapeDescriptor {
        let first = self.points.first().copied().unwrap_or(Pos2::ZERO);
        let last = self.points.last().copied().unwrap_or(first);
        ShapeDescriptor::curve(self.points.clone(), ctx.settings.shape_style(first, last))
    }

    fn commit(&mut self, ctx: &mut ToolContext<'_>) -> ToolOutcome {
        ctx.preview.clear();
        let shape = self.shape(ctx);
        render_shape(ctx.layer, &shape);
        log::debug!("Drew curve through {} points", self.points.len());
        self.points.clear();
        ToolOutcome::Committed
    }
}

impl Default for CurveTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for CurveTool {
    fn name(&self) -> &str {
        "Curve"
    }

    fn update(&mut self, ctx: &mut ToolContext<'_>, input: ToolInput) -> ToolOutcome {
        match input {
            ToolInput::Press(pos) => {
                self.points.clear();
                self.points.push(pos);
                ToolOutcome::Idle
            }
            ToolInput::Drag(pos) => {
                if self.points.is_empty() {
                    return ToolOutcome::Idle;
                }
                self.points.push(pos);
                ctx.preview.clear();
                let shape = self.shape(ctx);
                render_shape(ctx.preview, &shape);
                ToolOutcome::Preview
            }
            ToolInput::Release(pos) => {
                if self.points.is_empty() {
                    return ToolOutcome::Idle;
                }
                if self.points.last() != Some(&pos) {
                    self.points.push(pos);
                }
                self.commit(ctx)
            }
            ToolInput::Leave => {
                if self.points.is_empty() {
                    return ToolOutcome::Idle;
                }
                self.commit(ctx)
            }
            ToolInput::Tick => ToolOutcome::Idle,
        }
    }

    fn is_active(&self) -> bool {
        !self.points.is_empty()
    }
}
