use crate::shapes::{render_shape, ShapeDescriptor, ShapeKind};
use crate::tools::{Tool, ToolContext, ToolInput, ToolOutcome};
use egui::Pos2;

/// Drag-to-draw shape. The shape is redrawn on the preview surface while
/// dragging and rendered once onto the layer on release.
pub struct ShapeTool {
    kind: ShapeKind,
    start_pos: Option<Pos2>,
    current_pos: Pos2,
}

impl ShapeTool {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            start_pos: None,
            current_pos: Pos2::ZERO,
        }
    }

    fn descriptor(&self, ctx: &ToolContext<'_>, a: Pos2, b: Pos2) -> ShapeDescriptor {
        let style = ctx.settings.shape_style(a, b);
        ShapeDescriptor::new(self.kind, a, b, style).filled(ctx.settings.fill_shapes)
    }

    fn commit(&mut self, ctx: &mut ToolContext<'_>, end: Pos2) -> ToolOutcome {
        let Some(start) = self.start_pos.take() else {
            return ToolOutcome::Idle;
        };
        ctx.preview.clear();
        let shape = self.descriptor(ctx, start, end);
        render_shape(ctx.layer, &shape);
        log::debug!("Drew {} from {:?} to {:?}", self.kind.name(), start, end);
        ToolOutcome::Committed
    }
}

impl Tool for ShapeTool {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn update(&mut self, ctx: &mut ToolContext<'_>, input: ToolInput) -> ToolOutcome {
        match input {
            ToolInput::Press(pos) => {
                self.start_pos = Some(pos);
                self.current_pos = pos;
                ctx.preview.clear();
                ToolOutcome::Idle
            }
            ToolInput::Drag(pos) => {
                let Some(start) = self.start_pos else {
                    return ToolOutcome::Idle;
                };
                self.current_pos = pos;
                ctx.preview.clear();
                let shape = self.descriptor(ctx, start, pos);
                render_shape(ctx.preview, &shape);
                ToolOutcome::Preview
            }
            ToolInput::Release(pos) => self.commit(ctx, pos),
            ToolInput::Leave => {
                let end = self.current_pos;
                self.commit(ctx, end)
            }
            ToolInput::Tick => ToolOutcome::Idle,
        }
    }

    fn is_active(&self) -> bool {
        self.start_pos.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::harness::Harness;
    use egui::pos2;
    use image::Rgba;

    #[test]
    fn preview_then_commit() {
        let mut h = Harness::new(50, 50);
        let mut tool = ShapeTool::new(ShapeKind::Line);
        h.run(&mut tool, ToolInput::Press(pos2(5.0, 25.0)));
        assert_eq!(h.run(&mut tool, ToolInput::Drag(pos2(45.0, 25.0))), ToolOutcome::Preview);
        assert!(Harness::painted(&h.preview) > 0);
        assert_eq!(Harness::painted(&h.layer), 0);

        assert_eq!(h.run(&mut tool, ToolInput::Release(pos2(45.0, 25.0))), ToolOutcome::Committed);
        assert_eq!(Harness::painted(&h.preview), 0);
        assert!(Harness::painted(&h.layer) > 0);
    }

    #[test]
    fn preview_is_replaced_each_drag() {
        let mut h = Harness::new(50, 50);
        let mut tool = ShapeTool::new(ShapeKind::Rectangle);
        h.settings.fill_shapes = true;
        h.run(&mut tool, ToolInput::Press(pos2(0.0, 0.0)));
        h.run(&mut tool, ToolInput::Drag(pos2(40.0, 40.0)));
        h.run(&mut tool, ToolInput::Drag(pos2(10.0, 10.0)));
        assert_eq!(Harness::painted(&h.preview), 100);
    }

    #[test]
    fn filled_rectangle_is_exact() {
        let mut h = Harness::new(100, 100);
        h.settings.fill_shapes = true;
        let mut tool = ShapeTool::new(ShapeKind::Rectangle);
        h.run(&mut tool, ToolInput::Press(pos2(10.0, 10.0)));
        h.run(&mut tool, ToolInput::Release(pos2(50.0, 40.0)));
        for (x, y, p) in h.layer.image().enumerate_pixels() {
            let inside = (10..50).contains(&x) && (10..40).contains(&y);
            let expected = if inside { Rgba([0, 0, 0, 255]) } else { Rgba([0, 0, 0, 0]) };
            assert_eq!(*p, expected, "({x}, {y})");
        }
    }

    #[test]
    fn leave_commits_at_last_drag() {
        let mut h = Harness::new(30, 30);
        h.settings.fill_shapes = true;
        let mut tool = ShapeTool::new(ShapeKind::Rectangle);
        h.run(&mut tool, ToolInput::Press(pos2(0.0, 0.0)));
        h.run(&mut tool, ToolInput::Drag(pos2(5.0, 5.0)));
        assert_eq!(h.run(&mut tool, ToolInput::Leave), ToolOutcome::Committed);
        assert_eq!(Harness::painted(&h.layer), 25);
        assert!(!tool.is_active());
    }

    #[test]
    fn zero_length_drag_commits() {
        let mut h = Harness::new(10, 10);
        let mut tool = ShapeTool::new(ShapeKind::Star);
        h.run(&mut tool, ToolInput::Press(pos2(5.0, 5.0)));
        assert_eq!(h.run(&mut tool, ToolInput::Release(pos2(5.0, 5.0))), ToolOutcome::Committed);
    }
}
