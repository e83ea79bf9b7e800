use crate::fill::flood_fill;
use crate::tools::{Tool, ToolContext, ToolInput, ToolOutcome};

/// Bucket fill. Acts on press; the whole gesture is one history entry even
/// when the region already has the fill color.
pub struct FillTool;

impl FillTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FillTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for FillTool {
    fn name(&self) -> &str {
        "Fill"
    }

    fn update(&mut self, ctx: &mut ToolContext<'_>, input: ToolInput) -> ToolOutcome {
        let ToolInput::Press(pos) = input else {
            return ToolOutcome::Idle;
        };
        let (x, y) = ctx.pixel_at(pos);
        let color = ctx.settings.fill_color();
        if !flood_fill(ctx.layer, x, y, color) {
            ctx.messages.push("Area already has the fill color".to_string());
        }
        ToolOutcome::Committed
    }

    fn is_active(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::harness::Harness;
    use egui::pos2;
    use image::Rgba;

    #[test]
    fn fills_on_press_with_opaque_color() {
        let mut h = Harness::new(10, 10);
        h.settings.color = Rgba([255, 0, 0, 255]);
        let mut tool = FillTool::new();
        assert_eq!(h.run(&mut tool, ToolInput::Press(pos2(5.0, 5.0))), ToolOutcome::Committed);
        assert!(h.layer.image().pixels().all(|p| *p == Rgba([255, 0, 0, 255])));
        assert_eq!(h.run(&mut tool, ToolInput::Release(pos2(5.0, 5.0))), ToolOutcome::Idle);
    }

    #[test]
    fn gradient_mode_uses_first_stop() {
        let mut h = Harness::new(4, 4);
        h.settings.gradient = true;
        h.settings.gradient_start = Rgba([0, 0, 255, 255]);
        h.settings.gradient_end = Rgba([255, 255, 0, 255]);
        h.run(&mut FillTool::new(), ToolInput::Press(pos2(1.0, 1.0)));
        assert_eq!(h.layer.get_pixel(3, 3), Some(Rgba([0, 0, 255, 255])));
    }

    #[test]
    fn out_of_bounds_press_is_clamped() {
        let mut h = Harness::new(6, 6);
        h.run(&mut FillTool::new(), ToolInput::Press(pos2(-20.0, 99.0)));
        assert_eq!(Harness::painted(&h.layer), 36);
    }

    #[test]
    fn no_op_fill_leaves_a_message() {
        let mut h = Harness::new(3, 3);
        h.layer.fill(Rgba([0, 0, 0, 255]));
        let outcome = h.run(&mut FillTool::new(), ToolInput::Press(pos2(1.0, 1.0)));
        assert_eq!(outcome, ToolOutcome::Committed);
        assert_eq!(h.messages.len(), 1);
    }
}
