use crate::blend::BlendMode;
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::filters::Filter;
use crate::history::{HistoryStack, Snapshot};
use crate::io;
use crate::layers::{LayerId, LayerStack, LayerWarning};
use crate::paint::{BrushShape, DrawStyle, Paint};
use crate::surface::{PixelSurface, WHITE};
use crate::tools::{Tool, ToolContext, ToolInput, ToolKind, ToolOutcome};
use egui::Pos2;
use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct ToolSettings {
    pub color: Rgba<u8>,
    pub gradient: bool,
    pub gradient_start: Rgba<u8>,
    pub gradient_end: Rgba<u8>,
    pub line_width: f32,
    pub opacity: f32,
    pub brush: BrushShape,
    /// Closed shapes are filled instead of outlined.
    pub fill_shapes: bool,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            color: Rgba([0, 0, 0, 255]),
            gradient: false,
            gradient_start: Rgba([0, 0, 0, 255]),
            gradient_end: Rgba([255, 255, 255, 255]),
            line_width: 5.0,
            opacity: 1.0,
            brush: BrushShape::Round,
            fill_shapes: false,
        }
    }
}

impl ToolSettings {
    /// Paint for brushes and spray: radial from the stroke start, reaching the
    /// second stop at `span`.
    pub fn stroke_paint(&self, start: Pos2, span: f32) -> Paint {
        if self.gradient {
            Paint::Radial {
                center: start,
                radius: span,
                start: self.gradient_start,
                end: self.gradient_end,
            }
        } else {
            Paint::Solid(self.color)
        }
    }

    /// Paint for shapes: linear along the drag.
    pub fn shape_paint(&self, from: Pos2, to: Pos2) -> Paint {
        if self.gradient {
            Paint::Linear {
                from,
                to,
                start: self.gradient_start,
                end: self.gradient_end,
            }
        } else {
            Paint::Solid(self.color)
        }
    }

    pub fn shape_style(&self, from: Pos2, to: Pos2) -> DrawStyle {
        let mut style = DrawStyle::default()
            .with_paint(self.shape_paint(from, to))
            .with_opacity(self.opacity)
            .with_brush(self.brush);
        style.width = self.line_width;
        style
    }

    /// Bucket color: the gradient's value at distance zero, always opaque.
    pub fn fill_color(&self) -> Rgba<u8> {
        let mut color = if self.gradient {
            self.gradient_start
        } else {
            self.color
        };
        color[3] = 255;
        color
    }
}

/// One open document: its layers, history, display canvas and the tool
/// currently driven by pointer input.
pub struct EditorSession {
    config: EditorConfig,
    layers: LayerStack,
    history: HistoryStack,
    canvas: PixelSurface,
    preview: PixelSurface,
    tool: ToolKind,
    active_tool: Box<dyn Tool>,
    pub settings: ToolSettings,
    rng: StdRng,
    messages: Vec<String>,
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Result<Self, EditorError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// A session whose spray pattern is reproducible.
    pub fn with_seed(config: EditorConfig, seed: u64) -> Result<Self, EditorError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: EditorConfig, rng: StdRng) -> Result<Self, EditorError> {
        config.validate()?;
        let (width, height) = (config.width, config.height);
        let mut layers = LayerStack::new(width, height);
        layers.rename(0, &config.layer_name(1));
        let canvas = PixelSurface::filled(width, height, WHITE);
        let history = HistoryStack::new(Snapshot::new(canvas.image().clone()), config.history_depth);
        log::info!("New {}x{} session", width, height);

        let tool = ToolKind::default();
        Ok(Self {
            config,
            layers,
            history,
            canvas,
            preview: PixelSurface::new(width, height),
            tool,
            active_tool: tool.create(),
            settings: ToolSettings::default(),
            rng,
            messages: Vec::new(),
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// The composite shown to the user.
    pub fn canvas(&self) -> &PixelSurface {
        &self.canvas
    }

    /// In-progress shape drawn above the canvas.
    pub fn preview(&self) -> &PixelSurface {
        &self.preview
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Switches tools, finishing any gesture the old tool had in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.active_tool.is_active() {
            self.dispatch(ToolInput::Leave);
        }
        self.tool = tool;
        self.active_tool = tool.create();
        self.preview.clear();
    }

    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.messages.push(message);
    }

    // Pointer input

    pub fn pointer_down(&mut self, pos: Pos2) {
        self.dispatch(ToolInput::Press(pos));
    }

    pub fn pointer_move(&mut self, pos: Pos2) {
        self.dispatch(ToolInput::Drag(pos));
    }

    pub fn pointer_up(&mut self, pos: Pos2) {
        self.dispatch(ToolInput::Release(pos));
    }

    pub fn pointer_leave(&mut self) {
        self.dispatch(ToolInput::Leave);
    }

    /// Host timer callback; call every [`Self::spray_interval`] while the
    /// pointer is held.
    pub fn spray_tick(&mut self) {
        self.dispatch(ToolInput::Tick);
    }

    pub fn spray_interval(&self) -> Duration {
        self.config.spray_interval()
    }

    fn dispatch(&mut self, input: ToolInput) {
        let mut ctx = ToolContext {
            layer: &mut self.layers.active_mut().surface,
            preview: &mut self.preview,
            settings: &self.settings,
            config: &self.config,
            rng: &mut self.rng,
            messages: &mut self.messages,
        };
        match self.active_tool.update(&mut ctx, input) {
            ToolOutcome::Idle | ToolOutcome::Preview => {}
            ToolOutcome::Changed => self.redraw(),
            ToolOutcome::Committed => {
                log::debug!("{} committed", self.active_tool.name());
                self.commit();
            }
        }
    }

    fn redraw(&mut self) {
        self.layers.composite_into(&mut self.canvas);
    }

    fn save_state(&mut self) {
        self.history.push(Snapshot::new(self.canvas.image().clone()));
    }

    fn commit(&mut self) {
        self.redraw();
        self.save_state();
    }

    // History

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Restores the previous snapshot onto the display canvas. Layers are not
    /// touched; the next redraw shows them again.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.restore(&snapshot);
        if self.config.undo_pushes_snapshot {
            self.save_state();
        }
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.restore(&snapshot);
        true
    }

    fn restore(&mut self, snapshot: &Snapshot) {
        if let Err(e) = self.canvas.set_region(snapshot.image()) {
            log::error!("Failed to restore snapshot: {}", e);
        }
    }

    // Layers

    pub fn add_layer(&mut self, name: Option<String>) -> LayerId {
        let name = name.unwrap_or_else(|| self.config.layer_name(self.layers.len() + 1));
        let id = self.layers.add_layer(Some(name)).id();
        self.commit();
        id
    }

    pub fn remove_active_layer(&mut self) -> Result<(), LayerWarning> {
        match self.layers.remove_active_layer() {
            Ok(_) => {
                self.commit();
                Ok(())
            }
            Err(warning) => {
                self.warn(warning.to_string());
                Err(warning)
            }
        }
    }

    pub fn merge_layers(&mut self) -> bool {
        if !self.layers.merge_all() {
            return false;
        }
        self.commit();
        true
    }

    pub fn reorder_layers(&mut self, order: &[LayerId]) -> Result<(), LayerWarning> {
        match self.layers.reorder(order) {
            Ok(()) => {
                self.commit();
                Ok(())
            }
            Err(warning) => {
                self.warn(warning.to_string());
                Err(warning)
            }
        }
    }

    pub fn rename_layer(&mut self, index: usize, name: &str) -> bool {
        let renamed = self.layers.rename(index, name);
        if renamed {
            self.commit();
        }
        renamed
    }

    pub fn set_layer_visible(&mut self, index: usize, visible: bool) -> bool {
        let changed = self.layers.set_visible(index, visible);
        if changed {
            self.commit();
        }
        changed
    }

    pub fn set_layer_opacity(&mut self, index: usize, opacity: f32) -> bool {
        let changed = self.layers.set_opacity(index, opacity);
        if changed {
            self.commit();
        }
        changed
    }

    pub fn set_layer_blend(&mut self, index: usize, blend: BlendMode) -> bool {
        let changed = self.layers.set_blend(index, blend);
        if changed {
            self.commit();
        }
        changed
    }

    pub fn set_layer_locked(&mut self, index: usize, locked: bool) -> bool {
        self.layers.set_locked(index, locked)
    }

    pub fn set_active_layer(&mut self, index: usize) -> bool {
        if self.layers.set_active(index) {
            return true;
        }
        match self.layers.get(index) {
            Some(layer) => log::debug!("Layer {:?} is locked", layer.name),
            None => log::warn!("No layer at index {}", index),
        }
        false
    }

    pub fn clear_active_layer(&mut self) {
        self.layers.active_mut().surface.clear();
        self.commit();
    }

    pub fn apply_filter(&mut self, filter: Filter) {
        filter.apply(&mut self.layers.active_mut().surface);
        log::debug!("Applied {} to {:?}", filter.name(), self.layers.active().name);
        self.commit();
    }

    // Import / export

    /// Places `image` on a new layer, scaled to fit the canvas and centered.
    pub fn import_image(&mut self, image: &RgbaImage, name: Option<String>) -> Result<LayerId, EditorError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(EditorError::InvalidDimensions {
                width: image.width(),
                height: image.height(),
            });
        }
        let (scaled, fit) = io::fit_into(image, self.layers.width(), self.layers.height());
        let name = name.unwrap_or_else(|| self.config.layer_name(self.layers.len() + 1));
        let layer = self.layers.add_layer(Some(name));
        layer.surface.draw_image(&scaled, fit.x, fit.y);
        let id = layer.id();
        log::info!("Imported {}x{} image at ({}, {})", fit.width, fit.height, fit.x, fit.y);
        self.commit();
        Ok(id)
    }

    /// Decodes `bytes` first; a decode failure leaves the session untouched.
    pub fn import_bytes(&mut self, bytes: &[u8], name: Option<String>) -> Result<LayerId, EditorError> {
        let image = io::decode_image(bytes)?;
        self.import_image(&image, name)
    }

    pub fn flatten(&self) -> RgbaImage {
        self.layers.flatten()
    }

    pub fn export(&self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        io::save_image(&self.flatten(), path)
    }
}
