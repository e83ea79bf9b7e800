use crate::blend::BlendMode;
use crate::surface::{PixelSurface, WHITE};
use image::RgbaImage;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub const MERGED_LAYER_NAME: &str = "Merged layer";

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct LayerId(Uuid);

impl LayerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Structural edits the stack refuses. These are advisory, not failures: the
/// stack is left exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayerWarning {
    #[error("at least one layer must remain")]
    LastLayer,
    #[error("new order must list every layer exactly once")]
    InvalidOrder,
}

#[derive(Clone, Debug)]
pub struct Layer {
    id: LayerId,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    opacity: f32,
    pub blend: BlendMode,
    pub surface: PixelSurface,
}

impl Layer {
    fn new_raster(width: u32, height: u32, name: String) -> Self {
        Self::with_surface(PixelSurface::new(width, height), name)
    }

    fn with_surface(surface: PixelSurface, name: String) -> Self {
        Self {
            id: LayerId::new(),
            name,
            visible: true,
            locked: false,
            opacity: 1.0,
            blend: BlendMode::Normal,
            surface,
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() {
            1.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }
}

/// Layers in back-to-front order plus the active layer.
///
/// Never empty: the stack starts with one layer and refuses to drop its last.
#[derive(Clone, Debug)]
pub struct LayerStack {
    width: u32,
    height: u32,
    layers: Vec<Layer>,
    active: usize,
}

impl LayerStack {
    pub fn new(width: u32, height: u32) -> Self {
        let mut stack = Self {
            width,
            height,
            layers: Vec::new(),
            active: 0,
        };
        stack.add_layer(None);
        stack
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn position(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub fn ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(|l| l.id).collect()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Layer {
        &self.layers[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Layer {
        &mut self.layers[self.active]
    }

    /// Appends a transparent, canvas-sized layer and makes it active.
    pub fn add_layer(&mut self, name: Option<String>) -> &mut Layer {
        let name = name.unwrap_or_else(|| format!("Layer {}", self.layers.len() + 1));
        log::debug!("Adding layer {:?}", name);
        self.layers.push(Layer::new_raster(self.width, self.height, name));
        self.active = self.layers.len() - 1;
        &mut self.layers[self.active]
    }

    pub fn remove_active_layer(&mut self) -> Result<Layer, LayerWarning> {
        if self.layers.len() <= 1 {
            log::warn!("Refusing to remove the last layer");
            return Err(LayerWarning::LastLayer);
        }
        let removed = self.layers.remove(self.active);
        if self.active >= self.layers.len() {
            self.active = self.layers.len() - 1;
        }
        log::debug!("Removed layer {:?}", removed.name);
        Ok(removed)
    }

    /// Flattens the visible layers into one opaque layer. Returns `false` when
    /// there is only one layer.
    pub fn merge_all(&mut self) -> bool {
        if self.layers.len() <= 1 {
            return false;
        }
        let mut merged = PixelSurface::filled(self.width, self.height, WHITE);
        self.composite_layers(&mut merged);
        log::debug!("Merged {} layers", self.layers.len());
        self.layers = vec![Layer::with_surface(merged, MERGED_LAYER_NAME.to_string())];
        self.active = 0;
        true
    }

    /// Reorders the stack; the active layer keeps being active wherever it
    /// lands. `order` must be a permutation of the current ids.
    pub fn reorder(&mut self, order: &[LayerId]) -> Result<(), LayerWarning> {
        let mut positions = Vec::with_capacity(order.len());
        for id in order {
            match self.position(*id) {
                Some(i) if !positions.contains(&i) => positions.push(i),
                _ => break,
            }
        }
        if positions.len() != self.layers.len() || order.len() != self.layers.len() {
            log::warn!("Rejected layer order {:?} for stack {:?}", order, self.ids());
            return Err(LayerWarning::InvalidOrder);
        }

        let active_id = self.active().id;
        let mut slots: Vec<Option<Layer>> = self.layers.drain(..).map(Some).collect();
        self.layers = positions.into_iter().filter_map(|i| slots[i].take()).collect();
        self.active = self.position(active_id).unwrap_or(0);
        Ok(())
    }

    /// Makes `index` active unless it is out of range or locked.
    pub fn set_active(&mut self, index: usize) -> bool {
        match self.layers.get(index) {
            Some(layer) if !layer.locked => {
                self.active = index;
                true
            }
            _ => false,
        }
    }

    /// Renames a layer; blank names are ignored.
    pub fn rename(&mut self, index: usize, name: &str) -> bool {
        let name = name.trim();
        match self.layers.get_mut(index) {
            Some(layer) if !name.is_empty() => {
                layer.name = name.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn set_visible(&mut self, index: usize, visible: bool) -> bool {
        self.update(index, |l| l.visible = visible)
    }

    pub fn set_locked(&mut self, index: usize, locked: bool) -> bool {
        self.update(index, |l| l.locked = locked)
    }

    pub fn set_opacity(&mut self, index: usize, opacity: f32) -> bool {
        self.update(index, |l| l.set_opacity(opacity))
    }

    pub fn set_blend(&mut self, index: usize, blend: BlendMode) -> bool {
        self.update(index, |l| l.blend = blend)
    }

    fn update(&mut self, index: usize, f: impl FnOnce(&mut Layer)) -> bool {
        match self.layers.get_mut(index) {
            Some(layer) => {
                f(layer);
                true
            }
            None => false,
        }
    }

    fn composite_layers(&self, target: &mut PixelSurface) {
        for layer in self.layers.iter().filter(|l| l.visible) {
            target.composite_from(&layer.surface, layer.opacity, layer.blend);
        }
    }

    /// Redraws `target` as white plus every visible layer, back to front.
    pub fn composite_into(&self, target: &mut PixelSurface) {
        target.fill(WHITE);
        self.composite_layers(target);
    }

    pub fn flatten(&self) -> RgbaImage {
        let mut out = PixelSurface::new(self.width, self.height);
        self.composite_into(&mut out);
        out.into_image()
    }
}
