use image::RgbaImage;
use std::collections::VecDeque;

/// A flattened copy of the visible canvas.
#[derive(Clone, PartialEq)]
pub struct Snapshot {
    image: RgbaImage,
}

impl Snapshot {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (w, h) = self.dimensions();
        write!(f, "Snapshot({w}x{h})")
    }
}

/// Bounded undo/redo over whole-canvas snapshots.
///
/// The top of the undo side is always the current state, so the stack is only
/// undoable once it holds at least two entries.
pub struct HistoryStack {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    max_depth: usize,
}

impl HistoryStack {
    pub fn new(initial: Snapshot, max_depth: usize) -> Self {
        let mut undo = VecDeque::new();
        undo.push_back(initial);
        Self {
            undo,
            redo: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        self.undo.push_back(snapshot);
        while self.undo.len() > self.max_depth {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    /// Steps back one entry and returns the state to restore.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if self.undo.len() <= 1 {
            return None;
        }
        let current = self.undo.pop_back()?;
        self.redo.push(current);
        log::debug!("Undo: {} left, {} redoable", self.undo.len(), self.redo.len());
        self.undo.back().cloned()
    }

    /// Re-applies the most recently undone entry and returns it.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let next = self.redo.pop()?;
        self.undo.push_back(next.clone());
        while self.undo.len() > self.max_depth {
            self.undo.pop_front();
        }
        log::debug!("Redo: {} left, {} redoable", self.undo.len(), self.redo.len());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.undo.back()
    }
}
