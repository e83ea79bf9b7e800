pub mod blend;
pub mod config;
pub mod error;
pub mod fill;
pub mod filters;
pub mod history;
pub mod io;
pub mod layers;
pub mod paint;
pub mod raster;
pub mod shapes;
pub mod state;
pub mod surface;
pub mod tools;

pub use blend::BlendMode;
pub use config::EditorConfig;
pub use error::EditorError;
pub use filters::Filter;
pub use history::{HistoryStack, Snapshot};
pub use layers::{Layer, LayerId, LayerStack, LayerWarning};
pub use paint::{BrushShape, DrawStyle, Paint};
pub use shapes::{render_shape, ShapeDescriptor, ShapeKind};
pub use state::{EditorSession, ToolSettings};
pub use surface::PixelSurface;
pub use tools::ToolKind;
