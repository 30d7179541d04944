//! Core of the easybox annotator: coordinate mapping, box bookkeeping, sidecar files and
//! folder navigation. Rendering and widgets belong to the host; see `main.rs` for the
//! egui one.

pub mod config;
pub mod draw;
pub mod error;
pub mod geometry;
pub mod image_source;
pub mod navigator;
pub mod page;
pub mod palette;
pub mod session;
pub mod sidecar;
pub mod store;

pub use config::Config;
pub use draw::{DragPreview, DrawOutcome};
pub use error::{AnnotateError, UserCondition};
pub use geometry::{SurfacePoint, SurfaceRect, SurfaceSize};
pub use session::{AnnotationSession, ListEntry, OverlayRect};
pub use store::BBox;
