pub mod distance;
pub mod loader;
pub mod render;

pub use crate::domain::model::{ComicMetadata, ComicSelection, DisplayFragment, DisplayNode, RunReport};
pub use crate::domain::ports::{ComicSource, ConfigProvider, DiagnosticSink, Page, Storage};
pub use crate::utils::error::Result;
