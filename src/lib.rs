pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::diagnostics::{RecordingSink, TracingSink};
pub use adapters::http::HttpComicSource;
pub use adapters::page::Document;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::loader::ComicLoader;
pub use crate::core::render::FragmentRenderer;
pub use utils::error::{ComicError, Result};
