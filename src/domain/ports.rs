use crate::domain::model::{ComicMetadata, ComicSelection, DisplayNode};
use crate::utils::error::{ComicError, Result};
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn selection_endpoint(&self) -> &str;
    fn lookup_endpoint(&self) -> &str;
    fn email(&self) -> &str;
    fn container_id(&self) -> &str;
    fn date_format(&self) -> &str;
    fn timeout_seconds(&self) -> Option<u64>;
    fn template_path(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn output_file(&self) -> &str;
}

/// The two remote endpoints a load talks to.
#[async_trait]
pub trait ComicSource: Send + Sync {
    async fn select(&self) -> Result<ComicSelection>;
    async fn lookup(&self, selection: &ComicSelection) -> Result<ComicMetadata>;
}

/// A page whose elements are addressable by id.
pub trait Page: Send + Sync {
    fn has_element(&self, id: &str) -> bool;
    fn append_children(&self, id: &str, nodes: Vec<DisplayNode>) -> Result<usize>;
}

/// Receives failures caught at the top-level boundary.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, error: &ComicError);
}
