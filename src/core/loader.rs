use crate::adapters::diagnostics::TracingSink;
use crate::core::render::{self, FragmentRenderer};
use crate::domain::model::RunReport;
use crate::domain::ports::{ComicSource, DiagnosticSink, Page};
use crate::utils::error::{ComicError, Result};
use chrono::{Local, NaiveDateTime};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const DEFAULT_CONTAINER_ID: &str = "comic-page";

pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Fetches today's comic and appends it to a page container.
///
/// Every call to [`ComicLoader::run`] issues the selection request, then the
/// lookup request, then appends four nodes. Nothing is deduplicated: calling it
/// twice appends two fragments.
pub struct ComicLoader<S: ComicSource, P: Page> {
    source: S,
    page: P,
    container_id: String,
    renderer: FragmentRenderer,
    clock: Clock,
    diagnostics: Arc<dyn DiagnosticSink>,
    in_flight: AtomicBool,
}

impl<S: ComicSource, P: Page> ComicLoader<S, P> {
    pub fn new(source: S, page: P) -> Self {
        Self {
            source,
            page,
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            renderer: FragmentRenderer::default(),
            clock: Arc::new(|| Local::now().naive_local()),
            diagnostics: Arc::new(TracingSink),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_container_id(mut self, container_id: impl Into<String>) -> Self {
        self.container_id = container_id.into();
        self
    }

    pub fn with_renderer(mut self, renderer: FragmentRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub async fn run(&self) -> Result<RunReport> {
        let selection = self.source.select().await?;
        tracing::debug!("Selected comic: {}", selection);

        let metadata = self.source.lookup(&selection).await?;
        tracing::debug!("Fetched metadata for '{}'", metadata.title);

        let published = render::publish_date(&metadata)?;
        let fragment = self
            .renderer
            .render(&metadata, published, (self.clock)())?;

        if !self.page.has_element(&self.container_id) {
            return Err(ComicError::MissingContainer {
                id: self.container_id.clone(),
            });
        }

        let nodes_appended = self
            .page
            .append_children(&self.container_id, fragment.into_nodes())?;
        tracing::debug!(
            "Appended {} nodes to #{}",
            nodes_appended,
            self.container_id
        );

        Ok(RunReport {
            selection,
            metadata,
            published,
            nodes_appended,
        })
    }

    /// Like [`ComicLoader::run`], but refuses to start while another
    /// exclusive run on this loader is still in flight.
    pub async fn run_exclusive(&self) -> Result<RunReport> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(ComicError::AlreadyRunning)?;
        self.run().await
    }

    /// Runs once and swallows any failure into the diagnostic sink.
    pub async fn display_comic(&self) -> Option<RunReport> {
        match self.run().await {
            Ok(report) => {
                tracing::info!(
                    "✅ Displayed comic {} ('{}')",
                    report.selection,
                    report.metadata.title
                );
                Some(report)
            }
            Err(e) => {
                self.diagnostics.record(&e);
                None
            }
        }
    }
}

struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::diagnostics::RecordingSink;
    use crate::adapters::page::Document;
    use crate::domain::model::{ComicMetadata, ComicSelection, DisplayNode};
    use crate::utils::error::ErrorCategory;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    struct StaticSource {
        selection: Option<ComicSelection>,
        metadata: ComicMetadata,
        calls: Mutex<Vec<String>>,
    }

    impl StaticSource {
        fn new(metadata: ComicMetadata) -> Self {
            Self {
                selection: Some(ComicSelection::new("42")),
                metadata,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing_selection(metadata: ComicMetadata) -> Self {
            Self {
                selection: None,
                ..Self::new(metadata)
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ComicSource for StaticSource {
        async fn select(&self) -> Result<ComicSelection> {
            self.calls.lock().unwrap().push("select".to_string());
            self.selection.clone().ok_or(ComicError::HttpStatus {
                url: "http://selection".to_string(),
                status: 500,
            })
        }

        async fn lookup(&self, selection: &ComicSelection) -> Result<ComicMetadata> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("lookup:{}", selection));
            Ok(self.metadata.clone())
        }
    }

    fn metadata() -> ComicMetadata {
        ComicMetadata {
            image_url: "https://imgs.example.com/comics/answer.png".to_string(),
            alt_text: "The answer".to_string(),
            title: "Answer".to_string(),
            year: 2024,
            month: 1,
            day: 10,
        }
    }

    fn fixed_clock() -> Clock {
        Arc::new(|| {
            NaiveDate::from_ymd_opt(2024, 1, 12)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap()
        })
    }

    fn loader(source: StaticSource, page: Document) -> ComicLoader<StaticSource, Document> {
        ComicLoader::new(source, page).with_clock(fixed_clock())
    }

    #[tokio::test]
    async fn test_run_appends_four_nodes_in_order() {
        let page = Document::with_container(DEFAULT_CONTAINER_ID);
        page.append_children(
            DEFAULT_CONTAINER_ID,
            vec![DisplayNode::Paragraph("existing".to_string())],
        )
        .unwrap();
        let loader = loader(StaticSource::new(metadata()), page);

        let report = loader.run().await.unwrap();

        assert_eq!(report.nodes_appended, 4);
        assert_eq!(report.published, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        let children = loader.page().children(DEFAULT_CONTAINER_ID).unwrap();
        assert_eq!(
            children,
            vec![
                DisplayNode::Paragraph("existing".to_string()),
                DisplayNode::Paragraph("Answer".to_string()),
                DisplayNode::Image {
                    src: "https://imgs.example.com/comics/answer.png".to_string(),
                    alt: "The answer".to_string(),
                },
                DisplayNode::Paragraph("1/10/2024".to_string()),
                DisplayNode::Paragraph("2 days ago".to_string()),
            ]
        );
        assert_eq!(loader.source.calls(), vec!["select", "lookup:42"]);
    }

    #[tokio::test]
    async fn test_missing_container_fails_after_both_requests() {
        let loader = loader(StaticSource::new(metadata()), Document::with_container("elsewhere"));

        let err = loader.run().await.unwrap_err();

        assert_eq!(err.category(), ErrorCategory::MissingContainer);
        assert_eq!(loader.source.calls().len(), 2);
        assert_eq!(loader.page().children("elsewhere").unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_failed_selection_skips_lookup() {
        let sink = Arc::new(RecordingSink::default());
        let loader = loader(
            StaticSource::failing_selection(metadata()),
            Document::with_container(DEFAULT_CONTAINER_ID),
        )
        .with_diagnostics(sink.clone());

        assert!(loader.display_comic().await.is_none());

        assert_eq!(loader.source.calls(), vec!["select"]);
        assert_eq!(sink.entries().len(), 1);
        assert!(loader.page().children(DEFAULT_CONTAINER_ID).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_date_appends_nothing() {
        let sink = Arc::new(RecordingSink::default());
        let mut bad = metadata();
        bad.month = 13;
        let loader = loader(StaticSource::new(bad), Document::with_container(DEFAULT_CONTAINER_ID))
            .with_diagnostics(sink.clone());

        assert!(loader.display_comic().await.is_none());

        assert!(loader.page().children(DEFAULT_CONTAINER_ID).unwrap().is_empty());
        assert_eq!(sink.entries().len(), 1);
        assert_eq!(sink.entries()[0].category, ErrorCategory::Decode);
    }

    #[tokio::test]
    async fn test_repeated_runs_accumulate() {
        let loader = loader(
            StaticSource::new(metadata()),
            Document::with_container(DEFAULT_CONTAINER_ID),
        );

        loader.display_comic().await.unwrap();
        loader.display_comic().await.unwrap();

        assert_eq!(loader.page().children(DEFAULT_CONTAINER_ID).unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_exclusive_guard_releases_after_run() {
        let loader = loader(
            StaticSource::new(metadata()),
            Document::with_container(DEFAULT_CONTAINER_ID),
        );

        loader.run_exclusive().await.unwrap();
        loader.run_exclusive().await.unwrap();

        assert_eq!(loader.page().children(DEFAULT_CONTAINER_ID).unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_exclusive_guard_rejects_while_held() {
        let loader = loader(
            StaticSource::new(metadata()),
            Document::with_container(DEFAULT_CONTAINER_ID),
        );
        let _held = InFlightGuard::acquire(&loader.in_flight).unwrap();

        let err = loader.run_exclusive().await.unwrap_err();

        assert!(matches!(err, ComicError::AlreadyRunning));
        assert!(loader.source.calls().is_empty());
    }
}
