use clap::Parser;
use comic_loader::adapters::page::DEFAULT_PAGE;
use comic_loader::core::{ConfigProvider, Storage};
use comic_loader::utils::validation::Validate;
use comic_loader::utils::{logger, monitor::RunMonitor};
use comic_loader::{
    CliConfig, ComicError, ComicLoader, Document, FragmentRenderer, HttpComicSource, LocalStorage,
    TomlConfig,
};

struct Prepared {
    source: HttpComicSource,
    page: Document,
    renderer: FragmentRenderer,
}

async fn prepare(config: &dyn ConfigProvider) -> comic_loader::Result<Prepared> {
    let markup = match config.template_path() {
        Some(path) => {
            tracing::debug!("Loading page template from {}", path);
            tokio::fs::read_to_string(path).await?
        }
        None => DEFAULT_PAGE.to_string(),
    };

    Ok(Prepared {
        source: HttpComicSource::from_config(config)?,
        page: Document::from_html(markup)?,
        renderer: FragmentRenderer::new(config.date_format())?,
    })
}

fn load_config(cli: &CliConfig) -> comic_loader::Result<Box<dyn ConfigProvider>> {
    match &cli.config {
        Some(path) => {
            tracing::info!("Using TOML configuration from {}", path);
            let config = TomlConfig::from_file(path)?;
            config.validate()?;
            Ok(Box::new(config))
        }
        None => {
            cli.validate()?;
            Ok(Box::new(cli.clone()))
        }
    }
}

fn exit_with(e: &ComicError) -> ! {
    tracing::error!("❌ Setup failed: {}", e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting comic-loader");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = load_config(&cli).unwrap_or_else(|e| exit_with(&e));
    let prepared = prepare(config.as_ref())
        .await
        .unwrap_or_else(|e| exit_with(&e));

    let mut monitor = RunMonitor::new(cli.monitor);
    if monitor.is_enabled() {
        tracing::info!("🔍 Run monitoring enabled");
    }

    let loader = ComicLoader::new(prepared.source, prepared.page)
        .with_container_id(config.container_id())
        .with_renderer(prepared.renderer);

    let report = loader.display_comic().await;
    monitor.log_stats("Load");

    // The page is written even when the load failed; it is then unchanged.
    let storage = LocalStorage::new(config.output_path().to_string());
    storage
        .write_file(config.output_file(), loader.page().render().as_bytes())
        .await?;
    let output = storage.full_path(config.output_file());
    monitor.log_final_stats();

    match report {
        Some(report) => {
            tracing::info!("📁 Output saved to: {}", output.display());
            println!("✅ {} ({})", report.metadata.title, report.published);
            println!("📁 Output saved to: {}", output.display());
        }
        None => {
            tracing::warn!("Page written without a comic: {}", output.display());
        }
    }

    Ok(())
}
