//! Command-line front end for the translation engine.

use std::io::Write as _;
use std::path::{
    Path,
    PathBuf,
};

use anyhow::{
    Context,
    bail,
};
use clap::{
    Parser,
    Subcommand,
};
use hover_translator::config::{
    self,
    Settings,
    SettingsManager,
    SiteMatcher,
};
use hover_translator::dictionary::TranslationDictionary;
use hover_translator::dom::MemoryDom;
use hover_translator::format::{
    clipboard_text,
    format_matches,
};
use hover_translator::highlight::AutoHighlighter;
use hover_translator::matcher::find_all;
use hover_translator::search::{
    PageSearch,
    SearchOutcome,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "hover-translator")]
#[command(about = "Look up and highlight dictionary translations in text", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Settings file (JSON or JSONC, plain or chunked)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    /// Translation file merged over the settings translations
    #[arg(short, long, global = true)]
    dictionary: Option<PathBuf>,

    /// Set log level
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,

    /// Write logs to daily files in this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the tooltip text for TEXT
    Lookup {
        text: String,

        /// Print the click-to-copy text instead
        #[arg(long)]
        copy: bool,
    },

    /// Highlight every known word of a text file, one paragraph per line
    Annotate {
        file: PathBuf,

        /// Only highlight terms related to this search query
        #[arg(long)]
        search: Option<String>,
    },

    /// Tell whether the extension runs on URL
    Site { url: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli.log_level, cli.log_dir.as_deref());

    let settings = load_settings(cli.settings.as_deref(), cli.dictionary.as_deref())?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Command::Lookup { text, copy } => {
            let matches = find_all(&text, &settings.translations);
            if matches.is_empty() {
                bail!("No translation found for '{text}'");
            }
            let line = if copy { clipboard_text(&matches) } else { format_matches(&matches) };
            writeln!(out, "{line}")?;
        }
        Command::Annotate { file, search } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let mut dom = MemoryDom::from_lines(&content);

            if let Some(query) = search {
                match PageSearch::new().search(&mut dom, &settings.translations, &query) {
                    SearchOutcome::QueryTooShort => bail!("Search query must have at least 2 characters"),
                    SearchOutcome::NoResults => tracing::info!(query = %query, "No search results"),
                    SearchOutcome::Found(results) => tracing::info!(query = %query, results = results.len(), "Search results"),
                }
            } else {
                let highlighted = AutoHighlighter::default().highlight_page(&mut dom, &settings.translations);
                tracing::info!(highlighted, "Annotated file");
            }

            writeln!(out, "{}", dom.to_html())?;
        }
        Command::Site { url } => {
            let domain = config::domain_of(&url).with_context(|| format!("No host in '{url}'"))?;
            let active = settings.is_enabled && SiteMatcher::from_settings(&settings)?.is_active(&domain);
            let site = settings.site(&domain);

            writeln!(out, "{domain}: {}", if active { "active" } else { "inactive" })?;
            writeln!(out, "highlightAllWords: {}", site.highlight_all_words)?;
            writeln!(out, "disableCopyOnHover: {}", site.disable_copy_on_hover)?;
        }
    }

    Ok(())
}

/// Installs the tracing subscriber. `RUST_LOG` overrides `level`.
fn init_logging(level: &str, log_dir: Option<&Path>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hover_translator={}", level.to_lowercase())));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "hover-translator.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false).with_writer(writer).init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();
            None
        }
    }
}

fn load_settings(
    path: Option<&Path>,
    dictionary: Option<&Path>,
) -> anyhow::Result<std::sync::Arc<Settings>> {
    let mut settings = match path {
        Some(path) => config::load_from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(dictionary) = dictionary {
        let extra = TranslationDictionary::load_file(dictionary)
            .with_context(|| format!("Failed to load translations from {}", dictionary.display()))?;
        settings.translations.merge(extra);
    }

    let mut manager = SettingsManager::new();
    manager.update(settings)?;
    tracing::debug!(entries = manager.snapshot().translations.leaf_count(), "Settings ready");
    Ok(manager.snapshot())
}
