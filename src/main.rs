use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lingo::core::history::store::{HistoryStore, MemoryStore, RedbStore};
use lingo::core::{languages, HistoryLedger, HttpTranslationBackend, TranslationController};
use lingo::shared::settings::AppSettings;
use lingo::shared::types::TranslationRecord;

#[derive(Parser)]
#[command(name = "lingo")]
#[command(about = "Translate text and keep a local translation history", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate text to a target language
    Translate {
        /// Text to translate
        text: String,
        /// Target language code (defaults to the configured language)
        #[arg(long = "to")]
        target: Option<String>,
    },
    /// Inspect and manage the translation history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// List the supported target languages
    Languages,
    /// Show or change the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Show one page of the history, newest first
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Records per page (defaults to the configured page size)
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Show a single translation so it can be reused
    Show { id: u64 },
    /// Delete a single translation
    Delete { id: u64 },
    /// Delete the entire history
    Clear,
    /// Summary statistics over the history
    Stats,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the active configuration
    Show,
    /// Change configuration values
    Set {
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        api_host: Option<String>,
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        target_lang: Option<String>,
        #[arg(long)]
        page_size: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let settings = AppSettings::load().await.unwrap_or_else(|e| {
        eprintln!("Failed to load settings: {}", e);
        AppSettings::default()
    });

    match cli.command {
        Commands::Translate { text, target } => {
            let target = target.unwrap_or_else(|| settings.preferences.default_target_lang.clone());

            let mut api = settings.api.clone();
            api.api_key = settings.resolved_api_key();

            let ledger = Arc::new(Mutex::new(HistoryLedger::load(open_store())));
            let backend = Arc::new(HttpTranslationBackend::new(api)?);
            let controller = TranslationController::new(backend, ledger);

            let record = controller.translate(&text, &target).await?;
            println!("{}", record.translated_text);
            println!("✅ Saved to history ({})", record.id);
        }

        Commands::History { action } => {
            let mut ledger = HistoryLedger::load(open_store());

            match action {
                HistoryAction::List { page, page_size } => {
                    let page_size = page_size.unwrap_or(settings.preferences.history_page_size);

                    if ledger.is_empty() {
                        println!("No translations yet. Start translating to see your history here!");
                        return Ok(());
                    }

                    let total = ledger.len();
                    let total_pages = ledger.total_pages(page_size);
                    let items = ledger.page(page, page_size);

                    if items.is_empty() {
                        println!("Page {} is out of range (1 to {})", page, total_pages);
                        return Ok(());
                    }

                    println!("Translation History ({})", total);
                    for record in &items {
                        print_record(record);
                    }

                    let start = (page - 1) * page_size + 1;
                    let end = start + items.len() - 1;
                    println!(
                        "Showing {} to {} of {} translations (page {} of {})",
                        start, end, total, page, total_pages
                    );
                }

                HistoryAction::Show { id } => match ledger.find(id) {
                    Some(record) => print_record(&record),
                    None => println!("No translation with id {}", id),
                },

                HistoryAction::Delete { id } => {
                    if ledger.delete(id) {
                        println!("Deleted translation {}", id);
                    } else {
                        println!("No translation with id {}", id);
                    }
                }

                HistoryAction::Clear => {
                    ledger.clear();
                    println!("Translation history cleared");
                }

                HistoryAction::Stats => {
                    println!("Translations: {}", ledger.len());
                    match ledger.most_used_language() {
                        Some((name, count)) => println!("Most used: {} ({})", name, count),
                        None => println!("Most used: n/a"),
                    }
                    println!("Total characters: {}", ledger.total_characters());
                }
            }
        }

        Commands::Languages => {
            for (code, name) in languages::LANGUAGES {
                println!("{}  {}", code, name);
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("Settings file: {}", AppSettings::settings_path()?.display());
                println!("Endpoint: {}", settings.api.endpoint);
                println!("API host: {}", settings.api.api_host);
                let key = if settings.resolved_api_key().trim().is_empty() {
                    "(not set)"
                } else {
                    "(set)"
                };
                println!("API key: {}", key);
                println!(
                    "Default target language: {}",
                    settings.preferences.default_target_lang
                );
                println!("History page size: {}", settings.preferences.history_page_size);
            }

            ConfigAction::Set {
                api_key,
                api_host,
                endpoint,
                target_lang,
                page_size,
            } => {
                let mut settings = settings;

                if let Some(api_key) = api_key {
                    settings.api.api_key = api_key;
                }
                if let Some(api_host) = api_host {
                    settings.api.api_host = api_host;
                }
                if let Some(endpoint) = endpoint {
                    settings.api.endpoint = endpoint;
                }
                if let Some(target_lang) = target_lang {
                    if !languages::is_supported(&target_lang) {
                        eprintln!(
                            "Note: {} is not in the built-in language list; it will be sent to the service as-is",
                            target_lang
                        );
                    }
                    settings.preferences.default_target_lang = target_lang;
                }
                if let Some(page_size) = page_size {
                    settings.preferences.history_page_size = page_size;
                }

                settings.save().await?;
                println!("Settings saved");
            }
        },
    }

    Ok(())
}

/// Open the durable store, falling back to a session-only in-memory store
/// when the database cannot be opened.
fn open_store() -> Arc<dyn HistoryStore> {
    let opened = AppSettings::data_dir().and_then(|dir| RedbStore::open(&dir.join("history.redb")));
    match opened {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Failed to open history database: {}, using in-memory fallback", e);
            Arc::new(MemoryStore::new())
        }
    }
}

fn print_record(record: &TranslationRecord) {
    println!(
        "[{}] {} | {}",
        record.id,
        record.target_language_name,
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  {}", record.input_text);
    println!("  -> {}", record.translated_text);
}
