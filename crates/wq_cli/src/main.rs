use clap::Parser;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use wq_core::{
    Error, ExcludedSectionPolicy, ExtractorConfig, QuizModel, QuizStorage, Result, Scraper, SynthesisConfig,
};
use wq_inference::{create_model, ModelBackend, ModelConfig, QuizSynthesizer};
use wq_scraper::{QuizManager, WikipediaScraper};
use wq_storage::StorageKind;
use wq_web::AppState;

#[derive(Debug, Clone, Copy, PartialEq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                match c {
                    's' => total_seconds += num,
                    'm' => total_seconds += num * 60,
                    'h' => total_seconds += num * 3600,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                }
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // a trailing bare number counts as seconds
        if !current_number.is_empty() {
            match current_number.parse::<u64>() {
                Ok(num) => {
                    total_seconds += num;
                    has_unit = true;
                }
                Err(_) => return Err("Invalid number in duration".to_string()),
            }
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Turn Wikipedia articles into multiple-choice quizzes", long_about = None)]
pub struct Cli {
    /// Storage backend: memory or sqlite
    #[arg(long, env = "STORAGE_BACKEND", default_value = "sqlite")]
    storage: String,
    /// SQLite database location, e.g. sqlite:///quizzes.db or sqlite:////data/quizzes.db
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    #[arg(long, env = "MODEL_BACKEND", default_value = "gemini", help = "Model backend. Available: gemini (default), openai, deepseek, ollama")]
    model: String,
    #[arg(long, env = "GEMINI_MODEL")]
    model_name: Option<String>,
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "MODEL_URL")]
    model_url: Option<String>,
    /// Characters of article text sent to the model
    #[arg(long, env = "ARTICLE_CHARS_LIMIT", default_value_t = 18_000)]
    max_chars: usize,
    #[arg(long, default_value_t = 3)]
    retries: u32,
    /// Delay between generation attempts (e.g. 2s, 1m30s)
    #[arg(long, default_value = "2s")]
    retry_delay: HumanDuration,
    #[arg(long, default_value = "20s")]
    fetch_timeout: HumanDuration,
    #[arg(long, env = "SCRAPER_USER_AGENT")]
    user_agent: Option<String>,
    /// Keep paragraphs under "References" and "See also" in the preceding section
    #[arg(long)]
    merge_excluded_sections: bool,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
        bind: String,
        /// Comma separated list of allowed origins, or * for any
        #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',', default_value = "*")]
        cors_origins: Vec<String>,
    },
    /// Print the extracted article as JSON
    Extract { url: String },
    /// Generate (or fetch the cached) quiz for an article
    Generate {
        url: String,
        #[arg(long)]
        force: bool,
    },
    /// List generated quizzes, newest first
    History,
    /// Print a stored quiz
    Show { id: i64 },
}

impl Cli {
    fn extractor_config(&self) -> ExtractorConfig {
        let defaults = ExtractorConfig::default();
        ExtractorConfig {
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            fetch_timeout: self.fetch_timeout.0,
            excluded_policy: if self.merge_excluded_sections {
                ExcludedSectionPolicy::MergeIntoPrevious
            } else {
                ExcludedSectionPolicy::Discard
            },
            ..defaults
        }
    }

    fn synthesis_config(&self) -> SynthesisConfig {
        SynthesisConfig {
            max_chars: self.max_chars,
            retries: self.retries,
            retry_delay: self.retry_delay.0,
            ..SynthesisConfig::default()
        }
    }

    fn model_config(&self) -> Result<ModelConfig> {
        Ok(ModelConfig {
            backend: self.model.parse::<ModelBackend>()?,
            model_name: self.model_name.clone(),
            api_key: self.api_key.clone(),
            base_url: self.model_url.clone(),
        })
    }
}

/// File path of a SQLite database URL. `sqlite:///quiz.db` is relative and
/// `sqlite:////data/quiz.db` absolute; `sqlite:path` and bare paths are taken
/// as they are. Query parameters are ignored.
fn sqlite_path(database_url: &str) -> Result<String> {
    let path = if let Some(rest) = database_url.strip_prefix("sqlite://") {
        rest.strip_prefix('/').ok_or_else(|| {
            Error::Storage("SQLite URLs must look like sqlite:///<path>".to_string())
        })?
    } else if let Some(rest) = database_url.strip_prefix("sqlite:") {
        rest
    } else if let Some((scheme, _)) = database_url.split_once("://") {
        return Err(Error::Storage(format!(
            "Unsupported database scheme {}: only sqlite is available",
            scheme
        )));
    } else {
        database_url
    };

    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() {
        return Err(Error::Storage("Database URL has no file path".to_string()));
    }
    Ok(path.to_string())
}

async fn build_storage(cli: &Cli) -> Result<Arc<dyn QuizStorage>> {
    let kind = cli.storage.parse::<StorageKind>()?;
    let path = match (kind, cli.database_url.as_deref()) {
        (StorageKind::SQLite, Some(url)) => Some(sqlite_path(url)?),
        _ => None,
    };
    let storage = wq_storage::create_storage(kind, path.as_deref()).await?;
    info!("🏦 Storage initialized successfully (using {})", kind);
    Ok(storage)
}

async fn build_manager(cli: &Cli) -> Result<QuizManager> {
    let storage = build_storage(cli).await?;

    let model = create_model(&cli.model_config()?)?;
    info!("🧠 Quiz model initialized successfully (using {})", model.name());

    let scraper = WikipediaScraper::new(cli.extractor_config())?;
    let synthesizer = QuizSynthesizer::new(model, cli.synthesis_config());
    Ok(QuizManager::new(storage, Arc::new(scraper), Arc::new(synthesizer)))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Serve { bind, cors_origins } => {
            let manager = build_manager(&cli).await?;
            let app = wq_web::create_app(AppState { manager: Arc::new(manager) }, cors_origins)?;
            wq_web::serve(app, bind).await?;
        }
        Commands::Extract { url } => {
            let scraper = WikipediaScraper::new(cli.extractor_config())?;
            info!("🦗 Extracting {} from {}", url, scraper.source());
            let extraction = scraper.extract(url).await?;
            print_json(&extraction.document)?;
        }
        Commands::Generate { url, force } => {
            let manager = build_manager(&cli).await?;
            let quiz = manager.generate(url, *force).await?;
            print_json(&quiz)?;
        }
        Commands::History => {
            let storage = build_storage(&cli).await?;
            for entry in storage.history().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    entry.id,
                    entry.date_generated.format("%Y-%m-%d %H:%M:%S"),
                    entry.title,
                    entry.url
                );
            }
        }
        Commands::Show { id } => {
            let storage = build_storage(&cli).await?;
            let record = storage.get(*id).await?.ok_or(Error::NotFound(*id))?;
            print_json(&record.quiz_with_id())?;
        }
    }

    Ok(())
}
