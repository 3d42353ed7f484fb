use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod backend;
mod dataset;
mod error;
mod executor;
mod intent;
mod models;
mod report;
mod scope;
mod session;
mod timewindow;

use backend::{KeywordBackend, OpenAiBackend, TextUnderstanding};
use dataset::{DatasetStore, StaticDataset};
use intent::IntentExtractor;
use models::Role;
use session::Session;

const EXAMPLE_QUESTIONS: [&str; 3] = [
    "Which students haven't submitted their homework yet?",
    "Show me performance data for Grade 8 from last week",
    "List all upcoming quizzes scheduled for next week",
];

#[derive(Parser)]
#[command(name = "admin-panel")]
#[command(
    about = "Ask plain-English questions about student records within an admin scope",
    long_about = None
)]
struct Cli {
    /// Text-understanding backend
    #[arg(long, value_enum, env = "PANEL_BACKEND", default_value_t = BackendKind::Keyword)]
    backend: BackendKind,

    #[arg(long, env = "LLM_BASE_URL", default_value = "https://api.openai.com/v1")]
    llm_base_url: String,

    #[arg(long, env = "LLM_MODEL", default_value = "gpt-4o-mini")]
    llm_model: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value_t = intent::DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// CSV file to load instead of the built-in roster
    #[arg(long, env = "PANEL_DATA")]
    data: Option<PathBuf>,

    /// Resolve relative dates against this day instead of today (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,

    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendKind {
    Openai,
    Keyword,
}

/// With no option set the session runs unrestricted.
#[derive(Args)]
struct RoleArgs {
    /// Named role preset (see `roles`)
    #[arg(long, conflicts_with_all = ["grade", "class", "region"])]
    role: Option<String>,
    #[arg(long)]
    grade: Option<String>,
    #[arg(long)]
    class: Option<String>,
    #[arg(long)]
    region: Option<String>,
}

impl RoleArgs {
    fn resolve(&self) -> anyhow::Result<Role> {
        if let Some(name) = &self.role {
            return Ok(scope::preset(name)?);
        }

        let role = Role {
            name: "custom".to_string(),
            grade: self.grade.clone(),
            class: self.class.clone(),
            region: self.region.clone(),
        };

        if role.is_unrestricted() {
            return Ok(Role {
                name: "unrestricted".to_string(),
                ..role
            });
        }
        Ok(role)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question
    Ask {
        #[command(flatten)]
        role: RoleArgs,
        question: String,
    },
    /// Start an interactive session
    Session {
        #[command(flatten)]
        role: RoleArgs,
    },
    /// Print the full dataset
    Preview,
    /// List role presets
    Roles,
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("admin_panel={log_level},warn").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_dataset(path: Option<&PathBuf>) -> anyhow::Result<StaticDataset> {
    match path {
        Some(path) => StaticDataset::from_csv_path(path)
            .with_context(|| format!("failed to load dataset from {}", path.display())),
        None => Ok(StaticDataset::seed()),
    }
}

fn build_extractor(cli: &Cli) -> anyhow::Result<IntentExtractor> {
    let backend: Arc<dyn TextUnderstanding> = match cli.backend {
        BackendKind::Keyword => Arc::new(KeywordBackend::new()),
        BackendKind::Openai => {
            let api_key = cli
                .api_key
                .clone()
                .context("OPENAI_API_KEY must be set to use the openai backend")?;
            Arc::new(
                OpenAiBackend::new(
                    &cli.llm_base_url,
                    &cli.llm_model,
                    Some(api_key),
                    cli.timeout_secs,
                )
                .context("failed to build the openai backend")?,
            )
        }
    };

    Ok(IntentExtractor::new(backend).with_timeout(Duration::from_secs(cli.timeout_secs)))
}

async fn run_session(session: &mut Session<StaticDataset>, today: NaiveDate) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Ask questions about student data in plain English.");
    println!("Example questions:");
    for example in EXAMPLE_QUESTIONS.iter() {
        println!("- {example}");
    }
    println!("Commands: :log, :preview, :help, :quit");

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            ":quit" | ":q" => break,
            ":log" => print!("{}", report::render_log(session.log())),
            ":preview" => print!("{}", report::render_table(session.preview())),
            ":help" => println!("Type a question, or one of :log, :preview, :quit"),
            question => match session.ask(question, today).await {
                Ok(result) => print!("{}", report::render_result(&result, session.role())),
                Err(err) => println!("{err}"),
            },
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let today = cli.today.unwrap_or_else(|| Utc::now().date_naive());
    let dataset = load_dataset(cli.data.as_ref())?;

    match &cli.command {
        Commands::Preview => {
            print!("{}", report::render_table(dataset.all()));
        }
        Commands::Roles => {
            print!("{}", report::render_roles(&scope::presets()));
        }
        Commands::Ask { role, question } => {
            let extractor = build_extractor(&cli)?;
            let mut session = Session::new(dataset, extractor, role.resolve()?);
            match session.ask(question, today).await {
                Ok(result) => print!("{}", report::render_result(&result, session.role())),
                Err(err) => println!("{err}"),
            }
        }
        Commands::Session { role } => {
            let extractor = build_extractor(&cli)?;
            let mut session = Session::new(dataset, extractor, role.resolve()?);
            run_session(&mut session, today).await?;
        }
    }

    Ok(())
}
