#![deny(unsafe_code)]

//! CourseMind CLI — ask questions about course materials.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coursemind_config::AppConfig;
use coursemind_core::tools::Source;
use coursemind_core::{CourseAssistant, MemoryCatalog, QueryAnswer};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CourseMind — grounded answers about your course materials.
#[derive(Parser)]
#[command(name = "coursemind", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "coursemind.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question.
    Ask {
        question: String,

        /// Course catalog (JSON).
        #[arg(long)]
        catalog: PathBuf,

        /// Continue an existing session.
        #[arg(long)]
        session: Option<String>,

        /// Answer without the course tools.
        #[arg(long)]
        no_tools: bool,

        /// Print the answer, sources and session id as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Interactive question loop on stdin, in one session.
    Chat {
        /// Course catalog (JSON).
        #[arg(long)]
        catalog: PathBuf,
    },

    /// Show the courses in a catalog.
    Courses {
        /// Course catalog (JSON).
        #[arg(long)]
        catalog: PathBuf,
    },

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let found = cli.config.exists();
    let config = load_config(&cli.config).await?;

    let filter = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();
    if !found {
        info!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    match cli.command {
        Commands::Ask {
            question,
            catalog,
            session,
            no_tools,
            json,
        } => {
            let assistant = build_assistant(&config, &catalog).await?.with_tools(!no_tools);
            cmd_ask(&assistant, &question, session.as_deref(), json).await?
        }
        Commands::Chat { catalog } => {
            let assistant = build_assistant(&config, &catalog).await?;
            let stdin = BufReader::new(tokio::io::stdin());
            chat_loop(&assistant, stdin, &mut std::io::stdout()).await?
        }
        Commands::Courses { catalog } => cmd_courses(&catalog).await?,
        Commands::Config { show } => cmd_config(&cli.config, &config, show)?,
    }

    Ok(())
}

async fn build_assistant(config: &AppConfig, catalog_path: &Path) -> Result<CourseAssistant> {
    let catalog = load_catalog(catalog_path).await?;
    let provider = coursemind_core::llm::create_provider(&config.llm)
        .context("failed to set up model provider")?;
    Ok(CourseAssistant::from_config(
        Arc::from(provider),
        Arc::new(catalog),
        config,
    ))
}

async fn cmd_ask(
    assistant: &CourseAssistant,
    question: &str,
    session: Option<&str>,
    json: bool,
) -> Result<()> {
    let answer = assistant.query(question, session).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        print!("{}", render_answer(&answer));
        println!("(session: {})", answer.session_id);
    }
    Ok(())
}

/// Answer each input line in one session until EOF or `exit`.
///
/// `/clear` forgets the session history.
async fn chat_loop<R, W>(assistant: &CourseAssistant, input: R, output: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let session = assistant.sessions().create_session();
    let mut lines = input.lines();
    write!(output, "> ")?;
    output.flush()?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => {}
            "exit" | "quit" => break,
            "/clear" => {
                assistant.sessions().clear(&session);
                writeln!(output, "History cleared.")?;
            }
            question => match assistant.query(question, Some(&session)).await {
                Ok(answer) => write!(output, "{}", render_answer(&answer))?,
                Err(err) => writeln!(output, "error: {err}")?,
            },
        }
        write!(output, "> ")?;
        output.flush()?;
    }
    writeln!(output)?;
    Ok(())
}

async fn cmd_courses(catalog_path: &Path) -> Result<()> {
    let catalog = load_catalog(catalog_path).await?;
    let titles: Vec<_> = catalog.courses().iter().map(|c| c.title.as_str()).collect();
    println!("{} course(s)", titles.len());
    for title in titles {
        println!("  {title}");
    }
    Ok(())
}

fn cmd_config(config_path: &Path, config: &AppConfig, show: bool) -> Result<()> {
    if show {
        let toml_str = toml::to_string_pretty(&redacted(config))
            .map_err(|e| anyhow::anyhow!("TOML error: {e}"))?;
        println!("{toml_str}");
    } else {
        println!("Configuration at '{}' is valid.", config_path.display());
    }
    Ok(())
}

fn redacted(config: &AppConfig) -> AppConfig {
    let mut config = config.clone();
    if !config.llm.api_key.is_empty() {
        config.llm.api_key = "<redacted>".to_string();
    }
    config
}

fn render_answer(answer: &QueryAnswer) -> String {
    let mut out = format!("{}\n", answer.answer);
    if !answer.sources.is_empty() {
        out.push_str("\nSources:\n");
        for source in &answer.sources {
            out.push_str(&format!("  - {}\n", render_source(source)));
        }
    }
    out
}

fn render_source(source: &Source) -> String {
    match &source.link {
        Some(link) => format!("{} <{link}>", source.title),
        None => source.title.clone(),
    }
}

async fn load_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        AppConfig::load(path)
            .await
            .with_context(|| format!("failed to load config from '{}'", path.display()))
    } else {
        Ok(AppConfig::default())
    }
}

async fn load_catalog(path: &Path) -> Result<MemoryCatalog> {
    MemoryCatalog::load(path)
        .await
        .with_context(|| format!("failed to load catalog from '{}'", path.display()))
}
