use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use aqualens::agents::{build_inhouse_agent, Coordinator};
use aqualens::cli::ChatRepl;
use aqualens::config::{default_data_dir, Config};
use aqualens::db::ReflectionStore;
use aqualens::llm::{LLMProviderConfig, LLM};
use aqualens::routes::{create_router, SessionRegistry};
use aqualens::utils::{init_logger, LogTarget};
use aqualens::AppState;

#[derive(Parser)]
#[command(name = "aqualens", version, about = "Water quality research assistant")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Answer a single question and exit
    Ask {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Interactive chat with feedback commands
    Chat,
    /// Ingest the PDF directory into the vector store
    Ingest {
        /// Drop the collection first
        #[arg(long)]
        rebuild: bool,
    },
    /// Print stored reflections, newest first
    Reflections {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    let command = cli.command.unwrap_or(Command::Serve);

    // The chat prompt owns the terminal, so its logs go to a file
    let log_dir = default_data_dir().join("logs");
    let _guard = match command {
        Command::Chat => init_logger(LogTarget::File {
            directory: &log_dir,
            prefix: "aqualens.log",
        }),
        _ => init_logger(LogTarget::Stderr),
    };

    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);

    match command {
        Command::Serve => serve(config).await,
        Command::Ask { query } => {
            let coordinator = Coordinator::from_config(&config).await?;
            let turn = coordinator.run(&query.join(" ")).await;
            println!("{}", turn.answer.text());
            Ok(())
        }
        Command::Chat => {
            let coordinator = Arc::new(Coordinator::from_config(&config).await?);
            let history = default_data_dir().join("chat_history");
            ChatRepl::new(coordinator, Some(history))?.run().await
        }
        Command::Ingest { rebuild } => {
            let llm = LLM::new(LLMProviderConfig::from_config(&config.llm))?;
            let agent = build_inhouse_agent(&config, llm).await?;
            match agent.prepare(rebuild || config.rag.rebuild).await? {
                Some(report) => println!(
                    "Ingested {} pages into {} chunks from {}",
                    report.documents,
                    report.chunks,
                    config.rag.pdf_directory.display()
                ),
                None => println!("Knowledge base already populated; pass --rebuild to re-ingest"),
            }
            Ok(())
        }
        Command::Reflections { limit } => {
            let store = ReflectionStore::open(&config.store.db_path).await?;
            for reflection in store.recent(limit).await? {
                let score = reflection
                    .score
                    .map(|s| format!(" (score {})", s))
                    .unwrap_or_default();
                println!("#{} {}{}\n{}\n", reflection.id, reflection.created_at, score, reflection.reflection);
            }
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let coordinator = Arc::new(Coordinator::from_config(&config).await?);

    // Create shared state
    let state = AppState {
        coordinator,
        sessions: SessionRegistry::with_capacity(config.server.session_capacity),
        config: config.clone(),
    };

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
