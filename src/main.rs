use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod answer;
mod cli;
mod config;
mod context;
mod db;
mod football;
mod llm;
mod refresh;
mod web;

use answer::AnswerService;
use cli::CliShell;
use config::Config;
use db::Database;
use football::{ApiSports, DemoFixtures, MatchProvider};
use llm::OpenAiChat;
use refresh::RefreshCoordinator;
use web::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // Initialise tracing / logging
    let default_filter = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    config.validate()?;

    // Open database
    let db = Database::open(&config.database_path)?;
    info!("Database opened: {}", config.database_path);

    // Build the match provider
    let provider: Arc<dyn MatchProvider> = if config.demo {
        info!("🟡 DEMO mode – serving embedded fixtures, no football API calls");
        Arc::new(DemoFixtures)
    } else {
        info!("🟢 LIVE mode – fetching fixtures from {}", config.football_api_url);
        Arc::new(ApiSports::new(
            config.football_api_key.as_deref().unwrap_or_default(),
            Some(&config.football_api_url),
        )?)
    };

    // Build the completion client
    let completion = Arc::new(OpenAiChat::new(
        &config.openai_api_url,
        config.openai_api_key.as_deref().unwrap_or_default(),
        &config.openai_model,
    )?);

    let coordinator = RefreshCoordinator::new(db.clone(), provider);
    let answers = AnswerService::new(completion, config.max_context_matches);
    let date = config.reference_date();

    // One-shot manual refresh before starting either interface
    if config.fetch {
        match coordinator.force_refresh(date).await {
            Ok(count) => println!("Fetched {} matches for {}.", count, date),
            Err(e) => eprintln!("Initial fetch failed, cache unchanged: {}", e),
        }
    }

    if config.web {
        let state = AppState {
            db,
            coordinator,
            answers,
            max_age: config.max_age(),
            date_override: config.date,
        };
        let app = web::router(state);
        let addr: SocketAddr = config.listen_addr.parse()?;
        info!("Web chat listening on http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;
    } else {
        let shell = CliShell::new(db, coordinator, answers, date, config.max_age());
        shell.run().await?;
    }

    Ok(())
}
