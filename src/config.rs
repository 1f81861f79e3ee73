use chrono::{NaiveDate, Utc};
use clap::Parser;

/// Football match results Q&A bot
#[derive(Parser, Debug, Clone)]
#[command(name = "matchday-qa", version, about)]
pub struct Config {
    /// Serve the web chat instead of the interactive CLI
    #[arg(long)]
    pub web: bool,

    /// Web listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8000")]
    pub listen_addr: String,

    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH", default_value = "matchday.db")]
    pub database_path: String,

    /// Football data API base URL
    #[arg(
        long,
        env = "FOOTBALL_API_URL",
        default_value = "https://v3.football.api-sports.io"
    )]
    pub football_api_url: String,

    /// Football data API key (required unless running in demo mode)
    #[arg(long, env = "FOOTBALL_API_KEY")]
    pub football_api_key: Option<String>,

    /// Completion API base URL (any OpenAI-compatible endpoint)
    #[arg(long, env = "OPENAI_API_URL", default_value = "https://api.openai.com/v1")]
    pub openai_api_url: String,

    /// Completion API key
    #[arg(long, env = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,

    /// Completion model name
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    pub openai_model: String,

    /// Maximum age of cached match data before a re-fetch (seconds)
    #[arg(long, env = "MAX_AGE_SECS", default_value = "43200")]
    pub max_age_secs: u64,

    /// Maximum number of matches serialized into the LLM context
    #[arg(long, env = "MAX_CONTEXT_MATCHES", default_value = "25")]
    pub max_context_matches: usize,

    /// Date to answer questions about (YYYY-MM-DD, defaults to yesterday UTC)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Use embedded demo fixtures instead of the live football API
    #[arg(long, alias = "test", env = "DEMO_MODE")]
    pub demo: bool,

    /// Fetch match data once at startup, bypassing the staleness check
    #[arg(long)]
    pub fetch: bool,

    /// Verbose debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.demo && self.football_api_key.is_none() {
            anyhow::bail!(
                "FOOTBALL_API_KEY is required for live match data. Use --demo for embedded fixtures."
            );
        }
        if self.openai_api_key.is_none() {
            anyhow::bail!("OPENAI_API_KEY is required to generate answers.");
        }
        if self.max_context_matches == 0 {
            anyhow::bail!("max_context_matches must be at least 1");
        }
        Ok(())
    }

    /// The reference date for questions. Defaulting to "yesterday" happens
    /// here, at the interface layer, so the core stays clock-free.
    pub fn reference_date(&self) -> NaiveDate {
        self.date
            .unwrap_or_else(|| (Utc::now() - chrono::Duration::days(1)).date_naive())
    }

    pub fn max_age(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.max_age_secs)
    }
}
