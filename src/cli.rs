use anyhow::Result;
use chrono::NaiveDate;
use std::io::Write as _;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::answer::AnswerService;
use crate::context::format_match;
use crate::db::Database;
use crate::refresh::RefreshCoordinator;

/// Interactive shell: commands plus free-text questions.
pub struct CliShell {
    db: Database,
    coordinator: RefreshCoordinator,
    answers: AnswerService,
    date: NaiveDate,
    max_age: Duration,
}

impl CliShell {
    pub fn new(
        db: Database,
        coordinator: RefreshCoordinator,
        answers: AnswerService,
        date: NaiveDate,
        max_age: Duration,
    ) -> Self {
        CliShell {
            db,
            coordinator,
            answers,
            date,
            max_age,
        }
    }

    pub async fn run(&self) -> Result<()> {
        println!("Matchday Q&A — ask me about football results for {}", self.date);
        println!("Type 'help' for commands, 'exit' to quit.");

        // Make sure we have something to answer from before the first prompt
        let result = self.coordinator.ensure_fresh(self.date, self.max_age).await?;
        if result.stale {
            println!(
                "Warning: could not reach the football API; using {} cached matches.",
                result.matches.len()
            );
        } else if result.from_cache {
            println!("Using {} cached matches.", result.matches.len());
        } else {
            println!("Fetched {} matches.", result.matches.len());
        }

        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        loop {
            print!("\n> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break; // EOF
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            match input.to_lowercase().as_str() {
                "exit" | "quit" | "q" => break,
                "help" => self.show_help(),
                "update" | "refresh" | "fetch" => self.update().await,
                "info" => self.show_info()?,
                "leagues" => self.show_leagues()?,
                "matches" => self.show_matches()?,
                _ => self.handle_question(input).await?,
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn handle_question(&self, question: &str) -> Result<()> {
        let result = self.coordinator.ensure_fresh(self.date, self.max_age).await?;
        if result.stale {
            println!("(football API unreachable; answering from the cache)");
        }
        let answer = self.answers.ask(question, &result.matches).await;
        println!("{}", answer);
        Ok(())
    }

    /// Manual refresh always bypasses the staleness window.
    async fn update(&self) {
        println!("Fetching match data for {}...", self.date);
        match self.coordinator.force_refresh(self.date).await {
            Ok(count) => println!("Stored {} matches.", count),
            Err(e) => println!("Refresh failed, cache unchanged: {}", e),
        }
    }

    fn show_info(&self) -> Result<()> {
        println!("Date:    {}", self.date);
        println!("Mode:    {}", self.coordinator.source().as_str());
        println!("Matches: {}", self.db.match_count(self.date)?);
        match self.db.cache_state(self.date)? {
            Some(state) => println!(
                "Updated: {} ({})",
                state.last_refreshed.format("%Y-%m-%d %H:%M:%S UTC"),
                state.source.as_str()
            ),
            None => println!("Updated: never"),
        }
        Ok(())
    }

    fn show_leagues(&self) -> Result<()> {
        let leagues = self.db.leagues_for_date(self.date)?;
        if leagues.is_empty() {
            println!("No leagues cached for {}.", self.date);
            return Ok(());
        }
        for league in leagues {
            println!("{:>3}  {}", league.match_count, league.name);
        }
        Ok(())
    }

    fn show_matches(&self) -> Result<()> {
        let matches = self.db.matches_for_date(self.date)?;
        if matches.is_empty() {
            println!("No matches cached for {}.", self.date);
            return Ok(());
        }
        for m in &matches {
            println!("{}", format_match(m));
        }
        Ok(())
    }

    fn show_help(&self) {
        println!("Commands:");
        println!("  help             Show this help");
        println!("  info             Cache status and data source");
        println!("  update           Re-fetch match data now (bypasses staleness check)");
        println!("  leagues          Leagues with cached matches");
        println!("  matches          List cached matches");
        println!("  exit | quit | q  Leave the shell");
        println!("Anything else is treated as a question about the matches.");
    }
}
