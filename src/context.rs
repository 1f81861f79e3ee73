//! Serializes cached match rows into the bounded natural-language context
//! block handed to the completion API alongside the user's question.
//!
//! Pure string building: no I/O, no clock, so identical input always yields
//! a byte-identical block (prompt-cache-friendly and trivially testable).

use crate::db::models::Match;

/// Rendered when the store has nothing for the requested date. Interfaces
/// also use this to detect the no-data case without re-parsing.
pub const NO_MATCHES_CONTEXT: &str = "No match data is available for the requested date.";

/// Format matches into the LLM context block, at most `max_matches` entries.
pub fn build_context(matches: &[Match], max_matches: usize) -> String {
    if matches.is_empty() {
        return NO_MATCHES_CONTEXT.to_string();
    }

    let shown = matches.len().min(max_matches);
    let mut out = String::from("Football match results:\n");

    for m in &matches[..shown] {
        out.push_str(&format_match(m));
        out.push('\n');
        for g in &m.goals {
            out.push_str(&format!("  {}' {} ({})\n", g.minute, g.player, g.team));
        }
    }

    let omitted = matches.len() - shown;
    if omitted > 0 {
        out.push_str(&format!("({} more matches not shown)\n", omitted));
    }

    out
}

/// One-line rendering of a match, shared with the CLI's `matches` command.
pub fn format_match(m: &Match) -> String {
    let score = match (m.home_score, m.away_score) {
        (Some(h), Some(a)) => format!("{} {} - {} {}", m.home_team, h, a, m.away_team),
        _ => format!("{} vs {}", m.home_team, m.away_team),
    };
    match &m.venue {
        Some(venue) => format!("[{}] {} ({}, {})", m.league, score, venue, m.status.display()),
        None => format!("[{}] {} ({})", m.league, score, m.status.display()),
    }
}
