use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One fixture on a given date, as cached in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Fixture ID assigned by the football data provider
    pub fixture_id: i64,
    pub date: NaiveDate,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    /// Absent until the match has kicked off
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub venue: Option<String>,
    pub status: MatchStatus,
    /// Goal events in match-minute order
    pub goals: Vec<Goal>,
}

/// A goal event owned by exactly one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Match minute with extra time folded in (90+3 → 93)
    pub minute: u32,
    pub player: String,
    /// Must equal one of the match's two team names
    pub team: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    InProgress,
    Finished,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::InProgress => "in_progress",
            MatchStatus::Finished => "finished",
        }
    }

    /// Human wording for context lines and the CLI.
    pub fn display(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::InProgress => "in progress",
            MatchStatus::Finished => "finished",
        }
    }

    pub fn from_db(s: &str) -> MatchStatus {
        match s {
            "scheduled" => MatchStatus::Scheduled,
            "in_progress" => MatchStatus::InProgress,
            _ => MatchStatus::Finished,
        }
    }
}

/// Where the cached rows for a date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Demo,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Live => "live",
            DataSource::Demo => "demo",
        }
    }

    pub fn from_db(s: &str) -> DataSource {
        if s == "demo" {
            DataSource::Demo
        } else {
            DataSource::Live
        }
    }
}

/// Per-date refresh metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheState {
    pub date: NaiveDate,
    pub last_refreshed: DateTime<Utc>,
    pub source: DataSource,
}
