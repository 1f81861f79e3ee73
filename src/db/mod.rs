use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub mod models;
use models::*;

/// Thread-safe SQLite handle (single connection behind a mutex).
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    // ── Matches ──────────────────────────────────────────────────────────────

    /// Atomically replace every match row for `date` with the given batch and
    /// stamp `cache_state.last_refreshed` to now.
    ///
    /// All-or-nothing: the delete, the inserts and the stamp share one
    /// transaction, so a failure part-way leaves the prior rows intact.
    pub fn replace_matches(
        &self,
        date: NaiveDate,
        matches: &[Match],
        source: DataSource,
    ) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM goals WHERE fixture_id IN (SELECT fixture_id FROM matches WHERE date = ?1)",
            params![date],
        )?;
        tx.execute("DELETE FROM matches WHERE date = ?1", params![date])?;

        for m in matches {
            tx.execute(
                "INSERT INTO matches (
                    fixture_id, date, league, home_team, away_team,
                    home_score, away_score, venue, status
                 ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
                params![
                    m.fixture_id,
                    m.date,
                    m.league,
                    m.home_team,
                    m.away_team,
                    m.home_score,
                    m.away_score,
                    m.venue,
                    m.status.as_str(),
                ],
            )?;
            for g in &m.goals {
                tx.execute(
                    "INSERT INTO goals (fixture_id, minute, player, team) VALUES (?1,?2,?3,?4)",
                    params![m.fixture_id, g.minute, g.player, g.team],
                )?;
            }
        }

        tx.execute(
            "INSERT INTO cache_state (date, last_refreshed, source) VALUES (?1,?2,?3)
             ON CONFLICT(date) DO UPDATE SET
                last_refreshed=excluded.last_refreshed,
                source=excluded.source",
            params![date, Utc::now(), source.as_str()],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// List the cached matches for a date, goals attached, in insertion order.
    pub fn matches_for_date(&self, date: NaiveDate) -> Result<Vec<Match>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT fixture_id, date, league, home_team, away_team,
                    home_score, away_score, venue, status
             FROM matches WHERE date = ?1 ORDER BY rowid",
        )?;
        let mut matches = stmt
            .query_map(params![date], map_match)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut goal_stmt = conn.prepare(
            "SELECT minute, player, team FROM goals WHERE fixture_id = ?1 ORDER BY minute, id",
        )?;
        for m in &mut matches {
            m.goals = goal_stmt
                .query_map(params![m.fixture_id], map_goal)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
        }
        Ok(matches)
    }

    /// Number of cached matches for a date.
    pub fn match_count(&self, date: NaiveDate) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM matches WHERE date = ?1",
            params![date],
            |r| r.get(0),
        )?;
        Ok(count)
    }

    /// League names for a date with their match counts, busiest league first.
    pub fn leagues_for_date(&self, date: NaiveDate) -> Result<Vec<LeagueSummary>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT league, COUNT(*) AS match_count FROM matches
             WHERE date = ?1 GROUP BY league ORDER BY match_count DESC, league",
        )?;
        let leagues = stmt
            .query_map(params![date], |row| {
                Ok(LeagueSummary {
                    name: row.get(0)?,
                    match_count: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(leagues)
    }

    // ── Cache state ──────────────────────────────────────────────────────────

    /// Refresh metadata for a date, if any refresh has ever happened.
    pub fn cache_state(&self, date: NaiveDate) -> Result<Option<CacheState>> {
        let conn = self.conn.lock().unwrap();
        let state = conn
            .query_row(
                "SELECT date, last_refreshed, source FROM cache_state WHERE date = ?1",
                params![date],
                |row| {
                    let source: String = row.get(2)?;
                    Ok(CacheState {
                        date: row.get(0)?,
                        last_refreshed: row.get(1)?,
                        source: DataSource::from_db(&source),
                    })
                },
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                e => Err(e),
            })?;
        Ok(state)
    }

    /// Overwrite the refresh stamp for a date without touching match rows.
    /// `replace_matches` stamps "now" itself; this exists for backdating in
    /// tests and for marking demo data.
    pub fn set_last_refreshed(
        &self,
        date: NaiveDate,
        at: DateTime<Utc>,
        source: DataSource,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO cache_state (date, last_refreshed, source) VALUES (?1,?2,?3)
             ON CONFLICT(date) DO UPDATE SET
                last_refreshed=excluded.last_refreshed,
                source=excluded.source",
            params![date, at, source.as_str()],
        )?;
        Ok(())
    }
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

fn map_match(row: &rusqlite::Row) -> rusqlite::Result<Match> {
    let status: String = row.get(8)?;
    Ok(Match {
        fixture_id: row.get(0)?,
        date: row.get(1)?,
        league: row.get(2)?,
        home_team: row.get(3)?,
        away_team: row.get(4)?,
        home_score: row.get(5)?,
        away_score: row.get(6)?,
        venue: row.get(7)?,
        status: MatchStatus::from_db(&status),
        goals: Vec::new(),
    })
}

fn map_goal(row: &rusqlite::Row) -> rusqlite::Result<Goal> {
    Ok(Goal {
        minute: row.get(0)?,
        player: row.get(1)?,
        team: row.get(2)?,
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS matches (
    fixture_id  INTEGER PRIMARY KEY,
    date        TEXT    NOT NULL,
    league      TEXT    NOT NULL,
    home_team   TEXT    NOT NULL,
    away_team   TEXT    NOT NULL,
    home_score  INTEGER,
    away_score  INTEGER,
    venue       TEXT,
    status      TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS goals (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    fixture_id  INTEGER NOT NULL,
    minute      INTEGER NOT NULL,
    player      TEXT    NOT NULL,
    team        TEXT    NOT NULL,
    FOREIGN KEY (fixture_id) REFERENCES matches(fixture_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS cache_state (
    date           TEXT PRIMARY KEY,
    last_refreshed TEXT NOT NULL,
    source         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_matches_date ON matches(date);
CREATE INDEX IF NOT EXISTS idx_goals_fixture ON goals(fixture_id);
"#;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LeagueSummary {
    pub name: String,
    pub match_count: i64,
}
