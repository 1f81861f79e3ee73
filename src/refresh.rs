use anyhow::Result;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::db::models::{DataSource, Match};
use crate::db::Database;
use crate::football::MatchProvider;

/// Outcome of a freshness check for one date.
#[derive(Debug, Clone)]
pub struct FreshnessResult {
    pub matches: Vec<Match>,
    /// True when the rows come from the pre-existing cache rather than a
    /// fetch performed by this call.
    pub from_cache: bool,
    /// True when a fetch was due but failed and we fell back to stored rows.
    pub stale: bool,
}

/// Decides between serving cached match rows and re-fetching from the
/// external football source.
///
/// Provider failures never propagate out of `ensure_fresh`: the user-facing
/// contract is "answer with whatever is known", so a failed fetch degrades to
/// the (possibly empty) cached rows marked stale.
#[derive(Clone)]
pub struct RefreshCoordinator {
    db: Database,
    provider: Arc<dyn MatchProvider>,
}

impl RefreshCoordinator {
    pub fn new(db: Database, provider: Arc<dyn MatchProvider>) -> Self {
        RefreshCoordinator { db, provider }
    }

    pub fn source(&self) -> DataSource {
        if self.provider.is_live() {
            DataSource::Live
        } else {
            DataSource::Demo
        }
    }

    /// Serve the match rows for `date`, re-fetching first if the cache is
    /// absent or older than `max_age`.
    pub async fn ensure_fresh(&self, date: NaiveDate, max_age: Duration) -> Result<FreshnessResult> {
        let max_age = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);
        let fresh_enough = self
            .db
            .cache_state(date)?
            .map(|s| Utc::now() - s.last_refreshed < max_age)
            .unwrap_or(false);

        if fresh_enough {
            return Ok(FreshnessResult {
                matches: self.db.matches_for_date(date)?,
                from_cache: true,
                stale: false,
            });
        }

        match self.provider.fetch_matches(date).await {
            Ok(matches) => {
                self.db.replace_matches(date, &matches, self.source())?;
                info!(
                    "Refreshed {} matches for {} from '{}'",
                    matches.len(),
                    date,
                    self.provider.name()
                );
                Ok(FreshnessResult {
                    matches,
                    from_cache: false,
                    stale: false,
                })
            }
            Err(e) => {
                warn!(
                    "Fetch from '{}' failed for {}, serving cached rows: {}",
                    self.provider.name(),
                    date,
                    e
                );
                Ok(FreshnessResult {
                    matches: self.db.matches_for_date(date)?,
                    from_cache: true,
                    stale: true,
                })
            }
        }
    }

    /// Manual refresh (`update` command / `--fetch`): always fetches,
    /// resetting the staleness clock on success. Unlike `ensure_fresh` the
    /// error is surfaced so the caller can report a failed manual update;
    /// the store is untouched in that case.
    pub async fn force_refresh(&self, date: NaiveDate) -> Result<usize> {
        let matches = self.provider.fetch_matches(date).await?;
        self.db.replace_matches(date, &matches, self.source())?;
        info!(
            "Manual refresh stored {} matches for {} from '{}'",
            matches.len(),
            date,
            self.provider.name()
        );
        Ok(matches.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Goal, MatchStatus};
    use crate::football::FetchError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeProvider {
        matches: Vec<Match>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn ok(matches: Vec<Match>) -> Self {
            FakeProvider {
                matches,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            FakeProvider {
                matches: vec![],
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MatchProvider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        async fn fetch_matches(&self, _date: NaiveDate) -> Result<Vec<Match>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(FetchError::Schema("scripted failure".into()))
            } else {
                Ok(self.matches.clone())
            }
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn finished_match(fixture_id: i64) -> Match {
        Match {
            fixture_id,
            date: date(),
            league: "Premier League".into(),
            home_team: "Team A".into(),
            away_team: "Team B".into(),
            home_score: Some(2),
            away_score: Some(1),
            venue: Some("Stadium".into()),
            status: MatchStatus::Finished,
            goals: vec![Goal {
                minute: 10,
                player: "Player One".into(),
                team: "Team A".into(),
            }],
        }
    }

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn test_refresh_twice_within_window_fetches_once() {
        let db = Database::open(":memory:").unwrap();
        let provider = Arc::new(FakeProvider::ok(vec![finished_match(1)]));
        let coord = RefreshCoordinator::new(db, provider.clone());

        let first = coord.ensure_fresh(date(), HOUR).await.unwrap();
        assert!(!first.from_cache);
        assert_eq!(first.matches.len(), 1);

        let second = coord.ensure_fresh(date(), HOUR).await.unwrap();
        assert!(second.from_cache);
        assert!(!second.stale);
        assert_eq!(second.matches.len(), 1);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_preserves_prior_rows() {
        let db = Database::open(":memory:").unwrap();
        db.replace_matches(date(), &[finished_match(1)], DataSource::Live)
            .unwrap();
        // Backdate so a re-fetch is due
        db.set_last_refreshed(date(), Utc::now() - chrono::Duration::hours(24), DataSource::Live)
            .unwrap();

        let provider = Arc::new(FakeProvider::failing());
        let coord = RefreshCoordinator::new(db.clone(), provider.clone());

        let result = coord.ensure_fresh(date(), HOUR).await.unwrap();
        assert!(result.from_cache);
        assert!(result.stale);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].fixture_id, 1);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_fetch_entirely() {
        let db = Database::open(":memory:").unwrap();
        db.replace_matches(date(), &[finished_match(1)], DataSource::Live)
            .unwrap();
        // 30 minutes old against a 60 minute threshold
        db.set_last_refreshed(
            date(),
            Utc::now() - chrono::Duration::minutes(30),
            DataSource::Live,
        )
        .unwrap();

        let provider = Arc::new(FakeProvider::ok(vec![finished_match(99)]));
        let coord = RefreshCoordinator::new(db, provider.clone());

        let result = coord.ensure_fresh(date(), HOUR).await.unwrap();
        assert!(result.from_cache);
        assert_eq!(result.matches[0].fixture_id, 1);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_with_empty_store_returns_empty_stale() {
        let db = Database::open(":memory:").unwrap();
        let provider = Arc::new(FakeProvider::failing());
        let coord = RefreshCoordinator::new(db, provider);

        let result = coord.ensure_fresh(date(), HOUR).await.unwrap();
        assert!(result.matches.is_empty());
        assert!(result.stale);
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_window_and_resets_clock() {
        let db = Database::open(":memory:").unwrap();
        db.replace_matches(date(), &[finished_match(1)], DataSource::Live)
            .unwrap();

        let provider = Arc::new(FakeProvider::ok(vec![finished_match(2), finished_match(3)]));
        let coord = RefreshCoordinator::new(db.clone(), provider.clone());

        // Cache is brand new, but a manual refresh must still fetch
        let count = coord.force_refresh(date()).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(provider.call_count(), 1);

        // And the stamp was reset, so ensure_fresh now serves from cache
        let result = coord.ensure_fresh(date(), HOUR).await.unwrap();
        assert!(result.from_cache);
        assert_eq!(result.matches.len(), 2);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_force_refresh_failure_leaves_store_untouched() {
        let db = Database::open(":memory:").unwrap();
        db.replace_matches(date(), &[finished_match(1)], DataSource::Live)
            .unwrap();

        let coord = RefreshCoordinator::new(db.clone(), Arc::new(FakeProvider::failing()));
        assert!(coord.force_refresh(date()).await.is_err());
        assert_eq!(db.match_count(date()).unwrap(), 1);
    }
}
