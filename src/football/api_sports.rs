use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use tracing::debug;

use super::provider::MatchProvider;
use super::FetchError;
use crate::db::models::{Goal, Match, MatchStatus};

/// Live match provider backed by the api-sports.io v3 football API.
/// Docs: <https://www.api-football.com/documentation-v3>
pub struct ApiSports {
    http: Client,
    api_key: String,
    /// Base URL for overriding in tests
    base_url: String,
}

impl ApiSports {
    pub fn new(api_key: &str, base_url: Option<&str>) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(ApiSports {
            http,
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or("https://v3.football.api-sports.io")
                .to_string(),
        })
    }

    fn status_from_short(s: &str) -> MatchStatus {
        match s {
            "FT" | "AET" | "PEN" => MatchStatus::Finished,
            "NS" | "TBD" | "PST" | "CANC" => MatchStatus::Scheduled,
            // 1H, HT, 2H, ET, BT, P, LIVE, INT and anything unrecognized
            _ => MatchStatus::InProgress,
        }
    }
}

#[async_trait]
impl MatchProvider for ApiSports {
    fn name(&self) -> &str {
        "api-sports"
    }

    async fn fetch_matches(&self, date: NaiveDate) -> Result<Vec<Match>, FetchError> {
        let url = format!("{}/fixtures?date={}", self.base_url, date);
        debug!("Fetching fixtures from {}", url);

        let resp = self
            .http
            .get(&url)
            .header("x-apisports-key", &self.api_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }

        let raw: serde_json::Value = resp.json().await?;
        parse_fixtures(&raw, date)
    }
}

/// Map the provider's loosely-typed payload into typed `Match` records.
///
/// Required fields missing on any fixture fail the whole batch with a
/// `Schema` error: a half-parseable response is treated like an outage so
/// the cache is never overwritten with a partial result.
fn parse_fixtures(raw: &serde_json::Value, date: NaiveDate) -> Result<Vec<Match>, FetchError> {
    let fixtures = raw["response"]
        .as_array()
        .ok_or_else(|| FetchError::Schema("missing 'response' array".into()))?;

    fixtures.iter().map(|fx| parse_fixture(fx, date)).collect()
}

fn parse_fixture(fx: &serde_json::Value, date: NaiveDate) -> Result<Match, FetchError> {
    let fixture_id = fx["fixture"]["id"]
        .as_i64()
        .ok_or_else(|| FetchError::Schema("fixture.id missing or not an integer".into()))?;
    let league = required_str(fx, &["league", "name"])?;
    let home_team = required_str(fx, &["teams", "home", "name"])?;
    let away_team = required_str(fx, &["teams", "away", "name"])?;

    let home_score = fx["goals"]["home"].as_u64().map(|v| v as u32);
    let away_score = fx["goals"]["away"].as_u64().map(|v| v as u32);
    let venue = fx["fixture"]["venue"]["name"].as_str().map(str::to_string);
    let status = fx["fixture"]["status"]["short"]
        .as_str()
        .map(ApiSports::status_from_short)
        .unwrap_or(MatchStatus::InProgress);

    let goals = parse_goal_events(fx, &home_team, &away_team);

    Ok(Match {
        fixture_id,
        date,
        league,
        home_team,
        away_team,
        home_score,
        away_score,
        venue,
        status,
        goals,
    })
}

/// Goal events are optional on the fixtures endpoint; when present, keep only
/// real goals credited to one of the two teams.
fn parse_goal_events(fx: &serde_json::Value, home_team: &str, away_team: &str) -> Vec<Goal> {
    let events = match fx["events"].as_array() {
        Some(a) => a,
        None => return Vec::new(),
    };

    events
        .iter()
        .filter(|ev| ev["type"].as_str() == Some("Goal"))
        .filter(|ev| ev["detail"].as_str() != Some("Missed Penalty"))
        .filter_map(|ev| {
            let minute = ev["time"]["elapsed"].as_u64()? as u32
                + ev["time"]["extra"].as_u64().unwrap_or(0) as u32;
            let player = ev["player"]["name"].as_str().unwrap_or("Unknown").to_string();
            let team = ev["team"]["name"].as_str()?.to_string();

            if team != home_team && team != away_team {
                debug!(
                    "Dropping goal event credited to '{}' (not {} or {})",
                    team, home_team, away_team
                );
                return None;
            }

            Some(Goal {
                minute,
                player,
                team,
            })
        })
        .collect()
}

fn required_str(v: &serde_json::Value, path: &[&str]) -> Result<String, FetchError> {
    let mut cur = v;
    for key in path {
        cur = &cur[*key];
    }
    cur.as_str()
        .map(str::to_string)
        .ok_or_else(|| FetchError::Schema(format!("missing field '{}'", path.join("."))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn sample_payload() -> serde_json::Value {
        serde_json::json!({
            "response": [
                {
                    "fixture": {
                        "id": 1001,
                        "date": "2025-03-14T19:45:00+00:00",
                        "venue": { "name": "Old Trafford" },
                        "status": { "short": "FT", "long": "Match Finished" }
                    },
                    "league": { "name": "Premier League", "country": "England" },
                    "teams": {
                        "home": { "name": "Manchester United" },
                        "away": { "name": "Liverpool" }
                    },
                    "goals": { "home": 2, "away": 1 },
                    "events": [
                        {
                            "time": { "elapsed": 24, "extra": null },
                            "team": { "name": "Manchester United" },
                            "player": { "name": "Bruno Fernandes" },
                            "type": "Goal",
                            "detail": "Normal Goal"
                        },
                        {
                            "time": { "elapsed": 55, "extra": null },
                            "team": { "name": "Liverpool" },
                            "player": { "name": "Mohamed Salah" },
                            "type": "Goal",
                            "detail": "Normal Goal"
                        },
                        {
                            "time": { "elapsed": 60, "extra": null },
                            "team": { "name": "Liverpool" },
                            "player": { "name": "Virgil van Dijk" },
                            "type": "Card",
                            "detail": "Yellow Card"
                        },
                        {
                            "time": { "elapsed": 90, "extra": 3 },
                            "team": { "name": "Manchester United" },
                            "player": { "name": "Marcus Rashford" },
                            "type": "Goal",
                            "detail": "Normal Goal"
                        }
                    ]
                }
            ]
        })
    }

    #[test]
    fn test_parse_finished_fixture() {
        let matches = parse_fixtures(&sample_payload(), date()).unwrap();
        assert_eq!(matches.len(), 1);

        let m = &matches[0];
        assert_eq!(m.fixture_id, 1001);
        assert_eq!(m.league, "Premier League");
        assert_eq!(m.home_score, Some(2));
        assert_eq!(m.away_score, Some(1));
        assert_eq!(m.venue.as_deref(), Some("Old Trafford"));
        assert_eq!(m.status, MatchStatus::Finished);
    }

    #[test]
    fn test_parse_keeps_only_goal_events() {
        let matches = parse_fixtures(&sample_payload(), date()).unwrap();
        let goals = &matches[0].goals;
        assert_eq!(goals.len(), 3);
        assert_eq!(goals[0].player, "Bruno Fernandes");
        // 90+3 folded into a single minute value
        assert_eq!(goals[2].minute, 93);
    }

    #[test]
    fn test_parse_drops_goal_for_unknown_team() {
        let mut payload = sample_payload();
        payload["response"][0]["events"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!({
                "time": { "elapsed": 70 },
                "team": { "name": "Everton" },
                "player": { "name": "Nobody" },
                "type": "Goal",
                "detail": "Normal Goal"
            }));

        let matches = parse_fixtures(&payload, date()).unwrap();
        assert_eq!(matches[0].goals.len(), 3);
    }

    #[test]
    fn test_parse_scheduled_fixture_without_scores() {
        let payload = serde_json::json!({
            "response": [{
                "fixture": { "id": 7, "status": { "short": "NS" }, "venue": {} },
                "league": { "name": "La Liga" },
                "teams": { "home": { "name": "Girona" }, "away": { "name": "Real Betis" } },
                "goals": { "home": null, "away": null }
            }]
        });

        let matches = parse_fixtures(&payload, date()).unwrap();
        assert_eq!(matches[0].status, MatchStatus::Scheduled);
        assert_eq!(matches[0].home_score, None);
        assert!(matches[0].venue.is_none());
        assert!(matches[0].goals.is_empty());
    }

    #[test]
    fn test_parse_rejects_missing_response_array() {
        let err = parse_fixtures(&serde_json::json!({"errors": ["bad key"]}), date()).unwrap_err();
        assert!(matches!(err, FetchError::Schema(_)));
    }

    #[test]
    fn test_parse_rejects_fixture_missing_team_name() {
        let payload = serde_json::json!({
            "response": [{
                "fixture": { "id": 7, "status": { "short": "FT" } },
                "league": { "name": "La Liga" },
                "teams": { "home": {}, "away": { "name": "Real Betis" } }
            }]
        });

        let err = parse_fixtures(&payload, date()).unwrap_err();
        assert!(matches!(err, FetchError::Schema(_)));
    }

    #[test]
    fn test_status_from_short() {
        assert_eq!(ApiSports::status_from_short("FT"), MatchStatus::Finished);
        assert_eq!(ApiSports::status_from_short("PEN"), MatchStatus::Finished);
        assert_eq!(ApiSports::status_from_short("NS"), MatchStatus::Scheduled);
        assert_eq!(ApiSports::status_from_short("HT"), MatchStatus::InProgress);
        assert_eq!(ApiSports::status_from_short("??"), MatchStatus::InProgress);
    }
}
