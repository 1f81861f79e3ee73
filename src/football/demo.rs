use async_trait::async_trait;
use chrono::NaiveDate;

use super::provider::MatchProvider;
use super::FetchError;
use crate::db::models::{Goal, Match, MatchStatus};

/// Offline provider serving a fixed set of fixtures, re-dated to whatever
/// date is requested. Selected with `--demo` so the bot works without a
/// football API key.
pub struct DemoFixtures;

#[async_trait]
impl MatchProvider for DemoFixtures {
    fn name(&self) -> &str {
        "demo-fixtures"
    }

    fn is_live(&self) -> bool {
        false
    }

    async fn fetch_matches(&self, date: NaiveDate) -> Result<Vec<Match>, FetchError> {
        Ok(demo_matches(date))
    }
}

pub fn demo_matches(date: NaiveDate) -> Vec<Match> {
    vec![
        Match {
            fixture_id: 1001,
            date,
            league: "Premier League".into(),
            home_team: "Manchester United".into(),
            away_team: "Liverpool".into(),
            home_score: Some(2),
            away_score: Some(1),
            venue: Some("Old Trafford".into()),
            status: MatchStatus::Finished,
            goals: vec![
                Goal {
                    minute: 24,
                    player: "Bruno Fernandes".into(),
                    team: "Manchester United".into(),
                },
                Goal {
                    minute: 55,
                    player: "Mohamed Salah".into(),
                    team: "Liverpool".into(),
                },
                Goal {
                    minute: 78,
                    player: "Marcus Rashford".into(),
                    team: "Manchester United".into(),
                },
            ],
        },
        Match {
            fixture_id: 1002,
            date,
            league: "Premier League".into(),
            home_team: "Arsenal".into(),
            away_team: "Chelsea".into(),
            home_score: Some(3),
            away_score: Some(0),
            venue: Some("Emirates Stadium".into()),
            status: MatchStatus::Finished,
            goals: vec![
                Goal {
                    minute: 15,
                    player: "Martin Odegaard".into(),
                    team: "Arsenal".into(),
                },
                Goal {
                    minute: 47,
                    player: "Bukayo Saka".into(),
                    team: "Arsenal".into(),
                },
                Goal {
                    minute: 90,
                    player: "Gabriel Jesus".into(),
                    team: "Arsenal".into(),
                },
            ],
        },
        Match {
            fixture_id: 1003,
            date,
            league: "La Liga".into(),
            home_team: "Real Madrid".into(),
            away_team: "Barcelona".into(),
            home_score: Some(2),
            away_score: Some(2),
            venue: Some("Santiago Bernabeu".into()),
            status: MatchStatus::Finished,
            goals: vec![
                Goal {
                    minute: 23,
                    player: "Vinicius Junior".into(),
                    team: "Real Madrid".into(),
                },
                Goal {
                    minute: 41,
                    player: "Robert Lewandowski".into(),
                    team: "Barcelona".into(),
                },
                Goal {
                    minute: 60,
                    player: "Jude Bellingham".into(),
                    team: "Real Madrid".into(),
                },
                Goal {
                    minute: 88,
                    player: "Lamine Yamal".into(),
                    team: "Barcelona".into(),
                },
            ],
        },
        Match {
            fixture_id: 1004,
            date,
            league: "Serie A".into(),
            home_team: "Inter".into(),
            away_team: "Juventus".into(),
            home_score: None,
            away_score: None,
            venue: Some("San Siro".into()),
            status: MatchStatus::Scheduled,
            goals: vec![],
        },
    ]
}
