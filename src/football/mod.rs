pub mod api_sports;
pub mod demo;
pub mod provider;

pub use api_sports::ApiSports;
pub use demo::DemoFixtures;
pub use provider::MatchProvider;

use thiserror::Error;

/// Classified failures from the external football data source.
///
/// The refresh coordinator treats every variant the same way (log and fall
/// back to the cache), but the class matters for logs and for not mistaking
/// a schema drift for an outage.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("football API returned {0}")]
    Status(reqwest::StatusCode),

    #[error("unexpected payload: {0}")]
    Schema(String),
}
