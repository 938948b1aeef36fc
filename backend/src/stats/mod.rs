pub mod nba_client;
pub mod result_set;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL parsing failed: {0}")]
    Url(#[from] url::ParseError),
    #[error("Stats API request to {endpoint} failed: {status}")]
    Api { endpoint: String, status: u16 },
    #[error("Stats API response has no result set named {0}")]
    MissingResultSet(String),
    #[error("Stats API row is missing {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: PlayerId,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommonPlayerInfo {
    pub team_name: Option<String>,
}

/// One row of a player's game log. Field names on the wire follow what the
/// caption prompt shows the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameLogEntry {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Opponent")]
    pub matchup: String,
    #[serde(rename = "Result (W/L)")]
    pub result: Option<String>,
    #[serde(rename = "Minutes")]
    pub minutes: String,
    #[serde(rename = "Points")]
    pub points: f64,
    #[serde(rename = "Rebounds")]
    pub rebounds: f64,
    #[serde(rename = "Assists")]
    pub assists: f64,
}

pub const CAREER_SEASON_ID: &str = "Career";

/// Per-game averages for one season, or for the whole career when
/// `season_id` is [`CAREER_SEASON_ID`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeasonRow {
    pub season_id: String,
    pub pts: Option<f64>,
    pub ast: Option<f64>,
    pub reb: Option<f64>,
    pub fg_pct: Option<f64>,
    pub fg3_pct: Option<f64>,
    pub ft_pct: Option<f64>,
}

impl SeasonRow {
    pub fn is_career(&self) -> bool {
        self.season_id == CAREER_SEASON_ID
    }
}

#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Every player the provider knows about, in provider order.
    async fn all_players(&self) -> Result<Vec<RosterEntry>, StatsError>;

    async fn common_player_info(
        &self,
        player_id: PlayerId,
    ) -> Result<Option<CommonPlayerInfo>, StatsError>;

    /// Games of `season`, most recent first.
    async fn player_game_log(
        &self,
        player_id: PlayerId,
        season: &str,
    ) -> Result<Vec<GameLogEntry>, StatsError>;

    async fn player_career_stats(&self, player_id: PlayerId) -> Result<Vec<SeasonRow>, StatsError>;
}
