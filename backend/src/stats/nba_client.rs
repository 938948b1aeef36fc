use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use std::time::Duration;
use url::Url;

use super::result_set::{Record, StatsResponse};
use super::{
    CAREER_SEASON_ID, CommonPlayerInfo, GameLogEntry, PlayerId, RosterEntry, SeasonRow,
    StatsError, StatsProvider,
};
use crate::config::StatsConfig;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36";

/// Client for the public NBA stats endpoints.
#[derive(Clone)]
pub struct NbaStatsClient {
    http_client: HttpClient,
    base_url: String,
    season: String,
}

impl NbaStatsClient {
    pub fn new(config: &StatsConfig) -> Result<Self, StatsError> {
        // stats.nba.com drops requests that do not look like they came from nba.com
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
        headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));

        let http_client = HttpClient::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            season: config.season.clone(),
        })
    }

    async fn fetch(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<StatsResponse, StatsError> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, endpoint))?;
        url.query_pairs_mut().extend_pairs(params);

        log::debug!("GET {}", url);
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            log::error!("Stats endpoint {} returned {}", endpoint, status);
            return Err(StatsError::Api {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }
}

fn season_row(record: Record<'_>, season_id: String) -> SeasonRow {
    SeasonRow {
        season_id,
        pts: record.number("PTS"),
        ast: record.number("AST"),
        reb: record.number("REB"),
        fg_pct: record.number("FG_PCT"),
        fg3_pct: record.number("FG3_PCT"),
        ft_pct: record.number("FT_PCT"),
    }
}

fn game_log_entry(record: Record<'_>) -> Result<GameLogEntry, StatsError> {
    Ok(GameLogEntry {
        date: record.text("GAME_DATE").ok_or(StatsError::MissingField("GAME_DATE"))?,
        matchup: record.text("MATCHUP").ok_or(StatsError::MissingField("MATCHUP"))?,
        result: record.text("WL"),
        minutes: record.text("MIN").unwrap_or_else(|| "0".to_string()),
        points: record.number("PTS").unwrap_or_default(),
        rebounds: record.number("REB").unwrap_or_default(),
        assists: record.number("AST").unwrap_or_default(),
    })
}

#[async_trait]
impl StatsProvider for NbaStatsClient {
    async fn all_players(&self) -> Result<Vec<RosterEntry>, StatsError> {
        let response = self
            .fetch(
                "commonallplayers",
                &[
                    ("LeagueID", "00"),
                    ("Season", self.season.as_str()),
                    ("IsOnlyCurrentSeason", "0"),
                ],
            )
            .await?;

        response
            .result_set("CommonAllPlayers")?
            .records()
            .map(|record| {
                let id = record
                    .number("PERSON_ID")
                    .ok_or(StatsError::MissingField("PERSON_ID"))?;
                let full_name = record
                    .text("DISPLAY_FIRST_LAST")
                    .ok_or(StatsError::MissingField("DISPLAY_FIRST_LAST"))?;
                Ok(RosterEntry {
                    id: PlayerId(id as u64),
                    full_name,
                })
            })
            .collect()
    }

    async fn common_player_info(
        &self,
        player_id: PlayerId,
    ) -> Result<Option<CommonPlayerInfo>, StatsError> {
        let id = player_id.to_string();
        let response = self
            .fetch("commonplayerinfo", &[("PlayerID", id.as_str()), ("LeagueID", "")])
            .await?;

        Ok(response
            .result_set("CommonPlayerInfo")?
            .records()
            .next()
            .map(|record| CommonPlayerInfo {
                team_name: record.text("TEAM_NAME"),
            }))
    }

    async fn player_game_log(
        &self,
        player_id: PlayerId,
        season: &str,
    ) -> Result<Vec<GameLogEntry>, StatsError> {
        let id = player_id.to_string();
        let response = self
            .fetch(
                "playergamelog",
                &[
                    ("PlayerID", id.as_str()),
                    ("Season", season),
                    ("SeasonType", "Regular Season"),
                ],
            )
            .await?;

        response
            .result_set("PlayerGameLog")?
            .records()
            .map(game_log_entry)
            .collect()
    }

    async fn player_career_stats(&self, player_id: PlayerId) -> Result<Vec<SeasonRow>, StatsError> {
        let id = player_id.to_string();
        let response = self
            .fetch(
                "playercareerstats",
                &[("PlayerID", id.as_str()), ("PerMode", "PerGame"), ("LeagueID", "00")],
            )
            .await?;

        let mut rows: Vec<SeasonRow> = response
            .result_set("SeasonTotalsRegularSeason")?
            .records()
            .map(|record| season_row(record, record.text("SEASON_ID").unwrap_or_default()))
            .collect();

        // The aggregate table has no SEASON_ID column; label it so callers can pick it out.
        // With it present the career figures come from the provider's own totals
        // instead of an unweighted mean of the season rows, so they can differ.
        if let Some(career) = response.optional_result_set("CareerTotalsRegularSeason") {
            rows.extend(
                career
                    .records()
                    .take(1)
                    .map(|record| season_row(record, CAREER_SEASON_ID.to_string())),
            );
        }
        Ok(rows)
    }
}
