//! Text assembly for the stats paragraph and the caption request.

use serde::Serialize;
use serde_json::json;

use crate::stats::{GameLogEntry, SeasonRow};

pub const IDENTIFY_PROMPT: &str =
    "Only tell me the full name of the player who is making the play in this image";

/// Per-game averages at full provider precision. Keys match the names the
/// caption prompt shows the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareerAverages {
    #[serde(rename = "avg_player_points")]
    pub points: f64,
    #[serde(rename = "avg_player_assists")]
    pub assists: f64,
    #[serde(rename = "avg_player_rebounds")]
    pub rebounds: f64,
    #[serde(rename = "avg_player_field")]
    pub field_goal_pct: f64,
    #[serde(rename = "avg_player_three")]
    pub three_point_pct: f64,
    #[serde(rename = "avg_player_free")]
    pub free_throw_pct: f64,
}

impl CareerAverages {
    /// Uses the first `Career` row verbatim when there is one, otherwise the
    /// mean of every other row. `None` when there are no season rows at all.
    pub fn from_rows(rows: &[SeasonRow]) -> Option<Self> {
        if let Some(career) = rows.iter().find(|row| row.is_career()) {
            // Null cells read as 0.0 rather than failing the request.
            return Some(Self {
                points: career.pts.unwrap_or_default(),
                assists: career.ast.unwrap_or_default(),
                rebounds: career.reb.unwrap_or_default(),
                field_goal_pct: career.fg_pct.unwrap_or_default(),
                three_point_pct: career.fg3_pct.unwrap_or_default(),
                free_throw_pct: career.ft_pct.unwrap_or_default(),
            });
        }

        let seasons: Vec<&SeasonRow> = rows.iter().filter(|row| !row.is_career()).collect();
        if seasons.is_empty() {
            return None;
        }
        Some(Self {
            points: mean(seasons.iter().map(|r| r.pts)),
            assists: mean(seasons.iter().map(|r| r.ast)),
            rebounds: mean(seasons.iter().map(|r| r.reb)),
            field_goal_pct: mean(seasons.iter().map(|r| r.fg_pct)),
            three_point_pct: mean(seasons.iter().map(|r| r.fg3_pct)),
            free_throw_pct: mean(seasons.iter().map(|r| r.ft_pct)),
        })
    }
}

/// Mean of the present values; missing cells are skipped.
fn mean(values: impl Iterator<Item = Option<f64>>) -> f64 {
    let (sum, count) = values
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

pub fn no_recent_games_sentence(season: &str) -> String {
    format!("No recent games found for the {} season.", season)
}

pub fn latest_game_sentence(game: &GameLogEntry) -> String {
    format!(
        "In their most recent game on {} ({}), they scored {} points, grabbed {} rebounds, \
         and made {} assists in {} minutes.",
        game.date, game.matchup, game.points, game.rebounds, game.assists, game.minutes
    )
}

pub fn stats_summary(
    player_name: &str,
    team_name: &str,
    latest_game_text: &str,
    averages: &CareerAverages,
) -> String {
    format!(
        "{} currently plays for the {}. {} Throughout their career, they’ve averaged {:.1} points, \
         {:.1} rebounds, and {:.1} assists per game, shooting {:.3} from the field, {:.3} from three, \
         and {:.3} from the line.",
        player_name,
        team_name,
        latest_game_text,
        averages.points,
        averages.rebounds,
        averages.assists,
        averages.field_goal_pct,
        averages.three_point_pct,
        averages.free_throw_pct
    )
}

pub fn caption_prompt(averages: &CareerAverages, latest_game: Option<&GameLogEntry>) -> String {
    let averages = json!(averages);
    let game = latest_game.map_or_else(|| json!({}), |game| json!(game));
    format!(
        "Write a short, Instagram-style caption describing what is going on in this image and \
         comparing the player's career averages {} to their latest game stats {}. Keep the output \
         short and enthusiastic.",
        averages, game
    )
}

pub fn caption_output(caption: &str) -> String {
    format!("Instagram Caption: {}", caption.trim())
}
