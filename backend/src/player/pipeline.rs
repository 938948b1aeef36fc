use log::{debug, error, info, warn};
use playercard_shared::{PlayerInfo, Sport};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::roster::Roster;
use super::summary::{self, CareerAverages, IDENTIFY_PROMPT};
use crate::stats::{GameLogEntry, PlayerId, StatsError, StatsProvider};
use crate::vision::{ImageInput, VisionError, VisionModel};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Support for {0} is not yet implemented.")]
    UnsupportedSport(String),
    #[error("Player '{0}' not found in NBA database.")]
    PlayerNotFound(String),
    #[error("Could not retrieve team info for {0}.")]
    TeamInfoUnavailable(String),
    #[error("Could not retrieve any career season data for {0}.")]
    NoSeasonData(String),
    #[error("Error generating player info: {0}")]
    Vision(#[from] VisionError),
    #[error("Error generating player info: {0}")]
    Stats(#[from] StatsError),
}

impl PipelineError {
    /// True when an external service or the stored image failed, as opposed
    /// to a lookup that completed without a usable answer.
    pub fn is_upstream(&self) -> bool {
        matches!(self, PipelineError::Vision(_) | PipelineError::Stats(_))
    }
}

#[derive(Debug, Clone)]
pub struct PlayerReport {
    pub player_name: String,
    pub player_id: PlayerId,
    pub team_name: String,
    pub latest_game: Option<GameLogEntry>,
    pub averages: CareerAverages,
    pub stats_summary: String,
    pub caption_output: String,
}

impl From<PlayerReport> for PlayerInfo {
    fn from(report: PlayerReport) -> Self {
        PlayerInfo::Success {
            stats_summary: report.stats_summary,
            caption_output: report.caption_output,
        }
    }
}

impl From<PipelineError> for PlayerInfo {
    fn from(err: PipelineError) -> Self {
        PlayerInfo::error(err.to_string())
    }
}

/// Identification → roster lookup → stats retrieval → summary assembly, run
/// strictly in sequence for one image.
#[derive(Clone)]
pub struct PlayerInfoPipeline {
    vision: Arc<dyn VisionModel>,
    stats: Arc<dyn StatsProvider>,
    roster: Arc<Roster>,
    season: String,
    request_pause: Duration,
}

impl PlayerInfoPipeline {
    pub fn new(
        vision: Arc<dyn VisionModel>,
        stats: Arc<dyn StatsProvider>,
        roster: Arc<Roster>,
        season: String,
        request_pause: Duration,
    ) -> Self {
        Self {
            vision,
            stats,
            roster,
            season,
            request_pause,
        }
    }

    pub async fn run(&self, image_path: &Path, sport: &str) -> Result<PlayerReport, PipelineError> {
        if Sport::from_str(sport).is_err() {
            warn!("Rejecting unsupported sport: {}", sport);
            return Err(PipelineError::UnsupportedSport(sport.to_string()));
        }

        let image = ImageInput::open(image_path).await.inspect_err(|e| {
            error!("Failed to open image {}: {}", image_path.display(), e);
        })?;
        debug!(
            "Opened {}x{} {} image from {}",
            image.width,
            image.height,
            image.mime_type,
            image_path.display()
        );

        let player_name = self.identify(&image).await?;
        let player_id = self
            .roster
            .find_by_name(&player_name)
            .map(|entry| entry.id)
            .ok_or_else(|| {
                warn!("Player '{}' not found in roster", player_name);
                PipelineError::PlayerNotFound(player_name.clone())
            })?;
        info!("Resolved '{}' to player id {}", player_name, player_id);

        let info = self.stats.common_player_info(player_id).await;
        self.pause().await;
        let team_name = info?
            .ok_or_else(|| PipelineError::TeamInfoUnavailable(player_name.clone()))?
            .team_name
            .unwrap_or_else(|| "Unknown Team".to_string());

        let games = self.stats.player_game_log(player_id, &self.season).await;
        self.pause().await;
        let latest_game = games?.into_iter().next();
        let latest_game_text = match &latest_game {
            Some(game) => summary::latest_game_sentence(game),
            None => {
                debug!("No games for {} in {}", player_name, self.season);
                summary::no_recent_games_sentence(&self.season)
            }
        };

        let rows = self.stats.player_career_stats(player_id).await;
        self.pause().await;
        let averages = CareerAverages::from_rows(&rows?)
            .ok_or_else(|| PipelineError::NoSeasonData(player_name.clone()))?;

        let prompt = summary::caption_prompt(&averages, latest_game.as_ref());
        let caption = self.vision.generate(&prompt, &image).await.inspect_err(|e| {
            error!("Caption generation failed for {}: {}", player_name, e);
        })?;

        let stats_summary =
            summary::stats_summary(&player_name, &team_name, &latest_game_text, &averages);
        info!("Built player report for {} ({})", player_name, team_name);

        Ok(PlayerReport {
            caption_output: summary::caption_output(&caption),
            player_name,
            player_id,
            team_name,
            latest_game,
            averages,
            stats_summary,
        })
    }

    async fn identify(&self, image: &ImageInput) -> Result<String, PipelineError> {
        let response = self
            .vision
            .generate(IDENTIFY_PROMPT, image)
            .await
            .inspect_err(|e| error!("Player identification failed: {}", e))?;
        let name = response.trim().to_string();
        info!("Vision model identified player as '{}'", name);
        Ok(name)
    }

    async fn pause(&self) {
        if !self.request_pause.is_zero() {
            tokio::time::sleep(self.request_pause).await;
        }
    }
}
