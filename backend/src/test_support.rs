//! Fakes and fixtures shared by the unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Mutex;

use crate::stats::{
    CAREER_SEASON_ID, CommonPlayerInfo, GameLogEntry, PlayerId, RosterEntry, SeasonRow,
    StatsError, StatsProvider,
};
use crate::vision::{ImageInput, VisionError, VisionModel};

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(image::RgbImage::new(width, height))
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

pub fn curry_latest_game() -> GameLogEntry {
    GameLogEntry {
        date: "2025-11-01".into(),
        matchup: "vs LAL".into(),
        result: Some("W".into()),
        minutes: "34".into(),
        points: 30.0,
        rebounds: 5.0,
        assists: 7.0,
    }
}

pub fn curry_career_row() -> SeasonRow {
    SeasonRow {
        season_id: CAREER_SEASON_ID.into(),
        pts: Some(24.8),
        ast: Some(6.3),
        reb: Some(4.5),
        fg_pct: Some(0.492),
        fg3_pct: Some(0.421),
        ft_pct: Some(0.915),
    }
}

/// Replies with queued texts in order and records every prompt it sees.
#[derive(Default)]
pub struct FakeVision {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    fail: bool,
}

impl FakeVision {
    pub fn replying<const N: usize>(replies: [&str; N]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionModel for FakeVision {
    async fn generate(&self, prompt: &str, _image: &ImageInput) -> Result<String, VisionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(VisionError::Api {
                status: 503,
                body: "model overloaded".into(),
            });
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(VisionError::EmptyResponse(None))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsCalls {
    pub all_players: usize,
    pub common_player_info: usize,
    pub player_game_log: usize,
    pub player_career_stats: usize,
}

impl StatsCalls {
    pub fn total(&self) -> usize {
        self.all_players + self.common_player_info + self.player_game_log + self.player_career_stats
    }
}

#[derive(Default)]
pub struct FakeStats {
    players: Vec<RosterEntry>,
    info: Option<CommonPlayerInfo>,
    games: Vec<GameLogEntry>,
    career: Vec<SeasonRow>,
    fail_game_log: bool,
    calls: Mutex<StatsCalls>,
    seasons: Mutex<Vec<String>>,
}

impl FakeStats {
    pub fn with_players(mut self, players: Vec<RosterEntry>) -> Self {
        self.players = players;
        self
    }

    pub fn with_team(self, team_name: &str) -> Self {
        self.with_info(CommonPlayerInfo {
            team_name: Some(team_name.to_string()),
        })
    }

    pub fn with_info(mut self, info: CommonPlayerInfo) -> Self {
        self.info = Some(info);
        self
    }

    pub fn with_games(mut self, games: Vec<GameLogEntry>) -> Self {
        self.games = games;
        self
    }

    pub fn with_career(mut self, career: Vec<SeasonRow>) -> Self {
        self.career = career;
        self
    }

    pub fn failing_game_log(mut self) -> Self {
        self.fail_game_log = true;
        self
    }

    pub fn calls(&self) -> StatsCalls {
        *self.calls.lock().unwrap()
    }

    pub fn seasons_requested(&self) -> Vec<String> {
        self.seasons.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatsProvider for FakeStats {
    async fn all_players(&self) -> Result<Vec<RosterEntry>, StatsError> {
        self.calls.lock().unwrap().all_players += 1;
        Ok(self.players.clone())
    }

    async fn common_player_info(
        &self,
        _player_id: PlayerId,
    ) -> Result<Option<CommonPlayerInfo>, StatsError> {
        self.calls.lock().unwrap().common_player_info += 1;
        Ok(self.info.clone())
    }

    async fn player_game_log(
        &self,
        _player_id: PlayerId,
        season: &str,
    ) -> Result<Vec<GameLogEntry>, StatsError> {
        self.calls.lock().unwrap().player_game_log += 1;
        self.seasons.lock().unwrap().push(season.to_string());
        if self.fail_game_log {
            return Err(StatsError::Api {
                endpoint: "playergamelog".into(),
                status: 500,
            });
        }
        Ok(self.games.clone())
    }

    async fn player_career_stats(&self, _player_id: PlayerId) -> Result<Vec<SeasonRow>, StatsError> {
        self.calls.lock().unwrap().player_career_stats += 1;
        Ok(self.career.clone())
    }
}
