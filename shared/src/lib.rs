use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Sport {
    #[strum(serialize = "NBA")]
    Nba,
}

/// Outcome of the player lookup, tagged by `status` on the wire.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PlayerInfo {
    Success {
        stats_summary: String,
        caption_output: String,
    },
    Error {
        message: String,
    },
}

impl PlayerInfo {
    pub fn error(message: impl Into<String>) -> Self {
        PlayerInfo::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PlayerInfo::Success { .. })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UploadResponse {
    pub sport: Option<String>,
    pub image_url: String,
    pub player_info: PlayerInfo,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn sport_parses_case_insensitively() {
        assert_eq!(Sport::from_str("NBA").unwrap(), Sport::Nba);
        assert_eq!(Sport::from_str("nba").unwrap(), Sport::Nba);
        assert!(Sport::from_str("NFL").is_err());
        assert!(Sport::from_str("").is_err());
        assert_eq!(Sport::Nba.to_string(), "NBA");
    }

    #[test]
    fn success_serializes_with_status_tag() {
        let info = PlayerInfo::Success {
            stats_summary: "summary".into(),
            caption_output: "caption".into(),
        };
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "status": "success",
                "stats_summary": "summary",
                "caption_output": "caption"
            })
        );
    }

    #[test]
    fn error_serializes_without_success_fields() {
        let value = serde_json::to_value(PlayerInfo::error("boom")).unwrap();
        assert_eq!(value, serde_json::json!({"status": "error", "message": "boom"}));
        assert!(value.get("stats_summary").is_none());
    }
}
