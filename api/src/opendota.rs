/// OpenDota API raw wire types — serde shapes for deserializing `/api/live`.
/// The pipeline only reads league id, team names and kill scores; the rest is
/// decoded so the full upstream shape round-trips through logs and tests.
use chrono::{DateTime, Utc};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Live games  (GET /api/live)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LiveMatch {
    pub activate_time: Option<i64>,
    pub deactivate_time: Option<i64>,
    pub server_steam_id: Option<String>,
    pub lobby_id: Option<String>,
    pub league_id: Option<i64>,
    pub lobby_type: Option<i64>,
    pub game_time: Option<i64>,
    pub delay: Option<i64>,
    pub spectators: Option<i64>,
    pub game_mode: Option<i64>,
    pub average_mmr: Option<i64>,
    pub sort_score: Option<i64>,
    pub last_update_time: Option<i64>,
    pub radiant_lead: Option<i64>,
    pub radiant_score: Option<u32>,
    pub dire_score: Option<u32>,
    #[serde(default)]
    pub players: Vec<LivePlayer>,
    pub building_state: Option<i64>,
    pub team_name_radiant: Option<String>,
    pub team_name_dire: Option<String>,
    pub team_logo_radiant: Option<String>,
    pub team_logo_dire: Option<String>,
    pub weekend_tourney_tournament_id: Option<i64>,
    pub weekend_tourney_division: Option<i64>,
    pub weekend_tourney_skill_level: Option<i64>,
    pub weekend_tourney_bracket_round: Option<i64>,
}

impl LiveMatch {
    /// When the lobby went live, from the unix-seconds `activate_time`.
    pub fn activated_at(&self) -> Option<DateTime<Utc>> {
        self.activate_time
            .filter(|&ts| ts > 0)
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LivePlayer {
    pub account_id: Option<i64>,
    pub hero_id: Option<i64>,
    pub name: Option<String>,
    pub country_code: Option<String>,
    pub fantasy_role: Option<i64>,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
    pub team_tag: Option<String>,
    pub is_locked: Option<bool>,
    pub is_pro: Option<bool>,
    pub locked_until: Option<i64>,
}
