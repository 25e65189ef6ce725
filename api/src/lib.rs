pub mod client;
pub mod opendota;

use crate::opendota::LiveMatch;
use serde::Serialize;
use std::fmt;

/// Heading shown above the widget on the community page.
pub const WIDGET_TITLE: &str = "Live Dota 2 Matches";

/// The `matches` widget type renders at most this many rows.
pub const MAX_WIDGET_MATCHES: usize = 5;

/// Sent as the widget code when nothing whitelisted is live.
pub const NO_MATCHES_CODE: &str =
    "return{\"title\":\"Live Dota 2 Matches\",\"text\": \"No live matches in progress\"};";

// ---------------------------------------------------------------------------
// Domain types — the VK widget shape, independent of OpenDota wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WidgetTeam {
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WidgetScore {
    pub team_a: u32,
    pub team_b: u32,
}

/// One row of the `matches` widget: radiant is team A, dire is team B.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WidgetMatch {
    pub team_a: WidgetTeam,
    pub team_b: WidgetTeam,
    pub score: WidgetScore,
}

impl From<&LiveMatch> for WidgetMatch {
    fn from(m: &LiveMatch) -> Self {
        Self {
            team_a: WidgetTeam { name: m.team_name_radiant.clone().unwrap_or_default() },
            team_b: WidgetTeam { name: m.team_name_dire.clone().unwrap_or_default() },
            score: WidgetScore {
                team_a: m.radiant_score.unwrap_or(0),
                team_b: m.dire_score.unwrap_or(0),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WidgetPayload {
    pub title: String,
    pub matches: Vec<WidgetMatch>,
}

/// The `type` parameter of `appWidgets.update`. VK interprets `code`
/// according to this tag, so it always travels with the code it describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WidgetKind {
    Matches,
    #[default]
    Text,
}

impl WidgetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetKind::Matches => "matches",
            WidgetKind::Text => "text",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ready-to-send widget: the VKScript `return ...;` statement and its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetCode {
    pub kind: WidgetKind,
    pub code: String,
}

impl WidgetCode {
    /// Build the widget for the selected matches. An empty selection yields
    /// the fixed "no live matches" text widget.
    pub fn build(matches: Vec<WidgetMatch>) -> serde_json::Result<Self> {
        if matches.is_empty() {
            return Ok(Self::no_matches());
        }

        let payload = WidgetPayload { title: WIDGET_TITLE.to_owned(), matches };
        let json = serde_json::to_string(&payload)?;
        Ok(Self { kind: WidgetKind::Matches, code: format!("return{json};") })
    }

    pub fn no_matches() -> Self {
        Self { kind: WidgetKind::Text, code: NO_MATCHES_CODE.to_owned() }
    }
}

/// Pick the first [`MAX_WIDGET_MATCHES`] live matches, in fetch order, whose
/// league is in the whitelist. Each match is selected at most once no matter
/// how often its league appears in the whitelist.
pub fn select_matches(live: &[LiveMatch], whitelist: &[i64]) -> Vec<WidgetMatch> {
    let mut selected = Vec::new();
    for m in live {
        if selected.len() >= MAX_WIDGET_MATCHES {
            break;
        }
        let Some(league_id) = m.league_id else {
            continue;
        };
        if whitelist.contains(&league_id) {
            selected.push(WidgetMatch::from(m));
        }
    }
    selected
}
