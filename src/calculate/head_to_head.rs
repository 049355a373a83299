//! Head-to-head grid: one row per common match, one cell per tracked player.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::common::CommonMatch;
use super::filter::PlayerWindow;
use super::points_for_placement;
use crate::models::{MatchId, PlacementBand, PlayerId, Trait};

/// Maximum number of rows shown in the grid.
pub const HEAD_TO_HEAD_LIMIT: usize = 20;

/// Number of traits shown per cell.
pub const TRAITS_PER_CELL: usize = 2;

fn set_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(Set|TFT|TFTSet)\d+_").expect("valid trait prefix pattern"))
}

/// Human-readable trait name from an internal identifier.
///
/// `TFT13_Bruiser` becomes `Bruiser` and `Set12_FaerieUnique` becomes `Faerie`.
/// Multi-part names keep their last segment.
pub fn trait_display_name(raw: &str) -> String {
    let stripped = set_prefix().replace(raw, "");
    let base = stripped.strip_suffix("Unique").unwrap_or(&stripped[..]);

    match base.rsplit('_').next() {
        Some(last) if !last.is_empty() => last.to_string(),
        _ => stripped.to_string(),
    }
}

/// The `limit` most prominent active traits, highest style first.
pub fn top_traits(traits: &[Trait], limit: usize) -> Vec<String> {
    let mut active: Vec<&Trait> = traits.iter().filter(|t| t.tier_current > 0).collect();
    active.sort_by(|a, b| b.style.cmp(&a.style));
    active
        .into_iter()
        .take(limit)
        .map(|t| trait_display_name(&t.name))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHeadCell {
    pub player_id: PlayerId,

    /// `None` when the player was not in this match
    pub placement: Option<u8>,
    pub points: Option<i32>,
    pub band: Option<PlacementBand>,

    #[serde(default)]
    pub top_traits: Vec<String>,
}

impl HeadToHeadCell {
    pub fn played(&self) -> bool {
        self.placement.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHeadRow {
    pub match_id: MatchId,
    pub timestamp: i64,
    pub cells: Vec<HeadToHeadCell>,
}

/// Build the grid for the first `limit` common matches.
///
/// Columns follow `order`; players not present in `windows` are skipped.
pub fn build_head_to_head(
    windows: &[PlayerWindow<'_>],
    common: &[CommonMatch],
    order: &[PlayerId],
    limit: usize,
) -> Vec<HeadToHeadRow> {
    let columns: Vec<&PlayerWindow<'_>> = order
        .iter()
        .filter_map(|id| windows.iter().find(|w| w.player.id() == id))
        .collect();

    common
        .iter()
        .take(limit)
        .map(|c| HeadToHeadRow {
            match_id: c.match_id.clone(),
            timestamp: c.timestamp,
            cells: columns.iter().map(|w| cell_for(w, c)).collect(),
        })
        .collect()
}

fn cell_for(window: &PlayerWindow<'_>, common: &CommonMatch) -> HeadToHeadCell {
    let player_id = window.player.id().clone();

    match common.placement_of(&player_id) {
        Some(placement) => {
            let traits = window
                .matches
                .iter()
                .find(|m| m.match_id == common.match_id)
                .map(|m| top_traits(&m.traits, TRAITS_PER_CELL))
                .unwrap_or_default();

            HeadToHeadCell {
                player_id,
                placement: Some(placement),
                points: Some(points_for_placement(placement)),
                band: Some(PlacementBand::from_placement(placement)),
                top_traits: traits,
            }
        }
        None => HeadToHeadCell {
            player_id,
            placement: None,
            points: None,
            band: None,
            top_traits: Vec::new(),
        },
    }
}
