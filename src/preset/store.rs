use std::cmp::Reverse;

use crate::error::PresetResult;
use crate::preset::types::{Preset, PresetId, PresetSummary, SavePresetRequest};

/// The four preset operations, independent of the storage technology.
///
/// Each call is one atomic unit against the backing store. Listings are
/// ordered newest first (`createdAt` descending, then id descending).
pub trait PresetStore: Send + Sync {
    /// Validate and persist a new preset, returning its id.
    fn save(&self, request: &SavePresetRequest) -> PresetResult<PresetId>;

    /// Summaries of every stored preset.
    fn list_all(&self) -> PresetResult<Vec<PresetSummary>>;

    /// Presets whose name contains the trimmed query (case-sensitive).
    /// A blank query lists everything.
    fn search_by_name(&self, query: &str) -> PresetResult<Vec<PresetSummary>> {
        let all = self.list_all()?;
        Ok(match normalize_query(query) {
            None => all,
            Some(needle) => all.into_iter().filter(|p| p.name.contains(needle)).collect(),
        })
    }

    /// The full record, or `NotFound`.
    fn get_by_id(&self, id: PresetId) -> PresetResult<Preset>;
}

/// Trimmed search term, or `None` when the query is blank.
pub fn normalize_query(query: &str) -> Option<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// Sort into listing order: newest first, later ids first on equal timestamps.
pub fn sort_newest_first(presets: &mut [PresetSummary]) {
    presets.sort_by_key(|p| (Reverse(p.created_at), Reverse(p.id)));
}
