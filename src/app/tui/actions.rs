use ratatui::widgets::TableState;

use crate::cli::{SearchField, SortKey};

use super::super::feed::FeedEntry;
use super::super::queue::unplayed;
use super::super::reconcile::{MatchPolicy, PlaybackReconciler, Store};
use super::ViewMode;

/// Entry indices shown in the table for the given view.
pub(super) fn visible_rows<S: Store>(
    entries: &[FeedEntry],
    reconciler: &PlaybackReconciler<S>,
    view: ViewMode,
) -> Vec<usize> {
    match view {
        ViewMode::All => (0..entries.len()).collect(),
        ViewMode::Unplayed => unplayed(entries, reconciler, SortKey::Feed)
            .into_iter()
            .map(|entry| entry.index)
            .collect(),
    }
}

pub(super) fn selected_entry(rows: &[usize], table_state: &TableState) -> Option<usize> {
    table_state
        .selected()
        .and_then(|selected| rows.get(selected))
        .copied()
}

/// Keeps the cursor on `preferred` when it is still visible, otherwise clamps
/// the current row.
pub(super) fn sync_selection(rows: &[usize], table_state: &mut TableState, preferred: Option<usize>) {
    if rows.is_empty() {
        table_state.select(None);
        return;
    }

    if let Some(entry_idx) = preferred
        && let Some(row) = rows.iter().position(|&idx| idx == entry_idx)
    {
        table_state.select(Some(row));
        return;
    }

    match table_state.selected() {
        Some(selected) => table_state.select(Some(selected.min(rows.len() - 1))),
        None => table_state.select(Some(0)),
    }
}

pub(super) fn play_all_target_count(entries: &[FeedEntry], policy: &MatchPolicy, from: usize) -> usize {
    entries
        .iter()
        .take(from.saturating_add(1))
        .filter(|entry| policy.is_tracked(entry))
        .count()
}

pub(super) fn next_search_field(field: SearchField) -> SearchField {
    match field {
        SearchField::All => SearchField::Nickname,
        SearchField::Nickname => SearchField::Title,
        SearchField::Title => SearchField::All,
    }
}

pub(super) fn status_info(msg: &str) -> String {
    format!("INFO: {msg}")
}

pub(super) fn status_error(msg: &str) -> String {
    format!("ERROR: {msg}")
}
