use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::feed::{FeedEntry, FeedItem};

/// Default head window for shift detection. Once both lists fill the window,
/// a shift of this many items or more is not detected; the pass then assumes
/// no shift and records that no longer line up are dropped.
pub(crate) const CHECK_LIMIT: usize = 5;

pub(crate) const VIDEO_CATEGORY: &str = "영상 후원";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct PlayedRecord {
    pub(crate) title: String,
    pub(crate) nickname: String,
    pub(crate) index: usize,
    #[serde(default = "completed_default")]
    pub(crate) completed: bool,
}

fn completed_default() -> bool {
    true
}

impl PlayedRecord {
    fn for_entry(entry: &FeedEntry) -> Self {
        Self {
            title: entry.title.clone(),
            nickname: entry.nickname.clone(),
            index: entry.index,
            completed: true,
        }
    }

    fn same_content(&self, entry: &FeedEntry) -> bool {
        self.title == entry.title && self.nickname == entry.nickname
    }

    fn is_at(&self, entry: &FeedEntry) -> bool {
        self.same_content(entry) && self.index == entry.index
    }
}

/// Durable home of the played records and the last snapshot.
pub(crate) trait Store {
    fn load_played_records(&self) -> Result<Vec<PlayedRecord>>;
    fn save_played_records(&self, records: &[PlayedRecord]) -> Result<()>;
    fn load_snapshot(&self) -> Result<Vec<FeedItem>>;
    fn save_snapshot(&self, snapshot: &[FeedItem]) -> Result<()>;
}

impl<T: Store + ?Sized> Store for &T {
    fn load_played_records(&self) -> Result<Vec<PlayedRecord>> {
        (**self).load_played_records()
    }

    fn save_played_records(&self, records: &[PlayedRecord]) -> Result<()> {
        (**self).save_played_records(records)
    }

    fn load_snapshot(&self) -> Result<Vec<FeedItem>> {
        (**self).load_snapshot()
    }

    fn save_snapshot(&self, snapshot: &[FeedItem]) -> Result<()> {
        (**self).save_snapshot(snapshot)
    }
}

/// Which entries take part in played tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MatchPolicy {
    pub(crate) check_limit: usize,
    pub(crate) video_category: String,
}

impl MatchPolicy {
    pub(crate) fn is_tracked(&self, entry: &FeedEntry) -> bool {
        entry.category == self.video_category && !entry.tier
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ReconcileOutcome {
    pub(crate) offset: usize,
    /// Current positions that carry the played marker.
    pub(crate) marked: Vec<usize>,
    pub(crate) dropped: usize,
}

/// Finds how many items were inserted at the head of `current` since
/// `previous` was captured. Ties go to the smallest offset.
///
/// When a list shorter than `limit` bounds the window, the top candidate has
/// nothing left to compare and qualifies, so a short queue that was pushed
/// down entirely still shifts. With a full window a candidate needs at least
/// one comparison, and a shift of `limit` or more resolves to 0.
pub(crate) fn detect_offset(current: &[FeedItem], previous: &[FeedItem], limit: usize) -> usize {
    let check_limit = limit.min(current.len()).min(previous.len());
    if check_limit == 0 {
        return 0;
    }
    let short_list = check_limit < limit;

    (0..=check_limit)
        .find(|&offset| {
            let window = check_limit - offset;
            (window > 0 || short_list)
                && (0..window).all(|j| current[j + offset].same_content(&previous[j]))
        })
        .unwrap_or(0)
}

pub(crate) struct PlaybackReconciler<S> {
    store: S,
    policy: MatchPolicy,
    played: Vec<PlayedRecord>,
    snapshot: Vec<FeedItem>,
    bulk_loading: bool,
}

impl<S: Store> PlaybackReconciler<S> {
    pub(crate) fn new(store: S, policy: MatchPolicy) -> Self {
        let played = store.load_played_records().unwrap_or_else(|err| {
            warn!("failed to load played records, starting empty: {err:#}");
            Vec::new()
        });
        let snapshot = store.load_snapshot().unwrap_or_else(|err| {
            warn!("failed to load feed snapshot, starting empty: {err:#}");
            Vec::new()
        });
        debug!(
            played = played.len(),
            snapshot = snapshot.len(),
            "reconciler state loaded"
        );
        Self {
            store,
            policy,
            played,
            snapshot,
            bulk_loading: false,
        }
    }

    pub(crate) fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    pub(crate) fn played_records(&self) -> &[PlayedRecord] {
        &self.played
    }

    pub(crate) fn snapshot(&self) -> &[FeedItem] {
        &self.snapshot
    }

    pub(crate) fn is_bulk_loading(&self) -> bool {
        self.bulk_loading
    }

    pub(crate) fn begin_bulk_load(&mut self) {
        self.bulk_loading = true;
    }

    pub(crate) fn end_bulk_load(&mut self) {
        self.bulk_loading = false;
    }

    /// Entry point for list-change notifications. Skipped while a bulk load
    /// is in progress.
    pub(crate) fn on_list_changed(&mut self, current: &[FeedEntry]) -> Option<ReconcileOutcome> {
        if self.bulk_loading {
            debug!(items = current.len(), "bulk load in progress, skipping reconcile");
            return None;
        }
        Some(self.reconcile(current))
    }

    pub(crate) fn reconcile(&mut self, current: &[FeedEntry]) -> ReconcileOutcome {
        let items: Vec<FeedItem> = current
            .iter()
            .enumerate()
            .map(|(position, entry)| FeedItem {
                index: position,
                ..entry.item()
            })
            .collect();
        let offset = detect_offset(&items, &self.snapshot, self.policy.check_limit);
        debug!(
            offset,
            current = items.len(),
            previous = self.snapshot.len(),
            "calculated feed offset"
        );

        let mut matched = vec![false; self.played.len()];
        let mut marked = Vec::new();
        for (position, entry) in current.iter().enumerate() {
            if !self.policy.is_tracked(entry) {
                continue;
            }
            let hit = self.played.iter().enumerate().position(|(idx, record)| {
                !matched[idx] && record.same_content(entry) && record.index + offset == position
            });
            if let Some(idx) = hit {
                matched[idx] = true;
                marked.push(position);
                debug!(nickname = %entry.nickname, position, "reapplied played marker");
            }
        }

        let before = self.played.len();
        self.played = std::mem::take(&mut self.played)
            .into_iter()
            .zip(matched)
            .filter(|(_, hit)| *hit)
            .map(|(mut record, _)| {
                record.index += offset;
                record
            })
            .collect();
        let dropped = before - self.played.len();
        if dropped > 0 {
            info!(dropped, "dropped played records that no longer line up");
        }
        self.persist_played();

        self.snapshot = items;
        self.persist_snapshot();

        ReconcileOutcome {
            offset,
            marked,
            dropped,
        }
    }

    pub(crate) fn is_played(&self, entry: &FeedEntry) -> bool {
        self.played.iter().any(|record| record.is_at(entry))
    }

    /// Returns false when the same record already exists or the entry is not
    /// tracked (other categories and tier videos).
    pub(crate) fn mark_played(&mut self, entry: &FeedEntry) -> bool {
        if !self.policy.is_tracked(entry) {
            debug!(title = %entry.title, index = entry.index, "refusing to mark untracked entry");
            return false;
        }
        if self.is_played(entry) {
            return false;
        }
        self.played.push(PlayedRecord::for_entry(entry));
        info!(title = %entry.title, nickname = %entry.nickname, index = entry.index, "marked played");
        self.persist_played();
        true
    }

    /// Returns false when nothing was marked at that position.
    pub(crate) fn unmark(&mut self, entry: &FeedEntry) -> bool {
        let before = self.played.len();
        self.played.retain(|record| !record.is_at(entry));
        if self.played.len() == before {
            return false;
        }
        info!(title = %entry.title, nickname = %entry.nickname, index = entry.index, "unmarked played");
        self.persist_played();
        true
    }

    /// Flips the played state and returns the new one.
    pub(crate) fn toggle_played(&mut self, entry: &FeedEntry) -> bool {
        if self.unmark(entry) {
            false
        } else {
            self.mark_played(entry)
        }
    }

    pub(crate) fn reset(&mut self) {
        self.played.clear();
        self.snapshot.clear();
        self.persist_played();
        self.persist_snapshot();
    }

    fn persist_played(&self) {
        if let Err(err) = self.store.save_played_records(&self.played) {
            warn!("failed to save played records: {err:#}");
        }
    }

    fn persist_snapshot(&self) {
        if let Err(err) = self.store.save_snapshot(&self.snapshot) {
            warn!("failed to save feed snapshot: {err:#}");
        }
    }
}
