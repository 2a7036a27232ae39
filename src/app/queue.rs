use std::cmp::Ordering;

use anyhow::{Result, anyhow};

use crate::cli::{SearchField, SortKey};

use super::feed::FeedEntry;
use super::reconcile::{MatchPolicy, PlaybackReconciler, Store};

const THUMBNAIL_PREFIX: &str = "https://i.ytimg.com/vi/";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PlayAllSummary {
    pub(crate) marked: usize,
    pub(crate) already_played: usize,
    pub(crate) skipped_tier: usize,
    pub(crate) unplayed_tier_above: bool,
    pub(crate) reached_head: bool,
}

pub(crate) fn entry_at(entries: &[FeedEntry], index: usize) -> Result<&FeedEntry> {
    entries.get(index).ok_or_else(|| {
        anyhow!(
            "no feed item at index {index} (feed has {} item(s))",
            entries.len()
        )
    })
}

/// Position of the newest tracked video. Once it is played the queue has
/// been worked through.
pub(crate) fn head_index(entries: &[FeedEntry], policy: &MatchPolicy) -> Option<usize> {
    entries.iter().position(|entry| policy.is_tracked(entry))
}

pub(crate) fn unplayed<'a, S: Store>(
    entries: &'a [FeedEntry],
    reconciler: &PlaybackReconciler<S>,
    sort: SortKey,
) -> Vec<&'a FeedEntry> {
    let policy = reconciler.policy();
    let mut out: Vec<&FeedEntry> = entries
        .iter()
        .filter(|entry| entry.category == policy.video_category && !reconciler.is_played(entry))
        .collect();

    match sort {
        SortKey::Feed => {}
        SortKey::Title => out.sort_by(|a, b| compare_text(&a.title, &b.title)),
        SortKey::Nickname => out.sort_by(|a, b| compare_text(&a.nickname, &b.nickname)),
    }
    out
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Next unplayed position after `from`, wrapping to the top of the list.
pub(crate) fn next_unplayed<S: Store>(
    entries: &[FeedEntry],
    reconciler: &PlaybackReconciler<S>,
    from: Option<usize>,
) -> Option<usize> {
    let candidates: Vec<usize> = unplayed(entries, reconciler, SortKey::Feed)
        .into_iter()
        .map(|entry| entry.index)
        .collect();
    cycle_position(&candidates, from, true)
}

/// Video entries whose `field` contains `query`. Matching ignores case and
/// all whitespace on both sides; a blank query matches nothing.
pub(crate) fn search<'a>(
    entries: &'a [FeedEntry],
    policy: &MatchPolicy,
    query: &str,
    field: SearchField,
) -> Vec<&'a FeedEntry> {
    let needle = fold_search_text(query);
    if needle.is_empty() {
        return Vec::new();
    }

    entries
        .iter()
        .filter(|entry| entry.category == policy.video_category)
        .filter(|entry| {
            let in_nickname = || fold_search_text(&entry.nickname).contains(&needle);
            let in_title = || fold_search_text(&entry.title).contains(&needle);
            match field {
                SearchField::All => in_nickname() || in_title(),
                SearchField::Nickname => in_nickname(),
                SearchField::Title => in_title(),
            }
        })
        .collect()
}

fn fold_search_text(text: &str) -> String {
    text.chars()
        .filter(|ch| !ch.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Steps through ascending `positions` from `from`, wrapping at either end.
/// Without a current position the first (or last, going back) one is picked.
pub(crate) fn cycle_position(
    positions: &[usize],
    from: Option<usize>,
    forward: bool,
) -> Option<usize> {
    let first = positions.first().copied();
    let last = positions.last().copied();
    match (from, forward) {
        (Some(current), true) => positions
            .iter()
            .copied()
            .find(|&idx| idx > current)
            .or(first),
        (Some(current), false) => positions
            .iter()
            .rev()
            .copied()
            .find(|&idx| idx < current)
            .or(last),
        (None, true) => first,
        (None, false) => last,
    }
}

/// Marks every tracked video from `from` up to the head of the list as
/// played, oldest first.
pub(crate) fn play_all<S: Store>(
    entries: &[FeedEntry],
    reconciler: &mut PlaybackReconciler<S>,
    from: usize,
) -> Result<PlayAllSummary> {
    entry_at(entries, from)?;
    let policy = reconciler.policy().clone();
    let head = head_index(entries, &policy);

    let mut summary = PlayAllSummary {
        unplayed_tier_above: entries[..from].iter().any(|entry| {
            entry.category == policy.video_category && entry.tier && !reconciler.is_played(entry)
        }),
        ..PlayAllSummary::default()
    };

    for entry in entries[..=from].iter().rev() {
        if entry.category != policy.video_category {
            continue;
        }
        if entry.tier {
            summary.skipped_tier += 1;
            continue;
        }
        if reconciler.mark_played(entry) {
            summary.marked += 1;
        } else {
            summary.already_played += 1;
        }
        if Some(entry.index) == head {
            summary.reached_head = true;
        }
    }
    Ok(summary)
}

/// Watch URL for a YouTube thumbnail. Other thumbnails have no link.
pub(crate) fn video_link(thumbnail: &str) -> Option<String> {
    let start = thumbnail.find(THUMBNAIL_PREFIX)? + THUMBNAIL_PREFIX.len();
    let id: String = thumbnail[start..]
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '-')
        .collect();
    if id.is_empty() {
        return None;
    }
    Some(format!("https://www.youtube.com/watch?v={id}"))
}
