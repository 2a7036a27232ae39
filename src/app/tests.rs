use std::cell::RefCell;

use anyhow::{Result, anyhow};

use crate::cli::{SearchField, SortKey};
use crate::config::Settings;

use super::display::*;
use super::feed::{FeedEntry, FeedItem, FeedSource};
use super::queue::*;
use super::reconcile::*;
use super::{play_all_message, reconcile_summary, sync_feed};

#[derive(Default)]
struct MemoryStore {
    records: RefCell<Vec<PlayedRecord>>,
    snapshot: RefCell<Vec<FeedItem>>,
}

impl MemoryStore {
    fn seeded(records: Vec<PlayedRecord>, snapshot: &[FeedEntry]) -> Self {
        Self {
            records: RefCell::new(records),
            snapshot: RefCell::new(snapshot.iter().map(FeedEntry::item).collect()),
        }
    }
}

impl Store for MemoryStore {
    fn load_played_records(&self) -> Result<Vec<PlayedRecord>> {
        Ok(self.records.borrow().clone())
    }

    fn save_played_records(&self, records: &[PlayedRecord]) -> Result<()> {
        *self.records.borrow_mut() = records.to_vec();
        Ok(())
    }

    fn load_snapshot(&self) -> Result<Vec<FeedItem>> {
        Ok(self.snapshot.borrow().clone())
    }

    fn save_snapshot(&self, snapshot: &[FeedItem]) -> Result<()> {
        *self.snapshot.borrow_mut() = snapshot.to_vec();
        Ok(())
    }
}

struct FailingStore;

impl Store for FailingStore {
    fn load_played_records(&self) -> Result<Vec<PlayedRecord>> {
        Err(anyhow!("storage unavailable"))
    }

    fn save_played_records(&self, _records: &[PlayedRecord]) -> Result<()> {
        Err(anyhow!("storage unavailable"))
    }

    fn load_snapshot(&self) -> Result<Vec<FeedItem>> {
        Err(anyhow!("storage unavailable"))
    }

    fn save_snapshot(&self, _snapshot: &[FeedItem]) -> Result<()> {
        Err(anyhow!("storage unavailable"))
    }
}

/// Feed whose list is swapped by the test.
struct MemoryFeed {
    items: Vec<FeedEntry>,
    changed: bool,
}

impl MemoryFeed {
    fn replace(&mut self, items: Vec<FeedEntry>) {
        self.items = items;
        self.changed = true;
    }
}

impl FeedSource for MemoryFeed {
    fn current_items(&self) -> Result<Vec<FeedEntry>> {
        Ok(self.items.clone())
    }

    fn poll_changes(&mut self, on_change: &mut dyn FnMut(&[FeedEntry])) -> Result<bool> {
        if !self.changed {
            return Ok(false);
        }
        self.changed = false;
        on_change(&self.items);
        Ok(true)
    }
}

fn policy() -> MatchPolicy {
    Settings::default().match_policy()
}

fn video(title: &str, nickname: &str, index: usize) -> FeedEntry {
    FeedEntry {
        title: title.to_string(),
        nickname: nickname.to_string(),
        index,
        category: VIDEO_CATEGORY.to_string(),
        tier: false,
        thumbnail: String::new(),
    }
}

fn feed(pairs: &[(&str, &str)]) -> Vec<FeedEntry> {
    pairs
        .iter()
        .enumerate()
        .map(|(index, (title, nickname))| video(title, nickname, index))
        .collect()
}

fn items(entries: &[FeedEntry]) -> Vec<FeedItem> {
    entries.iter().map(FeedEntry::item).collect()
}

fn record(title: &str, nickname: &str, index: usize) -> PlayedRecord {
    PlayedRecord {
        title: title.to_string(),
        nickname: nickname.to_string(),
        index,
        completed: true,
    }
}

const ABCDE: [(&str, &str); 5] = [
    ("A", "a"),
    ("B", "b"),
    ("C", "c"),
    ("D", "d"),
    ("E", "e"),
];

#[test]
fn detect_offset_finds_single_prepended_item() {
    let previous = feed(&ABCDE);
    let current = feed(&[("X", "x"), ("A", "a"), ("B", "b"), ("C", "c"), ("D", "d")]);
    assert_eq!(detect_offset(&items(&current), &items(&previous), CHECK_LIMIT), 1);
}

#[test]
fn detect_offset_is_zero_for_unchanged_list() {
    let list = items(&feed(&ABCDE));
    assert_eq!(detect_offset(&list, &list, CHECK_LIMIT), 0);
}

#[test]
fn detect_offset_misses_shift_beyond_window() {
    let previous = feed(&ABCDE);
    let mut pairs = vec![
        ("X1", "x"),
        ("X2", "x"),
        ("X3", "x"),
        ("X4", "x"),
        ("X5", "x"),
        ("X6", "x"),
    ];
    pairs.extend_from_slice(&ABCDE);
    let current = feed(&pairs);
    assert_eq!(detect_offset(&items(&current), &items(&previous), CHECK_LIMIT), 0);
}

#[test]
fn detect_offset_misses_shift_equal_to_full_window() {
    let previous = feed(&ABCDE);
    let mut pairs = vec![("X1", "x"), ("X2", "x"), ("X3", "x"), ("X4", "x"), ("X5", "x")];
    pairs.extend_from_slice(&ABCDE);
    let current = feed(&pairs);
    assert_eq!(detect_offset(&items(&current), &items(&previous), CHECK_LIMIT), 0);
}

#[test]
fn detect_offset_shifts_short_list_pushed_out_of_window() {
    let previous = feed(&[("A", "a")]);
    let current = feed(&[("X", "x"), ("A", "a")]);
    assert_eq!(detect_offset(&items(&current), &items(&previous), CHECK_LIMIT), 1);

    let previous = feed(&[("A", "a"), ("B", "b")]);
    let current = feed(&[("X", "x"), ("Y", "y"), ("A", "a"), ("B", "b")]);
    assert_eq!(detect_offset(&items(&current), &items(&previous), CHECK_LIMIT), 2);
}

#[test]
fn detect_offset_handles_empty_lists() {
    let list = items(&feed(&ABCDE));
    assert_eq!(detect_offset(&[], &list, CHECK_LIMIT), 0);
    assert_eq!(detect_offset(&list, &[], CHECK_LIMIT), 0);
    assert_eq!(detect_offset(&list, &list, 0), 0);
}

#[test]
fn detect_offset_ignores_position_when_comparing() {
    let previous = vec![FeedItem {
        title: "A".to_string(),
        nickname: "a".to_string(),
        index: 7,
    }];
    let current = vec![FeedItem {
        title: "A".to_string(),
        nickname: "a".to_string(),
        index: 0,
    }];
    assert_eq!(detect_offset(&current, &previous, CHECK_LIMIT), 0);
}

#[test]
fn detect_offset_respects_configured_window() {
    let previous = feed(&ABCDE);
    let current = feed(&[("X", "x"), ("Y", "y"), ("A", "a"), ("B", "b"), ("C", "c")]);
    assert_eq!(detect_offset(&items(&current), &items(&previous), 5), 2);
    assert_eq!(detect_offset(&items(&current), &items(&previous), 2), 0);
}

#[test]
fn reconcile_follows_worked_example() {
    let previous = feed(&[("T1", "N1"), ("T2", "N2")]);
    let current = feed(&[("T3", "N3"), ("T1", "N1"), ("T2", "N2")]);
    let store = MemoryStore::seeded(vec![record("T1", "N1", 0)], &previous);
    let mut reconciler = PlaybackReconciler::new(&store, policy());

    let outcome = reconciler.reconcile(&current);

    assert_eq!(outcome.offset, 1);
    assert_eq!(outcome.marked, vec![1]);
    assert_eq!(outcome.dropped, 0);
    assert_eq!(reconciler.played_records(), &[record("T1", "N1", 1)]);
    assert!(reconciler.is_played(&current[1]));
    assert_eq!(*store.records.borrow(), vec![record("T1", "N1", 1)]);
    assert_eq!(*store.snapshot.borrow(), items(&current));
}

#[test]
fn single_video_queue_keeps_mark_after_new_donation() {
    let previous = feed(&[("A", "a")]);
    let current = feed(&[("X", "x"), ("A", "a")]);
    let store = MemoryStore::seeded(vec![record("A", "a", 0)], &previous);
    let mut reconciler = PlaybackReconciler::new(&store, policy());

    let outcome = reconciler.reconcile(&current);

    assert_eq!(outcome.offset, 1);
    assert_eq!(outcome.marked, vec![1]);
    assert_eq!(outcome.dropped, 0);
    assert_eq!(reconciler.played_records(), &[record("A", "a", 1)]);
    assert!(reconciler.is_played(&current[1]));
}

#[test]
fn reconcile_twice_without_change_is_a_no_op() {
    let list = feed(&[("A", "a"), ("B", "b"), ("C", "c")]);
    let played = vec![record("A", "a", 0), record("C", "c", 2)];
    let store = MemoryStore::seeded(played.clone(), &list);
    let mut reconciler = PlaybackReconciler::new(&store, policy());

    let first = reconciler.reconcile(&list);
    let second = reconciler.reconcile(&list);

    assert_eq!(first.offset, 0);
    assert_eq!(first, second);
    assert_eq!(first.marked, vec![0, 2]);
    assert_eq!(reconciler.played_records(), played.as_slice());
    assert_eq!(*store.records.borrow(), played);
}

#[test]
fn reconcile_drops_records_that_no_longer_line_up() {
    let previous = feed(&[("A", "a"), ("B", "b"), ("C", "c")]);
    let current = feed(&[("X", "x"), ("A", "a"), ("B", "b")]);
    let store = MemoryStore::seeded(vec![record("A", "a", 0), record("C", "c", 2)], &previous);
    let mut reconciler = PlaybackReconciler::new(&store, policy());

    let outcome = reconciler.reconcile(&current);

    assert_eq!(outcome.offset, 1);
    assert_eq!(outcome.dropped, 1);
    assert_eq!(reconciler.played_records(), &[record("A", "a", 1)]);
    assert_eq!(*store.records.borrow(), vec![record("A", "a", 1)]);
}

#[test]
fn reconcile_never_matches_other_categories_or_tier_items() {
    let mut current = feed(&[("A", "a"), ("B", "b")]);
    current[0].category = "채팅".to_string();
    current[1].tier = true;
    let store = MemoryStore::seeded(vec![record("A", "a", 0), record("B", "b", 1)], &current);
    let mut reconciler = PlaybackReconciler::new(&store, policy());

    let outcome = reconciler.reconcile(&current);

    assert_eq!(outcome.offset, 0);
    assert!(outcome.marked.is_empty());
    assert_eq!(outcome.dropped, 2);
    assert!(reconciler.played_records().is_empty());
}

#[test]
fn reconcile_matches_each_record_once() {
    let list = feed(&[("A", "a"), ("A", "a")]);
    let store = MemoryStore::seeded(vec![record("A", "a", 1)], &list);
    let mut reconciler = PlaybackReconciler::new(&store, policy());

    let outcome = reconciler.reconcile(&list);

    assert_eq!(outcome.marked, vec![1]);
    assert!(!reconciler.is_played(&list[0]));
    assert!(reconciler.is_played(&list[1]));
}

#[test]
fn reconcile_with_empty_lists_keeps_nothing() {
    let store = MemoryStore::seeded(vec![record("A", "a", 0)], &[]);
    let mut reconciler = PlaybackReconciler::new(&store, policy());

    let outcome = reconciler.reconcile(&[]);

    assert_eq!(outcome.offset, 0);
    assert!(outcome.marked.is_empty());
    assert_eq!(outcome.dropped, 1);
    assert!(reconciler.snapshot().is_empty());
}

#[test]
fn marked_items_follow_successive_shifts() {
    let store = MemoryStore::default();
    let mut reconciler = PlaybackReconciler::new(&store, policy());

    let first = feed(&[("A", "a"), ("B", "b")]);
    reconciler.reconcile(&first);
    assert!(reconciler.mark_played(&first[1]));

    let second = feed(&[("X", "x"), ("A", "a"), ("B", "b")]);
    assert_eq!(reconciler.reconcile(&second).marked, vec![2]);

    let third = feed(&[("Y", "y"), ("Z", "z"), ("X", "x"), ("A", "a"), ("B", "b")]);
    let outcome = reconciler.reconcile(&third);
    assert_eq!(outcome.offset, 2);
    assert_eq!(outcome.marked, vec![4]);
    assert_eq!(reconciler.played_records(), &[record("B", "b", 4)]);
}

#[test]
fn mark_played_deduplicates_same_triple() {
    let store = MemoryStore::default();
    let mut reconciler = PlaybackReconciler::new(&store, policy());
    let entry = video("A", "a", 3);

    assert!(reconciler.mark_played(&entry));
    assert!(!reconciler.mark_played(&entry));

    assert_eq!(reconciler.played_records().len(), 1);
    assert_eq!(store.records.borrow().len(), 1);
}

#[test]
fn mark_played_refuses_untracked_entries() {
    let mut list = feed(&[("chat", "c"), ("T", "t"), ("A", "a")]);
    list[0].category = "채팅".to_string();
    list[1].tier = true;
    let store = MemoryStore::default();
    let mut reconciler = PlaybackReconciler::new(&store, policy());
    reconciler.reconcile(&list);

    assert!(!reconciler.mark_played(&list[0]));
    assert!(!reconciler.toggle_played(&list[1]));
    assert!(!reconciler.is_played(&list[1]));
    assert!(reconciler.mark_played(&list[2]));
    assert_eq!(store.records.borrow().len(), 1);

    let outcome = reconciler.reconcile(&list);
    assert_eq!(outcome.dropped, 0);
    assert_eq!(outcome.marked, vec![2]);
    assert_eq!(reconciler.played_records(), &[record("A", "a", 2)]);
}

#[test]
fn mark_played_keeps_same_content_at_other_positions() {
    let store = MemoryStore::default();
    let mut reconciler = PlaybackReconciler::new(&store, policy());

    assert!(reconciler.mark_played(&video("A", "a", 0)));
    assert!(reconciler.mark_played(&video("A", "a", 4)));
    assert_eq!(reconciler.played_records().len(), 2);
}

#[test]
fn unmark_and_toggle_update_store() {
    let store = MemoryStore::default();
    let mut reconciler = PlaybackReconciler::new(&store, policy());
    let entry = video("A", "a", 0);

    assert!(!reconciler.unmark(&entry));
    assert!(reconciler.toggle_played(&entry));
    assert!(reconciler.is_played(&entry));
    assert_eq!(store.records.borrow().len(), 1);

    assert!(!reconciler.toggle_played(&entry));
    assert!(!reconciler.is_played(&entry));
    assert!(store.records.borrow().is_empty());
}

#[test]
fn bulk_load_suspends_list_change_reconcile() {
    let previous = feed(&[("A", "a")]);
    let store = MemoryStore::seeded(vec![record("A", "a", 0)], &previous);
    let mut reconciler = PlaybackReconciler::new(&store, policy());
    let current = feed(&[("X", "x"), ("Y", "y")]);

    reconciler.begin_bulk_load();
    assert!(reconciler.is_bulk_loading());
    assert_eq!(reconciler.on_list_changed(&current), None);
    assert_eq!(reconciler.played_records().len(), 1);
    assert_eq!(reconciler.snapshot(), items(&previous).as_slice());

    reconciler.end_bulk_load();
    let outcome = reconciler
        .on_list_changed(&current)
        .expect("reconcile runs after bulk load ends");
    assert_eq!(outcome.dropped, 1);
}

#[test]
fn state_survives_new_reconciler_on_same_store() {
    let store = MemoryStore::default();
    let list = feed(&[("A", "a"), ("B", "b")]);
    {
        let mut reconciler = PlaybackReconciler::new(&store, policy());
        reconciler.reconcile(&list);
        reconciler.mark_played(&list[0]);
    }

    let reconciler = PlaybackReconciler::new(&store, policy());
    assert!(reconciler.is_played(&list[0]));
    assert_eq!(reconciler.snapshot(), items(&list).as_slice());
}

#[test]
fn storage_failures_do_not_stop_in_memory_tracking() {
    let mut reconciler = PlaybackReconciler::new(FailingStore, policy());
    let list = feed(&[("A", "a"), ("B", "b")]);

    reconciler.reconcile(&list);
    assert!(reconciler.mark_played(&list[1]));
    assert!(reconciler.is_played(&list[1]));

    let shifted = feed(&[("X", "x"), ("A", "a"), ("B", "b")]);
    let outcome = reconciler.reconcile(&shifted);
    assert_eq!(outcome.marked, vec![2]);
}

#[test]
fn reset_clears_records_and_snapshot() {
    let list = feed(&[("A", "a")]);
    let store = MemoryStore::seeded(vec![record("A", "a", 0)], &list);
    let mut reconciler = PlaybackReconciler::new(&store, policy());

    reconciler.reset();

    assert!(reconciler.played_records().is_empty());
    assert!(reconciler.snapshot().is_empty());
    assert!(store.records.borrow().is_empty());
    assert!(store.snapshot.borrow().is_empty());
}

#[test]
fn sync_feed_reconciles_on_membership_change_only() {
    let store = MemoryStore::default();
    let mut reconciler = PlaybackReconciler::new(&store, policy());
    let first = feed(&[("A", "a"), ("B", "b")]);
    let mut source = MemoryFeed {
        items: first.clone(),
        changed: true,
    };
    let mut entries = Vec::new();

    let message = sync_feed(&mut source, &mut reconciler, &mut entries).expect("first sync");
    assert!(message.is_some_and(|text| text.starts_with("Offset 0")));
    assert_eq!(entries, first);
    reconciler.mark_played(&entries[0]);

    assert_eq!(
        sync_feed(&mut source, &mut reconciler, &mut entries).expect("idle sync"),
        None
    );

    source.replace(feed(&[("X", "x"), ("A", "a"), ("B", "b")]));
    let message = sync_feed(&mut source, &mut reconciler, &mut entries).expect("second sync");
    assert_eq!(
        message.as_deref(),
        Some("Offset 1: 1 played marker(s) reapplied, 0 stale record(s) dropped.")
    );
    assert!(reconciler.is_played(&entries[1]));
}

#[test]
fn sync_feed_updates_list_but_not_state_while_holding() {
    let store = MemoryStore::default();
    let mut reconciler = PlaybackReconciler::new(&store, policy());
    let mut source = MemoryFeed {
        items: feed(&[("A", "a")]),
        changed: true,
    };
    let mut entries = Vec::new();

    reconciler.begin_bulk_load();
    let message = sync_feed(&mut source, &mut reconciler, &mut entries)
        .expect("sync")
        .expect("change reported");
    assert!(message.contains("holding"));
    assert_eq!(entries.len(), 1);
    assert!(reconciler.snapshot().is_empty());
}

#[test]
fn play_all_marks_from_index_to_head_skipping_tier() {
    let mut entries = feed(&[("A", "a"), ("T", "t"), ("C", "c"), ("D", "d")]);
    entries[1].tier = true;
    entries[2].category = "채팅".to_string();
    let store = MemoryStore::default();
    let mut reconciler = PlaybackReconciler::new(&store, policy());

    let summary = play_all(&entries, &mut reconciler, 3).expect("play all");

    assert_eq!(
        summary,
        PlayAllSummary {
            marked: 2,
            already_played: 0,
            skipped_tier: 1,
            unplayed_tier_above: true,
            reached_head: true,
        }
    );
    assert_eq!(
        reconciler.played_records(),
        &[record("D", "d", 3), record("A", "a", 0)]
    );
}

#[test]
fn play_all_counts_already_played_and_rejects_bad_index() {
    let entries = feed(&[("A", "a"), ("B", "b"), ("C", "c")]);
    let store = MemoryStore::default();
    let mut reconciler = PlaybackReconciler::new(&store, policy());
    reconciler.mark_played(&entries[1]);

    let summary = play_all(&entries, &mut reconciler, 1).expect("play all");
    assert_eq!(summary.marked, 1);
    assert_eq!(summary.already_played, 1);
    assert!(!summary.unplayed_tier_above);
    assert!(summary.reached_head);

    let err = play_all(&entries, &mut reconciler, 9).expect_err("index out of range");
    assert!(err.to_string().contains("index 9"));
}

#[test]
fn head_index_skips_tier_and_other_categories() {
    let mut entries = feed(&[("T", "t"), ("C", "c"), ("A", "a")]);
    entries[0].tier = true;
    entries[1].category = "채팅".to_string();
    assert_eq!(head_index(&entries, &policy()), Some(2));
    assert_eq!(head_index(&entries[..2], &policy()), None);
}

#[test]
fn unplayed_filters_played_and_sorts() {
    let mut entries = feed(&[("beta", "zed"), ("Alpha", "amy"), ("gamma", "bob"), ("chat", "c")]);
    entries[3].category = "채팅".to_string();
    let store = MemoryStore::default();
    let mut reconciler = PlaybackReconciler::new(&store, policy());
    reconciler.mark_played(&entries[2]);

    let in_feed: Vec<&str> = unplayed(&entries, &reconciler, SortKey::Feed)
        .iter()
        .map(|entry| entry.title.as_str())
        .collect();
    assert_eq!(in_feed, vec!["beta", "Alpha"]);

    let by_title: Vec<&str> = unplayed(&entries, &reconciler, SortKey::Title)
        .iter()
        .map(|entry| entry.title.as_str())
        .collect();
    assert_eq!(by_title, vec!["Alpha", "beta"]);

    let by_nickname: Vec<&str> = unplayed(&entries, &reconciler, SortKey::Nickname)
        .iter()
        .map(|entry| entry.nickname.as_str())
        .collect();
    assert_eq!(by_nickname, vec!["amy", "zed"]);
}

#[test]
fn next_unplayed_wraps_to_top() {
    let entries = feed(&[("A", "a"), ("B", "b"), ("C", "c")]);
    let store = MemoryStore::default();
    let mut reconciler = PlaybackReconciler::new(&store, policy());
    reconciler.mark_played(&entries[1]);

    assert_eq!(next_unplayed(&entries, &reconciler, None), Some(0));
    assert_eq!(next_unplayed(&entries, &reconciler, Some(0)), Some(2));
    assert_eq!(next_unplayed(&entries, &reconciler, Some(2)), Some(0));

    reconciler.mark_played(&entries[0]);
    reconciler.mark_played(&entries[2]);
    assert_eq!(next_unplayed(&entries, &reconciler, Some(1)), None);
}

#[test]
fn search_folds_case_and_whitespace() {
    let entries = feed(&[
        ("Never Gonna Give You Up", "Rick Fan"),
        ("lofi beats", "night owl"),
    ]);

    let titles = |query: &str, field: SearchField| -> Vec<usize> {
        search(&entries, &policy(), query, field)
            .iter()
            .map(|entry| entry.index)
            .collect()
    };
    assert_eq!(titles("gonnagive", SearchField::All), vec![0]);
    assert_eq!(titles("  NIGHT   owl ", SearchField::All), vec![1]);
    assert_eq!(titles("rickfan", SearchField::Title), Vec::<usize>::new());
    assert_eq!(titles("rickfan", SearchField::Nickname), vec![0]);
    assert_eq!(titles("lofi", SearchField::Nickname), Vec::<usize>::new());
    assert_eq!(titles("   ", SearchField::All), Vec::<usize>::new());
}

#[test]
fn search_only_returns_video_donations() {
    let mut entries = feed(&[("song request", "a"), ("song request", "b"), ("song", "c")]);
    entries[0].category = "채팅".to_string();
    entries[2].tier = true;

    let found: Vec<&str> = search(&entries, &policy(), "song", SearchField::Title)
        .iter()
        .map(|entry| entry.nickname.as_str())
        .collect();
    assert_eq!(found, vec!["b", "c"]);
}

#[test]
fn cycle_position_wraps_both_ways() {
    let positions = [1, 4, 7];
    assert_eq!(cycle_position(&positions, None, true), Some(1));
    assert_eq!(cycle_position(&positions, None, false), Some(7));
    assert_eq!(cycle_position(&positions, Some(4), true), Some(7));
    assert_eq!(cycle_position(&positions, Some(7), true), Some(1));
    assert_eq!(cycle_position(&positions, Some(5), false), Some(4));
    assert_eq!(cycle_position(&positions, Some(1), false), Some(7));
    assert_eq!(cycle_position(&[], Some(3), true), None);
}

#[test]
fn video_link_extracts_youtube_id() {
    assert_eq!(
        video_link("https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg").as_deref(),
        Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
    );
    assert_eq!(
        video_link(r#"url("https://i.ytimg.com/vi/ab_c-1/0.jpg")"#).as_deref(),
        Some("https://www.youtube.com/watch?v=ab_c-1")
    );
    assert_eq!(video_link("https://example.com/clip/thumb.jpg"), None);
    assert_eq!(video_link("https://i.ytimg.com/vi//x.jpg"), None);
    assert_eq!(video_link(""), None);
}

#[test]
fn entry_at_reports_feed_length() {
    let entries = feed(&[("A", "a")]);
    assert_eq!(entry_at(&entries, 0).expect("first entry").title, "A");
    let err = entry_at(&entries, 1).expect_err("out of range");
    assert!(err.to_string().contains("1 item(s)"));
}

#[test]
fn summaries_describe_outcomes() {
    let outcome = ReconcileOutcome {
        offset: 2,
        marked: vec![2, 5],
        dropped: 1,
    };
    assert_eq!(
        reconcile_summary(&outcome),
        "Offset 2: 2 played marker(s) reapplied, 1 stale record(s) dropped."
    );

    let message = play_all_message(&PlayAllSummary {
        marked: 3,
        already_played: 1,
        skipped_tier: 0,
        unplayed_tier_above: true,
        reached_head: true,
    });
    assert!(message.starts_with("Marked 3 video(s) played"));
    assert!(message.contains("unplayed tier video"));
    assert!(message.ends_with("Reached the newest video in the queue."));
}

#[test]
fn truncate_keeps_short_text() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a longer title here", 10), "a longe...");
}

#[test]
fn status_label_prefers_played_marker() {
    let mut entry = video("A", "a", 0);
    assert_eq!(status_label(&entry, false), "");
    assert_eq!(status_label(&entry, true), PLAYED_LABEL);
    entry.tier = true;
    assert_eq!(status_label(&entry, false), TIER_LABEL);
}

#[test]
fn format_updated_display_passes_through_unparseable_values() {
    assert_eq!(format_updated_display("not a timestamp"), "not a timestamp");
    assert!(format_updated_display("2026-01-02T03:04:05+00:00").starts_with("2026-01-0"));
}

#[test]
fn display_nickname_marks_missing_values() {
    assert_eq!(display_nickname(""), "-");
    assert_eq!(display_nickname("viewer"), "viewer");
}
