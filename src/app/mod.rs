mod display;
pub(crate) mod feed;
mod queue;
pub(crate) mod reconcile;
mod tui;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::cli::{Cli, Command, SearchField, SortKey};
use crate::config::{Settings, load_settings};
use crate::db::{Database, PLAYED_RECORDS_KEY};
use crate::paths::{config_file_path, database_file_path};

use self::display::{display_nickname, format_updated_display, status_label, truncate};
use self::feed::{FeedEntry, FeedSource, FileFeed};
use self::queue::{
    PlayAllSummary, entry_at, head_index, play_all, search, unplayed, video_link,
};
use self::reconcile::{PlaybackReconciler, ReconcileOutcome, Store};

pub fn run(cli: Cli) -> Result<()> {
    let settings = match cli.config.as_deref() {
        Some(path) => load_settings(path)?,
        None => load_settings(&config_file_path()?)?,
    };
    let db = open_db(cli.db.as_deref())?;

    match cli.command {
        Command::Show { feed } => run_show(&db, &settings, &feed)?,
        Command::Reconcile { feed } => run_reconcile(&db, &settings, &feed)?,
        Command::Mark { feed, index } => run_mark(&db, &settings, &feed, index, true)?,
        Command::Unmark { feed, index } => run_mark(&db, &settings, &feed, index, false)?,
        Command::PlayAll { feed, index } => run_play_all(&db, &settings, &feed, index)?,
        Command::Unplayed { feed, sort } => run_unplayed(&db, &settings, &feed, sort)?,
        Command::Search { feed, query, field } => {
            run_search(&db, &settings, &feed, &query, field)?
        }
        Command::List => run_list(&db)?,
        Command::Reset => run_reset(&db, &settings)?,
        Command::Watch { feed } => run_watch(&db, &settings, &feed)?,
        Command::Tui { feed } => tui::run_tui(&db, &settings, &feed)?,
    }

    Ok(())
}

/// Reads the feed once and brings the stored played state in line with it.
fn open_session<'a>(
    db: &'a Database,
    settings: &Settings,
    feed_path: &Path,
) -> Result<(PlaybackReconciler<&'a Database>, Vec<FeedEntry>, ReconcileOutcome)> {
    let entries = FileFeed::open(feed_path, settings).current_items()?;
    let mut reconciler = PlaybackReconciler::new(db, settings.match_policy());
    let outcome = reconciler.reconcile(&entries);
    Ok((reconciler, entries, outcome))
}

fn run_show(db: &Database, settings: &Settings, feed_path: &Path) -> Result<()> {
    let (reconciler, entries, _) = open_session(db, settings, feed_path)?;
    if entries.is_empty() {
        println!("Feed is empty: {}", feed_path.display());
        return Ok(());
    }
    print_entries(&entries, &reconciler);
    Ok(())
}

fn run_reconcile(db: &Database, settings: &Settings, feed_path: &Path) -> Result<()> {
    let (reconciler, _, outcome) = open_session(db, settings, feed_path)?;
    println!("{}", reconcile_summary(&outcome));
    println!(
        "{} item(s) captured as the new baseline, {} played record(s) kept.",
        reconciler.snapshot().len(),
        reconciler.played_records().len()
    );
    Ok(())
}

fn run_mark(
    db: &Database,
    settings: &Settings,
    feed_path: &Path,
    index: usize,
    played: bool,
) -> Result<()> {
    let (mut reconciler, entries, _) = open_session(db, settings, feed_path)?;
    let entry = entry_at(&entries, index)?;
    let label = format!(
        "{} / {}",
        display_nickname(&entry.nickname),
        truncate(&entry.title, 50)
    );

    if played {
        if !reconciler.policy().is_tracked(entry) {
            bail!("only video donations outside the tier list can be marked: {label}");
        }
        if !reconciler.mark_played(entry) {
            println!("Already marked played: {label}");
            return Ok(());
        }
        println!("Marked played: {label}");
        if head_index(&entries, reconciler.policy()) == Some(index) {
            println!("That was the newest video in the queue.");
        }
    } else if reconciler.unmark(entry) {
        println!("Unmarked: {label}");
    } else {
        println!("Not marked played: {label}");
    }
    Ok(())
}

fn run_play_all(db: &Database, settings: &Settings, feed_path: &Path, index: usize) -> Result<()> {
    let (mut reconciler, entries, _) = open_session(db, settings, feed_path)?;
    let summary = play_all(&entries, &mut reconciler, index)?;
    println!("{}", play_all_message(&summary));
    Ok(())
}

fn run_unplayed(db: &Database, settings: &Settings, feed_path: &Path, sort: SortKey) -> Result<()> {
    let (reconciler, entries, _) = open_session(db, settings, feed_path)?;
    let results = unplayed(&entries, &reconciler, sort);
    if results.is_empty() {
        println!("No unplayed videos.");
        return Ok(());
    }

    println!("{:<6} {:<20} {:<40} {}", "#", "NICKNAME", "TITLE", "LINK");
    for entry in &results {
        println!(
            "{:<6} {:<20} {:<40} {}",
            entry.index,
            truncate(display_nickname(&entry.nickname), 20),
            truncate(&entry.title, 40),
            video_link(&entry.thumbnail).unwrap_or_default()
        );
    }
    println!("\n{} unplayed video(s).", results.len());
    Ok(())
}

fn run_search(
    db: &Database,
    settings: &Settings,
    feed_path: &Path,
    query: &str,
    field: SearchField,
) -> Result<()> {
    if query.trim().is_empty() {
        bail!("search query is empty");
    }
    let (reconciler, entries, _) = open_session(db, settings, feed_path)?;
    let results = search(&entries, reconciler.policy(), query, field);
    if results.is_empty() {
        println!("No videos match \"{query}\" ({}).", field.label());
        return Ok(());
    }

    println!(
        "{:<6} {:<6} {:<20} {:<40} {}",
        "#", "MARK", "NICKNAME", "TITLE", "LINK"
    );
    for entry in &results {
        println!(
            "{:<6} {:<6} {:<20} {:<40} {}",
            entry.index,
            status_label(entry, reconciler.is_played(entry)),
            truncate(display_nickname(&entry.nickname), 20),
            truncate(&entry.title, 40),
            video_link(&entry.thumbnail).unwrap_or_default()
        );
    }
    println!("\n{} match(es).", results.len());
    Ok(())
}

fn run_list(db: &Database) -> Result<()> {
    let records = db.load_played_records()?;
    if records.is_empty() {
        println!("No played records yet. Run `feedmark mark` first.");
        return Ok(());
    }

    println!("{:<6} {:<20} {:<40}", "INDEX", "NICKNAME", "TITLE");
    for record in &records {
        println!(
            "{:<6} {:<20} {:<40}",
            record.index,
            truncate(display_nickname(&record.nickname), 20),
            truncate(&record.title, 40)
        );
    }
    if let Some(stored) = db.get_value(PLAYED_RECORDS_KEY)? {
        println!(
            "\nLast updated: {}",
            format_updated_display(&stored.updated_at)
        );
    }
    Ok(())
}

fn run_reset(db: &Database, settings: &Settings) -> Result<()> {
    let mut reconciler = PlaybackReconciler::new(db, settings.match_policy());
    let forgotten = reconciler.played_records().len();
    reconciler.reset();
    println!("Forgot {forgotten} played record(s) and the stored snapshot.");
    Ok(())
}

fn run_watch(db: &Database, settings: &Settings, feed_path: &Path) -> Result<()> {
    let mut reconciler = PlaybackReconciler::new(db, settings.match_policy());
    let mut feed = FileFeed::open(feed_path, settings);
    let mut entries = Vec::new();
    let interval = Duration::from_millis(settings.poll_interval_ms.max(50));

    info!(path = %feed.path().display(), "watching feed");
    println!("Watching {} (Ctrl-C to stop)", feed.path().display());
    loop {
        match sync_feed(&mut feed, &mut reconciler, &mut entries) {
            Ok(Some(message)) => println!("{message}"),
            Ok(None) => {}
            Err(err) => warn!("feed poll failed: {err:#}"),
        }
        thread::sleep(interval);
    }
}

/// Polls `feed` and reconciles when its membership changed. Returns a status
/// line when the list was replaced.
pub(crate) fn sync_feed<F: FeedSource, S: Store>(
    feed: &mut F,
    reconciler: &mut PlaybackReconciler<S>,
    entries: &mut Vec<FeedEntry>,
) -> Result<Option<String>> {
    let mut message = None;
    feed.poll_changes(&mut |fresh: &[FeedEntry]| {
        *entries = fresh.to_vec();
        message = Some(match reconciler.on_list_changed(fresh) {
            Some(outcome) => reconcile_summary(&outcome),
            None => format!("Feed changed ({} items) while holding.", fresh.len()),
        });
    })?;
    Ok(message)
}

fn print_entries<S: Store>(entries: &[FeedEntry], reconciler: &PlaybackReconciler<S>) {
    println!(
        "{:<6} {:<6} {:<20} {:<40} {}",
        "#", "MARK", "NICKNAME", "TITLE", "CATEGORY"
    );
    for entry in entries {
        println!(
            "{:<6} {:<6} {:<20} {:<40} {}",
            entry.index,
            status_label(entry, reconciler.is_played(entry)),
            truncate(display_nickname(&entry.nickname), 20),
            truncate(&entry.title, 40),
            entry.category
        );
    }
}

pub(crate) fn reconcile_summary(outcome: &ReconcileOutcome) -> String {
    format!(
        "Offset {}: {} played marker(s) reapplied, {} stale record(s) dropped.",
        outcome.offset,
        outcome.marked.len(),
        outcome.dropped
    )
}

pub(crate) fn play_all_message(summary: &PlayAllSummary) -> String {
    let mut message = format!(
        "Marked {} video(s) played ({} already played, {} tier video(s) skipped).",
        summary.marked, summary.already_played, summary.skipped_tier
    );
    if summary.unplayed_tier_above {
        message.push_str("\nWarning: an unplayed tier video sits above the starting point.");
    }
    if summary.reached_head {
        message.push_str("\nReached the newest video in the queue.");
    }
    message
}

fn open_db(custom: Option<&Path>) -> Result<Database> {
    let db = match custom {
        Some(path) => Database::open(path)?,
        None => Database::open(&database_file_path()?)?,
    };
    db.migrate()?;
    Ok(db)
}
