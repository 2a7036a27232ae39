mod actions;
mod render;
mod session;

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::TableState;

use crate::cli::{SearchField, SortKey};
use crate::config::Settings;
use crate::db::Database;

use super::display::{display_nickname, truncate};
use super::feed::{FeedEntry, FeedSource, FileFeed};
use super::queue::{cycle_position, head_index, next_unplayed, play_all, search, unplayed};
use super::reconcile::PlaybackReconciler;
use super::{play_all_message, reconcile_summary, sync_feed};

use self::actions::{
    next_search_field, play_all_target_count, selected_entry, status_error, status_info,
    sync_selection, visible_rows,
};
use self::render::{QueueFrame, draw_tui};
use self::session::TuiSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ViewMode {
    All,
    Unplayed,
}

impl ViewMode {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Unplayed => "UNPLAYED",
        }
    }

    pub(crate) fn move_left(self) -> Self {
        Self::All
    }

    pub(crate) fn move_right(self) -> Self {
        Self::Unplayed
    }
}

#[derive(Debug, Clone)]
pub(super) struct PendingPlayAll {
    pub(super) index: usize,
    pub(super) label: String,
    pub(super) count: usize,
}

/// Query being typed after `/`.
#[derive(Debug, Clone)]
pub(super) struct SearchPrompt {
    pub(super) query: String,
    pub(super) field: SearchField,
}

#[derive(Debug, Clone)]
pub(super) struct PendingNotice {
    pub(super) title: &'static str,
    pub(super) message: String,
}

pub(crate) fn run_tui(db: &Database, settings: &Settings, feed_path: &Path) -> Result<()> {
    let mut reconciler = PlaybackReconciler::new(db, settings.match_policy());
    let mut feed = FileFeed::open(feed_path, settings);
    let poll_interval = Duration::from_millis(settings.poll_interval_ms.max(50));

    let session = TuiSession::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("failed to initialize terminal backend")?;
    terminal.clear()?;

    let mut entries: Vec<FeedEntry> = Vec::new();
    let mut table_state = TableState::default();
    let mut view = ViewMode::All;
    let mut pending_play_all = None::<PendingPlayAll>;
    let mut pending_notice = None::<PendingNotice>;
    let mut search_prompt = None::<SearchPrompt>;
    let mut active_search = None::<(String, SearchField)>;
    let mut jump_to = None::<usize>;
    let mut last_poll = None::<Instant>;
    let mut status = status_info("Loading feed...");

    loop {
        let previous_rows = visible_rows(&entries, &reconciler, view);
        let keep = jump_to
            .take()
            .or_else(|| selected_entry(&previous_rows, &table_state));

        if last_poll.is_none_or(|at| at.elapsed() >= poll_interval) {
            last_poll = Some(Instant::now());
            match sync_feed(&mut feed, &mut reconciler, &mut entries) {
                Ok(Some(message)) => status = status_info(&message),
                Ok(None) => {}
                Err(err) => status = status_error(&format!("Feed read failed: {err:#}")),
            }
        }

        let rows = visible_rows(&entries, &reconciler, view);
        sync_selection(&rows, &mut table_state, keep);
        let played: Vec<bool> = entries
            .iter()
            .map(|entry| reconciler.is_played(entry))
            .collect();
        let tracked: Vec<bool> = entries
            .iter()
            .map(|entry| reconciler.policy().is_tracked(entry))
            .collect();

        terminal.draw(|frame| {
            draw_tui(
                frame,
                &QueueFrame {
                    feed_path: feed.path(),
                    entries: &entries,
                    played: &played,
                    tracked: &tracked,
                    rows: &rows,
                    view,
                    holding: reconciler.is_bulk_loading(),
                    status: &status,
                    pending_play_all: pending_play_all.as_ref(),
                    pending_notice: pending_notice.as_ref(),
                    search_prompt: search_prompt.as_ref(),
                },
                &mut table_state,
            )
        })?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if pending_notice.is_some() {
            pending_notice = None;
            continue;
        }

        if let Some(prompt) = search_prompt.as_mut() {
            match key.code {
                KeyCode::Esc => {
                    search_prompt = None;
                    status = status_info("Search canceled.");
                }
                KeyCode::Tab => prompt.field = next_search_field(prompt.field),
                KeyCode::Backspace => {
                    prompt.query.pop();
                }
                KeyCode::Char(ch) => prompt.query.push(ch),
                KeyCode::Enter => {
                    let query = prompt.query.trim().to_string();
                    let field = prompt.field;
                    search_prompt = None;
                    if query.is_empty() {
                        status = status_error("Enter a search term.");
                        continue;
                    }
                    let matches: Vec<usize> = search(&entries, reconciler.policy(), &query, field)
                        .into_iter()
                        .map(|entry| entry.index)
                        .collect();
                    match matches.first() {
                        Some(&first) => {
                            view = ViewMode::All;
                            jump_to = Some(first);
                            status = status_info(&format!(
                                "Match 1/{} for \"{query}\" ({}). ]/[ next/previous.",
                                matches.len(),
                                field.label()
                            ));
                            active_search = Some((query, field));
                        }
                        None => {
                            active_search = None;
                            status = status_info(&format!("No videos match \"{query}\"."));
                        }
                    }
                }
                _ => {}
            }
            continue;
        }

        if let Some(dialog) = pending_play_all.as_ref() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    let from = dialog.index;
                    pending_play_all = None;
                    match play_all(&entries, &mut reconciler, from) {
                        Ok(summary) => {
                            status = status_info(&format!(
                                "Play all finished: {} marked.",
                                summary.marked
                            ));
                            pending_notice = Some(PendingNotice {
                                title: if summary.reached_head {
                                    "Queue Finished"
                                } else {
                                    "Play All"
                                },
                                message: format!(
                                    "{}\n\nPress any key to continue.",
                                    play_all_message(&summary)
                                ),
                            });
                        }
                        Err(err) => status = status_error(&format!("Play all failed: {err}")),
                    }
                }
                KeyCode::Esc | KeyCode::Char('n') => {
                    pending_play_all = None;
                    status = status_info("Play all canceled.");
                }
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') => break,
            KeyCode::Up => {
                if let Some(selected) = table_state.selected() {
                    table_state.select(Some(selected.saturating_sub(1)));
                }
            }
            KeyCode::Down => {
                if let Some(selected) = table_state.selected()
                    && !rows.is_empty()
                {
                    let next = (selected + 1).min(rows.len().saturating_sub(1));
                    table_state.select(Some(next));
                }
            }
            KeyCode::Left => view = view.move_left(),
            KeyCode::Right => view = view.move_right(),
            KeyCode::Char(' ') | KeyCode::Enter => {
                let Some(entry) = selected_entry(&rows, &table_state).and_then(|i| entries.get(i))
                else {
                    status = status_error("Nothing selected.");
                    continue;
                };
                let label = format!(
                    "{} / {}",
                    display_nickname(&entry.nickname),
                    truncate(&entry.title, 40)
                );
                if !reconciler.policy().is_tracked(entry) {
                    status = status_error(&format!("Only video donations can be marked: {label}"));
                    continue;
                }
                if reconciler.toggle_played(entry) {
                    status = if head_index(&entries, reconciler.policy()) == Some(entry.index) {
                        status_info(&format!("Marked played: {label}. Queue finished."))
                    } else {
                        status_info(&format!("Marked played: {label}"))
                    };
                } else {
                    status = status_info(&format!("Unmarked: {label}"));
                }
            }
            KeyCode::Char('p') => {
                let Some(entry) = selected_entry(&rows, &table_state).and_then(|i| entries.get(i))
                else {
                    status = status_error("Play all failed: nothing selected.");
                    continue;
                };
                pending_play_all = Some(PendingPlayAll {
                    index: entry.index,
                    label: format!(
                        "{} / {}",
                        display_nickname(&entry.nickname),
                        truncate(&entry.title, 40)
                    ),
                    count: play_all_target_count(&entries, reconciler.policy(), entry.index),
                });
                status = status_info("Confirm play all: y/Enter to mark, n/Esc to cancel.");
            }
            KeyCode::Char('n') => {
                let current = selected_entry(&rows, &table_state);
                match next_unplayed(&entries, &reconciler, current) {
                    Some(target) => {
                        if let Some(row) = rows.iter().position(|&idx| idx == target) {
                            table_state.select(Some(row));
                        }
                        let total = unplayed(&entries, &reconciler, SortKey::Feed).len();
                        status =
                            status_info(&format!("Next unplayed at #{target} ({total} unplayed)."));
                    }
                    None => status = status_info("No unplayed videos."),
                }
            }
            KeyCode::Char('/') => {
                search_prompt = Some(SearchPrompt {
                    query: String::new(),
                    field: active_search
                        .as_ref()
                        .map_or(SearchField::All, |(_, field)| *field),
                });
                status = status_info("Search: Enter to find, Tab to switch field, Esc to cancel.");
            }
            KeyCode::Char(']') | KeyCode::Char('[') => {
                let Some((query, field)) = active_search.as_ref() else {
                    status = status_info("No active search. Press / to search.");
                    continue;
                };
                let matches: Vec<usize> = search(&entries, reconciler.policy(), query, *field)
                    .into_iter()
                    .map(|entry| entry.index)
                    .collect();
                let current = selected_entry(&rows, &table_state);
                let forward = key.code == KeyCode::Char(']');
                match cycle_position(&matches, current, forward) {
                    Some(target) => {
                        let ordinal = matches.iter().position(|&idx| idx == target).unwrap_or(0) + 1;
                        view = ViewMode::All;
                        jump_to = Some(target);
                        status = status_info(&format!(
                            "Match {ordinal}/{} for \"{query}\".",
                            matches.len()
                        ));
                    }
                    None => status = status_info(&format!("No videos match \"{query}\" anymore.")),
                }
            }
            KeyCode::Char('h') => {
                if reconciler.is_bulk_loading() {
                    reconciler.end_bulk_load();
                    let outcome = reconciler.reconcile(&entries);
                    status = status_info(&format!("Resumed. {}", reconcile_summary(&outcome)));
                } else {
                    reconciler.begin_bulk_load();
                    status = status_info("Holding: feed changes are shown but not reconciled.");
                }
            }
            KeyCode::Char('r') => match feed.current_items() {
                Ok(fresh) => {
                    entries = fresh;
                    status = match reconciler.on_list_changed(&entries) {
                        Some(outcome) => status_info(&reconcile_summary(&outcome)),
                        None => status_info("Reloaded while holding; reconcile paused."),
                    };
                }
                Err(err) => status = status_error(&format!("Reload failed: {err:#}")),
            },
            _ => {}
        }
    }

    session.leave()?;
    Ok(())
}
