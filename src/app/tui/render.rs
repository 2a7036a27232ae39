use std::path::Path;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Clear, Gauge, Padding, Paragraph, Row, Table, TableState,
    Wrap,
};

use super::super::display::{display_nickname, status_label, truncate};
use super::super::feed::FeedEntry;
use super::super::queue::video_link;
use super::{PendingNotice, PendingPlayAll, SearchPrompt, ViewMode};

pub(super) struct QueueFrame<'a> {
    pub(super) feed_path: &'a Path,
    pub(super) entries: &'a [FeedEntry],
    pub(super) played: &'a [bool],
    pub(super) tracked: &'a [bool],
    pub(super) rows: &'a [usize],
    pub(super) view: ViewMode,
    pub(super) holding: bool,
    pub(super) status: &'a str,
    pub(super) pending_play_all: Option<&'a PendingPlayAll>,
    pub(super) pending_notice: Option<&'a PendingNotice>,
    pub(super) search_prompt: Option<&'a SearchPrompt>,
}

impl QueueFrame<'_> {
    fn is_played(&self, idx: usize) -> bool {
        self.played.get(idx).copied().unwrap_or(false)
    }
}

pub(super) fn draw_tui(frame: &mut Frame, state: &QueueFrame<'_>, table_state: &mut TableState) {
    let bg = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(bg, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let played_count = state.played.iter().filter(|played| **played).count();
    let mut header_spans = vec![
        Span::styled(
            "FEEDMARK",
            Style::default()
                .fg(Color::Rgb(110, 170, 255))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(
            format!("{} items", state.entries.len()),
            Style::default().fg(Color::Rgb(185, 195, 210)),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(
            format!("{played_count} played"),
            Style::default().fg(Color::Rgb(185, 195, 210)),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(state.view.label(), Style::default().fg(Color::Yellow)),
    ];
    if state.holding {
        header_spans.push(Span::styled("   ", Style::default()));
        header_spans.push(Span::styled(
            "HOLDING",
            Style::default()
                .fg(Color::Rgb(255, 145, 120))
                .add_modifier(Modifier::BOLD),
        ));
    }
    let header = Paragraph::new(Line::from(header_spans))
        .alignment(Alignment::Center)
        .block(panel_block("Queue"));
    frame.render_widget(header, chunks[0]);

    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(64), Constraint::Percentage(36)])
        .split(chunks[1]);
    let details_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(3)])
        .split(body_chunks[1]);

    let rows: Vec<Row> = state
        .rows
        .iter()
        .filter_map(|&idx| state.entries.get(idx))
        .map(|entry| {
            let style = if entry.tier {
                Style::default().fg(Color::Rgb(255, 145, 120))
            } else if state.is_played(entry.index) {
                Style::default().fg(Color::Rgb(115, 227, 115))
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(entry.index.to_string()),
                Cell::from(status_label(entry, state.is_played(entry.index))),
                Cell::from(display_nickname(&entry.nickname).to_string()),
                Cell::from(entry.title.clone()),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(4),
            Constraint::Length(20),
            Constraint::Min(20),
        ],
    )
    .header(
        Row::new(vec!["#", "", "Nickname", "Title"]).style(
            Style::default()
                .fg(Color::Rgb(110, 170, 255))
                .add_modifier(Modifier::BOLD),
        ),
    )
    .block(panel_block("Feed"))
    .row_highlight_style(
        Style::default()
            .bg(Color::Rgb(110, 170, 255))
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("▸ ");
    frame.render_stateful_widget(table, body_chunks[0], table_state);

    let selected = table_state
        .selected()
        .and_then(|row| state.rows.get(row))
        .and_then(|&idx| state.entries.get(idx));
    let selection_text = match selected {
        Some(entry) => {
            let played = if state.is_played(entry.index) {
                "played"
            } else if entry.tier {
                "tier (not tracked)"
            } else {
                "not played"
            };
            let mut text = format!(
                "Title\n{}\n\nNickname\n{}\n\nPosition\n{}\n\nCategory\n{}\n\nStatus\n{}",
                truncate(&entry.title, 40),
                truncate(display_nickname(&entry.nickname), 28),
                entry.index,
                truncate(&entry.category, 28),
                played,
            );
            if let Some(link) = video_link(&entry.thumbnail) {
                text.push_str(&format!("\n\nLink\n{link}"));
            }
            text
        }
        None => format!(
            "Feed is empty.\n\nWaiting for {}",
            truncate(&state.feed_path.display().to_string(), 40)
        ),
    };
    let selection = Paragraph::new(selection_text)
        .style(Style::default().fg(Color::Rgb(230, 230, 230)))
        .block(panel_block("Selected"))
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Left);
    frame.render_widget(selection, details_chunks[0]);

    if let Some((ratio, label)) = played_progress(state) {
        let progress = Gauge::default()
            .block(panel_block("Progress"))
            .gauge_style(
                Style::default()
                    .fg(Color::Rgb(130, 190, 255))
                    .bg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            )
            .label(label)
            .ratio(ratio);
        frame.render_widget(progress, details_chunks[1]);
    }

    let command_bar = Paragraph::new(view_selector_line(state.view))
        .alignment(Alignment::Center)
        .block(panel_block("Controls"));
    frame.render_widget(command_bar, chunks[2]);

    let status_widget = Paragraph::new(state.status.to_string())
        .style(status_style(state.status))
        .block(panel_block("Status"));
    frame.render_widget(status_widget, chunks[3]);

    if let Some(prompt) = state.search_prompt {
        let popup_text = format!(
            "Field: {}\n\n> {}_\n\n[Enter] Search   [Tab] Field   [Esc] Cancel",
            prompt.field.label(),
            prompt.query
        );
        render_popup(frame, &popup_text, "Search Videos");
    } else if let Some(confirm) = state.pending_play_all {
        let popup_text = format!(
            "Mark every video from here to the top as played?\n\n{}\n\n{} video(s) in range.\n\n[y / Enter] Mark   [n / Esc] Cancel",
            truncate(&confirm.label, 56),
            confirm.count
        );
        render_popup(frame, &popup_text, "Confirm Play All");
    } else if let Some(notice) = state.pending_notice {
        render_popup(frame, &notice.message, notice.title);
    }
}

/// Share of tracked videos that are played.
fn played_progress(state: &QueueFrame<'_>) -> Option<(f64, String)> {
    let tracked = state.tracked.iter().filter(|tracked| **tracked).count();
    if tracked == 0 {
        return None;
    }
    let played = state
        .tracked
        .iter()
        .zip(state.played)
        .filter(|(tracked, played)| **tracked && **played)
        .count();
    let ratio = (played as f64 / tracked as f64).clamp(0.0, 1.0);
    Some((ratio, format!("{played}/{tracked}")))
}

fn render_popup(frame: &mut Frame, text: &str, title: &'static str) {
    let popup_area = popup_rect_for_text(frame.area(), text);
    render_popup_shadow(frame, popup_area);
    frame.render_widget(Clear, popup_area);
    let popup = Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(modal_block(title));
    frame.render_widget(popup, popup_area);
}

fn panel_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(125, 135, 150)))
        .title(title)
}

fn modal_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(
            Style::default()
                .fg(Color::Rgb(160, 190, 235))
                .add_modifier(Modifier::BOLD),
        )
        .title(title)
        .padding(Padding::new(2, 2, 1, 1))
}

fn view_pill_style(view: ViewMode, current: ViewMode) -> Style {
    if view == current {
        Style::default()
            .bg(Color::Rgb(110, 170, 255))
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .bg(Color::Rgb(72, 82, 96))
            .fg(Color::Rgb(230, 235, 242))
    }
}

fn view_selector_line(current: ViewMode) -> Line<'static> {
    Line::from(vec![
        Span::styled(" ALL ", view_pill_style(ViewMode::All, current)),
        Span::styled(" ", Style::default()),
        Span::styled(" UNPLAYED ", view_pill_style(ViewMode::Unplayed, current)),
        Span::styled(
            "   ↑/↓ move  ←/→ view  Space mark  p play all  n next unplayed  / search  ]/[ match  h hold  r reload  q quit",
            Style::default().fg(Color::Rgb(185, 195, 210)),
        ),
    ])
}

fn status_style(status: &str) -> Style {
    if status.starts_with("ERROR:") {
        Style::default()
            .fg(Color::Rgb(255, 145, 120))
            .add_modifier(Modifier::BOLD)
    } else if status.starts_with("INFO:") {
        Style::default().fg(Color::Rgb(205, 165, 255))
    } else {
        Style::default().fg(Color::Rgb(230, 235, 242))
    }
}

fn centered_fixed_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width.max(1));
    let clamped_height = height.min(area.height.max(1));
    let x = area.x + area.width.saturating_sub(clamped_width) / 2;
    let y = area.y + area.height.saturating_sub(clamped_height) / 2;
    Rect::new(x, y, clamped_width, clamped_height)
}

fn render_popup_shadow(frame: &mut Frame, popup_area: Rect) {
    let area = frame.area();
    let shadow = Rect::new(
        (popup_area.x + 1).min(area.x + area.width.saturating_sub(1)),
        (popup_area.y + 1).min(area.y + area.height.saturating_sub(1)),
        popup_area.width.saturating_sub(1),
        popup_area.height.saturating_sub(1),
    );
    if shadow.width == 0 || shadow.height == 0 {
        return;
    }
    let shadow_block = Block::default().style(Style::default().bg(Color::Rgb(14, 16, 24)));
    frame.render_widget(shadow_block, shadow);
}

fn popup_rect_for_text(area: Rect, text: &str) -> Rect {
    let max_line_width = text
        .lines()
        .map(|line| line.chars().count() as u16)
        .max()
        .unwrap_or(0);
    let line_count = text.lines().count() as u16;

    let available_width = area.width.saturating_sub(2).max(1);
    let min_width = 48.min(available_width);
    let max_width = 72.min(available_width);
    let desired_width = max_line_width.saturating_add(12);
    let width = desired_width.clamp(min_width, max_width);

    let available_height = area.height.saturating_sub(2).max(1);
    let min_height = 10.min(available_height);
    let max_height = 18.min(available_height);
    let desired_height = line_count.saturating_add(6);
    let height = desired_height.clamp(min_height, max_height);

    centered_fixed_rect(width, height, area)
}
