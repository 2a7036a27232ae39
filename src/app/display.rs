use chrono::{DateTime, Local};

use super::feed::FeedEntry;

pub(crate) const PLAYED_LABEL: &str = "✅";
pub(crate) const TIER_LABEL: &str = "2️⃣";

pub(crate) fn truncate(s: &str, max: usize) -> String {
    let mut out = s.to_string();
    if out.chars().count() > max {
        out = out.chars().take(max.saturating_sub(3)).collect::<String>() + "...";
    }
    out
}

pub(crate) fn format_updated_display(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| {
            dt.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M %:z")
                .to_string()
        })
        .unwrap_or_else(|_| raw.to_string())
}

pub(crate) fn status_label(entry: &FeedEntry, played: bool) -> &'static str {
    if played {
        PLAYED_LABEL
    } else if entry.tier {
        TIER_LABEL
    } else {
        ""
    }
}

pub(crate) fn display_nickname(nickname: &str) -> &str {
    if nickname.is_empty() { "-" } else { nickname }
}
