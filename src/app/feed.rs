use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Settings;

/// One element of a feed file as another process wrote it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct RawFeedEntry {
    pub(crate) title: String,
    pub(crate) nickname: String,
    pub(crate) category: String,
    pub(crate) secondary: String,
    pub(crate) tier: bool,
    pub(crate) thumbnail: String,
}

/// A feed observation. Identity is `(title, nickname)`; `index` is only the
/// position at the time it was read.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct FeedItem {
    pub(crate) title: String,
    pub(crate) nickname: String,
    pub(crate) index: usize,
}

impl FeedItem {
    pub(crate) fn same_content(&self, other: &FeedItem) -> bool {
        self.title == other.title && self.nickname == other.nickname
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FeedEntry {
    pub(crate) title: String,
    pub(crate) nickname: String,
    pub(crate) index: usize,
    pub(crate) category: String,
    pub(crate) tier: bool,
    pub(crate) thumbnail: String,
}

impl FeedEntry {
    pub(crate) fn item(&self) -> FeedItem {
        FeedItem {
            title: self.title.clone(),
            nickname: self.nickname.clone(),
            index: self.index,
        }
    }
}

pub(crate) fn normalize(raw: Vec<RawFeedEntry>, settings: &Settings) -> Vec<FeedEntry> {
    raw.into_iter()
        .enumerate()
        .map(|(index, entry)| normalize_entry(entry, index, settings))
        .collect()
}

fn normalize_entry(raw: RawFeedEntry, index: usize, settings: &Settings) -> FeedEntry {
    let raw_nickname = raw.nickname.trim();
    let nickname = strip_once(
        &strip_once(raw_nickname, &settings.played_marker),
        &settings.tier_marker,
    )
    .trim()
    .to_string();
    let category = raw.category.trim().to_string();

    let listed = category == settings.video_category
        && raw.secondary.trim() != settings.anonymous_label
        && settings.tier_nicknames.iter().any(|name| name == &nickname);
    let tier = raw.tier
        || (!settings.tier_marker.is_empty() && raw_nickname.contains(&settings.tier_marker))
        || listed;

    FeedEntry {
        title: raw.title.trim().to_string(),
        nickname,
        index,
        category,
        tier,
        thumbnail: raw.thumbnail.trim().to_string(),
    }
}

fn strip_once(text: &str, marker: &str) -> String {
    if marker.is_empty() {
        return text.to_string();
    }
    text.replacen(marker, "", 1)
}

pub(crate) fn parse_feed(raw: &str) -> Result<Vec<RawFeedEntry>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let entries: Vec<RawFeedEntry> = serde_json::from_str(raw)?;
    Ok(entries)
}

/// Source of the live list.
pub(crate) trait FeedSource {
    fn current_items(&self) -> Result<Vec<FeedEntry>>;

    /// Calls `on_change` with the fresh list when the ordered
    /// `(title, nickname)` sequence differs from the previous poll. The first
    /// poll always reports.
    fn poll_changes(&mut self, on_change: &mut dyn FnMut(&[FeedEntry])) -> Result<bool>;
}

/// Rewrites inside the same mtime tick keep the signature, so a signature is
/// only trusted once the file was read this long after its mtime.
const SIG_SETTLE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FeedFileSig {
    len: u64,
    modified_ns: u128,
}

impl FeedFileSig {
    fn settled_at(&self, read_ns: u128) -> bool {
        self.modified_ns != 0 && read_ns >= self.modified_ns + SIG_SETTLE.as_nanos()
    }
}

/// JSON feed file rewritten by another process.
pub(crate) struct FileFeed {
    path: PathBuf,
    settings: Settings,
    last_sig: Option<Option<FeedFileSig>>,
    sig_settled: bool,
    last_membership: Option<Vec<(String, String)>>,
}

impl FileFeed {
    pub(crate) fn open(path: &Path, settings: &Settings) -> Self {
        Self {
            path: path.to_path_buf(),
            settings: settings.clone(),
            last_sig: None,
            sig_settled: false,
            last_membership: None,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl FeedSource for FileFeed {
    fn current_items(&self) -> Result<Vec<FeedEntry>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read feed at {}", self.path.display()));
            }
        };
        let entries = parse_feed(&raw)
            .with_context(|| format!("invalid feed JSON in {}", self.path.display()))?;
        Ok(normalize(entries, &self.settings))
    }

    fn poll_changes(&mut self, on_change: &mut dyn FnMut(&[FeedEntry])) -> Result<bool> {
        let sig = feed_file_sig(&self.path);
        if self.last_sig == Some(sig) && self.sig_settled {
            return Ok(false);
        }

        let read_ns = unix_nanos(SystemTime::now());
        let items = self.current_items()?;
        self.last_sig = Some(sig);
        self.sig_settled = sig.is_none_or(|sig| sig.settled_at(read_ns));
        let membership = membership_of(&items);
        if self.last_membership.as_ref() == Some(&membership) {
            debug!(path = %self.path.display(), "feed rewritten without membership change");
            return Ok(false);
        }

        debug!(path = %self.path.display(), items = items.len(), "feed membership changed");
        self.last_membership = Some(membership);
        on_change(&items);
        Ok(true)
    }
}

fn membership_of(items: &[FeedEntry]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|item| (item.title.clone(), item.nickname.clone()))
        .collect()
}

fn unix_nanos(time: SystemTime) -> u128 {
    time.duration_since(UNIX_EPOCH)
        .map(|dur| dur.as_nanos())
        .unwrap_or(0)
}

fn feed_file_sig(path: &Path) -> Option<FeedFileSig> {
    let meta = fs::metadata(path).ok()?;
    let modified_ns = meta.modified().map(unix_nanos).unwrap_or(0);
    Some(FeedFileSig {
        len: meta.len(),
        modified_ns,
    })
}
