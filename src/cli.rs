use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "feedmark",
    version,
    about = "Track played videos in a donation queue feed"
)]
pub struct Cli {
    /// SQLite database holding played state (defaults to the data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Settings file (defaults to the config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn is_interactive(&self) -> bool {
        matches!(self.command, Command::Tui { .. })
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconcile and print the feed with played markers
    Show { feed: PathBuf },
    /// Reconcile stored played state against the feed
    Reconcile { feed: PathBuf },
    /// Mark the item at INDEX as played
    Mark { feed: PathBuf, index: usize },
    /// Remove the played mark from the item at INDEX
    Unmark { feed: PathBuf, index: usize },
    /// Mark every video from INDEX up to the head of the queue as played
    PlayAll { feed: PathBuf, index: usize },
    /// List videos that have not been played yet
    Unplayed {
        feed: PathBuf,
        #[arg(long, value_enum, default_value_t = SortKey::Feed)]
        sort: SortKey,
    },
    /// Find videos whose text contains QUERY (case and whitespace ignored)
    Search {
        feed: PathBuf,
        query: String,
        #[arg(long, value_enum, default_value_t = SearchField::All)]
        field: SearchField,
    },
    /// List stored played records
    List,
    /// Forget all played records and the stored snapshot
    Reset,
    /// Poll the feed and reconcile whenever its membership changes
    Watch { feed: PathBuf },
    /// Interactive queue view
    Tui { feed: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Feed,
    Title,
    Nickname,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchField {
    All,
    Nickname,
    Title,
}

impl SearchField {
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Nickname => "nickname",
            Self::Title => "title",
        }
    }
}
