use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use url::Url;

use crate::i18n::Locale;
use crate::model::VoteType;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProgressMode {
    /// Enable progress UI when stderr is a TTY.
    Auto,
    /// Always enable progress UI (even when piped).
    Always,
    /// Never show progress UI.
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    Up,
    Down,
}

impl From<Direction> for VoteType {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Up => VoteType::Up,
            Direction::Down => VoteType::Down,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct CommonArgs {
    /// GraphQL endpoint of the backend (e.g. `https://api.example.com/graphql`).
    #[arg(long, global = true, default_value = "http://localhost:4000/graphql")]
    pub endpoint: Url,

    /// Bearer token sent with every request.
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// HTTP User-Agent.
    #[arg(long, global = true, default_value = "habla-feed/0.1")]
    pub user_agent: String,

    /// Request timeout in seconds. Unset means requests may wait indefinitely.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Directory holding the local key-value cache.
    #[arg(long, global = true, default_value = ".habla-cache")]
    pub cache_dir: PathBuf,

    /// Ignore a cached timeline older than this many seconds. Unset keeps it until replaced.
    #[arg(long, global = true)]
    pub cache_max_age_secs: Option<u64>,

    /// Latitude of the caller; requires `--longitude`.
    #[arg(long, global = true, requires = "longitude", allow_hyphen_values = true)]
    pub latitude: Option<f64>,

    /// Longitude of the caller; requires `--latitude`.
    #[arg(long, global = true, requires = "latitude", allow_hyphen_values = true)]
    pub longitude: Option<f64>,

    /// Message language.
    #[arg(long, global = true, value_enum, default_value = "en")]
    pub locale: Locale,

    /// Progress display: `auto`, `always`, or `never`.
    #[arg(long, global = true, value_enum, default_value = "auto")]
    pub progress: ProgressMode,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the timeline (cache first, then network) and print or render it.
    Timeline {
        /// Channel id for a channel-scoped timeline; the root feed when omitted.
        #[arg(long)]
        channel_id: Option<String>,

        /// Channel name shown in the title of a channel-scoped timeline.
        #[arg(long, requires = "channel_id")]
        channel_name: Option<String>,

        /// Write an HTML page here instead of printing text.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Cast a vote on a post and print the server's tally.
    Vote {
        /// Post identifier.
        post_id: String,

        #[arg(value_enum)]
        direction: Direction,
    },
}
