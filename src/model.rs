use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VoteType {
    Up,
    Down,
}

impl VoteType {
    pub fn as_tag(self) -> &'static str {
        match self {
            VoteType::Up => "UP",
            VoteType::Down => "DOWN",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown vote direction {0:?}")]
pub struct UnknownVoteType(pub String);

impl FromStr for VoteType {
    type Err = UnknownVoteType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UP" => Ok(VoteType::Up),
            "DOWN" => Ok(VoteType::Down),
            other => Err(UnknownVoteType(other.to_string())),
        }
    }
}

/// The current caller's own vote on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    #[serde(rename = "type")]
    pub kind: VoteType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Distance {
    Here,
    VeryClose,
    Close,
    Far,
    VeryFar,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub uid: String,
    pub username: String,
    #[serde(default, rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub body: String,
    #[serde(default, rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Vote tally; `None` when the backend omitted it. Rendered as zero.
    #[serde(default)]
    pub rate: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub comments_count: u64,
    #[serde(default)]
    pub owner: Option<Profile>,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub distance: Option<Distance>,
    #[serde(default)]
    pub channel: Option<Channel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub profile_post_vote: Option<VoteRecord>,
}

impl Post {
    pub fn displayed_rate(&self) -> i64 {
        self.rate.unwrap_or(0)
    }

    pub fn active_vote(&self) -> Option<VoteType> {
        self.profile_post_vote.map(|v| v.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotedPost {
    pub id: String,
    #[serde(default)]
    pub rate: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub uid: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
}

/// Result of the `vote` mutation, authoritative for the post's tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOutcome {
    #[serde(rename = "type")]
    pub kind: VoteType,
    pub post: VotedPost,
    #[serde(default)]
    pub profile: Option<Voter>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}
