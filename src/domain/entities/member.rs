use chrono::{DateTime, Utc};
use std::fmt;

/// A user joining a guild, as delivered by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberJoinEvent {
    pub guild_id: u64,
    pub user_id: u64,
    pub username: String,
    pub avatar_url: String,
    pub joined_at: DateTime<Utc>,
}

impl MemberJoinEvent {
    pub fn new(
        guild_id: u64,
        user_id: u64,
        username: impl Into<String>,
        avatar_url: impl Into<String>,
    ) -> Self {
        Self {
            guild_id,
            user_id,
            username: username.into(),
            avatar_url: avatar_url.into(),
            joined_at: Utc::now(),
        }
    }

    pub fn with_joined_at(mut self, joined_at: DateTime<Utc>) -> Self {
        self.joined_at = joined_at;
        self
    }

    /// Platform mention markup, rendered by clients as `@username`
    pub fn mention(&self) -> String {
        format!("<@{}>", self.user_id)
    }
}

impl fmt::Display for MemberJoinEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) in guild {}", self.username, self.user_id, self.guild_id)
    }
}
