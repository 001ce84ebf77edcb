//! Desired TXT record state derived from a challenge

use std::fmt;

/// Record type written for DNS-01 challenges
pub const TXT: &str = "TXT";

/// What to do with a challenge record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordAction {
    /// Record does not exist yet
    Create,
    /// Record exists and gets the new content
    Update,
    /// Record is removed
    Delete,
}

impl RecordAction {
    /// Pick create or update from the records already present
    pub fn for_existing(existing_count: usize) -> Self {
        if existing_count == 0 {
            RecordAction::Create
        } else {
            RecordAction::Update
        }
    }

    /// lexicon action keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordAction::Create => "create",
            RecordAction::Update => "update",
            RecordAction::Delete => "delete",
        }
    }

    /// Whether the action writes a TTL
    pub fn carries_ttl(&self) -> bool {
        !matches!(self, RecordAction::Delete)
    }
}

impl fmt::Display for RecordAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One TXT record mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSpec {
    /// Zone without trailing dot
    pub zone: String,
    /// Name relative to the zone, always under `_acme-challenge`
    pub name: String,
    /// TXT value (the ACME key authorization digest)
    pub content: String,
    /// TTL in seconds
    pub ttl: u32,
    /// Mutation to perform
    pub action: RecordAction,
}

impl RecordSpec {
    /// Describe a record change
    pub fn new(
        zone: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
        ttl: u32,
        action: RecordAction,
    ) -> Self {
        Self {
            zone: zone.into(),
            name: name.into(),
            content: content.into(),
            ttl,
            action,
        }
    }

    /// The same record with a different action
    pub fn with_action(mut self, action: RecordAction) -> Self {
        self.action = action;
        self
    }
}
