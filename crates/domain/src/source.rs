use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::DomainError;

/// Reputation record for one observed source address.
///
/// Created passively on the first packet seen from an IP, or actively by an
/// operator `ban`. Removed only by an explicit `delete`.
#[derive(Debug, Clone)]
pub struct SourceRecord {
    pub id: Option<i64>,
    pub ip: IpAddr,
    /// Block reason. Present only while the source is blocked.
    pub memo: Option<Arc<str>>,
    /// Label of the listener instance that last touched this record.
    pub server: Option<Arc<str>>,
    pub hit_count: u64,
    pub last_seen: Option<String>,
    pub blocked: bool,
}

impl SourceRecord {
    pub fn new(ip: IpAddr) -> Self {
        Self {
            id: None,
            ip,
            memo: None,
            server: None,
            hit_count: 0,
            last_seen: None,
            blocked: false,
        }
    }

    /// Render `last_seen` (stored as UTC by the database) in the local
    /// timezone for operator output.
    pub fn last_seen_local(&self) -> Option<String> {
        let ts = self.last_seen.as_deref()?;
        let naive = chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").ok()?;
        let utc = chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(naive, chrono::Utc);
        Some(
            utc.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S %Z")
                .to_string(),
        )
    }
}

/// Result of a block request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    /// The source is now blocked (record created or flipped).
    Blocked,
    /// The source was already blocked; nothing was changed.
    AlreadyBlocked { reason: Option<String> },
}

/// Result of an unblock request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnblockOutcome {
    /// The block was lifted; `previous_reason` is the memo that was cleared.
    Unblocked { previous_reason: Option<String> },
    /// The source was not blocked; nothing was changed.
    NotBlocked,
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { memo: Option<String> },
    NotFound,
}

/// Columns the `recent` listing may be ordered by.
///
/// Closed enumeration: operator input is parsed into one of these variants
/// and only the fixed identifiers below ever reach a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Ip,
    HitCount,
    LastSeen,
    Blocked,
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::Id,
        SortField::Ip,
        SortField::HitCount,
        SortField::LastSeen,
        SortField::Blocked,
    ];

    /// The validated column identifier for this field.
    pub fn as_column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Ip => "ip",
            SortField::HitCount => "hit_count",
            SortField::LastSeen => "last_seen",
            SortField::Blocked => "blocked",
        }
    }
}

impl FromStr for SortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortField::Id),
            "ip" => Ok(SortField::Ip),
            "hit-count" | "hit_count" | "hits" => Ok(SortField::HitCount),
            "last-seen" | "last_seen" => Ok(SortField::LastSeen),
            "blocked" => Ok(SortField::Blocked),
            other => Err(DomainError::InvalidSortField(other.to_string())),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_column())
    }
}
