use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::Serialize;
use serde_with::DeserializeFromStr;
use sqlx::{FromRow, types::Json};
use time::OffsetDateTime;
use uuid::Uuid;

/// Milliseconds since the unix epoch, the unit every `created_at` column uses.
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Trims entries, drops blanks, and dedupes. Stored as a sorted JSON array.
pub fn normalize_set<I, S>(items: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,

    #[serde(skip_serializing)]
    pub credential: String,

    pub college: Option<String>,
    pub skills: Json<BTreeSet<String>>,
    pub interests: Option<String>,
    pub bio: Option<String>,
    pub profile_url: Option<String>,

    pub created_at: i64,

    // unique: id
    // unique nocase: email
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub skills_needed: Json<BTreeSet<String>>,
    pub owner_id: Uuid,

    pub created_at: i64,

    // owner_id -> users.id on delete cascade
}

/// Parsed case-insensitively through [`FromStr`]; written lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, DeserializeFromStr, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Approved,
    Denied,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        use ConnectionStatus::*;
        match self {
            Pending => "pending",
            Approved => "approved",
            Denied => "denied",
        }
    }

    /// `approved` and `denied` accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConnectionStatus::Pending)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ConnectionStatus::Pending),
            "approved" => Ok(ConnectionStatus::Approved),
            "denied" => Ok(ConnectionStatus::Denied),
            other => Err(format!("unknown connection status `{other}`")),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: Uuid,
    pub project_id: Uuid,
    pub requester_id: Uuid,
    pub status: ConnectionStatus,

    pub created_at: i64,
    pub decided_at: Option<i64>,

    // unique: project_id, requester_id
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,

    pub content: String,

    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Approved".parse::<ConnectionStatus>(), Ok(ConnectionStatus::Approved));
        assert_eq!(" denied ".parse::<ConnectionStatus>(), Ok(ConnectionStatus::Denied));
        assert!("accepted".parse::<ConnectionStatus>().is_err());
    }

    #[test]
    fn only_pending_is_open() {
        assert!(!ConnectionStatus::Pending.is_terminal());
        assert!(ConnectionStatus::Approved.is_terminal());
        assert!(ConnectionStatus::Denied.is_terminal());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&ConnectionStatus::Approved).unwrap();
        assert_eq!(json, "\"approved\"");
    }

    #[test]
    fn status_deserializes_through_from_str() {
        let status: ConnectionStatus = serde_json::from_str("\"Approved\"").unwrap();
        assert_eq!(status, ConnectionStatus::Approved);
        assert!(serde_json::from_str::<ConnectionStatus>("\"accepted\"").is_err());
    }

    #[test]
    fn sets_are_trimmed_and_deduped() {
        let set = normalize_set(["rust", " Rust", "rust ", "", "  ", "sql"]);
        let items: Vec<_> = set.into_iter().collect();
        assert_eq!(items, vec!["Rust", "rust", "sql"]);
    }

    #[test]
    fn credential_is_never_serialized() {
        let user = User {
            id: Uuid::now_v7(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            credential: "hunter2".into(),
            college: None,
            skills: Json(BTreeSet::new()),
            interests: None,
            bio: None,
            profile_url: None,
            created_at: now_millis(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("credential").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }
}
