//! User-shaped records: roles, statuses and field helpers.
//!
//! Records stay as raw JSON objects so that malformed rows survive a load and
//! can be reported by validation instead of being dropped at parse time.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::str::FromStr;

/// One entry of a document, as a JSON object.
pub type Record = Map<String, Value>;

/// Fields every persisted user record must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 4] = ["email", "password", "role", "status"];

/// What a user is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Manages the roster.
    Admin,
    /// Regular member.
    Player,
}

impl Role {
    /// Lowercase name as stored in documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Player => "player",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "player" => Ok(Role::Player),
            _ => Err(format!("unknown role '{s}'")),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account state. Only `Active` users can log in or show up in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Can log in.
    Active,
    /// Registered but not yet enabled.
    Inactive,
    /// Disabled by an admin.
    Suspended,
}

impl Status {
    /// Lowercase name as stored in documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
            Status::Suspended => "suspended",
        }
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(Status::Active),
            "inactive" => Ok(Status::Inactive),
            "suspended" => Ok(Status::Suspended),
            _ => Err(format!("unknown status '{s}'")),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String value of `field`, if the record is an object and the field is a
/// string.
pub fn str_field<'a>(record: &'a Value, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str)
}

/// `true` when the record's `status` is exactly `"active"`. Listings and
/// logins compare byte-for-byte; only validation is case-insensitive.
pub fn is_active(record: &Value) -> bool {
    str_field(record, "status") == Some(Status::Active.as_str())
}

/// `true` when the record's email equals `email`, ignoring case.
pub fn email_matches(record: &Value, email: &str) -> bool {
    str_field(record, "email").is_some_and(|e| e.to_lowercase() == email.to_lowercase())
}

/// Copy of the record's object without its `password` field. Non-object
/// entries come back as an empty record.
pub fn without_password(record: &Value) -> Record {
    let mut out = record.as_object().cloned().unwrap_or_default();
    out.shift_remove("password");
    out
}

/// Single `@`, no whitespace, and a dot somewhere inside the domain with at
/// least one character on each side.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Parse a `joinDate` value. Accepts an RFC 3339 timestamp, a naive
/// `YYYY-MM-DDTHH:MM:SS` (taken as UTC) or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_join_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `"admin"` -> `"Admin"`.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
