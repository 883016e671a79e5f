//! Read-side view over a loaded document of user records.
//!
//! A [`RecordDirectory`] is a point-in-time snapshot: it does not notice
//! writes made through the store after [`load`](RecordDirectory::load) and has
//! to be reloaded explicitly. Until the first load every query answers empty
//! (or `None`); that is a normal state, not an error.

use crate::error::Error;
use crate::fallback;
use crate::record::{
    capitalize, email_matches, is_active, is_valid_email, parse_join_date, str_field,
    without_password, Record, Role, Status, REQUIRED_FIELDS,
};
use crate::store::DocumentStore;
use crate::Document;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// How many entries [`RecordDirectory::sample_credentials`] shows by default.
pub const DEFAULT_SAMPLE_SIZE: usize = 3;

/// Window used by [`Statistics::recent_joins`].
pub const RECENT_JOIN_DAYS: i64 = 30;

/// Where the directory's current document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Nothing loaded yet; queries answer empty.
    NotLoaded,
    /// Loaded from storage (or from a caller-supplied payload).
    Live,
    /// Storage failed and the built-in demo roster is being served instead.
    Fallback,
}

/// Result of a load: the document now held, and how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    /// Copy of the document the directory now answers from.
    pub document: Document,
    /// `Live` or `Fallback`.
    pub mode: Mode,
    /// The storage error that forced a fallback, if any.
    pub reason: Option<Error>,
}

/// Login hint shown on the demo page. Contains a plaintext password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoCredential {
    /// Capitalized role, e.g. `"Admin"`.
    pub label: String,
    /// Login email.
    pub email: String,
    /// Plaintext password, as stored.
    pub password: String,
    /// `"firstName lastName"`.
    pub display_name: String,
}

/// Outcome of [`RecordDirectory::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// `true` iff `issues` is empty.
    pub is_valid: bool,
    /// One human-readable line per problem, prefixed with the spreadsheet row
    /// (position + 2: 1-based, after a header row).
    pub issues: Vec<String>,
    /// Entries inspected.
    pub total_users: usize,
    /// Entries with status exactly `active`.
    pub active_users: usize,
}

/// Aggregates over the loaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Every record, whatever its status.
    pub total: usize,
    /// Records with status exactly `active`.
    pub active: usize,
    /// Active records per role value.
    pub by_role: BTreeMap<String, usize>,
    /// Active records per team; records without a team aren't counted.
    pub by_team: BTreeMap<String, usize>,
    /// Active records whose `joinDate` falls in the last 30 days.
    pub recent_joins: usize,
}

struct State {
    document: Document,
    mode: Mode,
}

/// Typed queries over the user document held by a [`DocumentStore`].
///
/// Storage errors never escape: a failed [`load`](Self::load) switches to
/// [`Mode::Fallback`] and serves [`fallback::demo_users`].
///
/// Passwords are stored and compared in plaintext, byte-for-byte and not in
/// constant time, with no rate limiting. That is acceptable for the demo
/// roster this serves and nothing else; real accounts need salted hashes and a
/// constant-time compare.
pub struct RecordDirectory {
    store: Arc<DocumentStore>,
    state: RwLock<State>,
}

impl RecordDirectory {
    /// Bind a directory to `store`. Nothing is read until [`load`](Self::load).
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self {
            store,
            state: RwLock::new(State {
                document: Document::new(),
                mode: Mode::NotLoaded,
            }),
        }
    }

    /// The store this directory reads from.
    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    // ---- loading ----

    /// (Re)load from the store. Any failure switches to the built-in demo
    /// roster; the returned [`Loaded`] says which happened and why.
    pub fn load(&self) -> Loaded {
        let (document, mode, reason) = match self.store.read() {
            Ok(doc) => {
                log::info!("loaded {} user(s) from {}", doc.len(), self.store.path().display());
                (doc, Mode::Live, None)
            }
            Err(e) => {
                log::warn!(
                    "could not load {} ({e}), serving the demo roster instead",
                    self.store.path().display()
                );
                (fallback::demo_users(), Mode::Fallback, Some(e))
            }
        };
        self.install(document, mode, reason)
    }

    /// Load from a loosely formatted payload (e.g. a remote export with
    /// commentary around the array). Text without a usable array loads as an
    /// empty document.
    pub fn load_text(&self, text: &str) -> Loaded {
        let document = crate::extract::extract_array_or_empty(text);
        log::info!("loaded {} user(s) from text payload", document.len());
        self.install(document, Mode::Live, None)
    }

    fn install(&self, document: Document, mode: Mode, reason: Option<Error>) -> Loaded {
        let mut state = self.state.write();
        state.document = document.clone();
        state.mode = mode;
        Loaded {
            document,
            mode,
            reason,
        }
    }

    /// Current operating mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.state.read().mode
    }

    /// Copy of the raw document, passwords included.
    #[must_use]
    pub fn snapshot(&self) -> Document {
        self.state.read().document.clone()
    }

    // ---- lookups ----

    /// Active user with this email (any case) and exactly this password,
    /// without the password field.
    pub fn authenticate(&self, email: &str, password: &str) -> Option<Record> {
        let state = self.state.read();
        if state.mode == Mode::NotLoaded {
            log::warn!("authentication attempted before the directory was loaded");
            return None;
        }
        state
            .document
            .iter()
            .find(|u| {
                email_matches(u, email)
                    && str_field(u, "password") == Some(password)
                    && is_active(u)
            })
            .map(without_password)
    }

    /// Active user with this email (any case), without the password field.
    pub fn find_by_email(&self, email: &str) -> Option<Record> {
        let state = self.state.read();
        if state.mode == Mode::NotLoaded {
            return None;
        }
        state
            .document
            .iter()
            .find(|u| email_matches(u, email) && is_active(u))
            .map(without_password)
    }

    /// Every active user in storage order, passwords stripped.
    pub fn list_active(&self) -> Vec<Record> {
        let state = self.state.read();
        if state.mode == Mode::NotLoaded {
            return Vec::new();
        }
        state
            .document
            .iter()
            .filter(|u| is_active(u))
            .map(without_password)
            .collect()
    }

    /// [`list_active`](Self::list_active) restricted to one role.
    pub fn list_by_role(&self, role: Role) -> Vec<Record> {
        self.list_active()
            .into_iter()
            .filter(|u| u.get("role").and_then(Value::as_str) == Some(role.as_str()))
            .collect()
    }

    /// First `n` raw entries (any status) as login hints. Exposes plaintext
    /// passwords; only for the demo page, never for an API.
    pub fn sample_credentials(&self, n: usize) -> Vec<DemoCredential> {
        let state = self.state.read();
        state
            .document
            .iter()
            .take(n)
            .map(|u| {
                let field = |name| str_field(u, name).unwrap_or_default();
                let display_name = [field("firstName"), field("lastName")]
                    .iter()
                    .filter(|s| !s.is_empty())
                    .copied()
                    .collect::<Vec<_>>()
                    .join(" ");
                DemoCredential {
                    label: capitalize(field("role")),
                    email: field("email").to_owned(),
                    password: field("password").to_owned(),
                    display_name,
                }
            })
            .collect()
    }

    // ---- reports ----

    /// Check every raw entry for required fields, email format, known role and
    /// status, and duplicate active emails. Reports only; nothing is changed
    /// or rejected.
    pub fn validate(&self) -> ValidationReport {
        let state = self.state.read();
        let mut issues = Vec::new();
        let mut seen_emails: HashMap<String, usize> = HashMap::new();

        for (index, user) in state.document.iter().enumerate() {
            let row = index + 2;

            for field in REQUIRED_FIELDS {
                let present = str_field(user, field).is_some_and(|v| !v.trim().is_empty());
                if !present {
                    issues.push(format!("Row {row}: missing field '{field}'"));
                }
            }

            if let Some(email) = str_field(user, "email").filter(|e| !e.is_empty()) {
                if !is_valid_email(email) {
                    issues.push(format!("Row {row}: invalid email format '{email}'"));
                }
                if is_active(user) {
                    if let Some(first) = seen_emails.get(&email.to_lowercase()) {
                        issues.push(format!(
                            "Row {row}: duplicate email '{email}' (already on row {first})"
                        ));
                    } else {
                        seen_emails.insert(email.to_lowercase(), row);
                    }
                }
            }

            if let Some(role) = str_field(user, "role").filter(|r| !r.is_empty()) {
                if role.parse::<Role>().is_err() {
                    issues.push(format!("Row {row}: invalid role '{role}'"));
                }
            }

            if let Some(status) = str_field(user, "status").filter(|s| !s.is_empty()) {
                if status.parse::<Status>().is_err() {
                    issues.push(format!("Row {row}: invalid status '{status}'"));
                }
            }
        }

        ValidationReport {
            is_valid: issues.is_empty(),
            issues,
            total_users: state.document.len(),
            active_users: state.document.iter().filter(|u| is_active(u)).count(),
        }
    }

    /// Aggregates as of now. `None` before the first load.
    pub fn statistics(&self) -> Option<Statistics> {
        self.statistics_at(Utc::now())
    }

    /// Aggregates with `now` as the evaluation instant for `recent_joins`.
    pub fn statistics_at(&self, now: DateTime<Utc>) -> Option<Statistics> {
        let state = self.state.read();
        if state.mode == Mode::NotLoaded {
            return None;
        }
        let cutoff = now - Duration::days(RECENT_JOIN_DAYS);

        let mut stats = Statistics {
            total: state.document.len(),
            active: 0,
            by_role: BTreeMap::new(),
            by_team: BTreeMap::new(),
            recent_joins: 0,
        };

        for user in state.document.iter().filter(|u| is_active(u)) {
            stats.active += 1;
            if let Some(role) = str_field(user, "role") {
                *stats.by_role.entry(role.to_owned()).or_default() += 1;
            }
            if let Some(team) = str_field(user, "team").filter(|t| !t.is_empty()) {
                *stats.by_team.entry(team.to_owned()).or_default() += 1;
            }
            let joined = str_field(user, "joinDate").and_then(parse_join_date);
            if joined.is_some_and(|d| d >= cutoff && d <= now) {
                stats.recent_joins += 1;
            }
        }

        Some(stats)
    }

    // ---- mutation (in memory only) ----

    /// Append an inactive player to the in-memory document and return the
    /// whole updated document. Nothing is persisted: pass the result to
    /// [`DocumentStore::replace`] if the new user should survive a reload.
    ///
    /// Appending to a directory that was never loaded starts it in
    /// [`Mode::Live`] with just the draft, so statistics count it.
    pub fn append_draft_user(&self, email: &str, password: &str) -> Document {
        let mut state = self.state.write();
        if state.mode == Mode::NotLoaded {
            state.mode = Mode::Live;
        }
        state.document.push(json!({
            "email": email,
            "password": password,
            "role": Role::Player.as_str(),
            "status": Status::Inactive.as_str(),
        }));
        log::debug!("appended draft user {email} ({} in memory)", state.document.len());
        state.document.clone()
    }
}

impl std::fmt::Debug for RecordDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("RecordDirectory")
            .field("store", &self.store)
            .field("mode", &state.mode)
            .field("records", &state.document.len())
            .finish()
    }
}
