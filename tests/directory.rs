use chrono::{Duration, TimeZone, Utc};
use json_roster::fallback::demo_users;
use json_roster::{DocumentStore, Error, Mode, RecordDirectory, Role};
use serde_json::{json, Value};
use std::sync::Arc;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("json_roster_test_{}.json", name))
}

fn user(email: &str, password: &str, role: &str, status: &str) -> Value {
    json!({
        "email": email,
        "password": password,
        "role": role,
        "status": status,
        "firstName": "First",
        "lastName": "Last",
    })
}

/// Store at a fresh path holding `doc`, plus a loaded directory over it.
fn directory_with(name: &str, doc: &[Value]) -> (RecordDirectory, std::path::PathBuf) {
    let path = temp_path(name);
    let _ = std::fs::remove_file(&path);
    let store = Arc::new(DocumentStore::open(&path).unwrap());
    store.replace(doc).unwrap();
    let dir = RecordDirectory::new(store);
    assert_eq!(dir.load().mode, Mode::Live);
    (dir, path)
}

// ---- not loaded -------------------------------------------------------------

#[test]
fn queries_before_load_answer_empty() {
    let path = temp_path("dir_not_loaded");
    let store = Arc::new(DocumentStore::open(&path).unwrap());
    let dir = RecordDirectory::new(store);

    assert_eq!(dir.mode(), Mode::NotLoaded);
    assert_eq!(dir.authenticate("a@b.fr", "x"), None);
    assert_eq!(dir.find_by_email("a@b.fr"), None);
    assert!(dir.list_active().is_empty());
    assert!(dir.list_by_role(Role::Admin).is_empty());
    assert!(dir.sample_credentials(3).is_empty());
    assert_eq!(dir.statistics(), None);
    assert!(dir.validate().is_valid);
}

// ---- load / fallback --------------------------------------------------------

#[test]
fn corrupt_storage_falls_back_to_demo_roster() {
    let path = temp_path("dir_corrupt");
    std::fs::write(&path, "this is not json").unwrap();
    let store = Arc::new(DocumentStore::open(&path).unwrap());
    let dir = RecordDirectory::new(store);

    let loaded = dir.load();
    assert_eq!(loaded.mode, Mode::Fallback);
    assert!(matches!(loaded.reason, Some(Error::CorruptDocument(_))));
    assert_eq!(loaded.document, demo_users());
    assert_eq!(dir.mode(), Mode::Fallback);
    assert!(dir.authenticate("admin@rugbyajojo.fr", "admin123").is_some());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn missing_storage_is_live_and_empty() {
    let path = temp_path("dir_missing");
    let _ = std::fs::remove_file(&path);
    let store = Arc::new(DocumentStore::open(&path).unwrap());
    let dir = RecordDirectory::new(store);

    let loaded = dir.load();
    assert_eq!(loaded.mode, Mode::Live);
    assert!(loaded.document.is_empty());
    assert!(loaded.reason.is_none());
    assert_eq!(dir.statistics().unwrap().total, 0);
}

#[test]
fn snapshot_does_not_follow_store_until_reload() {
    let (dir, path) = directory_with("dir_snapshot", &[user("a@b.fr", "x", "admin", "active")]);
    dir.store().replace(&[]).unwrap();
    assert_eq!(dir.snapshot().len(), 1);
    dir.load();
    assert!(dir.snapshot().is_empty());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn load_text_extracts_array_from_noise() {
    let path = temp_path("dir_text");
    let store = Arc::new(DocumentStore::open(&path).unwrap());
    let dir = RecordDirectory::new(store);

    let payload = format!(
        "// export du 12/10\n{}\n-- fin",
        json!([user("coach@club.fr", "pw", "admin", "active")])
    );
    let loaded = dir.load_text(&payload);
    assert_eq!(loaded.mode, Mode::Live);
    assert!(dir.find_by_email("COACH@club.fr").is_some());

    let loaded = dir.load_text("nothing here");
    assert_eq!(loaded.mode, Mode::Live);
    assert!(loaded.document.is_empty());
}

// ---- authenticate / find ----------------------------------------------------

#[test]
fn authenticate_matches_email_case_insensitively() {
    let (dir, path) = directory_with("dir_auth", &[user("Coach@Club.fr", "Secret", "admin", "active")]);

    let found = dir.authenticate("coach@club.FR", "Secret").unwrap();
    assert_eq!(found.get("email"), Some(&json!("Coach@Club.fr")));
    assert!(!found.contains_key("password"));
    assert_eq!(found.get("role"), Some(&json!("admin")));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn authenticate_rejects_bad_password_status_or_email() {
    let (dir, path) = directory_with(
        "dir_auth_reject",
        &[
            user("active@club.fr", "Secret", "player", "active"),
            user("idle@club.fr", "Secret", "player", "inactive"),
            user("banned@club.fr", "Secret", "player", "suspended"),
            user("caps@club.fr", "Secret", "player", "Active"),
        ],
    );

    assert_eq!(dir.authenticate("active@club.fr", "secret"), None);
    assert_eq!(dir.authenticate("active@club.fr", "Secret "), None);
    assert_eq!(dir.authenticate("idle@club.fr", "Secret"), None);
    assert_eq!(dir.authenticate("banned@club.fr", "Secret"), None);
    assert_eq!(dir.authenticate("caps@club.fr", "Secret"), None);
    assert_eq!(dir.authenticate("nobody@club.fr", "Secret"), None);
    assert!(dir.authenticate("active@club.fr", "Secret").is_some());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn find_by_email_ignores_inactive_and_strips_password() {
    let (dir, path) = directory_with(
        "dir_find",
        &[
            user("idle@club.fr", "pw", "player", "inactive"),
            user("live@club.fr", "pw", "player", "active"),
        ],
    );
    assert_eq!(dir.find_by_email("idle@club.fr"), None);
    let found = dir.find_by_email("LIVE@club.fr").unwrap();
    assert!(!found.contains_key("password"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn malformed_entries_are_skipped_by_lookups() {
    let (dir, path) = directory_with(
        "dir_malformed",
        &[json!("just a string"), json!({"email": 7, "status": "active"}), json!({"status": "active"})],
    );
    assert_eq!(dir.find_by_email("7"), None);
    assert_eq!(dir.list_active().len(), 2);
    let _ = std::fs::remove_file(&path);
}

// ---- listings ---------------------------------------------------------------

#[test]
fn list_active_keeps_storage_order_without_passwords() {
    let (dir, path) = directory_with(
        "dir_list",
        &[
            user("c@club.fr", "pw", "player", "active"),
            user("x@club.fr", "pw", "admin", "suspended"),
            user("a@club.fr", "pw", "admin", "active"),
            user("b@club.fr", "pw", "player", "active"),
        ],
    );

    let emails: Vec<_> = dir
        .list_active()
        .iter()
        .map(|u| u["email"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(emails, ["c@club.fr", "a@club.fr", "b@club.fr"]);
    assert!(dir.list_active().iter().all(|u| !u.contains_key("password")));

    let admins = dir.list_by_role(Role::Admin);
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0]["email"], json!("a@club.fr"));
    assert_eq!(dir.list_by_role(Role::Player).len(), 2);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn sample_credentials_takes_first_raw_entries() {
    let (dir, path) = directory_with(
        "dir_samples",
        &[
            user("a@club.fr", "pa", "admin", "active"),
            user("b@club.fr", "pb", "player", "inactive"),
            json!({"email": "c@club.fr", "password": "pc", "role": "player", "firstName": "Solo"}),
            user("d@club.fr", "pd", "player", "active"),
        ],
    );

    let samples = dir.sample_credentials(json_roster::directory::DEFAULT_SAMPLE_SIZE);
    assert_eq!(samples.len(), 3);
    assert_eq!(samples[0].label, "Admin");
    assert_eq!(samples[0].password, "pa");
    assert_eq!(samples[0].display_name, "First Last");
    assert_eq!(samples[1].label, "Player");
    assert_eq!(samples[1].email, "b@club.fr");
    assert_eq!(samples[2].display_name, "Solo");

    let wire = serde_json::to_value(&samples[0]).unwrap();
    assert_eq!(wire["displayName"], json!("First Last"));
    assert_eq!(dir.sample_credentials(10).len(), 4);
    let _ = std::fs::remove_file(&path);
}

// ---- validate ---------------------------------------------------------------

#[test]
fn missing_role_yields_single_issue() {
    let (dir, path) = directory_with(
        "dir_validate_role",
        &[
            user("a@club.fr", "pw", "admin", "active"),
            json!({"email": "b@club.fr", "password": "pw", "status": "active"}),
        ],
    );

    let report = dir.validate();
    assert!(!report.is_valid);
    assert_eq!(report.issues, vec!["Row 3: missing field 'role'".to_string()]);
    assert_eq!(report.total_users, 2);
    assert_eq!(report.active_users, 2);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn validate_reports_format_role_status_and_blanks() {
    let (dir, path) = directory_with(
        "dir_validate_all",
        &[
            user("not-an-email", "pw", "Coach", "retired"),
            json!({"email": "b@club.fr", "password": "   ", "role": "ADMIN", "status": "Inactive"}),
        ],
    );

    let report = dir.validate();
    assert_eq!(
        report.issues,
        vec![
            "Row 2: invalid email format 'not-an-email'".to_string(),
            "Row 2: invalid role 'Coach'".to_string(),
            "Row 2: invalid status 'retired'".to_string(),
            "Row 3: missing field 'password'".to_string(),
        ]
    );
    assert_eq!(report.active_users, 0);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn validate_flags_duplicate_active_emails() {
    let (dir, path) = directory_with(
        "dir_validate_dup",
        &[
            user("dup@club.fr", "pw", "player", "active"),
            user("DUP@club.fr", "pw", "player", "inactive"),
            user("Dup@Club.fr", "pw", "admin", "active"),
        ],
    );

    let report = dir.validate();
    assert_eq!(
        report.issues,
        vec!["Row 4: duplicate email 'Dup@Club.fr' (already on row 2)".to_string()]
    );
    let _ = std::fs::remove_file(&path);
}

#[test]
fn validate_never_mutates() {
    let (dir, path) = directory_with("dir_validate_pure", &[json!({"nom": "Jo"})]);
    let before = dir.snapshot();
    let report = dir.validate();
    assert_eq!(report.issues.len(), 4);
    assert_eq!(dir.snapshot(), before);
    assert_eq!(dir.store().read().unwrap(), before);
    let _ = std::fs::remove_file(&path);
}

// ---- statistics -------------------------------------------------------------

#[test]
fn statistics_count_only_active_by_role_and_team() {
    let mut a = user("a@club.fr", "pw", "admin", "active");
    a["team"] = json!("Seniors");
    let mut b = user("b@club.fr", "pw", "player", "active");
    b["team"] = json!("Seniors");
    let c = user("c@club.fr", "pw", "player", "active");
    let mut d = user("d@club.fr", "pw", "admin", "inactive");
    d["team"] = json!("Juniors");
    let (dir, path) = directory_with("dir_stats", &[a, b, c, d]);

    let stats = dir.statistics().unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.active, 3);
    assert_eq!(stats.by_role.len(), 2);
    assert_eq!(stats.by_role["admin"], 1);
    assert_eq!(stats.by_role["player"], 2);
    assert_eq!(stats.by_team.len(), 1);
    assert_eq!(stats.by_team["Seniors"], 2);

    let wire = serde_json::to_value(&stats).unwrap();
    assert_eq!(wire["byRole"], json!({"admin": 1, "player": 2}));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn recent_joins_uses_thirty_day_window() {
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
    let joined = |days: i64| (now - Duration::days(days)).to_rfc3339();

    let mut fresh = user("a@club.fr", "pw", "player", "active");
    fresh["joinDate"] = json!(joined(3));
    let mut edge = user("b@club.fr", "pw", "player", "active");
    edge["joinDate"] = json!("2026-09-20");
    let mut old = user("c@club.fr", "pw", "player", "active");
    old["joinDate"] = json!(joined(45));
    let mut idle = user("d@club.fr", "pw", "player", "inactive");
    idle["joinDate"] = json!(joined(1));
    let mut garbled = user("e@club.fr", "pw", "player", "active");
    garbled["joinDate"] = json!("sometime last week");
    let undated = user("f@club.fr", "pw", "player", "active");

    let (dir, path) = directory_with("dir_recent", &[fresh, edge, old, idle, garbled, undated]);
    let stats = dir.statistics_at(now).unwrap();
    assert_eq!(stats.recent_joins, 2);
    assert_eq!(stats.active, 5);
    let _ = std::fs::remove_file(&path);
}

// ---- append -----------------------------------------------------------------

#[test]
fn append_draft_user_stays_in_memory_until_replaced() {
    let (dir, path) = directory_with("dir_append", &[user("a@club.fr", "pw", "admin", "active")]);

    let doc = dir.append_draft_user("new@club.fr", "pw2");
    assert_eq!(doc.len(), 2);
    assert_eq!(
        doc[1],
        json!({"email": "new@club.fr", "password": "pw2", "role": "player", "status": "inactive"})
    );
    // inactive drafts can't log in yet
    assert_eq!(dir.authenticate("new@club.fr", "pw2"), None);
    assert_eq!(dir.store().read().unwrap().len(), 1);

    dir.store().replace(&doc).unwrap();
    dir.load();
    assert_eq!(dir.snapshot(), doc);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn append_draft_user_before_load_goes_live() {
    let path = temp_path("dir_append_unloaded");
    let _ = std::fs::remove_file(&path);
    let dir = RecordDirectory::new(Arc::new(DocumentStore::open(&path).unwrap()));
    assert_eq!(dir.mode(), Mode::NotLoaded);
    assert!(dir.statistics().is_none());

    let doc = dir.append_draft_user("new@club.fr", "pw");
    assert_eq!(doc.len(), 1);
    assert_eq!(dir.mode(), Mode::Live);
    assert_eq!(dir.snapshot(), doc);
    assert!(dir.list_active().is_empty());
    assert_eq!(dir.statistics().unwrap().total, 1);
    assert!(!path.exists());
}
