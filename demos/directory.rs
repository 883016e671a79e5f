use json_roster::fallback::demo_users;
use json_roster::{DocumentStore, Mode, RecordDirectory, Role};
use std::sync::Arc;

fn main() -> Result<(), json_roster::Error> {
    let path = std::env::temp_dir().join("json_roster_example_directory.json");
    let store = Arc::new(DocumentStore::open(&path)?);
    store.replace(&demo_users())?;

    let directory = RecordDirectory::new(Arc::clone(&store));
    let loaded = directory.load();
    println!("loaded {} user(s), mode {:?}", loaded.document.len(), loaded.mode);
    if loaded.mode == Mode::Fallback {
        println!("storage failed: {:?}", loaded.reason);
    }

    // demo-only: these hints contain plaintext passwords
    for hint in directory.sample_credentials(3) {
        println!("{:<7} {} / {} ({})", hint.label, hint.email, hint.password, hint.display_name);
    }

    println!("login = {:?}", directory.authenticate("ADMIN@rugbyajojo.fr", "admin123"));
    println!("players = {}", directory.list_by_role(Role::Player).len());
    println!("validation = {:?}", directory.validate());
    println!("stats = {:?}", directory.statistics());

    // drafts stay in memory until explicitly persisted
    let doc = directory.append_draft_user("recrue@rugbyajojo.fr", "bienvenue");
    store.replace(&doc)?;
    directory.load();
    println!("after persisting draft: {} user(s)", directory.snapshot().len());

    let _ = std::fs::remove_file(&path);
    Ok(())
}
