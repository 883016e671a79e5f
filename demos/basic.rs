use json_roster::DocumentStore;
use serde_json::json;

fn main() -> Result<(), json_roster::Error> {
    let path = std::env::temp_dir().join("json_roster_example_basic.json");
    let store = DocumentStore::open(&path)?;

    // wholesale replace / read
    store.replace(&[json!({"nom": "Jo", "age": "10"})])?;
    println!("document = {:?}", store.read()?);

    // read-modify-write under the store lock
    store.update(|doc| doc.push(json!({"nom": "Lou", "age": "12"})))?;

    // optimistic variant: fails if someone replaced in between
    let (mut doc, rev) = store.read_with_revision()?;
    doc.retain(|row| row["nom"] != "Jo");
    let rev = store.replace_if(rev, &doc)?;
    println!("revision {rev}: {:?}", store.read()?);

    // the file on disk is indented for easy diffing
    println!("On-disk JSON:\n{}", std::fs::read_to_string(store.path())?);

    let _ = std::fs::remove_file(&path);
    Ok(())
}
