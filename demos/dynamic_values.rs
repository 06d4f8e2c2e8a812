//! Working with untyped KeyValues trees and parse events.
//!
//! Run with: cargo run --example dynamic_values

use serde_keyvalues::{
    kv, parse_document, read_with_listener, write_document_string, Event, EventRecorder,
    KvDocument, KvFormat, KvOptions,
};
use std::error::Error;

const GAMEINFO: &str = r#"
"GameInfo"
{
    game        "Half-Life 2"
    type        singleplayer_only
    nodifficulty 1      [$X360]
    FileSystem
    {
        SteamAppId  220
        SearchPaths
        {
            game    |gameinfo_path|.
            game    hl2
        }
    }
}
"#;

fn main() -> Result<(), Box<dyn Error>> {
    // Conditionals are evaluated against the symbols in the options
    let options = KvOptions::new().with_conditions(vec!["WIN32".to_string()]);
    let document = parse_document(GAMEINFO, &options)?;
    println!("Parsed '{}'", document.name());

    let root = document.value();
    if let Some(game) = root.get("game").and_then(|n| n.as_value()) {
        println!("game = {}", game);
    }
    println!("nodifficulty present: {}", root.get("nodifficulty").is_some());

    // Listener-level access without building a tree
    let mut recorder = EventRecorder::new();
    read_with_listener(GAMEINFO, &options, &mut recorder)?;
    let pairs = recorder
        .events()
        .iter()
        .filter(|e| matches!(e, Event::KeyValuePair(..)))
        .count();
    println!("{} key/value pairs", pairs);

    // Build a tree by hand and write it as KV3
    let built = KvDocument::new(
        "root",
        kv!({
            "name": "citadel",
            "spawn": [0.0f32, 64.0f32, (-128.5f32)],
            "flags": { "dark": true, "ambient": 12 }
        }),
    );
    let kv3 = KvOptions::new().with_format(KvFormat::KeyValues3Text);
    println!("{}", write_document_string(&built, &kv3)?);

    Ok(())
}
