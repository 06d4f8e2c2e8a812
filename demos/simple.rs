//! Basic KeyValues serialization and deserialization.
//!
//! Run with: cargo run --example simple

use serde::{Deserialize, Serialize};
use serde_keyvalues::{
    from_str, from_str_with_options, to_string, to_string_with_options, KvFormat, KvOptions,
};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct VideoConfig {
    width: u32,
    height: u32,
    fullscreen: bool,
    gamma: f32,
    renderer: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = VideoConfig {
        width: 1920,
        height: 1080,
        fullscreen: true,
        gamma: 2.2,
        renderer: "vulkan".to_string(),
    };

    // Serialize to KV1 text
    let kv1 = to_string("video.cfg", &config)?;
    println!("KV1 output:\n{}", kv1);

    let back: VideoConfig = from_str(&kv1)?;
    assert_eq!(config, back);

    // Same struct as KV3
    let options = KvOptions::new().with_format(KvFormat::KeyValues3Text);
    let kv3 = to_string_with_options("video.cfg", &config, &options)?;
    println!("KV3 output:\n{}", kv3);

    let back: VideoConfig = from_str_with_options(&kv3, &options)?;
    assert_eq!(config, back);
    println!("✓ Round-trip successful");

    Ok(())
}
