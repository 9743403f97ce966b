//! Digest command implementation.

use crate::input;
use crate::output;
use serde_json::json;
use vlog_core::stream_digest;

pub fn run(stream: String, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let events = input::load_stream(&stream)?;
    let digests = events.event_digests()?;
    let stream_hex = stream_digest(&digests)?.to_hex();

    if json {
        let rows: Vec<_> = events
            .iter()
            .zip(&digests)
            .enumerate()
            .map(|(index, (event, digest))| {
                json!({
                    "index": index,
                    "kind": event.kind(),
                    "digest": digest.to_hex(),
                })
            })
            .collect();
        let doc = json!({
            "events": rows,
            "stream_digest": stream_hex,
        });
        println!("{}", output::format_json(&doc));
    } else {
        output::print_digest_header();
        for (index, (event, digest)) in events.iter().zip(&digests).enumerate() {
            println!("{}", output::format_digest_row(index, event.kind(), digest));
        }
        println!("stream digest: {}", stream_hex);
    }
    Ok(())
}
