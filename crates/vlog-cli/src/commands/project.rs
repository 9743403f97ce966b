//! Project command implementation.

use crate::input;
use vlog_core::project_normative;

pub fn run(stream: String) -> Result<(), Box<dyn std::error::Error>> {
    let events = input::load_stream(&stream)?;
    let normative = project_normative(&events);
    tracing::info!(
        events = events.len(),
        decisions = normative.len(),
        "projected stream"
    );

    for event in &normative {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}
