//! Reading streams and policies from disk.
//!
//! A stream file is either one JSON array of events or JSON Lines with one
//! event object per line. Blank lines are ignored in the line form.

use std::io::{self, Read};
use thiserror::Error;
use vlog_core::{Event, OrderingOptions, Stream};

/// Input errors.
#[derive(Error, Debug)]
pub enum InputError {
    /// The file or stdin could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    /// The document is not a valid event array or policy.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// One line of a JSON Lines stream is not a valid event.
    #[error("invalid event in {path} at line {line}: {source}")]
    Line {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads a whole file, or stdin when `path` is `None`.
pub fn read_text(path: Option<&str>) -> Result<String, InputError> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_string(),
            source,
        }),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|source| InputError::Io {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            Ok(buffer)
        }
    }
}

/// Loads a stream file.
pub fn load_stream(path: &str) -> Result<Stream, InputError> {
    let text = read_text(Some(path))?;
    let stream = parse_stream(&text, path)?;
    tracing::info!(path, events = stream.len(), "loaded stream");
    Ok(stream)
}

fn parse_stream(text: &str, path: &str) -> Result<Stream, InputError> {
    if text.trim_start().starts_with('[') {
        let events: Vec<Event> = serde_json::from_str(text).map_err(|source| InputError::Json {
            path: path.to_string(),
            source,
        })?;
        return Ok(events.into_iter().collect());
    }

    let mut stream = Stream::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let event: Event = serde_json::from_str(line).map_err(|source| InputError::Line {
            path: path.to_string(),
            line: i + 1,
            source,
        })?;
        stream = stream.append(event);
    }
    Ok(stream)
}

/// Loads an ordering policy. Missing fields take their defaults.
pub fn load_policy(path: &str) -> Result<OrderingOptions, InputError> {
    let text = read_text(Some(path))?;
    serde_json::from_str(&text).map_err(|source| InputError::Json {
        path: path.to_string(),
        source,
    })
}
