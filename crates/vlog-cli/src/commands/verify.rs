//! Verify command implementation.

use crate::input;
use crate::output;
use serde_json::json;
use vlog_core::{verify_append_only, verify_stream, CoreError, Stream, VerifyOptions};

/// Arguments of the `verify` command.
pub struct VerifyArgs {
    pub stream: String,
    pub prev: Option<String>,
    pub policy: Option<String>,
    pub id_key: Option<String>,
    pub require_intent: bool,
    pub allow_decision_after_execution: bool,
    pub max_decisions: Option<u32>,
    pub skip_identity: bool,
    pub json: bool,
}

impl VerifyArgs {
    /// Policy file first, then flag overrides.
    fn options(&self) -> Result<VerifyOptions, input::InputError> {
        let mut ordering = match &self.policy {
            Some(path) => input::load_policy(path)?,
            None => Default::default(),
        };
        if let Some(id_key) = &self.id_key {
            ordering.id_key = id_key.clone();
        }
        if self.require_intent {
            ordering.require_intent_before_decision = true;
        }
        if self.allow_decision_after_execution {
            ordering.disallow_decision_after_execution = false;
        }
        if let Some(max) = self.max_decisions {
            ordering.max_decisions_per_id = max;
        }
        Ok(VerifyOptions {
            ordering,
            check_identity: !self.skip_identity,
        })
    }
}

pub fn run(args: VerifyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = args.options()?;
    let stream = input::load_stream(&args.stream)?;
    let prev = match &args.prev {
        Some(path) => Some(input::load_stream(path)?),
        None => None,
    };

    let outcome = check(&stream, prev.as_ref(), &options);

    if args.json {
        let doc = match &outcome {
            Ok(digest) => json!({
                "ok": true,
                "events": stream.len(),
                "stream_digest": digest,
            }),
            Err(e) => json!({
                "ok": false,
                "events": stream.len(),
                "kind": output::error_kind_label(e.kind()),
                "error": e.to_string(),
            }),
        };
        println!("{}", output::format_json(&doc));
        if outcome.is_err() {
            std::process::exit(1);
        }
        return Ok(());
    }

    let digest = outcome?;
    println!("OK: {} events verified", stream.len());
    println!("stream digest: {}", digest);
    Ok(())
}

fn check(
    stream: &Stream,
    prev: Option<&Stream>,
    options: &VerifyOptions,
) -> Result<String, CoreError> {
    if let Some(prev) = prev {
        verify_append_only(prev, stream)?;
    }
    verify_stream(stream, options)?;
    stream.digest_hex()
}
