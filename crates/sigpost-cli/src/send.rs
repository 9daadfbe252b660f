//! Handler for `sigpost-cli send`.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use sigpost_core::{AppConfig, SearchDocument};
use sigpost_signals::{SignalEmitter, SignalOutcome};

/// Reads a document, sends one signal for it and prints the outcome.
///
/// # Errors
///
/// Returns an error if the document cannot be read or parsed, the emitter
/// cannot be built, or the service rejects the signal.
pub(crate) async fn run_send(
    config: &AppConfig,
    document_path: &Path,
    kind: &str,
    weight: i64,
) -> anyhow::Result<()> {
    let raw = read_document(document_path)?;
    let document = parse_document(&raw)
        .with_context(|| format!("invalid document in {}", document_path.display()))?;

    let emitter = SignalEmitter::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build signal emitter: {e}"))?;

    tracing::debug!(
        endpoint = emitter.endpoint(),
        document_id = document.id().unwrap_or("<none>"),
        kind,
        weight,
        "sending signal"
    );

    let outcome = emitter
        .send_with(&document, kind, weight)
        .await
        .context("failed to submit signal")?;
    println!("{}", describe_outcome(outcome));
    Ok(())
}

fn read_document(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read document from stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub(crate) fn parse_document(raw: &str) -> Result<SearchDocument, serde_json::Error> {
    serde_json::from_str(raw)
}

pub(crate) fn describe_outcome(outcome: SignalOutcome) -> &'static str {
    match outcome {
        SignalOutcome::Recorded => "recorded",
        SignalOutcome::Skipped => "skipped (document has no signal)",
    }
}
