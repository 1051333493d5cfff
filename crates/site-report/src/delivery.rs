//! Hands the rendered report to its destination.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;

/// Where a report ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    File(PathBuf),
    Stdout,
    /// Nothing was written.
    DryRun,
}

/// Delivery options taken from the settings.
#[derive(Debug, Clone, Default)]
pub struct DeliveryTarget<'a> {
    pub output: Option<&'a Path>,
    pub recipients: &'a [String],
    pub dry_run: bool,
}

/// Write `body` to the output file, or to `stdout` when no file is set.
///
/// A dry run only logs what would have been sent.
pub fn deliver<W: Write>(
    title: &str,
    body: &str,
    target: &DeliveryTarget<'_>,
    stdout: &mut W,
) -> anyhow::Result<Delivery> {
    if target.dry_run {
        tracing::info!(
            title,
            recipients = %recipients_label(target.recipients),
            bytes = body.len(),
            "dry run: report not delivered"
        );
        return Ok(Delivery::DryRun);
    }

    if !target.recipients.is_empty() {
        tracing::info!(
            recipients = %recipients_label(target.recipients),
            "report addressed to recipients"
        );
    }

    match target.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::write(path, body)
                .with_context(|| format!("writing report to {}", path.display()))?;
            tracing::info!(path = %path.display(), "report written");
            Ok(Delivery::File(path.to_path_buf()))
        }
        None => {
            stdout.write_all(body.as_bytes())?;
            stdout.flush()?;
            Ok(Delivery::Stdout)
        }
    }
}

fn recipients_label(recipients: &[String]) -> String {
    if recipients.is_empty() {
        "(none)".to_string()
    } else {
        recipients.join(", ")
    }
}
