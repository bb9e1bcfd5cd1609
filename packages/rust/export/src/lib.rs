//! Flat exports of extracted records.
//!
//! Every format keeps the stable column names from
//! [`RECORD_FIELDS`](clipscout_shared::RECORD_FIELDS), so downstream sheets
//! and scripts can rely on them across releases.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info, instrument};

use clipscout_shared::{ClipScoutError, RECORD_FIELDS, Result, VideoRecord};

/// Serialized output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
}

impl Format {
    pub fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = ClipScoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(ClipScoutError::validation(format!(
                "unknown export format `{other}` (expected json or csv)"
            ))),
        }
    }
}

/// Render records in the given format.
pub fn render(records: &[VideoRecord], format: Format) -> Result<String> {
    match format {
        Format::Json => to_json(records),
        Format::Csv => Ok(to_csv(records)),
    }
}

/// Pretty-printed JSON array of records.
pub fn to_json(records: &[VideoRecord]) -> Result<String> {
    serde_json::to_string_pretty(records)
        .map_err(|e| ClipScoutError::Export(format!("failed to serialize records: {e}")))
}

/// CSV with a header row. Fields are quoted only when they need it.
pub fn to_csv(records: &[VideoRecord]) -> String {
    let mut out = String::new();
    push_row(&mut out, RECORD_FIELDS.iter().copied());
    for record in records {
        push_row(&mut out, record.row().into_iter());
    }
    out
}

fn push_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&quote(field));
    }
    out.push_str("\r\n");
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render and write records to `path`, creating parent directories.
///
/// The file is written to a sibling temp file first and then renamed into
/// place, so a failed export never leaves a half-written file behind.
#[instrument(skip_all, fields(path = %path.display(), format = %format, records = records.len()))]
pub fn write(records: &[VideoRecord], format: Format, path: &Path) -> Result<()> {
    let content = render(records, format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ClipScoutError::io(parent, e))?;
    }

    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, &content).map_err(|e| ClipScoutError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| ClipScoutError::io(path, e))?;
    debug!(bytes = content.len(), "export written");

    info!("records exported");
    Ok(())
}
