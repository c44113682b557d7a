//! Report persistence.
//!
//! The report is written as comma-separated text and transcoded to the
//! requested encoding. Korean spreadsheet users expect `cp949`, which is the
//! default in configuration.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use encoding_rs::{EUC_KR, Encoding, UTF_8};
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::types::ReportTable;
use crate::error::AnalysisError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Resolves an encoding label. Returns the encoding and whether a BOM is written.
///
/// Accepts any WHATWG label plus `cp949`/`ms949` and `utf-8-sig`. Labels that
/// cannot be written as themselves (UTF-16, `replacement`) are unsupported.
pub fn resolve_encoding(label: &str) -> Result<(&'static Encoding, bool), AnalysisError> {
    let normalized = label.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "utf-8-sig" | "utf8-sig" => Ok((UTF_8, true)),
        "cp949" | "ms949" | "uhc" | "windows-949" => Ok((EUC_KR, false)),
        other => Encoding::for_label(other.as_bytes())
            .filter(|enc| enc.output_encoding() == *enc)
            .map(|enc| (enc, false))
            .ok_or_else(|| AnalysisError::UnsupportedEncoding(label.to_string())),
    }
}

/// Serializes the report to CSV bytes in the requested encoding.
pub fn encode_report(table: &ReportTable, encoding: &str) -> Result<Vec<u8>> {
    let (enc, bom) = resolve_encoding(encoding)?;

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    let utf8 = writer
        .into_inner()
        .map_err(|e| e.into_error())
        .context("failed to flush report CSV")?;
    let text = String::from_utf8(utf8).context("report CSV is not valid UTF-8")?;

    let (encoded, _, had_errors) = enc.encode(&text);
    if had_errors {
        return Err(AnalysisError::Unencodable(enc.name().to_string()).into());
    }

    let mut bytes = Vec::with_capacity(encoded.len() + UTF8_BOM.len());
    if bom {
        bytes.extend_from_slice(UTF8_BOM);
    }
    bytes.extend_from_slice(&encoded);
    Ok(bytes)
}

/// Writes the report to `path`, creating parent directories as needed.
#[tracing::instrument(skip(table), fields(path = %path.display(), rows = table.rows.len()))]
pub fn write_report(path: &Path, table: &ReportTable, encoding: &str) -> Result<()> {
    let bytes = encode_report(table, encoding)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    debug!(bytes = bytes.len(), "Writing report");
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;

    info!(encoding, "Report saved");
    Ok(())
}
