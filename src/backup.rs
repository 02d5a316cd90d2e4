use crate::store::replace_file;
use crate::table;
use anyhow::{anyhow, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const TABLE_ENTRY: &str = "table/exam_centers.csv";
pub const BUNDLE_FORMAT_V1: &str = "examcenters-table-v1";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub row_count: usize,
    pub sha256: String,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: String,
    pub row_count: usize,
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Data rows in a table image, after checking that its first row is the fixed
/// header.
fn checked_row_count(bytes: &[u8]) -> anyhow::Result<usize> {
    let text = std::str::from_utf8(bytes).context("table is not UTF-8")?;
    let rows = table::parse_rows(text.trim_start_matches('\u{feff}'));
    let Some(header) = rows.first() else {
        return Err(anyhow!("table is empty; header row missing"));
    };
    if header.iter().map(|s| s.trim()).ne(table::HEADER.iter().copied()) {
        return Err(anyhow!("unexpected table header: {}", header.join(",")));
    }
    Ok(rows.len() - 1)
}

pub fn export_table_bundle(table_path: &Path, out_path: &Path) -> anyhow::Result<ExportSummary> {
    if !table_path.is_file() {
        return Err(anyhow!(
            "table not found: {}",
            table_path.to_string_lossy()
        ));
    }
    let bytes = std::fs::read(table_path)
        .with_context(|| format!("failed to read table {}", table_path.to_string_lossy()))?;
    let row_count = checked_row_count(&bytes)?;
    let sha256 = sha256_hex(&bytes);

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": chrono::Utc::now().to_rfc3339(),
        "rowCount": row_count,
        "sha256": sha256,
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(TABLE_ENTRY, opts)
        .context("failed to start table entry")?;
    zip.write_all(&bytes).context("failed to write table entry")?;
    zip.finish().context("failed to finalize zip bundle")?;

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        row_count,
        sha256,
    })
}

/// Replaces the table with the contents of a bundle. A plain CSV file is taken
/// as-is once its header checks out.
pub fn import_table_bundle(in_path: &Path, table_path: &Path) -> anyhow::Result<ImportSummary> {
    if !is_zip_file(in_path)? {
        let bytes = std::fs::read(in_path)
            .with_context(|| format!("failed to read {}", in_path.to_string_lossy()))?;
        let row_count = checked_row_count(&bytes)?;
        replace_file(table_path, &bytes)?;
        return Ok(ImportSummary {
            bundle_format_detected: "plain-csv".to_string(),
            row_count,
        });
    }

    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }

    let mut bytes = Vec::new();
    archive
        .by_name(TABLE_ENTRY)
        .context("bundle missing table/exam_centers.csv")?
        .read_to_end(&mut bytes)
        .context("failed to extract table entry")?;

    let expected = manifest
        .get("sha256")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    let actual = sha256_hex(&bytes);
    if expected != actual {
        return Err(anyhow!(
            "table checksum mismatch (manifest {}, bundle {})",
            expected,
            actual
        ));
    }
    let row_count = checked_row_count(&bytes)?;
    replace_file(table_path, &bytes)?;

    Ok(ImportSummary {
        bundle_format_detected: BUNDLE_FORMAT_V1.to_string(),
        row_count,
    })
}

fn is_zip_file(path: &Path) -> anyhow::Result<bool> {
    let mut f = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.to_string_lossy()))?;
    let mut sig = [0u8; 4];
    let read = f.read(&mut sig).context("failed to read file signature")?;
    if read < 4 {
        return Ok(false);
    }
    Ok(sig == [0x50, 0x4B, 0x03, 0x04])
}
