// src/render/export.rs
//! Sample history export to JSON or CSV

use crate::stats::sampler::Sample;
use crate::types::ExportFormat;
use crate::utils::error::MinerError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `samples` as a pretty-printed JSON array
pub fn write_json<W: Write>(samples: &[Sample], writer: W) -> Result<(), MinerError> {
    serde_json::to_writer_pretty(writer, samples)?;
    Ok(())
}

/// Writes `samples` as CSV with a header row; timestamps are RFC 3339
pub fn write_csv<W: Write>(samples: &[Sample], mut writer: W) -> Result<(), MinerError> {
    writeln!(writer, "timestamp,elapsed_secs,hashes,hash_rate")?;
    for sample in samples {
        writeln!(
            writer,
            "{},{:.3},{},{:.2}",
            sample.timestamp.to_rfc3339(),
            sample.elapsed_secs,
            sample.hashes,
            sample.hash_rate
        )?;
    }
    Ok(())
}

/// Picks the format from the file extension; anything but `.csv` is JSON
pub fn format_for(path: &Path) -> ExportFormat {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.parse().ok())
        .unwrap_or_default()
}

/// Writes `samples` to `path` in the given format, replacing the file
pub fn export_history(
    samples: &[Sample],
    path: &Path,
    format: ExportFormat,
) -> Result<(), MinerError> {
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Json => write_json(samples, &mut writer)?,
        ExportFormat::Csv => write_csv(samples, &mut writer)?,
    }
    writer.flush()?;
    log::info!(
        "Exported {} sample(s) as {} to {}",
        samples.len(),
        format,
        path.display()
    );
    Ok(())
}
