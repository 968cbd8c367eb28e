use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

pub fn validate_tsv_or_csv_file(path: &str) -> Result<()> {
    let pb = PathBuf::from(path);

    let ext = pb
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("tsv") | Some("csv") => {}
        _ => anyhow::bail!("File must have a .tsv or .csv extension: {}", path),
    }

    if !pb.exists() {
        anyhow::bail!("File does not exist: {}", path);
    }

    Ok(())
}

pub fn validate_fasta_file(path: &str) -> Result<()> {
    let pb = PathBuf::from(path);

    let ext = pb
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("fasta") | Some("fa") | Some("faa") => {}
        _ => anyhow::bail!("File must have a .fasta, .fa or .faa extension: {}", path),
    }

    if !pb.exists() {
        anyhow::bail!("File does not exist: {}", path);
    }

    Ok(())
}

/// Tab for `.tsv`, comma otherwise.
pub fn delimiter_for<P: AsRef<Path>>(path: P) -> u8 {
    match path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .as_deref()
    {
        Some("tsv") => b'\t',
        _ => b',',
    }
}

pub fn write_bytes_to_file(path: &str, bytes: &[u8]) -> std::io::Result<()> {
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    Ok(())
}

/// Pretty-print `value` as JSON to `path`.
pub fn write_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
    write_bytes_to_file(&path.to_string_lossy(), json.as_bytes())
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}
