use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use hivdr_ensemble::data_handling::DrugDataset;
use hivdr_ensemble::registry::DrugRegistry;
use hivdr_features::{vectorize_str, Representation};

use crate::util::delimiter_for;

/// Cell markers in position columns that cannot be turned into a residue.
const UNUSABLE_CELLS: &[char] = &['#', '~', '.', 'X'];
/// Marks "same as consensus" in sparse position tables.
const CONSENSUS_MARKER: char = '-';

#[derive(Debug, Clone, PartialEq)]
pub struct FastaRecord {
    pub id: String,
    pub sequence: String,
}

/// Read every record of a FASTA file.
///
/// The record id is the first whitespace-separated token of the header.
/// Sequence lines are concatenated; blank lines are ignored.
pub fn read_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<FastaRecord>> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open file: {:?}", path.as_ref()))?;
    let reader = BufReader::new(file);

    let mut records: Vec<FastaRecord> = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(header) = line.strip_prefix('>') {
            let id = header
                .split_whitespace()
                .next()
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("seq{}", records.len() + 1));
            records.push(FastaRecord {
                id,
                sequence: String::new(),
            });
        } else {
            match records.last_mut() {
                Some(record) => record.sequence.push_str(line),
                None => anyhow::bail!(
                    "{:?}: sequence data before the first header at line {}",
                    path.as_ref(),
                    line_no + 1
                ),
            }
        }
    }

    Ok(records)
}

/// Sequence of the first record of a consensus FASTA file.
pub fn read_consensus<P: AsRef<Path>>(path: P) -> Result<String> {
    let records = read_fasta(&path)?;
    records
        .into_iter()
        .next()
        .map(|r| r.sequence.to_uppercase())
        .ok_or_else(|| anyhow::anyhow!("Consensus file {:?} has no records", path.as_ref()))
}

/// Position column index (1-based) for headers like `P1`, `P99`.
fn position_index(header: &str) -> Option<usize> {
    let rest = header.trim().strip_prefix('P').or_else(|| header.trim().strip_prefix('p'))?;
    rest.parse::<usize>().ok().filter(|&i| i > 0)
}

/// Resolve one position cell to a residue letter.
///
/// Multi-letter cells (mixtures), unusable markers and unresolvable
/// consensus markers yield `None`.
fn resolve_cell(cell: &str, position: usize, consensus: Option<&str>) -> Option<char> {
    let cell = cell.trim().to_uppercase();
    let mut chars = cell.chars();
    let residue = chars.next()?;
    if chars.next().is_some() || UNUSABLE_CELLS.contains(&residue) {
        return None;
    }
    if residue == CONSENSUS_MARKER {
        return consensus.and_then(|c| c.chars().nth(position - 1));
    }
    Some(residue)
}

/// Parse a raw fold-change cell into log10 fold-change.
///
/// Missing, non-numeric and non-positive values yield `None`.
pub fn parse_fold_change(cell: &str) -> Option<f64> {
    let value: f64 = cell.trim().parse().ok()?;
    if value.is_finite() && value > 0.0 {
        Some(value.log10())
    } else {
        None
    }
}

/// Load one [`DrugDataset`] per registry drug from a CSV/TSV table.
///
/// The table must have one raw fold-change column per drug and either a
/// `sequence` column or positional columns `P1..Pn`. Rows whose sequence
/// cannot be encoded are dropped for every drug; rows missing a drug's
/// value are dropped for that drug only.
pub fn load_drug_datasets<P: AsRef<Path>>(
    path: P,
    registry: &DrugRegistry,
    representation: Representation,
    consensus: Option<&str>,
) -> Result<Vec<DrugDataset>> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open file: {:?}", path.as_ref()))?;
    let reader = BufReader::new(file);

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter_for(&path))
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let find_column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };

    let sequence_col = find_column("sequence");
    let mut position_cols: Vec<(usize, usize)> = headers
        .iter()
        .enumerate()
        .filter_map(|(col, h)| position_index(h).map(|pos| (pos, col)))
        .collect();
    position_cols.sort_unstable();

    if sequence_col.is_none() && position_cols.is_empty() {
        anyhow::bail!(
            "{:?} has neither a 'sequence' column nor P1..Pn position columns",
            path.as_ref()
        );
    }

    let drug_cols: Vec<(String, usize)> = registry
        .iter()
        .map(|drug| {
            find_column(drug)
                .map(|col| (drug.clone(), col))
                .ok_or_else(|| anyhow::anyhow!("Missing drug column '{}' in {:?}", drug, path.as_ref()))
        })
        .collect::<Result<_>>()?;

    let mut sequences: Vec<Vec<String>> = vec![Vec::new(); drug_cols.len()];
    let mut targets: Vec<Vec<f64>> = vec![Vec::new(); drug_cols.len()];
    let mut n_rows = 0usize;
    let mut n_unusable = 0usize;

    for result in rdr.records() {
        let record = result?;
        n_rows += 1;

        let sequence = match sequence_col {
            Some(col) => record
                .get(col)
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.chars().any(|c| UNUSABLE_CELLS.contains(&c) || c == CONSENSUS_MARKER)),
            None => position_cols
                .iter()
                .map(|&(pos, col)| record.get(col).and_then(|cell| resolve_cell(cell, pos, consensus)))
                .collect::<Option<String>>(),
        };

        let sequence = match sequence {
            Some(seq) if vectorize_str(&seq, representation).is_ok() => seq,
            _ => {
                n_unusable += 1;
                continue;
            }
        };

        for (i, (_, col)) in drug_cols.iter().enumerate() {
            if let Some(target) = record.get(*col).and_then(parse_fold_change) {
                sequences[i].push(sequence.clone());
                targets[i].push(target);
            }
        }
    }

    log::info!(
        "Read {} rows from {:?}, {} dropped for unusable sequences",
        n_rows,
        path.as_ref(),
        n_unusable
    );

    drug_cols
        .into_iter()
        .zip(sequences.into_iter().zip(targets))
        .map(|((drug, _), (seqs, ys))| Ok(DrugDataset::new(drug, seqs, ys)?))
        .collect()
}
