//! Turns preliminary-count and recount files into the in-memory structures the
//! verifier works on. All parsing is done on `&str` so it can be tested without
//! touching the file system.

use crate::config::AuditType;
use crate::error::{DataConsistencyError, LoadError};
use crate::models::{
    BallotObservation, BatchId, BatchObservation, Candidate, Counts, ElectionData, Party, RecountSample, Tally,
};
use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

lazy_static! {
    static ref CSV_FILE: Regex = Regex::new(r"(?i)\.csv$").expect("valid file pattern");
}

/// A header row plus data rows, cells trimmed and unquoted.
struct CsvTable {
    headers: Vec<String>,
    rows: Vec<(usize, Vec<String>)>,
}

impl CsvTable {
    fn parse(text: &str) -> Result<Self, LoadError> {
        // Rows may be ragged; missing cells are reported per row later
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(row_error)?
            .iter()
            .map(|h| h.to_ascii_lowercase())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(row_error)?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
            rows.push((line, record.iter().map(str::to_string).collect()));
        }
        Ok(Self { headers, rows })
    }

    fn column(&self, name: &str) -> Result<usize, LoadError> {
        self.optional_column(name)
            .ok_or_else(|| LoadError::MissingColumn { column: name.to_string() })
    }

    fn optional_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

fn row_error(err: csv::Error) -> LoadError {
    let line = err.position().map(|p| p.line() as usize).unwrap_or(0);
    LoadError::Row { line, message: err.to_string() }
}

fn cell<'r>(row: &'r [String], column: usize, line: usize) -> Result<&'r str, LoadError> {
    row.get(column).map(String::as_str).ok_or_else(|| LoadError::Row {
        line,
        message: format!("expected at least {} cells, found {}", column + 1, row.len()),
    })
}

fn parse_batch(value: &str, line: usize) -> Result<BatchId, LoadError> {
    value.parse().map_err(|_| LoadError::Row {
        line,
        message: format!("batch identifier '{}' is not a non-negative integer", value),
    })
}

fn parse_votes(value: &str, candidate: &str, line: usize) -> Result<u64, LoadError> {
    let count: i64 = value.parse().map_err(|_| LoadError::Row {
        line,
        message: format!("vote count '{}' is not an integer", value),
    })?;
    if count < 0 {
        return Err(DataConsistencyError::NegativeCount {
            candidate: Candidate::from(candidate),
            count,
        }
        .into());
    }
    Ok(count as u64)
}

/// Preliminary results: `table,candidate,votes` with an optional `party` column.
pub fn parse_preliminary(text: &str) -> Result<ElectionData, LoadError> {
    let table = CsvTable::parse(text)?;
    let batch_col = table.column("table")?;
    let candidate_col = table.column("candidate")?;
    let votes_col = table.column("votes")?;
    let party_col = table.optional_column("party");

    let mut totals: Vec<(Candidate, u64)> = Vec::new();
    let mut batches: BTreeMap<BatchId, Counts> = BTreeMap::new();
    let mut affiliations: BTreeMap<Candidate, Party> = BTreeMap::new();

    for (line, row) in &table.rows {
        let batch = parse_batch(cell(row, batch_col, *line)?, *line)?;
        let name = cell(row, candidate_col, *line)?;
        let votes = parse_votes(cell(row, votes_col, *line)?, name, *line)?;
        let candidate = Candidate::from(name);

        if let Some(col) = party_col {
            let party = row.get(col).map(String::as_str).unwrap_or("");
            if !party.is_empty() {
                affiliations.insert(candidate.clone(), Party::from(party));
            }
        }
        *batches.entry(batch).or_default().entry(candidate.clone()).or_insert(0) += votes;
        totals.push((candidate, votes));
    }

    let election = ElectionData::new(Tally::new(totals))
        .with_batches(batches)
        .with_affiliations(affiliations);
    debug!(
        "preliminary results: {} candidates over {} batches",
        election.reported.len(),
        election.batches.len()
    );
    Ok(election)
}

/// Ballot-polling recount rows, `candidate,votes`, expanded into one
/// observation per ballot in row order. An empty candidate cell is an invalid
/// ballot; any other name is a vote and must appear in the preliminary count.
pub fn parse_ballot_recount(text: &str) -> Result<Vec<BallotObservation>, LoadError> {
    let table = CsvTable::parse(text)?;
    let candidate_col = table.column("candidate")?;
    let votes_col = table.column("votes")?;

    let mut ballots = Vec::new();
    for (line, row) in &table.rows {
        let name = cell(row, candidate_col, *line)?;
        let votes = parse_votes(cell(row, votes_col, *line)?, name, *line)?;
        let observation = if name.is_empty() {
            BallotObservation::Invalid
        } else {
            BallotObservation::Vote(Candidate::from(name))
        };
        ballots.extend(std::iter::repeat(observation).take(votes as usize));
    }
    Ok(ballots)
}

type BatchRow = (usize, BatchId, Candidate, u64);

fn batch_rows(text: &str) -> Result<Vec<BatchRow>, LoadError> {
    let table = CsvTable::parse(text)?;
    let batch_col = table.column("table")?;
    let candidate_col = table.column("candidate")?;
    let votes_col = table.column("votes")?;

    let mut rows = Vec::with_capacity(table.rows.len());
    for (line, row) in &table.rows {
        let batch = parse_batch(cell(row, batch_col, *line)?, *line)?;
        let name = cell(row, candidate_col, *line)?;
        let votes = parse_votes(cell(row, votes_col, *line)?, name, *line)?;
        rows.push((*line, batch, Candidate::from(name), votes));
    }
    Ok(rows)
}

/// Batch-comparison recount rows, `table,candidate,votes`. A table listed k
/// times per candidate was drawn k times; its per-draw recount is the average.
pub fn parse_batch_recount(text: &str) -> Result<Vec<BatchObservation>, LoadError> {
    assemble_batches(batch_rows(text)?)
}

fn assemble_batches(rows: Vec<BatchRow>) -> Result<Vec<BatchObservation>, LoadError> {
    // batch -> candidate -> (rows seen, summed votes, last line)
    let mut grouped: BTreeMap<BatchId, BTreeMap<Candidate, (u32, u64, usize)>> = BTreeMap::new();
    for (line, batch, candidate, votes) in rows {
        let entry = grouped.entry(batch).or_default().entry(candidate).or_insert((0, 0, line));
        entry.0 += 1;
        entry.1 += votes;
        entry.2 = line;
    }

    let mut observations = Vec::with_capacity(grouped.len());
    for (batch, per_candidate) in grouped {
        let draws = per_candidate.values().map(|(n, _, _)| *n).max().unwrap_or(1);
        let mut recounted = Counts::new();
        for (candidate, (n, votes, line)) in per_candidate {
            if n != draws {
                return Err(LoadError::Row {
                    line,
                    message: format!(
                        "candidate '{}' appears {} times in batch {} but other candidates appear {} times",
                        candidate, n, batch, draws
                    ),
                });
            }
            if votes % n as u64 != 0 {
                warn!(
                    "draws of batch {} disagree for '{}': {} votes over {} draws, using {}",
                    batch,
                    candidate,
                    votes,
                    n,
                    votes / n as u64
                );
            }
            recounted.insert(candidate, votes / n as u64);
        }
        observations.push(BatchObservation::new(batch, recounted).drawn(draws));
    }
    Ok(observations)
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_preliminary(path: &Path) -> Result<ElectionData, LoadError> {
    parse_preliminary(&read(path)?)
}

/// Recount files in `dir` matching `*.csv`, sorted by file name.
pub fn recount_files(dir: &Path) -> Result<Vec<std::path::PathBuf>, LoadError> {
    let entries = fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.display().to_string(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        let is_csv = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| CSV_FILE.is_match(name))
            .unwrap_or(false);
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    if files.is_empty() {
        return Err(LoadError::NoRecountFiles { dir: dir.display().to_string() });
    }
    Ok(files)
}

/// Reads every recount file in `dir` as evidence for the given audit type.
pub fn load_recount_dir(dir: &Path, audit_type: AuditType) -> Result<RecountSample, LoadError> {
    let files = recount_files(dir)?;
    info!("reading {} recount file(s) from {}", files.len(), dir.display());
    match audit_type {
        AuditType::BallotPolling => {
            let mut ballots = Vec::new();
            for file in &files {
                ballots.extend(parse_ballot_recount(&read(file)?)?);
            }
            Ok(RecountSample::ballots(ballots))
        }
        AuditType::BatchComparison => {
            // Draws of one table may be spread over several files.
            let mut rows = Vec::new();
            for file in &files {
                rows.extend(batch_rows(&read(file)?)?);
            }
            Ok(RecountSample::batches(assemble_batches(rows)?))
        }
    }
}

/// Reads a JSON document holding `ElectionData`.
pub fn parse_election_json(text: &str) -> Result<ElectionData, LoadError> {
    Ok(serde_json::from_str(text)?)
}

/// Reads a JSON document holding a `RecountSample`.
pub fn parse_sample_json(text: &str) -> Result<RecountSample, LoadError> {
    Ok(serde_json::from_str(text)?)
}
