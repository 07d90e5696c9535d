// src/utils.rs
use crate::types::DuckHunterError;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Reads lines from a file into a vector of strings.
pub fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    let file = File::open(path)?;
    read_lines_from(BufReader::new(file))
}

pub fn read_lines_from<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    reader.lines().collect()
}

/// Loads a subdomain list file. A missing or unreadable file is fatal for the run.
pub fn read_subdomain_file(path: &Path) -> Result<Vec<String>, DuckHunterError> {
    let lines = read_lines(path).map_err(|source| DuckHunterError::FileReadError {
        path: path.display().to_string(),
        source,
    })?;
    Ok(normalize_subdomains(lines))
}

/// Trims entries and drops blank and `#` comment lines.
pub fn normalize_subdomains<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| clean_subdomain(line.as_ref()))
        .collect()
}

pub fn clean_subdomain(line: &str) -> Option<String> {
    let cleaned = line.trim();
    if cleaned.is_empty() || cleaned.starts_with('#') {
        return None;
    }
    Some(cleaned.to_string())
}
