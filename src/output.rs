// src/output.rs
use crate::error::Result;
use crate::types::{ClassificationResult, DuckHunterError, OutputConfig, ScanReport};
use colored::Colorize;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct OutputManager {
    config: OutputConfig,
}

impl OutputManager {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn report_path(&self) -> &str {
        &self.config.file
    }

    pub fn write_report(&self, report: &ScanReport) -> Result<()> {
        let file_path = &self.config.file;
        info!("Generating report: {}", file_path);

        if let Some(parent) = Path::new(file_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DuckHunterError::ReportWriteError(format!("Failed to create directory: {}", e)))?;
            }
        }

        let file = File::create(file_path)
            .map_err(|e| DuckHunterError::ReportWriteError(format!("Failed to create {}: {}", file_path, e)))?;
        let mut writer = BufWriter::new(file);
        write_results(&mut writer, &report.results)?;
        writer
            .flush()
            .map_err(|e| DuckHunterError::ReportWriteError(e.to_string()))?;

        if !self.config.silent {
            println!("Analysis completed. Check the {} file for results.", file_path);
        }
        Ok(())
    }

    pub fn print_summary(&self, report: &ScanReport) {
        if self.config.silent {
            return;
        }
        println!(
            "[*] {} checked: {} vulnerable, {} not vulnerable, {} not reachable ({:.2}s)",
            report.stats.total,
            report.stats.vulnerable,
            report.stats.not_vulnerable,
            report.stats.not_reachable,
            report.stats.duration.as_secs_f64()
        );
    }
}

/// Console rendition of a result: the report line, colored by verdict.
pub fn console_line(result: &ClassificationResult) -> String {
    let line = result.to_string();
    match result {
        ClassificationResult::Vulnerable { .. } => line.green().bold().to_string(),
        ClassificationResult::NotVulnerable { .. } => line.yellow().to_string(),
        ClassificationResult::NotReachable { .. } => line.red().to_string(),
    }
}

/// One line per result, in the order given.
pub fn write_results<W: Write>(writer: &mut W, results: &[ClassificationResult]) -> Result<()> {
    for result in results {
        writeln!(writer, "{}", result).map_err(|e| DuckHunterError::ReportWriteError(e.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ScanStats, Signature};
    use std::time::Duration;

    fn sample_report() -> ScanReport {
        let results = vec![
            ClassificationResult::NotReachable { subdomain: "slow.example.com".to_string() },
            ClassificationResult::Vulnerable {
                subdomain: "a.github.io".to_string(),
                provider: "github.io".to_string(),
                signature: Signature::NoRecords,
            },
            ClassificationResult::NotVulnerable { subdomain: "b.example.com".to_string() },
        ];
        let stats = ScanStats::from_results(&results, Duration::from_millis(10));
        ScanReport { results, stats, timestamp: "2026-01-01T00:00:00+00:00".to_string() }
    }

    #[test]
    fn test_report_lines() {
        let mut buf = Vec::new();
        write_results(&mut buf, &sample_report().results).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "[Not Reachable] slow.example.com\n\
             [Vulnerable] a.github.io is vulnerable under github.io (No A records found)\n\
             [Not Vulnerable] b.example.com\n"
        );
    }

    #[test]
    fn test_console_line_colors_by_verdict() {
        colored::control::set_override(true);
        let results = sample_report().results;

        let reachable = console_line(&results[0]);
        let vulnerable = console_line(&results[1]);
        let safe = console_line(&results[2]);

        assert!(reachable.contains("\u{1b}[31m") && reachable.contains("[Not Reachable] slow.example.com"));
        assert!(vulnerable.contains("32m") && vulnerable.contains("a.github.io is vulnerable under github.io"));
        assert!(safe.contains("\u{1b}[33m") && safe.contains("[Not Vulnerable] b.example.com"));
    }

    #[test]
    fn test_write_report_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/report.txt");
        let manager = OutputManager::new(OutputConfig {
            file: path.to_string_lossy().to_string(),
            verbose: false,
            silent: true,
        });

        manager.write_report(&sample_report()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.contains("[Not Vulnerable] b.example.com"));
        assert!(!contents.contains("[Not Vulnerable] [Not Vulnerable]"));
    }

    #[test]
    fn test_unwritable_path_is_report_error() {
        let dir = tempfile::tempdir().unwrap();
        let manager = OutputManager::new(OutputConfig {
            // a directory cannot be opened as a file
            file: dir.path().to_string_lossy().to_string(),
            verbose: false,
            silent: true,
        });
        assert!(matches!(
            manager.write_report(&sample_report()),
            Err(DuckHunterError::ReportWriteError(_))
        ));
    }
}
