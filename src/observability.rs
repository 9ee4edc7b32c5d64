//! Comparison Run Logger
//!
//! Structured logging of comparison runs for audit and usage statistics.
//! Entries are kept in a bounded in-memory buffer and optionally appended
//! to a JSONL file.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// One logged comparison run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonLogEntry {
    pub timestamp: DateTime<Utc>,
    pub query_id: String,
    pub measure: String,
    pub period: String,
    pub comparison: String,
    pub current_rows: usize,
    pub previous_rows: Option<usize>,
    pub duration_ms: u64,
    pub success: bool,
    pub error_message: Option<String>,
}

pub struct QueryLogger {
    log_file: Option<PathBuf>,
    entries: Arc<Mutex<Vec<ComparisonLogEntry>>>,
    max_in_memory: usize,
}

impl QueryLogger {
    pub fn new(log_file: Option<PathBuf>, max_in_memory: usize) -> Self {
        Self {
            log_file,
            entries: Arc::new(Mutex::new(Vec::new())),
            max_in_memory,
        }
    }

    /// Log a comparison run
    pub fn log(&self, entry: ComparisonLogEntry) -> Result<()> {
        {
            let mut entries = self.entries.lock().unwrap();
            entries.push(entry.clone());
            if entries.len() > self.max_in_memory {
                entries.remove(0);
            }
        }

        if self.log_file.is_some() {
            self.write_entry(&entry)?;
        }

        Ok(())
    }

    fn write_entry(&self, entry: &ComparisonLogEntry) -> Result<()> {
        if let Some(ref log_file) = self.log_file {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)?;
            let json = serde_json::to_string(entry)?;
            writeln!(file, "{}", json)?;
        }
        Ok(())
    }

    /// Most recent runs, newest first
    pub fn recent(&self, limit: usize) -> Vec<ComparisonLogEntry> {
        let entries = self.entries.lock().unwrap();
        entries.iter().rev().take(limit).cloned().collect()
    }

    /// Run counts per measure
    pub fn usage_stats(&self) -> HashMap<String, u64> {
        let entries = self.entries.lock().unwrap();
        let mut stats = HashMap::new();
        for entry in entries.iter() {
            *stats.entry(entry.measure.clone()).or_insert(0) += 1;
        }
        stats
    }
}

impl Default for QueryLogger {
    fn default() -> Self {
        Self::new(None, 1000)
    }
}
