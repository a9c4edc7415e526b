use chrono::Utc;
use eyre::{Result, WrapErr};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::types::ScanOutcome;

/// Display row for the `session` summary table.
#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub backend: &'static str,
    pub command: String,
    pub target: String,
    pub time: String,
    pub status: &'static str,
}

/// Append-only ledger of scan outcomes for the active session, plus the
/// on-disk results directory.
///
/// One instance is shared (`Arc`) between the interactive loop and every
/// in-flight scan worker; the mutex scope covers each insert or snapshot in
/// full, so readers never observe a half-written entry.
pub struct ResultStore {
    results_dir: PathBuf,
    ledger: Mutex<Vec<ScanOutcome>>,
}

impl ResultStore {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
            ledger: Mutex::new(Vec::new()),
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Insert the outcome, replacing any prior entry with the same
    /// (backend, command, target) key in place. Replacement keeps the
    /// original insertion position, so `summarize` and `export_all` stay in
    /// first-completion order.
    pub fn record(&self, outcome: ScanOutcome) {
        let key = outcome.key();
        let mut ledger = self.ledger.lock().unwrap_or_else(|e| e.into_inner());
        match ledger.iter_mut().find(|entry| entry.key() == key) {
            Some(entry) => {
                log::debug!("[store] record_replace: key={}", key);
                *entry = outcome;
            }
            None => {
                log::debug!("[store] record_insert: key={} total={}", key, ledger.len() + 1);
                ledger.push(outcome);
            }
        }
    }

    /// Consistent snapshot of display rows, in insertion order.
    pub fn summarize(&self) -> Vec<SummaryRow> {
        let ledger = self.ledger.lock().unwrap_or_else(|e| e.into_inner());
        ledger
            .iter()
            .map(|outcome| SummaryRow {
                backend: outcome.backend.label(),
                command: outcome.command.clone(),
                target: outcome.target.clone(),
                time: outcome.started_at.format("%H:%M:%S").to_string(),
                status: outcome.status.label(),
            })
            .collect()
    }

    /// Full copy of the ledger for export.
    pub fn snapshot(&self) -> Vec<ScanOutcome> {
        let ledger = self.ledger.lock().unwrap_or_else(|e| e.into_inner());
        ledger.clone()
    }

    pub fn len(&self) -> usize {
        self.ledger.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write one outcome to `{command}_{target}_{timestamp}.txt` inside the
    /// results directory. The caller reports failures as warnings; the
    /// in-memory entry is unaffected either way.
    pub fn persist_one(&self, outcome: &ScanOutcome) -> Result<PathBuf> {
        fs::create_dir_all(&self.results_dir).wrap_err_with(|| {
            format!(
                "failed to create results directory {}",
                self.results_dir.display()
            )
        })?;

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let filename = format!(
            "{}_{}_{}.txt",
            sanitize_component(&outcome.command),
            sanitize_component(&outcome.target),
            timestamp
        );
        let path = self.results_dir.join(filename);

        let mut file = fs::File::create(&path)
            .wrap_err_with(|| format!("failed to create {}", path.display()))?;
        writeln!(file, "osint-term scan results")?;
        writeln!(file, "Command: {} {}", outcome.command, outcome.target)?;
        writeln!(
            file,
            "Timestamp: {}",
            outcome.started_at.format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(file, "{}", "=".repeat(50))?;
        writeln!(file)?;
        file.write_all(outcome.output.as_bytes())?;
        writeln!(file)?;

        log::info!(
            "[store] persisted: command={} target={} path={}",
            outcome.command,
            outcome.target,
            path.display()
        );
        Ok(path)
    }

    /// Write every ledger entry, in insertion order, to one markdown
    /// document: a header with the export time and total count, then one
    /// section per entry with its raw output in a fenced block.
    pub fn export_all(&self) -> Result<PathBuf> {
        let entries = self.snapshot();

        fs::create_dir_all(&self.results_dir).wrap_err_with(|| {
            format!(
                "failed to create results directory {}",
                self.results_dir.display()
            )
        })?;

        let now = Utc::now();
        let path = self
            .results_dir
            .join(format!("session_export_{}.md", now.format("%Y%m%d_%H%M%S")));

        let mut doc = String::new();
        doc.push_str("# osint-term Session Export\n\n");
        doc.push_str(&format!(
            "**Export Time:** {}\n",
            now.format("%Y-%m-%d %H:%M:%S")
        ));
        doc.push_str(&format!("**Total Scans:** {}\n\n", entries.len()));

        for outcome in &entries {
            doc.push_str(&format!(
                "## {}: {} {}\n",
                outcome.backend.label(),
                outcome.command,
                outcome.target
            ));
            doc.push_str(&format!(
                "**Time:** {}\n",
                outcome.started_at.format("%H:%M:%S")
            ));
            doc.push_str("```\n");
            doc.push_str(&outcome.output);
            doc.push_str("\n```\n\n");
        }

        fs::write(&path, doc).wrap_err_with(|| format!("failed to write {}", path.display()))?;

        log::info!(
            "[store] exported: entries={} path={}",
            entries.len(),
            path.display()
        );
        Ok(path)
    }
}

/// Keep artifact names filesystem-safe; targets may carry `/` or `:`.
fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BackendKind, OutcomeStatus};

    fn outcome(command: &str, target: &str, output: &str) -> ScanOutcome {
        ScanOutcome {
            backend: BackendKind::NativeSingle,
            command: command.to_string(),
            target: target.to_string(),
            started_at: Utc::now(),
            output: output.to_string(),
            status: OutcomeStatus::Success,
            error: None,
            saved_to: None,
        }
    }

    #[test]
    fn record_keeps_exactly_one_entry_per_key() {
        let store = ResultStore::new("unused");
        store.record(outcome("dlkp", "example.com", "first"));
        store.record(outcome("whis", "example.com", "other"));
        store.record(outcome("dlkp", "example.com", "second"));

        assert_eq!(store.len(), 2);
        let entries = store.snapshot();
        // replacement keeps the original position and takes the new value
        assert_eq!(entries[0].command, "dlkp");
        assert_eq!(entries[0].output, "second");
        assert_eq!(entries[1].command, "whis");
    }

    #[test]
    fn summarize_reflects_insertion_order_and_status() {
        let store = ResultStore::new("unused");
        store.record(outcome("dlkp", "example.com", "ok"));
        let mut failed = outcome("whis", "example.com", "");
        failed.status = OutcomeStatus::Timeout;
        store.record(failed);

        let rows = store.summarize();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].command, "dlkp");
        assert_eq!(rows[0].status, "SUCCESS");
        assert_eq!(rows[1].status, "TIMEOUT");
        assert_eq!(rows[0].backend, "Native");
    }

    #[test]
    fn persist_one_writes_header_and_raw_output() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path().join("results"));
        let path = store
            .persist_one(&outcome("dlkp", "example.com", "A 93.184.216.34"))
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("Command: dlkp example.com"));
        assert!(text.contains("A 93.184.216.34"));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("dlkp_example.com_"));
    }

    #[test]
    fn persist_one_sanitizes_awkward_targets() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path());
        let path = store
            .persist_one(&outcome("iplc", "2001:db8::1", "somewhere"))
            .unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("iplc_2001_db8__1_"));
    }

    #[test]
    fn export_round_trips_every_output_and_the_count() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path());
        store.record(outcome("dlkp", "example.com", "dns says hello"));
        store.record(outcome("whis", "example.com", "registrar: example"));

        let path = store.export_all().unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("**Total Scans:** 2"));
        assert!(text.contains("dns says hello"));
        assert!(text.contains("registrar: example"));
        assert!(text.contains("## Native: dlkp example.com"));
        // entry sections appear in insertion order
        let dlkp = text.find("## Native: dlkp").unwrap();
        let whis = text.find("## Native: whis").unwrap();
        assert!(dlkp < whis);
    }

    #[test]
    fn persistence_failure_is_an_error_and_leaves_the_ledger_intact() {
        let dir = tempfile::tempdir().unwrap();
        // a plain file where the results directory should be
        let blocker = dir.path().join("results");
        fs::write(&blocker, "not a directory").unwrap();

        let store = ResultStore::new(&blocker);
        store.record(outcome("dlkp", "example.com", "ok"));

        assert!(store.export_all().is_err());
        assert!(store.persist_one(&outcome("dlkp", "example.com", "ok")).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn concurrent_writers_do_not_corrupt_the_ledger() {
        let store = std::sync::Arc::new(ResultStore::new("unused"));
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = std::sync::Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                for j in 0..50 {
                    store.record(outcome(&format!("cmd{}", i), &format!("t{}", j), "out"));
                    let _ = store.summarize();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 8 * 50);
    }
}
