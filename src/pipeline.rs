//! Batch ingestion: directory scan, per-archive state machine, push protocol.
//!
//! Archives are processed one at a time. For each archive:
//!
//! 1. the remote store is asked whether the document is already active
//!    (if so it is skipped, which makes re-running a batch safe);
//! 2. the archive is unpacked and aggregated into a [`Document`];
//! 3. items are pushed: file path, then header, then source-file batches,
//!    all synchronously, then everything else concurrently on a bounded pool;
//! 4. only when every push succeeded is the document activated and generated.
//!
//! The first failed push fails the document. A run in which no archive was
//! activated ends in [`PipelineError::NoProgress`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::api::endpoints::endpoint_for;
use crate::api::{ApiResult, IngestApi};
use crate::archive::XbrlArchive;
use crate::config::IngestConfig;
use crate::document::{Document, DocumentBuilder};
use crate::error::{IngestError, PipelineError, PipelineResult};
use crate::model::{DocumentKey, Item, ItemKind};

/// Final state of one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// Already active in the remote store; nothing was pushed.
    Skipped,
    /// Every item pushed and activation requested.
    Activated,
    /// Classification, extraction or a push failed.
    Failed(String),
}

impl fmt::Display for ArchiveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => f.write_str("skipped"),
            Self::Activated => f.write_str("activated"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Outcome of every archive of a run, in scan order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub archives: Vec<(PathBuf, ArchiveOutcome)>,
}

impl RunReport {
    fn count(&self, pred: impl Fn(&ArchiveOutcome) -> bool) -> usize {
        self.archives.iter().filter(|(_, o)| pred(o)).count()
    }

    pub fn activated(&self) -> usize {
        self.count(|o| *o == ArchiveOutcome::Activated)
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| *o == ArchiveOutcome::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ArchiveOutcome::Failed(_)))
    }
}

/// Archives under `root` with extension `extension`, sorted by path.
pub fn scan_archives(root: &Path, extension: &str) -> PipelineResult<Vec<PathBuf>> {
    let scan_err = |source| PipelineError::Scan {
        path: root.display().to_string(),
        source,
    };
    let meta = std::fs::metadata(root).map_err(scan_err)?;
    if !meta.is_dir() {
        return Err(scan_err(std::io::Error::new(
            std::io::ErrorKind::NotADirectory,
            "not a directory",
        )));
    }
    let extension = extension.trim_start_matches('.');
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .map(|e| e.into_path())
        .collect();
    paths.sort();
    Ok(paths)
}

/// Drives archives through extraction and into the remote store.
pub struct Pipeline {
    config: IngestConfig,
    api: Arc<dyn IngestApi>,
    builder: DocumentBuilder,
    pool: Option<rayon::ThreadPool>,
}

impl Pipeline {
    pub fn new(config: IngestConfig, api: Arc<dyn IngestApi>) -> Self {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.push_workers.max(1))
            .thread_name(|i| format!("ixbrl-push-{i}"))
            .build();
        let pool = match pool {
            Ok(pool) => Some(pool),
            Err(e) => {
                tracing::warn!(error = %e, "push pool unavailable, pushing sequentially");
                None
            }
        };
        Self {
            config,
            api,
            builder: DocumentBuilder::default(),
            pool,
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Ingest every archive under `root`.
    ///
    /// Per-archive failures are logged and recorded in the report. The run
    /// itself fails only when the root cannot be scanned or when no archive
    /// was activated.
    pub fn run(&self, root: &Path) -> PipelineResult<RunReport> {
        let paths = scan_archives(root, &self.config.archive_extension)?;
        tracing::info!(root = %root.display(), archives = paths.len(), "starting ingestion run");

        let mut report = RunReport::default();
        for path in paths {
            let outcome = self.ingest_archive(&path);
            match &outcome {
                ArchiveOutcome::Failed(_) => {
                    tracing::warn!(archive = %path.display(), %outcome, "archive not ingested")
                }
                _ => tracing::info!(archive = %path.display(), %outcome, "archive processed"),
            }
            report.archives.push((path, outcome));
        }

        tracing::info!(
            activated = report.activated(),
            skipped = report.skipped(),
            failed = report.failed(),
            "ingestion run finished"
        );
        if report.activated() == 0 {
            return Err(PipelineError::NoProgress {
                attempted: report.archives.len(),
                skipped: report.skipped(),
                failed: report.failed(),
            });
        }
        Ok(report)
    }

    /// Run one archive through the full state machine.
    pub fn ingest_archive(&self, path: &Path) -> ArchiveOutcome {
        let Some(key) = DocumentKey::from_archive_path(path) else {
            return ArchiveOutcome::Failed(format!("{} has no file name", path.display()));
        };

        // 1. Skip documents the store already holds.
        match self.api.is_active(key) {
            Ok(true) => return ArchiveOutcome::Skipped,
            Ok(false) => {}
            Err(e) => return ArchiveOutcome::Failed(e.to_string()),
        }

        // 2. Unpack and aggregate.
        let document = match self.build(path) {
            Ok(document) => document,
            Err(e) => return ArchiveOutcome::Failed(e.to_string()),
        };
        tracing::debug!(archive = %path.display(), %key, "document assembled");

        // 3. Push. The scratch directory goes away with the document.
        let items = document.into_items();
        let pushed = self.push_all(&items);
        drop(items);
        if let Err(e) = pushed {
            return ArchiveOutcome::Failed(e.to_string());
        }

        // 4. Activate and generate.
        self.finish(key);
        ArchiveOutcome::Activated
    }

    fn build(&self, path: &Path) -> Result<Document, IngestError> {
        let archive = XbrlArchive::open(path, self.config.scratch_dir.as_deref())?;
        Ok(self.builder.build(archive)?)
    }

    /// Push every item; stops at the first failure.
    fn push_all(&self, items: &[Item]) -> ApiResult<()> {
        let early = [ItemKind::FilePath, ItemKind::HeadTitle];
        for kind in early {
            for item in items.iter().filter(|i| i.kind == kind) {
                self.push_one(item)?;
            }
        }
        for item in items.iter().filter(|i| i.kind.is_source_file()) {
            self.push_one(item)?;
        }

        let rest: Vec<&Item> = items
            .iter()
            .filter(|i| !early.contains(&i.kind) && !i.kind.is_source_file())
            .collect();
        match &self.pool {
            Some(pool) => pool.install(|| rest.par_iter().try_for_each(|item| self.push_one(item))),
            None => rest.iter().try_for_each(|item| self.push_one(item)),
        }
    }

    fn push_one(&self, item: &Item) -> ApiResult<()> {
        self.api.push(item).inspect_err(|e| {
            tracing::warn!(
                endpoint = endpoint_for(item.kind),
                kind = %item.kind,
                records = item.payload.len(),
                error = %e,
                "push failed"
            )
        })
    }

    /// Post-push calls. Failures are reported; the pushed records stay.
    fn finish(&self, key: DocumentKey) {
        if let Err(e) = self.api.activate(key) {
            tracing::warn!(%key, error = %e, "activation failed");
        }
        if let Err(e) = self.api.generate(key) {
            tracing::warn!(%key, error = %e, "generation failed");
        }
        match self.api.request_summary(key) {
            Ok(()) => tracing::info!(%key, "summary requested"),
            Err(e) => tracing::warn!(%key, error = %e, "summary request failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_filters_by_extension_and_sorts() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        std::fs::write(dir.path().join("b/2.zip"), b"").unwrap();
        std::fs::write(dir.path().join("1.ZIP"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let paths = scan_archives(dir.path(), "zip").unwrap();
        assert_eq!(paths, vec![dir.path().join("1.ZIP"), dir.path().join("b/2.zip")]);
    }

    #[test]
    fn scan_missing_root_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = scan_archives(&dir.path().join("absent"), "zip").unwrap_err();
        assert!(matches!(err, PipelineError::Scan { .. }));
    }

    #[test]
    fn report_counts() {
        let report = RunReport {
            archives: vec![
                ("a.zip".into(), ArchiveOutcome::Activated),
                ("b.zip".into(), ArchiveOutcome::Skipped),
                ("c.zip".into(), ArchiveOutcome::Failed("bad".into())),
                ("d.zip".into(), ArchiveOutcome::Skipped),
            ],
        };
        assert_eq!(report.activated(), 1);
        assert_eq!(report.skipped(), 2);
        assert_eq!(report.failed(), 1);
    }
}
