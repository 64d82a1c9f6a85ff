//! Archive loading and report classification.
//!
//! An archive is unpacked into a freshly named scratch directory (a random
//! UUID under the scratch root), so concurrently processed archives never
//! collide. The scratch directory is removed when the [`XbrlArchive`] is
//! dropped, and also when opening fails part-way.

pub mod category;
pub mod error;

use std::fs::File;
use std::path::{Path, PathBuf};

use uuid::Uuid;
use walkdir::WalkDir;

pub use category::{CategoryClass, ReportCategory};
pub use error::{ArchiveError, ArchiveResult, NotXbrlReason};

use crate::model::DocumentKey;

/// File-name suffix of disclosure-summary documents.
pub const SUMMARY_SUFFIX: &str = "ixbrl.htm";

/// A directory that is removed on drop.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Create a uniquely named directory under `root`.
    pub fn create(root: &Path) -> ArchiveResult<Self> {
        let path = root.join(Uuid::new_v4().to_string());
        std::fs::create_dir_all(&path).map_err(|source| ArchiveError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "scratch directory removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove scratch directory")
            }
        }
    }
}

/// An unpacked, classified disclosure archive.
#[derive(Debug)]
pub struct XbrlArchive {
    archive_path: PathBuf,
    key: DocumentKey,
    category: ReportCategory,
    summary_files: Vec<PathBuf>,
    scratch: ScratchDir,
}

impl XbrlArchive {
    /// Unpack `archive_path` and classify it.
    ///
    /// The scratch directory is created under `scratch_root`, or next to the
    /// archive when no root is given.
    pub fn open(archive_path: &Path, scratch_root: Option<&Path>) -> ArchiveResult<Self> {
        let key =
            DocumentKey::from_archive_path(archive_path).ok_or_else(|| ArchiveError::NoFileName {
                archive: archive_path.display().to_string(),
            })?;
        let root = scratch_root
            .map(Path::to_path_buf)
            .or_else(|| archive_path.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));

        let scratch = ScratchDir::create(&root)?;
        unzip(archive_path, scratch.path())?;

        let summary_files = find_files(scratch.path(), |name| name.ends_with(SUMMARY_SUFFIX));
        let relative: Vec<String> = summary_files
            .iter()
            .map(|p| relative_name(scratch.path(), p))
            .collect();
        let category = classify(&relative).map_err(|reason| ArchiveError::NotXbrlDirectory {
            archive: archive_path.display().to_string(),
            reason,
        })?;

        tracing::debug!(
            archive = %archive_path.display(),
            %category,
            summaries = summary_files.len(),
            "archive classified"
        );

        Ok(Self {
            archive_path: archive_path.to_path_buf(),
            key,
            category,
            summary_files,
            scratch,
        })
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn key(&self) -> DocumentKey {
        self.key
    }

    pub fn category(&self) -> ReportCategory {
        self.category
    }

    /// Root of the unpacked tree.
    pub fn working_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Disclosure documents (`*ixbrl.htm`), sorted by path.
    pub fn summary_files(&self) -> &[PathBuf] {
        &self.summary_files
    }

    /// Unpacked files whose name satisfies `pred`, sorted by path.
    pub fn files_matching(&self, pred: impl Fn(&str) -> bool) -> Vec<PathBuf> {
        find_files(self.working_dir(), pred)
    }
}

/// Decide the report category from the summary files' relative paths.
///
/// The category comes from the first path; its class then fixes how many
/// summary files are allowed.
pub fn classify(summary_paths: &[String]) -> Result<ReportCategory, NotXbrlReason> {
    let first = summary_paths.first().ok_or(NotXbrlReason::NoSummaryFile)?;
    let category = ReportCategory::detect(first).ok_or(NotXbrlReason::NoFinancialStatement)?;
    match category.class() {
        CategoryClass::FinancialStatement if summary_paths.len() > 1 => Ok(category),
        CategoryClass::FinancialStatement => Err(NotXbrlReason::MissingStatementFiles),
        CategoryClass::Revision if summary_paths.len() == 1 => Ok(category),
        CategoryClass::Revision => Err(NotXbrlReason::MultipleRevisionFiles),
    }
}

fn unzip(archive_path: &Path, into: &Path) -> ArchiveResult<()> {
    let file = File::open(archive_path).map_err(|source| ArchiveError::Io {
        path: archive_path.display().to_string(),
        source,
    })?;
    let zip_err = |source| ArchiveError::Zip {
        archive: archive_path.display().to_string(),
        source,
    };
    let mut zip = zip::ZipArchive::new(file).map_err(zip_err)?;
    zip.extract(into).map_err(zip_err)
}

/// Files under `dir` (recursive) whose name satisfies `pred`, sorted by path.
pub fn find_files(dir: &Path, pred: impl Fn(&str) -> bool) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| pred(&e.file_name().to_string_lossy()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

fn relative_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Write a zip archive with the given `(name, contents)` entries.
#[cfg(test)]
pub(crate) fn write_test_zip(path: &Path, entries: &[(&str, &str)]) {
    use std::io::Write;

    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, contents) in entries {
        zip.start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}
