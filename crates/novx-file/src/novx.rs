//! A `.novx` project file: load/save orchestration and crash-safe
//! replacement of the target file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use novx_core::{ChangeHook, NovxError, Project, Result};

use crate::progress::ProgressLog;
use crate::{read, write};

/// Repairs applied while reading a document.
///
/// Healing never fails a load; the counts let a caller report what was
/// dropped on the way in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Healing {
    /// References to entities that do not exist, dropped.
    pub dangling_references: usize,
    /// Elements and ledger entries without a usable identity, skipped.
    pub skipped_entries: usize,
}

impl Healing {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.dangling_references == 0 && self.skipped_entries == 0
    }
}

/// One project document on disk.
///
/// A fresh instance is empty; [`NovxFile::load`] replaces the project,
/// ledger, and healing record wholesale on success and leaves them
/// untouched on failure. One owner per instance per load/save cycle; there
/// is no internal locking.
#[derive(Debug)]
pub struct NovxFile {
    path: PathBuf,
    hook: ChangeHook,
    pub project: Project,
    pub progress: ProgressLog,
    pub healing: Healing,
}

impl NovxFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, hook: ChangeHook) -> Self {
        Self {
            path: path.into(),
            project: Project::new(hook.clone()),
            progress: ProgressLog::new(),
            healing: Healing::default(),
            hook,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file and replaces the in-memory project and ledger.
    ///
    /// # Errors
    ///
    /// The version-gate and parse errors of the codec, or
    /// [`NovxError::Io`] when the file cannot be read. On error the
    /// previous in-memory state is kept.
    pub fn load(&mut self) -> Result<()> {
        let text = fs::read_to_string(&self.path)?;
        let (project, progress, healing) = read::read_document(&text, &self.path, &self.hook)?;
        self.project = project;
        self.progress = progress;
        self.healing = healing;
        debug!(path = %self.path.display(), sections = self.project.sections.len(), "loaded");
        Ok(())
    }

    /// Writes the project back to its own path.
    ///
    /// Runs the consistency passes first: today's word counts are merged
    /// into the ledger when logging is enabled, the unused-type propagation
    /// is re-run, the content languages are rescanned, and the locale is
    /// checked. An existing target is renamed to a `.bak` sibling before
    /// writing and restored if the write fails.
    ///
    /// # Errors
    ///
    /// [`NovxError::BackupFailed`] when the existing file cannot be moved
    /// aside, [`NovxError::WriteFailed`] when writing fails (the backup has
    /// been restored by then).
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone();
        self.save_to(&path)
    }

    /// Like [`NovxFile::save`], but to another path. The instance keeps its
    /// own path.
    ///
    /// # Errors
    ///
    /// See [`NovxFile::save`].
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        self.save_to(path)
    }

    fn save_to(&mut self, path: &Path) -> Result<()> {
        if self.project.save_word_count() {
            let (count, with_unused) = self.project.count_words();
            self.progress.record_today(count, with_unused);
        }
        self.project.adjust_section_types();
        self.project.update_languages();
        self.project.check_locale();
        let document = write::build_document(&self.project, &self.progress);
        replace_file(path, |target| fs::write(target, document.as_bytes()))
    }
}

/// Replaces the file at `path` with whatever `write` produces there.
///
/// An existing file is first renamed to a `.bak` sibling; if `write` fails
/// the backup is moved back and the error surfaced. On success the backup
/// stays behind, superseded.
pub(crate) fn replace_file(
    path: &Path,
    write: impl FnOnce(&Path) -> io::Result<()>,
) -> Result<()> {
    let backup = backup_path(path);
    let backed_up = if path.is_file() {
        fs::rename(path, &backup)
            .map_err(|_| NovxError::BackupFailed(path.display().to_string()))?;
        debug!(path = %path.display(), "moved the previous file aside");
        true
    } else {
        false
    };
    if let Err(err) = write(path) {
        if backed_up {
            // Best effort; the backup stays behind if even this fails.
            let _ = fs::rename(&backup, path);
        }
        debug!(path = %path.display(), error = %err, "write failed, previous file restored");
        return Err(NovxError::WriteFailed(path.display().to_string()));
    }
    Ok(())
}

fn backup_path(path: &Path) -> PathBuf {
    let mut backup = path.as_os_str().to_os_string();
    backup.push(".bak");
    PathBuf::from(backup)
}
