//! Acquisition units: stage, then commit by rename.
//!
//! Every expensive step (download, unpack, clone, legacy build) is an
//! [`AcquisitionUnit`] whose evidence of completion is a path on disk:
//!
//! ```text
//! Absent --begin--> Stage(temp path) --commit--> Committed(final path)
//! ```
//!
//! Work happens at a temporary path created next to the final one, so the
//! commit is a same-filesystem rename. A process killed mid-stage leaves at
//! most an orphaned temporary; the final path only ever appears complete.
//!
//! Three evidence kinds exist:
//! - `file`: the work writes the staged file, committed by rename.
//! - `directory`: the work fills the staged directory, committed by rename.
//! - `marker`: the work mutates the directory containing the marker in
//!   place; the marker is written atomically afterwards.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::{NamedTempFile, TempDir};
use tracing::debug;

use crate::util::fs;

/// What kind of evidence marks a unit as done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceKind {
    File,
    Directory,
    Marker,
}

/// Whether a unit's evidence exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Absent,
    Committed,
}

/// Result of [`AcquisitionUnit::ensure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The work ran and was committed.
    Performed,
    /// Evidence already existed; nothing ran.
    AlreadyDone,
}

/// One idempotent, atomically committed step.
#[derive(Debug, Clone)]
pub struct AcquisitionUnit {
    path: PathBuf,
    kind: EvidenceKind,
    record: String,
}

impl AcquisitionUnit {
    /// A unit whose evidence is the file at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::with_kind(path.into(), EvidenceKind::File)
    }

    /// A unit whose evidence is the directory at `path`.
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::with_kind(path.into(), EvidenceKind::Directory)
    }

    /// A unit whose evidence is the marker file at `path`; the work runs in
    /// the marker's parent directory.
    pub fn marker(path: impl Into<PathBuf>) -> Self {
        Self::with_kind(path.into(), EvidenceKind::Marker)
    }

    fn with_kind(path: PathBuf, kind: EvidenceKind) -> Self {
        AcquisitionUnit {
            path,
            kind,
            record: String::new(),
        }
    }

    /// Contents written to a marker on commit.
    pub fn with_record(mut self, record: impl Into<String>) -> Self {
        self.record = record.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> EvidenceKind {
        self.kind
    }

    pub fn state(&self) -> UnitState {
        if self.path.exists() {
            UnitState::Committed
        } else {
            UnitState::Absent
        }
    }

    fn parent(&self) -> Result<&Path> {
        self.path
            .parent()
            .with_context(|| format!("{} has no parent directory", self.path.display()))
    }

    /// Create the staging location.
    pub fn begin(&self) -> Result<Stage<'_>> {
        let parent = self.parent()?;
        fs::ensure_dir(parent)?;

        let staging = match self.kind {
            EvidenceKind::File => Staging::File(
                tempfile::Builder::new()
                    .prefix(".bru-stage-")
                    .tempfile_in(parent)
                    .with_context(|| {
                        format!("failed to create staging file in {}", parent.display())
                    })?,
            ),
            EvidenceKind::Directory => Staging::Directory(
                tempfile::Builder::new()
                    .prefix(".bru-stage-")
                    .tempdir_in(parent)
                    .with_context(|| {
                        format!("failed to create staging directory in {}", parent.display())
                    })?,
            ),
            EvidenceKind::Marker => Staging::InPlace(parent.to_path_buf()),
        };

        Ok(Stage {
            unit: self,
            staging,
        })
    }

    /// Run `work` against a fresh stage and commit it, unless the unit is
    /// already committed.
    ///
    /// `work` receives the staging path: the temporary file or directory, or
    /// for markers the directory the marker lives in. When `work` fails the
    /// stage is discarded and the final path is left untouched.
    pub fn ensure<F>(&self, work: F) -> Result<Outcome>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        if self.state() == UnitState::Committed {
            debug!("{} already present, skipping", self.path.display());
            return Ok(Outcome::AlreadyDone);
        }

        let stage = self.begin()?;
        work(stage.path())?;
        stage.commit()?;
        Ok(Outcome::Performed)
    }
}

enum Staging {
    File(NamedTempFile),
    Directory(TempDir),
    InPlace(PathBuf),
}

/// A unit in progress. Dropping it without committing discards the work.
pub struct Stage<'a> {
    unit: &'a AcquisitionUnit,
    staging: Staging,
}

impl Stage<'_> {
    /// Where the work should write.
    pub fn path(&self) -> &Path {
        match &self.staging {
            Staging::File(file) => file.path(),
            Staging::Directory(dir) => dir.path(),
            Staging::InPlace(dir) => dir,
        }
    }

    /// Move the staged result to the final path.
    pub fn commit(self) -> Result<()> {
        let target = &self.unit.path;
        match self.staging {
            Staging::File(file) => {
                file.persist(target)
                    .map_err(|e| e.error)
                    .with_context(|| format!("failed to commit {}", target.display()))?;
            }
            Staging::Directory(dir) => {
                std::fs::rename(dir.path(), target)
                    .with_context(|| format!("failed to commit {}", target.display()))?;
                // The temporary path no longer exists; dropping `dir` is a no-op.
                drop(dir);
            }
            Staging::InPlace(parent) => {
                let mut marker = NamedTempFile::new_in(&parent).with_context(|| {
                    format!("failed to create marker in {}", parent.display())
                })?;
                std::io::Write::write_all(&mut marker, self.unit.record.as_bytes())?;
                marker
                    .persist(target)
                    .map_err(|e| e.error)
                    .with_context(|| format!("failed to write marker {}", target.display()))?;
            }
        }
        debug!("committed {}", target.display());
        Ok(())
    }
}
