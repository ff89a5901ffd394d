//! Module sources.
//!
//! Sources are responsible for bringing a resolved module into the working
//! tree: downloading archives into the shared cache, unpacking them, checking
//! out version-control repositories and running legacy build commands. Each
//! step is an [`staging::AcquisitionUnit`], so repeating an install is cheap
//! and an interrupted one never leaves a half-written artifact behind.

pub mod acquire;
pub mod archive;
pub mod download;
pub mod staging;
pub mod vcs;

pub use acquire::Acquirer;
pub use download::{DownloadCache, Downloader, HttpDownloader};
pub use staging::{AcquisitionUnit, Outcome, UnitState};
