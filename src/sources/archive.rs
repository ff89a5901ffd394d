//! Archive unpacking.
//!
//! The format is recognized from the file's leading bytes rather than its
//! name: gzip-compressed tar, plain tar, or zip.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use tracing::info;

use crate::core::BruError;
use crate::sources::staging::{AcquisitionUnit, Outcome, UnitState};
use crate::util::hash;

/// Recognized archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Tar,
    Zip,
}

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";
const ZIP_EMPTY_MAGIC: [u8; 4] = *b"PK\x05\x06";
const USTAR_OFFSET: usize = 257;

/// Identify an archive from its first bytes.
pub fn sniff(header: &[u8]) -> Option<ArchiveFormat> {
    if header.starts_with(&GZIP_MAGIC) {
        Some(ArchiveFormat::TarGz)
    } else if header.starts_with(&ZIP_MAGIC) || header.starts_with(&ZIP_EMPTY_MAGIC) {
        Some(ArchiveFormat::Zip)
    } else if header.len() >= USTAR_OFFSET + 5
        && &header[USTAR_OFFSET..USTAR_OFFSET + 5] == b"ustar"
    {
        Some(ArchiveFormat::Tar)
    } else {
        None
    }
}

/// Detect the format of the archive at `path`.
pub fn detect(path: &Path) -> Result<ArchiveFormat> {
    let mut file =
        File::open(path).with_context(|| format!("failed to open archive {}", path.display()))?;
    let mut header = [0u8; 512];
    let mut filled = 0;
    while filled < header.len() {
        let n = file.read(&mut header[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    sniff(&header[..filled]).ok_or_else(|| {
        BruError::UnsupportedArchive {
            path: path.to_path_buf(),
        }
        .into()
    })
}

/// Extract the archive at `path` into `dest`.
pub fn extract(path: &Path, dest: &Path) -> Result<()> {
    let format = detect(path)?;
    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create directory: {}", dest.display()))?;

    let file =
        File::open(path).with_context(|| format!("failed to open archive {}", path.display()))?;

    match format {
        ArchiveFormat::TarGz => unpack_tar(GzDecoder::new(BufReader::new(file)), dest),
        ArchiveFormat::Tar => unpack_tar(BufReader::new(file), dest),
        ArchiveFormat::Zip => {
            let mut archive = zip::ZipArchive::new(BufReader::new(file))
                .with_context(|| format!("failed to read zip archive {}", path.display()))?;
            archive
                .extract(dest)
                .with_context(|| format!("failed to extract {}", path.display()))
        }
    }
    .with_context(|| format!("failed to unpack {} into {}", path.display(), dest.display()))
}

fn unpack_tar<R: Read>(reader: R, dest: &Path) -> Result<()> {
    let mut archive = tar::Archive::new(reader);
    for entry in archive.entries().context("failed to read tar entries")? {
        let mut entry = entry.context("failed to read tar entry")?;
        // `unpack_in` refuses entries that would escape `dest`.
        let name = entry
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        entry
            .unpack_in(dest)
            .with_context(|| format!("failed to unpack entry {}", name))?;
    }
    Ok(())
}

/// Extract `archive` into `dest` unless `<dest>/<archive name>.unpack_done`
/// exists. The marker records the archive's SHA-256 and is written only
/// after extraction succeeds.
pub fn unpack_once(archive: &Path, dest: &Path) -> Result<Outcome> {
    let name = archive
        .file_name()
        .with_context(|| format!("archive path has no file name: {}", archive.display()))?;
    let marker = dest.join(format!("{}.unpack_done", name.to_string_lossy()));

    let unit = AcquisitionUnit::marker(marker);
    if unit.state() == UnitState::Committed {
        return Ok(Outcome::AlreadyDone);
    }

    let digest = hash::sha256_file(archive)?;
    unit.with_record(format!("sha256:{}\n", digest))
        .ensure(|dir| {
            info!("unpacking {} into {}", archive.display(), dir.display());
            extract(archive, dir)
        })
}
