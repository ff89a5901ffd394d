//! `bru install` command

use anyhow::Result;

use crate::cli::InstallArgs;
use bru::core::Installable;
use bru::ops::{install, InstallOptions};
use bru::sources::HttpDownloader;
use bru::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: InstallArgs) -> Result<()> {
    let installables = args
        .installables
        .iter()
        .map(|arg| arg.parse::<Installable>())
        .collect::<Result<Vec<_>>>()?;

    let downloader = HttpDownloader::new(ctx.shell().clone())?;
    let result = install(ctx, &InstallOptions { installables }, &downloader)?;

    if !result.resolution.conflicts().is_empty() {
        ctx.shell().warn(format!(
            "{} version conflicts, run `bru tree` for details",
            result.resolution.conflicts().len()
        ));
    }

    Ok(())
}
