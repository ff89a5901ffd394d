//! `bru cache` command
//!
//! Inspect the user-level download cache shared by all projects. bru never
//! deletes from it.

use anyhow::Result;

use crate::cli::{CacheArgs, CacheCommands};
use bru::sources::DownloadCache;
use bru::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: CacheArgs) -> Result<()> {
    match args.command {
        CacheCommands::Path => {
            println!("{}", ctx.downloads_dir().display());
            Ok(())
        }
        CacheCommands::List => list_cache(ctx),
    }
}

fn list_cache(ctx: &GlobalContext) -> Result<()> {
    let cache = DownloadCache::new(ctx.downloads_dir());
    let archives = cache.list()?;

    if archives.is_empty() {
        println!("(no cached downloads in {})", cache.root().display());
        return Ok(());
    }

    for archive in &archives {
        println!("{}/{}/{}", archive.module, archive.version, archive.file);
    }
    Ok(())
}
