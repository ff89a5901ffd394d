//! `bru make` command

use anyhow::Result;

use crate::cli::MakeArgs;
use bru::builder::GypMake;
use bru::ops::{make, MakeOptions};
use bru::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: MakeArgs) -> Result<()> {
    let driver = GypMake::new(ctx.config().gyp(), ctx.shell().clone());
    make(ctx, &MakeOptions { config: args.config }, &driver)?;
    Ok(())
}
