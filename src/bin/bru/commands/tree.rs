//! `bru tree` command

use anyhow::Result;

use crate::cli::TreeArgs;
use bru::ops::{render_tree, resolve_project};
use bru::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, _args: TreeArgs) -> Result<()> {
    let resolution = resolve_project(ctx)?;
    print!("{}", render_tree(&resolution));
    Ok(())
}
