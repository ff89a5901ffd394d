//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

/// bru - a dependency manager for native modules built with gyp
#[derive(Parser)]
#[command(name = "bru")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Catalog root (directory of <module>/<version>.bru formulas)
    #[arg(long, global = true, env = "BRU_CATALOG", value_name = "DIR")]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install the project's dependencies, adding new modules first
    Install(InstallArgs),

    /// Run the tests of installed modules
    Test(TestArgs),

    /// Generate build files with gyp and run the toolchain
    Make(MakeArgs),

    /// Display the resolved dependency tree
    Tree(TreeArgs),

    /// Inspect the download cache
    Cache(CacheArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct InstallArgs {
    /// Modules to add, e.g. `googlemock@1.7.0` or `zlib` for the latest version
    #[arg(value_name = "MODULE[@VERSION]")]
    pub installables: Vec<String>,
}

#[derive(Args)]
pub struct TestArgs {
    /// Modules to test (defaults to every module in bru_modules)
    pub modules: Vec<String>,

    /// Build configuration used when test binaries must be built first
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Args)]
pub struct MakeArgs {
    /// Build configuration, e.g. Release or Debug
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Args)]
pub struct TreeArgs {}

#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommands,
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Show the download cache location
    Path,

    /// List cached archives
    List,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: CompletionShell,
}
