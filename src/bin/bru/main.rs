//! bru CLI - a dependency manager for gyp-built native modules

use anyhow::Result;
use clap::Parser;
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use bru::util::shell::{ColorChoice, Shell, Verbosity};
use bru::{BruError, GlobalContext};
use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        if let Some(help) = e.downcast_ref::<BruError>().and_then(|b| b.help()) {
            eprintln!("help: {}", help);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("bru=debug")
    } else if cli.quiet {
        EnvFilter::new("bru=warn")
    } else {
        EnvFilter::new("bru=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .without_time()
        .init();

    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else if cli.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };
    let color = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let mut ctx = GlobalContext::new()?;
    ctx.set_shell(Shell::new(verbosity, color));
    ctx.set_catalog(cli.catalog);

    // Execute command
    match cli.command {
        Commands::Install(args) => commands::install::execute(&ctx, args),
        Commands::Test(args) => commands::test::execute(&ctx, args),
        Commands::Make(args) => commands::make::execute(&ctx, args),
        Commands::Tree(args) => commands::tree::execute(&ctx, args),
        Commands::Cache(args) => commands::cache::execute(&ctx, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
