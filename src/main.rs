use anyhow::{Result, bail};
use clap::Parser;
use console::style;
use csproj_version::{
    arguments::Arguments,
    interactive::{self, Request},
    outcome::Outcome,
    parsers::WalkOptions,
    runner,
};
use log::LevelFilter;
use std::path::Path;

fn main() -> Result<()> {
    let args = Arguments::parse();
    pretty_env_logger::env_logger::builder()
        .filter_level(if args.verbose { LevelFilter::Debug } else { LevelFilter::Info })
        .format_timestamp(None)
        .parse_default_env()
        .init();

    let options = WalkOptions { follow_links: args.follow_links };

    let Request { root, version } = if args.silent {
        interactive::silent_request(&args)?
    } else {
        let stdin = std::io::stdin();
        interactive::prompt_request(&args, &options, &mut stdin.lock(), &mut std::io::stdout())?
    };

    let report = runner::run_version(&root, &version, &options, print_outcome)?;

    if report.is_empty() {
        println!("No .csproj files found under {}", root.display());
    } else {
        println!(
            "{} updated, {} skipped, {} failed",
            report.updated(),
            report.skipped(),
            report.failed()
        );
    }

    if report.failed() > 0 {
        bail!("{} file(s) could not be updated", report.failed());
    }
    Ok(())
}

fn print_outcome(path: &Path, outcome: &Outcome) {
    let line = outcome.describe(path);
    match outcome {
        Outcome::Updated => println!("{}", style(line).green()),
        Outcome::Skipped => println!("{}", line),
        Outcome::Failed(_) => eprintln!("{}", style(line).red()),
    }
}
