use clap::{ColorChoice, Parser};
use iptv_probe::{Args, logger};
use kdam::{term, term::Colorizer};
use std::{
    io::{IsTerminal, stderr},
    process,
};

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let color = match args.color {
        ColorChoice::Always => true,
        ColorChoice::Auto => stderr().is_terminal(),
        ColorChoice::Never => false,
    };
    term::init(color);
    colored::control::set_override(color);

    logger::Logger::init(logger::level_filter(args.verbose, args.quiet))?;
    args.command.execute()
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {:#}", "error".colorize("bold red"), e);
        process::exit(1);
    }
}
