mod bfs;
mod cli;
mod image;

use std::io::BufWriter;

use anyhow::Result;
use clap::Parser;
use log::warn;

use cli::Args;
use image::EntrySpec;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .format_timestamp(None)
        .format_target(false)
        .init();

    let specs = args
        .files
        .iter()
        .map(|spec| EntrySpec::parse(spec))
        .collect::<Result<Vec<_>, _>>()?;

    // Specifiers are validated and sized before the output is created,
    // so a bad invocation never leaves an image behind.
    let plan = image::plan(&specs, args.start_block)?;

    let mut output = BufWriter::new(image::create_output(&args.output)?);
    let summary = image::serialize(&plan, &mut output)?;

    if !summary.superblock_written {
        warn!("superblock never written: the image has no directory table");
    }

    Ok(())
}
