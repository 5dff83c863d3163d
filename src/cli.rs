use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "bfsgen",
    about = "Generates a boot file system image",
    long_about = "Pack named files into a flat, block-addressed boot file system image. \
                  A source of 'bfs' specifies the superblock (the directory table itself) \
                  and is expected in a normal image."
)]
pub struct Args {
    /// Files to place in the image, in order (format: name=path; the
    /// bare literal 'bfs' places the superblock under that name)
    #[arg(value_name = "NAME=PATH")]
    pub files: Vec<String>,

    /// Output image path
    #[arg(short = 'o', long = "output", value_name = "FILE", default_value = "bfs.iso")]
    pub output: PathBuf,

    /// Starting block address: every entry's offset is shifted by this,
    /// for images appended onto an existing medium
    #[arg(short = 'b', long = "start-block", value_name = "BLOCK", default_value_t = 0)]
    pub start_block: u32,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}
