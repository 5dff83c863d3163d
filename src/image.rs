/// Image assembly: planning block placement for a list of named inputs
/// and serializing them into a block-aligned bfs image.
///
/// The whole operation is one linear pass: parse specifiers, size every
/// entry to a contiguous block range, shift the ranges by the start
/// block, then copy each source into its range (zero-padded to a block
/// boundary) and drop the directory table into the slot reserved for it.
/// An error at any step aborts the invocation; a partially written
/// output is left behind by design, the format is not transactional.
use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::bfs::{Directory, Node, BLOCK_SIZE, NAME_LEN, NODE_COUNT, SUPERBLOCK_NAME};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("could not open file {path:?}")]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not open {path:?} for writing")]
    SinkUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed file specifier '{spec}' ({reason})")]
    MalformedEntry { spec: String, reason: String },
    #[error("too many files to write (max is {NODE_COUNT})")]
    TooManyEntries,
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn malformed(spec: &str, reason: &str) -> BuildError {
    BuildError::MalformedEntry {
        spec: spec.to_string(),
        reason: reason.to_string(),
    }
}

/// Where an entry's bytes come from. The reserved source literal "bfs"
/// is resolved to `Superblock` once, at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Superblock,
}

/// One parsed `name=path` specifier.
#[derive(Debug, Clone)]
pub struct EntrySpec {
    pub name: String,
    pub source: Source,
}

impl EntrySpec {
    /// Parse a positional specifier: `name=path`, `name=bfs` for the
    /// directory table, or the bare literal `bfs` as shorthand for
    /// `bfs=bfs`.
    pub fn parse(spec: &str) -> Result<Self, BuildError> {
        if spec == SUPERBLOCK_NAME {
            return Ok(Self {
                name: SUPERBLOCK_NAME.to_string(),
                source: Source::Superblock,
            });
        }

        let (name, source) = spec
            .split_once('=')
            .ok_or_else(|| malformed(spec, "no '=' found"))?;

        if name.is_empty() {
            return Err(malformed(spec, "empty file name"));
        }
        if name.len() > NAME_LEN {
            return Err(malformed(
                spec,
                &format!("file name cannot exceed {NAME_LEN} bytes"),
            ));
        }

        let source = if source == SUPERBLOCK_NAME {
            Source::Superblock
        } else {
            Source::File(PathBuf::from(source))
        };

        Ok(Self {
            name: name.to_string(),
            source,
        })
    }
}

/// An entry with its placement decided.
#[derive(Debug, Clone)]
pub struct PlannedEntry {
    pub node: Node,
    pub source: Source,
}

/// The completed placement plan: entries in specification order, each
/// assigned a contiguous, non-overlapping block range.
#[derive(Debug, Clone)]
pub struct ImagePlan {
    entries: Vec<PlannedEntry>,
}

impl ImagePlan {
    pub fn entries(&self) -> &[PlannedEntry] {
        &self.entries
    }

    /// The directory table as it will appear in the image, with the
    /// final (shifted) offsets.
    pub fn directory(&self) -> Directory {
        Directory::new(self.entries.iter().map(|e| e.node).collect())
    }
}

/// Size every entry and assign block ranges by walking the specifiers in
/// order with a running block cursor, then shift every offset by
/// `start_block` (for images concatenated onto an existing medium).
pub fn plan(specs: &[EntrySpec], start_block: u32) -> Result<ImagePlan, BuildError> {
    if specs.len() > NODE_COUNT {
        return Err(BuildError::TooManyEntries);
    }

    let mut entries = Vec::with_capacity(specs.len());
    let mut cursor: u32 = 0;
    for spec in specs {
        let block_count = match &spec.source {
            // The directory table has no backing file; it is exactly one
            // block by construction.
            Source::Superblock => 1,
            Source::File(path) => file_block_count(path)?,
        };
        entries.push(PlannedEntry {
            node: Node::new(spec.name.as_bytes(), cursor, block_count),
            source: spec.source.clone(),
        });
        cursor += block_count;
    }

    for entry in &mut entries {
        entry.node.block_offset += start_block;
    }

    Ok(ImagePlan { entries })
}

/// Number of blocks a source file occupies. A zero-length file rounds to
/// zero blocks and so gets a directory entry but no data region.
fn file_block_count(path: &Path) -> Result<u32, BuildError> {
    let file = File::open(path).map_err(|source| BuildError::SourceNotFound {
        path: path.to_owned(),
        source,
    })?;
    let len = file.metadata()?.len();
    Ok(len.div_ceil(BLOCK_SIZE as u64) as u32)
}

/// What `serialize` reports back besides hard errors.
#[derive(Debug, Default)]
pub struct WriteSummary {
    /// False when no entry's source was the reserved "bfs" literal: the
    /// image was still fully written but contains no directory table.
    pub superblock_written: bool,
}

/// Create the output image file.
pub fn create_output(path: &Path) -> Result<File, BuildError> {
    File::create(path).map_err(|source| BuildError::SinkUnwritable {
        path: path.to_owned(),
        source,
    })
}

/// Write the planned image: seek to each entry's block range in plan
/// order and copy its source in, padded to a block boundary. Regions no
/// entry covers (a non-zero start block, in particular) are never
/// written and are left to the sink.
pub fn serialize<W: Write + Seek>(plan: &ImagePlan, sink: &mut W) -> Result<WriteSummary, BuildError> {
    let directory = plan.directory();
    let mut summary = WriteSummary::default();

    for entry in plan.entries() {
        let node = &entry.node;
        sink.seek(SeekFrom::Start(node.block_offset as u64 * BLOCK_SIZE as u64))?;

        match &entry.source {
            Source::Superblock => {
                sink.write_all(&directory.to_block())?;
                summary.superblock_written = true;
            }
            Source::File(path) => copy_padded(path, sink)?,
        }

        debug!(
            "{}: blocks {}..{}",
            node.display_name(),
            node.block_offset,
            node.block_offset + node.block_count
        );
    }

    sink.flush()?;
    Ok(summary)
}

/// Stream one source file into the sink byte-exact, then zero-pad to the
/// next block boundary. Sources are opened one at a time and closed as
/// soon as the copy finishes.
fn copy_padded<W: Write>(path: &Path, sink: &mut W) -> Result<(), BuildError> {
    let mut file = File::open(path).map_err(|source| BuildError::SourceNotFound {
        path: path.to_owned(),
        source,
    })?;
    let copied = io::copy(&mut file, sink)?;

    let partial = (copied % BLOCK_SIZE as u64) as usize;
    if partial != 0 {
        let zeros = [0u8; BLOCK_SIZE];
        sink.write_all(&zeros[..BLOCK_SIZE - partial])?;
    }
    Ok(())
}
