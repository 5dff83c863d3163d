/// On-disk layout of the boot file system ("bfs").
///
/// The image is addressed in fixed 512-byte blocks. One block holds the
/// directory table: 16 consecutive 32-byte nodes mapping a name to a
/// contiguous block range. There is no magic number, no checksum and no
/// version tag; the directory is found at whatever block the image's
/// producer assigned to the reserved name "bfs".
///
/// All multi-byte fields are written little-endian through the explicit
/// serializers below; nothing relies on native struct layout.

pub const BLOCK_SIZE: usize = 512;
pub const NAME_LEN: usize = 16;
pub const NODE_SIZE: usize = 32;
pub const NODE_COUNT: usize = BLOCK_SIZE / NODE_SIZE;

/// A source equal to this literal marks the directory table itself.
pub const SUPERBLOCK_NAME: &str = "bfs";

// The directory table must fill exactly one block.
const _: () = assert!(NODE_COUNT * NODE_SIZE == BLOCK_SIZE);

/// One 32-byte directory record: name plus the block range it occupies.
/// The name is zero-padded and is NOT NUL-terminated when it is exactly
/// 16 bytes long. The trailing 8 bytes of the record are reserved and
/// always zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Node {
    pub name: [u8; NAME_LEN],
    pub block_offset: u32,
    pub block_count: u32,
}

impl Node {
    /// Build a node from a name of at most `NAME_LEN` bytes.
    /// Length is validated by the specifier parser before this is reached.
    pub fn new(name: &[u8], block_offset: u32, block_count: u32) -> Self {
        debug_assert!(name.len() <= NAME_LEN);
        let mut padded = [0u8; NAME_LEN];
        padded[..name.len()].copy_from_slice(name);
        Self {
            name: padded,
            block_offset,
            block_count,
        }
    }

    /// Serialize this record into its fixed 32-byte wire form.
    pub fn to_bytes(&self) -> [u8; NODE_SIZE] {
        let mut bytes = [0u8; NODE_SIZE];
        bytes[..NAME_LEN].copy_from_slice(&self.name);
        bytes[16..20].copy_from_slice(&self.block_offset.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.block_count.to_le_bytes());
        // bytes 24..32 are the two reserved fields, left zero
        bytes
    }

    /// The name with trailing padding stripped, for diagnostics.
    pub fn display_name(&self) -> String {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(NAME_LEN);
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }
}

/// The directory table: up to 16 nodes occupying exactly one block,
/// unused trailing slots all-zero.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    nodes: Vec<Node>,
}

impl Directory {
    /// Length is validated during planning; more than `NODE_COUNT` nodes
    /// never reach this point.
    pub fn new(nodes: Vec<Node>) -> Self {
        debug_assert!(nodes.len() <= NODE_COUNT);
        Self { nodes }
    }

    /// Serialize the whole table into its 512-byte block.
    pub fn to_block(&self) -> [u8; BLOCK_SIZE] {
        let mut block = [0u8; BLOCK_SIZE];
        for (i, node) in self.nodes.iter().enumerate() {
            block[i * NODE_SIZE..(i + 1) * NODE_SIZE].copy_from_slice(&node.to_bytes());
        }
        block
    }
}
