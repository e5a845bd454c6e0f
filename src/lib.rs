//! # fast_bc6h
//!
//! Fast CPU encoder for BC6H (unsigned) HDR texture blocks.
//!
//! Every 4x4 tile of RGB half float range texels is compressed into a 128 bit
//! block. The encoder only emits three of the format's modes:
//!
//!  * Mode 11: one region, 10 bit endpoints, 4 bit indices
//!  * Mode 7.6: two regions, 7 bit base endpoint with 6 bit deltas, 3 bit indices
//!  * Mode 9.5: two regions, 9 bit base endpoint with 5 bit deltas, 3 bit indices
//!
//! The fast preset fits Mode 11 only. The quality preset additionally picks the
//! best fitting of the 32 two region patterns and keeps whichever encoding has
//! the lower mean squared log error (MSLE).
//!
//! ```
//! use fast_bc6h::encode_block_quality;
//!
//! let mut texels = [[0.25, 0.5, 1.0]; 16];
//! texels[15] = [4.0, 2.0, 1.0];
//!
//! let encoding = encode_block_quality(&texels);
//! assert_eq!(encoding.block.mode(), Some(encoding.mode));
//! assert!(encoding.msle.is_finite());
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod encode;
mod error;
mod settings;

use bytemuck::{Pod, Zeroable};

pub use encode::{
    compress_rgb32f, encode_block, encode_block_fast, encode_block_quality, BlockMode,
    CompressionStats,
};
pub use error::CompressionError;
pub use settings::BC6HSettings;

/// Size of one BC6H block in bytes.
pub const BLOCK_BYTE_SIZE: usize = 16;

/// Returns the bytes per row of blocks for the given width.
///
/// Width is rounded up to the nearest multiple of 4.
pub const fn bytes_per_row(width: u32) -> u32 {
    let blocks_per_row = (width + 3) / 4;
    blocks_per_row * BLOCK_BYTE_SIZE as u32
}

/// Returns the byte size required for storing compressed blocks for the given dimensions.
///
/// Width and height are rounded up to the nearest multiple of 4.
pub const fn blocks_byte_size(width: u32, height: u32) -> usize {
    let block_width = (width as usize + 3) / 4;
    let block_height = (height as usize + 3) / 4;
    block_width * block_height * BLOCK_BYTE_SIZE
}

/// One encoded block, four little-endian 32 bit words.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Pod, Zeroable)]
#[repr(transparent)]
pub struct EncodedBlock([u32; 4]);

impl EncodedBlock {
    pub const fn from_words(words: [u32; 4]) -> Self {
        Self(words)
    }

    pub const fn words(&self) -> [u32; 4] {
        self.0
    }

    /// Serializes the block the way it is stored in a texture.
    pub fn to_bytes(&self) -> [u8; BLOCK_BYTE_SIZE] {
        let mut bytes = [0; BLOCK_BYTE_SIZE];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.0) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8; BLOCK_BYTE_SIZE]) -> Self {
        let mut words = [0; 4];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self(words)
    }

    /// Mode of the block, `None` for modes this encoder never writes.
    pub fn mode(&self) -> Option<BlockMode> {
        BlockMode::from_prefix(self.0[0])
    }

    /// Partition pattern of a two region block.
    pub fn partition(&self) -> Option<u8> {
        match self.mode() {
            Some(mode) if mode.is_dual_partition() => Some(((self.0[2] >> 13) & 31) as u8),
            _ => None,
        }
    }
}

/// Result of encoding one block.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockEncoding {
    pub block: EncodedBlock,
    /// Error of the decoded block against its input, summed over all texels.
    pub msle: f32,
    pub mode: BlockMode,
}
