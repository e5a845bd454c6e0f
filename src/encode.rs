//! CPU based encoding.

mod bc6h;
mod color;
mod common;
mod float16;
mod quantize;

pub use self::quantize::BlockMode;
use self::bc6h::BlockCompressorBC6H;
use crate::{
    blocks_byte_size, error::Result, BC6HSettings, BlockEncoding, CompressionError,
    BLOCK_BYTE_SIZE,
};

/// Summary of an image compression run.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CompressionStats {
    /// Number of blocks written.
    pub blocks: usize,
    mode_counts: [usize; 3],
    /// Sum of the per block MSLE.
    pub msle_sum: f64,
}

impl CompressionStats {
    fn record(&mut self, encoding: &BlockEncoding) {
        self.blocks += 1;
        self.mode_counts[encoding.mode as usize] += 1;
        self.msle_sum += encoding.msle as f64;
    }

    fn merge(mut self, other: Self) -> Self {
        self.blocks += other.blocks;
        for (count, other) in self.mode_counts.iter_mut().zip(other.mode_counts) {
            *count += other;
        }
        self.msle_sum += other.msle_sum;
        self
    }

    /// Number of blocks encoded with `mode`.
    pub fn mode_count(&self, mode: BlockMode) -> usize {
        self.mode_counts[mode as usize]
    }

    /// Mean MSLE per block, zero for an empty run.
    pub fn average_msle(&self) -> f64 {
        if self.blocks == 0 {
            0.0
        } else {
            self.msle_sum / self.blocks as f64
        }
    }
}

/// Encodes one 4x4 block of RGB texels given in row-major order.
///
/// Negative, NaN and out of range channels still produce a valid block.
pub fn encode_block(texels: &[[f32; 3]; 16], settings: &BC6HSettings) -> BlockEncoding {
    let mut block_compressor = BlockCompressorBC6H::new(settings);

    block_compressor.load_texels(texels);
    block_compressor.compress_bc6h_core();
    block_compressor.encoding()
}

/// Encodes a block with [`BC6HSettings::fast`], single region only.
pub fn encode_block_fast(texels: &[[f32; 3]; 16]) -> BlockEncoding {
    encode_block(texels, &BC6HSettings::fast())
}

/// Encodes a block with [`BC6HSettings::quality`], which also tries the best
/// two region pattern.
pub fn encode_block_quality(texels: &[[f32; 3]; 16]) -> BlockEncoding {
    encode_block(texels, &BC6HSettings::quality())
}

/// Compresses interleaved RGB `f32` data into BC6H (unsigned) blocks.
///
/// # Data Layout Requirements
/// The input data holds three `f32` channels per texel in row-major order.
/// `stride` is the distance between rows in `f32` elements and must be at
/// least `width * 3`. Width and height don't need to be multiples of 4: the
/// blocks on the right and bottom edge repeat the last column and row.
///
/// # Buffer Requirements
/// The blocks are written row by row into `blocks_buffer`, which must hold
/// at least [`blocks_byte_size()`] bytes.
///
/// # Example
/// ```
/// use fast_bc6h::{blocks_byte_size, compress_rgb32f, BC6HSettings};
///
/// let width = 64;
/// let height = 64;
/// let rgb_data = vec![0.5f32; width as usize * height as usize * 3];
/// let mut blocks_buffer = vec![0u8; blocks_byte_size(width, height)];
///
/// let stats = compress_rgb32f(
///     &rgb_data,
///     &mut blocks_buffer,
///     width,
///     height,
///     width * 3,
///     &BC6HSettings::quality(),
/// )
/// .unwrap();
/// assert_eq!(stats.blocks, 256);
/// ```
pub fn compress_rgb32f(
    rgb_data: &[f32],
    blocks_buffer: &mut [u8],
    width: u32,
    height: u32,
    stride: u32,
    settings: &BC6HSettings,
) -> Result<CompressionStats> {
    if width == 0 || height == 0 {
        return Err(CompressionError::ZeroDimension { width, height });
    }
    if (stride as usize) < width as usize * 3 {
        return Err(CompressionError::StrideTooSmall { stride, width });
    }

    let required = (height as usize - 1) * stride as usize + width as usize * 3;
    if rgb_data.len() < required {
        return Err(CompressionError::SourceTooSmall {
            actual: rgb_data.len(),
            required,
        });
    }

    let required = blocks_byte_size(width, height);
    if blocks_buffer.len() < required {
        return Err(CompressionError::BufferTooSmall {
            actual: blocks_buffer.len(),
            required,
        });
    }

    let image = SourceImage {
        rgb_data,
        width: width as usize,
        height: height as usize,
        stride: stride as usize,
    };
    let block_width = (image.width + 3) / 4;
    let block_height = (image.height + 3) / 4;

    tracing::debug!(
        width,
        height,
        dual_partition = settings.dual_partition(),
        "compressing {block_width}x{block_height} BC6H blocks"
    );

    let row_bytes = block_width * BLOCK_BYTE_SIZE;
    let rows = &mut blocks_buffer[..row_bytes * block_height];

    #[cfg(feature = "rayon")]
    let stats = {
        use rayon::prelude::*;

        rows.par_chunks_mut(row_bytes)
            .enumerate()
            .map(|(yy, row)| compress_row(&image, row, yy, settings))
            .reduce(CompressionStats::default, CompressionStats::merge)
    };

    #[cfg(not(feature = "rayon"))]
    let stats = rows
        .chunks_mut(row_bytes)
        .enumerate()
        .map(|(yy, row)| compress_row(&image, row, yy, settings))
        .fold(CompressionStats::default(), CompressionStats::merge);

    for mode in BlockMode::ALL {
        tracing::trace!(blocks = stats.mode_count(mode), "{mode}");
    }

    Ok(stats)
}

struct SourceImage<'a> {
    rgb_data: &'a [f32],
    width: usize,
    height: usize,
    stride: usize,
}

fn compress_row(
    image: &SourceImage,
    blocks_row: &mut [u8],
    yy: usize,
    settings: &BC6HSettings,
) -> CompressionStats {
    let block_width = blocks_row.len() / BLOCK_BYTE_SIZE;
    let mut stats = CompressionStats::default();

    for xx in 0..block_width {
        let mut block_compressor = BlockCompressorBC6H::new(settings);

        block_compressor.load_block_interleaved_rgb32f(
            image.rgb_data,
            xx,
            yy,
            image.width,
            image.height,
            image.stride,
        );
        block_compressor.compress_bc6h_core();
        block_compressor.store_data(blocks_row, block_width, xx, 0);

        stats.record(&block_compressor.encoding());
    }

    stats
}
