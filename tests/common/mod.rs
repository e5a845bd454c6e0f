#![allow(dead_code)]

pub mod metrics;

use fast_bc6h::{EncodedBlock, BLOCK_BYTE_SIZE};
use half::f16;

/// Two region partitions as region digits in texel order, with the fixup
/// texel of region 1.
const PARTITIONS: [(&str, usize); 32] = [
    ("0011001100110011", 15),
    ("0001000100010001", 15),
    ("0111011101110111", 15),
    ("0001001100110111", 15),
    ("0000000100010011", 15),
    ("0011011101111111", 15),
    ("0001001101111111", 15),
    ("0000000100110111", 15),
    ("0000000000010011", 15),
    ("0011011111111111", 15),
    ("0000000101111111", 15),
    ("0000000000010111", 15),
    ("0001011111111111", 15),
    ("0000000011111111", 15),
    ("0000111111111111", 15),
    ("0000000000001111", 15),
    ("0000100011101111", 15),
    ("0111000100000000", 2),
    ("0000000010001110", 8),
    ("0111001100010000", 2),
    ("0011000100000000", 2),
    ("0000100011001110", 8),
    ("0000000010001100", 8),
    ("0111001100110001", 15),
    ("0011000100010000", 2),
    ("0000100010001100", 8),
    ("0110011001100110", 2),
    ("0011011001101100", 2),
    ("0001011111101000", 8),
    ("0000111111110000", 8),
    ("0111000110001110", 2),
    ("0011100110011100", 2),
];

const WEIGHT3: [i32; 8] = [0, 9, 18, 27, 37, 46, 55, 64];
const WEIGHT4: [i32; 16] = [0, 4, 9, 13, 17, 21, 26, 30, 34, 38, 43, 47, 51, 55, 60, 64];

/// One endpoint bit field of a mode: endpoint (w, x, y, z), channel, lowest bit, width.
type Field = (usize, usize, u32, u32);

/// Mode 0b01: 7 bit base, 6 bit deltas.
const MODE_76_FIELDS: &[Field] = &[
    (2, 1, 5, 1),
    (3, 1, 4, 1),
    (3, 1, 5, 1),
    (0, 0, 0, 7),
    (3, 2, 0, 1),
    (3, 2, 1, 1),
    (2, 2, 4, 1),
    (0, 1, 0, 7),
    (2, 2, 5, 1),
    (3, 2, 2, 1),
    (2, 1, 4, 1),
    (0, 2, 0, 7),
    (3, 2, 3, 1),
    (3, 2, 5, 1),
    (3, 2, 4, 1),
    (1, 0, 0, 6),
    (2, 1, 0, 4),
    (1, 1, 0, 6),
    (3, 1, 0, 4),
    (1, 2, 0, 6),
    (2, 2, 0, 4),
    (2, 0, 0, 6),
    (3, 0, 0, 6),
];

/// Mode 0b01110: 9 bit base, 5 bit deltas.
const MODE_95_FIELDS: &[Field] = &[
    (0, 0, 0, 9),
    (2, 2, 4, 1),
    (0, 1, 0, 9),
    (2, 1, 4, 1),
    (0, 2, 0, 9),
    (3, 2, 4, 1),
    (1, 0, 0, 5),
    (3, 1, 4, 1),
    (2, 1, 0, 4),
    (1, 1, 0, 5),
    (3, 2, 0, 1),
    (3, 1, 0, 4),
    (1, 2, 0, 5),
    (3, 2, 1, 1),
    (2, 2, 0, 4),
    (2, 0, 0, 5),
    (3, 2, 2, 1),
    (3, 0, 0, 5),
    (3, 2, 3, 1),
];

/// Mode 0b00011: two absolute 10 bit endpoints.
const MODE_11_FIELDS: &[Field] = &[
    (0, 0, 0, 10),
    (0, 1, 0, 10),
    (0, 2, 0, 10),
    (1, 0, 0, 10),
    (1, 1, 0, 10),
    (1, 2, 0, 10),
];

/// A block decoded by the reference decoder below.
#[derive(Debug, Clone, Copy)]
pub struct DecodedBlock {
    /// Mode tag as stored in the low bits of the block.
    pub mode: u32,
    pub partition: usize,
    /// Quantized endpoints after delta decoding, region 0 then region 1.
    pub endpoints: [[i32; 3]; 4],
    pub indices: [u8; 16],
    /// Texels in row-major order.
    pub texels: [[f32; 3]; 16],
}

/// Decodes one unsigned BC6H block in one of the modes the encoder writes.
///
/// Returns `None` for any other mode.
pub fn decode_block(block: &EncodedBlock) -> Option<DecodedBlock> {
    let mut bits = BitReader::new(&block.to_bytes());

    let mut mode = bits.read(2);
    if mode > 1 {
        mode |= bits.read(3) << 2;
    }

    let (fields, base_bits, delta_bits) = match mode {
        0b01 => (MODE_76_FIELDS, 7, 6),
        0b01110 => (MODE_95_FIELDS, 9, 5),
        0b00011 => (MODE_11_FIELDS, 10, 0),
        _ => return None,
    };

    let mut endpoints = [[0i32; 3]; 4];
    for &(endpoint, channel, lsb, width) in fields {
        endpoints[endpoint][channel] |= (bits.read(width) << lsb) as i32;
    }

    let two_regions = delta_bits != 0;
    let partition = if two_regions {
        bits.read(5) as usize
    } else {
        0
    };

    if two_regions {
        let base = endpoints[0];
        for endpoint in &mut endpoints[1..] {
            for (value, base) in endpoint.iter_mut().zip(base) {
                let delta = sign_extend(*value, delta_bits);
                *value = (base + delta) & ((1 << base_bits) - 1);
            }
        }
    }

    let unquantized = endpoints.map(|endpoint| endpoint.map(|v| unquantize(v, base_bits)));

    let (regions, fixup) = PARTITIONS[partition];
    let index_bits = if two_regions { 3 } else { 4 };

    let mut indices = [0; 16];
    let mut texels = [[0.0; 3]; 16];

    for (k, region) in regions.bytes().enumerate() {
        let region = if two_regions {
            (region - b'0') as usize
        } else {
            0
        };

        // anchor texels drop their top bit
        let anchor = k == 0 || (two_regions && k == fixup);
        let index = bits.read(if anchor { index_bits - 1 } else { index_bits }) as usize;
        let weight = if two_regions {
            WEIGHT3[index]
        } else {
            WEIGHT4[index]
        };

        let [e0, e1] = [unquantized[region * 2], unquantized[region * 2 + 1]];
        indices[k] = index as u8;
        texels[k] = std::array::from_fn(|c| {
            let interpolated = (e0[c] * (64 - weight) + e1[c] * weight + 32) >> 6;
            f16::from_bits(((interpolated * 31) >> 6) as u16).to_f32()
        });
    }

    Some(DecodedBlock {
        mode,
        partition,
        endpoints,
        indices,
        texels,
    })
}

/// Decodes a whole blocks buffer into tightly packed RGB data.
pub fn decode_image(blocks: &[u8], width: u32, height: u32) -> Vec<f32> {
    let width = width as usize;
    let height = height as usize;
    let block_width = width.div_ceil(4);

    let mut rgb_data = vec![0.0; width * height * 3];

    for (block_index, chunk) in blocks.chunks_exact(BLOCK_BYTE_SIZE).enumerate() {
        let xx = block_index % block_width;
        let yy = block_index / block_width;
        if yy * 4 >= height {
            break;
        }

        let bytes: &[u8; BLOCK_BYTE_SIZE] = chunk.try_into().unwrap();
        let decoded = decode_block(&EncodedBlock::from_bytes(bytes))
            .unwrap_or_else(|| panic!("block {block_index} has an unexpected mode"));

        for y in 0..4 {
            for x in 0..4 {
                let pixel_x = xx * 4 + x;
                let pixel_y = yy * 4 + y;
                if pixel_x < width && pixel_y < height {
                    let offset = (pixel_y * width + pixel_x) * 3;
                    rgb_data[offset..offset + 3].copy_from_slice(&decoded.texels[y * 4 + x]);
                }
            }
        }
    }

    rgb_data
}

/// Per block error the encoder reports, recomputed from decoded texels.
pub fn block_msle(original: &[[f32; 3]; 16], decoded: &[[f32; 3]; 16], luminance: bool) -> f32 {
    let weights = if luminance {
        [0.299, 0.587, 0.114]
    } else {
        [1.0; 3]
    };

    let mut err = 0.0;
    for (a, b) in original.iter().zip(decoded) {
        let mut texel_err = 0.0;
        for c in 0..3 {
            let delta = ((b[c] + 1.0) / (a[c] + 1.0)).log2();
            texel_err += delta * delta * weights[c];
        }
        err += texel_err;
    }
    err
}

/// Pseudo random HDR image with smooth gradients, hard edges and highlights.
pub fn synthetic_hdr_image(width: u32, height: u32, seed: u32) -> Vec<f32> {
    let mut state = seed.wrapping_mul(0x9E37_79B9) | 1;
    let mut next = move || {
        // xorshift32
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state as f32 / u32::MAX as f32
    };

    let mut rgb_data = Vec::with_capacity(width as usize * height as usize * 3);
    for y in 0..height {
        for x in 0..width {
            let u = x as f32 / width as f32;
            let v = y as f32 / height as f32;

            let sky = [0.2 + 2.0 * v, 0.4 + 3.0 * v, 1.0 + 6.0 * v];
            let ground = [0.05 + 0.3 * u, 0.03 + 0.2 * u, 0.01];
            let base = if (x / 5 + y / 7) % 3 == 0 { ground } else { sky };

            let highlight = if (x * 7 + y * 3) % 23 == 0 { 200.0 } else { 1.0 };
            let noise = 0.9 + 0.2 * next();

            rgb_data.extend(base.map(|c| c * highlight * noise));
        }
    }

    rgb_data
}

fn sign_extend(value: i32, bits: u32) -> i32 {
    let shift = 32 - bits;
    (value << shift) >> shift
}

/// Expands a quantized endpoint channel to 16 bits.
fn unquantize(value: i32, bits: u32) -> i32 {
    if value == 0 {
        0
    } else if value == (1 << bits) - 1 {
        0xFFFF
    } else {
        ((value << 16) + 0x8000) >> bits
    }
}

/// Reads a 128 bit block from the least significant bit upwards.
struct BitReader {
    bits: u128,
}

impl BitReader {
    fn new(bytes: &[u8; 16]) -> Self {
        Self {
            bits: u128::from_le_bytes(*bytes),
        }
    }

    fn read(&mut self, width: u32) -> u32 {
        let value = (self.bits & ((1 << width) - 1)) as u32;
        self.bits >>= width;
        value
    }
}
