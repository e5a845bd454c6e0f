use super::color::Vec3;
use super::float16::{f16_to_f32, f32_to_f16, HALF_MAX};

/// The BC6H modes this encoder emits.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum BlockMode {
    /// Single region, two 10 bit absolute endpoints, 4 bit indices.
    Mode11,
    /// Two regions, 7 bit base endpoint and 6 bit signed deltas, 3 bit indices.
    Mode76,
    /// Two regions, 9 bit base endpoint and 5 bit signed deltas, 3 bit indices.
    Mode95,
}

impl BlockMode {
    /// All emitted modes, in the order they are tried.
    pub const ALL: [BlockMode; 3] = [BlockMode::Mode11, BlockMode::Mode76, BlockMode::Mode95];

    /// Precision of the absolute (base) endpoint.
    pub const fn endpoint_bits(self) -> u32 {
        match self {
            BlockMode::Mode11 => 10,
            BlockMode::Mode76 => 7,
            BlockMode::Mode95 => 9,
        }
    }

    /// Largest magnitude a delta endpoint may take. Zero for absolute modes.
    pub const fn max_delta(self) -> i32 {
        match self {
            BlockMode::Mode11 => 0,
            BlockMode::Mode76 => 31,
            BlockMode::Mode95 => 15,
        }
    }

    /// Precision of the per texel indices.
    pub const fn index_bits(self) -> u32 {
        match self {
            BlockMode::Mode11 => 4,
            BlockMode::Mode76 | BlockMode::Mode95 => 3,
        }
    }

    pub const fn is_dual_partition(self) -> bool {
        !matches!(self, BlockMode::Mode11)
    }

    /// Mode tag and its width in bits, as stored at the start of the block.
    pub(crate) const fn prefix(self) -> (u32, u32) {
        match self {
            BlockMode::Mode11 => (0b00011, 5),
            BlockMode::Mode76 => (0b01, 2),
            BlockMode::Mode95 => (0b01110, 5),
        }
    }

    /// Parses the mode tag from the first word of a block.
    pub(crate) fn from_prefix(word: u32) -> Option<Self> {
        BlockMode::ALL.into_iter().find(|mode| {
            let (prefix, bits) = mode.prefix();
            word & ((1 << bits) - 1) == prefix
        })
    }

    pub(crate) const fn name(self) -> &'static str {
        match self {
            BlockMode::Mode11 => "mode 11",
            BlockMode::Mode76 => "mode 7.6",
            BlockMode::Mode95 => "mode 9.5",
        }
    }
}

impl std::fmt::Display for BlockMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Quantized endpoint, one integer per channel.
pub(crate) type QuantizedEndpoint = [i32; 3];

/// Largest finite half bit pattern plus one, the span the quantization grid divides.
const HALF_GRID: i32 = 0x7C00;

/// Quantizes one channel onto a `bits` wide grid over the half float bit patterns.
///
/// Negative and NaN inputs map to zero, values above [`HALF_MAX`] saturate.
#[inline]
pub(crate) fn quantize(value: f32, bits: u32) -> i32 {
    let value = if value > 0.0 { value.min(HALF_MAX) } else { 0.0 };
    let half_bits = f32_to_f16(value) as i32;

    i32::min((half_bits << bits) / HALF_GRID, (1 << bits) - 1)
}

pub(crate) fn quantize_endpoint(color: Vec3, bits: u32) -> QuantizedEndpoint {
    [
        quantize(color.x, bits),
        quantize(color.y, bits),
        quantize(color.z, bits),
    ]
}

/// Expands a quantized value to the 16 bit interpolation domain, the way the decoder does.
#[inline]
pub(crate) fn unquantize(v: i32, bits: u32) -> i32 {
    if bits >= 15 {
        return v;
    }
    if v == 0 {
        return 0;
    }
    if v == (1 << bits) - 1 {
        return 0xFFFF;
    }

    ((v << 16) + 0x8000) >> bits
}

/// Blends two unquantized channel values with a 6 bit weight and converts the
/// result to the half float it decodes to.
#[inline]
pub(crate) fn finish_unquantize(e0: i32, e1: i32, weight: i32) -> f32 {
    let interpolated = (e0 * (64 - weight) + e1 * weight + 32) >> 6;
    f16_to_f32(((interpolated * 31) >> 6) as u16)
}

/// Reconstructs the color of a texel from its region's unquantized endpoints.
#[inline]
pub(crate) fn reconstruct(e0: QuantizedEndpoint, e1: QuantizedEndpoint, weight: i32) -> Vec3 {
    Vec3::new(
        finish_unquantize(e0[0], e1[0], weight),
        finish_unquantize(e0[1], e1[1], weight),
        finish_unquantize(e0[2], e1[2], weight),
    )
}

pub(crate) fn unquantize_endpoint(q: QuantizedEndpoint, bits: u32) -> QuantizedEndpoint {
    q.map(|v| unquantize(v, bits))
}

/// Quantizes the endpoints of a dual region block for a delta mode.
///
/// `endpoints` holds region 0 min/max then region 1 min/max. The first one is
/// stored absolute, the other three are clamped to the mode's delta range
/// relative to it. Returns the absolute values after clamping.
pub(crate) fn quantize_delta_endpoints(
    endpoints: &[Vec3; 4],
    mode: BlockMode,
) -> [QuantizedEndpoint; 4] {
    let bits = mode.endpoint_bits();
    let max_delta = mode.max_delta();

    let base = quantize_endpoint(endpoints[0], bits);
    let mut qep = [base; 4];

    for (q, &endpoint) in qep.iter_mut().zip(endpoints.iter()).skip(1) {
        let absolute = quantize_endpoint(endpoint, bits);
        for p in 0..3 {
            q[p] = base[p] + i32::clamp(absolute[p] - base[p], -max_delta, max_delta);
        }
    }

    qep
}
