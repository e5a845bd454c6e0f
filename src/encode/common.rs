/// Number of two region partition patterns BC6H can address.
pub(crate) const PATTERN_COUNT: usize = 32;

/// Interpolation weights of the 3 bit and 4 bit index sets, `round(i * 64 / max_index)`.
pub(crate) fn get_unquant_value(bits: u32, index: u32) -> i32 {
    match bits {
        3 => {
            const TABLE: [i32; 8] = [0, 9, 18, 27, 37, 46, 55, 64];
            TABLE[index as usize]
        }
        _ => {
            const TABLE: [i32; 16] = [0, 4, 9, 13, 17, 21, 26, 30, 34, 38, 43, 47, 51, 55, 60, 64];
            TABLE[index as usize]
        }
    }
}

/// Texel mask of region `j` (0 or 1) in `pattern`.
///
/// Bit `k` is set when texel `k` belongs to the region.
pub(crate) fn get_pattern_mask(pattern: usize, j: usize) -> u32 {
    // Low half is region 0, high half region 1.
    const PATTERN_MASK_TABLE: [u32; PATTERN_COUNT] = [
        0xCCCC3333, 0x88887777, 0xEEEE1111, 0xECC81337, 0xC880377F, 0xFEEC0113, 0xFEC80137,
        0xEC80137F, 0xC80037FF, 0xFFEC0013, 0xFE80017F, 0xE80017FF, 0xFFE80017, 0xFF0000FF,
        0xFFF0000F, 0xF0000FFF, 0xF71008EF, 0x008EFF71, 0x71008EFF, 0x08CEF731, 0x008CFF73,
        0x73108CEF, 0x3100CEFF, 0x8CCE7331, 0x088CF773, 0x3110CEEF, 0x66669999, 0x366CC993,
        0x17E8E817, 0x0FF0F00F, 0x718E8E71, 0x399CC663,
    ];

    let mask_packed = PATTERN_MASK_TABLE[pattern];

    if j == 0 {
        mask_packed & 0xFFFF
    } else {
        mask_packed >> 16
    }
}

/// Region (0 or 1) of `texel` in `pattern`.
#[cfg(test)]
pub(crate) fn get_region(pattern: usize, texel: usize) -> usize {
    ((get_pattern_mask(pattern, 1) >> texel) & 1) as usize
}

/// Fixup texel of region 1 in `pattern`. The fixup texel of region 0 is always texel 0.
pub(crate) fn get_fixup(pattern: usize) -> usize {
    const FIXUP_TABLE: [u8; PATTERN_COUNT] = [
        15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 2, 8, 2, 2, 8, 8, 15,
        2, 8, 2, 2, 8, 8, 2, 2,
    ];

    FIXUP_TABLE[pattern] as usize
}

/// Appends the low `bits` bits of `v` at bit position `pos`.
pub(crate) fn put_bits(data: &mut [u32; 5], pos: &mut u32, bits: u32, v: u32) {
    debug_assert!(bits == 32 || v >> bits == 0, "value {v:#x} wider than {bits} bits");

    data[(*pos / 32) as usize] |= v << (*pos % 32);
    if *pos % 32 + bits > 32 {
        data[(*pos / 32 + 1) as usize] |= v >> (32 - *pos % 32);
    }
    *pos += bits;
}

/// Returns bit `pos` of `v`.
#[inline(always)]
pub(crate) fn bit_at(v: i32, pos: u32) -> u32 {
    ((v >> pos) & 1) as u32
}
