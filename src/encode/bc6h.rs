use super::color::{dist_to_line_sq, msle, saturate, Vec3};
use super::common::*;
use super::float16::{f32_to_f16, from_half_bits, to_half_bits, HALF_MAX, HALF_MAX_BITS};
use super::quantize::*;
use crate::{BC6HSettings, BlockEncoding, EncodedBlock};

/// Region mask covering the whole block.
const ALL_TEXELS: u32 = 0xFFFF;

pub(crate) struct BlockCompressorBC6H<'a> {
    texels: [Vec3; 16],
    data: [u32; 5],
    best_err: f32,
    mode: BlockMode,
    settings: &'a BC6HSettings,
}

/// Line through a region's endpoints. Texels are placed on it by the half
/// float bit pattern of their projection, which is roughly log space.
#[derive(Copy, Clone, Debug)]
struct Axis {
    dir: Vec3,
    pos: [f32; 2],
}

impl Axis {
    fn new(endpoints: &[Vec3; 2]) -> Self {
        let span = endpoints[1] - endpoints[0];
        let dir = span / span.sum();

        Self {
            dir,
            pos: [project(endpoints[0], dir), project(endpoints[1], dir)],
        }
    }

    fn swap(&mut self) {
        self.pos.swap(0, 1);
    }

    fn index(&self, texel: Vec3, bits: u32) -> u32 {
        let r = (project(texel, self.dir) - self.pos[0]) / (self.pos[1] - self.pos[0]);
        compute_index(r, bits)
    }
}

#[inline(always)]
fn project(color: Vec3, dir: Vec3) -> f32 {
    f32_to_f16(color.dot(dir)) as f32
}

/// Maps a relative position `r` in `[0, 1]` on the endpoint line to an index.
///
/// The scale and bias pull the rounding thresholds towards the interpolation
/// weights the decoder actually uses.
#[inline]
fn compute_index(r: f32, bits: u32) -> u32 {
    let v = match bits {
        3 => r * 6.98182 + 0.00909 + 0.5,
        _ => r * 14.93333 + 0.03333 + 0.5,
    };
    let max = ((1 << bits) - 1) as f32;

    // NaN (degenerate axis) casts to index 0.
    f32::min(f32::max(v, 0.0), max) as u32
}

impl<'a> BlockCompressorBC6H<'a> {
    pub(crate) fn new(settings: &'a BC6HSettings) -> Self {
        Self {
            texels: [Vec3::default(); 16],
            data: [0; 5],
            best_err: f32::INFINITY,
            mode: BlockMode::Mode11,
            settings,
        }
    }

    pub(crate) fn load_texels(&mut self, texels: &[[f32; 3]; 16]) {
        for (texel, &rgb) in self.texels.iter_mut().zip(texels.iter()) {
            *texel = rgb.into();
        }
    }

    /// Loads block (`xx`, `yy`) from interleaved RGB data. Texels outside the
    /// image repeat the last valid column and row.
    pub(crate) fn load_block_interleaved_rgb32f(
        &mut self,
        rgb_data: &[f32],
        xx: usize,
        yy: usize,
        width: usize,
        height: usize,
        stride: usize,
    ) {
        for y in 0..4 {
            for x in 0..4 {
                let pixel_x = usize::min(xx * 4 + x, width - 1);
                let pixel_y = usize::min(yy * 4 + y, height - 1);

                let offset = pixel_y * stride + pixel_x * 3;

                self.texels[y * 4 + x] = Vec3::new(
                    rgb_data[offset],
                    rgb_data[offset + 1],
                    rgb_data[offset + 2],
                );
            }
        }
    }

    pub(crate) fn store_data(
        &self,
        blocks_buffer: &mut [u8],
        block_width: usize,
        xx: usize,
        yy: usize,
    ) {
        let offset = (yy * block_width + xx) * 16;
        blocks_buffer[offset..offset + 16].copy_from_slice(&self.block().to_bytes());
    }

    pub(crate) fn block(&self) -> EncodedBlock {
        EncodedBlock::from_words([self.data[0], self.data[1], self.data[2], self.data[3]])
    }

    pub(crate) fn encoding(&self) -> BlockEncoding {
        BlockEncoding {
            block: self.block(),
            msle: self.best_err,
            mode: self.mode,
        }
    }

    fn masked_texels(&self, mask: u32) -> impl Iterator<Item = (usize, Vec3)> + '_ {
        self.texels
            .iter()
            .copied()
            .enumerate()
            .filter(move |&(k, _)| (mask >> k) & 1 != 0)
    }

    /// Bounding box of the whole block.
    fn block_bounds(&self) -> [Vec3; 2] {
        self.texels[1..]
            .iter()
            .fold([self.texels[0]; 2], |[lo, hi], &texel| {
                [lo.min(texel), hi.max(texel)]
            })
    }

    /// Bounding box of the texels in `mask`, limited to the half float range.
    fn region_bounds(&self, mask: u32) -> [Vec3; 2] {
        self.masked_texels(mask).fold(
            [Vec3::splat(HALF_MAX), Vec3::splat(0.0)],
            |[lo, hi], (_, texel)| [lo.min(texel), hi.max(texel)],
        )
    }

    /// Pulls both bounds inwards, in log2(x + 1) space, towards the
    /// second smallest and second largest texel by at most 1/32 of the range.
    fn inset_bounds(&self, mask: u32, [block_min, block_max]: [Vec3; 2]) -> [Vec3; 2] {
        let mut refined_min = block_max;
        let mut refined_max = block_min;

        for (_, texel) in self.masked_texels(mask) {
            if texel != block_min {
                refined_min = refined_min.min(texel);
            }
            if texel != block_max {
                refined_max = refined_max.max(texel);
            }
        }

        let log_refined_min = (refined_min + 1.0).log2();
        let log_refined_max = (refined_max + 1.0).log2();

        let log_min = (block_min + 1.0).log2();
        let log_max = (block_max + 1.0).log2();
        let ext = (log_max - log_min) / 32.0;

        let log_min = log_min + (log_refined_min - log_min).min(ext);
        let log_max = log_max - (log_max - log_refined_max).min(ext);

        [log_min.exp2() - 1.0, log_max.exp2() - 1.0]
    }

    /// Least squares fit of both endpoints for the indices the current
    /// endpoints produce. Solved on half float bit patterns.
    fn opt_endpoints(&self, endpoints: &mut [Vec3; 2], mask: u32, bits: u32, bounds: [Vec3; 2]) {
        let axis = Axis::new(endpoints);
        let max_index = ((1 << bits) - 1) as f32;

        let mut alpha_texel_sum = Vec3::splat(0.0);
        let mut beta_texel_sum = Vec3::splat(0.0);
        let mut alpha_beta_sum = 0.0;
        let mut alpha_sq_sum = 0.0;
        let mut beta_sq_sum = 0.0;

        for (_, texel) in self.masked_texels(mask) {
            let beta = saturate(axis.index(texel, bits) as f32 / max_index);
            let alpha = 1.0 - beta;

            let texel_f16 = to_half_bits(texel);
            alpha_texel_sum = alpha_texel_sum + alpha * texel_f16;
            beta_texel_sum = beta_texel_sum + beta * texel_f16;

            alpha_beta_sum += alpha * beta;
            alpha_sq_sum += alpha * alpha;
            beta_sq_sum += beta * beta;
        }

        let det = alpha_sq_sum * beta_sq_sum - alpha_beta_sum * alpha_beta_sum;

        if f32::abs(det) > 0.00001 {
            let det_rcp = 1.0 / det;
            let lo = det_rcp * (alpha_texel_sum * beta_sq_sum - beta_texel_sum * alpha_beta_sum);
            let hi = det_rcp * (beta_texel_sum * alpha_sq_sum - alpha_texel_sum * alpha_beta_sum);

            let [bounds_min, bounds_max] = bounds;
            for (endpoint, solved) in endpoints.iter_mut().zip([lo, hi]) {
                let solved = from_half_bits(solved.clamp_scalar(0.0, HALF_MAX_BITS as f32));
                *endpoint = solved.clamp(bounds_min, bounds_max);
            }
        }
    }

    /// Fits the endpoints of the texels in `mask` and writes their indices.
    ///
    /// The endpoints come back ordered so that the index of texel `fixup`
    /// has its top bit clear.
    fn encode_region(
        &self,
        mask: u32,
        fixup: usize,
        bounds: [Vec3; 2],
        bits: u32,
        inset: bool,
        indices: &mut [u32; 16],
    ) -> [Vec3; 2] {
        let mut endpoints = if inset {
            self.inset_bounds(mask, bounds)
        } else {
            bounds
        };

        if self.settings.optimize_endpoints() {
            self.opt_endpoints(&mut endpoints, mask, bits, bounds);
        }

        let half = 1 << (bits - 1);
        let mut axis = Axis::new(&endpoints);
        if axis.index(self.texels[fixup], bits) >= half {
            endpoints.swap(0, 1);
            axis.swap();
        }

        for (k, texel) in self.masked_texels(mask) {
            indices[k] = axis.index(texel, bits);
        }
        indices[fixup] = u32::min(indices[fixup], half - 1);

        endpoints
    }

    /// Error of the block decoded with the unquantized endpoints `unq`, two per region.
    fn block_error(
        &self,
        unq: &[QuantizedEndpoint],
        indices: &[u32; 16],
        region_mask: u32,
        bits: u32,
    ) -> f32 {
        let luminance_weights = self.settings.luminance_weights();

        let mut err = 0.0;
        for (k, &texel) in self.texels.iter().enumerate() {
            let region = ((region_mask >> k) & 1) as usize;
            let weight = get_unquant_value(bits, indices[k]);
            let decoded = reconstruct(unq[region * 2], unq[region * 2 + 1], weight);

            err += msle(texel, decoded, luminance_weights);
        }

        err
    }

    fn bc6h_enc_1p(&mut self) {
        let mode = BlockMode::Mode11;
        let bits = mode.index_bits();
        let epb = mode.endpoint_bits();

        let mut indices = [0; 16];
        let endpoints = self.encode_region(
            ALL_TEXELS,
            0,
            self.block_bounds(),
            bits,
            self.settings.single_partition_inset(),
            &mut indices,
        );

        let qep = endpoints.map(|endpoint| quantize_endpoint(endpoint, epb));
        let unq = qep.map(|q| unquantize_endpoint(q, epb));
        let err = self.block_error(&unq, &indices, 0, bits);

        // The single region encoding always lands, even when the error is not finite.
        self.best_err = err;
        self.mode = mode;
        self.bc6h_code_1p(&qep, &indices);
    }

    /// Squared distance of every texel from its region's bounding box diagonal.
    fn evaluate_pattern(&self, pattern: usize) -> f32 {
        (0..2)
            .map(|j| {
                let mask = get_pattern_mask(pattern, j);
                let [lo, hi] = self.region_bounds(mask);
                let dir = (hi - lo).normalize();

                self.masked_texels(mask)
                    .map(|(_, texel)| dist_to_line_sq(lo, dir, texel))
                    .sum::<f32>()
            })
            .sum()
    }

    /// Pattern with the lowest score, the lowest index among equals.
    fn select_pattern(&self) -> usize {
        let mut best_pattern = 0;
        let mut best_score = self.evaluate_pattern(0);

        for pattern in 1..PATTERN_COUNT {
            let score = self.evaluate_pattern(pattern);
            if score < best_score {
                best_pattern = pattern;
                best_score = score;
            }
        }

        best_pattern
    }

    fn bc6h_enc_2p(&mut self) {
        let part_id = self.select_pattern();
        let bits = BlockMode::Mode76.index_bits();
        let inset = self.settings.dual_partition_inset();

        let mut indices = [0; 16];
        let mut endpoints = [Vec3::default(); 4];
        for j in 0..2 {
            let mask = get_pattern_mask(part_id, j);
            let fixup = if j == 0 { 0 } else { get_fixup(part_id) };
            let bounds = self.region_bounds(mask);

            let pair = self.encode_region(mask, fixup, bounds, bits, inset, &mut indices);
            endpoints[j * 2..j * 2 + 2].copy_from_slice(&pair);
        }

        let region_mask = get_pattern_mask(part_id, 1);

        let mut best: Option<(f32, BlockMode, [QuantizedEndpoint; 4])> = None;
        for mode in [BlockMode::Mode76, BlockMode::Mode95] {
            let qep = quantize_delta_endpoints(&endpoints, mode);
            let unq = qep.map(|q| unquantize_endpoint(q, mode.endpoint_bits()));
            let err = self.block_error(&unq, &indices, region_mask, bits);

            if best.map_or(true, |(best_err, _, _)| err < best_err) {
                best = Some((err, mode, qep));
            }
        }

        if let Some((err, mode, qep)) = best {
            if err < self.best_err {
                self.best_err = err;
                self.mode = mode;
                self.bc6h_code_2p(&qep, &indices, part_id, mode);
            }
        }
    }

    fn bc6h_code_1p(&mut self, qep: &[QuantizedEndpoint; 2], indices: &[u32; 16]) {
        self.data = [0; 5];
        let mut pos = 0;

        let packed = Self::bc6h_pack(&[qep[0], qep[1], [0; 3], [0; 3]], BlockMode::Mode11);

        // Mode
        put_bits(&mut self.data, &mut pos, 5, packed[0]);

        // Endpoints
        put_bits(&mut self.data, &mut pos, 30, packed[1]);
        put_bits(&mut self.data, &mut pos, 30, packed[2]);

        // Quantized values
        self.code_indices(&mut pos, indices, 4, &[0]);
    }

    fn bc6h_code_2p(
        &mut self,
        qep: &[QuantizedEndpoint; 4],
        indices: &[u32; 16],
        part_id: usize,
        mode: BlockMode,
    ) {
        self.data = [0; 5];
        let mut pos = 0;

        let packed = Self::bc6h_pack(qep, mode);

        // Mode
        put_bits(&mut self.data, &mut pos, 5, packed[0]);

        // Endpoints
        put_bits(&mut self.data, &mut pos, 30, packed[1]);
        put_bits(&mut self.data, &mut pos, 30, packed[2]);
        put_bits(&mut self.data, &mut pos, 12, packed[3]);

        // Partition
        put_bits(&mut self.data, &mut pos, 5, part_id as u32);

        // Quantized values
        self.code_indices(&mut pos, indices, 3, &[0, get_fixup(part_id)]);
    }

    /// Writes the indices in texel order. Fixup texels drop their (zero) top bit.
    fn code_indices(&mut self, pos: &mut u32, indices: &[u32; 16], bits: u32, fixups: &[usize]) {
        for (k, &index) in indices.iter().enumerate() {
            let index_bits = if fixups.contains(&k) { bits - 1 } else { bits };
            put_bits(&mut self.data, pos, index_bits, index);
        }
    }

    /// Scatters the endpoint fields into the mode header (5 bits), two 30 bit
    /// fields and, for two region modes, a 12 bit field.
    ///
    /// Endpoints are region 0 min/max followed by region 1 min/max.
    fn bc6h_pack(qep: &[QuantizedEndpoint; 4], mode: BlockMode) -> [u32; 4] {
        let mut packed = [0; 4];
        let (prefix, _) = mode.prefix();
        let base = qep[0];

        match mode {
            BlockMode::Mode11 => {
                let [e0, e1] = [qep[0], qep[1]].map(|q| q.map(|v| v as u32));

                packed[0] = prefix;
                packed[1] = (e0[2] << 20) + (e0[1] << 10) + e0[0];
                packed[2] = (e1[2] << 20) + (e1[1] << 10) + e1[0];
            }
            BlockMode::Mode76 => {
                let [_, d1, d2, d3] = (*qep).map(|q| [0, 1, 2].map(|p| (q[p] - base[p]) & 63));

                let mut pqep = [0; 7];

                pqep[0] = base[0] as u32;
                pqep[0] += bit_at(d3[2], 0) << 7;
                pqep[0] += bit_at(d3[2], 1) << 8;
                pqep[0] += bit_at(d2[2], 4) << 9;

                pqep[1] = base[1] as u32;
                pqep[1] += bit_at(d2[2], 5) << 7;
                pqep[1] += bit_at(d3[2], 2) << 8;
                pqep[1] += bit_at(d2[1], 4) << 9;

                pqep[2] = base[2] as u32;
                pqep[2] += bit_at(d3[2], 3) << 7;
                pqep[2] += bit_at(d3[2], 5) << 8;
                pqep[2] += bit_at(d3[2], 4) << 9;

                pqep[4] = d1[0] as u32 + ((d2[1] & 15) as u32 * 64);
                pqep[5] = d1[1] as u32 + ((d3[1] & 15) as u32 * 64);
                pqep[6] = d1[2] as u32 + ((d2[2] & 15) as u32 * 64);

                packed[0] = prefix;
                packed[0] += bit_at(d2[1], 5) << 2;
                packed[0] += bit_at(d3[1], 4) << 3;
                packed[0] += bit_at(d3[1], 5) << 4;

                packed[1] = (pqep[2] << 20) + (pqep[1] << 10) + pqep[0];
                packed[2] = (pqep[6] << 20) + (pqep[5] << 10) + pqep[4];
                packed[3] = ((d3[0] as u32) << 6) + d2[0] as u32;
            }
            BlockMode::Mode95 => {
                let [_, d1, d2, d3] = (*qep).map(|q| [0, 1, 2].map(|p| (q[p] - base[p]) & 31));

                let mut pqep = [0; 10];

                pqep[0] = base[0] as u32 + (bit_at(d2[2], 4) << 9);
                pqep[1] = base[1] as u32 + (bit_at(d2[1], 4) << 9);
                pqep[2] = base[2] as u32 + (bit_at(d3[2], 4) << 9);

                pqep[4] = d1[0] as u32 + (d2[1] & 15) as u32 * 64;
                pqep[5] = d1[1] as u32 + (d3[1] & 15) as u32 * 64;
                pqep[6] = d1[2] as u32 + (d2[2] & 15) as u32 * 64;
                pqep[8] = d2[0] as u32;
                pqep[9] = d3[0] as u32;

                pqep[4] += bit_at(d3[1], 4) << 5;
                pqep[5] += bit_at(d3[2], 0) << 5;
                pqep[6] += bit_at(d3[2], 1) << 5;

                pqep[8] += bit_at(d3[2], 2) << 5;
                pqep[9] += bit_at(d3[2], 3) << 5;

                packed[0] = prefix;
                packed[1] = (pqep[2] << 20) + (pqep[1] << 10) + pqep[0];
                packed[2] = (pqep[6] << 20) + (pqep[5] << 10) + pqep[4];
                packed[3] = (pqep[9] << 6) + pqep[8];
            }
        }

        packed
    }

    pub(crate) fn compress_bc6h_core(&mut self) {
        self.best_err = f32::INFINITY;
        self.bc6h_enc_1p();

        if self.settings.dual_partition() {
            self.bc6h_enc_2p();
        }
    }
}
