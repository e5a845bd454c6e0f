#[derive(Debug, Clone)]
pub struct LogErrorResult {
    pub overall_rmsle: f64,
    pub overall_psnr: f64,
    pub channel_results: ChannelResults,
}

#[derive(Debug, Clone)]
pub struct ChannelResults {
    pub red: ChannelMetrics,
    pub green: ChannelMetrics,
    pub blue: ChannelMetrics,
}

#[derive(Debug, Clone)]
pub struct ChannelMetrics {
    pub rmsle: f64,
    pub psnr: f64,
}

/// Calculates quality metrics in log2(x + 1) space. The input and output data must be RGB data.
pub fn calculate_image_metrics(
    original: &[f32],
    compressed: &[f32],
    width: u32,
    height: u32,
) -> LogErrorResult {
    if original.len() != compressed.len() {
        panic!("Image buffers must have same length");
    }
    if original.len() != (width * height * 3) as usize {
        panic!("Buffer size doesn't match dimensions");
    }

    let mut channel_msle = [0.0; 3];
    let mut peak: f64 = 0.0;
    let pixel_count = (width * height) as f64;

    for index in (0..original.len()).step_by(3) {
        for channel in 0..3 {
            let orig = to_log(original[index + channel]);
            let comp = to_log(compressed[index + channel]);

            peak = peak.max(orig);

            let diff = orig - comp;
            channel_msle[channel] += diff * diff;
        }
    }

    channel_msle.iter_mut().for_each(|msle| *msle /= pixel_count);

    let calculate_psnr = |msle: f64| -> f64 {
        if msle == 0.0 || peak == 0.0 {
            f64::INFINITY
        } else {
            20.0 * (peak / msle.sqrt()).log10()
        }
    };

    let overall_msle = channel_msle.iter().sum::<f64>() / 3.0;

    let channel_metrics = |msle: f64| ChannelMetrics {
        rmsle: msle.sqrt(),
        psnr: calculate_psnr(msle),
    };

    LogErrorResult {
        overall_rmsle: overall_msle.sqrt(),
        overall_psnr: calculate_psnr(overall_msle),
        channel_results: ChannelResults {
            red: channel_metrics(channel_msle[0]),
            green: channel_metrics(channel_msle[1]),
            blue: channel_metrics(channel_msle[2]),
        },
    }
}

#[inline]
fn to_log(value: f32) -> f64 {
    (value.max(0.0) as f64 + 1.0).log2()
}
