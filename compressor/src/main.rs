//! Compresses an HDR image (`.hdr`, `.exr`) into a BC6H DDS file.

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use ddsfile::{AlphaMode, D3D10ResourceDimension, Dds, DxgiFormat, NewDxgiParams};
use fast_bc6h::{blocks_byte_size, compress_rgb32f, BC6HSettings, BlockMode};
use image::ImageReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "compressor")]
#[command(about = "Compresses HDR images into BC6H (unsigned) DDS files")]
struct Cli {
    /// Input image
    file: PathBuf,

    /// Output path, defaults to the input path with a `.dds` extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Encoding preset
    #[arg(short, long, value_enum, default_value_t = Quality::Quality)]
    quality: Quality,

    /// Also inset the bounding boxes of two region candidates
    #[arg(long)]
    dual_partition_inset: bool,

    /// Weight all channels equally when scoring candidates
    #[arg(long)]
    no_luminance_weights: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Quality {
    /// Single region mode only
    Fast,
    /// Single and two region modes
    Quality,
}

impl Cli {
    fn settings(&self) -> BC6HSettings {
        let settings = match self.quality {
            Quality::Fast => BC6HSettings::fast(),
            Quality::Quality => BC6HSettings::quality(),
        };

        settings
            .with_dual_partition_inset(self.dual_partition_inset)
            .with_luminance_weights(!self.no_luminance_weights)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = cli.settings();

    let start = Instant::now();

    let (rgb_data, width, height) = read_image(&cli.file)?;

    let duration = start.elapsed();
    info!(
        "Image read took: {:.3} ms ({width}x{height})",
        duration.as_secs_f64() * 1000.0
    );

    let start = Instant::now();

    let mut blocks_buffer = vec![0; blocks_byte_size(width, height)];
    let stats = compress_rgb32f(
        &rgb_data,
        &mut blocks_buffer,
        width,
        height,
        width * 3,
        &settings,
    )
    .context("failed to compress image")?;

    let duration = start.elapsed();
    info!(
        "Compression of {} blocks took: {:.3} ms",
        stats.blocks,
        duration.as_secs_f64() * 1000.0
    );
    for mode in BlockMode::ALL {
        info!("{mode}: {} blocks", stats.mode_count(mode));
    }
    info!("Average block MSLE: {:.6}", stats.average_msle());

    let start = Instant::now();

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.file.with_extension("dds"));
    write_dds_file(&output, width, height, blocks_buffer)?;

    let duration = start.elapsed();
    info!(
        "DDS output to disk took: {:.3} ms ({})",
        duration.as_secs_f64() * 1000.0,
        output.display()
    );

    Ok(())
}

/// Reads an image as tightly packed RGB `f32` data.
///
/// Negative and non-finite channels can't be represented by BC6H (unsigned)
/// and are replaced by zero.
fn read_image(file: &Path) -> anyhow::Result<(Vec<f32>, u32, u32)> {
    let image = ImageReader::open(file)
        .with_context(|| format!("can't open input image {}", file.display()))?
        .decode()
        .with_context(|| format!("can't decode image {}", file.display()))?;

    let rgb_image = image.to_rgb32f();
    let width = rgb_image.width();
    let height = rgb_image.height();

    let mut rgb_data = rgb_image.into_raw();
    for value in rgb_data.iter_mut() {
        if !value.is_finite() || *value < 0.0 {
            *value = 0.0;
        }
    }

    Ok((rgb_data, width, height))
}

fn write_dds_file(
    file: &Path,
    width: u32,
    height: u32,
    block_data: Vec<u8>,
) -> anyhow::Result<()> {
    let mut dds = Dds::new_dxgi(NewDxgiParams {
        height,
        width,
        depth: None,
        format: DxgiFormat::BC6H_UF16,
        mipmap_levels: Some(1),
        array_layers: None,
        caps2: None,
        is_cubemap: false,
        resource_dimension: D3D10ResourceDimension::Texture2D,
        alpha_mode: AlphaMode::Opaque,
    })
    .context("failed to create DDS header")?;

    dds.data = block_data;

    let file = File::create(file)
        .with_context(|| format!("failed to create output file {}", file.display()))?;
    dds.write(&mut BufWriter::new(file))
        .context("failed to write DDS file")?;

    Ok(())
}
