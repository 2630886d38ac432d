//! Slice viewer CLI.
//!
//! Renders one slice of a chunked seismic volume through the tile pipeline
//! and writes the composite as PNG, or probes a slice's global statistics.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use renderer::RgbaBuffer;
use seismic_common::{dataset_address, SliceSpec, SliceType};
use tile_pipeline::{read_full_slice, InputEvent, PipelineConfig, PlanPolicy, SliceViewer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use volume_store::{
    FilesystemConnector, HttpConnector, HttpStoreConfig, VolumeStore, ZarrVolumeStore,
};

#[derive(Parser, Debug)]
#[command(name = "slice-viewer")]
#[command(about = "Render and inspect seismic slices from a chunked volume store")]
struct Cli {
    /// Store root URL; datasets live at {root}/{dataset}/level_{n}/seismic
    #[arg(long, env = "SEISMIC_API_ROOT")]
    api_root: Option<String>,

    /// Read datasets from a local directory instead of over HTTP
    #[arg(long, env = "SEISMIC_STORE_DIR")]
    store_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Number of tokio worker threads (default: number of CPU cores)
    #[arg(long, env = "TOKIO_WORKER_THREADS")]
    worker_threads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct SliceArgs {
    /// Dataset identifier
    dataset: String,

    /// Slice type: inline or crossline
    #[arg(value_parser = parse_slice_type)]
    slice_type: SliceType,

    /// Index along the fixed axis
    slice_number: u64,

    /// Resolution level
    #[arg(short, long, default_value = "0")]
    level: u32,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a slice through the tile pipeline
    Render {
        #[command(flatten)]
        slice: SliceArgs,

        /// Write the composite to this PNG file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Tile edge length in samples
        #[arg(long)]
        tile_size: Option<usize>,

        /// Maximum concurrent tile reads
        #[arg(long)]
        max_fetches: Option<usize>,

        /// Fetch every tile instead of only the visible ones
        #[arg(long)]
        whole_plane: bool,

        /// Vertical sample axis
        #[arg(long)]
        rotate: bool,

        /// Viewport width in pixels
        #[arg(long)]
        width: Option<usize>,

        /// Viewport height in pixels
        #[arg(long)]
        height: Option<usize>,

        /// Wheel steps before rendering (positive zooms in)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        zoom_steps: i32,

        /// Pan offset in viewport pixels, as X,Y
        #[arg(long, value_parser = parse_pan, allow_hyphen_values = true)]
        pan: Option<(f64, f64)>,

        /// Print pipeline counters in Prometheus text format after rendering
        #[arg(long)]
        prometheus: bool,
    },

    /// Read a whole slice once and report its global range
    Probe {
        #[command(flatten)]
        slice: SliceArgs,
    },
}

fn parse_slice_type(s: &str) -> Result<SliceType, String> {
    SliceType::parse(s).ok_or_else(|| format!("invalid slice type '{}'", s))
}

fn parse_pan(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{}'", s))?;
    let x = x.trim().parse().map_err(|e| format!("invalid X: {}", e))?;
    let y = y.trim().parse().map_err(|e| format!("invalid Y: {}", e))?;
    Ok((x, y))
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(threads) = cli.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    init_tracing(&cli.log_level, cli.log_json)?;

    let mut config = PipelineConfig::from_env();
    let store: Arc<dyn VolumeStore> = match &cli.store_dir {
        Some(dir) => {
            config.api_root = dir
                .to_str()
                .context("store directory is not valid UTF-8")?
                .trim_end_matches('/')
                .to_string();
            Arc::new(ZarrVolumeStore::new(FilesystemConnector))
        }
        None => {
            if let Some(root) = &cli.api_root {
                config.api_root = root.trim_end_matches('/').to_string();
            }
            Arc::new(ZarrVolumeStore::new(HttpConnector::new(
                HttpStoreConfig::from_env(),
            )))
        }
    };

    match cli.command {
        Command::Render {
            slice,
            output,
            tile_size,
            max_fetches,
            whole_plane,
            rotate,
            width,
            height,
            zoom_steps,
            pan,
            prometheus,
        } => {
            if let Some(size) = tile_size {
                config.tile_size = size;
            }
            if let Some(limit) = max_fetches {
                config.max_concurrent_fetches = limit;
            }
            if whole_plane {
                config.plan_policy = PlanPolicy::WholePlane;
            }
            config.rotate |= rotate;
            if let Some(w) = width {
                config.viewport_width = w;
            }
            if let Some(h) = height {
                config.viewport_height = h;
            }

            let exporter = if prometheus {
                Some(
                    PrometheusBuilder::new()
                        .install_recorder()
                        .context("failed to install Prometheus recorder")?,
                )
            } else {
                None
            };

            render(store, config, slice, output, zoom_steps, pan).await?;

            if let Some(handle) = exporter {
                print!("{}", handle.render());
            }
            Ok(())
        }
        Command::Probe { slice } => probe(store, &config, slice).await,
    }
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr);
    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

async fn render(
    store: Arc<dyn VolumeStore>,
    config: PipelineConfig,
    slice: SliceArgs,
    output: Option<PathBuf>,
    zoom_steps: i32,
    pan: Option<(f64, f64)>,
) -> Result<()> {
    info!(
        api_root = %config.api_root,
        policy = %config.plan_policy,
        tile_size = config.tile_size,
        rotate = config.rotate,
        "Starting slice render"
    );

    let viewer = SliceViewer::new(store, RgbaBuffer::new(), config)?;

    // Position the viewport before the first generation
    let delta_y = if zoom_steps > 0 { -1.0 } else { 1.0 };
    for _ in 0..zoom_steps.unsigned_abs() {
        viewer.on_pan_zoom(InputEvent::Wheel { delta_y }).await?;
    }
    if let Some((dx, dy)) = pan {
        viewer
            .on_pan_zoom(InputEvent::PointerDown { x: 0.0, y: 0.0 })
            .await?;
        viewer
            .on_pan_zoom(InputEvent::PointerMove { x: dx, y: dy })
            .await?;
        viewer.on_pan_zoom(InputEvent::PointerUp).await?;
    }

    let outcome = viewer
        .render(
            &slice.dataset,
            slice.level,
            slice.slice_type,
            slice.slice_number,
        )
        .await;

    let surface = viewer.surface();
    let buffer = surface.lock().await;
    if let Some(message) = buffer.error() {
        bail!("render failed: {}", message);
    }
    outcome?;

    println!("{}", serde_json::to_string_pretty(&viewer.metrics())?);

    if let Some(path) = output {
        let png = buffer.to_png().map_err(anyhow::Error::msg)?;
        std::fs::write(&path, png)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(
            path = %path.display(),
            width = buffer.width(),
            height = buffer.height(),
            "Wrote slice image"
        );
    }

    Ok(())
}

async fn probe(
    store: Arc<dyn VolumeStore>,
    config: &PipelineConfig,
    slice: SliceArgs,
) -> Result<()> {
    let address = dataset_address(&config.api_root, &slice.dataset, slice.level);
    let handle = store.open(&address).await?;
    info!(address = %address, shape = ?handle.shape(), "Opened volume");

    let spec = SliceSpec::new(slice.slice_type, slice.slice_number);
    let stats = read_full_slice(handle.as_ref(), spec).await?;

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pan() {
        assert_eq!(parse_pan("30,15").unwrap(), (30.0, 15.0));
        assert_eq!(parse_pan("-12.5, 4").unwrap(), (-12.5, 4.0));
        assert!(parse_pan("30").is_err());
        assert!(parse_pan("a,b").is_err());
    }

    #[test]
    fn test_parse_render_command() {
        let cli = Cli::try_parse_from([
            "slice-viewer",
            "--store-dir",
            "/data/zarr",
            "render",
            "TNE01",
            "crossline",
            "120",
            "--level",
            "1",
            "--zoom-steps",
            "-2",
            "--pan",
            "-30,15",
            "--whole-plane",
        ])
        .unwrap();

        match cli.command {
            Command::Render {
                slice,
                zoom_steps,
                pan,
                whole_plane,
                ..
            } => {
                assert_eq!(slice.dataset, "TNE01");
                assert_eq!(slice.slice_type, SliceType::Crossline);
                assert_eq!(slice.slice_number, 120);
                assert_eq!(slice.level, 1);
                assert_eq!(zoom_steps, -2);
                assert_eq!(pan, Some((-30.0, 15.0)));
                assert!(whole_plane);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_slice_type() {
        let result = Cli::try_parse_from(["slice-viewer", "probe", "TNE01", "timeslice", "3"]);
        assert!(result.is_err());
    }
}
