use crate::config::load_config;
use crate::ir::Graph;
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::render::{render_svg, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "citylayout",
    version,
    about = "Radial code-city layout for dependency graphs"
)]
pub struct Args {
    /// Input graph JSON or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for JSON and SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Config file (JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Spacing multiplier
    #[arg(long = "density")]
    pub density: Option<f32>,

    /// Fixed relaxation seed
    #[arg(long = "seed")]
    pub seed: Option<u32>,

    /// Files per district before it is reported as a cluster
    #[arg(long = "clusterThreshold")]
    pub cluster_threshold: Option<usize>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(density) = args.density {
        config.layout.density = density;
    }
    if args.seed.is_some() {
        config.layout.seed = args.seed;
    }
    if let Some(threshold) = args.cluster_threshold {
        config.layout.cluster.threshold = threshold;
    }

    let input = read_input(args.input.as_deref())?;
    let graph = Graph::from_json(&input)?;
    tracing::info!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "loaded graph"
    );
    let result = compute_layout(&graph, &config.layout);

    match args.output_format {
        OutputFormat::Json => {
            write_layout_dump(
                args.output.as_deref(),
                &result,
                &graph,
                config.layout.cluster.threshold,
            )?;
        }
        OutputFormat::Svg => {
            let svg = render_svg(&result, &config.theme, &config.render);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(&result, &config.theme, &config.render);
            write_png(&svg, &output, &config.render)?;
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, render_cfg: &crate::config::RenderConfig) -> Result<()> {
    crate::render::write_output_png(svg, output, render_cfg)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _render_cfg: &crate::config::RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
