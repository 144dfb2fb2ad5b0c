use crate::config::load_config;
use crate::diagram::Diagram;
use crate::highlight::{Emphasis, FocusTarget, HighlightController, resolve_focus};
use crate::ir::{LayerOrder, NodeRef, PathId};
use crate::layout_dump::write_layout_dump;
use crate::render::{write_output_png, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "plr", version, about = "Layered path diagrams from graph query results")]
pub struct Args {
    /// Input file (JSON array of query paths) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON5 file (theme, layout, vocabulary, layer order)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Layer visitation order, e.g. 5,4,3,2,1,0
    #[arg(long = "order")]
    pub order: Option<LayerOrder>,

    /// Emphasize the path at this input index
    #[arg(long = "focus-path", conflicts_with = "focus_group")]
    pub focus_path: Option<usize>,

    /// Emphasize a group, given as ROW:INDEX
    #[arg(long = "focus-group", value_parser = parse_group_ref)]
    pub focus_group: Option<GroupRef>,

    /// Keyword marked in the side-panel text of focused paths
    #[arg(long = "keyword")]
    pub keyword: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupRef {
    pub row: usize,
    pub index: usize,
}

fn parse_group_ref(value: &str) -> std::result::Result<GroupRef, String> {
    let (row, index) = value
        .split_once(':')
        .ok_or_else(|| format!("expected ROW:INDEX, got `{value}`"))?;
    let row = row
        .trim()
        .parse()
        .map_err(|_| format!("invalid row `{row}`"))?;
    let index = index
        .trim()
        .parse()
        .map_err(|_| format!("invalid group index `{index}`"))?;
    Ok(GroupRef { row, index })
}

/// Installs the stderr log subscriber; `RUST_LOG` overrides the `warn` default.
///
/// Returns `false` when a global subscriber is already set, in which case
/// the existing one keeps receiving events.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .is_ok()
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.layout.width = width;
    }
    if let Some(height) = args.height {
        config.layout.height = height;
    }
    if let Some(order) = args.order {
        config.layer_order = order;
    }

    let input = read_input(args.input.as_deref())?;
    let diagram = Diagram::from_json(&input, config)?;
    let emphasis = apply_focus(&diagram, &args)?;

    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&diagram.render_svg(&emphasis), args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = diagram.render_svg(&emphasis);
            let config = diagram.config();
            write_output_png(&svg, &output, &config.render, &config.theme)?;
        }
        OutputFormat::Json => {
            write_layout_dump(args.output.as_deref(), diagram.layout())?;
        }
    }

    Ok(())
}

/// Runs one focus transition when requested and prints the side-panel cards
/// of the touched paths to stderr.
fn apply_focus(diagram: &Diagram, args: &Args) -> Result<Emphasis> {
    let target = match (args.focus_path, args.focus_group) {
        (Some(index), _) => {
            let path = diagram
                .paths()
                .get(index)
                .ok_or_else(|| anyhow::anyhow!("No path at index {index}"))?;
            let (layer, _) = path
                .populated()
                .next()
                .ok_or_else(|| anyhow::anyhow!("Path {index} has no classified nodes"))?;
            FocusTarget::Node(NodeRef {
                path: path.id,
                layer,
            })
        }
        (None, Some(group)) => FocusTarget::Group {
            row: group.row,
            index: group.index,
        },
        (None, None) => return Ok(Emphasis::idle()),
    };

    let focus = resolve_focus(diagram.layout(), target)
        .ok_or_else(|| anyhow::anyhow!("Focus target {target:?} is not in the diagram"))?;

    let keyword = args.keyword.as_deref();
    let mut details = Vec::new();
    let mut controller = HighlightController::new(
        diagram.config().theme.mask_opacity,
        |paths: &[PathId]| details = diagram.describe(paths, keyword),
    );
    controller.on_focus(&focus);
    let emphasis = controller.emphasis();
    drop(controller);

    eprintln!("{}", serde_json::to_string_pretty(&details)?);
    Ok(emphasis)
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
