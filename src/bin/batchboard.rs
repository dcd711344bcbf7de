use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use batchboard::batch::{publish_images, report_rows};
use batchboard::{
    BatchConfig, BatchPipeline, DataTable, DirObjectStore, ExportFormat, ExportMode, TemplateDef,
};

#[derive(Parser, Debug)]
#[command(name = "batchboard", version)]
struct Cli {
    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one image per data row.
    Render(RenderArgs),
    /// Render the template once with its own content.
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Template JSON.
    #[arg(long)]
    template: PathBuf,

    /// Rows JSON: an array of string arrays, header first.
    #[arg(long)]
    rows: PathBuf,

    /// Output directory for images and `report.json`.
    #[arg(long)]
    out: PathBuf,

    /// Batch configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override render worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Override the output format.
    #[arg(long, value_enum)]
    format: Option<ExportFormat>,

    /// Export only the main artboard.
    #[arg(long, default_value_t = false)]
    artboard: bool,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Template JSON.
    #[arg(long)]
    template: PathBuf,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Batch configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Preview(args) => cmd_preview(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<BatchConfig> {
    match path {
        Some(p) => Ok(BatchConfig::from_path(p)?),
        None => Ok(BatchConfig::default()),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if args.threads.is_some() {
        config.threads = args.threads;
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    if args.artboard {
        config.export_mode = ExportMode::Artboard;
    }

    let def = TemplateDef::from_path(&args.template)?;
    let rows = std::fs::read_to_string(&args.rows)
        .with_context(|| format!("read rows '{}'", args.rows.display()))?;
    let table = DataTable::from_json_str(&rows)?;

    let outcome = BatchPipeline::from_config(&config).run(&def, &table)?;

    let store = DirObjectStore::new(&args.out);
    let links = publish_images(&store, &outcome)?;
    let report = serde_json::json!({
        "summary": outcome.summary(),
        "failed": outcome.failed,
        "rows": report_rows(&table.header_row, &table.data_rows, &outcome, &links),
    });
    let report_path = args.out.join("report.json");
    std::fs::write(&report_path, serde_json::to_vec_pretty(&report)?)
        .with_context(|| format!("write report '{}'", report_path.display()))?;

    let summary = outcome.summary();
    eprintln!(
        "{} rows: {} rendered, {} failed; report at {}",
        summary.total_rows,
        summary.successful_images,
        summary.failed_images,
        report_path.display()
    );
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let def = TemplateDef::from_path(&args.template)?;
    let image = BatchPipeline::from_config(&config).preview(&def)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &image.bytes)
        .with_context(|| format!("write image '{}'", args.out.display()))?;

    eprintln!("wrote {} ({}x{})", args.out.display(), image.width, image.height);
    Ok(())
}
