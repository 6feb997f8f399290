//! CLI for auditview - inspect findings against local CSV sheets
//!
//! Usage:
//!   auditview_cli --sheet Sheet1=data.csv --findings findings.json
//!   auditview_cli --sheet data.csv --findings f.json --focus F-3 --zoom 150
//!   auditview_cli --sheet data.csv --cell AA120
//!
//! Each `--sheet` becomes one sheet of an in-memory workbook served with the
//! same clamping rules as the backend. Set `RUST_LOG=debug` to watch tile
//! fetches.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use futures::executor::block_on;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use auditview::cell_ref::parse_address;
use auditview::references::Eligibility;
use auditview::render::{RenderBackend, TextRenderer};
use auditview::tiles::MemoryTileSource;
use auditview::{AuditSession, AuditViewError, FindingRecord, Result, ViewerConfig};

const LOCAL_FILE_ID: &str = "local";

#[derive(Parser, Debug)]
#[command(name = "auditview_cli", version, about = "Inspect audit findings against CSV sheets")]
struct Args {
    /// Sheet as NAME=PATH (or just PATH, named after the file stem)
    #[arg(long = "sheet", value_name = "NAME=PATH", required = true)]
    sheets: Vec<String>,

    /// Findings JSON (array of finding records)
    #[arg(long, value_name = "PATH")]
    findings: Option<PathBuf>,

    /// Viewer config JSON
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Zoom in percent
    #[arg(long, value_name = "PERCENT")]
    zoom: Option<u32>,

    /// Grid viewport as WIDTHxHEIGHT pixels
    #[arg(long, value_name = "WxH", default_value = "800x240")]
    viewport: String,

    /// Focus a finding by id
    #[arg(long, value_name = "ID")]
    focus: Option<String>,

    /// Scroll to a cell of the active sheet (clamped to the sheet)
    #[arg(long, value_name = "CELL")]
    cell: Option<String>,

    /// Text width of each grid column
    #[arg(long, default_value_t = 12)]
    column_width: usize,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(filter),
        )
        .init();
}

fn parse_viewport(s: &str) -> Result<(f64, f64)> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| AuditViewError::Config(format!("viewport '{s}' is not WIDTHxHEIGHT")))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && *n > 0.0)
            .ok_or_else(|| AuditViewError::Config(format!("bad viewport dimension '{v}'")))
    };
    Ok((parse(w)?, parse(h)?))
}

fn split_sheet_arg(arg: &str) -> (String, PathBuf) {
    match arg.split_once('=') {
        Some((name, path)) => (name.trim().to_string(), PathBuf::from(path)),
        None => {
            let path = PathBuf::from(arg);
            let name = Path::new(arg)
                .file_stem()
                .map_or_else(|| arg.to_string(), |s| s.to_string_lossy().into_owned());
            (name, path)
        }
    }
}

fn load_source(sheets: &[String]) -> Result<MemoryTileSource> {
    let mut source = MemoryTileSource::new(LOCAL_FILE_ID);
    for arg in sheets {
        let (name, path) = split_sheet_arg(arg);
        let file = fs::File::open(&path)?;
        source = source.with_csv_sheet(&name, file)?;
        tracing::info!("Loaded sheet '{name}' from {}", path.display());
    }
    Ok(source)
}

fn print_findings(session: &AuditSession<MemoryTileSource>) {
    let summary = session.summary();
    println!(
        "findings: {} (matched {}, mismatched {}, unverifiable {}, other {}), accuracy {:.1}%",
        summary.total,
        summary.matched,
        summary.mismatched,
        summary.unverifiable,
        summary.other,
        summary.accuracy
    );
    if summary.non_interactive > 0 {
        println!("not highlightable: {}", summary.non_interactive);
    }
    for entry in session.findings() {
        let r = &entry.record;
        let target = match &entry.eligibility {
            Eligibility::Interactive { sheet, cells } => {
                let cells: Vec<String> = cells.iter().map(ToString::to_string).collect();
                format!("{sheet}!{}", cells.join(","))
            }
            Eligibility::NonInteractive { reason } => format!("-- {reason}"),
        };
        println!(
            "  {:<10} {:<13} {:<20} {}",
            r.id,
            r.status.as_str(),
            r.display_value,
            target
        );
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    let (width, height) = parse_viewport(&args.viewport)?;

    let mut session = AuditSession::new(config, load_source(&args.sheets)?);
    let _ = session.resize(width, height);
    block_on(session.open(LOCAL_FILE_ID))?;

    if let Some(path) = &args.findings {
        let records: Vec<FindingRecord> = serde_json::from_str(&fs::read_to_string(path)?)?;
        session.set_findings(records);
        print_findings(&session);
    }

    if let Some(zoom) = args.zoom {
        let job = session.set_zoom(zoom);
        block_on(session.drive(job));
    }

    if let Some(id) = &args.focus {
        block_on(session.focus_finding(id))?;
    }

    if let Some(cell) = &args.cell {
        let addr = parse_address(cell).ok_or_else(|| AuditViewError::CellRef(cell.clone()))?;
        let spot = block_on(session.spotlight(addr))?;
        println!("spotlight: {}!R{}C{}", spot.sheet, spot.row, spot.col);
    }

    if let Some(report) = session.last_preload() {
        if !report.failed.is_empty() {
            eprintln!("{} tile(s) failed to load", report.failed.len());
        }
    }

    let mut renderer = TextRenderer::new(args.column_width);
    if let Some(grid) = session.frame().and_then(|f| f.grid.as_ref()) {
        renderer.draw_grid(grid)?;
        print!("{}", renderer.grid());
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
