// Thu Aug 6 2026 - Alex

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use ctypegraph::manipulate::{
    ConnectedFilter, ManipulatorPipeline, NamespaceFlattener, SourceFilter, TopologicalSort,
};
use ctypegraph::{
    BitfieldMode, Config, Endianness, JsonExporter, RawNodeSet, TextReport,
};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "C/C++ header type graph and layout generator", long_about = None)]
struct Args {
    /// Raw-node JSON documents, one per translation unit, in input order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    #[arg(short, long, default_value = "typegraph.json")]
    output: PathBuf,

    /// Target pointer width in bits.
    #[arg(long, default_value_t = 64)]
    pointer_width: u32,

    /// Target byte order: little or big.
    #[arg(long, default_value = "little")]
    endianness: String,

    /// Global pack cap (0 = natural alignment).
    #[arg(long, default_value_t = 0)]
    default_alignment: u64,

    /// Bitfield packing rule: gcc or msvc.
    #[arg(long, default_value = "gcc")]
    bitfield_mode: String,

    /// Abort the run on any unresolved field type.
    #[arg(long)]
    strict: bool,

    /// Keep bool as a distinct scalar type.
    #[arg(long)]
    use_bool: bool,

    /// Drop declarations pulled in from system include directories.
    #[arg(long)]
    exclude_system: bool,

    /// Keep only entities reachable from these roots.
    #[arg(long)]
    filter_root: Vec<String>,

    /// Reorder output so dependencies come before use.
    #[arg(long)]
    topo_sort: bool,

    /// Flatten namespaces into double-underscore names.
    #[arg(long)]
    flatten_namespaces: bool,

    /// Also write a human-readable layout report.
    #[arg(long)]
    report: Option<PathBuf>,

    #[arg(long)]
    compact: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    ctypegraph::logging::init_logger(args.verbose);
    let started = Instant::now();

    let endianness = match args.endianness.to_lowercase().as_str() {
        "little" | "le" => Endianness::Little,
        "big" | "be" => Endianness::Big,
        other => anyhow::bail!("unknown endianness '{}'", other),
    };
    let bitfield_mode = match args.bitfield_mode.to_lowercase().as_str() {
        "gcc" | "clang" | "gcc_clang" => BitfieldMode::GccClang,
        "msvc" => BitfieldMode::Msvc,
        other => anyhow::bail!("unknown bitfield mode '{}'", other),
    };
    let config = Config::new()
        .with_pointer_width(args.pointer_width)
        .with_endianness(endianness)
        .with_default_alignment(args.default_alignment)
        .with_bitfield_mode(bitfield_mode)
        .with_strict_unresolved(args.strict)
        .with_use_bool(args.use_bool);
    config.validate()?;

    let mut sets = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let set = RawNodeSet::from_json(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        log::info!("loaded {} nodes from {}", set.len(), path.display());
        sets.push(set);
    }

    let mut graph = ctypegraph::process(&sets, &config)
        .context("building the type graph")?;

    let mut pipeline = ManipulatorPipeline::new();
    if args.exclude_system {
        pipeline.add_stage(SourceFilter::exclude_system());
    }
    if !args.filter_root.is_empty() {
        pipeline.add_stage(ConnectedFilter::new(args.filter_root.clone()));
    }
    if args.topo_sort {
        pipeline.add_stage(TopologicalSort);
    }
    if args.flatten_namespaces {
        pipeline.add_stage(NamespaceFlattener);
    }
    if !pipeline.is_empty() {
        graph = pipeline.run(graph).context("applying manipulators")?;
    }

    JsonExporter::new()
        .with_pretty_print(!args.compact)
        .export_to_file(&graph, &args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    log::info!("wrote {}", args.output.display());

    if let Some(report_path) = &args.report {
        let report = TextReport::new().render(&graph)?;
        fs::write(report_path, report)
            .with_context(|| format!("writing {}", report_path.display()))?;
        log::info!("wrote {}", report_path.display());
    }

    let summary = graph.summary();
    println!("{}", "Run complete".green().bold());
    println!("{}", summary);
    println!("elapsed: {:.2?}", started.elapsed());
    Ok(())
}
