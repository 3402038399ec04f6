use std::borrow::Cow;
use std::fs;
use std::fs::File;
use std::io::{self, stdout, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry};

use varalign::aligner::batch::process_parallel;
use varalign::aligner::scoring::{Scoring, UnitCost};
use varalign::aligner::{
    print_alignment, AlignmentConfig, AlignmentResult, GraphAligner, IntegerCostDial, LatticeStrategy, UnitCostDial,
};
use varalign::graphs::{DeBruijnGraph, LabelGraph, GAP};
use varalign::io::fasta::{is_fasta, read_fasta, read_sequences, SequenceRecord};
use varalign::io::load_graph_text;

/// Cost model used for the lattice edges
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum CostModel {
    /// Edit distance, searched with 0-1 BFS
    Unit,

    /// Configurable mismatch and gap costs, searched with a multi-bucket queue
    Integer,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct CliArgs {
    /// Set verbosity level. Use multiple times to increase the verbosity level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<VaralignSubcommand>,
}

#[derive(Subcommand, Debug)]
enum VaralignSubcommand {
    /// Align sequences to a variant graph
    Align(AlignArgs),

    /// Build a de Bruijn graph from reference sequences and align sequences to it
    Debruijn(DebruijnArgs),

    /// Render a graph in DOT format
    View(ViewArgs),

    /// Print graph statistics
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
struct ScoringArgs {
    /// Cost model
    #[arg(value_enum, long, default_value = "unit")]
    #[clap(help_heading = "Alignment configuration")]
    cost_model: CostModel,

    /// Penalty for mismatching bases (integer cost model only)
    #[arg(short = 'n', long, default_value = "1")]
    #[clap(help_heading = "Alignment configuration")]
    cost_mismatch: u8,

    /// Penalty for a gap of length one (integer cost model only)
    #[arg(short = 'g', long, default_value = "1")]
    #[clap(help_heading = "Alignment configuration")]
    cost_gap: u8,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output filename. If not given, defaults to stdout
    #[arg(short, long)]
    #[clap(help_heading = "Outputs")]
    output: Option<PathBuf>,

    /// Include a human readable rendering of each alignment
    #[arg(long)]
    #[clap(help_heading = "Outputs")]
    pretty: bool,

    /// Number of alignment threads
    #[arg(short = 't', long, default_value = "1")]
    threads: usize,
}

#[derive(Args, Debug)]
struct AlignArgs {
    /// Graph in the text graph description format
    #[clap(help_heading = "Inputs")]
    graph: PathBuf,

    /// Sequences to align in FASTA or FASTQ format
    #[clap(help_heading = "Inputs")]
    sequences: PathBuf,

    #[command(flatten)]
    scoring: ScoringArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct DebruijnArgs {
    /// Reference sequences in FASTA format
    #[clap(help_heading = "Inputs")]
    reference: PathBuf,

    /// Sequences to align in FASTA or FASTQ format
    #[clap(help_heading = "Inputs")]
    sequences: PathBuf,

    /// Length of the de Bruijn graph vertices
    #[arg(short)]
    k: usize,

    /// Collapse repeated edges before aligning
    #[arg(long)]
    dedup: bool,

    /// Per query, only keep vertices within this fraction of mismatches of one
    /// of its k-mers
    #[arg(long)]
    filter: Option<f64>,

    #[command(flatten)]
    scoring: ScoringArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct ViewArgs {
    /// Graph in the text graph description format, or FASTA when `-k` is given
    graph: PathBuf,

    /// Render the de Bruijn graph of the sequences in GRAPH with this vertex length
    #[arg(short)]
    k: Option<usize>,

    /// Output filename. If not given, defaults to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// Graph in the text graph description format
    graph: PathBuf,
}

/// One line of JSON output
#[derive(Serialize, Debug)]
struct AlignmentRecord {
    name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    distance: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pretty: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl AlignmentRecord {
    fn new(
        record: &SequenceRecord,
        graph: &LabelGraph,
        result: varalign::Result<AlignmentResult>,
        pretty: bool,
    ) -> Self {
        match result {
            Ok(result) => Self {
                name: record.name.clone(),
                distance: Some(result.distance),
                pretty: pretty.then(|| print_alignment(graph, &record.sequence, &result.alignment)),
                reference: Some(result.reference),
                query: Some(result.query),
                error: None,
            },
            Err(err) => {
                warn!("Could not align {}: {err}", record.name);

                Self {
                    name: record.name.clone(),
                    distance: None,
                    reference: None,
                    query: None,
                    pretty: None,
                    error: Some(err.to_string()),
                }
            },
        }
    }
}

/// Build our tracing subscriber with stderr logging.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_log = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_filter(filter_layer);

    Registry::default().with(stderr_log).init();
}

fn create_writer(output: Option<&Path>) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = if let Some(path) = output {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?
        }

        let file = File::create(path)
            .with_context(|| format!("Could not create output file {path:?}"))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(stdout()))
    };

    Ok(writer)
}

fn write_records(output: Option<&Path>, records: &[AlignmentRecord]) -> Result<()> {
    let mut writer = create_writer(output)?;

    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writeln!(writer)?;
    }

    writer.flush()?;

    Ok(())
}

fn load_graph(path: &Path) -> Result<LabelGraph> {
    let raw = load_graph_text(path)
        .with_context(|| format!("Could not load graph from {path:?}"))?;

    Ok(LabelGraph::from_raw(raw)?)
}

fn load_sequences(path: &Path) -> Result<Vec<SequenceRecord>> {
    let records = read_sequences(path)
        .with_context(|| format!("Could not read sequences from {path:?}"))?;

    info!("Read {} sequences from {path:?}", records.len());

    Ok(records)
}

fn linear_scoring(args: &ScoringArgs) -> impl Scoring + Sync + Copy {
    let mismatch = args.cost_mismatch;
    let gap = args.cost_gap;

    move |query: u8, label: u8| -> u8 {
        if query == GAP || label == GAP {
            gap
        } else if query == label {
            0
        } else {
            mismatch
        }
    }
}

/// Align all sequences, each against the graph returned by `graph_for`
fn align_sequences<'g, C, S, G>(
    aligner: &GraphAligner<C, S>,
    sequences: &[SequenceRecord],
    output: &OutputArgs,
    graph_for: G,
) -> Vec<AlignmentRecord>
where
    C: AlignmentConfig + Sync,
    S: Scoring + Sync,
    G: Fn(&SequenceRecord) -> varalign::Result<Cow<'g, LabelGraph>> + Sync,
{
    process_parallel(sequences, output.threads, |record| {
        match graph_for(record) {
            Ok(graph) => {
                let result = aligner.align(&graph, &record.sequence);
                AlignmentRecord::new(record, &graph, result, output.pretty)
            },
            Err(err) => AlignmentRecord::new(record, &LabelGraph::default(), Err(err), output.pretty),
        }
    })
}

fn align_with_cost_model<'g, G>(
    scoring_args: &ScoringArgs,
    strategy: LatticeStrategy,
    sequences: &[SequenceRecord],
    output: &OutputArgs,
    graph_for: G,
) -> Vec<AlignmentRecord>
where
    G: Fn(&SequenceRecord) -> varalign::Result<Cow<'g, LabelGraph>> + Sync,
{
    match scoring_args.cost_model {
        CostModel::Unit => {
            let aligner = GraphAligner::with_strategy(UnitCostDial, UnitCost, strategy);
            align_sequences(&aligner, sequences, output, graph_for)
        },
        CostModel::Integer => {
            let aligner = GraphAligner::with_strategy(IntegerCostDial, linear_scoring(scoring_args), strategy);
            align_sequences(&aligner, sequences, output, graph_for)
        },
    }
}

fn align_subcommand(align_args: &AlignArgs) -> Result<()> {
    let graph = load_graph(&align_args.graph)?;
    info!("Loaded graph with {} nodes and {} edges", graph.node_count(), graph.edge_count());

    let sequences = load_sequences(&align_args.sequences)?;

    let records = align_with_cost_model(
        &align_args.scoring,
        LatticeStrategy::Standard,
        &sequences,
        &align_args.output,
        |_| Ok(Cow::Borrowed(&graph)),
    );

    write_records(align_args.output.output.as_deref(), &records)
}

fn build_debruijn(reference: &Path, k: usize) -> Result<DeBruijnGraph> {
    ensure!(k > 0, "k must be at least 1");

    let references = read_fasta(reference)
        .with_context(|| format!("Could not read reference sequences from {reference:?}"))?;
    let seqs: Vec<&[u8]> = references.iter()
        .map(|r| r.sequence.as_slice())
        .collect();

    Ok(DeBruijnGraph::from_sequences(&seqs, k + 1, GAP))
}

fn debruijn_subcommand(args: &DebruijnArgs) -> Result<()> {
    let mut dbg = build_debruijn(&args.reference, args.k)?;
    if args.dedup {
        dbg.dedup_edges();
    }

    info!("Built de Bruijn graph with {} vertices and {} edges", dbg.vertex_count(), dbg.edge_count());

    let sequences = load_sequences(&args.sequences)?;
    let strategy = LatticeStrategy::Stride(dbg.block_len());

    let records = if let Some(threshold) = args.filter {
        ensure!(threshold >= 0.0, "filter threshold must not be negative");

        align_with_cost_model(&args.scoring, strategy, &sequences, &args.output, |record| {
            dbg.filter(&record.sequence, threshold)?
                .to_label_graph()
                .map(Cow::Owned)
        })
    } else {
        let graph = dbg.to_label_graph()?;
        align_with_cost_model(&args.scoring, strategy, &sequences, &args.output, |_| Ok(Cow::Borrowed(&graph)))
    };

    write_records(args.output.output.as_deref(), &records)
}

fn view_subcommand(view_args: &ViewArgs) -> Result<()> {
    let mut writer = create_writer(view_args.output.as_deref())?;

    if let Some(k) = view_args.k {
        let dbg = build_debruijn(&view_args.graph, k)?;
        write!(writer, "{dbg}")?;
    } else {
        ensure!(
            !is_fasta(&view_args.graph),
            "{:?} looks like a FASTA file, use -k to render its de Bruijn graph",
            view_args.graph
        );

        let graph = load_graph(&view_args.graph)?;
        write!(writer, "{graph}")?;
    }

    writer.flush()?;

    Ok(())
}

fn stats_subcommand(stats_args: &StatsArgs) -> Result<()> {
    let graph = load_graph(&stats_args.graph)?;
    print_graph_stats(&graph);

    Ok(())
}

fn print_graph_stats(graph: &LabelGraph) {
    println!("node_count: {}", graph.node_count());
    println!("edge_count: {}", graph.edge_count());
    println!("loop_count: {}", graph.loop_count());

    let node_count = graph.node_count().max(1) as f64;
    let avg_in_degree = graph.in_degrees().iter().sum::<usize>() as f64 / node_count;
    let avg_out_degree = (0..graph.node_count())
        .map(|n| graph.out_degree(n))
        .sum::<usize>() as f64 / node_count;

    println!("avg_in_degree: {:.2}", avg_in_degree);
    println!("avg_out_degree: {:.2}", avg_out_degree);
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    match &args.command {
        Some(VaralignSubcommand::Align(v)) => align_subcommand(v)?,
        Some(VaralignSubcommand::Debruijn(v)) => debruijn_subcommand(v)?,
        Some(VaralignSubcommand::View(v)) => view_subcommand(v)?,
        Some(VaralignSubcommand::Stats(v)) => stats_subcommand(v)?,
        None => anyhow::bail!("No subcommand given."),
    };

    Ok(())
}
