use clap::{Args, Parser, Subcommand};
use gbwtgraph::{
    algorithms, gfa_to_gbwt, params, GbwtGraph, GfaParsingParameters, GraphError, Handle,
};
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};
use std::collections::HashSet;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// gbwtgraph: build a haplotype index from GFA and analyse its graph structure
#[derive(Parser, Debug)]
#[command(
    name = "gbwtgraph",
    about = "Build a bidirectional haplotype index from a GFA file and analyse the induced graph",
    version,
    propagate_version = true,
    arg_required_else_help = true
)]
struct Cli {
    /// Log debug messages
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List weakly connected components with their head nodes
    Components(ComponentsArgs),
    /// Print a topological order of both orientations of a set of nodes
    Order(OrderArgs),
    /// List the paths stored in the index
    Paths(PathsArgs),
}

#[derive(Args, Debug, Clone)]
struct BuildArgs {
    /// Path to the input GFA file
    #[arg(short, long, value_name = "GFA")]
    input: PathBuf,
    /// Chop segments longer than this into multiple nodes
    #[arg(long, value_name = "N", default_value_t = params::MAX_NODE_LENGTH)]
    max_node_length: usize,
    /// Number of nodes buffered before insertion into the index
    #[arg(long, value_name = "N", default_value_t = params::INSERT_BATCH_SIZE)]
    batch_size: usize,
    /// Document array sampling interval
    #[arg(long, value_name = "N", default_value_t = params::SAMPLE_INTERVAL)]
    sample_interval: usize,
    /// Width of GBWT node values in bits
    #[arg(long, value_name = "BITS", default_value_t = params::WORD_BITS)]
    node_width: usize,
    /// Regex for parsing path names; it must match the entire name
    #[arg(long, value_name = "REGEX", default_value = params::DEFAULT_REGEX)]
    path_name_regex: String,
    /// Path name fields for the regex submatches (S, C, H, F; other characters are ignored)
    #[arg(long, value_name = "FIELDS", default_value = params::DEFAULT_FIELDS)]
    path_name_fields: String,
    /// Show progress bars
    #[arg(short, long)]
    progress: bool,
}

impl BuildArgs {
    fn parameters(&self) -> GfaParsingParameters {
        GfaParsingParameters {
            node_width: self.node_width,
            batch_size: self.batch_size,
            sample_interval: self.sample_interval,
            max_node_length: self.max_node_length,
            show_progress: self.progress,
            path_name_regex: self.path_name_regex.clone(),
            path_name_fields: self.path_name_fields.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct ComponentsArgs {
    #[command(flatten)]
    build: BuildArgs,
}

#[derive(Args, Debug)]
struct OrderArgs {
    #[command(flatten)]
    build: BuildArgs,
    /// Node ids of the subgraph
    #[arg(long, value_name = "ID", value_delimiter = ',', required = true)]
    nodes: Vec<usize>,
}

#[derive(Args, Debug)]
struct PathsArgs {
    #[command(flatten)]
    build: BuildArgs,
}

fn initialise_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])
    .is_err()
    {
        eprintln!("Logger was already initialised");
    }
}

fn build_graph(args: &BuildArgs) -> Result<GbwtGraph, GraphError> {
    let (index, source) = gfa_to_gbwt(&args.input, &args.parameters())?;
    let graph = GbwtGraph::new(Arc::new(index), Arc::new(source));
    info!(
        "Graph has {} nodes ({}..={})",
        graph.get_node_count(),
        graph.min_node_id().unwrap_or(0),
        graph.max_node_id().unwrap_or(0)
    );
    Ok(graph)
}

fn format_handles(handles: &[Handle]) -> String {
    handles
        .iter()
        .map(|h| format!("{:?}", h))
        .collect::<Vec<_>>()
        .join(",")
}

fn run(command: Command) -> Result<(), GraphError> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match command {
        Command::Components(args) => {
            let graph = build_graph(&args.build)?;
            let components = algorithms::weakly_connected_components(&graph);
            info!("Found {} weakly connected components", components.len());
            writeln!(out, "component\tnodes\tmin\tmax\tacyclic\theads")?;
            for (i, component) in components.iter().enumerate() {
                let heads = algorithms::is_nice_and_acyclic(&graph, component);
                let head_list = heads
                    .as_slice()
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    i,
                    component.len(),
                    component.first().copied().unwrap_or(0),
                    component.last().copied().unwrap_or(0),
                    if heads.is_valid() { "yes" } else { "no" },
                    if head_list.is_empty() { "-" } else { head_list.as_str() }
                )?;
            }
        }
        Command::Order(args) => {
            let graph = build_graph(&args.build)?;
            let subgraph: HashSet<usize> = args.nodes.iter().copied().collect();
            let order = algorithms::topological_order(&graph, &subgraph);
            if order.is_valid() {
                writeln!(out, "{}", format_handles(order.as_slice()))?;
            } else {
                info!("The subgraph induced by {} nodes contains a cycle", subgraph.len());
                writeln!(out, "-")?;
            }
        }
        Command::Paths(args) => {
            let graph = build_graph(&args.build)?;
            let index = graph.index();
            let metadata = index.metadata();
            info!(
                "{} paths from {} samples, {} haplotypes and {} contigs",
                metadata.paths(),
                metadata.samples(),
                metadata.haplotypes(),
                metadata.contigs()
            );
            writeln!(out, "path\tsample\thaplotype\tcontig\tfragment\tlength")?;
            for id in 0..metadata.paths() {
                if let Some(name) = metadata.path(id) {
                    writeln!(
                        out,
                        "{}\t{}\t{}\t{}\t{}\t{}",
                        id,
                        metadata.sample_name(name.sample).unwrap_or("-"),
                        name.haplotype,
                        metadata.contig_name(name.contig).unwrap_or("-"),
                        name.fragment,
                        index.sequence(2 * id).count()
                    )?;
                }
            }
        }
    }

    out.flush()?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    initialise_logging(cli.verbose);

    if let Err(err) = run(cli.command) {
        error!("{}", err);
        std::process::exit(1);
    }
}
