use max_clique::{
    algo::{self, Parameters, SearchStatus},
    graphviz, heuristic, parser,
    util::format_duration,
    BestCliqueTracker, Clique, Deadline, Graph, PetGraph,
};

use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use log::info;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "max-clique",
    about = "Finds a maximum clique of a graph, or the best one found within a time limit."
)]
struct Opt {
    /// Input file, using the DIMACS edge format (`e u v` lines).
    /// `stdin` if not specified.
    #[structopt(parse(from_os_str))]
    input: Option<PathBuf>,

    /// Time limit in seconds. 0 disables the limit.
    #[structopt(short = "t", long = "time", default_value = "300")]
    time: u64,

    /// Amount of worker threads. With more than one thread, ties between maximum cliques are no
    /// longer broken deterministically.
    #[structopt(short = "j", long = "threads", default_value = "1")]
    threads: usize,

    /// Do not seed the search with a greedily found clique.
    #[structopt(long = "no-heuristic")]
    no_heuristic: bool,

    /// Disable the pruning bounds. Only useful for testing.
    #[structopt(long = "no-bounds")]
    no_bounds: bool,

    /// Drop already explored vertices from the candidates of their later siblings. Finds a clique
    /// of the same size with fewer search nodes, but not necessarily the same clique.
    #[structopt(long = "exclude-explored")]
    exclude_explored: bool,

    /// Write the clique vertices, one per line, to the given file.
    #[structopt(short = "o", long = "output", parse(from_os_str))]
    output: Option<PathBuf>,

    /// Print the input graph with the clique highlighted to the given path, as a PNG file.
    /// Requires a working graphviz installation.
    #[structopt(long = "print-output", parse(from_os_str))]
    print_output: Option<PathBuf>,

    /// Graphviz command used by `--print-output`.
    #[structopt(long = "graphviz", default_value = "dot")]
    graphviz: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opt = Opt::from_args();

    info!("Starting solver...");

    let pg: PetGraph = match &opt.input {
        Some(path) => parser::parse_file(path),
        None => parser::parse(io::stdin().lock()),
    }?;
    let graph = Graph::new_from_petgraph(&pg)?;

    let limit = if opt.time == 0 {
        None
    } else {
        Some(Duration::from_secs(opt.time))
    };
    let deadline = Deadline::new(limit);

    let interrupt = deadline.clone();
    ctrlc::set_handler(move || {
        info!("Interrupted, stopping search...");
        interrupt.cancel();
    })?;

    let seed = if opt.no_heuristic {
        Clique::default()
    } else {
        heuristic::greedy_clique(&graph)?
    };
    let best = BestCliqueTracker::with_seed(seed);

    let params = Parameters {
        bounds: !opt.no_bounds,
        exclude_explored: opt.exclude_explored,
        threads: opt.threads.max(1),
    };

    let outcome = algo::find_max_clique(&graph, &params, &best, &deadline)?;
    let vertices = outcome.clique.sorted();

    if outcome.status.is_exact() {
        info!("Finished in {:.3} seconds!", outcome.elapsed.as_secs_f64());
    } else {
        info!(
            "Stopped ({:?}) after {:.3} seconds with a clique of size {}.",
            outcome.status,
            outcome.elapsed.as_secs_f64(),
            vertices.len()
        );
    }

    match outcome.status {
        SearchStatus::Exact => println!("Exact maximum clique found."),
        SearchStatus::TimedOut => println!(
            "Timed out after {}! Best clique found so far (not proven maximum):",
            format_duration(outcome.elapsed)
        ),
        SearchStatus::Cancelled => {
            println!("Interrupted! Best clique found so far (not proven maximum):")
        }
        SearchStatus::NodeLimit => {
            println!("Node limit reached! Best clique found so far (not proven maximum):")
        }
    }
    println!("size: {}", vertices.len());
    println!(
        "clique: {}",
        vertices
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    );
    println!("time: {}", format_duration(outcome.elapsed));

    if let Some(path) = &opt.output {
        let mut writer = BufWriter::new(File::create(path)?);
        for v in &vertices {
            writeln!(writer, "{}", v)?;
        }
        writer.flush()?;
    }

    if let Some(path) = &opt.print_output {
        graphviz::print_graph(&opt.graphviz, path, &pg, &vertices)?;
    }

    Ok(())
}
