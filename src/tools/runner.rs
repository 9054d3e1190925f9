use std::error::Error;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use log::{info, warn};
use rayon::{prelude::*, ThreadPoolBuilder};
use structopt::StructOpt;
use wait_timeout::ChildExt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "runner",
    about = "Runs the solver on a given set of graphs, with a given amount of parallelism and a time limit per graph."
)]
struct Opt {
    /// Solver program.
    #[structopt(
        default_value = "target/release/max-clique",
        parse(from_os_str),
        long = "solver"
    )]
    solver: PathBuf,
    /// Time limit per graph, in seconds. It is passed on to the solver, which then reports its best
    /// clique so far. Solvers that do not stop within a grace period afterwards are killed.
    #[structopt(default_value = "300", long = "timeout")]
    timeout: u64,
    /// Seconds the solver gets on top of the timeout before it is killed.
    #[structopt(default_value = "10", long = "grace")]
    grace: u64,
    /// Amount of parallel workers.
    #[structopt(default_value = "10", long = "num-workers")]
    num_workers: usize,
    /// Output directory. A result file for each input file will be created in this directory.
    #[structopt(parse(from_os_str))]
    output_dir: PathBuf,
    /// Input files, using the DIMACS edge format.
    #[structopt(parse(from_os_str))]
    input: Vec<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opt = Opt::from_args();

    info!("Starting runner on {} input files.", opt.input.len());

    ThreadPoolBuilder::new()
        .num_threads(opt.num_workers)
        .build_global()?;

    let completed = opt
        .input
        .par_iter()
        .map(|in_path| match do_file(&opt, in_path) {
            Ok(done) => done,
            Err(e) => {
                warn!("Running {} failed: {}", in_path.display(), e);
                false
            }
        })
        .filter(|&x| x)
        .count();

    info!("Done. {} of {} completed.", completed, opt.input.len());

    Ok(())
}

/// Runs the solver on one input. Returns whether it exited on its own before being killed.
fn do_file(opt: &Opt, in_path: &Path) -> io::Result<bool> {
    let filename = in_path
        .file_name()
        .and_then(|f| f.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "input has no UTF-8 file name"))?;

    info!("Starting worker for {}...", filename);

    let mut child = Command::new(&opt.solver)
        .arg(in_path)
        .arg("--time")
        .arg(opt.timeout.to_string())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let result = match child.wait_timeout(Duration::from_secs(opt.timeout + opt.grace))? {
        Some(status) => {
            info!("Completed {} with status {}", filename, status);
            true
        }
        None => {
            info!("{} did not stop in time, killing it!", filename);
            child.kill()?;
            child.wait()?;
            false
        }
    };

    let mut output_path = opt.output_dir.clone();
    output_path.push(format!("{}.out", filename));
    let mut output_file = File::create(output_path)?;

    append_section(&mut output_file, "== stdout ==\n", child.stdout.take())?;
    append_section(&mut output_file, "\n== stderr ==\n", child.stderr.take())?;
    output_file.flush()?;

    Ok(result)
}

/// Writes `header` followed by everything left in `pipe`, if the child has one.
fn append_section<W: Write, R: Read>(
    out: &mut W,
    header: &str,
    pipe: Option<R>,
) -> io::Result<()> {
    out.write_all(header.as_bytes())?;
    if let Some(mut pipe) = pipe {
        io::copy(&mut pipe, out)?;
    }
    Ok(())
}
