use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "show-progress",
    about = "Analyzes max-clique log files of (potentially timed out/killed) runs and prints how large a clique each run reached."
)]
struct Opt {
    /// Input file or folder. If a file, the log file will be analyzed and its progress printed.
    /// If a folder, the same will happen for every file directly (non-recursively) inside the folder.
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// If specified, will compare the results of the given run to the first one. If the first is a
    /// file, this must be too, and the same for directories.
    #[structopt(long = "diff", parse(from_os_str))]
    diff: Option<PathBuf>,
}

#[derive(Debug, PartialEq)]
enum RunProgress {
    /// The search finished and proved its clique to be maximum.
    Finished {
        filename: String,
        time: f64,
        size: usize,
    },
    /// The run stopped early, either at its own deadline or because it was killed.
    Cancelled { filename: String, size: usize },
}

impl RunProgress {
    fn filename(&self) -> &str {
        match self {
            Self::Finished { filename, .. } => filename,
            Self::Cancelled { filename, .. } => filename,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let opt = Opt::from_args();

    let base_path = opt.input;
    if base_path.is_file() {
        let result = analyze_file(base_path)?;

        if let Some(diff_path) = opt.diff {
            let diff_result = analyze_file(diff_path)?;
            print_diff(&result, &diff_result);
        } else {
            print_result(&result, "");
        }

        return Ok(());
    }

    // It's a directory!
    let results = analyze_dir(&base_path)?;

    if let Some(diff_path) = opt.diff {
        let diff_results = analyze_dir(&diff_path)?;

        for (name, first) in &results {
            if let Some(second) = diff_results.get(name) {
                print_diff(first, second);
            } else {
                print_result(first, " in first, not present in second.");
            }
        }
        for (name, second) in &diff_results {
            if !results.contains_key(name) {
                print_result(second, " in second, not present in first.");
            }
        }
    } else {
        for result in results.values() {
            print_result(result, "");
        }
    }

    Ok(())
}

fn analyze_dir(dir: &Path) -> Result<BTreeMap<String, RunProgress>, Box<dyn Error>> {
    let mut results = BTreeMap::new();
    for entry in dir.read_dir()? {
        let file = entry?.path();
        if file.metadata()?.is_file() {
            let result = analyze_file(file)?;
            results.insert(result.filename().to_string(), result);
        }
    }
    Ok(results)
}

fn analyze_file<P: AsRef<Path>>(file: P) -> Result<RunProgress, Box<dyn Error>> {
    let file = file.as_ref();
    let filename = file
        .file_name()
        .and_then(|f| f.to_str())
        .ok_or("input paths need a valid UTF-8 file name")?
        .to_string();
    let reader = BufReader::new(File::open(file)?);
    analyze(filename, reader)
}

fn analyze<R: BufRead>(filename: String, reader: R) -> Result<RunProgress, Box<dyn Error>> {
    lazy_static! {
        static ref IMPROVED_RE: Regex =
            Regex::new(r"Improved best clique to size (\d+)").unwrap();
        static ref SIZE_RE: Regex = Regex::new(r"^size: (\d+)$").unwrap();
        static ref DONE_RE: Regex = Regex::new(r"Finished in ([\d\.]+) seconds!").unwrap();
    }

    let mut size = 0;
    let mut time = None;

    for line in reader.lines() {
        let line = line?;

        if let Some(captures) = IMPROVED_RE.captures(&line) {
            let new_size = captures[1].parse()?;
            if new_size <= size {
                log::warn!(
                    "{}: best clique went from size {} to {}!",
                    filename,
                    size,
                    new_size
                );
            }
            size = size.max(new_size);
            continue;
        }

        if let Some(captures) = SIZE_RE.captures(&line) {
            size = size.max(captures[1].parse()?);
            continue;
        }

        if let Some(captures) = DONE_RE.captures(&line) {
            time = Some(captures[1].parse()?);
        }
    }

    Ok(match time {
        Some(time) => RunProgress::Finished {
            filename,
            time,
            size,
        },
        None => RunProgress::Cancelled { filename, size },
    })
}

fn print_result(result: &RunProgress, suffix: &str) {
    match result {
        RunProgress::Cancelled { filename, size } => {
            println!("{} got to a clique of size {}{}", filename, size, suffix)
        }
        RunProgress::Finished {
            filename,
            time,
            size,
        } => println!(
            "{} finished in {} seconds with size {}{}",
            filename, time, size, suffix
        ),
    }
}

fn print_diff(first: &RunProgress, second: &RunProgress) {
    use RunProgress::*;

    match (first, second) {
        (
            Finished {
                filename: name1,
                time: time1,
                size: size1,
            },
            Finished {
                time: time2,
                size: size2,
                ..
            },
        ) => {
            if size1 != size2 {
                log::warn!(
                    "{} finished both times, but with different sizes {} and {}!",
                    name1,
                    size1,
                    size2
                );
            }
            println!(
                "{} finished went from {}s to {}s: {:+}s",
                name1,
                time1,
                time2,
                time2 - time1
            );
        }
        (
            Finished {
                filename: name1,
                time: time1,
                ..
            },
            Cancelled { size: size2, .. },
        ) => {
            println!(
                "{} first finished in {}s, but was now cancelled at size {}",
                name1, time1, size2
            );
        }
        (
            Cancelled {
                filename: name1,
                size: size1,
            },
            Finished { time: time2, .. },
        ) => {
            println!(
                "{} was first cancelled at size {}, but now finished in {}s",
                name1, size1, time2
            );
        }
        (
            Cancelled {
                filename: name1,
                size: size1,
            },
            Cancelled { size: size2, .. },
        ) => {
            println!(
                "{} cancelled both times, size from {} to {}: {:+}",
                name1,
                size1,
                size2,
                *size2 as i64 - *size1 as i64
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_run() {
        let log = "== stdout ==\n\
                   Exact maximum clique found.\n\
                   size: 4\n\
                   \n== stderr ==\n\
                   [INFO  max_clique::best] Improved best clique to size 3\n\
                   [INFO  max_clique::best] Improved best clique to size 4\n\
                   [INFO  max_clique] Finished in 1.25 seconds!\n";
        let result = analyze("a.out".to_string(), log.as_bytes()).unwrap();
        assert_eq!(
            result,
            RunProgress::Finished {
                filename: "a.out".to_string(),
                time: 1.25,
                size: 4,
            }
        );
    }

    #[test]
    fn killed_run() {
        let log = "== stdout ==\n\
                   \n== stderr ==\n\
                   [INFO  max_clique::best] Improved best clique to size 5\n\
                   [INFO  max_clique::best] Improved best clique to size 7\n";
        let result = analyze("b.out".to_string(), log.as_bytes()).unwrap();
        assert_eq!(
            result,
            RunProgress::Cancelled {
                filename: "b.out".to_string(),
                size: 7,
            }
        );
    }
}
