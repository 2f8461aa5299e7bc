//! Parsing command-line arguments.

use clap::builder::TypedValueParser;
use clap::{crate_version, value_parser, Arg, ArgMatches, Command};
use halo_engines::{ProcessGrid, Strategy};
use std::path::PathBuf;
use std::str::FromStr;

/// Where the initial field comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// `size x size` cells, each alive with probability 1/2.
    Random { size: usize, seed: u64 },
    File(PathBuf),
}

/// What to do with the final field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Visualize,
    Save,
    Quiet,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visualize" => Ok(Self::Visualize),
            "save" => Ok(Self::Save),
            "none" => Ok(Self::Quiet),
            _ => Err(format!("unknown mode {s:?}, expected visualize, save or none")),
        }
    }
}

/// A struct to store the parse results.
#[derive(Clone, Debug)]
pub struct Args {
    pub source: Source,
    pub generations: u64,
    pub mode: Mode,
    pub ranks: Option<usize>,
    pub procs: Option<ProcessGrid>,
    pub strategy: Strategy,
    pub threads: usize,
    pub output: PathBuf,
}

fn command() -> Command {
    Command::new("torus_life")
        .version(crate_version!())
        .about("Conway's Game of Life on a torus, serial or split over a grid of ranks")
        .arg(
            Arg::new("GRID")
                .help("Side length of a random square grid, or a file of 0/1 lines")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("GENERATIONS")
                .help("Number of generations")
                .default_value("100")
                .value_parser(value_parser!(u64))
                .index(2),
        )
        .arg(
            Arg::new("MODE")
                .help("What to do with the final grid")
                .default_value("save")
                .value_parser(|s: &str| s.parse::<Mode>())
                .index(3),
        )
        .arg(
            Arg::new("RANKS")
                .help("Number of ranks [default: available parallelism]")
                .short('n')
                .long("ranks")
                .value_parser(value_parser!(u64).range(1..).map(|n| n as usize)),
        )
        .arg(
            Arg::new("PROCS")
                .help("Explicit process grid, e.g. 2x3")
                .long("procs")
                .value_parser(|s: &str| s.parse::<ProcessGrid>().map_err(|e| e.to_string())),
        )
        .arg(
            Arg::new("SEED")
                .help("Seed of the random grid")
                .short('s')
                .long("seed")
                .default_value("42")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("STRATEGY")
                .help("Neighbour counting on a single rank")
                .long("strategy")
                .default_value("direct")
                .value_parser(|s: &str| s.parse::<Strategy>()),
        )
        .arg(
            Arg::new("THREADS")
                .help("Runtime worker threads, 0 for one per rank up to the core count")
                .short('t')
                .long("threads")
                .default_value("0")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("OUTPUT")
                .help("File written in save mode")
                .short('o')
                .long("output")
                .default_value("final_grid.txt")
                .value_parser(value_parser!(PathBuf)),
        )
}

impl Args {
    /// Parses the command-line arguments, exiting with usage on error.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&command().try_get_matches_from(args)?))
    }

    fn from_matches(m: &ArgMatches) -> Self {
        let grid = m.get_one::<String>("GRID").expect("required");
        let seed = *m.get_one::<u64>("SEED").expect("defaulted");
        let source = match grid.parse::<usize>() {
            Ok(size) => Source::Random { size, seed },
            Err(_) => Source::File(PathBuf::from(grid)),
        };
        Self {
            source,
            generations: *m.get_one::<u64>("GENERATIONS").expect("defaulted"),
            mode: *m.get_one::<Mode>("MODE").expect("defaulted"),
            ranks: m.get_one::<usize>("RANKS").copied(),
            procs: m.get_one::<ProcessGrid>("PROCS").copied(),
            strategy: *m.get_one::<Strategy>("STRATEGY").expect("defaulted"),
            threads: *m.get_one::<usize>("THREADS").expect("defaulted"),
            output: m.get_one::<PathBuf>("OUTPUT").expect("defaulted").clone(),
        }
    }

    /// Whether the process grid was picked by the user rather than derived from the core count.
    pub fn explicit_ranks(&self) -> bool {
        self.ranks.is_some() || self.procs.is_some()
    }

    /// Process grid for a `rows x cols` field: `--procs`, else the most square
    /// split of `--ranks`.
    ///
    /// Without either, the available parallelism is lowered until every tile
    /// keeps at least one row and one column.
    pub fn process_grid(&self, rows: usize, cols: usize) -> halo_engines::Result<ProcessGrid> {
        match (self.procs, self.ranks) {
            (Some(procs), Some(ranks)) if ranks != procs.len() => {
                Err(halo_engines::Error::InvalidProcessGrid(format!(
                    "{} holds {} ranks, but --ranks asked for {}",
                    procs,
                    procs.len(),
                    ranks
                )))
            }
            (Some(procs), _) => Ok(procs),
            (None, Some(ranks)) => ProcessGrid::for_ranks(ranks),
            (None, None) => {
                let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
                Ok(fit_ranks(cores, rows, cols))
            }
        }
    }
}

/// Largest process grid of at most `max_ranks` ranks that leaves no tile empty.
fn fit_ranks(max_ranks: usize, rows: usize, cols: usize) -> ProcessGrid {
    (1..=max_ranks)
        .rev()
        .filter_map(|n| ProcessGrid::for_ranks(n).ok())
        .find(|p| p.nx <= rows && p.ny <= cols)
        .unwrap_or(ProcessGrid { nx: 1, ny: 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_and_defaults() {
        let args = Args::try_parse_from(["torus_life", "64"]).unwrap();
        assert_eq!(args.source, Source::Random { size: 64, seed: 42 });
        assert_eq!(args.generations, 100);
        assert_eq!(args.mode, Mode::Save);
        assert_eq!(args.strategy, Strategy::Direct);
        assert_eq!(args.output, PathBuf::from("final_grid.txt"));
        assert_eq!(args.ranks, None);
        assert_eq!(args.threads, 0);
    }

    #[test]
    fn file_and_options() {
        let args = Args::try_parse_from([
            "torus_life",
            "glider.txt",
            "30",
            "visualize",
            "--procs",
            "2x3",
            "--strategy",
            "separable",
        ])
        .unwrap();
        assert_eq!(args.source, Source::File(PathBuf::from("glider.txt")));
        assert_eq!(args.generations, 30);
        assert_eq!(args.mode, Mode::Visualize);
        assert_eq!(args.strategy, Strategy::Separable);
        assert_eq!(args.process_grid(6, 6).unwrap(), ProcessGrid::new(2, 3).unwrap());
        assert!(args.explicit_ranks());
    }

    #[test]
    fn ranks_pick_a_process_grid() {
        let args = Args::try_parse_from(["torus_life", "64", "--ranks", "12"]).unwrap();
        assert_eq!(args.process_grid(64, 64).unwrap(), ProcessGrid::new(3, 4).unwrap());

        let args =
            Args::try_parse_from(["torus_life", "64", "-n", "4", "--procs", "1x3"]).unwrap();
        assert!(args.process_grid(64, 64).is_err());
    }

    #[test]
    fn implicit_ranks_fit_small_grids() {
        let args = Args::try_parse_from(["torus_life", "1"]).unwrap();
        assert!(!args.explicit_ranks());
        assert_eq!(args.process_grid(1, 1).unwrap(), ProcessGrid::new(1, 1).unwrap());

        // 8 -> 2x4 and 7 -> 1x7 leave empty columns on a 3x3 torus.
        assert_eq!(fit_ranks(8, 3, 3), ProcessGrid::new(2, 3).unwrap());
        assert_eq!(fit_ranks(5, 3, 3), ProcessGrid::new(2, 2).unwrap());
        assert_eq!(fit_ranks(16, 64, 64), ProcessGrid::new(4, 4).unwrap());
        assert_eq!(fit_ranks(0, 3, 3), ProcessGrid::new(1, 1).unwrap());
    }

    #[test]
    fn typed_mode_and_strategy() {
        let args = Args::try_parse_from(["torus_life", "8", "1", "none"]).unwrap();
        assert_eq!(args.mode, Mode::Quiet);
        assert!(Args::try_parse_from(["torus_life", "8", "--strategy", "fft"]).is_err());
        assert_eq!("save".parse::<Mode>(), Ok(Mode::Save));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Args::try_parse_from(["torus_life"]).is_err());
        assert!(Args::try_parse_from(["torus_life", "8", "5", "print"]).is_err());
        assert!(Args::try_parse_from(["torus_life", "8", "--ranks", "0"]).is_err());
        assert_eq!(
            Args::try_parse_from(["torus_life", "8", "--ranks", "3"]).unwrap().ranks,
            Some(3)
        );
        assert!(Args::try_parse_from(["torus_life", "8", "--procs", "3"]).is_err());
    }
}
