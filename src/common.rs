/**
 * Definitions of data structures used by several modules, such as `PracticeError` and
 * the various structs that hold command-line arguments.
 */
use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::result;

use structopt::StructOpt;

use super::sampler::{PREVIOUSLY_WRONG_SHARE, RETRY_BUDGET_FACTOR};


pub type Result<T> = result::Result<T, PracticeError>;


#[derive(Debug)]
pub enum PracticeError {
    /// For when the data directory cannot be located or created.
    CannotMakeAppDir,
    /// For when the user requests an exam that does not exist.
    ExamNotFound(String),
    /// For JSON errors.
    Json(serde_json::Error),
    CannotWriteToFile(PathBuf),
    Io(io::Error),
    EmptyExam,
}


impl fmt::Display for PracticeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PracticeError::CannotMakeAppDir => {
                write!(f, "unable to create application directory")
            },
            PracticeError::ExamNotFound(ref name) => {
                write!(f, "could not find exam named '{}'", name)
            },
            PracticeError::Json(ref err) => {
                write!(f, "could not parse JSON ({})", err)
            },
            PracticeError::CannotWriteToFile(ref path) => {
                write!(f, "cannot write to file '{}'", path.to_string_lossy())
            },
            PracticeError::Io(ref err) => {
                write!(f, "IO error ({})", err)
            },
            PracticeError::EmptyExam => {
                write!(f, "no questions found")
            },
        }
    }
}


impl error::Error for PracticeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            PracticeError::Json(ref err) => Some(err),
            PracticeError::Io(ref err) => Some(err),
            _ => None,
        }
    }
}


/// Return `true` if `e` was caused by the other end of stdout going away, e.g. when
/// output is piped into `head`.
pub fn is_broken_pipe(e: &PracticeError) -> bool {
    if let PracticeError::Io(e) = e {
        if let io::ErrorKind::BrokenPipe = e.kind() {
            return true;
        }
    }
    false
}


/// Holds the command-line configuration for the application.
#[derive(StructOpt)]
#[structopt(name = "weakest-link", about = "Build practice sets that target your weakest domains.")]
pub struct Options {
    /// Look for exams and results in a particular directory.
    #[structopt(short = "d", long = "directory", env = "WEAKEST_LINK_DIR", parse(from_os_str))]
    pub directory: Option<PathBuf>,
    /// Do not emit colorized output.
    #[structopt(long = "no-color")]
    pub no_color: bool,
    #[structopt(subcommand)]
    pub cmd: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// Choose a practice set from an exam.
    #[structopt(name = "practice")]
    Practice(PracticeOptions),
    /// Report per-domain statistics and selection weights.
    #[structopt(name = "stats")]
    Stats(StatsOptions),
}

#[derive(StructOpt)]
pub struct PracticeOptions {
    /// Name of the exam to practice.
    #[structopt(default_value = "main")]
    pub name: String,
    /// Number of questions in the practice set.
    #[structopt(short = "n", default_value = "20")]
    pub num_to_ask: usize,
    /// Seed the random number generator to get a reproducible practice set.
    #[structopt(long = "seed")]
    pub seed: Option<u64>,
    /// Save the chosen practice set as an attempt snapshot.
    #[structopt(long = "save")]
    pub save: bool,
    #[structopt(flatten)]
    pub sampler_opts: SamplerOptions,
}

/// Tuning knobs for the sampler. The defaults are the values the selection algorithm
/// is designed around.
#[derive(StructOpt, Debug, Clone, Copy, PartialEq)]
pub struct SamplerOptions {
    /// Largest share of the practice set reserved for previously-missed questions.
    #[structopt(long = "max-wrong-share", default_value = "0.5")]
    pub max_wrong_share: f64,
    /// Number of weighted draws allowed per open slot before falling back to filling
    /// the set in order.
    #[structopt(long = "retry-factor", default_value = "10")]
    pub retry_factor: usize,
}

#[derive(StructOpt)]
pub struct StatsOptions {
    /// Name of the exam.
    #[structopt(default_value = "main")]
    pub name: String,
    /// Also list the IDs of previously-missed questions.
    #[structopt(long = "wrong")]
    pub wrong: bool,
}


impl Default for SamplerOptions {
    fn default() -> Self {
        SamplerOptions {
            max_wrong_share: PREVIOUSLY_WRONG_SHARE,
            retry_factor: RETRY_BUDGET_FACTOR,
        }
    }
}

