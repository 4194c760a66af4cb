/**
 * Build practice sets from the command line.
 */
#[macro_use]
mod iohelper;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use colored::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use structopt::StructOpt;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use weakest_link::common::{self, Command, Options, PracticeError, PracticeOptions, StatsOptions};
use weakest_link::history;
use weakest_link::persistence::{self, AttemptSnapshot, Exam};
use weakest_link::question::{BankQuestion, Question, WeightedQuestion};
use weakest_link::sampler::{self, SelectionRequest};
use weakest_link::weights::{self, DomainStat, DomainWeights};


fn main() {
    init_tracing();
    let options = Options::from_args();

    if options.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(options) {
        if !common::is_broken_pipe(&e) {
            eprintln!("{}: {}", "Error".red(), e);
            ::std::process::exit(2);
        }
    }
}


/// Log to standard error so that standard output only carries the practice set. The
/// level comes from `RUST_LOG` and defaults to warnings only.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}


fn run(options: Options) -> Result<(), PracticeError> {
    let app_dir = persistence::require_app_dir_path(options.directory.as_deref())?;
    match options.cmd {
        Command::Practice(options) => {
            main_practice(&app_dir, options)
        },
        Command::Stats(options) => {
            main_stats(&app_dir, options)
        },
    }
}


/// The main function for the `practice` subcommand.
pub fn main_practice(app_dir: &Path, options: PracticeOptions) -> Result<(), PracticeError> {
    let exam = persistence::load_exam(app_dir, &options.name)?;
    if exam.questions.is_empty() {
        return Err(PracticeError::EmptyExam);
    }
    let results = persistence::load_results(app_dir, &options.name)?;

    let weights = exam_weights(&exam, &history::domain_stats(&results, &exam.questions));
    let wrong = history::previously_wrong_in(&results, &exam.questions);
    debug!(domains = weights.len(), previously_wrong = wrong.len(), "computed weights");

    let request = SelectionRequest {
        questions: &exam.questions,
        domain_weights: &weights,
        wrong_question_ids: &wrong,
        count: options.num_to_ask,
    };
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let chosen = sampler::choose_questions_with(&request, &options.sampler_opts, &mut rng);

    output_practice_set(&options.name, exam.questions.len(), &chosen)?;

    if options.save && !chosen.is_empty() {
        let snapshot = AttemptSnapshot {
            exam: &options.name,
            created_at: chrono::Utc::now(),
            seed: options.seed,
            questions: &chosen,
        };
        let path = persistence::save_snapshot(app_dir, &snapshot)?;
        my_println!("\nSaved to {}", path.to_string_lossy())?;
    }
    Ok(())
}


fn output_practice_set(
    name: &str,
    pool_size: usize,
    chosen: &[WeightedQuestion<BankQuestion>],
) -> Result<(), PracticeError> {
    if chosen.is_empty() {
        my_println!("No questions selected.")?;
        return Ok(());
    }

    my_println!(
        "{} '{}' ({} of {} questions)\n",
        "Practice set for".white(),
        name,
        chosen.len(),
        pool_size,
    )?;

    for (i, wq) in chosen.iter().enumerate() {
        let question = wq.question;
        my_print!(
            "  ({}) {}  [{}]  weight {:.3}",
            i + 1,
            question.id().cyan(),
            question.domain_or_fallback(),
            wq.weight,
        )?;
        if wq.previously_wrong {
            my_print!("  {}", "previously wrong".red())?;
        }
        my_print!("\n")?;

        if let Some(text) = question.text() {
            let indent = " ".repeat(format!("  ({}) ", i + 1).len());
            iohelper::print_indented(text, &indent)?;
        }
    }
    Ok(())
}


/// The main function for the `stats` subcommand.
pub fn main_stats(app_dir: &Path, options: StatsOptions) -> Result<(), PracticeError> {
    let exam = persistence::load_exam(app_dir, &options.name)?;
    let results = persistence::load_results(app_dir, &options.name)?;

    let stats = history::domain_stats(&results, &exam.questions);
    let weights = exam_weights(&exam, &stats);

    if weights.is_empty() {
        my_println!("This exam has no domains.")?;
        return Ok(());
    }

    let mut rows: Vec<(&String, f64)> = weights.iter().map(|(d, w)| (d, *w)).collect();
    rows.sort_by(cmp_weight_desc);

    for (domain, weight) in rows.iter() {
        let stat = stats.get(*domain).copied().unwrap_or_default();
        let accuracy = match stat.accuracy() {
            Some(accuracy) => format!("{:>5.1}%", 100.0 * accuracy),
            None => format!("{:>6}", "n/a"),
        };
        let prefix = format!(
            "{}  of {:>3}  in {:>2} attempts  weight {:.3}   ",
            accuracy,
            stat.total,
            stat.attempt_count,
            weight,
        );
        my_println!("{}{}", prefix.cyan(), domain)?;
    }

    let wrong = history::previously_wrong_in(&results, &exam.questions);
    my_println!("\n{} previously wrong", wrong.len())?;
    if options.wrong {
        let mut wrong: Vec<String> = wrong.into_iter().collect();
        wrong.sort();
        for id in wrong.iter() {
            my_println!("  {}", id)?;
        }
    }
    Ok(())
}


fn exam_weights(exam: &Exam, stats: &HashMap<String, DomainStat>) -> DomainWeights {
    let domains = history::all_domains(&exam.domains, &exam.questions);
    weights::calculate_domain_weights(stats, &domains)
}


/// Comparison function that sorts domains so that the heaviest come first, breaking
/// ties by name.
fn cmp_weight_desc(a: &(&String, f64), b: &(&String, f64)) -> Ordering {
    b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(b.0))
}
