//! Adaptive practice-set selection.
//!
//! Given the questions of an exam, a learner's answer history and a target size, build
//! a practice set that leans towards the learner's weakest domains and the questions
//! they most recently got wrong.
//!
//! ```text
//! let stats = history::domain_stats(&results, &exam.questions);
//! let domains = history::all_domains(&exam.domains, &exam.questions);
//! let weights = weights::calculate_domain_weights(&stats, &domains);
//! let wrong = history::previously_wrong(&results);
//! let request = SelectionRequest {
//!     questions: &exam.questions,
//!     domain_weights: &weights,
//!     wrong_question_ids: &wrong,
//!     count: 20,
//! };
//! let chosen = sampler::choose_questions(&request, &mut rng);
//! ```
//!
//! Selection is pure: nothing is read from or written to disk, and the random number
//! generator is supplied by the caller, so a seeded generator gives a reproducible set.
pub mod common;
pub mod history;
pub mod persistence;
pub mod question;
pub mod sampler;
pub mod weights;

pub use common::{PracticeError, Result, SamplerOptions};
pub use question::{BankQuestion, Question, WeightedQuestion, FALLBACK_DOMAIN};
pub use sampler::{choose_questions, choose_questions_with, SelectionRequest};
pub use weights::{calculate_domain_weights, DomainStat, DomainWeights};
