/**
 * Choose a practice set that leans on the learner's weakest domains.
 *
 * Selection runs in three phases:
 *
 * Phase 1: questions the learner most recently got wrong, in random order, up to a
 *          fixed share of the set (half, by default).
 * Phase 2: weighted draws. A domain is drawn by its weight, then a question is drawn
 *          uniformly from that domain. A draw that lands on a domain with no questions
 *          is simply retried. Every other draw counts against a budget of a fixed
 *          number of draws per open slot, so the loop ends even when the heavy
 *          domains run dry. If no domain with questions has any weight, this phase
 *          is skipped.
 * Phase 3: if draws ran out before the set was full, take any unselected questions in
 *          the order they appear in the exam. Previously-wrong questions added here
 *          are flagged but not counted against the phase 1 share, so a set drawn from
 *          an exam of mostly-missed questions can end up more than half flagged.
 *
 * The finished set is shuffled so that position says nothing about which phase chose
 * a question.
 */
use std::collections::{BTreeMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::common::SamplerOptions;
use super::question::{Question, WeightedQuestion};
use super::weights::DomainWeights;


// Largest fraction of the set reserved for previously-wrong questions.
pub const PREVIOUSLY_WRONG_SHARE: f64 = 0.5;
// Weighted draws allowed per open slot in phase 2. Draws on empty domains are free.
pub const RETRY_BUDGET_FACTOR: usize = 10;


/// Everything one selection needs. Nothing here is modified by the sampler.
#[derive(Debug)]
pub struct SelectionRequest<'a, Q> {
    pub questions: &'a [Q],
    pub domain_weights: &'a DomainWeights,
    pub wrong_question_ids: &'a HashSet<String>,
    pub count: usize,
}


/// Choose up to `request.count` distinct questions with the default sampler options.
pub fn choose_questions<'a, Q, R>(
    request: &SelectionRequest<'a, Q>,
    rng: &mut R,
) -> Vec<WeightedQuestion<'a, Q>>
where
    Q: Question,
    R: Rng + ?Sized,
{
    choose_questions_with(request, &SamplerOptions::default(), rng)
}


/// Choose up to `request.count` distinct questions. Fewer are returned only when the
/// exam has fewer distinct questions than requested.
pub fn choose_questions_with<'a, Q, R>(
    request: &SelectionRequest<'a, Q>,
    options: &SamplerOptions,
    rng: &mut R,
) -> Vec<WeightedQuestion<'a, Q>>
where
    Q: Question,
    R: Rng + ?Sized,
{
    if request.count == 0 {
        return Vec::new();
    }

    let mut chosen = Selection::new(request.domain_weights);

    let wrong_cap = wrong_question_cap(request.count, options.max_wrong_share);
    add_previously_wrong(&mut chosen, request, wrong_cap, rng);
    let after_wrong = chosen.len();

    let remaining = request.count - chosen.len();
    let draws = add_weighted(&mut chosen, request, remaining, options.retry_factor, rng);
    let after_weighted = chosen.len();

    let remaining = request.count - chosen.len();
    if remaining > 0 {
        add_in_order(&mut chosen, request, remaining);
    }

    debug!(
        requested = request.count,
        pool = request.questions.len(),
        previously_wrong = after_wrong,
        weighted = after_weighted - after_wrong,
        fallback = chosen.len() - after_weighted,
        draws,
        "chose practice set"
    );

    let mut chosen = chosen.questions;
    chosen.shuffle(rng);
    chosen
}


/// The most previously-wrong questions phase 1 may add to a set of `count`.
pub fn wrong_question_cap(count: usize, share: f64) -> usize {
    let cap = (count as f64 * share).ceil();
    if cap <= 0.0 {
        0
    } else {
        (cap as usize).min(count)
    }
}


/// Draw a domain with probability proportional to its weight. Returns `None` only when
/// there are no domains at all.
pub fn draw_domain<'w, R>(weights: &'w DomainWeights, rng: &mut R) -> Option<&'w str>
where
    R: Rng + ?Sized,
{
    let r: f64 = rng.gen();
    let mut cumulative = 0.0;
    let mut last = None;
    for (domain, weight) in weights.iter() {
        cumulative += *weight;
        if cumulative >= r {
            return Some(domain.as_str());
        }
        last = Some(domain.as_str());
    }
    // Rounding left the total a hair under `r`.
    last
}


/// The questions chosen so far, with the IDs already taken.
struct Selection<'a, Q> {
    weights: &'a DomainWeights,
    questions: Vec<WeightedQuestion<'a, Q>>,
    taken: HashSet<&'a str>,
}


impl<'a, Q: Question> Selection<'a, Q> {
    fn new(weights: &'a DomainWeights) -> Self {
        Selection { weights, questions: Vec::new(), taken: HashSet::new() }
    }

    fn len(&self) -> usize {
        self.questions.len()
    }

    fn contains(&self, question: &Q) -> bool {
        self.taken.contains(question.id())
    }

    /// Add `question` unless a question with the same ID is already in. Returns `true`
    /// if it was added.
    fn add(&mut self, question: &'a Q, previously_wrong: bool) -> bool {
        if !self.taken.insert(question.id()) {
            return false;
        }
        let weight = self.weights.get(question.domain_or_fallback());
        self.questions.push(WeightedQuestion { question, weight, previously_wrong });
        true
    }
}


fn add_previously_wrong<'a, Q, R>(
    chosen: &mut Selection<'a, Q>,
    request: &SelectionRequest<'a, Q>,
    cap: usize,
    rng: &mut R,
) where
    Q: Question,
    R: Rng + ?Sized,
{
    let mut wrong: Vec<&'a Q> = request
        .questions
        .iter()
        .filter(|q| request.wrong_question_ids.contains(q.id()))
        .collect();
    wrong.shuffle(rng);

    let mut added = 0;
    for question in wrong {
        if added >= cap {
            break;
        }
        if chosen.add(question, true) {
            added += 1;
        }
    }
}


/// Fill up to `remaining` slots by weighted draws. Returns the number of draws counted
/// against the budget.
fn add_weighted<'a, Q, R>(
    chosen: &mut Selection<'a, Q>,
    request: &SelectionRequest<'a, Q>,
    mut remaining: usize,
    retry_factor: usize,
    rng: &mut R,
) -> usize
where
    Q: Question,
    R: Rng + ?Sized,
{
    let mut by_domain: BTreeMap<&'a str, Vec<&'a Q>> = BTreeMap::new();
    for question in request.questions.iter() {
        by_domain.entry(question.domain_or_fallback()).or_default().push(question);
    }

    // Misses on empty domains are free, so without a reachable domain the loop would
    // never end.
    if !has_weighted_questions(request.domain_weights, &by_domain) {
        return 0;
    }

    let budget = remaining.saturating_mul(retry_factor);
    let mut draws = 0;
    while remaining > 0 && draws < budget {
        let domain = match draw_domain(request.domain_weights, rng) {
            Some(domain) => domain,
            None => {
                break;
            }
        };

        let pool = match by_domain.get(domain) {
            Some(pool) => pool,
            None => {
                continue;
            }
        };

        draws += 1;
        let question = pool[rng.gen_range(0..pool.len())];
        if chosen.contains(question) {
            continue;
        }

        chosen.add(question, false);
        remaining -= 1;
    }
    draws
}


/// Return `true` if some domain with a positive weight has questions to draw from.
fn has_weighted_questions<Q>(
    weights: &DomainWeights,
    by_domain: &BTreeMap<&str, Vec<&Q>>,
) -> bool {
    weights
        .iter()
        .any(|(domain, weight)| *weight > 0.0 && by_domain.contains_key(domain.as_str()))
}


/// Take unselected questions in exam order until `remaining` slots are filled or the
/// exam runs out.
fn add_in_order<'a, Q: Question>(
    chosen: &mut Selection<'a, Q>,
    request: &SelectionRequest<'a, Q>,
    mut remaining: usize,
) {
    for question in request.questions.iter() {
        if remaining == 0 {
            break;
        }
        let previously_wrong = request.wrong_question_ids.contains(question.id());
        if chosen.add(question, previously_wrong) {
            remaining -= 1;
        }
    }
}
