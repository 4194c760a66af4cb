/**
 * Read a learner's answer history: which questions they most recently got wrong, and
 * how they have done in each domain.
 */
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::question::Question;
use super::weights::DomainStat;


/// Represents the result of answering a question on a particular occasion.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AnswerRecord {
    /// The practice attempt that the answer was given in.
    pub attempt: String,
    pub time_asked: chrono::DateTime<chrono::Utc>,
    pub correct: bool,
}


/// Answer records keyed by question ID.
pub type StoredResults = BTreeMap<String, Vec<AnswerRecord>>;


/// Return the IDs of the questions whose most recent answer was incorrect. When two
/// answers share a timestamp, the one recorded later wins.
pub fn previously_wrong(results: &StoredResults) -> HashSet<String> {
    let mut wrong = HashSet::new();
    for (id, records) in results.iter() {
        let mut latest: Option<&AnswerRecord> = None;
        for record in records.iter() {
            match latest {
                Some(l) if record.time_asked < l.time_asked => {}
                _ => {
                    latest = Some(record);
                }
            }
        }

        if let Some(record) = latest {
            if !record.correct {
                wrong.insert(id.clone());
            }
        }
    }
    wrong
}


/// Like `previously_wrong`, but leave out questions that are no longer in `questions`.
pub fn previously_wrong_in<Q: Question>(
    results: &StoredResults,
    questions: &[Q],
) -> HashSet<String> {
    let ids: HashSet<&str> = questions.iter().map(|q| q.id()).collect();
    let mut wrong = previously_wrong(results);
    wrong.retain(|id| ids.contains(id.as_str()));
    wrong
}


/// Aggregate the answer history into per-domain statistics. Only questions that are in
/// `questions` are counted, since the history may mention questions that have since
/// been removed from the exam.
pub fn domain_stats<Q: Question>(
    results: &StoredResults,
    questions: &[Q],
) -> HashMap<String, DomainStat> {
    let mut domains_by_id = HashMap::new();
    for question in questions.iter() {
        domains_by_id.insert(question.id(), question.domain_or_fallback());
    }

    let mut stats: HashMap<String, DomainStat> = HashMap::new();
    let mut attempts: HashMap<&str, HashSet<&str>> = HashMap::new();
    for (id, records) in results.iter() {
        let domain = match domains_by_id.get(id.as_str()) {
            Some(domain) => *domain,
            None => {
                warn!(question = %id, "ignoring results for question not in exam");
                continue;
            }
        };

        let stat = stats.entry(String::from(domain)).or_default();
        let seen = attempts.entry(domain).or_default();
        for record in records.iter() {
            stat.total += 1;
            if record.correct {
                stat.correct += 1;
            }
            seen.insert(record.attempt.as_str());
        }
    }

    for (domain, seen) in attempts.iter() {
        if let Some(stat) = stats.get_mut(*domain) {
            stat.attempt_count = seen.len() as u32;
        }
    }
    stats
}


/// Return every domain that should receive a weight: the ones the exam declares plus
/// the ones its questions actually use, in sorted order.
pub fn all_domains<Q: Question>(declared: &[String], questions: &[Q]) -> Vec<String> {
    let mut domains = BTreeSet::new();
    for domain in declared.iter() {
        domains.insert(domain.clone());
    }
    for question in questions.iter() {
        domains.insert(String::from(question.domain_or_fallback()));
    }
    domains.into_iter().collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::question::{BankQuestion, FALLBACK_DOMAIN};

    #[test]
    fn latest_answer_decides() {
        let mut results = StoredResults::new();
        // Wrong, then right: no longer wrong.
        results.insert(s("q1"), vec![record("a1", 1, false), record("a2", 2, true)]);
        // Right, then wrong.
        results.insert(s("q2"), vec![record("a1", 1, true), record("a2", 2, false)]);
        // Out of order in the file; the later timestamp still wins.
        results.insert(s("q3"), vec![record("a2", 5, false), record("a1", 3, true)]);
        results.insert(s("q4"), vec![]);

        let wrong = previously_wrong(&results);

        let mut wrong: Vec<String> = wrong.into_iter().collect();
        wrong.sort();
        assert_eq!(wrong, vec![s("q2"), s("q3")]);
    }

    #[test]
    fn ties_go_to_the_later_record() {
        let mut results = StoredResults::new();
        results.insert(s("q1"), vec![record("a1", 4, true), record("a1", 4, false)]);
        assert!(previously_wrong(&results).contains("q1"));
    }

    #[test]
    fn removed_questions_are_not_wrong() {
        let questions = vec![BankQuestion::new("q1", Some("EC2")), BankQuestion::new("q2", None)];
        let mut results = StoredResults::new();
        results.insert(s("q1"), vec![record("a1", 1, false)]);
        results.insert(s("q2"), vec![record("a1", 1, true)]);
        results.insert(s("retired"), vec![record("a1", 1, false)]);

        assert_eq!(previously_wrong(&results).len(), 2);

        let wrong = previously_wrong_in(&results, &questions);
        assert_eq!(wrong.len(), 1);
        assert!(wrong.contains("q1"));
    }

    #[test]
    fn stats_are_grouped_by_domain() {
        let questions = vec![
            BankQuestion::new("q1", Some("EC2")),
            BankQuestion::new("q2", Some("EC2")),
            BankQuestion::new("q3", Some("S3")),
            BankQuestion::new("q4", None),
        ];
        let mut results = StoredResults::new();
        results.insert(s("q1"), vec![record("a1", 1, false), record("a2", 2, true)]);
        results.insert(s("q2"), vec![record("a2", 2, false), record("a3", 3, false)]);
        results.insert(s("q3"), vec![record("a3", 3, true)]);
        results.insert(s("q4"), vec![record("a1", 1, true)]);
        results.insert(s("gone"), vec![record("a1", 1, false)]);

        let stats = domain_stats(&results, &questions);

        assert_eq!(stats.len(), 3);
        assert_eq!(stats["EC2"], DomainStat { total: 4, correct: 1, attempt_count: 3 });
        assert_eq!(stats["S3"], DomainStat { total: 1, correct: 1, attempt_count: 1 });
        assert_eq!(stats[FALLBACK_DOMAIN], DomainStat { total: 1, correct: 1, attempt_count: 1 });
    }

    #[test]
    fn all_domains_merges_declared_and_used() {
        let questions = vec![
            BankQuestion::new("q1", Some("S3")),
            BankQuestion::new("q2", None),
        ];
        let domains = all_domains(&[s("VPC"), s("S3")], &questions);
        assert_eq!(domains, vec![s(FALLBACK_DOMAIN), s("S3"), s("VPC")]);
    }

    fn record(attempt: &str, day: u32, correct: bool) -> AnswerRecord {
        AnswerRecord {
            attempt: s(attempt),
            time_asked: chrono::Utc.with_ymd_and_hms(2020, 3, day, 12, 0, 0).unwrap(),
            correct,
        }
    }

    fn s(mystr: &str) -> String {
        String::from(mystr)
    }
}
