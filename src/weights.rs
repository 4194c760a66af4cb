/**
 * Turn a learner's per-domain history into selection weights.
 *
 * A domain's weight grows with the fraction of answers the learner got wrong, plus a
 * smaller bonus for domains practiced in fewer attempts than the most-practiced one.
 * Domains with no recorded answers get a flat neutral weight. The weights are then
 * normalized so that they sum to 1 and can be used directly as probabilities.
 */
use std::collections::btree_map;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};


// Weight of a domain that has no recorded answers.
pub const NEUTRAL_WEIGHT: f64 = 0.5;
// No domain with recorded answers ever drops below this weight.
pub const MIN_WEIGHT: f64 = 0.05;
// How much an unpracticed domain is boosted relative to the most-practiced one.
pub const ATTEMPT_BOOST_FACTOR: f64 = 0.25;


/// Aggregated answers for one domain.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DomainStat {
    /// Number of answers recorded.
    pub total: u32,
    /// Number of those answers that were correct.
    pub correct: u32,
    /// Number of distinct practice attempts that included the domain.
    pub attempt_count: u32,
}


impl DomainStat {
    /// Fraction of correct answers, or `None` if nothing has been answered.
    pub fn accuracy(&self) -> Option<f64> {
        if self.total > 0 {
            Some(self.correct as f64 / self.total as f64)
        } else {
            None
        }
    }
}


/// Selection weight per domain, iterated in domain-name order so that a seeded random
/// source always walks the domains the same way.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct DomainWeights(BTreeMap<String, f64>);


impl DomainWeights {
    pub fn new() -> Self {
        DomainWeights(BTreeMap::new())
    }

    /// The weight of `domain`. Domains without an entry weigh nothing.
    pub fn get(&self, domain: &str) -> f64 {
        self.0.get(domain).copied().unwrap_or(0.0)
    }

    pub fn insert(&mut self, domain: &str, weight: f64) {
        self.0.insert(String::from(domain), weight);
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, f64> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}


/// Compute normalized weights for every domain in `all_domains`. `domain_stats` may
/// be missing entries for some of them.
pub fn calculate_domain_weights(
    domain_stats: &HashMap<String, DomainStat>,
    all_domains: &[String],
) -> DomainWeights {
    let max_attempts = max_attempts(domain_stats);

    let mut raw = BTreeMap::new();
    for domain in all_domains.iter() {
        let weight = raw_weight(domain_stats.get(domain), max_attempts);
        raw.insert(domain.clone(), weight);
    }

    let mut sum: f64 = raw.values().sum();
    if sum == 0.0 {
        sum = 1.0;
    }

    for weight in raw.values_mut() {
        *weight /= sum;
    }
    DomainWeights(raw)
}


/// The weight of a single domain before normalization.
pub fn raw_weight(stat: Option<&DomainStat>, max_attempts: u32) -> f64 {
    let stat = match stat {
        Some(stat) if stat.total > 0 => stat,
        _ => {
            return NEUTRAL_WEIGHT;
        }
    };

    let accuracy = stat.correct as f64 / stat.total as f64;
    let inverse_accuracy = 1.0 - accuracy;
    let attempt_boost = 1.0 - stat.attempt_count as f64 / max_attempts.max(1) as f64;
    MIN_WEIGHT.max(inverse_accuracy + attempt_boost * ATTEMPT_BOOST_FACTOR)
}


/// The largest attempt count over all domains, never less than 1.
pub fn max_attempts(domain_stats: &HashMap<String, DomainStat>) -> u32 {
    domain_stats
        .values()
        .map(|stat| stat.attempt_count)
        .max()
        .unwrap_or(0)
        .max(1)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_domain_outweighs_unseen_domain() {
        let mut stats = HashMap::new();
        stats.insert(s("EC2"), stat(10, 2, 5));
        stats.insert(s("S3"), stat(0, 0, 0));

        let weights = calculate_domain_weights(&stats, &[s("EC2"), s("S3")]);

        assert_close(weights.get("EC2"), 0.8 / 1.3);
        assert_close(weights.get("S3"), 0.5 / 1.3);
        assert!((weights.get("EC2") - 0.615).abs() < 0.001);
        assert!((weights.get("S3") - 0.385).abs() < 0.001);
    }

    #[test]
    fn weights_sum_to_one() {
        let mut stats = HashMap::new();
        stats.insert(s("IAM"), stat(40, 39, 12));
        stats.insert(s("VPC"), stat(3, 0, 1));
        stats.insert(s("RDS"), stat(7, 7, 12));
        let domains = vec![s("IAM"), s("VPC"), s("RDS"), s("Lambda"), s("EKS")];

        let weights = calculate_domain_weights(&stats, &domains);

        assert_eq!(weights.len(), 5);
        let total: f64 = weights.iter().map(|(_, w)| *w).sum();
        assert_close(total, 1.0);
        assert!(weights.iter().all(|(_, w)| *w >= 0.0));
    }

    #[test]
    fn unseen_domains_are_neutral() {
        assert_eq!(raw_weight(None, 7), NEUTRAL_WEIGHT);
        assert_eq!(raw_weight(Some(&stat(0, 0, 3)), 7), NEUTRAL_WEIGHT);
    }

    #[test]
    fn perfect_domain_is_floored() {
        // All correct and practiced as often as any other domain.
        assert_eq!(raw_weight(Some(&stat(20, 20, 4)), 4), MIN_WEIGHT);
        // More correct answers than answers is nonsense, but must not go negative.
        assert_eq!(raw_weight(Some(&stat(2, 5, 4)), 4), MIN_WEIGHT);
    }

    #[test]
    fn less_practiced_domain_is_boosted() {
        let practiced = raw_weight(Some(&stat(10, 5, 8)), 8);
        let neglected = raw_weight(Some(&stat(10, 5, 2)), 8);
        assert_close(practiced, 0.5);
        assert_close(neglected, 0.5 + 0.75 * ATTEMPT_BOOST_FACTOR);
    }

    #[test]
    fn max_attempts_floors_at_one() {
        assert_eq!(max_attempts(&HashMap::new()), 1);

        let mut stats = HashMap::new();
        stats.insert(s("S3"), stat(4, 1, 0));
        assert_eq!(max_attempts(&stats), 1);
        // With no attempts anywhere, the boost is the full factor.
        assert_close(raw_weight(stats.get("S3"), 1), 0.75 + ATTEMPT_BOOST_FACTOR);
    }

    #[test]
    fn no_domains_means_no_weights() {
        let mut stats = HashMap::new();
        stats.insert(s("S3"), stat(4, 1, 2));
        let weights = calculate_domain_weights(&stats, &[]);
        assert!(weights.is_empty());
    }

    #[test]
    fn duplicate_domains_collapse() {
        let weights = calculate_domain_weights(&HashMap::new(), &[s("S3"), s("S3"), s("EC2")]);
        assert_eq!(weights.len(), 2);
        assert_close(weights.get("S3"), 0.5);
        assert_close(weights.get("EC2"), 0.5);
    }

    #[test]
    fn unknown_domain_weighs_nothing() {
        let weights = calculate_domain_weights(&HashMap::new(), &[s("S3")]);
        assert_eq!(weights.get("Glacier"), 0.0);
    }

    fn stat(total: u32, correct: u32, attempt_count: u32) -> DomainStat {
        DomainStat { total, correct, attempt_count }
    }

    fn assert_close(got: f64, expected: f64) {
        assert!((got - expected).abs() < 1e-9, "expected {}, got {}", expected, got);
    }

    fn s(mystr: &str) -> String {
        String::from(mystr)
    }
}
