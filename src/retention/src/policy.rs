//! The retention policy and the expiration check built on it.

use std::fmt;

use crate::resource::ResourceRecord;
use crate::rule::RetentionRule;
use crate::validator::{RuleSetError, validate_rules};

/// The capability of deciding which resources of a snapshot are expired.
pub trait ExpirationPolicy<Id> {
    /// Return the identifiers of the resources that fall outside the
    /// retained set. The order of the returned identifiers is unspecified.
    fn find_expired(&self, resources: &[ResourceRecord<Id>]) -> Vec<Id>;
}

/// A retention policy defined by a set of conformed retention rules that
/// neither contradict nor duplicate each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    // Ordered ascending by age threshold.
    rules: Vec<RetentionRule>,
}

impl RetentionPolicy {
    /// Build a policy from a collection of rules.
    ///
    /// The rules are validated here, once; evaluation can no longer fail.
    pub fn new(rules: Vec<RetentionRule>) -> Result<Self, RuleSetError> {
        validate_rules(&rules)?;

        let mut rules = rules;
        rules.sort_by_key(RetentionRule::older_than);

        Ok(Self { rules })
    }

    /// The rules that define the policy, ordered ascending by threshold.
    pub fn rules(&self) -> &[RetentionRule] {
        &self.rules
    }
}

impl<Id: Clone> ExpirationPolicy<Id> for RetentionPolicy {
    fn find_expired(&self, resources: &[ResourceRecord<Id>]) -> Vec<Id> {
        let mut ordered: Vec<&ResourceRecord<Id>> = resources.iter().collect();
        // Stable sort: resources of equal age keep their snapshot order,
        // so evaluation is deterministic for a given snapshot.
        ordered.sort_by_key(|r| r.age);

        // The retention window: the index range of resources still eligible
        // for retention. Each tier narrows it.
        let mut retain_from = 0;
        let mut retain_len = ordered.len();

        for rule in &self.rules {
            if retain_len == 0 {
                break;
            }

            let window = &ordered[retain_from..retain_from + retain_len];

            // Resources at most as old as the threshold are not covered by
            // this rule; they pass through without consuming its allowance.
            let out_of_scope = window
                .iter()
                .take_while(|r| r.age <= rule.older_than())
                .count();

            let retain = rule.allowed_amount().min(retain_len - out_of_scope);

            retain_from += out_of_scope;
            retain_len = retain;
        }

        let retained = retain_from + retain_len;

        ordered[retained..].iter().map(|r| r.id.clone()).collect()
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules: Vec<String> = self.rules.iter().map(ToString::to_string).collect();
        write!(f, "{}", rules.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::parse_rules;
    use std::time::Duration;

    fn days(value: f64) -> Duration {
        Duration::from_secs_f64(value * 86_400.0)
    }

    /// Each whitespace separated entry is an age in days; the entry text
    /// doubles as the resource id.
    fn records(ages: &str) -> Vec<ResourceRecord<String>> {
        ages.split_whitespace()
            .map(|age| ResourceRecord::new(age.to_string(), days(age.parse().unwrap())))
            .collect()
    }

    fn policy(rules: &str) -> RetentionPolicy {
        RetentionPolicy::new(parse_rules(rules).unwrap()).unwrap()
    }

    fn assert_expired(rules: &str, ages: &str, expected: &str) {
        let mut actual = policy(rules).find_expired(&records(ages));
        actual.sort();

        let mut expected: Vec<String> =
            expected.split_whitespace().map(str::to_string).collect();
        expected.sort();

        assert_eq!(actual, expected);
    }

    #[test]
    fn a_rule_ignores_resources_younger_than_its_threshold() {
        assert_expired("5:1", "4.9 5.1", "");
    }

    #[test]
    fn an_older_tier_sees_only_what_younger_tiers_retained() {
        assert_expired("5:4 10:2", "6 7 8 9 11 12", "11 12");
    }

    #[test]
    fn an_empty_snapshot_has_nothing_to_expire() {
        assert_expired("5:4 10:2", "", "");
    }

    #[test]
    fn tiers_apply_cumulatively() {
        assert_expired("2:5 5:3 7:3 10:1 20:0", "1.9 2.5 3.3 7.1 22.4", "22.4");
    }

    #[test]
    fn age_equal_to_the_threshold_is_not_older_than_it() {
        assert_expired("10:0", "10", "");
    }

    #[test]
    fn retains_the_newest_resources_of_every_tier() {
        assert_expired(
            "1:5 3:3 5:2 10:1 14:0",
            "0.2 0.9 1.1 2 3 4 5 6",
            "6",
        );
    }

    #[test]
    fn a_single_tier_keeps_its_allowance_of_older_resources() {
        assert_expired("1:1", "0.2 0.9 1.1 2 3", "2 3");
    }

    #[test]
    fn evaluation_is_idempotent() {
        let policy = policy("1:5 3:3 5:2 10:1 14:0");
        let snapshot = records("0.2 0.9 1.1 2 3 4 5 6");

        assert_eq!(policy.find_expired(&snapshot), policy.find_expired(&snapshot));
    }

    #[test]
    fn equal_ages_break_ties_by_snapshot_order() {
        let snapshot = vec![
            ResourceRecord::new("a".to_string(), days(2.0)),
            ResourceRecord::new("b".to_string(), days(2.0)),
            ResourceRecord::new("c".to_string(), days(2.0)),
        ];

        let expired = policy("1:1").find_expired(&snapshot);

        assert_eq!(expired, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn construction_rejects_contradictory_rules() {
        let result = RetentionPolicy::new(parse_rules("1:1 5:2").unwrap());

        assert!(matches!(result, Err(RuleSetError::GrowingAllowance { .. })));
    }

    #[test]
    fn construction_rejects_duplicate_rules() {
        let result = RetentionPolicy::new(parse_rules("5:10 5:4").unwrap());

        assert!(matches!(result, Err(RuleSetError::DuplicatePeriod(_))));
    }

    #[test]
    fn construction_rejects_an_empty_rule_set() {
        assert_eq!(RetentionPolicy::new(vec![]), Err(RuleSetError::Empty));
    }

    #[test]
    fn displays_its_rules_in_threshold_order() {
        assert_eq!(policy("10:1 1:5 3:3").to_string(), "1:5 3:3 10:1");
    }
}
