//! Consistency validation of retention rule sets.

use std::time::Duration;

use thiserror::Error;

use crate::rule::RetentionRule;

/// Check a rule set for duplicate thresholds and contradictory allowances.
///
/// Ordered by ascending age threshold, the allowed amounts must be
/// non-increasing: a tier covering older resources may never allow
/// retaining more items than a tier covering younger ones. Equal amounts
/// between adjacent tiers are permitted.
pub fn validate_rules(rules: &[RetentionRule]) -> Result<(), RuleSetError> {
    if rules.is_empty() {
        return Err(RuleSetError::Empty);
    }

    let mut ordered = rules.to_vec();
    ordered.sort_by_key(RetentionRule::older_than);

    for pair in ordered.windows(2) {
        if pair[0].older_than() == pair[1].older_than() {
            return Err(RuleSetError::DuplicatePeriod(pair[0].older_than()));
        }
    }

    for pair in ordered.windows(2) {
        let (shorter, longer) = (pair[0], pair[1]);
        if longer.allowed_amount() > shorter.allowed_amount() {
            return Err(RuleSetError::GrowingAllowance { shorter, longer });
        }
    }

    Ok(())
}

/// Errors raised when a rule set is internally inconsistent.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSetError {
    /// The rule set contains no rules at all.
    #[error("at least one retention rule is required")]
    Empty,

    /// Two rules share the same age threshold.
    #[error("duplicate retention rules for period {} are not allowed", humantime::format_duration(*.0))]
    DuplicatePeriod(Duration),

    /// A longer-retention tier allows more retained items than a shorter one.
    #[error("rule '{longer}' cannot allow retaining more items than rule '{shorter}' does")]
    GrowingAllowance {
        shorter: RetentionRule,
        longer: RetentionRule,
    },
}
