//! Retention rule definition and the compact text form used in configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const SECONDS_PER_DAY: u64 = 86_400;

/// A single retention tier.
///
/// A rule applies to resources strictly older than `older_than` and bounds
/// how many of them may be retained. A resource whose age equals the
/// threshold is not covered by the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RetentionRule {
    older_than: Duration,
    allowed_amount: usize,
}

impl RetentionRule {
    /// Create a rule from an age threshold and an allowed amount of
    /// retained resources.
    pub fn new(older_than: Duration, allowed_amount: usize) -> Self {
        Self {
            older_than,
            allowed_amount,
        }
    }

    /// Create a rule from whole days and a signed amount, the shape both
    /// values have in configuration. Negative values are rejected.
    pub fn from_days(older_than_days: i64, allowed_amount: i64) -> Result<Self, RuleError> {
        if older_than_days < 0 {
            return Err(RuleError::NegativeRetentionPeriod(older_than_days));
        }
        if allowed_amount < 0 {
            return Err(RuleError::NegativeAllowedAmount(allowed_amount));
        }

        Ok(Self::new(
            Duration::from_secs((older_than_days as u64).saturating_mul(SECONDS_PER_DAY)),
            allowed_amount as usize,
        ))
    }

    /// Age threshold beyond which the rule applies.
    pub fn older_than(&self) -> Duration {
        self.older_than
    }

    /// Maximal allowed amount of retained resources covered by the rule.
    pub fn allowed_amount(&self) -> usize {
        self.allowed_amount
    }
}

impl fmt::Display for RetentionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.older_than.as_secs() / SECONDS_PER_DAY,
            self.allowed_amount
        )
    }
}

impl FromStr for RetentionRule {
    type Err = RuleError;

    /// Parse the `<days>:<amount>` form, e.g. `"7:4"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (days, amount) = s
            .split_once(':')
            .ok_or_else(|| RuleError::Malformed(s.to_string()))?;

        let days: i64 = days
            .trim()
            .parse()
            .map_err(|_| RuleError::Malformed(s.to_string()))?;
        let amount: i64 = amount
            .trim()
            .parse()
            .map_err(|_| RuleError::Malformed(s.to_string()))?;

        Self::from_days(days, amount)
    }
}

/// Parse a whitespace separated set of rules in the `<days>:<amount>` form,
/// e.g. `"1:10 5:4 10:2"`.
pub fn parse_rules(rules: &str) -> Result<Vec<RetentionRule>, RuleError> {
    rules.split_whitespace().map(str::parse).collect()
}

/// Errors raised when constructing or parsing a single retention rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The retention period is negative.
    #[error("retention period cannot be less than zero, got {0} days")]
    NegativeRetentionPeriod(i64),

    /// The allowed amount of retained resources is negative.
    #[error("amount of items to allow being retained cannot be less than zero, got {0}")]
    NegativeAllowedAmount(i64),

    /// The text form does not parse as `<days>:<amount>`.
    #[error("malformed retention rule '{0}', expected '<days>:<amount>'")]
    Malformed(String),
}
