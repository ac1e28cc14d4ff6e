use std::fmt;

/// An error raised by the branch-and-price core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The instance data is malformed (ragged matrix, negative entries, bad cluster count).
    InvalidInstance(String),
    /// A column refers to a median or member outside the instance.
    InvalidColumn(String),
    /// No pricing subproblem could be solved in a pricing round.
    PricingFailed,
    /// Farkas pricing found no column able to repair the infeasible relaxation.
    InfeasibilityNotRepaired,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInstance(msg) => write!(f, "invalid instance: {msg}"),
            Error::InvalidColumn(msg) => write!(f, "invalid column: {msg}"),
            Error::PricingFailed => write!(f, "no pricing subproblem could be solved"),
            Error::InfeasibilityNotRepaired => {
                write!(f, "Farkas pricing could not repair the infeasible relaxation")
            }
        }
    }
}

impl std::error::Error for Error {}

/// An error reported by a knapsack oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnapsackError {
    /// An item carries a negative weight.
    NegativeWeight {
        /// Id of the offending item.
        item: usize,
    },
    /// The subproblem exceeds the oracle's size limit.
    TooLarge,
    /// An oracle-specific failure.
    Failed(String),
}

impl fmt::Display for KnapsackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnapsackError::NegativeWeight { item } => {
                write!(f, "item {item} has a negative weight")
            }
            KnapsackError::TooLarge => write!(f, "knapsack subproblem exceeds the size limit"),
            KnapsackError::Failed(msg) => write!(f, "knapsack oracle failed: {msg}"),
        }
    }
}

impl std::error::Error for KnapsackError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = Error::InvalidInstance("ragged distance matrix".into());
        assert_eq!(err.to_string(), "invalid instance: ragged distance matrix");
        assert_eq!(
            Error::PricingFailed.to_string(),
            "no pricing subproblem could be solved"
        );
        assert_eq!(
            KnapsackError::NegativeWeight { item: 3 }.to_string(),
            "item 3 has a negative weight"
        );
    }
}
