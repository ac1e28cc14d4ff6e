//! Branch-and-price core for capacitated p-median problems.
//!
//! The capacitated p-median problem chooses `p` median locations, assigns
//! every location to exactly one chosen median and minimizes the total
//! assignment distance while respecting each median's capacity. This crate
//! implements the problem-specific side of a branch-and-price approach: the
//! master problem's column and constraint structure, a knapsack-based pricer
//! that discovers profitable cluster columns, semi-assignment branching and
//! the propagation of branching restrictions onto existing and future
//! columns.
//!
//! The generic machinery stays outside: an embedding engine solves the LP
//! relaxations, manages the branch-and-bound tree and drives the components
//! through its node loop. Tests and the example below play the engine's part
//! by hand.
//!
//! ```
//! use std::rc::Rc;
//! use capmed::prelude::*;
//!
//! // Three locations, two clusters; location 2 is far from the others.
//! let instance = Rc::new(Instance::new(
//!     2,
//!     vec![vec![0, 1, 9], vec![1, 0, 9], vec![9, 9, 0]],
//!     vec![1, 1, 1],
//!     vec![2, 2, 2],
//! )?);
//!
//! let mut master = Master::new(Rc::clone(&instance));
//! let restrictions = RestrictionState::new(instance.n_locations());
//! let pricer = ClusterPricer::new(Rc::clone(&instance), DpKnapsack);
//!
//! // The first relaxation has no columns and is infeasible; the engine
//! // hands the pricer a Farkas certificate of the uncovered locations.
//! let certificate = DualValues {
//!     coverage: vec![1.0, 1.0, 1.0],
//!     convexity: vec![0.0, 0.0, 0.0],
//!     cardinality: 0.0,
//! };
//! let result = pricer.price_farkas(&mut master, &restrictions, &certificate)?;
//! assert_eq!(result.state, PricerResultState::FoundColumns);
//! assert_eq!(master.n_columns(), 3);
//! # Ok::<(), capmed::Error>(())
//! ```

pub mod branchrule;
pub mod column;
pub mod error;
pub mod instance;
pub mod knapsack;
pub mod master;
pub mod pricer;
pub mod restriction;
pub mod semiassign;

pub use branchrule::{AssignmentMatrix, BranchingOutcome, SemiAssignRule};
pub use column::{Column, ColumnId};
pub use error::{Error, KnapsackError};
pub use instance::Instance;
pub use knapsack::{DpKnapsack, KnapsackItem, KnapsackSolution, KnapsackSolver};
pub use master::{DualValues, Master};
pub use pricer::{ClusterPricer, PricerResult, PricerResultState, PricingMode};
pub use restriction::RestrictionState;
pub use semiassign::{ConsState, SemiAssignCons};

/// Default feasibility tolerance, matching the usual engine setting.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Re-exports the types needed to embed the core.
pub mod prelude {
    pub use crate::branchrule::{AssignmentMatrix, BranchingOutcome, SemiAssignRule};
    pub use crate::column::{Column, ColumnId};
    pub use crate::error::{Error, KnapsackError};
    pub use crate::instance::Instance;
    pub use crate::knapsack::{DpKnapsack, KnapsackItem, KnapsackSolution, KnapsackSolver};
    pub use crate::master::{DualValues, Master};
    pub use crate::pricer::{ClusterPricer, PricerResult, PricerResultState, PricingMode};
    pub use crate::restriction::RestrictionState;
    pub use crate::semiassign::{ConsState, SemiAssignCons};
}
