use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, warn};

use crate::column::{Column, ColumnId};
use crate::error::{Error, KnapsackError};
use crate::instance::Instance;
use crate::knapsack::{KnapsackItem, KnapsackSolver};
use crate::master::{DualValues, Master};
use crate::restriction::RestrictionState;
use crate::DEFAULT_TOLERANCE;

/// Which kind of dual information a pricing round works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingMode {
    /// The relaxation is feasible; price against its dual solution.
    ReducedCost,
    /// The relaxation is infeasible; price against a Farkas certificate to
    /// find columns that repair feasibility.
    Farkas,
}

/// An enum representing the possible states of a `PricerResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricerResultState {
    /// New improving columns were attached to the master.
    FoundColumns,
    /// No improving column exists; the current relaxation is optimal.
    NoColumns,
    /// The stop signal was raised between medians; columns attached before
    /// the interrupt are kept.
    Interrupted,
}

/// The result of a pricing round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricerResult {
    /// The state of the pricing round.
    pub state: PricerResultState,
    /// The columns attached during the round, ascending by median.
    pub columns: Vec<ColumnId>,
}

/// The best cluster a median's knapsack subproblem produced.
struct Candidate {
    members: Vec<usize>,
    profit: f64,
}

/// Generates improving cluster columns, one bounded knapsack per median.
///
/// For every potential median, the locations not forbidden by the active
/// branching restrictions form the items of a 0/1 knapsack bounded by the
/// median's capacity. Reduced-cost and Farkas pricing share all logic except
/// the item profits. Because the item list is rebuilt from the current
/// restriction state on every round, columns generated at any tree depth
/// respect every active ancestor restriction without a separate fix-up pass.
pub struct ClusterPricer<K> {
    instance: Rc<Instance>,
    knapsack: K,
    tolerance: f64,
    stop: Option<Arc<AtomicBool>>,
}

impl<K: KnapsackSolver> ClusterPricer<K> {
    /// Creates a pricer over the given instance and knapsack oracle.
    pub fn new(instance: Rc<Instance>, knapsack: K) -> Self {
        ClusterPricer {
            instance,
            knapsack,
            tolerance: DEFAULT_TOLERANCE,
            stop: None,
        }
    }

    /// Sets the feasibility tolerance used for the improvement test.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Installs a cooperative stop signal, checked between medians.
    ///
    /// When the signal is raised the round aborts early; columns attached
    /// before the interrupt stay in the master.
    pub fn with_stop_signal(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Solves the knapsack subproblem of one median.
    ///
    /// Returns `Ok(None)` when the optimal selection is empty; a cluster has
    /// to serve at least one location.
    fn solve_subproblem(
        instance: &Instance,
        knapsack: &K,
        median: usize,
        restrictions: &RestrictionState,
        duals: &DualValues,
        mode: PricingMode,
    ) -> Result<Option<Candidate>, KnapsackError> {
        let items: Vec<KnapsackItem> = (0..instance.n_locations())
            .filter(|&location| !restrictions.is_forbidden(median, location))
            .map(|location| KnapsackItem {
                id: location,
                weight: instance.demand(location),
                profit: match mode {
                    // marginal value of covering the location, less the
                    // service cost it adds to the cluster
                    PricingMode::ReducedCost => {
                        duals.coverage[location] - instance.distance(location, median) as f64
                    }
                    // Farkas coefficients; costs play no role in a
                    // feasibility certificate
                    PricingMode::Farkas => duals.coverage[location],
                },
            })
            .collect();

        let solution = knapsack.solve_exactly(&items, instance.capacity(median))?;
        if solution.items.is_empty() {
            return Ok(None);
        }
        Ok(Some(Candidate {
            members: solution.items,
            profit: solution.profit,
        }))
    }

    /// Scores the collected subproblem outcomes and attaches the improving
    /// columns, in ascending median order.
    fn finish_round(
        &self,
        master: &mut Master,
        duals: &DualValues,
        mode: PricingMode,
        outcomes: Vec<(usize, Result<Option<Candidate>, KnapsackError>)>,
        interrupted: bool,
    ) -> Result<PricerResult, Error> {
        let attempted = outcomes.len();
        let mut failures = 0;
        let mut columns = Vec::new();

        for (median, outcome) in outcomes {
            match outcome {
                Err(err) => {
                    warn!("pricing problem for median {median} could not be solved: {err}");
                    failures += 1;
                }
                Ok(None) => {}
                Ok(Some(candidate)) => {
                    // The column enters the convexity row of its median and
                    // the cardinality row with coefficient 1, so both duals
                    // take part in the score. In reduced-cost mode the score
                    // is the negated reduced cost of the best column for
                    // this median, in Farkas mode its Farkas value.
                    let score = candidate.profit + duals.convexity[median] + duals.cardinality;
                    debug!(
                        "median {median}: knapsack profit {}, score {score}",
                        candidate.profit
                    );
                    if score > self.tolerance {
                        let column = Column::new(&self.instance, median, candidate.members)?;
                        debug!("found improving column, score={score}: {column}");
                        columns.push(master.attach(column));
                    }
                }
            }
        }

        if attempted > 0 && failures == attempted {
            return Err(Error::PricingFailed);
        }

        let state = if interrupted {
            PricerResultState::Interrupted
        } else if !columns.is_empty() {
            PricerResultState::FoundColumns
        } else if mode == PricingMode::Farkas {
            return Err(Error::InfeasibilityNotRepaired);
        } else {
            PricerResultState::NoColumns
        };

        Ok(PricerResult { state, columns })
    }
}

fn stop_requested(stop: Option<&AtomicBool>) -> bool {
    stop.is_some_and(|flag| flag.load(Ordering::Relaxed))
}

#[cfg(not(feature = "parallel"))]
impl<K: KnapsackSolver> ClusterPricer<K> {
    /// Reduced-cost pricing for a feasible relaxation.
    pub fn price_redcost(
        &self,
        master: &mut Master,
        restrictions: &RestrictionState,
        duals: &DualValues,
    ) -> Result<PricerResult, Error> {
        self.perform_pricing(master, restrictions, duals, PricingMode::ReducedCost)
    }

    /// Farkas pricing for an infeasible relaxation.
    ///
    /// Finding no repairing column is reported as
    /// [`Error::InfeasibilityNotRepaired`].
    pub fn price_farkas(
        &self,
        master: &mut Master,
        restrictions: &RestrictionState,
        duals: &DualValues,
    ) -> Result<PricerResult, Error> {
        self.perform_pricing(master, restrictions, duals, PricingMode::Farkas)
    }

    fn perform_pricing(
        &self,
        master: &mut Master,
        restrictions: &RestrictionState,
        duals: &DualValues,
        mode: PricingMode,
    ) -> Result<PricerResult, Error> {
        let n = self.instance.n_locations();
        debug_assert_eq!(duals.coverage.len(), n);
        debug_assert_eq!(duals.convexity.len(), n);

        let mut outcomes = Vec::with_capacity(n);
        let mut interrupted = false;
        for median in 0..n {
            if stop_requested(self.stop.as_deref()) {
                interrupted = true;
                break;
            }
            outcomes.push((
                median,
                Self::solve_subproblem(
                    &self.instance,
                    &self.knapsack,
                    median,
                    restrictions,
                    duals,
                    mode,
                ),
            ));
        }

        self.finish_round(master, duals, mode, outcomes, interrupted)
    }
}

#[cfg(feature = "parallel")]
impl<K: KnapsackSolver + Sync> ClusterPricer<K> {
    /// Reduced-cost pricing for a feasible relaxation.
    pub fn price_redcost(
        &self,
        master: &mut Master,
        restrictions: &RestrictionState,
        duals: &DualValues,
    ) -> Result<PricerResult, Error> {
        self.perform_pricing(master, restrictions, duals, PricingMode::ReducedCost)
    }

    /// Farkas pricing for an infeasible relaxation.
    ///
    /// Finding no repairing column is reported as
    /// [`Error::InfeasibilityNotRepaired`].
    pub fn price_farkas(
        &self,
        master: &mut Master,
        restrictions: &RestrictionState,
        duals: &DualValues,
    ) -> Result<PricerResult, Error> {
        self.perform_pricing(master, restrictions, duals, PricingMode::Farkas)
    }

    /// The median subproblems are independent, so they run data-parallel;
    /// scoring and attachment stay in ascending median order, keeping the
    /// round's outcome identical to a sequential one.
    fn perform_pricing(
        &self,
        master: &mut Master,
        restrictions: &RestrictionState,
        duals: &DualValues,
        mode: PricingMode,
    ) -> Result<PricerResult, Error> {
        use rayon::prelude::*;

        let n = self.instance.n_locations();
        debug_assert_eq!(duals.coverage.len(), n);
        debug_assert_eq!(duals.convexity.len(), n);

        let instance = &*self.instance;
        let knapsack = &self.knapsack;
        let stop = self.stop.as_deref();

        let outcomes: Vec<(usize, Option<Result<Option<Candidate>, KnapsackError>>)> = (0..n)
            .into_par_iter()
            .map(|median| {
                if stop_requested(stop) {
                    (median, None)
                } else {
                    (
                        median,
                        Some(Self::solve_subproblem(
                            instance,
                            knapsack,
                            median,
                            restrictions,
                            duals,
                            mode,
                        )),
                    )
                }
            })
            .collect();

        let interrupted = outcomes.iter().any(|(_, outcome)| outcome.is_none());
        let outcomes = outcomes
            .into_iter()
            .filter_map(|(median, outcome)| outcome.map(|res| (median, res)))
            .collect();

        self.finish_round(master, duals, mode, outcomes, interrupted)
    }
}
