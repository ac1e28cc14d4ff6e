use log::debug;

use crate::master::Master;
use crate::restriction::RestrictionState;
use crate::semiassign::SemiAssignCons;
use crate::DEFAULT_TOLERANCE;

/// The location-by-median matrix of (possibly fractional) assignment values,
/// derived from an LP solution of the master.
///
/// `value(i, j)` is the summed LP value of all columns whose median is `j`
/// and whose members include `i`. In an integral feasible solution every row
/// holds exactly one 1 and is otherwise 0.
pub struct AssignmentMatrix {
    n: usize,
    values: Vec<f64>,
}

impl AssignmentMatrix {
    /// Accumulates the assignment values of the given LP solution, one value
    /// per column in pool order.
    pub fn compute(master: &Master, lp_values: &[f64]) -> Self {
        debug_assert_eq!(lp_values.len(), master.n_columns());

        let n = master.instance().n_locations();
        let mut values = vec![0.0; n * n];
        for (id, column) in master.columns() {
            let value = lp_values[id.0];
            if value == 0.0 {
                continue;
            }
            for &member in column.members() {
                values[member * n + column.median()] += value;
            }
        }
        AssignmentMatrix { n, values }
    }

    /// Returns the assignment value of `median` to `location`.
    pub fn value(&self, location: usize, median: usize) -> f64 {
        self.values[location * self.n + median]
    }

    /// Returns the number of locations.
    pub fn n_locations(&self) -> usize {
        self.n
    }
}

/// The outcome of a branching attempt.
#[derive(Debug)]
pub enum BranchingOutcome {
    /// Every assignment value is integral; the candidate solution needs no
    /// branching.
    Integral,
    /// The fractional mass of one location was partitioned into two child
    /// restrictions, both still pending.
    Branched {
        /// The location branched on.
        location: usize,
        /// Constraint of the left child.
        left: SemiAssignCons,
        /// Constraint of the right child.
        right: SemiAssignCons,
    },
}

/// Semi-assignment branching.
///
/// Operates on the fractional location-to-median assignment mass instead of
/// on single column values: the chosen location's candidate medians are
/// split into two disjoint forbidden sets, one per child node. Alternating
/// the medians by decreasing assignment value gives both children a roughly
/// even share of the fractional mass, which keeps the tree shallow.
pub struct SemiAssignRule {
    tolerance: f64,
}

impl Default for SemiAssignRule {
    fn default() -> Self {
        SemiAssignRule::new()
    }
}

impl SemiAssignRule {
    /// Creates the rule with the default feasibility tolerance.
    pub fn new() -> Self {
        SemiAssignRule {
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Sets the tolerance deciding when a value counts as integral.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Examines an LP solution and either reports it integral or produces
    /// the two child restrictions of a semi-assignment branching.
    pub fn execute(
        &self,
        master: &Master,
        restrictions: &RestrictionState,
        lp_values: &[f64],
    ) -> BranchingOutcome {
        let assignments = AssignmentMatrix::compute(master, lp_values);

        let Some(location) = self.choose_location(&assignments) else {
            return BranchingOutcome::Integral;
        };

        let (left, right) = self.split_medians(&assignments, restrictions, location);
        debug!("branching on location {location}");

        BranchingOutcome::Branched {
            location,
            left: SemiAssignCons::new(format!("semiassign_left[{location}]"), location, left),
            right: SemiAssignCons::new(format!("semiassign_right[{location}]"), location, right),
        }
    }

    fn is_fractional(&self, value: f64) -> bool {
        (value - value.round()).abs() > self.tolerance
    }

    /// Chooses the location with the most fractionally assigned medians;
    /// ties go to the location whose fractional mass over the even-indexed
    /// medians is closest to half its total fractional mass.
    fn choose_location(&self, assignments: &AssignmentMatrix) -> Option<usize> {
        let n = assignments.n_locations();

        let mut location = None;
        let mut max_nfrac = 0;
        let mut min_fracdiff = f64::INFINITY;

        for i in 0..n {
            let mut nfrac = 0;
            let mut totfrac = 0.0;
            let mut halffrac = 0.0;
            for j in 0..n {
                let value = assignments.value(i, j);
                if self.is_fractional(value) {
                    nfrac += 1;
                    totfrac += value;
                    if j % 2 == 0 {
                        halffrac += value;
                    }
                }
            }

            let fracdiff = (halffrac - 0.5 * totfrac).abs();
            if nfrac > max_nfrac
                || (nfrac > 0 && nfrac == max_nfrac && fracdiff < min_fracdiff - self.tolerance)
            {
                location = Some(i);
                max_nfrac = nfrac;
                min_fracdiff = fracdiff;
                debug!(
                    "   -> location {i}: nfrac = {nfrac}, totfrac = {totfrac}, fracdiff = {fracdiff}"
                );
            }
        }

        location
    }

    /// Splits the location's not-yet-forbidden medians into the two child
    /// forbidden sets, alternating by non-increasing assignment value (ties
    /// by median index).
    fn split_medians(
        &self,
        assignments: &AssignmentMatrix,
        restrictions: &RestrictionState,
        location: usize,
    ) -> (Vec<bool>, Vec<bool>) {
        let n = assignments.n_locations();

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            assignments
                .value(location, b)
                .total_cmp(&assignments.value(location, a))
                .then(a.cmp(&b))
        });

        let mut left = vec![false; n];
        let mut right = vec![false; n];
        let mut candidates = 0;
        for &median in &order {
            // keep only newly forbidden medians in the children, so that
            // deactivating a child restores exactly its own bits
            if restrictions.is_forbidden(median, location) {
                continue;
            }
            if candidates % 2 == 0 {
                left[median] = true;
            } else {
                right[median] = true;
            }
            candidates += 1;
        }

        (left, right)
    }
}
