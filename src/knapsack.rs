use crate::error::KnapsackError;

/// One item of a pricing knapsack: a location with its demand and profit.
#[derive(Debug, Clone, PartialEq)]
pub struct KnapsackItem {
    /// Caller-chosen identifier, reported back in the solution.
    pub id: usize,
    /// Non-negative weight.
    pub weight: i64,
    /// Profit of selecting the item; items without a strictly positive
    /// profit never enter an optimal selection.
    pub profit: f64,
}

/// The subset of items selected by an oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct KnapsackSolution {
    /// Ids of the selected items, in input order.
    pub items: Vec<usize>,
    /// Total profit of the selection.
    pub profit: f64,
}

/// An exact 0/1 knapsack oracle.
///
/// Pricing solves one bounded knapsack per potential median through this
/// seam. A failing oracle makes the pricer skip that median with a warning;
/// the pricing round fails only if every median's subproblem fails.
pub trait KnapsackSolver {
    /// Returns a profit-maximal subset of `items` whose total weight does
    /// not exceed `capacity`.
    fn solve_exactly(
        &self,
        items: &[KnapsackItem],
        capacity: i64,
    ) -> Result<KnapsackSolution, KnapsackError>;
}

/// Upper bound on `items * capacity` cells the reference oracle will allocate.
const DP_CELL_LIMIT: usize = 1 << 24;

/// Reference oracle: a textbook dynamic program over the weight dimension.
///
/// Exact for non-negative integer weights. Stands in for the oracle an
/// engine would normally provide; replace it through [`KnapsackSolver`] when
/// embedding the core. Reports [`KnapsackError::TooLarge`] instead of
/// allocating an excessive table.
#[derive(Debug, Default, Clone, Copy)]
pub struct DpKnapsack;

impl KnapsackSolver for DpKnapsack {
    fn solve_exactly(
        &self,
        items: &[KnapsackItem],
        capacity: i64,
    ) -> Result<KnapsackSolution, KnapsackError> {
        for item in items {
            if item.weight < 0 {
                return Err(KnapsackError::NegativeWeight { item: item.id });
            }
        }
        if capacity < 0 {
            return Err(KnapsackError::Failed("negative capacity".into()));
        }

        // Items that cannot be part of an optimal selection are dropped up
        // front: too heavy for the knapsack, or without positive profit.
        let candidates: Vec<&KnapsackItem> = items
            .iter()
            .filter(|item| item.weight <= capacity && item.profit > 0.0)
            .collect();
        if candidates.is_empty() {
            return Ok(KnapsackSolution {
                items: Vec::new(),
                profit: 0.0,
            });
        }

        let total: i64 = candidates.iter().map(|item| item.weight).sum();
        let width = capacity.min(total) as usize;
        if candidates.len().saturating_mul(width + 1) > DP_CELL_LIMIT {
            return Err(KnapsackError::TooLarge);
        }

        // best[w]: maximal profit with total weight <= w, over the items
        // processed so far; take[i][w] records whether item i entered that
        // optimum.
        let mut best = vec![0.0_f64; width + 1];
        let mut take = vec![false; candidates.len() * (width + 1)];
        for (i, item) in candidates.iter().enumerate() {
            let item_weight = item.weight as usize;
            for w in (item_weight..=width).rev() {
                let with = best[w - item_weight] + item.profit;
                if with > best[w] {
                    best[w] = with;
                    take[i * (width + 1) + w] = true;
                }
            }
        }

        let mut chosen = Vec::new();
        let mut w = width;
        for (i, item) in candidates.iter().enumerate().rev() {
            if take[i * (width + 1) + w] {
                chosen.push(item.id);
                w -= item.weight as usize;
            }
        }
        chosen.reverse();

        Ok(KnapsackSolution {
            items: chosen,
            profit: best[width],
        })
    }
}
