use std::fmt;

use crate::error::Error;
use crate::instance::Instance;

/// The position of a column in the master's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(pub usize);

/// A candidate cluster: one median and the set of locations it serves.
///
/// The column's cost is the total service cost of the cluster, the sum of
/// the distances from each member to the median, and is computed once at
/// construction. Members are expected to be distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    median: usize,
    members: Vec<usize>,
    cost: i64,
}

impl Column {
    /// Builds a cluster column and computes its service cost.
    ///
    /// Fails if the median or a member lies outside the instance.
    pub fn new(instance: &Instance, median: usize, members: Vec<usize>) -> Result<Self, Error> {
        let n = instance.n_locations();
        if median >= n {
            return Err(Error::InvalidColumn(format!(
                "median {median} outside 0..{n}"
            )));
        }
        if let Some(&l) = members.iter().find(|&&l| l >= n) {
            return Err(Error::InvalidColumn(format!("member {l} outside 0..{n}")));
        }

        let cost = members.iter().map(|&l| instance.distance(l, median)).sum();
        Ok(Column {
            median,
            members,
            cost,
        })
    }

    /// Returns the median of the cluster.
    pub fn median(&self) -> usize {
        self.median
    }

    /// Returns the locations served by the cluster.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Returns the total service cost of the cluster.
    pub fn cost(&self) -> i64 {
        self.cost
    }

    /// Returns whether the cluster serves the given location.
    pub fn contains(&self, location: usize) -> bool {
        self.members.contains(&location)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "median {} <-", self.median)?;
        for l in &self.members {
            write!(f, " {l}")?;
        }
        write!(f, " (cost {})", self.cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> Instance {
        // deliberately asymmetric distances
        Instance::new(
            1,
            vec![vec![0, 4, 9], vec![1, 0, 9], vec![5, 9, 0]],
            vec![1, 1, 1],
            vec![3, 3, 3],
        )
        .unwrap()
    }

    #[test]
    fn cost_sums_member_to_median_distances() {
        let instance = instance();
        let column = Column::new(&instance, 1, vec![0, 2]).unwrap();
        // d(0,1) + d(2,1), not the transposed entries
        assert_eq!(column.cost(), 4 + 9);

        let column = Column::new(&instance, 0, vec![0, 1, 2]).unwrap();
        assert_eq!(column.cost(), 0 + 1 + 5);
    }

    #[test]
    fn membership() {
        let instance = instance();
        let column = Column::new(&instance, 0, vec![0, 2]).unwrap();
        assert!(column.contains(0));
        assert!(!column.contains(1));
        assert!(column.contains(2));
        assert_eq!(column.median(), 0);
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let instance = instance();
        assert!(matches!(
            Column::new(&instance, 3, vec![0]),
            Err(Error::InvalidColumn(_))
        ));
        assert!(matches!(
            Column::new(&instance, 0, vec![0, 7]),
            Err(Error::InvalidColumn(_))
        ));
    }

    #[test]
    fn display_lists_cluster() {
        let instance = instance();
        let column = Column::new(&instance, 1, vec![0, 2]).unwrap();
        assert_eq!(column.to_string(), "median 1 <- 0 2 (cost 13)");
    }
}
