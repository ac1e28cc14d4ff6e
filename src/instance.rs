use std::fmt;

use crate::error::Error;

/// Immutable problem data for one capacitated p-median run.
///
/// Holds the number of clusters to form, the location-to-location distance
/// matrix and the per-location demands and capacities. A location's capacity
/// only matters when the location acts as a median. The data is validated at
/// construction and never changes afterwards; the components of the core
/// share it through an `Rc`.
pub struct Instance {
    n_clusters: usize,
    distances: Vec<Vec<i64>>,
    demands: Vec<i64>,
    capacities: Vec<i64>,
}

impl Instance {
    /// Creates a validated instance.
    ///
    /// `distances[l][m]` is the cost of serving location `l` from median `m`;
    /// the matrix is not required to be symmetric. Fails on an empty or
    /// ragged matrix, mismatched vector lengths, negative entries, or a
    /// cluster count outside `1..=n`.
    pub fn new(
        n_clusters: usize,
        distances: Vec<Vec<i64>>,
        demands: Vec<i64>,
        capacities: Vec<i64>,
    ) -> Result<Self, Error> {
        let n = distances.len();
        if n == 0 {
            return Err(Error::InvalidInstance("no locations".into()));
        }
        for (i, row) in distances.iter().enumerate() {
            if row.len() != n {
                return Err(Error::InvalidInstance(format!(
                    "distance row {i} has {} entries, expected {n}",
                    row.len()
                )));
            }
            if let Some(d) = row.iter().find(|&&d| d < 0) {
                return Err(Error::InvalidInstance(format!(
                    "negative distance {d} in row {i}"
                )));
            }
        }
        if demands.len() != n {
            return Err(Error::InvalidInstance(format!(
                "{} demands for {n} locations",
                demands.len()
            )));
        }
        if capacities.len() != n {
            return Err(Error::InvalidInstance(format!(
                "{} capacities for {n} locations",
                capacities.len()
            )));
        }
        if demands.iter().any(|&d| d < 0) {
            return Err(Error::InvalidInstance("negative demand".into()));
        }
        if capacities.iter().any(|&c| c < 0) {
            return Err(Error::InvalidInstance("negative capacity".into()));
        }
        if n_clusters == 0 || n_clusters > n {
            return Err(Error::InvalidInstance(format!(
                "cluster count {n_clusters} outside 1..={n}"
            )));
        }

        Ok(Instance {
            n_clusters,
            distances,
            demands,
            capacities,
        })
    }

    /// Returns the number of locations.
    pub fn n_locations(&self) -> usize {
        self.distances.len()
    }

    /// Returns the number `p` of clusters to form.
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Returns the cost of serving `location` from `median`.
    pub fn distance(&self, location: usize, median: usize) -> i64 {
        self.distances[location][median]
    }

    /// Returns the demand of a location.
    pub fn demand(&self, location: usize) -> i64 {
        self.demands[location]
    }

    /// Returns the capacity of a location when used as a median.
    pub fn capacity(&self, location: usize) -> i64 {
        self.capacities[location]
    }

    /// Returns all demands, indexed by location.
    pub fn demands(&self) -> &[i64] {
        &self.demands
    }

    /// Returns all capacities, indexed by location.
    pub fn capacities(&self) -> &[i64] {
        &self.capacities
    }
}

impl fmt::Display for Instance {
    /// Prints the raw instance data.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nlocations  : {:3}", self.n_locations())?;
        writeln!(f, "nclusters   : {:3}", self.n_clusters)?;
        writeln!(f, "distances   :")?;
        for row in &self.distances {
            write!(f, "   ")?;
            for d in row {
                write!(f, " {d:4}")?;
            }
            writeln!(f)?;
        }
        write!(f, "demands     :")?;
        for d in &self.demands {
            write!(f, " {d:4}")?;
        }
        writeln!(f)?;
        write!(f, "capacities  :")?;
        for c in &self.capacities {
            write!(f, " {c:4}")?;
        }
        writeln!(f)
    }
}
