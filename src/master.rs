use std::rc::Rc;

use log::debug;

use crate::column::{Column, ColumnId};
use crate::instance::Instance;

/// Dual information for the master rows, in row order.
///
/// The same shape carries a dual solution (relaxation feasible) and a Farkas
/// certificate (relaxation infeasible); the pricing mode decides which one it
/// is. Values follow the engine's raw sign convention for a minimization
/// problem: duals of `>=` rows are non-negative, duals of `<=` rows
/// non-positive at optimality.
#[derive(Debug, Clone, PartialEq)]
pub struct DualValues {
    /// One value per coverage row, indexed by location.
    pub coverage: Vec<f64>,
    /// One value per convexity row, indexed by potential median.
    pub convexity: Vec<f64>,
    /// The value of the cardinality row.
    pub cardinality: f64,
}

struct ColumnEntry {
    column: Column,
    /// Local upper bound; 0.0 once the column is fixed out of the subtree.
    ub: f64,
}

/// The master problem: the three constraint families and the column pool.
///
/// Created from the instance before any column exists, with one coverage row
/// per location (at least one chosen cluster must serve it), one convexity
/// row per potential median (at most one cluster may use it as median) and a
/// single cardinality row (at most `p` clusters in total). Columns enter the
/// relaxation exclusively through [`Master::attach`] and are never removed.
pub struct Master {
    instance: Rc<Instance>,
    columns: Vec<ColumnEntry>,
    coverage_rows: Vec<Vec<ColumnId>>,
    convexity_rows: Vec<Vec<ColumnId>>,
    cardinality_row: Vec<ColumnId>,
    #[cfg(feature = "datastore")]
    data: anymap3::AnyMap,
}

impl Master {
    /// Creates the master constraint set with empty rows.
    pub fn new(instance: Rc<Instance>) -> Self {
        let n = instance.n_locations();
        Master {
            instance,
            columns: Vec::new(),
            coverage_rows: vec![Vec::new(); n],
            convexity_rows: vec![Vec::new(); n],
            cardinality_row: Vec::new(),
            #[cfg(feature = "datastore")]
            data: anymap3::AnyMap::new(),
        }
    }

    /// Returns the shared instance.
    pub fn instance(&self) -> &Rc<Instance> {
        &self.instance
    }

    /// Returns the number of columns in the pool.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns a column by id.
    pub fn column(&self, id: ColumnId) -> &Column {
        &self.columns[id.0].column
    }

    /// Iterates over all columns with their ids.
    pub fn columns(&self) -> impl Iterator<Item = (ColumnId, &Column)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, entry)| (ColumnId(i), &entry.column))
    }

    /// Adds a column to the pool and to its master rows.
    ///
    /// The column is recorded, with coefficient 1, in the coverage row of
    /// each member, in the convexity row of its median and in the
    /// cardinality row. This is the only way new variables enter the
    /// relaxation.
    pub fn attach(&mut self, column: Column) -> ColumnId {
        debug_assert_eq!(self.coverage_rows.len(), self.instance.n_locations());

        let id = ColumnId(self.columns.len());
        for &member in column.members() {
            self.coverage_rows[member].push(id);
        }
        self.convexity_rows[column.median()].push(id);
        self.cardinality_row.push(id);

        debug!("attached column {}: {column}", id.0);
        self.columns.push(ColumnEntry { column, ub: 1.0 });
        id
    }

    /// Returns the coverage row of a location.
    pub fn coverage_row(&self, location: usize) -> &[ColumnId] {
        &self.coverage_rows[location]
    }

    /// Returns the convexity row of a potential median.
    pub fn convexity_row(&self, median: usize) -> &[ColumnId] {
        &self.convexity_rows[median]
    }

    /// Returns the cardinality row.
    pub fn cardinality_row(&self) -> &[ColumnId] {
        &self.cardinality_row
    }

    /// Fixes a column's local upper bound to zero.
    pub fn fix_to_zero(&mut self, id: ColumnId) {
        self.columns[id.0].ub = 0.0;
    }

    /// Restores a column's local upper bound to one.
    ///
    /// Called by the driving engine when it restores node-local bounds on
    /// backtracking; propagation never unfixes columns itself.
    pub fn unfix(&mut self, id: ColumnId) {
        self.columns[id.0].ub = 1.0;
    }

    /// Returns whether the column is currently fixed to zero.
    pub fn is_fixed_to_zero(&self, id: ColumnId) -> bool {
        self.columns[id.0].ub == 0.0
    }
}

#[cfg(feature = "datastore")]
impl Master {
    /// Stores a value of type `T`, replacing any previous value of that type.
    ///
    /// Lets the driving engine keep run-scoped data (node bookkeeping and the
    /// like) next to the master without this core knowing its shape.
    pub fn set_data<T: 'static>(&mut self, data: T) {
        self.data.insert(data);
    }

    /// Returns a reference to the stored value of type `T`, if any.
    pub fn get_data<T: 'static>(&self) -> Option<&T> {
        self.data.get::<T>()
    }

    /// Returns a mutable reference to the stored value of type `T`, if any.
    pub fn get_data_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.data.get_mut::<T>()
    }
}
