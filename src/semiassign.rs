use std::fmt;

use log::debug;

use crate::column::ColumnId;
use crate::master::Master;
use crate::restriction::RestrictionState;

/// Lifecycle of a semi-assignment branching constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsState {
    /// Created by branching; not yet part of the active path.
    Pending,
    /// On the path to the currently explored node; its restriction applies.
    Active,
    /// The node was left; the restriction no longer applies.
    Inactive,
    /// The node was pruned; the constraint is discarded.
    Deleted,
}

/// A branching constraint forbidding a set of medians for one location in
/// the subtree of a node.
///
/// Activation and deactivation follow the depth-first traversal of the
/// search tree: the engine activates the constraint when it enters the
/// node's subtree and deactivates it on the way back, in strict stack
/// order. This core relies on that ordering instead of enforcing it;
/// transition misuse is a programming error caught by debug assertions.
///
/// The constraint remembers how many columns it has already scanned
/// (`propagated`), so a re-activation only propagates to columns attached
/// since the last scan, never the whole pool. Columns fixed by an earlier
/// activation are not unfixed on deactivation; restoring node-local bounds
/// is the engine's job.
#[derive(Debug)]
pub struct SemiAssignCons {
    name: String,
    location: usize,
    forbidden: Vec<bool>,
    state: ConsState,
    /// Number of pool columns scanned by earlier propagations.
    propagated: usize,
    needs_propagation: bool,
}

impl SemiAssignCons {
    /// Creates a pending constraint forbidding the masked medians for the
    /// location.
    pub fn new(name: String, location: usize, forbidden: Vec<bool>) -> Self {
        SemiAssignCons {
            name,
            location,
            forbidden,
            state: ConsState::Pending,
            propagated: 0,
            needs_propagation: false,
        }
    }

    /// Returns the name of the constraint.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the location whose assignments the constraint restricts.
    pub fn location(&self) -> usize {
        self.location
    }

    /// Returns, per median, whether the constraint forbids it.
    pub fn forbidden(&self) -> &[bool] {
        &self.forbidden
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> ConsState {
        self.state
    }

    /// Enters the constraint's subtree: marks the masked assignments
    /// forbidden and schedules propagation if columns were attached since
    /// the last scan.
    ///
    /// Returns whether [`SemiAssignCons::propagate`] has work to do.
    pub fn activate(&mut self, master: &Master, restrictions: &mut RestrictionState) -> bool {
        debug_assert!(
            matches!(self.state, ConsState::Pending | ConsState::Inactive),
            "activated constraint {} in state {:?}",
            self.name,
            self.state
        );
        debug!("activate constraint {}", self.name);

        restrictions.forbid_assignments(self.location, &self.forbidden);
        self.state = ConsState::Active;

        if self.propagated < master.n_columns() {
            debug!("constraint {} needs to be propagated", self.name);
            self.needs_propagation = true;
        }
        self.needs_propagation
    }

    /// Fixes to zero every not-yet-scanned column whose median the
    /// constraint forbids and whose members contain the location.
    ///
    /// Only columns attached since the last scan are examined. Returns the
    /// columns fixed by this call.
    pub fn propagate(&mut self, master: &mut Master) -> Vec<ColumnId> {
        debug_assert!(
            self.state == ConsState::Active,
            "propagated constraint {} in state {:?}",
            self.name,
            self.state
        );

        if !self.needs_propagation {
            return Vec::new();
        }

        let mut fixed = Vec::new();
        let end = master.n_columns();
        for index in self.propagated..end {
            let id = ColumnId(index);
            if master.is_fixed_to_zero(id) {
                continue;
            }
            let hit = {
                let column = master.column(id);
                self.forbidden[column.median()] && column.contains(self.location)
            };
            if hit {
                master.fix_to_zero(id);
                fixed.push(id);
            }
        }

        debug!(
            "propagated constraint {}: {} columns fixed to zero",
            self.name,
            fixed.len()
        );
        self.propagated = end;
        self.needs_propagation = false;
        fixed
    }

    /// Leaves the constraint's subtree: clears the forbidden bits again.
    ///
    /// Columns fixed while the constraint was active stay fixed; the
    /// engine's node-local bound restoration releases them.
    pub fn deactivate(&mut self, restrictions: &mut RestrictionState) {
        debug_assert!(
            self.state == ConsState::Active,
            "deactivated constraint {} in state {:?}",
            self.name,
            self.state
        );
        debug!("deactivate constraint {}", self.name);

        restrictions.allow_assignments(self.location, &self.forbidden);
        self.needs_propagation = false;
        self.state = ConsState::Inactive;
    }

    /// Discards the constraint once its node is pruned.
    pub fn delete(&mut self) {
        debug_assert!(
            self.state != ConsState::Active,
            "deleted active constraint {}",
            self.name
        );
        self.state = ConsState::Deleted;
    }
}

impl fmt::Display for SemiAssignCons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: location {}, forbidden medians:", self.name, self.location)?;
        for (median, &flag) in self.forbidden.iter().enumerate() {
            if flag {
                write!(f, " {median}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::instance::Instance;
    use std::rc::Rc;

    fn setup() -> (Rc<Instance>, Master, RestrictionState) {
        let instance = Rc::new(
            Instance::new(
                1,
                vec![vec![0, 2, 2], vec![2, 0, 2], vec![2, 2, 0]],
                vec![1, 1, 1],
                vec![3, 3, 3],
            )
            .unwrap(),
        );
        let master = Master::new(Rc::clone(&instance));
        let restrictions = RestrictionState::new(3);
        (instance, master, restrictions)
    }

    fn cons(location: usize, forbidden: Vec<bool>) -> SemiAssignCons {
        SemiAssignCons::new("test".into(), location, forbidden)
    }

    #[test]
    fn lifecycle_transitions() {
        let (_, master, mut restrictions) = setup();
        let mut cons = cons(0, vec![true, false, false]);
        assert_eq!(cons.state(), ConsState::Pending);

        cons.activate(&master, &mut restrictions);
        assert_eq!(cons.state(), ConsState::Active);
        assert!(restrictions.is_forbidden(0, 0));

        cons.deactivate(&mut restrictions);
        assert_eq!(cons.state(), ConsState::Inactive);
        assert!(!restrictions.is_forbidden(0, 0));

        cons.activate(&master, &mut restrictions);
        assert!(restrictions.is_forbidden(0, 0));
        cons.deactivate(&mut restrictions);

        cons.delete();
        assert_eq!(cons.state(), ConsState::Deleted);
    }

    #[test]
    fn activation_schedules_propagation_only_for_new_columns() {
        let (instance, mut master, mut restrictions) = setup();
        let mut cons = cons(1, vec![true, false, false]);

        // nothing attached yet: nothing to propagate
        assert!(!cons.activate(&master, &mut restrictions));
        assert!(cons.propagate(&mut master).is_empty());
        cons.deactivate(&mut restrictions);

        let hit = master.attach(Column::new(&instance, 0, vec![0, 1]).unwrap());
        let miss = master.attach(Column::new(&instance, 0, vec![0]).unwrap());
        let other_median = master.attach(Column::new(&instance, 2, vec![1, 2]).unwrap());

        assert!(cons.activate(&master, &mut restrictions));
        assert_eq!(cons.propagate(&mut master), vec![hit]);
        assert!(master.is_fixed_to_zero(hit));
        assert!(!master.is_fixed_to_zero(miss));
        assert!(!master.is_fixed_to_zero(other_median));

        // a second propagation in the same activation is a no-op
        assert!(cons.propagate(&mut master).is_empty());
    }

    #[test]
    fn reactivation_scans_only_columns_attached_since_the_last_scan() {
        let (instance, mut master, mut restrictions) = setup();
        let mut cons = cons(1, vec![true, false, false]);

        let first = master.attach(Column::new(&instance, 0, vec![1, 2]).unwrap());
        cons.activate(&master, &mut restrictions);
        assert_eq!(cons.propagate(&mut master), vec![first]);
        cons.deactivate(&mut restrictions);

        // the engine restores bounds when the subtree is left
        master.unfix(first);

        let second = master.attach(Column::new(&instance, 0, vec![0, 1]).unwrap());
        cons.activate(&master, &mut restrictions);
        // only the new column is scanned; the first one is not re-fixed
        assert_eq!(cons.propagate(&mut master), vec![second]);
        assert!(!master.is_fixed_to_zero(first));
        assert!(master.is_fixed_to_zero(second));
    }

    #[test]
    fn propagation_skips_columns_already_fixed() {
        let (instance, mut master, mut restrictions) = setup();
        let mut cons = cons(2, vec![false, true, false]);

        let fixed_before = master.attach(Column::new(&instance, 1, vec![2]).unwrap());
        let open = master.attach(Column::new(&instance, 1, vec![1, 2]).unwrap());
        master.fix_to_zero(fixed_before);

        cons.activate(&master, &mut restrictions);
        assert_eq!(cons.propagate(&mut master), vec![open]);
    }

    #[test]
    fn deactivation_leaves_fixed_columns_fixed() {
        let (instance, mut master, mut restrictions) = setup();
        let mut cons = cons(0, vec![true, false, false]);

        let id = master.attach(Column::new(&instance, 0, vec![0]).unwrap());
        cons.activate(&master, &mut restrictions);
        cons.propagate(&mut master);
        assert!(master.is_fixed_to_zero(id));

        cons.deactivate(&mut restrictions);
        assert!(!restrictions.is_forbidden(0, 0));
        assert!(master.is_fixed_to_zero(id));
    }

    #[test]
    fn display_lists_forbidden_medians() {
        let cons = cons(1, vec![true, false, true]);
        assert_eq!(
            cons.to_string(),
            "test: location 1, forbidden medians: 0 2"
        );
    }
}
