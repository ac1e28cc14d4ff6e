/// The forbidden-assignment matrix of the active search path.
///
/// `forbidden[median][location]` records that the location may currently not
/// be served by the median. The state is owned by the search driver and
/// passed by reference into pricing and propagation; it must always equal
/// the union of the branching decisions on the path from the root to the
/// active node. Keeping that stack discipline (activate and deactivate in
/// depth-first order) is the driver's obligation, the state itself only
/// applies the deltas it is handed.
///
/// All mutations are idempotent: forbidding an already forbidden pair or
/// allowing a never forbidden one is a no-op.
pub struct RestrictionState {
    n_locations: usize,
    forbidden: Vec<bool>,
}

impl RestrictionState {
    /// Creates a state with every assignment allowed.
    pub fn new(n_locations: usize) -> Self {
        RestrictionState {
            n_locations,
            forbidden: vec![false; n_locations * n_locations],
        }
    }

    /// Returns the number of locations (and potential medians).
    pub fn n_locations(&self) -> usize {
        self.n_locations
    }

    /// Returns whether serving `location` from `median` is currently forbidden.
    pub fn is_forbidden(&self, median: usize, location: usize) -> bool {
        self.forbidden[self.index(median, location)]
    }

    /// Forbids serving `location` from `median`.
    pub fn forbid(&mut self, median: usize, location: usize) {
        let idx = self.index(median, location);
        self.forbidden[idx] = true;
    }

    /// Allows serving `location` from `median` again.
    pub fn allow(&mut self, median: usize, location: usize) {
        let idx = self.index(median, location);
        self.forbidden[idx] = false;
    }

    /// Forbids `location` for every median whose mask entry is set.
    pub fn forbid_assignments(&mut self, location: usize, forbidden: &[bool]) {
        debug_assert_eq!(forbidden.len(), self.n_locations);
        for (median, &flag) in forbidden.iter().enumerate() {
            if flag {
                self.forbid(median, location);
            }
        }
    }

    /// Allows `location` again for every median whose mask entry is set.
    pub fn allow_assignments(&mut self, location: usize, forbidden: &[bool]) {
        debug_assert_eq!(forbidden.len(), self.n_locations);
        for (median, &flag) in forbidden.iter().enumerate() {
            if flag {
                self.allow(median, location);
            }
        }
    }

    fn index(&self, median: usize, location: usize) -> usize {
        assert!(median < self.n_locations && location < self.n_locations);
        median * self.n_locations + location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_all_allowed() {
        let state = RestrictionState::new(3);
        for median in 0..3 {
            for location in 0..3 {
                assert!(!state.is_forbidden(median, location));
            }
        }
    }

    #[test]
    fn forbid_and_allow_single_pair() {
        let mut state = RestrictionState::new(3);
        state.forbid(1, 2);
        assert!(state.is_forbidden(1, 2));
        assert!(!state.is_forbidden(2, 1));
        state.allow(1, 2);
        assert!(!state.is_forbidden(1, 2));
    }

    #[test]
    fn mask_operations_touch_only_set_medians() {
        let mut state = RestrictionState::new(4);
        state.forbid_assignments(2, &[true, false, true, false]);
        assert!(state.is_forbidden(0, 2));
        assert!(!state.is_forbidden(1, 2));
        assert!(state.is_forbidden(2, 2));
        assert!(!state.is_forbidden(3, 2));
        // other locations untouched
        assert!(!state.is_forbidden(0, 0));

        state.allow_assignments(2, &[true, false, true, false]);
        for median in 0..4 {
            assert!(!state.is_forbidden(median, 2));
        }
    }

    #[test]
    fn allow_after_forbid_restores_every_mask_bit() {
        let mut state = RestrictionState::new(4);
        let mask = [false, true, true, false];
        state.forbid_assignments(1, &mask);
        state.allow_assignments(1, &mask);
        for median in 0..4 {
            assert!(!state.is_forbidden(median, 1));
        }
    }

    #[test]
    fn redundant_operations_are_no_ops() {
        let mut state = RestrictionState::new(2);
        state.forbid(0, 1);
        state.forbid(0, 1);
        assert!(state.is_forbidden(0, 1));
        state.allow(1, 0);
        assert!(!state.is_forbidden(1, 0));
        state.allow(0, 1);
        state.allow(0, 1);
        assert!(!state.is_forbidden(0, 1));
    }
}
