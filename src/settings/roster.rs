use thiserror::Error;

/// Upper bound on tracked satellites.
pub const MAX_SATELLITES: usize = 18;

/// Name given to a freshly inserted entry until the user edits it.
pub const PLACEHOLDER_NAME: &str = "New Satellite";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("roster holds at most {MAX_SATELLITES} satellites, got {0}")]
pub struct RosterFull(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SatelliteEntry {
    pub norad_id: u32,
    pub name: String,
}

impl SatelliteEntry {
    pub fn new(norad_id: u32, name: impl Into<String>) -> Self {
        Self {
            norad_id,
            name: name.into(),
        }
    }

    fn placeholder() -> Self {
        Self::new(0, PLACEHOLDER_NAME)
    }
}

/// Ordered, capacity-bounded list of tracked satellites.
///
/// Priority is never stored: an entry's priority is its position, so lower
/// index means higher priority for pass selection. Every structural edit
/// therefore renumbers implicitly and priority and position cannot drift.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    entries: Vec<SatelliteEntry>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_SATELLITES
    }

    pub fn get(&self, index: usize) -> Option<&SatelliteEntry> {
        self.entries.get(index)
    }

    /// Entries paired with their priority, highest priority first.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &SatelliteEntry)> {
        self.entries.iter().enumerate()
    }

    pub fn norad_ids(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.norad_id).collect()
    }

    /// Puts a placeholder entry at priority 0, pushing everything else down one.
    ///
    /// Does nothing once the roster is full; returns whether an entry was added.
    pub fn insert_default(&mut self) -> bool {
        if self.is_full() {
            return false;
        }
        self.entries.insert(0, SatelliteEntry::placeholder());
        true
    }

    /// Removes the entry at `index`; later entries move up one priority.
    pub fn remove_at(&mut self, index: usize) -> Option<SatelliteEntry> {
        if index >= self.entries.len() {
            return None;
        }
        Some(self.entries.remove(index))
    }

    /// Moves an entry from one position to another, shifting the entries in
    /// between by one.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.entries.len();
        if from >= len || to >= len {
            return false;
        }
        if from != to {
            let entry = self.entries.remove(from);
            self.entries.insert(to, entry);
        }
        true
    }

    pub fn set_norad_id(&mut self, index: usize, norad_id: u32) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.norad_id = norad_id;
                true
            }
            None => false,
        }
    }

    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.name = name.into();
                true
            }
            None => false,
        }
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut SatelliteEntry> {
        self.entries.iter_mut()
    }
}

impl TryFrom<Vec<SatelliteEntry>> for Roster {
    type Error = RosterFull;

    fn try_from(entries: Vec<SatelliteEntry>) -> Result<Self, Self::Error> {
        if entries.len() > MAX_SATELLITES {
            return Err(RosterFull(entries.len()));
        }
        Ok(Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(names: &[&str]) -> Roster {
        let entries = names
            .iter()
            .enumerate()
            .map(|(i, n)| SatelliteEntry::new(1000 + i as u32, *n))
            .collect::<Vec<_>>();
        Roster::try_from(entries).unwrap()
    }

    fn names(roster: &Roster) -> Vec<&str> {
        roster.iter().map(|(_, e)| e.name.as_str()).collect()
    }

    fn assert_contiguous(roster: &Roster) {
        for (expected, (priority, _)) in roster.iter().enumerate() {
            assert_eq!(priority, expected);
        }
    }

    #[test]
    fn insert_default_goes_to_the_front() {
        let mut r = roster(&["A", "B"]);
        assert!(r.insert_default());
        assert_eq!(names(&r), vec![PLACEHOLDER_NAME, "A", "B"]);
        assert_eq!(r.get(0).unwrap().norad_id, 0);
        let priorities: Vec<_> = r.iter().map(|(p, _)| p).collect();
        assert_eq!(priorities, vec![0, 1, 2]);
    }

    #[test]
    fn insert_default_into_empty_roster() {
        let mut r = Roster::new();
        assert!(r.insert_default());
        assert_eq!(r.len(), 1);
        assert_contiguous(&r);
    }

    #[test]
    fn insert_default_is_noop_at_capacity() {
        let mut r = Roster::new();
        for _ in 0..MAX_SATELLITES {
            assert!(r.insert_default());
        }
        assert!(r.is_full());
        let before = r.clone();
        assert!(!r.insert_default());
        assert_eq!(r.len(), MAX_SATELLITES);
        assert_eq!(r, before);
    }

    #[test]
    fn remove_at_renumbers_followers() {
        let mut r = roster(&["A", "B", "C"]);
        let removed = r.remove_at(1).unwrap();
        assert_eq!(removed.name, "B");
        assert_eq!(names(&r), vec!["A", "C"]);
        assert_contiguous(&r);
    }

    #[test]
    fn remove_only_entry_leaves_empty_roster() {
        let mut r = roster(&["A"]);
        assert!(r.remove_at(0).is_some());
        assert!(r.is_empty());
    }

    #[test]
    fn remove_out_of_range_is_ignored() {
        let mut r = roster(&["A", "B"]);
        assert!(r.remove_at(2).is_none());
        assert_eq!(names(&r), vec!["A", "B"]);
    }

    #[test]
    fn reorder_moves_down_and_up() {
        let mut r = roster(&["A", "B", "C", "D"]);
        assert!(r.reorder(0, 2));
        assert_eq!(names(&r), vec!["B", "C", "A", "D"]);
        assert!(r.reorder(3, 0));
        assert_eq!(names(&r), vec!["D", "B", "C", "A"]);
        assert_contiguous(&r);
    }

    #[test]
    fn reorder_rejects_out_of_range() {
        let mut r = roster(&["A", "B"]);
        assert!(!r.reorder(0, 2));
        assert!(!r.reorder(5, 0));
        assert_eq!(names(&r), vec!["A", "B"]);
    }

    #[test]
    fn row_edits_target_a_single_entry() {
        let mut r = roster(&["A", "B"]);
        assert!(r.set_norad_id(1, 25544));
        assert!(r.rename(1, "ISS (ZARYA)"));
        assert!(!r.rename(2, "nope"));
        assert_eq!(r.get(1), Some(&SatelliteEntry::new(25544, "ISS (ZARYA)")));
    }

    #[test]
    fn try_from_enforces_capacity() {
        let entries = vec![SatelliteEntry::new(1, "x"); MAX_SATELLITES + 1];
        assert_eq!(Roster::try_from(entries), Err(RosterFull(MAX_SATELLITES + 1)));
    }
}
