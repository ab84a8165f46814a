//! Cursor: forward traversal over a registry that may grow while it runs.

use std::iter::FusedIterator;

use super::{Registry, SharedTier};
use crate::domain::{CursorPhase, Priority, RegistryError};

/// Where a positioned cursor stands inside its tier.
struct Position<C> {
    priority: Priority,
    tier: SharedTier<C>,
    /// Logical index of the last yielded component.
    index: usize,
    /// Storage slot of the last yielded component. Slots never move, so this
    /// is what the logical index is re-derived from after the tier changes.
    slot: usize,
    /// Tier length observed at the last step.
    seen_len: usize,
    current: C,
}

impl<C: Clone> Position<C> {
    /// Move to the next component of the same tier, if there is one.
    fn step(&mut self) -> bool {
        let tier = self.tier.read();
        let len = tier.visible_count();
        if len != self.seen_len {
            if let Some(index) = tier.position_of_slot(self.slot) {
                if index != self.index {
                    tracing::trace!(
                        priority = %self.priority,
                        from = self.index,
                        to = index,
                        "tier shifted under cursor"
                    );
                }
                self.index = index;
            }
            self.seen_len = len;
        }

        let next = self.index + 1;
        match tier.entry(next) {
            Some((slot, component)) => {
                self.current = component.clone();
                self.index = next;
                self.slot = slot;
                true
            }
            None => false,
        }
    }
}

enum State<C> {
    NotStarted,
    Positioned(Position<C>),
    Finished,
}

/// A single traversal pass over a `Registry`.
///
/// State machine: `NotStarted -> Positioned -> Finished`.
///
/// Nothing about the order is materialized up front. Each `advance` re-reads
/// the live tier length and, at a tier boundary, looks up the next visible
/// priority in the live map. Components appended or inserted at or after the
/// cursor's position, and tiers created or populated ahead of it, are
/// therefore picked up by the same pass.
///
/// Inserting at or before the last yielded logical index of the current tier
/// does not re-deliver anything: the new component is not yielded, and the
/// components after the cursor are still yielded exactly once.
pub struct Cursor<C> {
    registry: Registry<C>,
    state: State<C>,
    seen_tier_count: usize,
}

impl<C: Clone> Cursor<C> {
    pub(crate) fn new(registry: Registry<C>) -> Self {
        let seen_tier_count = registry.visible_tier_count();
        Self {
            registry,
            state: State::NotStarted,
            seen_tier_count,
        }
    }

    /// Where the cursor is in its state machine.
    pub fn phase(&self) -> CursorPhase {
        match self.state {
            State::NotStarted => CursorPhase::NotStarted,
            State::Positioned(_) => CursorPhase::Positioned,
            State::Finished => CursorPhase::Finished,
        }
    }

    /// Priority of the tier the cursor is positioned on.
    pub fn priority(&self) -> Option<Priority> {
        match &self.state {
            State::Positioned(pos) => Some(pos.priority),
            _ => None,
        }
    }

    /// The component yielded by the last successful `advance`.
    pub fn current(&self) -> Result<C, RegistryError> {
        match &self.state {
            State::Positioned(pos) => Ok(pos.current.clone()),
            _ => Err(RegistryError::InvalidCursorState(self.phase())),
        }
    }

    /// Move to the next component. Returns `false` once exhausted.
    pub fn advance(&mut self) -> bool {
        let after = match &mut self.state {
            State::Finished => return false,
            State::NotStarted => None,
            State::Positioned(pos) => {
                if pos.step() {
                    return true;
                }
                Some(pos.priority)
            }
        };
        self.enter_next_tier(after)
    }

    /// `advance` and return the new component with its tier's priority.
    pub fn next_entry(&mut self) -> Option<(Priority, C)> {
        if !self.advance() {
            return None;
        }
        match &self.state {
            State::Positioned(pos) => Some((pos.priority, pos.current.clone())),
            _ => None,
        }
    }

    fn enter_next_tier(&mut self, mut after: Option<Priority>) -> bool {
        let live = self.registry.visible_tier_count();
        if live != self.seen_tier_count {
            tracing::trace!(
                seen = self.seen_tier_count,
                live,
                "visible tier count changed during traversal"
            );
            self.seen_tier_count = live;
        }

        loop {
            let Some((priority, tier)) = self.registry.next_visible_after(after) else {
                self.state = State::Finished;
                return false;
            };

            let guard = tier.read();
            let first = guard
                .entry(0)
                .map(|(slot, component)| (slot, component.clone(), guard.visible_count()));
            drop(guard);

            if let Some((slot, current, seen_len)) = first {
                self.state = State::Positioned(Position {
                    priority,
                    tier,
                    index: 0,
                    slot,
                    seen_len,
                    current,
                });
                return true;
            }
            after = Some(priority);
        }
    }
}

impl<C: Clone> Iterator for Cursor<C> {
    type Item = C;

    fn next(&mut self) -> Option<C> {
        if self.advance() {
            self.current().ok()
        } else {
            None
        }
    }
}

impl<C: Clone> FusedIterator for Cursor<C> {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn p(v: i32) -> Priority {
        Priority::new(v)
    }

    fn abc() -> Registry<&'static str> {
        Registry::from_components(vec![("A", p(0)), ("B", p(0)), ("C", p(5))])
    }

    /// Drive a full pass, letting `on_yield` mutate the registry after each
    /// component, the way a running startup action would.
    fn drive(
        reg: &Registry<&'static str>,
        mut on_yield: impl FnMut(&'static str, &Registry<&'static str>),
    ) -> Vec<&'static str> {
        let mut seen = Vec::new();
        let mut cursor = reg.enumerate();
        while cursor.advance() {
            let c = cursor.current().unwrap();
            seen.push(c);
            on_yield(c, reg);
        }
        seen
    }

    #[test]
    fn yields_tiers_in_ascending_priority() {
        let reg = Registry::from_components(vec![("hi", p(9)), ("lo", p(-2)), ("mid", p(3))]);
        let seen: Vec<_> = reg.enumerate().collect();
        assert_eq!(seen, vec!["lo", "mid", "hi"]);
    }

    #[test]
    fn empty_registry_is_immediately_exhausted() {
        let reg: Registry<&str> = Registry::new();
        reg.tier_for(p(1));
        let mut cursor = reg.enumerate();
        assert!(!cursor.advance());
        assert_eq!(cursor.phase(), CursorPhase::Finished);
        assert!(!cursor.advance());
    }

    #[test]
    fn current_before_first_advance_is_invalid() {
        let reg = abc();
        let cursor = reg.enumerate();
        assert_eq!(
            cursor.current(),
            Err(RegistryError::InvalidCursorState(CursorPhase::NotStarted))
        );
    }

    #[test]
    fn current_after_exhaustion_is_invalid() {
        let reg = abc();
        let mut cursor = reg.enumerate();
        while cursor.advance() {}
        assert_eq!(
            cursor.current(),
            Err(RegistryError::InvalidCursorState(CursorPhase::Finished))
        );
    }

    #[test]
    fn independent_passes_yield_identical_sequences() {
        let reg = abc();
        let first: Vec<_> = reg.enumerate().collect();
        let second: Vec<_> = reg.enumerate().collect();
        assert_eq!(first, vec!["A", "B", "C"]);
        assert_eq!(first, second);
    }

    #[test]
    fn insert_after_current_position_runs_in_same_pass() {
        let reg = abc();
        let seen = drive(&reg, |c, reg| {
            if c == "A" {
                reg.tier_for(p(0)).insert(1, "D").unwrap();
            }
        });
        assert_eq!(seen, vec!["A", "D", "B", "C"]);
    }

    #[test]
    fn append_to_active_tier_runs_before_next_tier() {
        let reg = abc();
        let seen = drive(&reg, |c, reg| {
            if c == "A" {
                reg.tier_for(p(0)).append("D");
            }
        });
        assert_eq!(seen, vec!["A", "B", "D", "C"]);
    }

    #[rstest]
    #[case::before_current(0)]
    #[case::at_current(1)]
    fn insert_at_or_before_cursor_neither_repeats_nor_skips(#[case] index: usize) {
        let reg = Registry::from_components(vec![("A", p(0)), ("B", p(0)), ("C", p(0))]);
        let seen = drive(&reg, |c, reg| {
            if c == "B" {
                reg.tier_for(p(0)).insert(index, "X").unwrap();
            }
        });
        assert_eq!(seen, vec!["A", "B", "C"]);
        assert_eq!(reg.tier_for(p(0)).visible_count(), 4);
    }

    #[test]
    fn brand_new_tier_lands_in_priority_order() {
        let reg = Registry::from_components(vec![("A", p(0)), ("C", p(5)), ("F", p(20))]);
        let seen = drive(&reg, |c, reg| {
            if c == "A" {
                reg.register(p(10), "E");
            }
        });
        assert_eq!(seen, vec!["A", "C", "E", "F"]);
    }

    #[test]
    fn tier_created_empty_then_populated_later_is_visited() {
        let reg = abc();
        let seen = drive(&reg, |c, reg| match c {
            "A" => {
                reg.tier_for(p(10));
            }
            "B" => reg.tier_for(p(10)).append("E"),
            _ => {}
        });
        assert_eq!(seen, vec!["A", "B", "C", "E"]);
    }

    #[test]
    fn registration_into_an_earlier_tier_is_not_replayed() {
        let reg = abc();
        let seen = drive(&reg, |c, reg| {
            if c == "C" {
                reg.register(p(-1), "early");
                reg.register(p(0), "late-zero");
            }
        });
        assert_eq!(seen, vec!["A", "B", "C"]);
    }

    #[test]
    fn component_registered_by_last_component_is_still_yielded() {
        let reg = abc();
        let seen = drive(&reg, |c, reg| {
            if c == "C" {
                reg.register(p(5), "C2");
            }
        });
        assert_eq!(seen, vec!["A", "B", "C", "C2"]);
    }

    #[test]
    fn finished_cursor_stays_finished() {
        let reg = abc();
        let mut cursor = reg.enumerate();
        while cursor.advance() {}
        reg.register(p(100), "late");
        assert!(!cursor.advance());
        assert_eq!(cursor.phase(), CursorPhase::Finished);
    }

    #[test]
    fn two_cursors_observe_the_same_growth() {
        let reg = abc();
        let mut first = reg.enumerate();
        let mut diag = reg.enumerate();

        assert!(first.advance());
        assert!(diag.advance());
        reg.tier_for(p(0)).append("D");

        let rest_first: Vec<_> = first.by_ref().collect();
        let rest_diag: Vec<_> = diag.by_ref().collect();
        assert_eq!(rest_first, vec!["B", "D", "C"]);
        assert_eq!(rest_first, rest_diag);
    }

    #[test]
    fn priority_tracks_the_active_tier() {
        let reg = abc();
        let mut cursor = reg.enumerate();
        assert_eq!(cursor.priority(), None);
        cursor.advance();
        assert_eq!(cursor.priority(), Some(p(0)));
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.priority(), Some(p(5)));
    }
}
