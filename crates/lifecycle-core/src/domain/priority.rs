use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordering key for startup actions.
///
/// Tiers are traversed in ascending order, so a lower value runs earlier.
/// A component's priority is fixed at the moment it is registered.
#[repr(transparent)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Priority(i32);

impl Priority {
    /// Wrap a raw priority value.
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// The raw priority value.
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl From<i32> for Priority {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_value_sorts_first() {
        let mut ps = vec![Priority::new(5), Priority::new(-1), Priority::new(0)];
        ps.sort();
        assert_eq!(ps, vec![Priority::new(-1), Priority::new(0), Priority::new(5)]);
    }

    #[test]
    fn serializes_as_plain_integer() {
        let s = serde_json::to_string(&Priority::new(42)).unwrap();
        assert_eq!(s, "42");
        let back: Priority = serde_json::from_str("-3").unwrap();
        assert_eq!(back, Priority::from(-3));
    }
}
