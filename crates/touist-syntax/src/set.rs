//! Typed set values.
//!
//! A set is one of three concrete flavors (integers, floats, proposition
//! names) or the polymorphic empty set. The empty set adopts the flavor of
//! the sibling operand at every binary operation, so `[] union [1,2]` is an
//! integer set. Enumeration order is the natural order of the flavor:
//! integers and floats ascending, proposition names lexicographic.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// A totally ordered wrapper for `f64`, usable as a `BTreeSet` element.
///
/// NaN compares less than all other values and equal to other NaNs. Set
/// elements come from evaluated arithmetic, which never produces NaN, but
/// the ordering must still be total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedF64(pub f64);

impl Eq for OrderedF64 {}

impl PartialOrd for OrderedF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.0.partial_cmp(&other.0) {
            Some(ordering) => ordering,
            None => {
                if self.0.is_nan() {
                    if other.0.is_nan() {
                        Ordering::Equal
                    } else {
                        Ordering::Less
                    }
                } else {
                    Ordering::Greater
                }
            }
        }
    }
}

impl OrderedF64 {
    /// Extract the inner `f64` value.
    pub fn into_inner(self) -> f64 {
        self.0
    }
}

/// Render a float the way it appears in materialised proposition names:
/// always with a decimal point.
pub fn render_float(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

/// A set value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetValue {
    /// The polymorphic empty set, flavor resolved contextually.
    Empty,
    /// Set of integers.
    Ints(BTreeSet<i64>),
    /// Set of floats.
    Floats(BTreeSet<OrderedF64>),
    /// Set of proposition names.
    Props(BTreeSet<String>),
}

impl SetValue {
    /// Human-readable flavor name for error messages.
    pub fn flavor_name(&self) -> &'static str {
        match self {
            SetValue::Empty => "empty set",
            SetValue::Ints(_) => "int set",
            SetValue::Floats(_) => "float set",
            SetValue::Props(_) => "proposition set",
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            SetValue::Empty => 0,
            SetValue::Ints(s) => s.len(),
            SetValue::Floats(s) => s.len(),
            SetValue::Props(s) => s.len(),
        }
    }

    /// Check whether the set has no elements. A typed set with no elements
    /// is as empty as `Empty` itself.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build an integer set from an iterator.
    pub fn ints(iter: impl IntoIterator<Item = i64>) -> Self {
        SetValue::Ints(iter.into_iter().collect())
    }

    /// Build a float set from an iterator.
    pub fn floats(iter: impl IntoIterator<Item = f64>) -> Self {
        SetValue::Floats(iter.into_iter().map(OrderedF64).collect())
    }

    /// Build a proposition set from an iterator.
    pub fn props(iter: impl IntoIterator<Item = String>) -> Self {
        SetValue::Props(iter.into_iter().collect())
    }

    /// Integer range `[lo..hi]`, inclusive on both ends, empty when `lo > hi`.
    pub fn int_range(lo: i64, hi: i64) -> Self {
        SetValue::Ints((lo..=hi).collect())
    }

    /// Float range `[lo..hi]`: `lo, lo+1, …, lo+⌊hi−lo⌋`, empty when `lo > hi`.
    pub fn float_range(lo: f64, hi: f64) -> Self {
        if hi < lo {
            return SetValue::Floats(BTreeSet::new());
        }
        let steps = (hi - lo).floor() as i64;
        SetValue::floats((0..=steps).map(|i| lo + i as f64))
    }

    /// Promote `Empty` operands against a sibling so both share a flavor.
    ///
    /// Two `Empty` operands promote to the integer flavor; the result of any
    /// operation on them is the same for every choice.
    pub fn promote(a: SetValue, b: SetValue) -> (SetValue, SetValue) {
        match (&a, &b) {
            (SetValue::Empty, SetValue::Empty) => (
                SetValue::Ints(BTreeSet::new()),
                SetValue::Ints(BTreeSet::new()),
            ),
            (SetValue::Empty, _) => (b.empty_of_same_flavor(), b),
            (_, SetValue::Empty) => {
                let empty = a.empty_of_same_flavor();
                (a, empty)
            }
            _ => (a, b),
        }
    }

    fn empty_of_same_flavor(&self) -> SetValue {
        match self {
            SetValue::Empty => SetValue::Empty,
            SetValue::Ints(_) => SetValue::Ints(BTreeSet::new()),
            SetValue::Floats(_) => SetValue::Floats(BTreeSet::new()),
            SetValue::Props(_) => SetValue::Props(BTreeSet::new()),
        }
    }

    /// Set union. `None` when the flavors differ.
    pub fn union(self, other: SetValue) -> Option<SetValue> {
        let (a, b) = SetValue::promote(self, other);
        match (a, b) {
            (SetValue::Ints(x), SetValue::Ints(y)) => {
                Some(SetValue::Ints(x.union(&y).copied().collect()))
            }
            (SetValue::Floats(x), SetValue::Floats(y)) => {
                Some(SetValue::Floats(x.union(&y).copied().collect()))
            }
            (SetValue::Props(x), SetValue::Props(y)) => {
                Some(SetValue::Props(x.union(&y).cloned().collect()))
            }
            _ => None,
        }
    }

    /// Set intersection. `None` when the flavors differ.
    pub fn inter(self, other: SetValue) -> Option<SetValue> {
        let (a, b) = SetValue::promote(self, other);
        match (a, b) {
            (SetValue::Ints(x), SetValue::Ints(y)) => {
                Some(SetValue::Ints(x.intersection(&y).copied().collect()))
            }
            (SetValue::Floats(x), SetValue::Floats(y)) => {
                Some(SetValue::Floats(x.intersection(&y).copied().collect()))
            }
            (SetValue::Props(x), SetValue::Props(y)) => {
                Some(SetValue::Props(x.intersection(&y).cloned().collect()))
            }
            _ => None,
        }
    }

    /// Set difference (elements of `self` not in `other`). `None` when the
    /// flavors differ.
    pub fn diff(self, other: SetValue) -> Option<SetValue> {
        let (a, b) = SetValue::promote(self, other);
        match (a, b) {
            (SetValue::Ints(x), SetValue::Ints(y)) => {
                Some(SetValue::Ints(x.difference(&y).copied().collect()))
            }
            (SetValue::Floats(x), SetValue::Floats(y)) => {
                Some(SetValue::Floats(x.difference(&y).copied().collect()))
            }
            (SetValue::Props(x), SetValue::Props(y)) => {
                Some(SetValue::Props(x.difference(&y).cloned().collect()))
            }
            _ => None,
        }
    }

    /// Subset test. `None` when the flavors differ.
    pub fn subset(self, other: SetValue) -> Option<bool> {
        let (a, b) = SetValue::promote(self, other);
        match (a, b) {
            (SetValue::Ints(x), SetValue::Ints(y)) => Some(x.is_subset(&y)),
            (SetValue::Floats(x), SetValue::Floats(y)) => Some(x.is_subset(&y)),
            (SetValue::Props(x), SetValue::Props(y)) => Some(x.is_subset(&y)),
            _ => None,
        }
    }

    /// Structural equality with empty-set promotion.
    pub fn set_eq(self, other: SetValue) -> bool {
        let (a, b) = SetValue::promote(self, other);
        a == b
    }
}

impl fmt::Display for SetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        match self {
            SetValue::Empty => {}
            SetValue::Ints(s) => {
                for (i, v) in s.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", v)?;
                }
            }
            SetValue::Floats(s) => {
                for (i, v) in s.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", render_float(v.0))?;
                }
            }
            SetValue::Props(s) => {
                for (i, v) in s.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", v)?;
                }
            }
        }
        write!(f, "]")
    }
}
