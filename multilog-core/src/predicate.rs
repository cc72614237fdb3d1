//! Inequality predicates for event-gated logging
//!
//! A fixed mapping from inequality symbol to a binary boolean function over
//! `(reading, comparator)`. Pure and stateless, so a single table is shared
//! by every sensor without synchronization. The symbol set is carried by
//! [`SYMBOL_TABLE`] rather than scattered through parsing code; `!=` is
//! supported alongside the classic five.

use crate::errors::{SensorError, SensorResult};

/// A binary comparison applied to `(reading, comparator)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Inequality {
    /// `reading = comparator`
    Eq,
    /// `reading != comparator`
    Ne,
    /// `reading > comparator`
    Gt,
    /// `reading < comparator`
    Lt,
    /// `reading >= comparator`
    Ge,
    /// `reading <= comparator`
    Le,
}

/// The full symbol table, in lookup order.
pub const SYMBOL_TABLE: &[(&str, Inequality)] = &[
    ("=", Inequality::Eq),
    ("!=", Inequality::Ne),
    (">", Inequality::Gt),
    ("<", Inequality::Lt),
    (">=", Inequality::Ge),
    ("<=", Inequality::Le),
];

impl Inequality {
    /// Look a symbol up in [`SYMBOL_TABLE`].
    ///
    /// Anything outside the table fails with
    /// [`SensorError::UnknownPredicate`].
    pub fn parse(symbol: &str) -> SensorResult<Self> {
        SYMBOL_TABLE
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, inequality)| *inequality)
            .ok_or(SensorError::UnknownPredicate)
    }

    /// The symbol this predicate was parsed from.
    pub const fn symbol(&self) -> &'static str {
        match self {
            Inequality::Eq => "=",
            Inequality::Ne => "!=",
            Inequality::Gt => ">",
            Inequality::Lt => "<",
            Inequality::Ge => ">=",
            Inequality::Le => "<=",
        }
    }

    /// Apply the predicate to a reading and its comparator.
    pub fn evaluate(&self, reading: f64, comparator: f64) -> bool {
        match self {
            Inequality::Eq => reading == comparator,
            Inequality::Ne => reading != comparator,
            Inequality::Gt => reading > comparator,
            Inequality::Lt => reading < comparator,
            Inequality::Ge => reading >= comparator,
            Inequality::Le => reading <= comparator,
        }
    }
}

impl core::fmt::Display for Inequality {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_table_entry() {
        for (symbol, inequality) in SYMBOL_TABLE {
            assert_eq!(Inequality::parse(symbol), Ok(*inequality));
            assert_eq!(inequality.symbol(), *symbol);
        }
    }

    #[test]
    fn rejects_unknown_symbols() {
        assert_eq!(Inequality::parse("=="), Err(SensorError::UnknownPredicate));
        assert_eq!(Inequality::parse("~"), Err(SensorError::UnknownPredicate));
        assert_eq!(Inequality::parse(""), Err(SensorError::UnknownPredicate));
    }

    #[test]
    fn evaluation_matches_symbol_semantics() {
        assert!(Inequality::Gt.evaluate(15.0, 10.0));
        assert!(!Inequality::Gt.evaluate(5.0, 10.0));
        assert!(!Inequality::Gt.evaluate(10.0, 10.0));

        assert!(Inequality::Ge.evaluate(10.0, 10.0));
        assert!(Inequality::Le.evaluate(10.0, 10.0));
        assert!(Inequality::Lt.evaluate(-1.0, 0.0));
        assert!(Inequality::Eq.evaluate(2.5, 2.5));
        assert!(Inequality::Ne.evaluate(2.5, 2.0));
    }
}
