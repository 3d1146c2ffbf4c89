//! Clock domains.

use crate::signal::SignalId;
use serde::{Deserialize, Serialize};

/// A named (clock, optional reset) pair.
///
/// Synchronous statements are grouped by the name of the domain they
/// execute in; a domain without a reset signal is "reset-less" and its
/// registers are only initialized for simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockDomain {
    /// The domain name (e.g. `"sys"`, `"io"`).
    pub name: String,
    /// The clock signal driving the domain.
    pub clock: SignalId,
    /// The synchronous reset signal, if the domain has one.
    pub reset: Option<SignalId>,
}

impl ClockDomain {
    /// Creates a clock domain with a reset.
    pub fn new(name: &str, clock: SignalId, reset: SignalId) -> Self {
        Self {
            name: name.to_owned(),
            clock,
            reset: Some(reset),
        }
    }

    /// Creates a reset-less clock domain.
    pub fn reset_less(name: &str, clock: SignalId) -> Self {
        Self {
            name: name.to_owned(),
            clock,
            reset: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::EntityId;

    #[test]
    fn with_and_without_reset() {
        let clk = SignalId::from_raw(0);
        let rst = SignalId::from_raw(1);
        let cd = ClockDomain::new("sys", clk, rst);
        assert_eq!(cd.reset, Some(rst));
        let cd = ClockDomain::reset_less("io", clk);
        assert!(cd.reset.is_none());
    }

    #[test]
    fn serde_roundtrip() {
        let cd = ClockDomain::new("sys", SignalId::from_raw(0), SignalId::from_raw(1));
        let json = serde_json::to_string(&cd).unwrap();
        let restored: ClockDomain = serde_json::from_str(&json).unwrap();
        assert_eq!(cd, restored);
    }
}
