//! The flattened compilation unit.
//!
//! A [`Fragment`] holds everything the lowering pipeline and the backend
//! operate on: combinational statements in order, synchronous statements
//! grouped by clock-domain name, the set of owned specials, and the set of
//! declared clock domains. Fragments compose with `+`; merging preserves
//! every statement from both operands exactly once.

use crate::domain::ClockDomain;
use crate::signal::SignalId;
use crate::special::SpecialId;
use crate::stmt::{self, Statement};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Add;

/// A flattened compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Combinational statements, in order.
    pub comb: Vec<Statement>,
    /// Synchronous statements per clock-domain name, each list in order.
    pub sync: BTreeMap<String, Vec<Statement>>,
    /// Specials owned by this fragment.
    pub specials: BTreeSet<SpecialId>,
    /// Declared clock domains, kept sorted by name.
    pub clock_domains: Vec<ClockDomain>,
}

impl Fragment {
    /// Creates an empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a combinational statement.
    pub fn push_comb(&mut self, stmt: Statement) {
        self.comb.push(stmt);
    }

    /// Appends a synchronous statement to the named domain's list.
    pub fn push_sync(&mut self, domain: &str, stmt: Statement) {
        self.sync.entry(domain.to_owned()).or_default().push(stmt);
    }

    /// Declares a clock domain. A domain already declared under the same
    /// name is left untouched.
    pub fn add_domain(&mut self, domain: ClockDomain) {
        if self.domain(&domain.name).is_none() {
            self.clock_domains.push(domain);
            self.clock_domains.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }

    /// Looks up a declared clock domain by name.
    pub fn domain(&self, name: &str) -> Option<&ClockDomain> {
        self.clock_domains.iter().find(|cd| cd.name == name)
    }

    /// Returns the domain names referenced by synchronous statements but
    /// not declared, in name order.
    pub fn undeclared_domains(&self) -> Vec<String> {
        self.sync
            .keys()
            .filter(|name| self.domain(name.as_str()).is_none())
            .cloned()
            .collect()
    }

    /// Collects every signal written anywhere in the fragment.
    pub fn written_signals(&self) -> BTreeSet<SignalId> {
        let mut out = BTreeSet::new();
        stmt::written_signals(&self.comb, &mut out);
        for stmts in self.sync.values() {
            stmt::written_signals(stmts, &mut out);
        }
        out
    }

    /// Collects every signal read anywhere in the fragment, including
    /// domain clocks and resets.
    pub fn read_signals(&self) -> BTreeSet<SignalId> {
        let mut out = BTreeSet::new();
        stmt::read_signals(&self.comb, &mut out);
        for stmts in self.sync.values() {
            stmt::read_signals(stmts, &mut out);
        }
        for cd in &self.clock_domains {
            out.insert(cd.clock);
            if let Some(rst) = cd.reset {
                out.insert(rst);
            }
        }
        out
    }
}

impl Add for Fragment {
    type Output = Fragment;

    fn add(mut self, other: Fragment) -> Fragment {
        self.comb.extend(other.comb);
        for (domain, stmts) in other.sync {
            self.sync.entry(domain).or_default().extend(stmts);
        }
        self.specials.extend(other.specials);
        for cd in other.clock_domains {
            self.add_domain(cd);
        }
        self
    }
}
