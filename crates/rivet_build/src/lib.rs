//! The embedded construction API.
//!
//! A [`ModuleBuilder`] accumulates the statements, specials, and clock
//! domains of one component, owns its children through explicit
//! [`add_submodule`](ModuleBuilder::add_submodule) registration, and
//! flattens the whole tree post-order into a single
//! [`Fragment`](rivet_ir::Fragment).
//!
//! Signals declared through a builder record an explicit construction
//! backtrace: the chain of owning builders from the root down to the
//! declaring one, each step carrying the name the next level was declared
//! under. The namer later derives flat identifiers from exactly this
//! chain, so no stack introspection or global registration is involved.

#![warn(missing_docs)]

use rivet_ir::{
    ClockDomain, Design, Fragment, SignalId, SignalSpec, SpecialId, Statement, TraceContext,
    TraceStep,
};
use std::collections::BTreeMap;

/// A single component under construction.
///
/// Builders form a tree: children are created with
/// [`ModuleBuilder::child`], which threads the parent's declaration path
/// down explicitly, and attached with
/// [`add_submodule`](ModuleBuilder::add_submodule).
#[derive(Debug)]
pub struct ModuleBuilder {
    type_name: String,
    instance: u32,
    prefix: Vec<TraceStep>,
    comb: Vec<Statement>,
    sync: BTreeMap<String, Vec<Statement>>,
    specials: Vec<SpecialId>,
    clock_domains: Vec<ClockDomain>,
    submodules: Vec<(String, ModuleBuilder)>,
}

impl ModuleBuilder {
    /// Creates a root builder.
    ///
    /// `type_name` identifies the component's kind (e.g. `"Counter"`); the
    /// design hands out a per-compilation instance number so the namer can
    /// tell two components of the same kind apart.
    pub fn new(design: &mut Design, type_name: &str) -> Self {
        Self {
            type_name: type_name.to_owned(),
            instance: design.next_instance_number(),
            prefix: Vec::new(),
            comb: Vec::new(),
            sync: BTreeMap::new(),
            specials: Vec::new(),
            clock_domains: Vec::new(),
            submodules: Vec::new(),
        }
    }

    /// Creates a child builder under `parent`, declared as `name`.
    ///
    /// The child's declaration path is the parent's path extended by one
    /// step; pass the same `name` to
    /// [`add_submodule`](ModuleBuilder::add_submodule) when attaching the
    /// finished child.
    pub fn child(parent: &ModuleBuilder, design: &mut Design, type_name: &str, name: &str) -> Self {
        let mut prefix = parent.prefix.clone();
        prefix.push(TraceStep::new(parent.context(), Some(name)));
        Self {
            type_name: type_name.to_owned(),
            instance: design.next_instance_number(),
            prefix,
            comb: Vec::new(),
            sync: BTreeMap::new(),
            specials: Vec::new(),
            clock_domains: Vec::new(),
            submodules: Vec::new(),
        }
    }

    /// Returns this builder's identity as a backtrace context.
    pub fn context(&self) -> TraceContext {
        TraceContext::Object {
            type_name: self.type_name.clone(),
            instance: self.instance,
        }
    }

    /// Declares a signal named `name` inside this component.
    ///
    /// The spec's backtrace is replaced by the builder's declaration path;
    /// an explicit name override set on the spec is preserved and bypasses
    /// the namer.
    pub fn signal(&self, design: &mut Design, name: &str, spec: SignalSpec) -> SignalId {
        let mut backtrace = self.prefix.clone();
        backtrace.push(TraceStep::new(self.context(), Some(name)));
        design.add_signal(spec.traced(backtrace))
    }

    /// Appends a combinational statement.
    pub fn comb(&mut self, stmt: Statement) {
        self.comb.push(stmt);
    }

    /// Appends a synchronous statement to the named clock domain.
    pub fn sync(&mut self, domain: &str, stmt: Statement) {
        self.sync.entry(domain.to_owned()).or_default().push(stmt);
    }

    /// Takes ownership of a special created in the design arena.
    pub fn add_special(&mut self, special: SpecialId) {
        self.specials.push(special);
    }

    /// Declares a clock domain owned by this component.
    pub fn add_clock_domain(&mut self, domain: ClockDomain) {
        self.clock_domains.push(domain);
    }

    /// Registers a finished child component under `name`.
    ///
    /// Children are kept in registration order; flattening visits them in
    /// that order, before this component's own statements.
    pub fn add_submodule(&mut self, name: &str, child: ModuleBuilder) {
        self.submodules.push((name.to_owned(), child));
    }

    /// Returns the names of registered children, in registration order.
    pub fn submodule_names(&self) -> Vec<&str> {
        self.submodules.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Flattens the builder tree, post-order, into one fragment.
    ///
    /// Children are flattened first, in registration order, then this
    /// component's own statements, specials, and domains are appended.
    pub fn finalize(self) -> Fragment {
        let mut result = Fragment::new();
        for (_, child) in self.submodules {
            result = result + child.finalize();
        }
        let mut own = Fragment::new();
        own.comb = self.comb;
        own.sync = self.sync;
        own.specials = self.specials.into_iter().collect();
        for cd in self.clock_domains {
            own.add_domain(cd);
        }
        result + own
    }
}
