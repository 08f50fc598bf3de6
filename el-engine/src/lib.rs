//! Polynomial-time EL⊥ saturation engine.
//!
//! This crate is the lightweight engine behind the `dl-lib` reasoner
//! abstraction. It speaks its own native representation — interned
//! [`ClassId`]/[`RoleId`] numbers and the tiny [`ElConcept`] algebra of
//! atoms, conjunctions, and existential restrictions — and knows nothing
//! about the public DL algebra; the caller translates into native terms
//! before loading.
//!
//! Reasoning is completion-rule saturation: axioms are compiled to the EL
//! normal forms (`A ⊑ B`, `A₁ ⊓ A₂ ⊑ B`, `A ⊑ ∃r.B`, `∃r.A ⊑ B`, `r ⊑ s`)
//! with fresh-class introduction, then a worklist closes the subsumer sets
//! under the completion rules. Every named subsumption is read straight off
//! the saturated sets afterwards.
//!
//! # Example
//!
//! ```
//! use dl_lib_el_engine::{ElConcept, ElKnowledgeBase};
//!
//! let mut kb = ElKnowledgeBase::new();
//! let b = kb.class("B");
//! let d = kb.class("D");
//! kb.add_inclusion(ElConcept::Atom(b), ElConcept::Atom(d));
//!
//! let saturation = kb.saturate(None)?;
//! assert!(saturation.is_subsumed(b, d));
//! # Ok::<(), dl_lib_el_engine::BudgetExceeded>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

mod saturation;

pub use saturation::Saturation;

/// Interned class identifier.
///
/// `ClassId::TOP` and `ClassId::BOTTOM` are pre-interned in every knowledge
/// base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub(crate) u32);

impl ClassId {
    /// The universal class `⊤`.
    pub const TOP: ClassId = ClassId(0);
    /// The empty class `⊥`.
    pub const BOTTOM: ClassId = ClassId(1);

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Interned role identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoleId(pub(crate) u32);

impl RoleId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A native EL concept: atoms, n-ary conjunction, existential restriction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElConcept {
    /// An interned class (including `⊤` and `⊥`).
    Atom(ClassId),
    /// Conjunction over any number of operands.
    Conjunction(Vec<ElConcept>),
    /// Existential restriction `∃r.C`.
    Exists(RoleId, Box<ElConcept>),
}

/// The engine exhausted its time budget during saturation.
///
/// Non-fatal: the knowledge base is untouched and a later call may retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("saturation exceeded its time budget of {budget:?}")]
pub struct BudgetExceeded {
    /// The budget that was exceeded.
    pub budget: Duration,
}

/// An EL⊥ knowledge base under construction: interners plus told axioms.
///
/// Cheap to clone; queries over hypothetical additions (fresh query classes,
/// extra definitions) work on a clone so the base stays pristine.
#[derive(Debug, Clone)]
pub struct ElKnowledgeBase {
    class_labels: Vec<String>,
    class_index: HashMap<String, ClassId>,
    role_labels: Vec<String>,
    role_index: HashMap<String, RoleId>,
    inclusions: Vec<(ElConcept, ElConcept)>,
    role_inclusions: Vec<(RoleId, RoleId)>,
}

impl ElKnowledgeBase {
    /// An empty knowledge base with `⊤` and `⊥` pre-interned.
    #[must_use]
    pub fn new() -> Self {
        let mut kb = ElKnowledgeBase {
            class_labels: Vec::new(),
            class_index: HashMap::new(),
            role_labels: Vec::new(),
            role_index: HashMap::new(),
            inclusions: Vec::new(),
            role_inclusions: Vec::new(),
        };
        let top = kb.class("⊤");
        let bottom = kb.class("⊥");
        debug_assert_eq!(top, ClassId::TOP);
        debug_assert_eq!(bottom, ClassId::BOTTOM);
        kb
    }

    /// Interns a class by label, returning the existing id on a repeat.
    pub fn class(&mut self, label: &str) -> ClassId {
        if let Some(&id) = self.class_index.get(label) {
            return id;
        }
        let id = ClassId(self.class_labels.len() as u32);
        self.class_labels.push(label.to_owned());
        self.class_index.insert(label.to_owned(), id);
        id
    }

    /// Allocates a class that is never returned by [`class`](Self::class),
    /// whatever its label. Used for individuals and internalized query
    /// concepts.
    pub fn fresh_class(&mut self, hint: &str) -> ClassId {
        let id = ClassId(self.class_labels.len() as u32);
        self.class_labels.push(format!("_:{hint}#{}", id.0));
        id
    }

    /// Interns a role by label.
    pub fn role(&mut self, label: &str) -> RoleId {
        if let Some(&id) = self.role_index.get(label) {
            return id;
        }
        let id = RoleId(self.role_labels.len() as u32);
        self.role_labels.push(label.to_owned());
        self.role_index.insert(label.to_owned(), id);
        id
    }

    /// The label a class was interned under.
    #[must_use]
    pub fn class_label(&self, id: ClassId) -> &str {
        &self.class_labels[id.index()]
    }

    /// Number of interned classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.class_labels.len()
    }

    /// Number of interned roles.
    #[must_use]
    pub fn role_count(&self) -> usize {
        self.role_labels.len()
    }

    /// Adds the told inclusion `lhs ⊑ rhs`.
    pub fn add_inclusion(&mut self, lhs: ElConcept, rhs: ElConcept) {
        self.inclusions.push((lhs, rhs));
    }

    /// Adds `a ≡ b` as two inclusions.
    pub fn add_equivalence(&mut self, a: ElConcept, b: ElConcept) {
        self.inclusions.push((a.clone(), b.clone()));
        self.inclusions.push((b, a));
    }

    /// Adds the role inclusion `sub ⊑ sup`.
    pub fn add_role_inclusion(&mut self, sub: RoleId, sup: RoleId) {
        self.role_inclusions.push((sub, sup));
    }

    pub(crate) fn inclusions(&self) -> &[(ElConcept, ElConcept)] {
        &self.inclusions
    }

    pub(crate) fn role_inclusions(&self) -> &[(RoleId, RoleId)] {
        &self.role_inclusions
    }

    /// Compiles to normal forms and saturates under the completion rules.
    ///
    /// The knowledge base itself is left untouched, so saturation may be
    /// re-run (for example after a timeout with a larger budget).
    ///
    /// # Errors
    ///
    /// Returns [`BudgetExceeded`] when `budget` elapses before the worklist
    /// drains.
    pub fn saturate(&self, budget: Option<Duration>) -> Result<Saturation, BudgetExceeded> {
        saturation::saturate(self, budget)
    }
}

impl Default for ElKnowledgeBase {
    fn default() -> Self {
        ElKnowledgeBase::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let mut kb = ElKnowledgeBase::new();
        let a = kb.class("A");
        assert_eq!(kb.class("A"), a);
        assert_ne!(kb.class("B"), a);
        assert_eq!(kb.class_label(a), "A");
    }

    #[test]
    fn fresh_classes_do_not_collide_with_interned_ones() {
        let mut kb = ElKnowledgeBase::new();
        let a = kb.class("A");
        let fresh = kb.fresh_class("A");
        assert_ne!(a, fresh);
        assert_eq!(kb.class("A"), a);
    }

    #[test]
    fn top_and_bottom_are_preinterned() {
        let mut kb = ElKnowledgeBase::new();
        assert_eq!(kb.class("⊤"), ClassId::TOP);
        assert_eq!(kb.class("⊥"), ClassId::BOTTOM);
    }
}
