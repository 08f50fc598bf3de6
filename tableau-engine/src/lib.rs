//! Full-expressivity tableau engine.
//!
//! The heavyweight engine behind the `dl-lib` reasoner abstraction. It
//! accepts the whole concept algebra — negation, disjunction, universal
//! restrictions, inverse roles, nominals — in its own native representation
//! over interned ids, and decides knowledge-base consistency with a tableau:
//! negation normal form, an internalized TBox constraint on every node,
//! expansion rules with backtracking over disjunction choices, and ancestor
//! subset blocking for termination.
//!
//! Every query a caller needs (concept satisfiability, subsumption, instance
//! checking) reduces to one consistency check of a clone of the base with an
//! extra assertion, so the public surface is deliberately small: build a
//! [`TableauKnowledgeBase`], then call
//! [`is_consistent`](TableauKnowledgeBase::is_consistent).
//!
//! # Example
//!
//! ```
//! use dl_lib_tableau_engine::{TConcept, TableauKnowledgeBase};
//!
//! let mut kb = TableauKnowledgeBase::new();
//! let a = kb.class("A");
//! let ind = kb.individual("x");
//! kb.add_concept_assertion(ind, TConcept::Name(a));
//! kb.add_concept_assertion(ind, TConcept::Not(Box::new(TConcept::Name(a))));
//! assert_eq!(kb.is_consistent(None), Ok(false));
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

mod expansion;

/// Interned class identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub(crate) u32);

/// Interned role name identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoleId(pub(crate) u32);

/// Interned individual identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndividualId(pub(crate) u32);

/// A role in direction-normalized form: a role name, possibly inverted.
///
/// Double inversion cancels at construction, so `TRole` is its own normal
/// form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TRole {
    /// The underlying role name.
    pub name: RoleId,
    /// Whether the role is traversed backwards.
    pub inverse: bool,
}

impl TRole {
    /// The forward role `name`.
    #[must_use]
    pub fn named(name: RoleId) -> Self {
        TRole {
            name,
            inverse: false,
        }
    }

    /// The same role, traversed the other way.
    #[must_use]
    pub fn inverted(self) -> Self {
        TRole {
            name: self.name,
            inverse: !self.inverse,
        }
    }
}

/// A native concept over interned ids. Not necessarily in negation normal
/// form; the engine normalizes internally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TConcept {
    /// The universal concept.
    Top,
    /// The empty concept.
    Bottom,
    /// An atomic class.
    Name(ClassId),
    /// The singleton concept of one individual.
    Nominal(IndividualId),
    /// Complement.
    Not(Box<TConcept>),
    /// Conjunction over any number of operands.
    And(Vec<TConcept>),
    /// Disjunction over any number of operands.
    Or(Vec<TConcept>),
    /// Existential restriction.
    Exists(TRole, Box<TConcept>),
    /// Universal restriction.
    ForAll(TRole, Box<TConcept>),
}

/// The engine exhausted its time budget mid-expansion.
///
/// Non-fatal: the knowledge base is untouched and a later call may retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("tableau expansion exceeded its time budget of {budget:?}")]
pub struct BudgetExceeded {
    /// The budget that was exceeded.
    pub budget: Duration,
}

/// A knowledge base under construction: interners, TBox, role hierarchy,
/// and ABox.
///
/// Cheap to clone; callers run hypothetical queries (extra assertions on a
/// fresh individual) against a clone so the base stays pristine.
#[derive(Debug, Clone, Default)]
pub struct TableauKnowledgeBase {
    class_labels: Vec<String>,
    class_index: HashMap<String, ClassId>,
    role_labels: Vec<String>,
    role_index: HashMap<String, RoleId>,
    individual_labels: Vec<String>,
    individual_index: HashMap<String, IndividualId>,
    individual_anonymous: Vec<bool>,
    gcis: Vec<(TConcept, TConcept)>,
    role_inclusions: Vec<(TRole, TRole)>,
    concept_assertions: Vec<(IndividualId, TConcept)>,
    role_assertions: Vec<(TRole, IndividualId, IndividualId)>,
}

impl TableauKnowledgeBase {
    /// An empty knowledge base.
    #[must_use]
    pub fn new() -> Self {
        TableauKnowledgeBase::default()
    }

    /// Interns a class by label.
    pub fn class(&mut self, label: &str) -> ClassId {
        if let Some(&id) = self.class_index.get(label) {
            return id;
        }
        let id = ClassId(self.class_labels.len() as u32);
        self.class_labels.push(label.to_owned());
        self.class_index.insert(label.to_owned(), id);
        id
    }

    /// Interns a role name by label.
    pub fn role(&mut self, label: &str) -> RoleId {
        if let Some(&id) = self.role_index.get(label) {
            return id;
        }
        let id = RoleId(self.role_labels.len() as u32);
        self.role_labels.push(label.to_owned());
        self.role_index.insert(label.to_owned(), id);
        id
    }

    /// Interns an individual by label.
    pub fn individual(&mut self, label: &str) -> IndividualId {
        if let Some(&id) = self.individual_index.get(label) {
            return id;
        }
        let id = IndividualId(self.individual_labels.len() as u32);
        self.individual_labels.push(label.to_owned());
        self.individual_index.insert(label.to_owned(), id);
        self.individual_anonymous.push(false);
        id
    }

    /// Allocates an anonymous individual never returned by
    /// [`individual`](Self::individual), whatever its label. Anonymous
    /// individuals are plain witnesses: they carry no nominal identity and
    /// may coincide with any named individual. Used for query witnesses.
    pub fn fresh_individual(&mut self, hint: &str) -> IndividualId {
        let id = IndividualId(self.individual_labels.len() as u32);
        self.individual_labels.push(format!("_:{hint}#{}", id.0));
        self.individual_anonymous.push(true);
        id
    }

    pub(crate) fn is_anonymous(&self, individual: IndividualId) -> bool {
        self.individual_anonymous[individual.0 as usize]
    }

    pub(crate) fn role_count(&self) -> usize {
        self.role_labels.len()
    }

    /// Number of interned individuals.
    #[must_use]
    pub fn individual_count(&self) -> usize {
        self.individual_labels.len()
    }

    /// Adds the general concept inclusion `lhs ⊑ rhs`.
    pub fn add_gci(&mut self, lhs: TConcept, rhs: TConcept) {
        self.gcis.push((lhs, rhs));
    }

    /// Adds the role inclusion `sub ⊑ sup` (its inverse direction is
    /// implied).
    pub fn add_role_inclusion(&mut self, sub: TRole, sup: TRole) {
        self.role_inclusions.push((sub, sup));
    }

    /// Asserts `concept(individual)`.
    pub fn add_concept_assertion(&mut self, individual: IndividualId, concept: TConcept) {
        self.concept_assertions.push((individual, concept));
    }

    /// Asserts `role(subject, object)`.
    pub fn add_role_assertion(&mut self, role: TRole, subject: IndividualId, object: IndividualId) {
        self.role_assertions.push((role, subject, object));
    }

    pub(crate) fn gcis(&self) -> &[(TConcept, TConcept)] {
        &self.gcis
    }

    pub(crate) fn role_inclusions(&self) -> &[(TRole, TRole)] {
        &self.role_inclusions
    }

    pub(crate) fn concept_assertions(&self) -> &[(IndividualId, TConcept)] {
        &self.concept_assertions
    }

    pub(crate) fn role_assertions(&self) -> &[(TRole, IndividualId, IndividualId)] {
        &self.role_assertions
    }

    /// Decides consistency of the knowledge base.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetExceeded`] when `budget` elapses before the tableau
    /// closes or completes.
    pub fn is_consistent(&self, budget: Option<Duration>) -> Result<bool, BudgetExceeded> {
        expansion::is_consistent(self, budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_inversion_cancels() {
        let r = TRole::named(RoleId(0));
        assert_eq!(r.inverted().inverted(), r);
        assert_ne!(r.inverted(), r);
    }

    #[test]
    fn interning_is_stable() {
        let mut kb = TableauKnowledgeBase::new();
        let a = kb.class("A");
        assert_eq!(kb.class("A"), a);
        let x = kb.individual("x");
        assert_eq!(kb.individual("x"), x);
        assert_ne!(kb.fresh_individual("x"), x);
    }
}
