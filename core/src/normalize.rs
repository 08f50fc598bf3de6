//! Binary-conjunction canonicalization.
//!
//! Rewrites every n-ary conjunction and disjunction into a right-nested
//! binary chain, recursively through negations, restriction fillers,
//! equivalence member lists, and both sides of every axiom. Operand order is
//! the binding contract: no reordering, no deduplication. The rewrite is
//! pure, total over well-formed ontologies, idempotent, and per-axiom local
//! (no axiom's result depends on any other axiom).

use crate::axiom::Axiom;
use crate::expr::{Concept, Operands};
use crate::ontology::Ontology;

/// Returns a sibling ontology in strict binary form.
///
/// The name and declared identifier sets carry over unchanged; axiom order
/// is preserved.
#[must_use]
pub fn to_binary(ontology: &Ontology) -> Ontology {
    let axioms = ontology.axioms().iter().map(binary_axiom).collect();
    ontology.with_axioms(axioms)
}

/// Rewrites one concept expression into strict binary form.
#[must_use]
pub fn to_binary_concept(concept: &Concept) -> Concept {
    match concept {
        Concept::Top | Concept::Bottom | Concept::Name(_) | Concept::OneOf(_) => concept.clone(),
        Concept::Not(inner) => Concept::Not(Box::new(to_binary_concept(inner))),
        Concept::And(operands) => fold_right(operands, Concept::And),
        Concept::Or(operands) => fold_right(operands, Concept::Or),
        Concept::SomeValues(role, filler) => {
            Concept::SomeValues(role.clone(), Box::new(to_binary_concept(filler)))
        }
        Concept::AllValues(role, filler) => {
            Concept::AllValues(role.clone(), Box::new(to_binary_concept(filler)))
        }
    }
}

/// Whether every conjunction and disjunction in the ontology has exactly two
/// operands, at every nesting depth.
#[must_use]
pub fn is_binary(ontology: &Ontology) -> bool {
    ontology.axioms().iter().all(|axiom| match axiom {
        Axiom::ConceptInclusion { lhs, rhs } => is_binary_concept(lhs) && is_binary_concept(rhs),
        Axiom::ConceptEquivalence(members) => members.iter().all(is_binary_concept),
        Axiom::ConceptAssertion { concept, .. } => is_binary_concept(concept),
        Axiom::RoleInclusion { .. } | Axiom::RoleAssertion { .. } => true,
    })
}

/// Whether every conjunction and disjunction in the expression has exactly
/// two operands.
#[must_use]
pub fn is_binary_concept(concept: &Concept) -> bool {
    match concept {
        Concept::Top | Concept::Bottom | Concept::Name(_) | Concept::OneOf(_) => true,
        Concept::Not(inner) => is_binary_concept(inner),
        Concept::And(operands) | Concept::Or(operands) => {
            operands.len() == 2 && operands.iter().all(is_binary_concept)
        }
        Concept::SomeValues(_, filler) | Concept::AllValues(_, filler) => is_binary_concept(filler),
    }
}

fn binary_axiom(axiom: &Axiom) -> Axiom {
    match axiom {
        Axiom::ConceptInclusion { lhs, rhs } => Axiom::ConceptInclusion {
            lhs: to_binary_concept(lhs),
            rhs: to_binary_concept(rhs),
        },
        // Equivalence member lists are not conjunctions: the list keeps its
        // arity, only the members are rewritten.
        Axiom::ConceptEquivalence(members) => {
            Axiom::ConceptEquivalence(members.map(to_binary_concept))
        }
        Axiom::ConceptAssertion {
            individual,
            concept,
        } => Axiom::ConceptAssertion {
            individual: individual.clone(),
            concept: to_binary_concept(concept),
        },
        Axiom::RoleInclusion { .. } | Axiom::RoleAssertion { .. } => axiom.clone(),
    }
}

/// `[c1, c2, …, cn]` → `c1 ∘ (c2 ∘ (… ∘ cn))`, each operand rewritten first.
fn fold_right(operands: &Operands, node: fn(Operands) -> Concept) -> Concept {
    let mut rev = operands.iter().map(to_binary_concept).rev();
    // The arity invariant guarantees at least two operands.
    let mut acc = match rev.next() {
        Some(last) => last,
        None => return Concept::Top,
    };
    for operand in rev {
        acc = node(Operands::pair(operand, acc));
    }
    acc
}
