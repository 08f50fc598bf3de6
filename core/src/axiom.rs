//! Axioms and assertions built from the expression algebra.

use crate::error::ValidationError;
use crate::expr::{Concept, Operands, Role};
use crate::ident::Identifier;

/// A terminological axiom or an assertion about individuals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axiom {
    /// General concept inclusion `lhs ⊑ rhs`.
    ConceptInclusion {
        /// The subsumed concept.
        lhs: Concept,
        /// The subsuming concept.
        rhs: Concept,
    },
    /// Equivalence of ≥ 2 concepts.
    ConceptEquivalence(Operands),
    /// Role inclusion `lhs ⊑ rhs`.
    RoleInclusion {
        /// The subsumed role.
        lhs: Role,
        /// The subsuming role.
        rhs: Role,
    },
    /// Concept membership assertion `individual : concept`.
    ConceptAssertion {
        /// The asserted individual.
        individual: Identifier,
        /// The concept it belongs to.
        concept: Concept,
    },
    /// Role membership assertion `(subject, object) : role`.
    RoleAssertion {
        /// The connecting role.
        role: Role,
        /// The source individual.
        subject: Identifier,
        /// The target individual.
        object: Identifier,
    },
}

impl Axiom {
    /// General concept inclusion `lhs ⊑ rhs`.
    #[must_use]
    pub fn concept_inclusion(lhs: Concept, rhs: Concept) -> Self {
        Axiom::ConceptInclusion { lhs, rhs }
    }

    /// Equivalence of the given concepts.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::BadArity`] when fewer than two concepts are
    /// supplied.
    pub fn concept_equivalence(concepts: Vec<Concept>) -> Result<Self, ValidationError> {
        match Operands::new(concepts) {
            Ok(concepts) => Ok(Axiom::ConceptEquivalence(concepts)),
            Err(ValidationError::BadArity { found, .. }) => Err(ValidationError::BadArity {
                operator: "equivalence",
                found,
            }),
            Err(other) => Err(other),
        }
    }

    /// Role inclusion `lhs ⊑ rhs`.
    #[must_use]
    pub fn role_inclusion(lhs: Role, rhs: Role) -> Self {
        Axiom::RoleInclusion { lhs, rhs }
    }

    /// Assertion `individual : concept`.
    #[must_use]
    pub fn concept_assertion(individual: impl Into<Identifier>, concept: Concept) -> Self {
        Axiom::ConceptAssertion {
            individual: individual.into(),
            concept,
        }
    }

    /// Assertion `(subject, object) : role`.
    #[must_use]
    pub fn role_assertion(
        role: Role,
        subject: impl Into<Identifier>,
        object: impl Into<Identifier>,
    ) -> Self {
        Axiom::RoleAssertion {
            role,
            subject: subject.into(),
            object: object.into(),
        }
    }

    /// Whether this axiom is terminological (TBox) rather than assertional
    /// (ABox).
    #[must_use]
    pub fn is_terminological(&self) -> bool {
        matches!(
            self,
            Axiom::ConceptInclusion { .. }
                | Axiom::ConceptEquivalence(_)
                | Axiom::RoleInclusion { .. }
        )
    }
}
