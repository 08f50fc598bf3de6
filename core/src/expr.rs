//! The recursive concept and role expression algebra.
//!
//! Expressions are pure trees: structurally compared, freely cloned and
//! shared, never self-referential (the constructors only compose
//! already-built children, so no back-reference is expressible). The ≥ 2
//! arity invariant of conjunction and disjunction lives in the [`Operands`]
//! newtype — its operand list cannot be obtained except through a validating
//! constructor, so an ill-formed n-ary node is unrepresentable.

use std::ops::Deref;

use crate::error::ValidationError;
use crate::ident::Identifier;

/// An ordered operand list of length ≥ 2.
///
/// Backs [`Concept::And`], [`Concept::Or`], and
/// [`Axiom::ConceptEquivalence`](crate::Axiom::ConceptEquivalence).
/// Dereferences to `[Concept]`, so pattern matches over the enums can slice
/// into the operands directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<Concept>", into = "Vec<Concept>")
)]
pub struct Operands(Vec<Concept>);

impl Operands {
    /// Validates and wraps an operand list.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::BadArity`] when fewer than two operands are
    /// supplied.
    pub fn new(operands: Vec<Concept>) -> Result<Self, ValidationError> {
        if operands.len() < 2 {
            return Err(ValidationError::BadArity {
                operator: "operand list",
                found: operands.len(),
            });
        }
        Ok(Operands(operands))
    }

    /// Wraps exactly two operands. Infallible: the arity invariant holds by
    /// construction.
    #[must_use]
    pub fn pair(first: Concept, second: Concept) -> Self {
        Operands(vec![first, second])
    }

    /// Returns the operands as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Concept] {
        &self.0
    }

    /// Applies `f` to every operand, preserving order and arity.
    #[must_use]
    pub fn map(&self, f: impl FnMut(&Concept) -> Concept) -> Operands {
        Operands(self.0.iter().map(f).collect())
    }
}

impl Deref for Operands {
    type Target = [Concept];

    fn deref(&self) -> &[Concept] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Operands {
    type Item = &'a Concept;
    type IntoIter = std::slice::Iter<'a, Concept>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl TryFrom<Vec<Concept>> for Operands {
    type Error = ValidationError;

    fn try_from(operands: Vec<Concept>) -> Result<Self, Self::Error> {
        Operands::new(operands)
    }
}

impl From<Operands> for Vec<Concept> {
    fn from(operands: Operands) -> Self {
        operands.0
    }
}

/// A role expression: an atomic role name or the inverse of a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    /// An atomic role name.
    Name(Identifier),
    /// The inverse of a role expression.
    Inverse(Box<Role>),
}

impl Role {
    /// An atomic role.
    #[must_use]
    pub fn name(id: impl Into<Identifier>) -> Self {
        Role::Name(id.into())
    }

    /// The inverse of `role`.
    #[must_use]
    pub fn inverse(role: Role) -> Self {
        Role::Inverse(Box::new(role))
    }
}

/// A concept expression.
///
/// Consumers branch on the variant tag with an exhaustive `match`; there is
/// no runtime type discovery anywhere in the algebra.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Concept {
    /// The universal concept `⊤`.
    Top,
    /// The empty concept `⊥`.
    Bottom,
    /// An atomic concept name.
    Name(Identifier),
    /// Complement `¬C`.
    Not(Box<Concept>),
    /// Conjunction over ≥ 2 ordered operands.
    And(Operands),
    /// Disjunction over ≥ 2 ordered operands.
    Or(Operands),
    /// Existential restriction `∃r.C`.
    SomeValues(Role, Box<Concept>),
    /// Universal restriction `∀r.C`.
    AllValues(Role, Box<Concept>),
    /// Nominal `{a}` — the singleton concept of one individual.
    OneOf(Identifier),
}

impl Concept {
    /// An atomic concept.
    #[must_use]
    pub fn name(id: impl Into<Identifier>) -> Self {
        Concept::Name(id.into())
    }

    /// The complement `¬concept`.
    #[must_use]
    pub fn not(concept: Concept) -> Self {
        Concept::Not(Box::new(concept))
    }

    /// Conjunction of the given operands, in order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::BadArity`] when fewer than two operands are
    /// supplied.
    pub fn and(operands: Vec<Concept>) -> Result<Self, ValidationError> {
        match Operands::new(operands) {
            Ok(operands) => Ok(Concept::And(operands)),
            Err(ValidationError::BadArity { found, .. }) => Err(ValidationError::BadArity {
                operator: "conjunction",
                found,
            }),
            Err(other) => Err(other),
        }
    }

    /// Disjunction of the given operands, in order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::BadArity`] when fewer than two operands are
    /// supplied.
    pub fn or(operands: Vec<Concept>) -> Result<Self, ValidationError> {
        match Operands::new(operands) {
            Ok(operands) => Ok(Concept::Or(operands)),
            Err(ValidationError::BadArity { found, .. }) => Err(ValidationError::BadArity {
                operator: "disjunction",
                found,
            }),
            Err(other) => Err(other),
        }
    }

    /// Existential restriction `∃role.filler`.
    #[must_use]
    pub fn some(role: Role, filler: Concept) -> Self {
        Concept::SomeValues(role, Box::new(filler))
    }

    /// Universal restriction `∀role.filler`.
    #[must_use]
    pub fn all(role: Role, filler: Concept) -> Self {
        Concept::AllValues(role, Box::new(filler))
    }

    /// The nominal `{individual}`.
    #[must_use]
    pub fn one_of(individual: impl Into<Identifier>) -> Self {
        Concept::OneOf(individual.into())
    }
}
