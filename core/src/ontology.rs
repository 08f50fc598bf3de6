//! The ontology container: a named, immutable set of axioms plus the
//! identifier sets it declares.

use std::collections::BTreeSet;

use crate::axiom::Axiom;
use crate::error::{IdentifierKind, ValidationError};
use crate::expr::{Concept, Operands, Role};
use crate::ident::Identifier;
use crate::normalize;

/// A named set of axioms over declared concept, role, and individual names.
///
/// Ontologies are value-semantics containers: once built they are immutable,
/// and every transformation (normalization included) returns a new
/// `Ontology`, so no caller ever observes a partially-transformed one. They
/// are freely shareable across threads for concurrent read.
///
/// Referential completeness is established at construction: every identifier
/// referenced by an axiom belongs to the matching declared set, so queries
/// never trip over an undeclared name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Ontology {
    name: String,
    axioms: Vec<Axiom>,
    concepts: BTreeSet<Identifier>,
    roles: BTreeSet<Identifier>,
    individuals: BTreeSet<Identifier>,
}

impl Ontology {
    /// Builds an ontology from axioms and declared identifier sets.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UndeclaredIdentifier`] naming the first
    /// axiom that references an identifier missing from its declared set.
    pub fn build<C, R, I>(
        name: impl Into<String>,
        axioms: Vec<Axiom>,
        concepts: C,
        roles: R,
        individuals: I,
    ) -> Result<Self, ValidationError>
    where
        C: IntoIterator,
        C::Item: Into<Identifier>,
        R: IntoIterator,
        R::Item: Into<Identifier>,
        I: IntoIterator,
        I::Item: Into<Identifier>,
    {
        let ontology = Ontology {
            name: name.into(),
            axioms,
            concepts: concepts.into_iter().map(Into::into).collect(),
            roles: roles.into_iter().map(Into::into).collect(),
            individuals: individuals.into_iter().map(Into::into).collect(),
        };
        ontology.check_references()?;
        Ok(ontology)
    }

    /// Starts a chainable builder.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> OntologyBuilder {
        OntologyBuilder {
            name: name.into(),
            axioms: Vec::new(),
            concepts: BTreeSet::new(),
            roles: BTreeSet::new(),
            individuals: BTreeSet::new(),
        }
    }

    /// The ontology's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All axioms, in insertion order.
    #[must_use]
    pub fn axioms(&self) -> &[Axiom] {
        &self.axioms
    }

    /// Declared concept names.
    #[must_use]
    pub fn declared_concepts(&self) -> &BTreeSet<Identifier> {
        &self.concepts
    }

    /// Declared role names.
    #[must_use]
    pub fn declared_roles(&self) -> &BTreeSet<Identifier> {
        &self.roles
    }

    /// Declared individual names.
    #[must_use]
    pub fn declared_individuals(&self) -> &BTreeSet<Identifier> {
        &self.individuals
    }

    /// Terminological axioms (concept and role inclusions, equivalences).
    pub fn tbox(&self) -> impl Iterator<Item = &Axiom> + '_ {
        self.axioms.iter().filter(|a| a.is_terminological())
    }

    /// Assertional axioms (concept and role assertions).
    pub fn abox(&self) -> impl Iterator<Item = &Axiom> + '_ {
        self.axioms.iter().filter(|a| !a.is_terminological())
    }

    /// All general concept inclusions, as `(lhs, rhs)` pairs.
    pub fn concept_inclusions(&self) -> impl Iterator<Item = (&Concept, &Concept)> {
        self.axioms.iter().filter_map(|a| match a {
            Axiom::ConceptInclusion { lhs, rhs } => Some((lhs, rhs)),
            _ => None,
        })
    }

    /// All concept equivalences, as their member lists.
    pub fn concept_equivalences(&self) -> impl Iterator<Item = &Operands> {
        self.axioms.iter().filter_map(|a| match a {
            Axiom::ConceptEquivalence(members) => Some(members),
            _ => None,
        })
    }

    /// All role inclusions, as `(lhs, rhs)` pairs.
    pub fn role_inclusions(&self) -> impl Iterator<Item = (&Role, &Role)> {
        self.axioms.iter().filter_map(|a| match a {
            Axiom::RoleInclusion { lhs, rhs } => Some((lhs, rhs)),
            _ => None,
        })
    }

    /// All concept assertions, as `(individual, concept)` pairs.
    pub fn concept_assertions(&self) -> impl Iterator<Item = (&Identifier, &Concept)> {
        self.axioms.iter().filter_map(|a| match a {
            Axiom::ConceptAssertion {
                individual,
                concept,
            } => Some((individual, concept)),
            _ => None,
        })
    }

    /// All role assertions, as `(role, subject, object)` triples.
    pub fn role_assertions(&self) -> impl Iterator<Item = (&Role, &Identifier, &Identifier)> {
        self.axioms.iter().filter_map(|a| match a {
            Axiom::RoleAssertion {
                role,
                subject,
                object,
            } => Some((role, subject, object)),
            _ => None,
        })
    }

    /// Every distinct concept subexpression occurring anywhere in the
    /// axioms, in deterministic (structural) order.
    #[must_use]
    pub fn sub_concepts(&self) -> BTreeSet<&Concept> {
        let mut out = BTreeSet::new();
        for axiom in &self.axioms {
            for_each_concept(axiom, &mut |c| collect_sub_concepts(c, &mut out));
        }
        out
    }

    /// Every atomic concept name occurring in the axioms, in deterministic
    /// order.
    #[must_use]
    pub fn concept_names(&self) -> BTreeSet<&Identifier> {
        let mut out = BTreeSet::new();
        for axiom in &self.axioms {
            for_each_concept(axiom, &mut |c| collect_concept_names(c, &mut out));
        }
        out
    }

    /// Returns a sibling ontology with every n-ary conjunction and
    /// disjunction rewritten into right-nested binary form.
    ///
    /// See [`normalize::to_binary`] for the full contract.
    #[must_use]
    pub fn to_binary(&self) -> Ontology {
        normalize::to_binary(self)
    }

    /// Internal constructor for transformations that preserve the declared
    /// sets and cannot introduce new identifier references.
    pub(crate) fn with_axioms(&self, axioms: Vec<Axiom>) -> Ontology {
        Ontology {
            name: self.name.clone(),
            axioms,
            concepts: self.concepts.clone(),
            roles: self.roles.clone(),
            individuals: self.individuals.clone(),
        }
    }

    fn check_references(&self) -> Result<(), ValidationError> {
        for (index, axiom) in self.axioms.iter().enumerate() {
            self.check_axiom(axiom, index)?;
        }
        Ok(())
    }

    fn check_axiom(&self, axiom: &Axiom, index: usize) -> Result<(), ValidationError> {
        match axiom {
            Axiom::ConceptInclusion { lhs, rhs } => {
                self.check_concept(lhs, index)?;
                self.check_concept(rhs, index)
            }
            Axiom::ConceptEquivalence(members) => {
                members.iter().try_for_each(|c| self.check_concept(c, index))
            }
            Axiom::RoleInclusion { lhs, rhs } => {
                self.check_role(lhs, index)?;
                self.check_role(rhs, index)
            }
            Axiom::ConceptAssertion {
                individual,
                concept,
            } => {
                self.check_individual(individual, index)?;
                self.check_concept(concept, index)
            }
            Axiom::RoleAssertion {
                role,
                subject,
                object,
            } => {
                self.check_role(role, index)?;
                self.check_individual(subject, index)?;
                self.check_individual(object, index)
            }
        }
    }

    fn check_concept(&self, concept: &Concept, index: usize) -> Result<(), ValidationError> {
        match concept {
            Concept::Top | Concept::Bottom => Ok(()),
            Concept::Name(id) => {
                if self.concepts.contains(id) {
                    Ok(())
                } else {
                    Err(ValidationError::UndeclaredIdentifier {
                        identifier: id.clone(),
                        kind: IdentifierKind::Concept,
                        axiom_index: index,
                    })
                }
            }
            Concept::OneOf(id) => self.check_individual(id, index),
            Concept::Not(inner) => self.check_concept(inner, index),
            Concept::And(operands) | Concept::Or(operands) => operands
                .iter()
                .try_for_each(|c| self.check_concept(c, index)),
            Concept::SomeValues(role, filler) | Concept::AllValues(role, filler) => {
                self.check_role(role, index)?;
                self.check_concept(filler, index)
            }
        }
    }

    fn check_role(&self, role: &Role, index: usize) -> Result<(), ValidationError> {
        match role {
            Role::Name(id) => {
                if self.roles.contains(id) {
                    Ok(())
                } else {
                    Err(ValidationError::UndeclaredIdentifier {
                        identifier: id.clone(),
                        kind: IdentifierKind::Role,
                        axiom_index: index,
                    })
                }
            }
            Role::Inverse(inner) => self.check_role(inner, index),
        }
    }

    fn check_individual(&self, id: &Identifier, index: usize) -> Result<(), ValidationError> {
        if self.individuals.contains(id) {
            Ok(())
        } else {
            Err(ValidationError::UndeclaredIdentifier {
                identifier: id.clone(),
                kind: IdentifierKind::Individual,
                axiom_index: index,
            })
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Ontology {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Raw {
            name: String,
            axioms: Vec<Axiom>,
            concepts: BTreeSet<Identifier>,
            roles: BTreeSet<Identifier>,
            individuals: BTreeSet<Identifier>,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ontology::build(raw.name, raw.axioms, raw.concepts, raw.roles, raw.individuals)
            .map_err(serde::de::Error::custom)
    }
}

/// Chainable construction of an [`Ontology`].
///
/// Validation happens once, in [`OntologyBuilder::build`].
#[derive(Debug, Clone)]
pub struct OntologyBuilder {
    name: String,
    axioms: Vec<Axiom>,
    concepts: BTreeSet<Identifier>,
    roles: BTreeSet<Identifier>,
    individuals: BTreeSet<Identifier>,
}

impl OntologyBuilder {
    /// Declares a concept name.
    #[must_use]
    pub fn declare_concept(mut self, id: impl Into<Identifier>) -> Self {
        self.concepts.insert(id.into());
        self
    }

    /// Declares several concept names.
    #[must_use]
    pub fn declare_concepts<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Identifier>,
    {
        self.concepts.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Declares a role name.
    #[must_use]
    pub fn declare_role(mut self, id: impl Into<Identifier>) -> Self {
        self.roles.insert(id.into());
        self
    }

    /// Declares an individual name.
    #[must_use]
    pub fn declare_individual(mut self, id: impl Into<Identifier>) -> Self {
        self.individuals.insert(id.into());
        self
    }

    /// Appends an axiom.
    #[must_use]
    pub fn axiom(mut self, axiom: Axiom) -> Self {
        self.axioms.push(axiom);
        self
    }

    /// Validates and builds the ontology.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UndeclaredIdentifier`] naming the first
    /// axiom that references an undeclared identifier.
    pub fn build(self) -> Result<Ontology, ValidationError> {
        Ontology::build(
            self.name,
            self.axioms,
            self.concepts,
            self.roles,
            self.individuals,
        )
    }
}

fn for_each_concept<'a>(axiom: &'a Axiom, visit: &mut impl FnMut(&'a Concept)) {
    match axiom {
        Axiom::ConceptInclusion { lhs, rhs } => {
            visit(lhs);
            visit(rhs);
        }
        Axiom::ConceptEquivalence(members) => members.iter().for_each(visit),
        Axiom::ConceptAssertion { concept, .. } => visit(concept),
        Axiom::RoleInclusion { .. } | Axiom::RoleAssertion { .. } => {}
    }
}

fn collect_sub_concepts<'a>(concept: &'a Concept, out: &mut BTreeSet<&'a Concept>) {
    out.insert(concept);
    match concept {
        Concept::Top | Concept::Bottom | Concept::Name(_) | Concept::OneOf(_) => {}
        Concept::Not(inner) => collect_sub_concepts(inner, out),
        Concept::And(operands) | Concept::Or(operands) => {
            for operand in operands {
                collect_sub_concepts(operand, out);
            }
        }
        Concept::SomeValues(_, filler) | Concept::AllValues(_, filler) => {
            collect_sub_concepts(filler, out);
        }
    }
}

fn collect_concept_names<'a>(concept: &'a Concept, out: &mut BTreeSet<&'a Identifier>) {
    match concept {
        Concept::Name(id) => {
            out.insert(id);
        }
        Concept::Top | Concept::Bottom | Concept::OneOf(_) => {}
        Concept::Not(inner) => collect_concept_names(inner, out),
        Concept::And(operands) | Concept::Or(operands) => {
            for operand in operands {
                collect_concept_names(operand, out);
            }
        }
        Concept::SomeValues(_, filler) | Concept::AllValues(_, filler) => {
            collect_concept_names(filler, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IdentifierKind;

    fn pizza() -> Result<Ontology, ValidationError> {
        Ontology::builder("pizza")
            .declare_concepts(["Pizza", "Topping"])
            .declare_role("hasTopping")
            .declare_individual("margherita")
            .axiom(Axiom::concept_inclusion(
                Concept::name("Pizza"),
                Concept::some(Role::name("hasTopping"), Concept::name("Topping")),
            ))
            .axiom(Axiom::concept_assertion("margherita", Concept::name("Pizza")))
            .build()
    }

    #[test]
    fn builds_and_iterates() -> Result<(), ValidationError> {
        let ontology = pizza()?;
        assert_eq!(ontology.name(), "pizza");
        assert_eq!(ontology.axioms().len(), 2);
        assert_eq!(ontology.tbox().count(), 1);
        assert_eq!(ontology.abox().count(), 1);
        assert_eq!(ontology.concept_inclusions().count(), 1);
        // Views are restartable.
        assert_eq!(ontology.concept_inclusions().count(), 1);
        Ok(())
    }

    #[test]
    fn undeclared_concept_is_rejected_with_axiom_index() {
        let err = Ontology::builder("bad")
            .declare_concept("A")
            .axiom(Axiom::concept_inclusion(Concept::name("A"), Concept::Top))
            .axiom(Axiom::concept_inclusion(Concept::name("A"), Concept::name("B")))
            .build();
        assert_eq!(
            err,
            Err(ValidationError::UndeclaredIdentifier {
                identifier: Identifier::new("B"),
                kind: IdentifierKind::Concept,
                axiom_index: 1,
            })
        );
    }

    #[test]
    fn undeclared_role_inside_restriction_is_rejected() {
        let err = Ontology::builder("bad")
            .declare_concept("A")
            .axiom(Axiom::concept_inclusion(
                Concept::name("A"),
                Concept::some(Role::name("r"), Concept::Top),
            ))
            .build();
        assert!(matches!(
            err,
            Err(ValidationError::UndeclaredIdentifier {
                kind: IdentifierKind::Role,
                axiom_index: 0,
                ..
            })
        ));
    }

    #[test]
    fn nominal_references_the_individual_set() {
        let err = Ontology::builder("bad")
            .declare_concept("A")
            .axiom(Axiom::concept_inclusion(
                Concept::name("A"),
                Concept::one_of("ghost"),
            ))
            .build();
        assert!(matches!(
            err,
            Err(ValidationError::UndeclaredIdentifier {
                kind: IdentifierKind::Individual,
                ..
            })
        ));
    }

    #[test]
    fn sub_concepts_collapse_duplicates() -> Result<(), ValidationError> {
        let ontology = pizza()?;
        let subs = ontology.sub_concepts();
        // Pizza appears in both axioms but is collected once.
        let pizza_name = Concept::name("Pizza");
        assert_eq!(subs.iter().filter(|&&c| *c == pizza_name).count(), 1);
        assert!(subs.contains(&Concept::some(
            Role::name("hasTopping"),
            Concept::name("Topping"),
        )));
        Ok(())
    }

    #[test]
    fn concept_names_are_collected() -> Result<(), ValidationError> {
        let ontology = pizza()?;
        let names: Vec<&str> = ontology.concept_names().iter().map(|i| i.as_str()).collect();
        assert_eq!(names, ["Pizza", "Topping"]);
        Ok(())
    }
}
