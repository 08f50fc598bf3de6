//! The full-expressivity backend: translation into the tableau engine.
//!
//! The whole algebra translates losslessly, so loading never raises a
//! capability error. Every query reduces to one consistency check of a
//! cloned knowledge base with an extra assertion: satisfiability asserts the
//! concept at a fresh witness, subsumption refutes `sub ⊓ ¬sup`, instance
//! checking refutes `¬C` at the named individual.

use std::collections::BTreeSet;
use std::time::Duration;

use dl_lib_tableau_engine::{BudgetExceeded, TConcept, TRole, TableauKnowledgeBase};
use tracing::debug;

use super::{
    ensure_created, ensure_not_disposed, ensure_queryable, DlReasoner, ReasonerConfig,
    SessionState, Taxonomy,
};
use crate::axiom::Axiom;
use crate::error::ReasonerError;
use crate::expr::{Concept, Role};
use crate::ident::Identifier;
use crate::ontology::Ontology;

/// A reasoner session over the full-expressivity tableau engine.
#[derive(Debug)]
pub struct TableauReasoner {
    config: ReasonerConfig,
    state: SessionState,
    session: Option<Session>,
}

#[derive(Debug)]
struct Session {
    kb: TableauKnowledgeBase,
    concept_names: Vec<Identifier>,
    consistent: Option<bool>,
    taxonomy: Option<Taxonomy>,
}

impl TableauReasoner {
    /// A fresh session in the `Created` state.
    #[must_use]
    pub fn new(config: ReasonerConfig) -> Self {
        TableauReasoner {
            config,
            state: SessionState::Created,
            session: None,
        }
    }

    /// The session's current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn session_mut(&mut self, operation: &'static str) -> Result<&mut Session, ReasonerError> {
        ensure_queryable(self.state, operation)?;
        match self.session.as_mut() {
            Some(session) => Ok(session),
            None => Err(ReasonerError::InvalidState {
                operation,
                state: self.state,
            }),
        }
    }
}

impl Default for TableauReasoner {
    fn default() -> Self {
        TableauReasoner::new(ReasonerConfig::default())
    }
}

impl DlReasoner for TableauReasoner {
    fn engine_name(&self) -> &'static str {
        "tableau"
    }

    fn load(&mut self, ontology: &Ontology) -> Result<(), ReasonerError> {
        ensure_created(self.state, "load")?;

        let mut kb = TableauKnowledgeBase::new();
        for id in ontology.declared_individuals() {
            kb.individual(id.as_str());
        }
        for id in ontology.declared_concepts() {
            kb.class(id.as_str());
        }

        for axiom in ontology.axioms() {
            match axiom {
                Axiom::ConceptInclusion { lhs, rhs } => {
                    let lhs = translate_concept(&mut kb, lhs);
                    let rhs = translate_concept(&mut kb, rhs);
                    kb.add_gci(lhs, rhs);
                }
                Axiom::ConceptEquivalence(members) => {
                    let members: Vec<TConcept> = members
                        .iter()
                        .map(|member| translate_concept(&mut kb, member))
                        .collect();
                    for pair in members.windows(2) {
                        kb.add_gci(pair[0].clone(), pair[1].clone());
                        kb.add_gci(pair[1].clone(), pair[0].clone());
                    }
                }
                Axiom::RoleInclusion { lhs, rhs } => {
                    let lhs = translate_role(&mut kb, lhs);
                    let rhs = translate_role(&mut kb, rhs);
                    kb.add_role_inclusion(lhs, rhs);
                }
                Axiom::ConceptAssertion {
                    individual,
                    concept,
                } => {
                    let subject = kb.individual(individual.as_str());
                    let concept = translate_concept(&mut kb, concept);
                    kb.add_concept_assertion(subject, concept);
                }
                Axiom::RoleAssertion {
                    role,
                    subject,
                    object,
                } => {
                    let role = translate_role(&mut kb, role);
                    let subject = kb.individual(subject.as_str());
                    let object = kb.individual(object.as_str());
                    kb.add_role_assertion(role, subject, object);
                }
            }
        }

        debug!(
            axioms = ontology.axioms().len(),
            "ontology loaded into the tableau engine"
        );
        self.session = Some(Session {
            kb,
            concept_names: ontology.declared_concepts().iter().cloned().collect(),
            consistent: None,
            taxonomy: None,
        });
        self.state = SessionState::Loaded;
        Ok(())
    }

    fn classify(&mut self) -> Result<(), ReasonerError> {
        let budget = self.config.time_budget;
        let session = self.session_mut("classify")?;
        session.classify(budget)?;
        self.state = SessionState::Classified;
        Ok(())
    }

    fn is_consistent(&mut self) -> Result<bool, ReasonerError> {
        let budget = self.config.time_budget;
        let session = self.session_mut("is_consistent")?;
        session.consistent(budget)
    }

    fn is_satisfiable(&mut self, concept: &Concept) -> Result<bool, ReasonerError> {
        let budget = self.config.time_budget;
        let session = self.session_mut("is_satisfiable")?;
        if !session.consistent(budget)? {
            // Everything is entailed by an inconsistent ontology.
            return Ok(true);
        }
        session.satisfiable(concept, budget)
    }

    fn is_subsumed_by(&mut self, sub: &Concept, sup: &Concept) -> Result<bool, ReasonerError> {
        let budget = self.config.time_budget;
        let session = self.session_mut("is_subsumed_by")?;
        if !session.consistent(budget)? {
            return Ok(true);
        }
        session.subsumption_holds(sub, sup, budget)
    }

    fn is_instance_of(
        &mut self,
        individual: &Identifier,
        concept: &Concept,
    ) -> Result<bool, ReasonerError> {
        let budget = self.config.time_budget;
        let session = self.session_mut("is_instance_of")?;
        if !session.consistent(budget)? {
            return Ok(true);
        }
        session.instance_holds(individual, concept, budget)
    }

    fn subsumers(&mut self, concept: &Concept) -> Result<Vec<Identifier>, ReasonerError> {
        let budget = self.config.time_budget;
        let session = self.session_mut("subsumers")?;
        if !session.consistent(budget)? {
            return Ok(session.concept_names.clone());
        }
        let names = session.concept_names.clone();
        let mut out = Vec::new();
        for name in names {
            if session.subsumption_holds(concept, &Concept::Name(name.clone()), budget)? {
                out.push(name);
            }
        }
        Ok(out)
    }

    fn taxonomy(&mut self) -> Result<&Taxonomy, ReasonerError> {
        let budget = self.config.time_budget;
        let session = self.session_mut("taxonomy")?;
        session.classify(budget)?;
        self.state = SessionState::Classified;
        let session = self.session_mut("taxonomy")?;
        session.taxonomy_ref()
    }

    fn dispose(&mut self) -> Result<(), ReasonerError> {
        ensure_not_disposed(self.state, "dispose")?;
        self.session = None;
        self.state = SessionState::Disposed;
        debug!("tableau session disposed");
        Ok(())
    }
}

impl Session {
    fn consistent(&mut self, budget: Option<Duration>) -> Result<bool, ReasonerError> {
        if let Some(cached) = self.consistent {
            return Ok(cached);
        }
        let consistent = self.kb.is_consistent(budget).map_err(timeout)?;
        self.consistent = Some(consistent);
        Ok(consistent)
    }

    fn satisfiable(&self, concept: &Concept, budget: Option<Duration>) -> Result<bool, ReasonerError> {
        let mut kb = self.kb.clone();
        let witness = kb.fresh_individual("sat");
        let native = translate_concept(&mut kb, concept);
        kb.add_concept_assertion(witness, native);
        kb.is_consistent(budget).map_err(timeout)
    }

    fn subsumption_holds(
        &self,
        sub: &Concept,
        sup: &Concept,
        budget: Option<Duration>,
    ) -> Result<bool, ReasonerError> {
        let mut kb = self.kb.clone();
        let witness = kb.fresh_individual("subsumption");
        let sub = translate_concept(&mut kb, sub);
        let sup = translate_concept(&mut kb, sup);
        kb.add_concept_assertion(
            witness,
            TConcept::And(vec![sub, TConcept::Not(Box::new(sup))]),
        );
        Ok(!kb.is_consistent(budget).map_err(timeout)?)
    }

    fn instance_holds(
        &self,
        individual: &Identifier,
        concept: &Concept,
        budget: Option<Duration>,
    ) -> Result<bool, ReasonerError> {
        let mut kb = self.kb.clone();
        let subject = kb.individual(individual.as_str());
        let native = translate_concept(&mut kb, concept);
        kb.add_concept_assertion(subject, TConcept::Not(Box::new(native)));
        Ok(!kb.is_consistent(budget).map_err(timeout)?)
    }

    fn classify(&mut self, budget: Option<Duration>) -> Result<(), ReasonerError> {
        if self.taxonomy.is_some() {
            return Ok(());
        }
        let consistent = self.consistent(budget)?;
        let names = self.concept_names.clone();
        let mut taxonomy = Taxonomy::new();
        if consistent {
            for sub in &names {
                let mut supers = BTreeSet::new();
                for sup in &names {
                    let holds = sub == sup
                        || self.subsumption_holds(
                            &Concept::Name(sub.clone()),
                            &Concept::Name(sup.clone()),
                            budget,
                        )?;
                    if holds {
                        supers.insert(sup.clone());
                    }
                }
                taxonomy.insert(sub.clone(), supers);
            }
        } else {
            let all: BTreeSet<Identifier> = names.iter().cloned().collect();
            for name in &names {
                taxonomy.insert(name.clone(), all.clone());
            }
        }
        debug!(concepts = names.len(), "tableau classification complete");
        self.taxonomy = Some(taxonomy);
        Ok(())
    }

    fn taxonomy_ref(&mut self) -> Result<&Taxonomy, ReasonerError> {
        // classify() has filled the cache; the fallback keeps this total.
        let taxonomy = self.taxonomy.take().unwrap_or_default();
        Ok(self.taxonomy.insert(taxonomy))
    }
}

fn timeout(err: BudgetExceeded) -> ReasonerError {
    ReasonerError::Timeout { budget: err.budget }
}

/// Total, lossless translation of the whole algebra into native terms.
fn translate_concept(kb: &mut TableauKnowledgeBase, concept: &Concept) -> TConcept {
    match concept {
        Concept::Top => TConcept::Top,
        Concept::Bottom => TConcept::Bottom,
        Concept::Name(id) => TConcept::Name(kb.class(id.as_str())),
        Concept::OneOf(id) => TConcept::Nominal(kb.individual(id.as_str())),
        Concept::Not(inner) => TConcept::Not(Box::new(translate_concept(kb, inner))),
        Concept::And(operands) => TConcept::And(
            operands
                .iter()
                .map(|operand| translate_concept(kb, operand))
                .collect(),
        ),
        Concept::Or(operands) => TConcept::Or(
            operands
                .iter()
                .map(|operand| translate_concept(kb, operand))
                .collect(),
        ),
        Concept::SomeValues(role, filler) => TConcept::Exists(
            translate_role(kb, role),
            Box::new(translate_concept(kb, filler)),
        ),
        Concept::AllValues(role, filler) => TConcept::ForAll(
            translate_role(kb, role),
            Box::new(translate_concept(kb, filler)),
        ),
    }
}

fn translate_role(kb: &mut TableauKnowledgeBase, role: &Role) -> TRole {
    match role {
        Role::Name(id) => TRole::named(kb.role(id.as_str())),
        Role::Inverse(inner) => translate_role(kb, inner).inverted(),
    }
}
