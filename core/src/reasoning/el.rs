//! The EL-profile backend: translation into the saturation engine.
//!
//! Supports names, `⊤`, `⊥`, conjunction, existential restriction, nominals,
//! ABox assertions, and role-name inclusions. Disjunction, negation,
//! universal restriction, and inverse roles are outside the profile and are
//! rejected at translation time with the offending construct and location.
//!
//! Individuals (and nominals) ride on the standard encoding: each individual
//! gets a fresh engine class, a concept assertion becomes an inclusion of
//! that class, and a role assertion `r(a, b)` becomes `Aₐ ⊑ ∃r.A_b`.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use dl_lib_el_engine::{BudgetExceeded, ClassId, ElConcept, ElKnowledgeBase, Saturation};
use tracing::debug;

use super::{
    ensure_created, ensure_not_disposed, ensure_queryable, DlReasoner, ReasonerConfig,
    SessionState, Taxonomy,
};
use crate::axiom::Axiom;
use crate::error::{CapabilitySite, ReasonerError};
use crate::expr::{Concept, Role};
use crate::ident::Identifier;
use crate::ontology::Ontology;

const ENGINE: &str = "EL";

/// A reasoner session over the polynomial EL⊥ saturation engine.
#[derive(Debug)]
pub struct ElReasoner {
    config: ReasonerConfig,
    state: SessionState,
    session: Option<Session>,
}

#[derive(Debug)]
struct Session {
    kb: ElKnowledgeBase,
    concepts: BTreeMap<Identifier, ClassId>,
    individuals: BTreeMap<Identifier, ClassId>,
    saturation: Option<Saturation>,
    taxonomy: Option<Taxonomy>,
}

impl ElReasoner {
    /// A fresh session in the `Created` state.
    #[must_use]
    pub fn new(config: ReasonerConfig) -> Self {
        ElReasoner {
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

impl Default for ElReasoner {
    fn default() -> Self {
        ElReasoner::new(ReasonerConfig::default())
    }
}

impl DlReasoner for ElReasoner {
    fn engine_name(&self) -> &'static str {
        "el-saturation"
    }

    fn load(&mut self, ontology: &Ontology) -> Result<(), ReasonerError> {
        ensure_created(self.state, "load")?;

        let mut kb = ElKnowledgeBase::new();
        let mut concepts = BTreeMap::new();
        for id in ontology.declared_concepts() {
            concepts.insert(id.clone(), kb.class(id.as_str()));
        }
        let mut individuals = BTreeMap::new();
        for id in ontology.declared_individuals() {
            individual_class(&mut kb, &mut individuals, id);
        }

        for (index, axiom) in ontology.axioms().iter().enumerate() {
            let site = CapabilitySite::Axiom(index);
            match axiom {
                Axiom::ConceptInclusion { lhs, rhs } => {
                    let lhs = translate_concept(&mut kb, &mut individuals, lhs, site)?;
                    let rhs = translate_concept(&mut kb, &mut individuals, rhs, site)?;
                    kb.add_inclusion(lhs, rhs);
                }
                Axiom::ConceptEquivalence(members) => {
                    let members: Vec<ElConcept> = members
                        .iter()
                        .map(|m| translate_concept(&mut kb, &mut individuals, m, site))
                        .collect::<Result<_, _>>()?;
                    for pair in members.windows(2) {
                        kb.add_equivalence(pair[0].clone(), pair[1].clone());
                    }
                }
                Axiom::RoleInclusion { lhs, rhs } => {
                    let lhs = translate_role(&mut kb, lhs, site)?;
                    let rhs = translate_role(&mut kb, rhs, site)?;
                    kb.add_role_inclusion(lhs, rhs);
                }
                Axiom::ConceptAssertion {
                    individual,
                    concept,
                } => {
                    let subject = individual_class(&mut kb, &mut individuals, individual);
                    let concept = translate_concept(&mut kb, &mut individuals, concept, site)?;
                    kb.add_inclusion(ElConcept::Atom(subject), concept);
                }
                Axiom::RoleAssertion {
                    role,
                    subject,
                    object,
                } => {
                    let role = translate_role(&mut kb, role, site)?;
                    let subject = individual_class(&mut kb, &mut individuals, subject);
                    let object = individual_class(&mut kb, &mut individuals, object);
                    kb.add_inclusion(
                        ElConcept::Atom(subject),
                        ElConcept::Exists(role, Box::new(ElConcept::Atom(object))),
                    );
                }
            }
        }

        debug!(
            axioms = ontology.axioms().len(),
            concepts = concepts.len(),
            "ontology loaded into the EL engine"
        );
        self.session = Some(Session {
            kb,
            concepts,
            individuals,
            saturation: None,
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
        Ok(!session.is_inconsistent(budget)?)
    }

    fn is_satisfiable(&mut self, concept: &Concept) -> Result<bool, ReasonerError> {
        let budget = self.config.time_budget;
        let session = self.session_mut("is_satisfiable")?;
        if session.is_inconsistent(budget)? {
            // Everything is entailed by an inconsistent ontology.
            return Ok(true);
        }
        Ok(!session.query_unsatisfiable(concept, budget)?)
    }

    fn is_subsumed_by(&mut self, sub: &Concept, sup: &Concept) -> Result<bool, ReasonerError> {
        let budget = self.config.time_budget;
        let session = self.session_mut("is_subsumed_by")?;
        if session.is_inconsistent(budget)? {
            return Ok(true);
        }
        // Named pairs go through classification, triggered lazily here.
        if let (Concept::Name(sub_name), Concept::Name(sup_name)) = (sub, sup) {
            if session.concepts.contains_key(sub_name) && session.concepts.contains_key(sup_name) {
                session.classify(budget)?;
                let subsumed = session
                    .taxonomy
                    .as_ref()
                    .and_then(|taxonomy| taxonomy.get(sub_name))
                    .is_some_and(|supers| supers.contains(sup_name));
                self.state = SessionState::Classified;
                return Ok(subsumed);
            }
        }
        session.query_subsumption(sub, sup, budget)
    }

    fn is_instance_of(
        &mut self,
        individual: &Identifier,
        concept: &Concept,
    ) -> Result<bool, ReasonerError> {
        let budget = self.config.time_budget;
        let session = self.session_mut("is_instance_of")?;
        if session.is_inconsistent(budget)? {
            return Ok(true);
        }
        session.query_instance(individual, concept, budget)
    }

    fn subsumers(&mut self, concept: &Concept) -> Result<Vec<Identifier>, ReasonerError> {
        let budget = self.config.time_budget;
        let session = self.session_mut("subsumers")?;
        if session.is_inconsistent(budget)? {
            return Ok(session.concepts.keys().cloned().collect());
        }
        session.subsumers_of(concept, budget)
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
        debug!("EL session disposed");
        Ok(())
    }
}

impl Session {
    fn saturation(&mut self, budget: Option<Duration>) -> Result<&Saturation, ReasonerError> {
        let saturation = match self.saturation.take() {
            Some(saturation) => saturation,
            None => self.kb.saturate(budget).map_err(timeout)?,
        };
        Ok(self.saturation.insert(saturation))
    }

    fn is_inconsistent(&mut self, budget: Option<Duration>) -> Result<bool, ReasonerError> {
        let individuals: Vec<ClassId> = self.individuals.values().copied().collect();
        let saturation = self.saturation(budget)?;
        Ok(saturation.is_unsatisfiable(ClassId::TOP)
            || individuals
                .iter()
                .any(|&class| saturation.is_unsatisfiable(class)))
    }

    fn classify(&mut self, budget: Option<Duration>) -> Result<(), ReasonerError> {
        if self.taxonomy.is_some() {
            return Ok(());
        }
        let inconsistent = self.is_inconsistent(budget)?;
        let concepts = self.concepts.clone();
        let mut taxonomy = Taxonomy::new();
        if inconsistent {
            let all: BTreeSet<Identifier> = concepts.keys().cloned().collect();
            for id in concepts.keys() {
                taxonomy.insert(id.clone(), all.clone());
            }
        } else {
            let saturation = self.saturation(budget)?;
            for (id, &class) in &concepts {
                let supers: BTreeSet<Identifier> = concepts
                    .iter()
                    .filter(|&(_, &candidate)| saturation.is_subsumed(class, candidate))
                    .map(|(name, _)| name.clone())
                    .collect();
                taxonomy.insert(id.clone(), supers);
            }
        }
        debug!(concepts = concepts.len(), "EL classification complete");
        self.taxonomy = Some(taxonomy);
        Ok(())
    }

    fn taxonomy_ref(&mut self) -> Result<&Taxonomy, ReasonerError> {
        // classify() has filled the cache; the fallback keeps this total.
        let taxonomy = self.taxonomy.take().unwrap_or_default();
        Ok(self.taxonomy.insert(taxonomy))
    }

    /// Whether `concept` is subsumed by `⊥` — checked on a clone with the
    /// query concept internalized as a fresh class.
    fn query_unsatisfiable(
        &self,
        concept: &Concept,
        budget: Option<Duration>,
    ) -> Result<bool, ReasonerError> {
        let mut kb = self.kb.clone();
        let mut individuals = self.individuals.clone();
        let native = translate_concept(&mut kb, &mut individuals, concept, CapabilitySite::Query)?;
        let query = kb.fresh_class("query");
        kb.add_equivalence(ElConcept::Atom(query), native);
        let saturation = kb.saturate(budget).map_err(timeout)?;
        Ok(saturation.is_unsatisfiable(query))
    }

    fn query_subsumption(
        &self,
        sub: &Concept,
        sup: &Concept,
        budget: Option<Duration>,
    ) -> Result<bool, ReasonerError> {
        let mut kb = self.kb.clone();
        let mut individuals = self.individuals.clone();
        let sub = translate_concept(&mut kb, &mut individuals, sub, CapabilitySite::Query)?;
        let sup = translate_concept(&mut kb, &mut individuals, sup, CapabilitySite::Query)?;
        let sub_query = kb.fresh_class("sub");
        let sup_query = kb.fresh_class("sup");
        kb.add_equivalence(ElConcept::Atom(sub_query), sub);
        kb.add_equivalence(ElConcept::Atom(sup_query), sup);
        let saturation = kb.saturate(budget).map_err(timeout)?;
        Ok(saturation.is_subsumed(sub_query, sup_query))
    }

    fn query_instance(
        &self,
        individual: &Identifier,
        concept: &Concept,
        budget: Option<Duration>,
    ) -> Result<bool, ReasonerError> {
        let mut kb = self.kb.clone();
        let mut individuals = self.individuals.clone();
        let subject = individual_class(&mut kb, &mut individuals, individual);
        let native = translate_concept(&mut kb, &mut individuals, concept, CapabilitySite::Query)?;
        let query = kb.fresh_class("instance");
        kb.add_equivalence(ElConcept::Atom(query), native);
        let saturation = kb.saturate(budget).map_err(timeout)?;
        Ok(saturation.is_subsumed(subject, query))
    }

    fn subsumers_of(
        &mut self,
        concept: &Concept,
        budget: Option<Duration>,
    ) -> Result<Vec<Identifier>, ReasonerError> {
        let concepts = self.concepts.clone();
        // Declared names read straight off the cached saturation.
        if let Concept::Name(name) = concept {
            if let Some(&class) = concepts.get(name) {
                let saturation = self.saturation(budget)?;
                return Ok(concepts
                    .iter()
                    .filter(|&(_, &candidate)| saturation.is_subsumed(class, candidate))
                    .map(|(id, _)| id.clone())
                    .collect());
            }
        }
        let mut kb = self.kb.clone();
        let mut individuals = self.individuals.clone();
        let native = translate_concept(&mut kb, &mut individuals, concept, CapabilitySite::Query)?;
        let query = kb.fresh_class("subsumers");
        kb.add_equivalence(ElConcept::Atom(query), native);
        let saturation = kb.saturate(budget).map_err(timeout)?;
        Ok(concepts
            .iter()
            .filter(|&(_, &candidate)| saturation.is_subsumed(query, candidate))
            .map(|(id, _)| id.clone())
            .collect())
    }
}

fn timeout(err: BudgetExceeded) -> ReasonerError {
    ReasonerError::Timeout { budget: err.budget }
}

fn capability(construct: &'static str, site: CapabilitySite) -> ReasonerError {
    ReasonerError::Capability {
        engine: ENGINE,
        construct,
        site,
    }
}

fn individual_class(
    kb: &mut ElKnowledgeBase,
    individuals: &mut BTreeMap<Identifier, ClassId>,
    id: &Identifier,
) -> ClassId {
    if let Some(&class) = individuals.get(id) {
        return class;
    }
    let class = kb.fresh_class(id.as_str());
    individuals.insert(id.clone(), class);
    class
}

/// Total, lossless translation over the EL fragment; anything outside it is
/// a `CapabilityError` naming the construct and where it was found.
fn translate_concept(
    kb: &mut ElKnowledgeBase,
    individuals: &mut BTreeMap<Identifier, ClassId>,
    concept: &Concept,
    site: CapabilitySite,
) -> Result<ElConcept, ReasonerError> {
    match concept {
        Concept::Top => Ok(ElConcept::Atom(ClassId::TOP)),
        Concept::Bottom => Ok(ElConcept::Atom(ClassId::BOTTOM)),
        Concept::Name(id) => Ok(ElConcept::Atom(kb.class(id.as_str()))),
        Concept::OneOf(id) => Ok(ElConcept::Atom(individual_class(kb, individuals, id))),
        Concept::And(operands) => {
            let parts = operands
                .iter()
                .map(|operand| translate_concept(kb, individuals, operand, site))
                .collect::<Result<_, _>>()?;
            Ok(ElConcept::Conjunction(parts))
        }
        Concept::SomeValues(role, filler) => {
            let role = translate_role(kb, role, site)?;
            let filler = translate_concept(kb, individuals, filler, site)?;
            Ok(ElConcept::Exists(role, Box::new(filler)))
        }
        Concept::Or(_) => Err(capability("disjunction", site)),
        Concept::Not(_) => Err(capability("negation", site)),
        Concept::AllValues(_, _) => Err(capability("universal restriction", site)),
    }
}

fn translate_role(
    kb: &mut ElKnowledgeBase,
    role: &Role,
    site: CapabilitySite,
) -> Result<dl_lib_el_engine::RoleId, ReasonerError> {
    match role {
        Role::Name(id) => Ok(kb.role(id.as_str())),
        Role::Inverse(_) => Err(capability("inverse role", site)),
    }
}
