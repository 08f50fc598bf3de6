//! The reasoner abstraction: one capability interface, pluggable engines.
//!
//! A reasoner session is a stateful, single-owner value walking the protocol
//! `Created → Loaded → {Classified} → Disposed`. Loading translates the
//! public algebra into the backend engine's native representation; queries
//! are only valid while loaded (or classified); disposal is terminal and
//! releases the engine's resources. Sessions are deliberately `&mut self`
//! throughout: one caller at a time, enforced by the borrow checker rather
//! than a lock. Distinct sessions are fully independent.
//!
//! Two backends ship in this workspace: [`ElReasoner`] (polynomial EL⊥
//! saturation, profile-restricted) and [`TableauReasoner`] (full
//! expressivity). Adding a third backend is one more implementation of
//! [`DlReasoner`]; callers never change.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

mod el;
mod tableau;

pub use el::ElReasoner;
pub use tableau::TableauReasoner;

use crate::error::ReasonerError;
use crate::expr::Concept;
use crate::ident::Identifier;
use crate::ontology::Ontology;

/// Per-session configuration, passed explicitly at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReasonerConfig {
    /// Wall-clock budget for a single engine run (one saturation, one
    /// tableau check). `None` — the default — means no budget: the engine
    /// runs to completion. Exceeding the budget surfaces as
    /// [`ReasonerError::Timeout`] and leaves the session usable.
    pub time_budget: Option<Duration>,
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed; no ontology loaded yet.
    Created,
    /// An ontology is loaded and translated; queries are valid.
    Loaded,
    /// Classification has run; queries are valid.
    Classified,
    /// Disposed; terminal. Every operation fails.
    Disposed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Created => "created",
            SessionState::Loaded => "loaded",
            SessionState::Classified => "classified",
            SessionState::Disposed => "disposed",
        })
    }
}

/// Classification result: every declared concept name mapped to the set of
/// declared names that subsume it (itself included).
pub type Taxonomy = BTreeMap<Identifier, BTreeSet<Identifier>>;

/// The capability interface every reasoning backend implements.
///
/// Failure semantics shared by all implementations:
///
/// - [`ReasonerError::InvalidState`] outside the valid states;
/// - [`ReasonerError::Capability`] when the loaded ontology (or a query
///   expression) falls outside the backend's profile, naming the construct
///   and its location;
/// - [`ReasonerError::Timeout`] when the engine exhausts its budget —
///   non-fatal, the session remains usable;
/// - inconsistency is **not** an error: it is `is_consistent() == false`,
///   after which every entailment query answers `true` (classically,
///   everything is entailed by an inconsistent ontology).
pub trait DlReasoner {
    /// Short name of the backing engine, for diagnostics.
    fn engine_name(&self) -> &'static str;

    /// Loads and translates an ontology. Valid only in `Created`.
    ///
    /// # Errors
    ///
    /// [`ReasonerError::InvalidState`] outside `Created`;
    /// [`ReasonerError::Capability`] if the ontology uses a construct the
    /// backend cannot represent.
    fn load(&mut self, ontology: &Ontology) -> Result<(), ReasonerError>;

    /// Computes the full subsumption taxonomy over declared concept names.
    ///
    /// Idempotent; also invoked lazily by queries that need it.
    ///
    /// # Errors
    ///
    /// [`ReasonerError::InvalidState`] unless loaded;
    /// [`ReasonerError::Timeout`] on budget exhaustion.
    fn classify(&mut self) -> Result<(), ReasonerError>;

    /// Whether the loaded ontology has a model.
    ///
    /// # Errors
    ///
    /// [`ReasonerError::InvalidState`] unless loaded;
    /// [`ReasonerError::Timeout`] on budget exhaustion.
    fn is_consistent(&mut self) -> Result<bool, ReasonerError>;

    /// Whether `concept` is satisfiable with respect to the ontology.
    ///
    /// # Errors
    ///
    /// As [`DlReasoner::is_consistent`], plus [`ReasonerError::Capability`]
    /// for query expressions outside the backend's profile.
    fn is_satisfiable(&mut self, concept: &Concept) -> Result<bool, ReasonerError>;

    /// Whether `sub ⊑ sup` is entailed.
    ///
    /// # Errors
    ///
    /// As [`DlReasoner::is_satisfiable`].
    fn is_subsumed_by(&mut self, sub: &Concept, sup: &Concept) -> Result<bool, ReasonerError>;

    /// Whether `individual : concept` is entailed.
    ///
    /// # Errors
    ///
    /// As [`DlReasoner::is_satisfiable`].
    fn is_instance_of(
        &mut self,
        individual: &Identifier,
        concept: &Concept,
    ) -> Result<bool, ReasonerError>;

    /// The declared concept names subsuming `concept`, in name order.
    ///
    /// # Errors
    ///
    /// As [`DlReasoner::is_satisfiable`].
    fn subsumers(&mut self, concept: &Concept) -> Result<Vec<Identifier>, ReasonerError>;

    /// The classification result, computing it first if needed.
    ///
    /// # Errors
    ///
    /// As [`DlReasoner::classify`].
    fn taxonomy(&mut self) -> Result<&Taxonomy, ReasonerError>;

    /// Releases engine resources and enters the terminal `Disposed` state.
    ///
    /// # Errors
    ///
    /// [`ReasonerError::InvalidState`] if already disposed.
    fn dispose(&mut self) -> Result<(), ReasonerError>;
}

/// Guard for query operations: valid in `Loaded` and `Classified` only.
pub(crate) fn ensure_queryable(
    state: SessionState,
    operation: &'static str,
) -> Result<(), ReasonerError> {
    match state {
        SessionState::Loaded | SessionState::Classified => Ok(()),
        SessionState::Created | SessionState::Disposed => {
            Err(ReasonerError::InvalidState { operation, state })
        }
    }
}

/// Guard for `load`: valid in `Created` only.
pub(crate) fn ensure_created(
    state: SessionState,
    operation: &'static str,
) -> Result<(), ReasonerError> {
    if state == SessionState::Created {
        Ok(())
    } else {
        Err(ReasonerError::InvalidState { operation, state })
    }
}

/// Guard for `dispose`: valid anywhere except `Disposed`.
pub(crate) fn ensure_not_disposed(
    state: SessionState,
    operation: &'static str,
) -> Result<(), ReasonerError> {
    if state == SessionState::Disposed {
        Err(ReasonerError::InvalidState { operation, state })
    } else {
        Ok(())
    }
}
