//! Description Logic core: a recursive concept/role algebra, an immutable
//! ontology model, a binary-conjunction normalizer, a DL-notation formatter,
//! and a reasoner abstraction over pluggable engines.
//!
//! The library is the computational core of a DL ontology service. Callers
//! build (or receive from an interchange adapter) an [`Ontology`], optionally
//! normalize it with [`Ontology::to_binary`], render it with
//! [`DlFormatter`], and query it through a [`DlReasoner`] session backed by
//! one of two engines: the polynomial EL⊥ saturation engine
//! ([`ElReasoner`]) or the full-expressivity tableau engine
//! ([`TableauReasoner`]).
//!
//! Expressions and ontologies are pure values: structurally compared,
//! immutable once built, freely shared across threads. Reasoner sessions are
//! stateful single-owner values; see [`reasoning`] for the session protocol.
//!
//! # Example
//!
//! ```
//! use dl_lib::{Axiom, Concept, DlReasoner, ElReasoner, Ontology, ReasonerConfig, Role};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ontology = Ontology::builder("family")
//!     .declare_concepts(["Parent", "Person", "Happy"])
//!     .declare_role("hasChild")
//!     .axiom(Axiom::concept_inclusion(
//!         Concept::name("Parent"),
//!         Concept::and(vec![
//!             Concept::name("Person"),
//!             Concept::some(Role::name("hasChild"), Concept::name("Person")),
//!             Concept::name("Happy"),
//!         ])?,
//!     ))
//!     .build()?;
//!
//! // Rewrite the ternary conjunction into right-nested binary form.
//! let binary = ontology.to_binary();
//! assert!(dl_lib::normalize::is_binary(&binary));
//!
//! let mut reasoner = ElReasoner::new(ReasonerConfig::default());
//! reasoner.load(&binary)?;
//! assert!(reasoner.is_subsumed_by(&Concept::name("Parent"), &Concept::name("Person"))?);
//! reasoner.dispose()?;
//! # Ok(())
//! # }
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod axiom;
pub mod error;
pub mod expr;
pub mod format;
pub mod ident;
pub mod normalize;
pub mod ontology;
pub mod reasoning;

pub use axiom::Axiom;
pub use error::{
    CapabilitySite, IdentifierKind, InterchangeError, ReasonerError, ValidationError,
};
pub use expr::{Concept, Operands, Role};
pub use format::{DlFormatter, FormatterConfig};
pub use ident::Identifier;
pub use ontology::{Ontology, OntologyBuilder};
pub use reasoning::{
    DlReasoner, ElReasoner, ReasonerConfig, SessionState, TableauReasoner, Taxonomy,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_surface_is_reexported() {
        // The five error-taxonomy types and both backends are reachable from
        // the crate root.
        let _ = ValidationError::BadArity {
            operator: "conjunction",
            found: 0,
        };
        let _ = ElReasoner::default();
        let _ = TableauReasoner::default();
        let _ = DlFormatter::simplified();
    }
}
