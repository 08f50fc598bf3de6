//! Error taxonomy for the DL core.
//!
//! Every error is a typed value returned to the immediate caller; nothing is
//! swallowed and nothing retries. Inconsistency of an ontology is never an
//! error — it is a valid `is_consistent() == false` result.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::ident::Identifier;
use crate::reasoning::SessionState;

/// Which declared identifier set a reference was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// A concept name.
    Concept,
    /// A role name.
    Role,
    /// An individual name.
    Individual,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdentifierKind::Concept => "concept",
            IdentifierKind::Role => "role",
            IdentifierKind::Individual => "individual",
        })
    }
}

/// Construction-time error: malformed expression or ill-founded ontology.
///
/// Always recoverable by supplying corrected input; never raised at query
/// time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An n-ary operator was given fewer than two operands.
    #[error("`{operator}` requires at least two operands, found {found}")]
    BadArity {
        /// The operator that was being constructed.
        operator: &'static str,
        /// How many operands were supplied.
        found: usize,
    },
    /// An axiom references an identifier missing from the declared sets.
    #[error("axiom {axiom_index} references undeclared {kind} `{identifier}`")]
    UndeclaredIdentifier {
        /// The offending identifier.
        identifier: Identifier,
        /// The declared set it was checked against.
        kind: IdentifierKind,
        /// Position of the referencing axiom in the ontology's axiom list.
        axiom_index: usize,
    },
}

/// Where a capability violation was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilitySite {
    /// Inside the loaded ontology, at this axiom index.
    Axiom(usize),
    /// Inside a concept expression passed to a query operation.
    Query,
}

impl fmt::Display for CapabilitySite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilitySite::Axiom(index) => write!(f, "axiom {index}"),
            CapabilitySite::Query => f.write_str("query expression"),
        }
    }
}

/// Error raised by a reasoner session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReasonerError {
    /// The ontology (or query) uses a construct outside the engine's profile.
    #[error("`{construct}` is outside the {engine} profile (at {site})")]
    Capability {
        /// Name of the rejecting engine.
        engine: &'static str,
        /// The unsupported construct, e.g. `disjunction`.
        construct: &'static str,
        /// Where the construct was found.
        site: CapabilitySite,
    },
    /// The engine exhausted its time budget. Non-fatal: the session stays in
    /// its current state and remains usable for further queries.
    #[error("engine time budget of {budget:?} exhausted")]
    Timeout {
        /// The configured budget that was exceeded.
        budget: Duration,
    },
    /// A session operation was invoked outside its valid states.
    #[error("`{operation}` is not valid in the {state} state")]
    InvalidState {
        /// The operation that was attempted.
        operation: &'static str,
        /// The state the session was in.
        state: SessionState,
    },
}

/// Error contract of the (external) interchange adapter boundary.
///
/// The core never constructs these; they are declared here so adapters that
/// parse or serialize the standard interchange format have typed failures to
/// surface unchanged, as required at the §6 boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterchangeError {
    /// The external document could not be parsed.
    #[error("parse error: {detail}")]
    Parse {
        /// Parser diagnostic.
        detail: String,
    },
    /// The external document uses a construct the algebra cannot represent.
    #[error("unsupported construct: {construct}")]
    UnsupportedConstruct {
        /// Name of the offending construct.
        construct: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_the_axiom() {
        let err = ValidationError::UndeclaredIdentifier {
            identifier: Identifier::new("B"),
            kind: IdentifierKind::Concept,
            axiom_index: 3,
        };
        assert_eq!(err.to_string(), "axiom 3 references undeclared concept `B`");
    }

    #[test]
    fn capability_error_names_construct_and_site() {
        let err = ReasonerError::Capability {
            engine: "el",
            construct: "disjunction",
            site: CapabilitySite::Axiom(0),
        };
        assert_eq!(
            err.to_string(),
            "`disjunction` is outside the el profile (at axiom 0)"
        );
    }
}
