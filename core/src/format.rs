//! Textual rendering of expressions, axioms, and ontologies in standard DL
//! notation.
//!
//! Formatting is a pure function of the value and the configuration:
//! identical input and configuration always yield byte-identical output. The
//! formatter renders whatever shape it is given — an n-ary conjunction stays
//! n-ary on screen; normalization is someone else's job.

use crate::axiom::Axiom;
use crate::expr::{Concept, Operands, Role};
use crate::ident::Identifier;
use crate::ontology::Ontology;

/// Formatter configuration, threaded explicitly through construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatterConfig {
    /// When `true`, identifiers render in their shortened local form
    /// ([`Identifier::local_name`]); when `false` (the default), fully
    /// qualified names are used. Rendering only — never changes which
    /// axioms exist.
    pub simplified_names: bool,
}

/// Renders the algebra in DL notation (`⊓`, `⊑`, `∃r.C`, …).
#[derive(Debug, Clone, Copy)]
pub struct DlFormatter {
    config: FormatterConfig,
}

impl DlFormatter {
    /// A formatter with the given configuration.
    #[must_use]
    pub fn new(config: FormatterConfig) -> Self {
        DlFormatter { config }
    }

    /// A formatter using simplified (local) names.
    #[must_use]
    pub fn simplified() -> Self {
        DlFormatter {
            config: FormatterConfig {
                simplified_names: true,
            },
        }
    }

    /// Renders a concept expression.
    #[must_use]
    pub fn concept(&self, concept: &Concept) -> String {
        let mut out = String::new();
        self.push_concept(&mut out, concept);
        out
    }

    /// Renders a role expression.
    #[must_use]
    pub fn role(&self, role: &Role) -> String {
        let mut out = String::new();
        self.push_role(&mut out, role);
        out
    }

    /// Renders an axiom.
    #[must_use]
    pub fn axiom(&self, axiom: &Axiom) -> String {
        let mut out = String::new();
        self.push_axiom(&mut out, axiom);
        out
    }

    /// Renders a whole ontology: header, declarations, then one axiom per
    /// line in insertion order.
    #[must_use]
    pub fn ontology(&self, ontology: &Ontology) -> String {
        let mut out = String::with_capacity(64 * ontology.axioms().len() + 128);
        out.push_str("ontology ");
        out.push_str(ontology.name());
        out.push('\n');
        self.push_declarations(&mut out, "concepts", ontology.declared_concepts().iter());
        self.push_declarations(&mut out, "roles", ontology.declared_roles().iter());
        self.push_declarations(&mut out, "individuals", ontology.declared_individuals().iter());
        out.push_str("axioms:\n");
        for axiom in ontology.axioms() {
            out.push_str("  ");
            self.push_axiom(&mut out, axiom);
            out.push('\n');
        }
        out
    }

    fn push_declarations<'a>(
        &self,
        out: &mut String,
        heading: &str,
        ids: impl Iterator<Item = &'a Identifier>,
    ) {
        out.push_str(heading);
        out.push(':');
        for (i, id) in ids.enumerate() {
            out.push_str(if i == 0 { " " } else { ", " });
            self.push_ident(out, id);
        }
        out.push('\n');
    }

    fn push_axiom(&self, out: &mut String, axiom: &Axiom) {
        match axiom {
            Axiom::ConceptInclusion { lhs, rhs } => {
                self.push_concept(out, lhs);
                out.push_str(" ⊑ ");
                self.push_concept(out, rhs);
            }
            Axiom::ConceptEquivalence(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" ≡ ");
                    }
                    self.push_concept(out, member);
                }
            }
            Axiom::RoleInclusion { lhs, rhs } => {
                self.push_role(out, lhs);
                out.push_str(" ⊑ ");
                self.push_role(out, rhs);
            }
            Axiom::ConceptAssertion {
                individual,
                concept,
            } => {
                self.push_ident(out, individual);
                out.push_str(" : ");
                self.push_concept(out, concept);
            }
            Axiom::RoleAssertion {
                role,
                subject,
                object,
            } => {
                out.push('(');
                self.push_ident(out, subject);
                out.push_str(", ");
                self.push_ident(out, object);
                out.push_str(") : ");
                self.push_role(out, role);
            }
        }
    }

    fn push_concept(&self, out: &mut String, concept: &Concept) {
        match concept {
            Concept::Top => out.push('⊤'),
            Concept::Bottom => out.push('⊥'),
            Concept::Name(id) => self.push_ident(out, id),
            Concept::OneOf(id) => {
                out.push('{');
                self.push_ident(out, id);
                out.push('}');
            }
            Concept::Not(inner) => {
                out.push('¬');
                self.push_concept(out, inner);
            }
            Concept::And(operands) => self.push_operator(out, operands, " ⊓ "),
            Concept::Or(operands) => self.push_operator(out, operands, " ⊔ "),
            Concept::SomeValues(role, filler) => {
                out.push('∃');
                self.push_role(out, role);
                out.push('.');
                self.push_concept(out, filler);
            }
            Concept::AllValues(role, filler) => {
                out.push('∀');
                self.push_role(out, role);
                out.push('.');
                self.push_concept(out, filler);
            }
        }
    }

    fn push_operator(&self, out: &mut String, operands: &Operands, sep: &str) {
        out.push('(');
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                out.push_str(sep);
            }
            self.push_concept(out, operand);
        }
        out.push(')');
    }

    fn push_role(&self, out: &mut String, role: &Role) {
        match role {
            Role::Name(id) => self.push_ident(out, id),
            Role::Inverse(inner) => {
                self.push_role(out, inner);
                out.push('⁻');
            }
        }
    }

    fn push_ident(&self, out: &mut String, id: &Identifier) {
        if self.config.simplified_names {
            out.push_str(id.local_name());
        } else {
            out.push_str(id.as_str());
        }
    }
}
