//! Negation normal form, role-hierarchy closure, and the tableau expansion
//! loop.
//!
//! The TBox is internalized: every GCI `C ⊑ D` becomes the constraint
//! `¬C ⊔ D` added to every node label. Deterministic rules (⊓, ∀, nominal
//! merging) run to a fixpoint, disjunctions branch with backtracking over a
//! cloned state, and existential successors are generated last, gated by
//! ancestor subset blocking so expansion terminates.
//!
//! Nominals follow the unique-name assumption: an anonymous node carrying a
//! nominal merges into that individual's root, and a label carrying two
//! distinct nominals is a clash.
//! TODO: replace subset blocking with pairwise blocking so heavy inverse-role
//! nesting above blocked nodes is complete, not just terminating.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::{BudgetExceeded, IndividualId, TConcept, TRole, TableauKnowledgeBase};

pub(crate) fn is_consistent(
    kb: &TableauKnowledgeBase,
    budget: Option<Duration>,
) -> Result<bool, BudgetExceeded> {
    let constraints: Vec<TConcept> = kb
        .gcis()
        .iter()
        .map(|(lhs, rhs)| TConcept::Or(vec![nnf_neg(lhs), nnf(rhs)]))
        .collect();
    let superroles = role_closure(kb);

    let mut state = State::new();
    let mut roots = HashMap::new();
    for index in 0..kb.individual_count() {
        let individual = IndividualId(index as u32);
        let node = state.add_node(None);
        if !kb.is_anonymous(individual) {
            state.nodes[node].label.insert(TConcept::Nominal(individual));
        }
        roots.insert(individual, node);
    }
    if state.nodes.is_empty() {
        // Nonempty-domain semantics: consistency of a pure TBox is judged at
        // one anonymous element.
        state.add_node(None);
    }
    for (individual, concept) in kb.concept_assertions() {
        state.nodes[roots[individual]].label.insert(nnf(concept));
    }
    for &(role, subject, object) in kb.role_assertions() {
        state.edges.push((roots[&subject], role, roots[&object]));
    }
    for node in &mut state.nodes {
        node.label.extend(constraints.iter().cloned());
    }

    let expander = Expander {
        constraints,
        superroles,
        roots,
        start: Instant::now(),
        budget,
    };
    let consistent = expander.solve(state)?;
    debug!(consistent, "tableau finished");
    Ok(consistent)
}

/// Rewrites into negation normal form: negation only on names and nominals.
fn nnf(concept: &TConcept) -> TConcept {
    match concept {
        TConcept::Top | TConcept::Bottom | TConcept::Name(_) | TConcept::Nominal(_) => {
            concept.clone()
        }
        TConcept::Not(inner) => nnf_neg(inner),
        TConcept::And(parts) => TConcept::And(parts.iter().map(nnf).collect()),
        TConcept::Or(parts) => TConcept::Or(parts.iter().map(nnf).collect()),
        TConcept::Exists(role, filler) => TConcept::Exists(*role, Box::new(nnf(filler))),
        TConcept::ForAll(role, filler) => TConcept::ForAll(*role, Box::new(nnf(filler))),
    }
}

/// Negation normal form of `¬concept`.
fn nnf_neg(concept: &TConcept) -> TConcept {
    match concept {
        TConcept::Top => TConcept::Bottom,
        TConcept::Bottom => TConcept::Top,
        TConcept::Name(_) | TConcept::Nominal(_) => TConcept::Not(Box::new(concept.clone())),
        TConcept::Not(inner) => nnf(inner),
        TConcept::And(parts) => TConcept::Or(parts.iter().map(nnf_neg).collect()),
        TConcept::Or(parts) => TConcept::And(parts.iter().map(nnf_neg).collect()),
        TConcept::Exists(role, filler) => TConcept::ForAll(*role, Box::new(nnf_neg(filler))),
        TConcept::ForAll(role, filler) => TConcept::Exists(*role, Box::new(nnf_neg(filler))),
    }
}

/// Reflexive-transitive super-role closure over both polarities.
fn role_closure(kb: &TableauKnowledgeBase) -> HashMap<TRole, HashSet<TRole>> {
    let mut direct: HashMap<TRole, HashSet<TRole>> = HashMap::new();
    for &(sub, sup) in kb.role_inclusions() {
        direct.entry(sub).or_default().insert(sup);
        direct
            .entry(sub.inverted())
            .or_default()
            .insert(sup.inverted());
    }
    let mut closure = HashMap::new();
    for index in 0..kb.role_count() {
        let name = crate::RoleId(index as u32);
        for role in [TRole::named(name), TRole::named(name).inverted()] {
            let mut reach: HashSet<TRole> = HashSet::new();
            let mut stack = vec![role];
            while let Some(current) = stack.pop() {
                if !reach.insert(current) {
                    continue;
                }
                if let Some(sups) = direct.get(&current) {
                    stack.extend(sups.iter().copied());
                }
            }
            closure.insert(role, reach);
        }
    }
    closure
}

#[derive(Debug, Clone)]
struct Node {
    label: BTreeSet<TConcept>,
    parent: Option<usize>,
}

#[derive(Debug, Clone)]
struct State {
    nodes: Vec<Node>,
    edges: Vec<(usize, TRole, usize)>,
    redirect: Vec<Option<usize>>,
}

impl State {
    fn new() -> Self {
        State {
            nodes: Vec::new(),
            edges: Vec::new(),
            redirect: Vec::new(),
        }
    }

    fn add_node(&mut self, parent: Option<usize>) -> usize {
        self.nodes.push(Node {
            label: BTreeSet::new(),
            parent,
        });
        self.redirect.push(None);
        self.nodes.len() - 1
    }

    fn canon(&self, mut node: usize) -> usize {
        while let Some(next) = self.redirect[node] {
            node = next;
        }
        node
    }

    fn is_canonical(&self, node: usize) -> bool {
        self.redirect[node].is_none()
    }

    /// Merges `from` into `into`; edges keep their indices and are resolved
    /// through [`canon`](Self::canon) at traversal time.
    fn merge(&mut self, from: usize, into: usize) {
        let from = self.canon(from);
        let into = self.canon(into);
        if from == into {
            return;
        }
        let moved = std::mem::take(&mut self.nodes[from].label);
        self.nodes[into].label.extend(moved);
        self.redirect[from] = Some(into);
    }

    /// Nodes reachable from `node` over an edge whose role entails `wanted`,
    /// in either direction.
    fn successors(
        &self,
        node: usize,
        wanted: TRole,
        superroles: &HashMap<TRole, HashSet<TRole>>,
    ) -> Vec<usize> {
        let mut out = Vec::new();
        for &(from, role, to) in &self.edges {
            let from = self.canon(from);
            let to = self.canon(to);
            if from == node && role_entails(role, wanted, superroles) {
                out.push(to);
            }
            if to == node && role_entails(role.inverted(), wanted, superroles) {
                out.push(from);
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }
}

fn role_entails(
    edge_role: TRole,
    wanted: TRole,
    superroles: &HashMap<TRole, HashSet<TRole>>,
) -> bool {
    edge_role == wanted
        || superroles
            .get(&edge_role)
            .is_some_and(|sups| sups.contains(&wanted))
}

struct Expander {
    constraints: Vec<TConcept>,
    superroles: HashMap<TRole, HashSet<TRole>>,
    roots: HashMap<IndividualId, usize>,
    start: Instant,
    budget: Option<Duration>,
}

impl Expander {
    fn check_budget(&self) -> Result<(), BudgetExceeded> {
        if let Some(budget) = self.budget {
            if self.start.elapsed() >= budget {
                return Err(BudgetExceeded { budget });
            }
        }
        Ok(())
    }

    fn solve(&self, mut state: State) -> Result<bool, BudgetExceeded> {
        loop {
            self.check_budget()?;
            loop {
                self.check_budget()?;
                let changed = self.apply_deterministic(&mut state);
                if self.has_clash(&state) {
                    return Ok(false);
                }
                if !changed {
                    break;
                }
            }
            if let Some((node, parts)) = find_open_or(&state) {
                trace!(node, choices = parts.len(), "branching on disjunction");
                for part in parts {
                    let mut branch = state.clone();
                    branch.nodes[node].label.insert(part);
                    if self.solve(branch)? {
                        return Ok(true);
                    }
                }
                return Ok(false);
            }
            if let Some((node, role, filler)) = self.find_open_exists(&state) {
                let successor = state.add_node(Some(node));
                state.nodes[successor].label.insert(filler);
                for constraint in &self.constraints {
                    state.nodes[successor].label.insert(constraint.clone());
                }
                state.edges.push((node, role, successor));
                trace!(node, successor, "generated existential successor");
                continue;
            }
            return Ok(true);
        }
    }

    fn apply_deterministic(&self, state: &mut State) -> bool {
        let mut changed = false;

        // ⊓-rule: decompose conjunctions in place.
        for index in 0..state.nodes.len() {
            if !state.is_canonical(index) {
                continue;
            }
            let additions: Vec<TConcept> = state.nodes[index]
                .label
                .iter()
                .filter_map(|c| match c {
                    TConcept::And(parts) => Some(parts.clone()),
                    _ => None,
                })
                .flatten()
                .filter(|part| !state.nodes[index].label.contains(part))
                .collect();
            for part in additions {
                changed |= state.nodes[index].label.insert(part);
            }
        }

        // ∀-rule: propagate to every matching successor, both directions.
        for index in 0..state.nodes.len() {
            if !state.is_canonical(index) {
                continue;
            }
            let universals: Vec<(TRole, TConcept)> = state.nodes[index]
                .label
                .iter()
                .filter_map(|c| match c {
                    TConcept::ForAll(role, filler) => Some((*role, (**filler).clone())),
                    _ => None,
                })
                .collect();
            for (role, filler) in universals {
                for successor in state.successors(index, role, &self.superroles) {
                    if !state.nodes[successor].label.contains(&filler) {
                        state.nodes[successor].label.insert(filler.clone());
                        changed = true;
                    }
                }
            }
        }

        // Nominal rule: an anonymous node carrying `{o}` is the individual o.
        loop {
            let mut pending = None;
            'scan: for index in 0..state.nodes.len() {
                if !state.is_canonical(index) {
                    continue;
                }
                for concept in &state.nodes[index].label {
                    if let TConcept::Nominal(individual) = concept {
                        let root = state.canon(self.roots[individual]);
                        if root != index {
                            pending = Some((index, root));
                            break 'scan;
                        }
                    }
                }
            }
            match pending {
                Some((node, root)) => {
                    state.merge(node, root);
                    changed = true;
                }
                None => break,
            }
        }

        changed
    }

    fn has_clash(&self, state: &State) -> bool {
        for index in 0..state.nodes.len() {
            if !state.is_canonical(index) {
                continue;
            }
            let label = &state.nodes[index].label;
            if label.contains(&TConcept::Bottom) {
                return true;
            }
            let mut nominals = 0usize;
            for concept in label {
                match concept {
                    TConcept::Not(inner) => {
                        if label.contains(inner.as_ref()) {
                            return true;
                        }
                    }
                    TConcept::Nominal(_) => nominals += 1,
                    _ => {}
                }
            }
            // Unique-name assumption: one element cannot be two individuals.
            if nominals > 1 {
                return true;
            }
        }
        false
    }

    fn find_open_exists(&self, state: &State) -> Option<(usize, TRole, TConcept)> {
        for index in 0..state.nodes.len() {
            if !state.is_canonical(index) {
                continue;
            }
            for concept in &state.nodes[index].label {
                if let TConcept::Exists(role, filler) = concept {
                    let satisfied = state
                        .successors(index, *role, &self.superroles)
                        .iter()
                        .any(|&s| state.nodes[s].label.contains(filler.as_ref()));
                    if !satisfied {
                        if self.blocked(state, index) {
                            continue;
                        }
                        return Some((index, *role, (**filler).clone()));
                    }
                }
            }
        }
        None
    }

    /// Ancestor subset blocking: a node whose label is contained in an
    /// ancestor's label reuses that ancestor's model fragment instead of
    /// growing a fresh subtree.
    fn blocked(&self, state: &State, node: usize) -> bool {
        let mut ancestor = state.nodes[node].parent;
        while let Some(current) = ancestor {
            let current = state.canon(current);
            if state.nodes[node].label.is_subset(&state.nodes[current].label) {
                return true;
            }
            ancestor = state.nodes[current].parent;
        }
        false
    }
}

fn find_open_or(state: &State) -> Option<(usize, Vec<TConcept>)> {
    for index in 0..state.nodes.len() {
        if !state.is_canonical(index) {
            continue;
        }
        let label = &state.nodes[index].label;
        for concept in label {
            if let TConcept::Or(parts) = concept {
                if !parts.iter().any(|part| label.contains(part)) {
                    return Some((index, parts.clone()));
                }
            }
        }
    }
    None
}
