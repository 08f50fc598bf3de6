//! Normal-form compilation and completion-rule saturation.
//!
//! Told axioms are first compiled to the EL normal forms, introducing a
//! fresh class (with defining axioms in both directions) for every complex
//! subconcept. A worklist then closes the subsumer sets `S(X)` and the role
//! successor relation under the completion rules, including bottom
//! propagation and the role hierarchy. The loop terminates because every
//! step inserts into a finite set.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::{BudgetExceeded, ClassId, ElConcept, ElKnowledgeBase, RoleId};

/// The result of saturating a knowledge base: the closed subsumer sets.
#[derive(Debug, Clone)]
pub struct Saturation {
    subsumers: Vec<BTreeSet<ClassId>>,
}

impl Saturation {
    /// Whether `sub ⊑ sup` is entailed.
    ///
    /// An unsatisfiable class is subsumed by everything.
    #[must_use]
    pub fn is_subsumed(&self, sub: ClassId, sup: ClassId) -> bool {
        if sup == ClassId::TOP {
            return true;
        }
        let set = &self.subsumers[sub.index()];
        set.contains(&sup) || set.contains(&ClassId::BOTTOM)
    }

    /// Whether the class is subsumed by `⊥`.
    #[must_use]
    pub fn is_unsatisfiable(&self, class: ClassId) -> bool {
        self.subsumers[class.index()].contains(&ClassId::BOTTOM)
    }

    /// The saturated subsumer set `S(class)`, in id order.
    pub fn subsumers(&self, class: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        self.subsumers[class.index()].iter().copied()
    }
}

/// Compiled normal forms, indexed for the completion rules.
struct NormalForms {
    class_count: usize,
    /// `A ⊑ B`, indexed by `A`.
    told: Vec<Vec<ClassId>>,
    /// `A₁ ⊓ A₂ ⊑ B`, indexed by either conjunct as `(other, B)`.
    conj: Vec<Vec<(ClassId, ClassId)>>,
    /// `A ⊑ ∃r.B`, indexed by `A` as `(r, B)`.
    exists_rhs: Vec<Vec<(RoleId, ClassId)>>,
    /// `∃r.B ⊑ C`, keyed by `(r, B)`.
    exists_lhs: HashMap<(RoleId, ClassId), Vec<ClassId>>,
    /// Direct super-roles from `r ⊑ s`.
    super_direct: Vec<Vec<RoleId>>,
}

impl NormalForms {
    fn told(&self, id: ClassId) -> &[ClassId] {
        self.told.get(id.index()).map_or(&[], Vec::as_slice)
    }

    fn conj(&self, id: ClassId) -> &[(ClassId, ClassId)] {
        self.conj.get(id.index()).map_or(&[], Vec::as_slice)
    }

    fn exists_rhs(&self, id: ClassId) -> &[(RoleId, ClassId)] {
        self.exists_rhs.get(id.index()).map_or(&[], Vec::as_slice)
    }

    fn super_direct(&self, id: RoleId) -> &[RoleId] {
        self.super_direct.get(id.index()).map_or(&[], Vec::as_slice)
    }
}

struct Compiler {
    next_class: u32,
    cache: HashMap<ElConcept, ClassId>,
    nf: NormalForms,
}

impl Compiler {
    fn fresh(&mut self) -> ClassId {
        let id = ClassId(self.next_class);
        self.next_class += 1;
        id
    }

    fn told_mut(&mut self, id: ClassId) -> &mut Vec<ClassId> {
        grow(&mut self.nf.told, id.index());
        &mut self.nf.told[id.index()]
    }

    fn conj_mut(&mut self, id: ClassId) -> &mut Vec<(ClassId, ClassId)> {
        grow(&mut self.nf.conj, id.index());
        &mut self.nf.conj[id.index()]
    }

    fn exists_rhs_mut(&mut self, id: ClassId) -> &mut Vec<(RoleId, ClassId)> {
        grow(&mut self.nf.exists_rhs, id.index());
        &mut self.nf.exists_rhs[id.index()]
    }

    /// Representative class for a concept, introducing defining normal-form
    /// axioms in both directions for complex subconcepts.
    fn rep(&mut self, concept: &ElConcept) -> ClassId {
        match concept {
            ElConcept::Atom(id) => *id,
            ElConcept::Conjunction(parts) => {
                if let Some(&id) = self.cache.get(concept) {
                    return id;
                }
                let reps: Vec<ClassId> = parts.iter().map(|p| self.rep(p)).collect();
                let x = self.fresh();
                self.cache.insert(concept.clone(), x);
                for &part in &reps {
                    self.told_mut(x).push(part);
                }
                match reps.as_slice() {
                    // Empty conjunction is ⊤.
                    [] => self.told_mut(ClassId::TOP).push(x),
                    [only] => {
                        let only = *only;
                        self.told_mut(only).push(x);
                    }
                    _ => {
                        // Binarize: a₁ ⊓ a₂ ⊑ y₁, y₁ ⊓ a₃ ⊑ y₂, …, yₙ₋₂ = x.
                        let mut current = reps[0];
                        for (i, &part) in reps[1..].iter().enumerate() {
                            let target = if i == reps.len() - 2 { x } else { self.fresh() };
                            self.conj_mut(current).push((part, target));
                            self.conj_mut(part).push((current, target));
                            current = target;
                        }
                    }
                }
                x
            }
            ElConcept::Exists(role, filler) => {
                if let Some(&id) = self.cache.get(concept) {
                    return id;
                }
                let filler_rep = self.rep(filler);
                let x = self.fresh();
                self.cache.insert(concept.clone(), x);
                self.exists_rhs_mut(x).push((*role, filler_rep));
                self.nf
                    .exists_lhs
                    .entry((*role, filler_rep))
                    .or_default()
                    .push(x);
                x
            }
        }
    }
}

fn grow<T: Default>(v: &mut Vec<T>, index: usize) {
    if v.len() <= index {
        v.resize_with(index + 1, T::default);
    }
}

fn compile(kb: &ElKnowledgeBase) -> NormalForms {
    let mut compiler = Compiler {
        next_class: kb.class_count() as u32,
        cache: HashMap::new(),
        nf: NormalForms {
            class_count: 0,
            told: Vec::new(),
            conj: Vec::new(),
            exists_rhs: Vec::new(),
            exists_lhs: HashMap::new(),
            super_direct: vec![Vec::new(); kb.role_count()],
        },
    };
    for (lhs, rhs) in kb.inclusions() {
        let sub = compiler.rep(lhs);
        let sup = compiler.rep(rhs);
        compiler.told_mut(sub).push(sup);
    }
    for &(sub, sup) in kb.role_inclusions() {
        compiler.nf.super_direct[sub.index()].push(sup);
    }
    compiler.nf.class_count = compiler.next_class as usize;
    compiler.nf
}

enum Work {
    Sub(ClassId, ClassId),
    Edge(ClassId, RoleId, ClassId),
}

pub(crate) fn saturate(
    kb: &ElKnowledgeBase,
    budget: Option<Duration>,
) -> Result<Saturation, BudgetExceeded> {
    let start = Instant::now();
    let nf = compile(kb);
    let n = nf.class_count;

    let mut subsumers: Vec<BTreeSet<ClassId>> = vec![BTreeSet::new(); n];
    let mut preds: Vec<Vec<(RoleId, ClassId)>> = vec![Vec::new(); n];
    let mut edges: HashSet<(ClassId, RoleId, ClassId)> = HashSet::new();
    let mut queue: VecDeque<Work> = VecDeque::new();

    for index in 0..n {
        let class = ClassId(index as u32);
        queue.push_back(Work::Sub(class, class));
        queue.push_back(Work::Sub(class, ClassId::TOP));
    }

    let mut ticks: u64 = 0;
    while let Some(work) = queue.pop_front() {
        if ticks % 64 == 0 {
            if let Some(budget) = budget {
                if start.elapsed() >= budget {
                    return Err(BudgetExceeded { budget });
                }
            }
        }
        ticks += 1;

        match work {
            Work::Sub(x, b) => {
                if !subsumers[x.index()].insert(b) {
                    continue;
                }
                for &d in nf.told(b) {
                    queue.push_back(Work::Sub(x, d));
                }
                for &(other, d) in nf.conj(b) {
                    if subsumers[x.index()].contains(&other) {
                        queue.push_back(Work::Sub(x, d));
                    }
                }
                for &(role, d) in nf.exists_rhs(b) {
                    queue.push_back(Work::Edge(x, role, d));
                }
                for &(role, w) in &preds[x.index()] {
                    if let Some(ds) = nf.exists_lhs.get(&(role, b)) {
                        for &d in ds {
                            queue.push_back(Work::Sub(w, d));
                        }
                    }
                }
                if b == ClassId::BOTTOM {
                    for &(_, w) in &preds[x.index()] {
                        queue.push_back(Work::Sub(w, ClassId::BOTTOM));
                    }
                }
            }
            Work::Edge(x, role, y) => {
                if !edges.insert((x, role, y)) {
                    continue;
                }
                preds[y.index()].push((role, x));
                for &b in &subsumers[y.index()] {
                    if let Some(ds) = nf.exists_lhs.get(&(role, b)) {
                        for &d in ds {
                            queue.push_back(Work::Sub(x, d));
                        }
                    }
                }
                if subsumers[y.index()].contains(&ClassId::BOTTOM) {
                    queue.push_back(Work::Sub(x, ClassId::BOTTOM));
                }
                for &sup in nf.super_direct(role) {
                    queue.push_back(Work::Edge(x, sup, y));
                }
            }
        }
    }

    debug!(classes = n, steps = ticks, "saturation complete");
    Ok(Saturation { subsumers })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(id: ClassId) -> ElConcept {
        ElConcept::Atom(id)
    }

    #[test]
    fn told_subsumption_closes_transitively() -> Result<(), BudgetExceeded> {
        let mut kb = ElKnowledgeBase::new();
        let a = kb.class("A");
        let b = kb.class("B");
        let c = kb.class("C");
        kb.add_inclusion(atom(a), atom(b));
        kb.add_inclusion(atom(b), atom(c));
        let sat = kb.saturate(None)?;
        assert!(sat.is_subsumed(a, c));
        assert!(!sat.is_subsumed(c, a));
        Ok(())
    }

    #[test]
    fn conjunction_decomposes_and_composes() -> Result<(), BudgetExceeded> {
        let mut kb = ElKnowledgeBase::new();
        let a = kb.class("A");
        let b = kb.class("B");
        let c = kb.class("C");
        // A ⊑ B ⊓ C
        kb.add_inclusion(atom(a), ElConcept::Conjunction(vec![atom(b), atom(c)]));
        let sat = kb.saturate(None)?;
        assert!(sat.is_subsumed(a, b));
        assert!(sat.is_subsumed(a, c));
        Ok(())
    }

    #[test]
    fn existentials_chain_through_edges() -> Result<(), BudgetExceeded> {
        let mut kb = ElKnowledgeBase::new();
        let a = kb.class("A");
        let b = kb.class("B");
        let c = kb.class("C");
        let r = kb.role("r");
        // A ⊑ ∃r.B and ∃r.B ⊑ C entail A ⊑ C.
        kb.add_inclusion(atom(a), ElConcept::Exists(r, Box::new(atom(b))));
        kb.add_inclusion(ElConcept::Exists(r, Box::new(atom(b))), atom(c));
        let sat = kb.saturate(None)?;
        assert!(sat.is_subsumed(a, c));
        Ok(())
    }

    #[test]
    fn filler_subsumers_propagate_through_edges() -> Result<(), BudgetExceeded> {
        let mut kb = ElKnowledgeBase::new();
        let a = kb.class("A");
        let b = kb.class("B");
        let b_sup = kb.class("Bsup");
        let c = kb.class("C");
        let r = kb.role("r");
        // A ⊑ ∃r.B, B ⊑ Bsup, ∃r.Bsup ⊑ C entail A ⊑ C.
        kb.add_inclusion(atom(a), ElConcept::Exists(r, Box::new(atom(b))));
        kb.add_inclusion(atom(b), atom(b_sup));
        kb.add_inclusion(ElConcept::Exists(r, Box::new(atom(b_sup))), atom(c));
        let sat = kb.saturate(None)?;
        assert!(sat.is_subsumed(a, c));
        Ok(())
    }

    #[test]
    fn bottom_propagates_backwards_over_edges() -> Result<(), BudgetExceeded> {
        let mut kb = ElKnowledgeBase::new();
        let a = kb.class("A");
        let x = kb.class("X");
        let r = kb.role("r");
        kb.add_inclusion(atom(a), ElConcept::Exists(r, Box::new(atom(x))));
        kb.add_inclusion(atom(x), atom(ClassId::BOTTOM));
        let sat = kb.saturate(None)?;
        assert!(sat.is_unsatisfiable(a));
        assert!(sat.is_subsumed(a, x));
        Ok(())
    }

    #[test]
    fn role_hierarchy_lifts_edges() -> Result<(), BudgetExceeded> {
        let mut kb = ElKnowledgeBase::new();
        let a = kb.class("A");
        let b = kb.class("B");
        let c = kb.class("C");
        let r = kb.role("r");
        let s = kb.role("s");
        kb.add_role_inclusion(r, s);
        kb.add_inclusion(atom(a), ElConcept::Exists(r, Box::new(atom(b))));
        kb.add_inclusion(ElConcept::Exists(s, Box::new(atom(b))), atom(c));
        let sat = kb.saturate(None)?;
        assert!(sat.is_subsumed(a, c));
        Ok(())
    }

    #[test]
    fn zero_budget_times_out() {
        let mut kb = ElKnowledgeBase::new();
        let a = kb.class("A");
        let b = kb.class("B");
        kb.add_inclusion(atom(a), atom(b));
        let err = kb.saturate(Some(Duration::ZERO)).err();
        assert_eq!(err, Some(BudgetExceeded { budget: Duration::ZERO }));
    }

    #[test]
    fn shared_subconcepts_are_cached_once() -> Result<(), BudgetExceeded> {
        let mut kb = ElKnowledgeBase::new();
        let a = kb.class("A");
        let b = kb.class("B");
        let c = kb.class("C");
        let r = kb.role("r");
        let exists = ElConcept::Exists(r, Box::new(atom(b)));
        kb.add_inclusion(atom(a), exists.clone());
        kb.add_inclusion(exists, atom(c));
        let sat = kb.saturate(None)?;
        // Both uses resolve to the same representative, so the chain closes.
        assert!(sat.is_subsumed(a, c));
        Ok(())
    }
}
