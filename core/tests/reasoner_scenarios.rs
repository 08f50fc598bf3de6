//! End-to-end reasoning scenarios, exercised across both backends.

use dl_lib::{
    Axiom, CapabilitySite, Concept, DlReasoner, ElReasoner, Identifier, Ontology, ReasonerError,
    Role, TableauReasoner,
};

fn name(n: &str) -> Concept {
    Concept::name(n)
}

/// `B ⊑ D`, `C ⊑ D`.
fn shared_profile_ontology() -> Ontology {
    Ontology::builder("scenario-b")
        .declare_concepts(["A", "B", "C", "D"])
        .axiom(Axiom::concept_inclusion(name("B"), name("D")))
        .axiom(Axiom::concept_inclusion(name("C"), name("D")))
        .build()
        .unwrap()
}

/// The shared ontology plus `A ⊑ B ⊔ C` at index 2.
fn disjunctive_ontology() -> Ontology {
    Ontology::builder("scenario-b-or")
        .declare_concepts(["A", "B", "C", "D"])
        .axiom(Axiom::concept_inclusion(name("B"), name("D")))
        .axiom(Axiom::concept_inclusion(name("C"), name("D")))
        .axiom(Axiom::concept_inclusion(
            name("A"),
            Concept::or(vec![name("B"), name("C")]).unwrap(),
        ))
        .build()
        .unwrap()
}

#[test]
fn scenario_b_el_answers_the_shared_profile() {
    let mut reasoner = ElReasoner::default();
    reasoner.load(&shared_profile_ontology()).unwrap();
    assert!(reasoner.is_subsumed_by(&name("B"), &name("D")).unwrap());
    assert!(!reasoner.is_subsumed_by(&name("D"), &name("B")).unwrap());
    assert!(!reasoner.is_subsumed_by(&name("B"), &name("C")).unwrap());
}

#[test]
fn scenario_b_disjunction_splits_the_backends() {
    let ontology = disjunctive_ontology();

    let mut el = ElReasoner::default();
    let err = el.load(&ontology).unwrap_err();
    assert_eq!(
        err,
        ReasonerError::Capability {
            engine: "EL",
            construct: "disjunction",
            site: CapabilitySite::Axiom(2),
        }
    );

    let mut tableau = TableauReasoner::default();
    tableau.load(&ontology).unwrap();
    assert!(tableau.is_subsumed_by(&name("B"), &name("D")).unwrap());
    // Entailed through the disjunction: both branches land in D.
    assert!(tableau.is_subsumed_by(&name("A"), &name("D")).unwrap());
    assert!(!tableau.is_subsumed_by(&name("A"), &name("B")).unwrap());
}

#[test]
fn el_rejects_unsupported_constructs_in_queries() {
    let mut reasoner = ElReasoner::default();
    reasoner.load(&shared_profile_ontology()).unwrap();
    let query = Concept::or(vec![name("B"), name("C")]).unwrap();
    let err = reasoner.is_satisfiable(&query).unwrap_err();
    assert_eq!(
        err,
        ReasonerError::Capability {
            engine: "EL",
            construct: "disjunction",
            site: CapabilitySite::Query,
        }
    );
}

/// `A ⊓ B ⊑ ⊥` with an individual asserted into both `A` and `B`.
fn contradictory_el_ontology() -> Ontology {
    Ontology::builder("scenario-d")
        .declare_concepts(["A", "B"])
        .declare_individual("a")
        .axiom(Axiom::concept_inclusion(
            Concept::and(vec![name("A"), name("B")]).unwrap(),
            Concept::Bottom,
        ))
        .axiom(Axiom::concept_assertion("a", name("A")))
        .axiom(Axiom::concept_assertion("a", name("B")))
        .build()
        .unwrap()
}

#[test]
fn scenario_d_inconsistency_is_a_result_under_el() {
    let mut reasoner = ElReasoner::default();
    reasoner.load(&contradictory_el_ontology()).unwrap();
    assert!(!reasoner.is_consistent().unwrap());
    // Classical semantics: everything is entailed, nothing errors.
    assert!(reasoner.is_satisfiable(&Concept::Bottom).unwrap());
    assert!(reasoner.is_satisfiable(&name("A")).unwrap());
    assert!(reasoner
        .is_subsumed_by(&Concept::Top, &Concept::Bottom)
        .unwrap());
    assert!(reasoner
        .is_instance_of(&Identifier::new("a"), &Concept::Bottom)
        .unwrap());
    let subsumers = reasoner.subsumers(&name("A")).unwrap();
    assert_eq!(subsumers, vec![Identifier::new("A"), Identifier::new("B")]);
}

#[test]
fn scenario_d_inconsistency_is_a_result_under_tableau() {
    let ontology = Ontology::builder("scenario-d-full")
        .declare_concept("A")
        .declare_individual("a")
        .axiom(Axiom::concept_assertion("a", name("A")))
        .axiom(Axiom::concept_assertion("a", Concept::not(name("A"))))
        .build()
        .unwrap();
    let mut reasoner = TableauReasoner::default();
    reasoner.load(&ontology).unwrap();
    assert!(!reasoner.is_consistent().unwrap());
    assert!(reasoner.is_satisfiable(&Concept::Bottom).unwrap());
    assert!(reasoner
        .is_subsumed_by(&Concept::Top, &Concept::Bottom)
        .unwrap());
}

#[test]
fn bottom_is_unsatisfiable_in_a_consistent_ontology() {
    let mut el = ElReasoner::default();
    el.load(&shared_profile_ontology()).unwrap();
    assert!(el.is_consistent().unwrap());
    assert!(!el.is_satisfiable(&Concept::Bottom).unwrap());
    assert!(el.is_satisfiable(&name("B")).unwrap());

    let mut tableau = TableauReasoner::default();
    tableau.load(&shared_profile_ontology()).unwrap();
    assert!(tableau.is_consistent().unwrap());
    assert!(!tableau.is_satisfiable(&Concept::Bottom).unwrap());
    assert!(tableau.is_satisfiable(&name("B")).unwrap());
}

/// `A ⊑ B ⊓ C ⊓ D`, `E ⊑ ∃r.(B ⊓ C ⊓ D)` — n-ary shapes for the
/// normalization agreement check.
fn nary_ontology() -> Ontology {
    let triple = || Concept::and(vec![name("B"), name("C"), name("D")]).unwrap();
    Ontology::builder("nary")
        .declare_concepts(["A", "B", "C", "D", "E"])
        .declare_role("r")
        .axiom(Axiom::concept_inclusion(name("A"), triple()))
        .axiom(Axiom::concept_inclusion(
            name("E"),
            Concept::some(Role::name("r"), triple()),
        ))
        .build()
        .unwrap()
}

#[test]
fn subsumption_agrees_between_original_and_binary_form() {
    let original = nary_ontology();
    let binary = original.to_binary();
    let names = ["A", "B", "C", "D", "E"];

    let mut on_original = TableauReasoner::default();
    on_original.load(&original).unwrap();
    let mut on_binary = TableauReasoner::default();
    on_binary.load(&binary).unwrap();

    for sub in names {
        for sup in names {
            let before = on_original.is_subsumed_by(&name(sub), &name(sup)).unwrap();
            let after = on_binary.is_subsumed_by(&name(sub), &name(sup)).unwrap();
            assert_eq!(before, after, "{sub} ⊑ {sup} must not change");
        }
    }
}

/// An EL-profile ontology both backends accept.
fn pizza_ontology() -> Ontology {
    Ontology::builder("pizza")
        .declare_concepts(["Margherita", "Pizza", "Topping", "Tomato"])
        .declare_role("hasTopping")
        .declare_individual("m1")
        .axiom(Axiom::concept_inclusion(
            name("Margherita"),
            Concept::and(vec![
                name("Pizza"),
                Concept::some(Role::name("hasTopping"), name("Tomato")),
            ])
            .unwrap(),
        ))
        .axiom(Axiom::concept_inclusion(name("Tomato"), name("Topping")))
        .axiom(Axiom::concept_assertion("m1", name("Margherita")))
        .build()
        .unwrap()
}

#[test]
fn backends_agree_on_el_profile_ontologies() {
    let ontology = pizza_ontology();

    let mut el = ElReasoner::default();
    el.load(&ontology).unwrap();
    let mut tableau = TableauReasoner::default();
    tableau.load(&ontology).unwrap();

    let from_el = el.subsumers(&name("Margherita")).unwrap();
    let from_tableau = tableau.subsumers(&name("Margherita")).unwrap();
    assert_eq!(from_el, from_tableau);
    assert_eq!(
        from_el,
        vec![Identifier::new("Margherita"), Identifier::new("Pizza")]
    );

    el.classify().unwrap();
    tableau.classify().unwrap();
    assert_eq!(el.taxonomy().unwrap(), tableau.taxonomy().unwrap());
}

#[test]
fn instance_checking_follows_assertions_and_axioms() {
    let ontology = pizza_ontology();
    let m1 = Identifier::new("m1");

    let mut el = ElReasoner::default();
    el.load(&ontology).unwrap();
    assert!(el.is_instance_of(&m1, &name("Pizza")).unwrap());
    assert!(el
        .is_instance_of(
            &m1,
            &Concept::some(Role::name("hasTopping"), name("Topping")),
        )
        .unwrap());
    assert!(!el.is_instance_of(&m1, &name("Tomato")).unwrap());

    let mut tableau = TableauReasoner::default();
    tableau.load(&ontology).unwrap();
    assert!(tableau.is_instance_of(&m1, &name("Pizza")).unwrap());
    assert!(!tableau.is_instance_of(&m1, &name("Tomato")).unwrap());
}

#[test]
fn role_hierarchy_feeds_entailment() {
    // parentOf ⊑ relatedTo, ∃relatedTo.⊤ ⊑ Connected, parentOf(x, y).
    let ontology = Ontology::builder("roles")
        .declare_concept("Connected")
        .declare_role("parentOf")
        .declare_role("relatedTo")
        .declare_individual("x")
        .declare_individual("y")
        .axiom(Axiom::role_inclusion(
            Role::name("parentOf"),
            Role::name("relatedTo"),
        ))
        .axiom(Axiom::concept_inclusion(
            Concept::some(Role::name("relatedTo"), Concept::Top),
            name("Connected"),
        ))
        .axiom(Axiom::role_assertion(Role::name("parentOf"), "x", "y"))
        .build()
        .unwrap();
    let x = Identifier::new("x");

    let mut el = ElReasoner::default();
    el.load(&ontology).unwrap();
    assert!(el.is_instance_of(&x, &name("Connected")).unwrap());

    let mut tableau = TableauReasoner::default();
    tableau.load(&ontology).unwrap();
    assert!(tableau.is_instance_of(&x, &name("Connected")).unwrap());
}

#[test]
fn nominals_identify_their_individual() {
    let ontology = Ontology::builder("nominals")
        .declare_concept("P")
        .declare_individual("a")
        .declare_individual("b")
        .axiom(Axiom::concept_assertion("a", name("P")))
        .build()
        .unwrap();

    let mut tableau = TableauReasoner::default();
    tableau.load(&ontology).unwrap();
    let a = Identifier::new("a");
    let b = Identifier::new("b");
    assert!(tableau.is_instance_of(&a, &Concept::one_of("a")).unwrap());
    assert!(!tableau.is_instance_of(&b, &Concept::one_of("a")).unwrap());
    assert!(tableau
        .is_subsumed_by(&Concept::one_of("a"), &name("P"))
        .unwrap());

    let mut el = ElReasoner::default();
    el.load(&ontology).unwrap();
    assert!(el.is_subsumed_by(&Concept::one_of("a"), &name("P")).unwrap());
}

#[test]
fn taxonomy_is_reflexive_and_ordered() {
    let mut el = ElReasoner::default();
    el.load(&pizza_ontology()).unwrap();
    let taxonomy = el.taxonomy().unwrap();
    assert_eq!(taxonomy.len(), 4);
    for (concept, supers) in taxonomy {
        assert!(supers.contains(concept), "{concept} must subsume itself");
    }
    assert!(taxonomy[&Identifier::new("Tomato")].contains(&Identifier::new("Topping")));
}
