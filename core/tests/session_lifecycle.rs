//! Session protocol tests: `Created → Loaded → {Classified} → Disposed`,
//! invalid-state rejection, and timeout behavior.

use std::time::Duration;

use dl_lib::{
    Axiom, Concept, DlReasoner, ElReasoner, Ontology, ReasonerConfig, ReasonerError, Role,
    SessionState, TableauReasoner,
};

fn sample_ontology() -> Ontology {
    Ontology::builder("sample")
        .declare_concepts(["A", "B", "C"])
        .declare_role("r")
        .axiom(Axiom::concept_inclusion(Concept::name("A"), Concept::name("B")))
        .axiom(Axiom::concept_inclusion(
            Concept::name("B"),
            Concept::some(Role::name("r"), Concept::name("C")),
        ))
        .build()
        .unwrap()
}

fn backends() -> Vec<Box<dyn DlReasoner>> {
    vec![
        Box::new(ElReasoner::default()),
        Box::new(TableauReasoner::default()),
    ]
}

#[test]
fn queries_before_load_are_invalid() {
    for mut session in backends() {
        let err = session.is_consistent().unwrap_err();
        assert_eq!(
            err,
            ReasonerError::InvalidState {
                operation: "is_consistent",
                state: SessionState::Created,
            }
        );
        let err = session.classify().unwrap_err();
        assert_eq!(
            err,
            ReasonerError::InvalidState {
                operation: "classify",
                state: SessionState::Created,
            }
        );
    }
}

#[test]
fn load_is_valid_exactly_once() {
    let ontology = sample_ontology();
    for mut session in backends() {
        session.load(&ontology).unwrap();
        let err = session.load(&ontology).unwrap_err();
        assert_eq!(
            err,
            ReasonerError::InvalidState {
                operation: "load",
                state: SessionState::Loaded,
            }
        );
    }
}

#[test]
fn classify_is_idempotent_and_moves_the_state() {
    let ontology = sample_ontology();

    let mut el = ElReasoner::default();
    el.load(&ontology).unwrap();
    assert_eq!(el.state(), SessionState::Loaded);
    el.classify().unwrap();
    assert_eq!(el.state(), SessionState::Classified);
    el.classify().unwrap();
    assert_eq!(el.state(), SessionState::Classified);

    let mut tableau = TableauReasoner::default();
    tableau.load(&ontology).unwrap();
    tableau.classify().unwrap();
    assert_eq!(tableau.state(), SessionState::Classified);
    tableau.classify().unwrap();
    assert_eq!(tableau.state(), SessionState::Classified);
}

#[test]
fn named_subsumption_classifies_lazily_under_el() {
    let mut el = ElReasoner::default();
    el.load(&sample_ontology()).unwrap();
    assert_eq!(el.state(), SessionState::Loaded);
    assert!(el
        .is_subsumed_by(&Concept::name("A"), &Concept::name("B"))
        .unwrap());
    assert_eq!(el.state(), SessionState::Classified);
}

#[test]
fn scenario_c_disposed_sessions_reject_everything() {
    let ontology = sample_ontology();
    for mut session in backends() {
        session.load(&ontology).unwrap();
        session.dispose().unwrap();

        let err = session.is_consistent().unwrap_err();
        assert_eq!(
            err,
            ReasonerError::InvalidState {
                operation: "is_consistent",
                state: SessionState::Disposed,
            }
        );
        assert!(session.is_satisfiable(&Concept::name("A")).is_err());
        assert!(session
            .is_subsumed_by(&Concept::name("A"), &Concept::name("B"))
            .is_err());
        assert!(session.classify().is_err());
        assert!(session.taxonomy().is_err());

        // Terminal: dispose itself is no longer valid either.
        let err = session.dispose().unwrap_err();
        assert_eq!(
            err,
            ReasonerError::InvalidState {
                operation: "dispose",
                state: SessionState::Disposed,
            }
        );
    }
}

#[test]
fn dispose_is_valid_before_load() {
    for mut session in backends() {
        session.dispose().unwrap();
        assert!(session.load(&sample_ontology()).is_err());
    }
}

#[test]
fn timeouts_are_not_fatal() {
    let exhausted = ReasonerConfig {
        time_budget: Some(Duration::ZERO),
    };
    let ontology = sample_ontology();

    let mut el = ElReasoner::new(exhausted);
    el.load(&ontology).unwrap();
    let err = el.is_consistent().unwrap_err();
    assert_eq!(
        err,
        ReasonerError::Timeout {
            budget: Duration::ZERO,
        }
    );
    // The session is still loaded and keeps answering (with the same
    // verdict, given the same budget) rather than entering a failed state.
    assert_eq!(el.state(), SessionState::Loaded);
    assert!(matches!(
        el.is_satisfiable(&Concept::name("A")).unwrap_err(),
        ReasonerError::Timeout { .. }
    ));
    el.dispose().unwrap();

    let mut tableau = TableauReasoner::new(exhausted);
    tableau.load(&ontology).unwrap();
    assert!(matches!(
        tableau.is_consistent().unwrap_err(),
        ReasonerError::Timeout { .. }
    ));
    assert_eq!(tableau.state(), SessionState::Loaded);
    tableau.dispose().unwrap();
}

#[test]
fn generous_budgets_complete() {
    let config = ReasonerConfig {
        time_budget: Some(Duration::from_secs(30)),
    };
    let mut el = ElReasoner::new(config);
    el.load(&sample_ontology()).unwrap();
    assert!(el.is_consistent().unwrap());

    let mut tableau = TableauReasoner::new(config);
    tableau.load(&sample_ontology()).unwrap();
    assert!(tableau.is_consistent().unwrap());
}

#[test]
fn engine_names_distinguish_backends() {
    assert_eq!(ElReasoner::default().engine_name(), "el-saturation");
    assert_eq!(TableauReasoner::default().engine_name(), "tableau");
}
