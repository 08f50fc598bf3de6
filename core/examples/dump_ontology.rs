//! Demonstrates building, normalizing, formatting, and reasoning over a
//! small ontology.
//!
//! Run with: `cargo run --example dump_ontology -p dl-lib`

use dl_lib::{
    Axiom, Concept, DlFormatter, DlReasoner, ElReasoner, Ontology, ReasonerConfig, Role,
    TableauReasoner,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let ontology = Ontology::builder("pizza")
        .declare_concepts(["Margherita", "Pizza", "Tomato", "Mozzarella", "Topping"])
        .declare_role("hasTopping")
        .declare_individual("m1")
        .axiom(Axiom::concept_inclusion(
            Concept::name("Margherita"),
            Concept::and(vec![
                Concept::name("Pizza"),
                Concept::some(Role::name("hasTopping"), Concept::name("Tomato")),
                Concept::some(Role::name("hasTopping"), Concept::name("Mozzarella")),
            ])?,
        ))
        .axiom(Axiom::concept_inclusion(
            Concept::name("Tomato"),
            Concept::name("Topping"),
        ))
        .axiom(Axiom::concept_inclusion(
            Concept::name("Mozzarella"),
            Concept::name("Topping"),
        ))
        .axiom(Axiom::concept_assertion("m1", Concept::name("Margherita")))
        .build()?;

    let formatter = DlFormatter::simplified();
    println!("{}", formatter.ontology(&ontology));
    println!(
        "  {} axioms, {} distinct subconcepts, {} concept names in use",
        ontology.axioms().len(),
        ontology.sub_concepts().len(),
        ontology.concept_names().len(),
    );
    println!();

    // The reasoning calculus expects strictly binary conjunctions.
    println!("Converting to binary conjunctions:");
    let binary = ontology.to_binary();
    for axiom in binary.tbox() {
        println!("  {}", formatter.axiom(axiom));
    }
    println!();

    let mut elk_like = ElReasoner::new(ReasonerConfig::default());
    elk_like.load(&binary)?;
    println!(
        "[{}] consistent: {}",
        elk_like.engine_name(),
        elk_like.is_consistent()?
    );
    println!("[{}] subsumers of Margherita:", elk_like.engine_name());
    for concept in elk_like.subsumers(&Concept::name("Margherita"))? {
        println!("  - {concept}");
    }
    elk_like.dispose()?;

    let mut hermit_like = TableauReasoner::new(ReasonerConfig::default());
    hermit_like.load(&binary)?;
    println!(
        "[{}] m1 : ∃hasTopping.Topping: {}",
        hermit_like.engine_name(),
        hermit_like.is_instance_of(
            &"m1".into(),
            &Concept::some(Role::name("hasTopping"), Concept::name("Topping")),
        )?
    );
    hermit_like.dispose()?;

    Ok(())
}
