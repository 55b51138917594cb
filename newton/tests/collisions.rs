use newton::investigation::events::EventKind;
use newton::investigation::validate::Validator;
use newton::ir::{Ir, ObjectSpec};
use newton::laws::catalog::ConservationLaw;
use newton::simulation::SimulationEngine;
use glam::DVec3;

fn ball(id: &str, x: f64, vx: f64) -> ObjectSpec {
    let mut spec = ObjectSpec::new(id);
    spec.position = DVec3::new(x, 1.0, 0.0);
    spec.velocity = DVec3::new(vx, 0.0, 0.0);
    spec.properties.insert("radius".into(), 0.5);
    spec
}

fn head_on() -> Ir {
    let mut ir = Ir::default();
    ir.system.environment.gravity = 0.0;
    ir.system.environment.ground_level = None;
    ir.system.conservation_laws = vec![ConservationLaw::Momentum, ConservationLaw::Mass];
    ir.system.objects = vec![ball("left", -2.0, 1.0), ball("right", 2.0, -1.0)];
    ir.simulation.duration = 4.0;
    ir
}

#[test]
fn test_symmetric_collision_conserves_momentum() {
    let ir = head_on();
    let output = SimulationEngine::default().run(&ir);
    assert!(output.success);

    // 1. One collision, when the surfaces meet
    let collisions: Vec<_> = output
        .events
        .iter()
        .filter(|e| e.kind == EventKind::Collision)
        .collect();
    assert_eq!(collisions.len(), 1);
    assert!((collisions[0].time - 1.5).abs() <= 0.02);

    // 2. Equal masses swap velocities
    let left = &output.final_state.objects["left"];
    let right = &output.final_state.objects["right"];
    assert!(left.velocity.x < 0.0);
    assert!(right.velocity.x > 0.0);

    // 3. Momentum within 1 %
    let report = Validator::default().validate(&ir, &output);
    for check in &report.conservation_checks {
        assert!(check.passed, "{} deviated by {}%", check.law, check.deviation);
    }
    assert!(report.causality_violations.is_empty());
}

#[test]
fn test_inelastic_collision_still_conserves_momentum() {
    let mut ir = head_on();
    ir.system.environment.collision_restitution = 0.0;
    let output = SimulationEngine::default().run(&ir);

    let total = output.final_state.total_momentum();
    assert!(total.length() < 1e-9);
    let left = &output.final_state.objects["left"];
    assert!(left.velocity.length() < 1e-9);
}
