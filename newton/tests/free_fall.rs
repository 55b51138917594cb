use newton::investigation::events::EventKind;
use newton::ir::{IrAssembler, SystemInput};
use newton::simulation::SimulationEngine;

#[test]
fn test_impact_time_matches_closed_form() {
    // 1. A ball dropped from 20 m onto the default ground
    let height = 20.0;
    let mut input = SystemInput::new("free_fall", "A ball is dropped from a tower")
        .with_parameter("m", 1.0, "kg")
        .with_parameter("h", height, "m");
    input.simulation.duration = Some(3.0);
    let ir = IrAssembler::default().assemble(&input).unwrap();
    let g = ir.system.environment.gravity;
    let dt = ir.simulation.time_step;
    assert_eq!(ir.system.objects[0].position.y, height);

    // 2. Simulate
    let output = SimulationEngine::default().run(&ir);
    assert!(output.success);

    // 3. First sample on the ground is within one step of sqrt(2h/g)
    let expected = (2.0 * height / g).sqrt();
    let landed = output
        .time_series
        .iter()
        .find(|s| s.objects["object_1"].position.y <= 0.0)
        .unwrap();
    assert!(
        (landed.time - expected).abs() <= dt + 1e-9,
        "landed at {} expected {}",
        landed.time,
        expected
    );

    // 4. It comes to rest there
    let rest = output
        .events
        .iter()
        .find(|e| e.kind == EventKind::Equilibrium)
        .unwrap();
    assert!((rest.time - landed.time).abs() < 1e-9);
    assert_eq!(output.final_state.objects["object_1"].position.y, 0.0);
}

#[test]
fn test_derived_fall_time_is_in_the_ir() {
    let input = SystemInput::new("free_fall", "")
        .with_parameter("h", 19.6, "m")
        .with_parameter("g", 9.8, "m/s^2");
    let ir = IrAssembler::default().assemble(&input).unwrap();
    let t_fall = ir
        .system
        .parameters
        .iter()
        .find(|p| p.symbol == "t_fall")
        .and_then(|p| p.value())
        .unwrap();
    assert!((t_fall - 2.0).abs() < 1e-12);
}
