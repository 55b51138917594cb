use newton::core::solve::Solver;
use newton::investigation::probe::{EnergyProbe, Probe, relative_deviation};
use newton::investigation::validate::Validator;
use newton::ir::{Ir, IrAssembler, ObjectSpec, SystemInput};
use newton::laws::catalog::ConservationLaw;
use newton::simulation::regime::RegimeSetup;
use newton::simulation::{SimulationEngine, SimulationOutput};
use glam::DVec3;

fn spring_ir(time_step: f64) -> Ir {
    let mut input = SystemInput::new("oscillation", "")
        .with_parameter("m", 1.0, "kg")
        .with_parameter("k", 1.0, "N/m")
        .with_parameter("A", 1.0, "m");
    input.simulation.duration = Some(10.0);
    input.simulation.time_step = Some(time_step);
    input.simulation.solver = Some(Solver::Euler);

    IrAssembler::default()
        .assemble_with_modules(&input, &["oscillation_spring_mass"])
        .unwrap()
}

/// Largest relative energy deviation over every recorded sample.
fn worst_energy_drift(ir: &Ir, output: &SimulationOutput) -> f64 {
    let laws = RegimeSetup::from_ir(ir).laws;
    let first = output.time_series.first().unwrap();
    let initial = EnergyProbe.measure(first, &laws);
    let scale = EnergyProbe.scale(first, &laws);
    output
        .time_series
        .iter()
        .map(|s| relative_deviation(initial, EnergyProbe.measure(s, &laws), scale))
        .fold(0.0, f64::max)
}

#[test]
fn test_harmonic_oscillator_conservation() {
    // 1. Assemble an undamped spring-mass system
    let ir = spring_ir(0.005);
    assert!(ir.system.conservation_laws.contains(&ConservationLaw::Energy));
    assert_eq!(ir.system.objects[0].position, DVec3::X);

    // 2. Run for 10 s
    let output = SimulationEngine::default().run(&ir);
    assert!(output.success, "{:?}", output.errors);
    assert!((output.final_state.time - 10.0).abs() < 1e-9);

    // 3. Energy stays within 1 % at every sample
    let drift = worst_energy_drift(&ir, &output);
    println!("worst energy drift: {:.4}%", drift * 100.0);
    assert!(drift < 0.01);

    let report = Validator::default().validate(&ir, &output);
    let energy = report
        .conservation_checks
        .iter()
        .find(|c| c.law == ConservationLaw::Energy)
        .unwrap();
    assert!(energy.passed, "energy deviation {}%", energy.deviation);
}

#[test]
fn test_smaller_step_does_not_worsen_drift() {
    let coarse = spring_ir(0.005);
    let fine = spring_ir(0.0005);
    let coarse_output = SimulationEngine::default().run(&coarse);
    let fine_output = SimulationEngine::default().run(&fine);
    let coarse_drift = worst_energy_drift(&coarse, &coarse_output);
    let fine_drift = worst_energy_drift(&fine, &fine_output);
    assert!(fine_drift <= coarse_drift);

    // the reported first-to-last deviation follows the same ordering
    let reported = |ir: &Ir, output: &SimulationOutput| {
        Validator::default()
            .validate(ir, output)
            .conservation_checks
            .iter()
            .find(|c| c.law == ConservationLaw::Energy)
            .map(|c| c.deviation)
            .unwrap()
    };
    let coarse_deviation = reported(&coarse, &coarse_output);
    let fine_deviation = reported(&fine, &fine_output);
    println!("energy deviation: {coarse_deviation:.4}% -> {fine_deviation:.4}%");
    assert!(fine_deviation <= coarse_deviation);
    assert!(coarse_deviation < 1.0);
}

#[test]
fn test_free_fall_deviation_shrinks_with_step() {
    let deviation = |time_step: f64| {
        let mut ir = Ir::default();
        ir.system.environment.ground_level = None;
        ir.system.conservation_laws = vec![ConservationLaw::Energy];
        let mut ball = ObjectSpec::new("ball");
        ball.position = DVec3::new(0.0, 10.0, 0.0);
        ir.system.objects.push(ball);
        ir.simulation.duration = 1.0;
        ir.simulation.time_step = time_step;

        let output = SimulationEngine::default().run(&ir);
        Validator::default().validate(&ir, &output).conservation_checks[0].deviation
    };

    let coarse = deviation(0.01);
    let fine = deviation(0.001);
    assert!(fine <= coarse);
    assert!(coarse < 1.0);
}
