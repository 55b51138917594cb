use super::{AtomicModule, ModuleKind, FALLBACK_MODULE};

/// Newton's constant of gravitation.
const G: f64 = 6.674_30e-11;

pub(super) fn modules() -> Vec<AtomicModule> {
    let mut modules = kinematics();
    modules.extend(dynamics());
    modules.extend(energy());
    modules.extend(momentum());
    modules.extend(rotation());
    modules.extend(gravitation());
    modules.extend(oscillation());
    modules.push(
        AtomicModule::builder(
            FALLBACK_MODULE,
            ModuleKind::Generic,
            "Generic mechanics",
            "Point mass moving under uniform gravity; used when no specific law applies",
        )
        .param("m", "kg", "mass")
        .param("g", "m/s^2", "gravitational acceleration")
        .formula("F_weight = m * g")
        .formula("a = F_weight / m")
        .outputs(&["F_weight"])
        .build(),
    );
    modules
}

fn kinematics() -> Vec<AtomicModule> {
    vec![
        AtomicModule::builder(
            "kinematics_uniform_velocity",
            ModuleKind::Kinematics,
            "Uniform velocity motion",
            "Straight line motion at constant velocity",
        )
        .param("x0", "m", "initial position")
        .param("v", "m/s", "velocity")
        .param("t", "s", "elapsed time")
        .formula("x = x0 + v * t")
        .outputs(&["x"])
        .build(),
        AtomicModule::builder(
            "kinematics_uniform_acceleration",
            ModuleKind::Kinematics,
            "Uniformly accelerated motion",
            "Motion with constant acceleration along a line",
        )
        .param("x0", "m", "initial position")
        .param("v0", "m/s", "initial velocity")
        .param("a", "m/s^2", "acceleration")
        .param("t", "s", "elapsed time")
        .formula("v = v0 + a * t")
        .formula("x = x0 + v0 * t + 0.5 * a * t^2")
        .depends_on("dynamics_newton_second")
        .outputs(&["v", "x"])
        .build(),
        AtomicModule::builder(
            "kinematics_free_fall",
            ModuleKind::Kinematics,
            "Free fall",
            "Object dropped from rest falling under gravity to the ground",
        )
        .param("h", "m", "drop height")
        .param("g", "m/s^2", "gravitational acceleration")
        .param("t", "s", "elapsed time")
        .formula("y = h - 0.5 * g * t^2")
        .formula("t_fall = sqrt(2 * h / g)")
        .formula("v_impact = sqrt(2 * g * h)")
        .outputs(&["t_fall", "v_impact"])
        .build(),
        AtomicModule::builder(
            "kinematics_projectile",
            ModuleKind::Kinematics,
            "Projectile motion",
            "Object launched at an angle following a parabolic trajectory",
        )
        .param("v0", "m/s", "launch speed")
        .param("theta", "deg", "launch angle")
        .param("g", "m/s^2", "gravitational acceleration")
        .formula("R_range = v0^2 * sin(2 * theta) / g")
        .formula("H_max = v0^2 * sin(theta)^2 / (2 * g)")
        .formula("t_flight = 2 * v0 * sin(theta) / g")
        .outputs(&["R_range", "H_max", "t_flight"])
        .build(),
    ]
}

fn dynamics() -> Vec<AtomicModule> {
    vec![
        AtomicModule::builder(
            "dynamics_newton_second",
            ModuleKind::Dynamics,
            "Newton's second law",
            "Net force on a body equals mass times acceleration",
        )
        .param("F", "N", "net force")
        .param("m", "kg", "mass")
        .formula("a = F / m")
        .outputs(&["a"])
        .build(),
        AtomicModule::builder(
            "dynamics_friction",
            ModuleKind::Dynamics,
            "Kinetic friction",
            "Friction force opposing sliding on a rough surface",
        )
        .param("mu", "1", "coefficient of friction")
        .param("N", "N", "normal force")
        .formula("F_f = mu * N")
        .depends_on("dynamics_inclined_plane")
        .outputs(&["F_f"])
        .build(),
        AtomicModule::builder(
            "dynamics_inclined_plane",
            ModuleKind::Dynamics,
            "Inclined plane",
            "Block sliding down a slope or ramp with friction",
        )
        .param("m", "kg", "mass")
        .param("g", "m/s^2", "gravitational acceleration")
        .param("theta", "deg", "incline angle")
        .param("mu", "1", "coefficient of friction")
        .formula("N = m * g * cos(theta)")
        .formula("a_incline = g * (sin(theta) - mu * cos(theta))")
        .outputs(&["a_incline", "N"])
        .build(),
        AtomicModule::builder(
            "dynamics_hooke",
            ModuleKind::Dynamics,
            "Hooke's law",
            "Restoring force of a stretched or compressed spring",
        )
        .param("k", "N/m", "spring constant")
        .param("x", "m", "displacement from equilibrium")
        .formula("F_spring = -k * x")
        .outputs(&["F_spring"])
        .build(),
        AtomicModule::builder(
            "dynamics_drag",
            ModuleKind::Dynamics,
            "Linear drag",
            "Air resistance proportional to velocity",
        )
        .param("b", "kg/s", "damping coefficient")
        .param("v", "m/s", "velocity")
        .formula("F_drag = -b * v")
        .outputs(&["F_drag"])
        .build(),
    ]
}

fn energy() -> Vec<AtomicModule> {
    vec![
        AtomicModule::builder(
            "energy_kinetic",
            ModuleKind::Energy,
            "Kinetic energy",
            "Energy of a moving mass",
        )
        .param("m", "kg", "mass")
        .param("v", "m/s", "speed")
        .formula("KE = 0.5 * m * v^2")
        .outputs(&["KE"])
        .build(),
        AtomicModule::builder(
            "energy_potential_gravity",
            ModuleKind::Energy,
            "Gravitational potential energy",
            "Energy stored by height in a uniform gravitational field",
        )
        .param("m", "kg", "mass")
        .param("g", "m/s^2", "gravitational acceleration")
        .param("h", "m", "height")
        .formula("PE = m * g * h")
        .outputs(&["PE"])
        .build(),
        AtomicModule::builder(
            "energy_conservation",
            ModuleKind::Energy,
            "Mechanical energy conservation",
            "Total mechanical energy stays constant without losses",
        )
        .param("KE", "J", "kinetic energy")
        .param("PE", "J", "potential energy")
        .formula("E_total = KE + PE")
        .depends_on("energy_kinetic")
        .depends_on("energy_potential_gravity")
        .outputs(&["E_total"])
        .build(),
        AtomicModule::builder(
            "energy_work",
            ModuleKind::Energy,
            "Work",
            "Work done by a force over a displacement",
        )
        .param("F", "N", "applied force")
        .param("d", "m", "displacement")
        .param("theta", "deg", "angle between force and displacement")
        .formula("W = F * d * cos(theta)")
        .outputs(&["W"])
        .build(),
        AtomicModule::builder(
            "energy_power",
            ModuleKind::Energy,
            "Mechanical power",
            "Rate at which work is done",
        )
        .param("W", "J", "work")
        .param("t", "s", "elapsed time")
        .formula("P = W / t")
        .depends_on("energy_work")
        .outputs(&["P"])
        .build(),
        AtomicModule::builder(
            "energy_spring_potential",
            ModuleKind::Energy,
            "Elastic potential energy",
            "Energy stored in a deformed spring",
        )
        .param("k", "N/m", "spring constant")
        .param("x", "m", "displacement")
        .formula("PE_spring = 0.5 * k * x^2")
        .outputs(&["PE_spring"])
        .build(),
    ]
}

fn momentum() -> Vec<AtomicModule> {
    vec![
        AtomicModule::builder(
            "momentum_linear",
            ModuleKind::Momentum,
            "Linear momentum",
            "Momentum of a moving mass",
        )
        .param("m", "kg", "mass")
        .param("v", "m/s", "velocity")
        .formula("p = m * v")
        .outputs(&["p"])
        .build(),
        AtomicModule::builder(
            "momentum_impulse",
            ModuleKind::Momentum,
            "Impulse",
            "Change in momentum from a force acting over time",
        )
        .param("F", "N", "average force")
        .param("t", "s", "contact time")
        .formula("J_imp = F * t")
        .outputs(&["J_imp"])
        .build(),
        AtomicModule::builder(
            "momentum_elastic_collision",
            ModuleKind::Momentum,
            "Elastic collision",
            "Two bodies collide and bounce conserving momentum and kinetic energy",
        )
        .param("m1", "kg", "first mass")
        .param("m2", "kg", "second mass")
        .param("u1", "m/s", "first initial velocity")
        .param("u2", "m/s", "second initial velocity")
        .formula("v1 = ((m1 - m2) * u1 + 2 * m2 * u2) / (m1 + m2)")
        .formula("v2 = ((m2 - m1) * u2 + 2 * m1 * u1) / (m1 + m2)")
        .outputs(&["v1", "v2"])
        .build(),
        AtomicModule::builder(
            "momentum_inelastic_collision",
            ModuleKind::Momentum,
            "Perfectly inelastic collision",
            "Two bodies collide and stick together",
        )
        .param("m1", "kg", "first mass")
        .param("m2", "kg", "second mass")
        .param("u1", "m/s", "first initial velocity")
        .param("u2", "m/s", "second initial velocity")
        .formula("v_f = (m1 * u1 + m2 * u2) / (m1 + m2)")
        .outputs(&["v_f"])
        .build(),
    ]
}

fn rotation() -> Vec<AtomicModule> {
    vec![
        AtomicModule::builder(
            "circular_centripetal",
            ModuleKind::CircularMotion,
            "Centripetal motion",
            "Uniform circular motion around a center",
        )
        .param("m", "kg", "mass")
        .param("v", "m/s", "tangential speed")
        .param("r", "m", "radius of the circle")
        .formula("a_c = v^2 / r")
        .formula("F_c = m * v^2 / r")
        .outputs(&["a_c", "F_c"])
        .build(),
        AtomicModule::builder(
            "rotation_torque",
            ModuleKind::Rotation,
            "Torque",
            "Turning effect of a force about an axis",
        )
        .param("F", "N", "applied force")
        .param("r", "m", "lever arm")
        .param("phi", "deg", "angle between lever and force")
        .formula("tau = r * F * sin(phi)")
        .outputs(&["tau"])
        .build(),
        AtomicModule::builder(
            "rotation_angular_dynamics",
            ModuleKind::Rotation,
            "Rotational dynamics",
            "Torque produces angular acceleration of a rigid body",
        )
        .param("tau", "N*m", "torque")
        .param("I_rot", "kg*m^2", "moment of inertia")
        .formula("alpha = tau / I_rot")
        .depends_on("rotation_torque")
        .outputs(&["alpha"])
        .build(),
        AtomicModule::builder(
            "rotation_angular_momentum",
            ModuleKind::Rotation,
            "Angular momentum",
            "Spin of a rotating rigid body",
        )
        .param("I_rot", "kg*m^2", "moment of inertia")
        .param("omega", "rad/s", "angular velocity")
        .formula("L_ang = I_rot * omega")
        .outputs(&["L_ang"])
        .build(),
    ]
}

fn gravitation() -> Vec<AtomicModule> {
    vec![
        AtomicModule::builder(
            "gravitation_universal",
            ModuleKind::Gravitation,
            "Universal gravitation",
            "Attraction between two masses by Newton's law of gravity",
        )
        .constant("G", G, "N*m^2/kg^2", "gravitational constant")
        .param("m1", "kg", "first mass")
        .param("m2", "kg", "second mass")
        .param("r", "m", "separation")
        .formula("F_g = G * m1 * m2 / r^2")
        .outputs(&["F_g"])
        .build(),
        AtomicModule::builder(
            "gravitation_orbital",
            ModuleKind::Gravitation,
            "Circular orbit",
            "Satellite or planet orbiting a central mass",
        )
        .constant("G", G, "N*m^2/kg^2", "gravitational constant")
        .param("M", "kg", "central mass")
        .param("r", "m", "orbital radius")
        .formula("v_orb = sqrt(G * M / r)")
        .formula("T_orb = 2 * pi * r / v_orb")
        .outputs(&["v_orb", "T_orb"])
        .build(),
    ]
}

fn oscillation() -> Vec<AtomicModule> {
    vec![
        AtomicModule::builder(
            "oscillation_spring_mass",
            ModuleKind::Oscillation,
            "Spring-mass oscillator",
            "A mass on a spring in simple harmonic motion",
        )
        .param("m", "kg", "mass")
        .param("k", "N/m", "spring constant")
        .param("A", "m", "amplitude")
        .formula("omega = sqrt(k / m)")
        .formula("T_period = 2 * pi / omega")
        .formula("x = A * cos(omega * t)")
        .outputs(&["omega", "T_period"])
        .build(),
        AtomicModule::builder(
            "oscillation_pendulum",
            ModuleKind::Oscillation,
            "Simple pendulum",
            "Small-angle swing of a pendulum bob on a string",
        )
        .param("l", "m", "pendulum length")
        .param("g", "m/s^2", "gravitational acceleration")
        .formula("T_pendulum = 2 * pi * sqrt(l / g)")
        .outputs(&["T_pendulum"])
        .build(),
        AtomicModule::builder(
            "oscillation_damped",
            ModuleKind::Oscillation,
            "Damped oscillator",
            "Harmonic oscillator losing energy to damping",
        )
        .param("m", "kg", "mass")
        .param("k", "N/m", "spring constant")
        .param("b", "kg/s", "damping coefficient")
        .formula("gamma = b / (2 * m)")
        .formula("omega_d = sqrt(k / m - gamma^2)")
        .outputs(&["gamma", "omega_d"])
        .build(),
    ]
}
