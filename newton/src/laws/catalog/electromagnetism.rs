use super::{AtomicModule, ModuleKind};

/// Coulomb constant `1 / (4π ε0)`.
const K_E: f64 = 8.987_551_792e9;

pub(super) fn modules() -> Vec<AtomicModule> {
    vec![
        AtomicModule::builder(
            "electrostatics_coulomb",
            ModuleKind::Electrostatics,
            "Coulomb's law",
            "Electric force between two point charges",
        )
        .constant("k_e", K_E, "N*m^2/C^2", "Coulomb constant")
        .param("q1", "C", "first charge")
        .param("q2", "C", "second charge")
        .param("r", "m", "separation")
        .formula("F_e = k_e * q1 * q2 / r^2")
        .outputs(&["F_e"])
        .build(),
        AtomicModule::builder(
            "electrostatics_field",
            ModuleKind::Electrostatics,
            "Point charge field",
            "Electric field strength around a point charge",
        )
        .constant("k_e", K_E, "N*m^2/C^2", "Coulomb constant")
        .param("q", "C", "source charge")
        .param("r", "m", "distance from the charge")
        .formula("E = k_e * q / r^2")
        .outputs(&["E"])
        .build(),
        AtomicModule::builder(
            "magnetism_lorentz",
            ModuleKind::Magnetism,
            "Lorentz force",
            "Force on a charged particle moving through electric and magnetic fields",
        )
        .param("q", "C", "particle charge")
        .param("v", "m/s", "particle velocity")
        .param("E", "V/m", "electric field")
        .param("B", "T", "magnetic field")
        .formula("F_L = q * (E + v * B)")
        .outputs(&["F_L"])
        .build(),
        AtomicModule::builder(
            "magnetism_cyclotron",
            ModuleKind::Magnetism,
            "Cyclotron motion",
            "Circular path of a charge in a uniform magnetic field",
        )
        .param("q", "C", "particle charge")
        .param("B", "T", "magnetic field")
        .param("m", "kg", "particle mass")
        .param("v", "m/s", "particle speed")
        .formula("omega_c = q * B / m")
        .formula("r_c = m * v / (q * B)")
        .outputs(&["omega_c", "r_c"])
        .build(),
        AtomicModule::builder(
            "circuits_ohm",
            ModuleKind::Circuits,
            "Ohm's law",
            "Current through a resistor driven by a voltage",
        )
        .param("U", "V", "voltage")
        .param("R", "Ω", "resistance")
        .formula("I = U / R")
        .outputs(&["I"])
        .build(),
        AtomicModule::builder(
            "circuits_power",
            ModuleKind::Circuits,
            "Electrical power",
            "Power dissipated in a circuit element",
        )
        .param("U", "V", "voltage")
        .param("I", "A", "current")
        .formula("P_e = U * I")
        .depends_on("circuits_ohm")
        .outputs(&["P_e"])
        .build(),
        AtomicModule::builder(
            "circuits_rc",
            ModuleKind::Circuits,
            "RC circuit",
            "Charging and discharging of a capacitor through a resistor",
        )
        .param("R", "Ω", "resistance")
        .param("C", "F", "capacitance")
        .formula("tau_rc = R * C")
        .formula("U_c = U * (1 - exp(-t / tau_rc))")
        .outputs(&["tau_rc"])
        .build(),
    ]
}
