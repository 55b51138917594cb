//! Relativistic and quantum entries. These carry formulas for derivation and
//! display only; no regime integrates them.

use super::{AtomicModule, ModuleKind};

const C_LIGHT: f64 = 299_792_458.0;
const H_PLANCK: f64 = 6.626_070_15e-34;

pub(super) fn modules() -> Vec<AtomicModule> {
    vec![
        AtomicModule::builder(
            "relativity_time_dilation",
            ModuleKind::Relativity,
            "Time dilation",
            "Moving clocks run slow relative to a stationary observer",
        )
        .param("t0", "s", "proper time")
        .param("v", "m/s", "relative speed")
        .constant("c", C_LIGHT, "m/s", "speed of light")
        .formula("gamma_rel = 1 / sqrt(1 - v^2 / c^2)")
        .formula("t_dilated = gamma_rel * t0")
        .outputs(&["gamma_rel", "t_dilated"])
        .build(),
        AtomicModule::builder(
            "relativity_mass_energy",
            ModuleKind::Relativity,
            "Mass-energy equivalence",
            "Rest energy contained in a mass",
        )
        .param("m", "kg", "rest mass")
        .constant("c", C_LIGHT, "m/s", "speed of light")
        .formula("E_rest = m * c^2")
        .outputs(&["E_rest"])
        .build(),
        AtomicModule::builder(
            "quantum_photon",
            ModuleKind::Quantum,
            "Photon energy",
            "Energy carried by a photon of light at a given frequency",
        )
        .constant("h_planck", H_PLANCK, "J*s", "Planck constant")
        .param("f", "Hz", "frequency")
        .formula("E_photon = h_planck * f")
        .outputs(&["E_photon"])
        .build(),
        AtomicModule::builder(
            "quantum_de_broglie",
            ModuleKind::Quantum,
            "De Broglie wavelength",
            "Matter wave wavelength of a moving particle",
        )
        .constant("h_planck", H_PLANCK, "J*s", "Planck constant")
        .param("p", "kg*m/s", "momentum")
        .formula("lambda_db = h_planck / p")
        .depends_on("momentum_linear")
        .outputs(&["lambda_db"])
        .build(),
    ]
}
