use super::{AtomicModule, ModuleKind};

const R_GAS: f64 = 8.314_462_618;

pub(super) fn modules() -> Vec<AtomicModule> {
    vec![
        AtomicModule::builder(
            "fluids_buoyancy",
            ModuleKind::Fluids,
            "Buoyancy",
            "Archimedes upthrust on a body submerged in a fluid",
        )
        .param("rho_f", "kg/m^3", "fluid density")
        .param("V", "m^3", "displaced volume")
        .param("g", "m/s^2", "gravitational acceleration")
        .formula("F_b = rho_f * V * g")
        .outputs(&["F_b"])
        .build(),
        AtomicModule::builder(
            "fluids_bernoulli",
            ModuleKind::Fluids,
            "Bernoulli's principle",
            "Pressure and speed along a streamline of steady flow",
        )
        .param("P1", "Pa", "upstream pressure")
        .param("rho_f", "kg/m^3", "fluid density")
        .param("v_in", "m/s", "upstream flow speed")
        .param("v_out", "m/s", "downstream flow speed")
        .param("h1", "m", "upstream height")
        .param("h2", "m", "downstream height")
        .param("g", "m/s^2", "gravitational acceleration")
        .formula("P2 = P1 + 0.5 * rho_f * (v_in^2 - v_out^2) + rho_f * g * (h1 - h2)")
        .outputs(&["P2"])
        .build(),
        AtomicModule::builder(
            "pressure_hydrostatic",
            ModuleKind::Pressure,
            "Hydrostatic pressure",
            "Pressure increasing with depth in a static fluid",
        )
        .param("P0", "Pa", "surface pressure")
        .param("rho_f", "kg/m^3", "fluid density")
        .param("g", "m/s^2", "gravitational acceleration")
        .param("h", "m", "depth")
        .formula("P_h = P0 + rho_f * g * h")
        .outputs(&["P_h"])
        .build(),
        AtomicModule::builder(
            "thermo_ideal_gas",
            ModuleKind::Thermodynamics,
            "Ideal gas law",
            "State equation relating gas pressure volume and temperature",
        )
        .param("P_gas", "Pa", "gas pressure")
        .param("V", "m^3", "gas volume")
        .param("n_mol", "mol", "amount of gas")
        .constant("R", R_GAS, "J/mol/K", "molar gas constant")
        .formula("T_gas = P_gas * V / (n_mol * R)")
        .outputs(&["T_gas"])
        .build(),
        AtomicModule::builder(
            "thermo_heat",
            ModuleKind::Thermodynamics,
            "Sensible heat",
            "Heat needed to change the temperature of a substance",
        )
        .param("m", "kg", "mass")
        .param("c_heat", "J/kg/K", "specific heat capacity")
        .param("dT", "K", "temperature change")
        .formula("Q = m * c_heat * dT")
        .outputs(&["Q"])
        .build(),
        AtomicModule::builder(
            "thermo_first_law",
            ModuleKind::Thermodynamics,
            "First law of thermodynamics",
            "Internal energy change from heat added and work done by the system",
        )
        .param("Q", "J", "heat added")
        .param("W", "J", "work done by the system")
        .formula("dU = Q - W")
        .depends_on("thermo_heat")
        .outputs(&["dU"])
        .build(),
    ]
}
