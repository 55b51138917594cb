use super::{AtomicModule, ModuleKind};

pub(super) fn modules() -> Vec<AtomicModule> {
    vec![
        AtomicModule::builder(
            "waves_wave_speed",
            ModuleKind::Waves,
            "Wave speed",
            "Propagation speed of a periodic wave from frequency and wavelength",
        )
        .param("f", "Hz", "frequency")
        .param("lambda", "m", "wavelength")
        .formula("v_wave = f * lambda")
        .outputs(&["v_wave"])
        .build(),
        AtomicModule::builder(
            "waves_standing",
            ModuleKind::Waves,
            "Standing wave",
            "Harmonics of a string or pipe fixed at both ends",
        )
        .param("L_s", "m", "string length")
        .param("n", "1", "harmonic number")
        .param("v_wave", "m/s", "wave speed")
        .formula("f_n = n * v_wave / (2 * L_s)")
        .depends_on("waves_wave_speed")
        .outputs(&["f_n"])
        .build(),
        AtomicModule::builder(
            "acoustics_doppler",
            ModuleKind::Acoustics,
            "Doppler effect",
            "Frequency shift of sound from a moving source or observer",
        )
        .param("f", "Hz", "emitted frequency")
        .param("v_sound", "m/s", "speed of sound")
        .param("v_source", "m/s", "source speed towards the observer")
        .param("v_observer", "m/s", "observer speed towards the source")
        .formula("f_obs = f * (v_sound + v_observer) / (v_sound - v_source)")
        .outputs(&["f_obs"])
        .build(),
        AtomicModule::builder(
            "acoustics_intensity",
            ModuleKind::Acoustics,
            "Sound intensity",
            "Loudness of a point sound source at a distance in decibels",
        )
        .param("P_src", "W", "source power")
        .param("r", "m", "distance from the source")
        .constant("I_0", 1e-12, "W/m^2", "threshold of hearing")
        .formula("I_s = P_src / (4 * pi * r^2)")
        .formula("beta = 10 * log10(I_s / I_0)")
        .outputs(&["I_s", "beta"])
        .build(),
        AtomicModule::builder(
            "optics_snell",
            ModuleKind::Optics,
            "Snell's law",
            "Refraction of light crossing between two media",
        )
        .param("n1", "1", "first refractive index")
        .param("n2", "1", "second refractive index")
        .param("theta1", "deg", "angle of incidence")
        .formula("theta2 = asin(n1 * sin(theta1) / n2)")
        .outputs(&["theta2"])
        .build(),
        AtomicModule::builder(
            "optics_thin_lens",
            ModuleKind::Optics,
            "Thin lens",
            "Image formed by a converging or diverging lens",
        )
        .param("f_lens", "m", "focal length")
        .param("d_o", "m", "object distance")
        .formula("d_i = 1 / (1 / f_lens - 1 / d_o)")
        .formula("M_lens = -d_i / d_o")
        .outputs(&["d_i", "M_lens"])
        .build(),
    ]
}
