use serde::{Deserialize, Serialize};

/// Planck constant times 1 THz, in eV.
pub const THZ_TO_EV: f64 = 4.13566733e-3;

/// Boltzmann constant in eV/K.
pub const KB: f64 = 8.6173383e-5;

/// Energy-unit constants used by the thermal factors.
///
/// Frequencies are always in THz and temperatures in K; the two constants
/// only have to agree on the energy unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalUnits {
    pub thz_to_ev: f64,
    pub kb: f64,
}

impl Default for PhysicalUnits {
    fn default() -> Self {
        Self {
            thz_to_ev: THZ_TO_EV,
            kb: KB,
        }
    }
}

impl PhysicalUnits {
    pub const fn new(thz_to_ev: f64, kb: f64) -> Self {
        Self { thz_to_ev, kb }
    }

    /// Phonon energy `ħω / k_B T` in units where `T` is in K and `ω` in THz.
    #[inline]
    pub fn reduced_energy(&self, frequency: f64, temperature: f64) -> f64 {
        self.thz_to_ev * frequency / (self.kb * temperature)
    }
}
