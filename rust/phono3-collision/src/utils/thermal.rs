use crate::units::PhysicalUnits;

/// Bose-Einstein occupation $n(\omega, T) = 1 / (e^{\hbar\omega / k_B T} - 1)$.
///
/// `frequency` in THz, `temperature` in K. Callers are expected to skip modes
/// at or below the cutoff frequency, where the occupation diverges.
#[inline]
pub fn bose_einstein(frequency: f64, temperature: f64, units: &PhysicalUnits) -> f64 {
    1.0 / units.reduced_energy(frequency, temperature).exp_m1()
}

/// Detailed-balance factor $\sinh(\hbar\omega / 2 k_B T)$.
#[inline]
pub fn detailed_balance_sinh(frequency: f64, temperature: f64, units: &PhysicalUnits) -> f64 {
    (0.5 * units.reduced_energy(frequency, temperature)).sinh()
}

/// Reciprocal detailed-balance factors for every band of one phonon.
///
/// Bands with `frequency <= cutoff_frequency` get `0.0` so that acoustic modes
/// at Γ do not produce `1/sinh(0)`.
pub fn inverse_sinh_factors(
    frequencies: impl IntoIterator<Item = f64>,
    temperature: f64,
    cutoff_frequency: f64,
    units: &PhysicalUnits,
) -> Vec<f64> {
    frequencies
        .into_iter()
        .map(|f| {
            if f > cutoff_frequency {
                1.0 / detailed_balance_sinh(f, temperature, units)
            } else {
                0.0
            }
        })
        .collect()
}
