mod common;

use nalgebra::Matrix3;
use ndarray::{Array2, Array4, Array5, arr1, arr2};
use phono3_collision::grid::{Mesh, TripletsAtQ, triplets_at_q};
use phono3_collision::imag_self_energy::{ImagSelfEnergy, ImagSelfEnergyError, SelfEnergyInputs};
use phono3_collision::units::{KB, PhysicalUnits, THZ_TO_EV};
use phono3_collision::utils::is_close::IsClose;
use phono3_collision::utils::thermal::bose_einstein;

use common::{ABS_TOL, REL_TOL};

fn single_point_triplets() -> TripletsAtQ {
    let mesh = Mesh::try_new([1, 1, 1]).unwrap();
    triplets_at_q(0, &mesh, &[Matrix3::identity()]).unwrap()
}

#[test]
fn test_bose_einstein_matches_closed_form() {
    let units = PhysicalUnits::default();
    let x = THZ_TO_EV * 3.0 / (KB * 300.0);
    bose_einstein(3.0, 300.0, &units)
        .is_close(&(1.0 / (x.exp() - 1.0)), ABS_TOL, REL_TOL)
        .unwrap();
}

#[test]
fn test_single_band_finite_temperature() {
    let triplets = single_point_triplets();
    let frequencies = arr2(&[[4.0]]);
    let fc3 = Array4::from_elem((1, 1, 1, 1), 2.0);
    let mut g = Array5::<f64>::zeros((3, 1, 1, 1, 1));
    g[[0, 0, 0, 0, 0]] = 0.5;
    g[[1, 0, 0, 0, 0]] = 7.0;

    let ise = ImagSelfEnergy::new(Some(300.0), None, PhysicalUnits::default());
    let gamma = ise
        .compute(&SelfEnergyInputs {
            triplets: &triplets,
            frequencies: frequencies.view(),
            fc3_normal_squared: fc3.view(),
            integration_weights: g.view(),
            cutoff_frequency: 1e-4,
            unit_conversion: 3.0,
        })
        .unwrap();

    // Both phonons share a frequency, so the g1 term cancels.
    let n = bose_einstein(4.0, 300.0, &PhysicalUnits::default());
    let expected = 3.0 * 2.0 * (2.0 * n + 1.0) * 0.5;
    gamma.is_close(&arr1(&[expected]), ABS_TOL, REL_TOL).unwrap();
}

#[test]
fn test_two_bands_with_cutoff() {
    let triplets = single_point_triplets();
    // Band 0 is an acoustic mode at Γ and must not contribute.
    let frequencies = arr2(&[[0.0, 5.0]]);
    let fc3 = Array4::from_shape_fn((1, 2, 2, 2), |(_, j, k, l)| (1 + j + 2 * k + 4 * l) as f64);
    let g = Array5::from_shape_fn((3, 1, 2, 2, 2), |(c, _, j, k, l)| {
        0.1 * (c + 1) as f64 + 0.01 * (j + k + l) as f64
    });
    let temperature = 150.0;
    let units = PhysicalUnits::default();
    let ise = ImagSelfEnergy::new(Some(temperature), None, units);
    let gamma = ise
        .compute(&SelfEnergyInputs {
            triplets: &triplets,
            frequencies: frequencies.view(),
            fc3_normal_squared: fc3.view(),
            integration_weights: g.view(),
            cutoff_frequency: 1e-4,
            unit_conversion: 1.0,
        })
        .unwrap();

    let n = bose_einstein(5.0, temperature, &units);
    let expected: Vec<f64> = (0..2)
        .map(|j| fc3[[0, j, 1, 1]] * ((2.0 * n + 1.0) * g[[0, 0, j, 1, 1]]))
        .collect();
    gamma.is_close(&arr1(&expected), ABS_TOL, REL_TOL).unwrap();
}

#[test]
fn test_zero_temperature_keeps_spontaneous_decay() {
    let mesh = Mesh::try_new([2, 1, 1]).unwrap();
    let triplets = triplets_at_q(0, &mesh, &[Matrix3::identity()]).unwrap();
    assert_eq!(triplets.len(), 2);
    let frequencies = Array2::from_elem((2, 1), 3.0);
    let fc3 = Array4::from_elem((2, 1, 1, 1), 1.5);
    let g = Array5::from_elem((3, 2, 1, 1, 1), 0.25);

    let ise = ImagSelfEnergy::new(Some(0.0), None, PhysicalUnits::default());
    let gamma = ise
        .compute(&SelfEnergyInputs {
            triplets: &triplets,
            frequencies: frequencies.view(),
            fc3_normal_squared: fc3.view(),
            integration_weights: g.view(),
            cutoff_frequency: 1e-4,
            unit_conversion: 2.0,
        })
        .unwrap();
    // Two triplets of weight one, each 1.5 * 0.25, times the unit conversion.
    gamma.is_close(&arr1(&[1.5]), ABS_TOL, REL_TOL).unwrap();
}

#[test]
fn test_spectrum_at_frequency_points() {
    let triplets = single_point_triplets();
    let frequencies = arr2(&[[2.0, 6.0]]);
    let fc3 = Array4::from_elem((1, 2, 2, 2), 1.0);
    let g = Array5::from_shape_fn((3, 1, 3, 2, 2), |(c, _, p, _, _)| {
        if c == 0 { p as f64 } else { 0.0 }
    });
    let temperature = 200.0;
    let units = PhysicalUnits::default();
    let ise = ImagSelfEnergy::new(Some(temperature), Some(vec![1.0, 2.0, 3.0]), units);
    let spectrum = ise
        .compute_spectrum(&SelfEnergyInputs {
            triplets: &triplets,
            frequencies: frequencies.view(),
            fc3_normal_squared: fc3.view(),
            integration_weights: g.view(),
            cutoff_frequency: 1e-4,
            unit_conversion: 1.0,
        })
        .unwrap();
    assert_eq!(spectrum.shape(), &[3, 2]);

    let n: Vec<f64> = [2.0, 6.0]
        .iter()
        .map(|&f| bose_einstein(f, temperature, &units))
        .collect();
    let occupation_sum: f64 = (0..2)
        .flat_map(|k| (0..2).map(move |l| (k, l)))
        .map(|(k, l)| n[k] + n[l] + 1.0)
        .sum();
    let expected = Array2::from_shape_fn((3, 2), |(p, _)| p as f64 * occupation_sum);
    spectrum.is_close(&expected, ABS_TOL, REL_TOL).unwrap();
}

#[test]
fn test_missing_temperature_and_shape_errors() {
    let triplets = single_point_triplets();
    let frequencies = arr2(&[[4.0]]);
    let fc3 = Array4::from_elem((1, 1, 1, 1), 1.0);
    let g = Array5::from_elem((3, 1, 1, 1, 1), 1.0);
    let inputs = SelfEnergyInputs {
        triplets: &triplets,
        frequencies: frequencies.view(),
        fc3_normal_squared: fc3.view(),
        integration_weights: g.view(),
        cutoff_frequency: 1e-4,
        unit_conversion: 1.0,
    };

    let ise = ImagSelfEnergy::default();
    assert!(matches!(
        ise.compute(&inputs),
        Err(ImagSelfEnergyError::UninitializedField(field)) if field == "temperature"
    ));

    let ise = ImagSelfEnergy::new(Some(-1.0), None, PhysicalUnits::default());
    assert!(matches!(
        ise.compute(&inputs),
        Err(ImagSelfEnergyError::InvalidTemperature(t)) if t == -1.0
    ));

    let bad_g = Array5::from_elem((3, 1, 2, 1, 1), 1.0);
    let ise = ImagSelfEnergy::new(Some(300.0), None, PhysicalUnits::default());
    assert!(matches!(
        ise.compute(&SelfEnergyInputs {
            integration_weights: bad_g.view(),
            ..inputs
        }),
        Err(ImagSelfEnergyError::ArrayShapeMismatch(_))
    ));
}
