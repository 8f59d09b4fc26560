//! Properties of the Gram-Schmidt basis reconstruction

use hand_keypoint_stabilizer::{
    orthogonalize::{orthogonalize, reorthogonalize},
    rotation::RotationTransformer,
    Error,
};
use nalgebra::Vector3;
use proptest::prelude::*;

const EPS: f64 = 1e-9;

fn vector() -> impl Strategy<Value = Vector3<f64>> {
    (-10.0f64..10.0, -10.0f64..10.0, -10.0f64..10.0).prop_map(|(x, y, z)| Vector3::new(x, y, z))
}

/// Seed pairs that are neither tiny nor close to parallel
fn seeds() -> impl Strategy<Value = (Vector3<f64>, Vector3<f64>)> {
    (vector(), vector()).prop_filter("seeds must span a plane", |(a, b)| {
        a.norm() > 1e-3 && b.norm() > 1e-3 && a.normalize().cross(&b.normalize()).norm() > 1e-2
    })
}

proptest! {
    #[test]
    fn prop_result_is_orthonormal_and_right_handed((a, b) in seeds(), c in vector()) {
        let basis = orthogonalize(&a, &b, &c).unwrap();
        prop_assert!(basis.is_orthonormal(EPS));
        prop_assert!(basis.is_right_handed(EPS));
    }

    #[test]
    fn prop_first_axis_keeps_direction((a, b) in seeds(), c in vector()) {
        let basis = orthogonalize(&a, &b, &c).unwrap();
        prop_assert!((basis.x - a.normalize()).norm() < EPS);
        // Second axis stays in the half-plane of its seed
        prop_assert!(basis.y.dot(&b) > 0.0);
    }

    #[test]
    fn prop_reorthogonalize_is_idempotent((a, b) in seeds(), c in vector()) {
        let once = orthogonalize(&a, &b, &c).unwrap();
        let twice = reorthogonalize(&once).unwrap();
        prop_assert!((once.x - twice.x).norm() < EPS);
        prop_assert!((once.y - twice.y).norm() < EPS);
        prop_assert!((once.z - twice.z).norm() < EPS);
    }

    #[test]
    fn prop_rotation_preserves_lengths((a, b) in seeds(), p in vector()) {
        let basis = orthogonalize(&a, &b, &Vector3::zeros()).unwrap();
        let rotation = RotationTransformer::rotation_matrix(&basis).unwrap();
        prop_assert!(((rotation * p).norm() - p.norm()).abs() < 1e-9);
    }
}

#[test]
fn test_parallel_seeds_are_degenerate() {
    let a = Vector3::new(1.0, 2.0, 3.0);
    let result = orthogonalize(&a, &(a * 4.0), &Vector3::z());
    assert!(matches!(result, Err(Error::DegenerateGeometry(_))));
}

#[test]
fn test_zero_seed_is_degenerate() {
    let result = orthogonalize(&Vector3::zeros(), &Vector3::y(), &Vector3::z());
    assert!(matches!(result, Err(Error::DegenerateGeometry(_))));
}
