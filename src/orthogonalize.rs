//! Gram-Schmidt reconstruction of orthonormal right-handed bases.

use crate::{constants::DEGENERATE_NORM_EPSILON, types::Basis, Error, Result};
use nalgebra::Vector3;

/// Scale `v` to unit length
///
/// # Errors
///
/// Returns `DegenerateGeometry` if `v` is not finite or its norm is below
/// [`DEGENERATE_NORM_EPSILON`]
pub fn normalize(v: &Vector3<f64>) -> Result<Vector3<f64>> {
    let norm = v.norm();
    if !norm.is_finite() || norm < DEGENERATE_NORM_EPSILON {
        return Err(Error::DegenerateGeometry(format!(
            "cannot normalize vector [{:.3e}, {:.3e}, {:.3e}] with norm {norm:.3e}",
            v.x, v.y, v.z
        )));
    }
    Ok(v / norm)
}

/// Turn three seed vectors into an orthonormal right-handed basis.
///
/// `seed_x` fixes the x axis, `seed_y` is made orthogonal to it, and z is
/// always `x × y`. `seed_z` only documents the caller's intended z axis; its
/// direction does not influence the result.
///
/// # Errors
///
/// Returns `DegenerateGeometry` if the seeds are zero, non-finite or parallel
pub fn orthogonalize(
    seed_x: &Vector3<f64>,
    seed_y: &Vector3<f64>,
    _seed_z: &Vector3<f64>,
) -> Result<Basis> {
    let x = normalize(seed_x)?;

    let y = seed_y - x * seed_y.dot(&x);
    let y = normalize(&y)?;

    let z = normalize(&x.cross(&y))?;

    Ok(Basis::new(x, y, z))
}

/// Re-orthogonalize an existing basis, keeping its axis order
///
/// Each axis is normalized first so that a long averaged x cannot dominate
/// the projection of y.
///
/// # Errors
///
/// Returns `DegenerateGeometry` if any axis collapses
pub fn reorthogonalize(basis: &Basis) -> Result<Basis> {
    let x = normalize(&basis.x)?;
    let y = normalize(&basis.y)?;
    let z = normalize(&basis.z)?;
    orthogonalize(&x, &y, &z)
}
