use nalgebra::DVector;

use crate::error::MpmError;

// Reference corner signs, one row per node. Node i of the hexahedron sits at
// (XI_HEX[i], ETA_HEX[i], ZETA_HEX[i]); nodal coordinate lists must follow
// the same ordering.
const XI_HEX: [f64; 8] = [-1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0];
const ETA_HEX: [f64; 8] = [-1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0];
const ZETA_HEX: [f64; 8] = [-1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0];

const XI_QUAD: [f64; 4] = [-1.0, 1.0, 1.0, -1.0];
const ETA_QUAD: [f64; 4] = [-1.0, -1.0, 1.0, 1.0];

/// Evaluates the nodal shape functions at a reference coordinate
///
/// Bilinear quadrangle in 2D, trilinear hexahedron in 3D. The values form a
/// partition of unity: they sum to 1 at any reference point.
///
/// # Arguments
/// * `dimension` - Spatial dimension (2 or 3)
/// * `reference` - Reference coordinates in [-1, 1]^D
///
/// # Returns
/// One shape-function value per node, in the fixed corner ordering
pub fn shape_functions(dimension: usize, reference: &DVector<f64>) -> Result<Vec<f64>, MpmError> {
    match dimension {
        2 => {
            let (xi, eta) = (reference[0], reference[1]);
            Ok((0..4)
                .map(|i| 0.25 * (1.0 + XI_QUAD[i] * xi) * (1.0 + ETA_QUAD[i] * eta))
                .collect())
        }
        3 => {
            let (xi, eta, zeta) = (reference[0], reference[1], reference[2]);
            Ok((0..8)
                .map(|i| {
                    0.125
                        * (1.0 + XI_HEX[i] * xi)
                        * (1.0 + ETA_HEX[i] * eta)
                        * (1.0 + ZETA_HEX[i] * zeta)
                })
                .collect())
        }
        d => Err(MpmError::Generator(format!(
            "No shape functions for dimension {}",
            d
        ))),
    }
}

/// Maps a reference coordinate into physical space by nodal interpolation
///
/// # Arguments
/// * `nodal_coords` - Physical corner coordinates in the fixed corner ordering
/// * `reference` - Reference coordinates in [-1, 1]^D
///
/// # Returns
/// The physical coordinate Σ N_i · x_i
pub fn to_physical(
    nodal_coords: &[DVector<f64>],
    reference: &DVector<f64>,
) -> Result<DVector<f64>, MpmError> {
    let dimension = reference.len();
    let shape = shape_functions(dimension, reference)?;

    if nodal_coords.len() != shape.len() {
        return Err(MpmError::Generator(format!(
            "Expected {} nodal coordinates for dimension {}, got {}",
            shape.len(),
            dimension,
            nodal_coords.len()
        )));
    }

    let mut physical = DVector::zeros(dimension);
    for (n, coords) in shape.iter().zip(nodal_coords) {
        physical += coords * *n;
    }

    Ok(physical)
}
