use nalgebra::DVector;

use crate::{datatypes::QuadraturePoint, error::MpmError};

/// 1D Gauss-Legendre abscissae and weights on [-1, 1]
///
/// # Arguments
/// * `order` - Number of sample points per axis
///
/// # Returns
/// A vector of (abscissa, weight) pairs, or an error if no rule of the
/// requested order is tabulated
pub fn gauss_1d(order: usize) -> Result<Vec<(f64, f64)>, MpmError> {
    let rule = match order {
        1 => vec![(0.0, 2.0)],
        2 => {
            let p = 1.0 / 3.0_f64.sqrt();
            vec![(-p, 1.0), (p, 1.0)]
        }
        3 => {
            let p = (3.0 / 5.0_f64).sqrt();
            vec![(-p, 5.0 / 9.0), (0.0, 8.0 / 9.0), (p, 5.0 / 9.0)]
        }
        4 => {
            let sqrt_6_5 = (6.0 / 5.0_f64).sqrt();
            let p1 = ((3.0 - 2.0 * sqrt_6_5) / 7.0).sqrt();
            let p2 = ((3.0 + 2.0 * sqrt_6_5) / 7.0).sqrt();
            let sqrt_30 = 30.0_f64.sqrt();
            let w1 = (18.0 + sqrt_30) / 36.0;
            let w2 = (18.0 - sqrt_30) / 36.0;
            vec![(-p2, w2), (-p1, w1), (p1, w1), (p2, w2)]
        }
        5 => {
            let sqrt_10_7 = (10.0 / 7.0_f64).sqrt();
            let p1 = (5.0 - 2.0 * sqrt_10_7).sqrt() / 3.0;
            let p2 = (5.0 + 2.0 * sqrt_10_7).sqrt() / 3.0;
            let sqrt_70 = 70.0_f64.sqrt();
            let w1 = (322.0 + 13.0 * sqrt_70) / 900.0;
            let w2 = (322.0 - 13.0 * sqrt_70) / 900.0;
            vec![
                (-p2, w2),
                (-p1, w1),
                (0.0, 128.0 / 225.0),
                (p1, w1),
                (p2, w2),
            ]
        }
        _ => {
            return Err(MpmError::Generator(format!(
                "No Gauss-Legendre rule of order {} is available (supported: 1-5)",
                order
            )))
        }
    };

    Ok(rule)
}

/// Builds the tensor-product grid of `order^dimension` reference points in
/// [-1, 1]^D
///
/// Iteration is nested with axis 0 varying slowest and the last axis varying
/// fastest; the order is stable across runs because downstream global ids are
/// assigned positionally.
///
/// # Arguments
/// * `order` - Number of sample points per axis
/// * `dimension` - Spatial dimension (2 or 3)
///
/// # Returns
/// An ordered vector of QuadraturePoint instances
pub fn reference_grid(order: usize, dimension: usize) -> Result<Vec<QuadraturePoint>, MpmError> {
    let rule_1d = gauss_1d(order)?;

    let total = order.pow(dimension as u32);
    let mut points: Vec<QuadraturePoint> = Vec::with_capacity(total);

    for flat in 0..total {
        let mut coords = DVector::zeros(dimension);
        let mut weight = 1.0;

        // decode `flat` as base-`order` digits, axis 0 most significant
        let mut remainder = flat;
        for axis in (0..dimension).rev() {
            let (abscissa, w) = rule_1d[remainder % order];
            coords[axis] = abscissa;
            weight *= w;
            remainder /= order;
        }

        points.push(QuadraturePoint { coords, weight });
    }

    Ok(points)
}
