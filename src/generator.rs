use indicatif::ProgressBar;
use nalgebra::DVector;

use crate::{
    datatypes::{MaterialPoint, MaterialPointGroup, MaterialProperties, Mesh, ModelMetadata},
    error::MpmError,
    quadrature, shape,
};

const GRAVITY: f64 = 9.81;

/// Generates material points for every resolved element
///
/// The reference quadrature grid is built once and reused across elements.
/// Each element contributes `gauss_order^D` points, mapped to physical space
/// by shape-function interpolation. Global ids are dense over the whole run,
/// starting at the group's offset; the element id is kept as its own field.
/// Points land in a single group (id 0) in element-then-sample order.
///
/// # Arguments
/// * `mesh` - The parsed, resolved mesh
/// * `metadata` - The run configuration
///
/// # Returns
/// The material point groups (currently always exactly one)
pub fn generate(
    mesh: &Mesh,
    metadata: &ModelMetadata,
) -> Result<Vec<MaterialPointGroup>, MpmError> {
    let reference_points = quadrature::reference_grid(metadata.gauss_order, mesh.dimension)?;

    let mut group = MaterialPointGroup::new(0);
    let group_offset = 0;
    let mut global_id = group_offset;

    println!(
        "info: generating {} material points per element...",
        reference_points.len()
    );
    let bar = ProgressBar::new(mesh.elements.len() as u64);
    for element in &mesh.elements {
        bar.inc(1);

        for reference_point in &reference_points {
            let coordinates = shape::to_physical(&element.vertex_coords, &reference_point.coords)?;

            group.add_point(MaterialPoint {
                element_id: element.id,
                global_id,
                coordinates,
                stress: None,
            });
            global_id += 1;
        }
    }
    bar.finish();

    println!("info: generated {} material points", group.points.len());

    Ok(vec![group])
}

/// Initializes a K0 geostatic stress state on every material point
///
/// The last axis is treated as vertical. With H the highest material point,
/// the vertical stress at depth (H - z) is -density * g * (H - z); the
/// horizontal components are k0 times that, and shear components are zero.
/// The stress vector has length 2*D.
///
/// # Arguments
/// * `groups` - The material point groups to update
/// * `dimension` - Spatial dimension (2 or 3)
/// * `material` - Material properties from the input json
pub fn compute_stress(
    groups: &mut [MaterialPointGroup],
    dimension: usize,
    material: &MaterialProperties,
) {
    let vertical_axis = dimension - 1;

    let max_height = groups
        .iter()
        .flat_map(|g| g.points.iter())
        .map(|p| p.coordinates[vertical_axis])
        .fold(f64::NEG_INFINITY, f64::max);

    for group in groups.iter_mut() {
        for point in group.points.iter_mut() {
            let depth = max_height - point.coordinates[vertical_axis];
            let vertical_stress = -material.density * GRAVITY * depth;

            let mut stress = DVector::zeros(2 * dimension);
            for axis in 0..dimension {
                stress[axis] = if axis == vertical_axis {
                    vertical_stress
                } else {
                    material.k0 * vertical_stress
                };
            }

            point.stress = Some(stress);
        }
    }

    println!("info: initialized stresses for {} groups", groups.len());
}
