use std::collections::HashMap;

use nalgebra::DVector;

/// Geometric type of the single element kind retained from a mesh.
///
/// Codes follow the legacy Gmsh 2.x convention: 3 = 4-node quadrangle,
/// 5 = 8-node hexahedron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementTopology {
    pub code: usize,
    pub vertex_count: usize,
}

impl ElementTopology {
    /// The default topology for a spatial dimension: quadrangles in 2D,
    /// hexahedra in 3D.
    pub fn for_dimension(dimension: usize) -> ElementTopology {
        match dimension {
            2 => ElementTopology {
                code: 3,
                vertex_count: 4,
            },
            _ => ElementTopology {
                code: 5,
                vertex_count: 8,
            },
        }
    }
}

#[derive(Debug)]
pub struct Element {
    pub id: usize,
    pub vertex_ids: Vec<usize>,
    /// Populated by vertex resolution, in `vertex_ids` order.
    pub vertex_coords: Vec<DVector<f64>>,
}

/// Parsed mesh: an append-only vertex coordinate store with an id lookup
/// table, plus the retained elements in file order.
#[derive(Debug)]
pub struct Mesh {
    pub dimension: usize,
    pub topology: ElementTopology,
    vertex_coords: Vec<DVector<f64>>,
    vertex_index: HashMap<usize, usize>,
    pub elements: Vec<Element>,
}

impl Mesh {
    pub fn new(dimension: usize, topology: ElementTopology) -> Mesh {
        Mesh {
            dimension,
            topology,
            vertex_coords: Vec::new(),
            vertex_index: HashMap::new(),
            elements: Vec::new(),
        }
    }

    /// Inserts a vertex, silently overwriting any prior entry with the
    /// same id.
    pub fn add_vertex(&mut self, id: usize, coords: DVector<f64>) {
        match self.vertex_index.get(&id) {
            Some(&idx) => self.vertex_coords[idx] = coords,
            None => {
                self.vertex_index.insert(id, self.vertex_coords.len());
                self.vertex_coords.push(coords);
            }
        }
    }

    pub fn vertex(&self, id: usize) -> Option<&DVector<f64>> {
        self.vertex_index.get(&id).map(|&idx| &self.vertex_coords[idx])
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_coords.len()
    }
}

#[derive(Debug, Clone)]
pub struct QuadraturePoint {
    /// Reference coordinates in [-1, 1]^D.
    pub coords: DVector<f64>,
    pub weight: f64,
}

#[derive(Debug)]
pub struct MaterialPoint {
    pub element_id: usize,
    pub global_id: usize,
    pub coordinates: DVector<f64>,
    /// Length 2*D, set by the stress initializer.
    pub stress: Option<DVector<f64>>,
}

/// A named subset of material points belonging to one material region.
/// Only group 0 exists today; callers iterate groups so adding more later
/// does not break them.
#[derive(Debug)]
pub struct MaterialPointGroup {
    pub id: usize,
    pub points: Vec<MaterialPoint>,
}

impl MaterialPointGroup {
    pub fn new(id: usize) -> MaterialPointGroup {
        MaterialPointGroup {
            id,
            points: Vec::new(),
        }
    }

    pub fn add_point(&mut self, point: MaterialPoint) {
        self.points.push(point);
    }

    pub fn coordinates(&self) -> Vec<&DVector<f64>> {
        self.points.iter().map(|p| &p.coordinates).collect()
    }

    pub fn stresses(&self) -> Vec<&DVector<f64>> {
        self.points.iter().filter_map(|p| p.stress.as_ref()).collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MaterialProperties {
    pub density: f64,
    pub k0: f64,
}

/// Run configuration assembled from the CLI and the optional input json.
#[derive(Debug)]
pub struct ModelMetadata {
    pub dimension: usize,
    pub gauss_order: usize,
    pub material: Option<MaterialProperties>,
}
