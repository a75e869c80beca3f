use json::JsonValue;
use nalgebra::DVector;

use crate::{
    datatypes::{Element, ElementTopology, MaterialProperties, Mesh, ModelMetadata},
    error::MpmError,
};

/// Section keyword opening the vertex block of the legacy mesh dialect.
const NODES_KEYWORD: &str = "$Nodes";
/// Section keyword opening the element block.
const ELEMENTS_KEYWORD: &str = "$Elements";
/// Lines containing this marker are ignored wherever they occur.
const COMMENT_MARKER: &str = "#";
/// Number of region tag fields between the topology code and the vertex ids.
const ELEMENT_TAG_COUNT: usize = 2;

/// Returns a line iterator positioned just past a section keyword
///
/// The search scans from the start of the stream, so sections are found
/// regardless of their order in the file. A line matches on exact equality,
/// or failing that when the keyword appears as a substring; the scan stops at
/// the first substring hit. If the keyword never appears this is a soft
/// failure: a warning is printed and the returned iterator is exhausted, so
/// parsing continues with an empty section.
///
/// # Arguments
/// * `contents` - The full mesh file contents
/// * `keyword` - The section keyword to find
///
/// # Returns
/// A line iterator starting at the first line after the keyword
fn section_lines<'a>(contents: &'a str, keyword: &str) -> std::str::Split<'a, char> {
    let mut lines = contents.split('\n');

    for line in &mut lines {
        let line = line.trim();
        if line == keyword || line.contains(keyword) {
            return lines;
        }
    }

    println!("warning [mesh]: section keyword {} not found", keyword);
    lines
}

/// Returns the next data line, skipping blank and comment lines
///
/// Stops at section marker lines (`$...`), so a truncated section ends at
/// its closing marker instead of bleeding into the next section.
fn next_record<'a>(lines: &mut impl Iterator<Item = &'a str>) -> Option<&'a str> {
    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.contains(COMMENT_MARKER) {
            continue;
        }
        if line.starts_with('$') {
            return None;
        }
        return Some(line);
    }
    None
}

/// Reads the declared record count that follows a section keyword
///
/// Returns zero when the stream is already exhausted (a failed keyword
/// search) or when the section is empty.
fn read_declared_count<'a>(lines: &mut impl Iterator<Item = &'a str>) -> Result<usize, MpmError> {
    let line = match next_record(lines) {
        Some(l) => l,
        None => return Ok(0),
    };

    line.split_whitespace()
        .next()
        .unwrap_or("")
        .parse()
        .map_err(|_| MpmError::Mesher(format!("Non-integer record count: {:?}", line)))
}

/// Parses one vertex record `id x y [z]` into the mesh
fn parse_vertex_record(line: &str, mesh: &mut Mesh) -> Result<(), MpmError> {
    let dimension = mesh.dimension;
    let mut fields = line.split_whitespace();

    let id: usize = fields
        .next()
        .ok_or_else(|| MpmError::Mesher("Empty vertex record".to_string()))?
        .parse()
        .map_err(|_| MpmError::Mesher(format!("Non-integer vertex id in record {:?}", line)))?;

    let mut coords = DVector::zeros(dimension);
    for axis in 0..dimension {
        let field = fields.next().ok_or_else(|| {
            MpmError::Mesher(format!(
                "Vertex {} has fewer than {} coordinates",
                id, dimension
            ))
        })?;
        coords[axis] = field
            .parse()
            .map_err(|_| MpmError::Mesher(format!("Non-float coordinate in vertex {}", id)))?;
    }

    mesh.add_vertex(id, coords);
    Ok(())
}

/// Parses one element record `id topology_code tag1 tag2 v1 .. vV`
///
/// Records whose topology code differs from the configured topology are
/// discarded without storing their vertex ids; only the id and topology code
/// are parsed eagerly, so a malformed field in a discarded record does not
/// abort the run.
fn parse_element_record(line: &str, mesh: &mut Mesh) -> Result<(), MpmError> {
    let topology = mesh.topology;
    let fields: Vec<&str> = line.split_whitespace().collect();

    if fields.len() < 2 {
        return Err(MpmError::Mesher(format!(
            "Element record too short: {:?}",
            line
        )));
    }

    let id: usize = fields[0].parse().map_err(|_| {
        MpmError::Mesher(format!("Non-integer element id in record {:?}", line))
    })?;
    let topology_code: usize = fields[1].parse().map_err(|_| {
        MpmError::Mesher(format!("Non-integer topology code in record {:?}", line))
    })?;

    if topology_code != topology.code {
        return Ok(());
    }

    let vertex_fields = &fields[2 + ELEMENT_TAG_COUNT..];
    if vertex_fields.len() != topology.vertex_count {
        return Err(MpmError::Mesher(format!(
            "Element {} has {} vertex ids, expected {}",
            id,
            vertex_fields.len(),
            topology.vertex_count
        )));
    }

    let vertex_ids: Vec<usize> = vertex_fields
        .iter()
        .map(|f| {
            f.parse().map_err(|_| {
                MpmError::Mesher(format!("Non-integer vertex id in element {}", id))
            })
        })
        .collect::<Result<_, _>>()?;

    mesh.elements.push(Element {
        id,
        vertex_ids,
        vertex_coords: Vec::new(),
    });
    Ok(())
}

/// Parses a legacy ASCII mesh into vertices and retained elements
///
/// # Arguments
/// * `contents` - The full mesh file contents
/// * `dimension` - Spatial dimension (2 or 3)
/// * `topology` - The single element topology retained for this run
///
/// # Returns
/// The parsed Mesh, with element coordinates not yet resolved
pub fn parse_mesh(
    contents: &str,
    dimension: usize,
    topology: ElementTopology,
) -> Result<Mesh, MpmError> {
    let mut mesh = Mesh::new(dimension, topology);

    // Vertex section
    let mut lines = section_lines(contents, NODES_KEYWORD);
    let declared_vertices = read_declared_count(&mut lines)?;

    for _ in 0..declared_vertices {
        match next_record(&mut lines) {
            Some(line) => parse_vertex_record(line, &mut mesh)?,
            None => break,
        }
    }

    if mesh.vertex_count() != declared_vertices {
        println!(
            "warning [mesh]: parsed {} vertices, {} declared",
            mesh.vertex_count(),
            declared_vertices
        );
    }

    // Element section
    let mut lines = section_lines(contents, ELEMENTS_KEYWORD);
    let declared_elements = read_declared_count(&mut lines)?;

    let mut parsed_elements = 0;
    for _ in 0..declared_elements {
        match next_record(&mut lines) {
            Some(line) => {
                parse_element_record(line, &mut mesh)?;
                parsed_elements += 1;
            }
            None => break,
        }
    }

    if parsed_elements != declared_elements {
        println!(
            "warning [mesh]: parsed {} element records, {} declared",
            parsed_elements, declared_elements
        );
    }

    Ok(mesh)
}

/// Resolves each retained element's vertex ids into physical coordinates
///
/// Coordinates are attached in vertex-id-list order. An id absent from the
/// vertex map is a hard error, never a silent dereference.
pub fn resolve_vertices(mesh: &mut Mesh) -> Result<(), MpmError> {
    let mut resolved: Vec<Vec<DVector<f64>>> = Vec::with_capacity(mesh.elements.len());

    for element in &mesh.elements {
        let mut coords = Vec::with_capacity(element.vertex_ids.len());
        for &vertex_id in &element.vertex_ids {
            let vertex = mesh.vertex(vertex_id).ok_or_else(|| {
                MpmError::Mesher(format!(
                    "Unresolved vertex reference: element {} references vertex {} which is not in the mesh",
                    element.id, vertex_id
                ))
            })?;
            coords.push(vertex.clone());
        }
        resolved.push(coords);
    }

    for (element, coords) in mesh.elements.iter_mut().zip(resolved) {
        element.vertex_coords = coords;
    }

    Ok(())
}

/// Parses the input json into a JsonValue object
///
/// # Arguments
/// * `input_file` - The path to the input file
///
/// # Returns
/// A JsonValue object
fn load_input_file(input_file: &str) -> Result<JsonValue, MpmError> {
    let file_string = match std::fs::read_to_string(input_file) {
        Ok(f) => f,
        Err(_err) => {
            return Err(MpmError::Input(format!(
                "Unable to open input file {}",
                input_file
            )))
        }
    };

    let input_file_json = match json::parse(&file_string) {
        Ok(f) => f,
        Err(err) => {
            return Err(MpmError::Input(format!(
                "Error in input file json: {err}"
            )))
        }
    };

    if !input_file_json.has_key("material") {
        return Err(MpmError::Input(
            "Input json missing material field".to_string(),
        ));
    }
    if !input_file_json["material"].has_key("density") {
        return Err(MpmError::Input(
            "Input json missing density field in material section".to_string(),
        ));
    }
    if !input_file_json["material"].has_key("k0") {
        return Err(MpmError::Input(
            "Input json missing k0 field in material section".to_string(),
        ));
    }

    Ok(input_file_json)
}

/// Parses run configuration from the input json
///
/// # Arguments
/// * `input_json` - The input file as a JsonValue object
/// * `dimension` - Spatial dimension from the command line
///
/// # Returns
/// A ModelMetadata instance
fn parse_input_metadata(
    input_json: &JsonValue,
    dimension: usize,
) -> Result<ModelMetadata, MpmError> {
    let density = input_json["material"]["density"].as_f64();
    let k0 = input_json["material"]["k0"].as_f64();

    if density.is_none() {
        return Err(MpmError::Input(
            "Bad value for density in material section".to_owned(),
        ));
    }
    if k0.is_none() {
        return Err(MpmError::Input(
            "Bad value for k0 in material section".to_owned(),
        ));
    }

    let gauss_order = if input_json.has_key("gauss_order") {
        match input_json["gauss_order"].as_usize() {
            Some(n) => n,
            None => {
                return Err(MpmError::Input(
                    "Bad value for gauss_order in input json".to_owned(),
                ))
            }
        }
    } else {
        1
    };

    Ok(ModelMetadata {
        dimension,
        gauss_order,
        material: Some(MaterialProperties {
            density: density.unwrap(),
            k0: k0.unwrap(),
        }),
    })
}

/// Runs the mesher
///
/// # Arguments
/// * `mesh_file` - The path to the legacy ASCII mesh file
/// * `dimension` - Spatial dimension (2 or 3)
/// * `input_file` - Optional json input with material properties
///
/// # Returns
/// The resolved Mesh and the run configuration, in that order
pub fn run(
    mesh_file: &str,
    dimension: usize,
    input_file: Option<&str>,
) -> Result<(Mesh, ModelMetadata), MpmError> {
    if dimension != 2 && dimension != 3 {
        return Err(MpmError::Input(format!(
            "Dimension must be 2 or 3, got {}",
            dimension
        )));
    }

    let metadata = match input_file {
        Some(path) => {
            let input_json = load_input_file(path)?;
            parse_input_metadata(&input_json, dimension)?
        }
        None => ModelMetadata {
            dimension,
            gauss_order: 1,
            material: None,
        },
    };

    let contents = match std::fs::read_to_string(mesh_file) {
        Ok(c) => c,
        Err(_err) => {
            return Err(MpmError::Mesher(format!(
                "Unable to open mesh file {}",
                mesh_file
            )))
        }
    };

    let topology = ElementTopology::for_dimension(dimension);
    let mut mesh = parse_mesh(&contents, dimension, topology)?;
    resolve_vertices(&mut mesh)?;

    println!(
        "info: loaded {} vertices and {} elements",
        mesh.vertex_count(),
        mesh.elements.len()
    );

    Ok((mesh, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const UNIT_CUBE_MESH: &str = "\
$MeshFormat
2.2 0 8
$EndMeshFormat
$Nodes
8
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 1.0 1.0 0.0
4 0.0 1.0 0.0
5 0.0 0.0 1.0
6 1.0 0.0 1.0
7 1.0 1.0 1.0
8 0.0 1.0 1.0
$EndNodes
$Elements
1
1 5 0 0 1 2 3 4 5 6 7 8
$EndElements
";

    fn hex_topology() -> ElementTopology {
        ElementTopology::for_dimension(3)
    }

    #[test]
    fn parses_unit_cube_mesh() {
        let mesh = parse_mesh(UNIT_CUBE_MESH, 3, hex_topology()).unwrap();

        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.elements.len(), 1);
        assert_eq!(mesh.elements[0].id, 1);
        assert_eq!(mesh.elements[0].vertex_ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);

        let v7 = mesh.vertex(7).unwrap();
        assert_relative_eq!(v7[0], 1.0);
        assert_relative_eq!(v7[1], 1.0);
        assert_relative_eq!(v7[2], 1.0);
    }

    #[test]
    fn skips_blank_and_comment_lines_among_records() {
        let mesh_text = "\
$Nodes
3

# interior comment
1 0.0 0.0 0.0
2 1.0 0.0 0.0

3 0.0 1.0 0.0
$EndNodes
$Elements
0
$EndElements
";
        let mesh = parse_mesh(mesh_text, 3, hex_topology()).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn duplicate_vertex_id_overwrites_silently() {
        let mesh_text = "\
$Nodes
2
1 0.0 0.0 0.0
1 5.0 5.0 5.0
$EndNodes
$Elements
0
$EndElements
";
        let mesh = parse_mesh(mesh_text, 3, hex_topology()).unwrap();
        assert_eq!(mesh.vertex_count(), 1);
        assert_relative_eq!(mesh.vertex(1).unwrap()[0], 5.0);
    }

    #[test]
    fn discards_elements_with_other_topology_codes() {
        let mesh_text = "\
$Nodes
8
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 1.0 1.0 0.0
4 0.0 1.0 0.0
5 0.0 0.0 1.0
6 1.0 0.0 1.0
7 1.0 1.0 1.0
8 0.0 1.0 1.0
$EndNodes
$Elements
3
1 2 0 0 1 2 3
2 5 0 0 1 2 3 4 5 6 7 8
3 1 0 0 1 2
$EndElements
";
        let mesh = parse_mesh(mesh_text, 3, hex_topology()).unwrap();
        assert_eq!(mesh.elements.len(), 1);
        assert_eq!(mesh.elements[0].id, 2);
    }

    #[test]
    fn sections_are_found_regardless_of_file_order() {
        // element block ahead of the vertex block; each section search
        // scans from the start of the stream, so nothing is lost
        let mesh_text = "\
$Elements
1
1 5 0 0 1 2 3 4 5 6 7 8
$EndElements
$Nodes
8
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 1.0 1.0 0.0
4 0.0 1.0 0.0
5 0.0 0.0 1.0
6 1.0 0.0 1.0
7 1.0 1.0 1.0
8 0.0 1.0 1.0
$EndNodes
";
        let mesh = parse_mesh(mesh_text, 3, hex_topology()).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.elements.len(), 1);
        assert_eq!(mesh.elements[0].vertex_ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn truncated_vertex_section_warns_but_parses() {
        // declared 3, only 2 records before the closing marker
        let mesh_text = "\
$Nodes
3
1 0.0 0.0 0.0
2 1.0 0.0 0.0
$EndNodes
$Elements
0
$EndElements
";
        let mesh = parse_mesh(mesh_text, 3, hex_topology()).unwrap();
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.elements.len(), 0);
    }

    #[test]
    fn malformed_field_in_discarded_element_record_is_skipped() {
        let mesh_text = "\
$Nodes
1
1 0.0 0.0 0.0
$EndNodes
$Elements
2
1 2 0 0 1 2 bad-token
2 5 0 0 1 1 1 1 1 1 1 1
$EndElements
";
        let mesh = parse_mesh(mesh_text, 3, hex_topology()).unwrap();
        assert_eq!(mesh.elements.len(), 1);
        assert_eq!(mesh.elements[0].id, 2);
    }

    #[test]
    fn malformed_vertex_id_in_retained_element_is_an_error() {
        let mesh_text = "\
$Nodes
1
1 0.0 0.0 0.0
$EndNodes
$Elements
1
1 5 0 0 1 2 3 4 5 6 7 oops
$EndElements
";
        assert!(parse_mesh(mesh_text, 3, hex_topology()).is_err());
    }

    #[test]
    fn missing_section_keyword_is_not_fatal() {
        let mesh = parse_mesh("no sections here\n", 3, hex_topology()).unwrap();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.elements.len(), 0);
    }

    #[test]
    fn substring_keyword_match_opens_a_section() {
        let mesh_text = "\
$Nodes extra trailing text
1
1 0.5 0.5 0.5
$EndNodes
$Elements
0
$EndElements
";
        let mesh = parse_mesh(mesh_text, 3, hex_topology()).unwrap();
        assert_eq!(mesh.vertex_count(), 1);
    }

    #[test]
    fn parses_two_dimensional_vertices() {
        let mesh_text = "\
$Nodes
2
1 0.25 0.75
2 1.0 2.0
$EndNodes
$Elements
0
$EndElements
";
        let mesh = parse_mesh(mesh_text, 2, ElementTopology::for_dimension(2)).unwrap();
        assert_eq!(mesh.vertex_count(), 2);
        let v1 = mesh.vertex(1).unwrap();
        assert_eq!(v1.len(), 2);
        assert_relative_eq!(v1[1], 0.75);
    }

    #[test]
    fn resolves_element_coordinates_in_id_order() {
        let mut mesh = parse_mesh(UNIT_CUBE_MESH, 3, hex_topology()).unwrap();
        resolve_vertices(&mut mesh).unwrap();

        let element = &mesh.elements[0];
        assert_eq!(element.vertex_coords.len(), 8);
        for (vertex_id, coords) in element.vertex_ids.iter().zip(&element.vertex_coords) {
            assert_eq!(coords, mesh.vertex(*vertex_id).unwrap());
        }
    }

    #[test]
    fn unresolved_vertex_reference_is_an_error() {
        let mesh_text = "\
$Nodes
1
1 0.0 0.0 0.0
$EndNodes
$Elements
1
1 5 0 0 1 2 3 4 5 6 7 8
$EndElements
";
        let mut mesh = parse_mesh(mesh_text, 3, hex_topology()).unwrap();
        let err = resolve_vertices(&mut mesh).unwrap_err();
        assert!(format!("{}", err).contains("Unresolved vertex reference"));
    }

    #[test]
    fn malformed_coordinate_is_an_error() {
        let mesh_text = "\
$Nodes
1
1 0.0 oops 0.0
$EndNodes
";
        assert!(parse_mesh(mesh_text, 3, hex_topology()).is_err());
    }
}
