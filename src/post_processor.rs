use std::io::Write;

use crate::{datatypes::MaterialPointGroup, error::MpmError};

/// Writes material point coordinates to a text file
///
/// The first line is the total point count; each following line is one
/// point's coordinates, space separated, in generation order across groups.
///
/// # Arguments
/// * `groups` - The material point groups
/// * `output` - The output filename
pub fn write_coordinates(groups: &[MaterialPointGroup], output: &str) -> Result<(), MpmError> {
    let mut file = match std::fs::File::create(output) {
        Ok(f) => f,
        Err(err) => {
            return Err(MpmError::Output(format!(
                "Failed to create {}: {err}",
                output
            )));
        }
    };

    let total: usize = groups.iter().map(|g| g.points.len()).sum();
    writeln!(file, "{}", total)
        .map_err(|err| MpmError::Output(format!("Failed to write {}: {err}", output)))?;

    for group in groups {
        for coordinates in group.coordinates() {
            let row: Vec<String> = coordinates.iter().map(|c| c.to_string()).collect();
            writeln!(file, "{}", row.join(" "))
                .map_err(|err| MpmError::Output(format!("Failed to write {}: {err}", output)))?;
        }
    }

    println!("info: wrote {} coordinates to {}", total, output);

    Ok(())
}

/// Writes material point stresses to a text file, same layout as the
/// coordinate file but with 2*D components per row
///
/// # Arguments
/// * `groups` - The material point groups, after stress initialization
/// * `output` - The output filename
pub fn write_stresses(groups: &[MaterialPointGroup], output: &str) -> Result<(), MpmError> {
    let mut file = match std::fs::File::create(output) {
        Ok(f) => f,
        Err(err) => {
            return Err(MpmError::Output(format!(
                "Failed to create {}: {err}",
                output
            )));
        }
    };

    let total: usize = groups.iter().map(|g| g.stresses().len()).sum();
    writeln!(file, "{}", total)
        .map_err(|err| MpmError::Output(format!("Failed to write {}: {err}", output)))?;

    for group in groups {
        for stress in group.stresses() {
            let row: Vec<String> = stress.iter().map(|s| s.to_string()).collect();
            writeln!(file, "{}", row.join(" "))
                .map_err(|err| MpmError::Output(format!("Failed to write {}: {err}", output)))?;
        }
    }

    println!("info: wrote {} stresses to {}", total, output);

    Ok(())
}
