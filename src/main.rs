use std::env;
mod datatypes;
mod error;
mod generator;
mod mesher;
mod post_processor;
mod quadrature;
mod shape;

use error::MpmError;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 3 && args.len() != 4 {
        println!("usage: mpm-point-generator <mesh_file> <dimension> [input_json]");
        std::process::exit(1)
    }

    if let Err(err) = run(&args) {
        println!("{}", err);
        std::process::exit(1)
    }
}

fn run(args: &[String]) -> Result<(), MpmError> {
    let mesh_file = args[1].as_str();
    let dimension: usize = args[2]
        .parse()
        .map_err(|_| MpmError::Input(format!("Dimension must be 2 or 3, got {:?}", args[2])))?;
    let input_file = args.get(3).map(|s| s.as_str());

    let (mesh, metadata) = mesher::run(mesh_file, dimension, input_file)?;

    let mut groups = generator::generate(&mesh, &metadata)?;

    post_processor::write_coordinates(&groups, "material_points.txt")?;

    if let Some(material) = &metadata.material {
        generator::compute_stress(&mut groups, metadata.dimension, material);
        post_processor::write_stresses(&groups, "initial_stresses.txt")?;
    }

    Ok(())
}
