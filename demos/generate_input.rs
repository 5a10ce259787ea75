//! Example: Generate an input file for the edge extractor
//!
//! Usage: cargo run --example generate_input -- <output> [count] [distribution] [seed]
//! where distribution is one of uniform, ball, sphere, thin-sphere.

use std::fs::File;

use weighted_delaunay_edges::*;

fn parse_distribution(name: &str) -> Option<Distribution> {
    match name {
        "uniform" => Some(Distribution::Uniform),
        "ball" => Some(Distribution::Ball),
        "sphere" => Some(Distribution::Sphere),
        "thin-sphere" => Some(Distribution::ThinSphere),
        _ => None,
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(path) = args.first() else {
        eprintln!("usage: generate_input <output> [count] [distribution] [seed]");
        std::process::exit(1);
    };

    let count: usize = args.get(1).map(|s| s.parse()).transpose()?.unwrap_or(10_000);
    let distribution = match args.get(2) {
        Some(name) => parse_distribution(name).ok_or_else(|| format!("unknown distribution {:?}", name))?,
        None => Distribution::Uniform,
    };
    let seed: u64 = args.get(3).map(|s| s.parse()).transpose()?.unwrap_or(0);

    let config = EngineConfigBuilder::new()
        .point_num(count)
        .distribution(distribution)
        .seed(seed)
        .build()?;

    let points = generate_points(&config);
    write_points(File::create(path)?, &points)?;

    println!(
        "Wrote {} {} points (seed {}) to {}",
        points.len(),
        distribution.name(),
        seed,
        path
    );
    Ok(())
}
