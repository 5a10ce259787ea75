//! Complete workflow demonstration for weighted_delaunay_edges

use weighted_delaunay_edges::*;

fn main() -> Result<()> {
    println!("=== weighted_delaunay_edges Demo ===\n");

    // Step 1: Generate a weighted cloud
    println!("Step 1: Generating points...");
    let config = EngineConfigBuilder::new()
        .point_num(5_000)
        .distribution(Distribution::Ball)
        .weight_max(0.001)?
        .seed(7)
        .log_stats(true)
        .log_timing(true)
        .do_check(cfg!(feature = "validation"))
        .build()?;
    let raw = generate_points(&config);
    println!("  {} {} points", raw.len(), config.distribution.name());

    // Step 2: Normalize into the engine grid
    println!("\nStep 2: Normalizing...");
    let extent = BoundingExtent::from_points(&raw);
    let normalized = normalize_points(&raw, extent, config.grid_size)?;
    println!(
        "  extent [{:.3}, {:.3}] -> grid [1, {}]",
        extent.min,
        extent.max,
        config.grid_size - 2
    );

    // Step 3: Triangulate and extract edges
    println!("\nStep 3: Triangulating...");
    let mut engine = IncrementalEngine::new();
    let result = compute_edges(&normalized, &config, &mut engine)?;
    println!("  {} tetrahedra", result.tetra_count);
    println!("  {} unique edges", result.edges.len());
    println!("  engine time {:?}", result.timing.total());

    // Step 4: Edge statistics
    println!("\nStep 4: Vertex degrees:");
    let mut degree = vec![0usize; raw.len()];
    for edge in &result.edges {
        degree[edge.v0() as usize] += 1;
        degree[edge.v1() as usize] += 1;
    }
    let connected: Vec<usize> = degree.iter().copied().filter(|&d| d > 0).collect();
    if !connected.is_empty() {
        let mean = connected.iter().sum::<usize>() as f64 / connected.len() as f64;
        println!("  {} vertices in the skeleton", connected.len());
        println!("  {} hidden points", raw.len() - connected.len());
        println!("  mean degree {:.2}", mean);
    }

    // Step 5: Write a sample
    println!("\nStep 5: First edges:");
    let mut out = Vec::new();
    write_edges(&mut out, &result.edges[..result.edges.len().min(5)])
        .map_err(|e| EdgeError::OutputWriteFailed(e.to_string()))?;
    print!("{}", String::from_utf8_lossy(&out));

    println!("\n=== Demo Complete ===");
    Ok(())
}
