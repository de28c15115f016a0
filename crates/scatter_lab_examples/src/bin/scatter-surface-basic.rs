use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scatter_lab::prelude::*;
use scatter_lab_examples::{init_tracing, render_placements_to_png, ItemStyle, RenderConfig};

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Gently rolling 40x40 terrain
    let size = 40.0;
    let flat = SurfaceMesh::triangulated_grid(size, 24);
    let mut rng = StdRng::seed_from_u64(2025);
    let vertices: Vec<Vec3> = flat
        .vertices
        .iter()
        .map(|v| *v + Vec3::Z * rng.random_range(0.0..0.6))
        .collect();
    let faces = flat.polygons.iter().map(|p| p.vertices.clone()).collect();
    let terrain = SurfaceMesh::new(vertices, faces)?;

    let config = ScatterConfig::surface(terrain)
        .with_min_distance(0.8)
        .with_item(ScatterItem::new("grass").with_density(1.5).with_seed(1))
        .with_item(
            ScatterItem::new("rock")
                .with_density(0.1)
                .with_scale_range(1.5, 3.0)
                .with_seed(7),
        )
        .with_item(
            ScatterItem::new("tree")
                .with_density(0.05)
                .with_scale_range(2.0, 2.5)
                .with_align_to_normal(false)
                .with_seed(42),
        );

    let mut warnings = VecSink::filtered([ScatterEventKind::Warning]);
    let result = run_scatter_with_events(&config, &mut warnings)?;
    for event in warnings.as_slice() {
        tracing::warn!("{event:?}");
    }
    tracing::info!(
        "{} placements from {} candidates ({} rejected).",
        result.placements.len(),
        result.candidates_evaluated,
        result.candidates_rejected
    );

    let half = Vec2::splat(size * 0.5);
    let mut rc = RenderConfig::new((800, 800), -half, half);
    rc.set_item_style(
        "grass",
        ItemStyle {
            color: [110, 190, 80],
            radius: 2,
        },
    );
    rc.set_item_style(
        "rock",
        ItemStyle {
            color: [150, 150, 160],
            radius: 3,
        },
    );
    rc.set_item_style(
        "tree",
        ItemStyle {
            color: [40, 110, 50],
            radius: 5,
        },
    );

    render_placements_to_png(&result, &rc, "scatter-surface-basic.png")?;
    Ok(())
}
