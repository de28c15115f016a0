use glam::{Vec2, Vec3};
use scatter_lab::prelude::*;
use scatter_lab_examples::{init_tracing, render_placements_to_png, ItemStyle, RenderConfig};

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Winding road plus a detached side lane; both form one path.
    let road: Vec<Vec3> = (0..=24)
        .map(|i| {
            let x = -30.0 + i as f32 * 2.5;
            Vec3::new(x, (x * 0.15).sin() * 8.0, 0.0)
        })
        .collect();
    let lane = vec![Vec3::new(-20.0, -20.0, 0.0), Vec3::new(20.0, -20.0, 0.0)];
    let curve = PathCurve::new(road).with_polyline(lane);
    let guides = curve
        .world_segments()
        .iter()
        .map(|s| (s.start, s.end))
        .collect();

    let config = ScatterConfig::path(curve)
        .with_min_distance(1.5)
        .with_path_offset(3.0)
        // Fence posts follow the road direction.
        .with_item(
            ScatterItem::new("post")
                .with_density(0.6)
                .with_rotation_range(0.0, 0.0)
                .with_seed(5),
        )
        // Shrubs are scattered to both sides.
        .with_item(
            ScatterItem::new("shrub")
                .with_density(2.0)
                .with_align_to_normal(false)
                .with_scale_range(0.6, 1.4)
                .with_seed(9),
        );

    let mut placed_per_item = [0usize; 2];
    let mut sink = FnSink::new(|event| {
        if let ScatterEvent::PlacementMade { placement } = event {
            placed_per_item[placement.item_index] += 1;
        }
    });
    let result = run_scatter_with_events(&config, &mut sink)?;
    tracing::info!(
        "posts: {}, shrubs: {}",
        placed_per_item[0],
        placed_per_item[1]
    );

    let mut rc = RenderConfig::new((900, 900), Vec2::splat(-32.0), Vec2::splat(32.0))
        .with_guides(guides)
        .with_heading(true);
    rc.set_item_style(
        "post",
        ItemStyle {
            color: [230, 200, 120],
            radius: 2,
        },
    );
    rc.set_item_style(
        "shrub",
        ItemStyle {
            color: [90, 170, 90],
            radius: 3,
        },
    );
    render_placements_to_png(&result, &rc, "scatter-path-offset.png")?;
    Ok(())
}
