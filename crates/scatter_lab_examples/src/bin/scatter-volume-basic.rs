use glam::Vec3;
use scatter_lab::prelude::*;
use scatter_lab_examples::{init_tracing, render_placements_to_png, RenderConfig};

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Floating debris in a 20x20x6 box
    let volume = VolumeBox::new(Vec3::new(20.0, 20.0, 6.0), Vec3::new(0.0, 0.0, 3.0));
    let config = ScatterConfig::volume(volume)
        .with_min_distance(1.2)
        .with_item(
            ScatterItem::new("asteroid")
                .with_density(0.05)
                .with_scale_range(0.5, 2.0)
                .with_seed(3),
        )
        .with_item(
            ScatterItem::new("shard")
                .with_density(0.2)
                .with_scale_range(0.3, 0.6)
                // Only yaw within a narrow band; pitch and roll stay random.
                .with_rotation_range(80.0, 100.0)
                .with_seed(11),
        );

    let runner = ScatterRunner::try_new(&config)?;
    for (index, item) in config.items.iter().enumerate() {
        tracing::info!(
            "Item {index} draws {} candidates from {:.0} units^3.",
            runner.candidate_count(item),
            runner.measure()
        );
    }
    let result = runner.run();

    let (min, max) = volume.bounds();
    let rc = RenderConfig::new((800, 800), min.truncate(), max.truncate())
        .with_background([12, 12, 24]);
    render_placements_to_png(&result, &rc, "scatter-volume-basic.png")?;

    Ok(())
}
