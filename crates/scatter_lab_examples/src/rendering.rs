use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use glam::{Vec2, Vec3};
use image::{Rgb, RgbImage};
use scatter_lab::prelude::{Placement, RunResult};

/// Installs a `fmt` subscriber honoring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Debug, Clone, Copy)]
pub struct ItemStyle {
    pub color: [u8; 3],
    /// Radius in pixels at scale 1.
    pub radius: u32,
}

const PALETTE: [[u8; 3]; 6] = [
    [120, 200, 90],
    [230, 170, 60],
    [90, 160, 230],
    [220, 90, 110],
    [180, 120, 220],
    [235, 235, 235],
];

/// Top-down (XY) view settings.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub image_size: (u32, u32),
    /// World-space XY rectangle mapped onto the image.
    pub min: Vec2,
    pub max: Vec2,
    pub background: [u8; 3],
    /// Grey lines drawn under the placements, e.g. a path.
    pub guides: Vec<(Vec3, Vec3)>,
    /// Draw a short tick along each placement's local +Y.
    pub show_heading: bool,
    styles: HashMap<String, ItemStyle>,
}

impl RenderConfig {
    pub fn new(image_size: (u32, u32), min: Vec2, max: Vec2) -> Self {
        Self {
            image_size,
            min,
            max,
            background: [26, 26, 26],
            guides: Vec::new(),
            show_heading: false,
            styles: HashMap::new(),
        }
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    pub fn with_guides(mut self, guides: Vec<(Vec3, Vec3)>) -> Self {
        self.guides = guides;
        self
    }

    pub fn with_heading(mut self, show: bool) -> Self {
        self.show_heading = show;
        self
    }

    pub fn set_item_style(&mut self, object: impl Into<String>, style: ItemStyle) {
        self.styles.insert(object.into(), style);
    }

    fn style_for(&self, placement: &Placement) -> ItemStyle {
        self.styles
            .get(placement.object.as_str())
            .copied()
            .unwrap_or(ItemStyle {
                color: PALETTE[placement.item_index % PALETTE.len()],
                radius: 3,
            })
    }

    fn to_pixel(&self, p: Vec3) -> (i64, i64) {
        let (w, h) = self.image_size;
        let span = (self.max - self.min).max(Vec2::splat(f32::EPSILON));
        let t = (p.truncate() - self.min) / span;
        let x = (t.x * w as f32).floor() as i64;
        // Image rows grow downwards, world Y grows upwards.
        let y = ((1.0 - t.y) * h as f32).floor() as i64;
        (x, y)
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: [u8; 3]) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }
}

fn draw_line(img: &mut RgbImage, a: (i64, i64), b: (i64, i64), color: [u8; 3]) {
    let steps = (b.0 - a.0).abs().max((b.1 - a.1).abs()).max(1);
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = a.0 as f32 + (b.0 - a.0) as f32 * t;
        let y = a.1 as f32 + (b.1 - a.1) as f32 * t;
        put(img, x.round() as i64, y.round() as i64, color);
    }
}

fn draw_disk(img: &mut RgbImage, c: (i64, i64), r: i64, color: [u8; 3]) {
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                put(img, c.0 + dx, c.1 + dy, color);
            }
        }
    }
}

/// Renders all placements of `result` as disks sized by their scale.
pub fn render_placements_to_png(
    result: &RunResult,
    config: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let (w, h) = config.image_size;
    let mut img = RgbImage::from_pixel(w, h, Rgb(config.background));

    for &(a, b) in &config.guides {
        draw_line(&mut img, config.to_pixel(a), config.to_pixel(b), [90, 90, 90]);
    }

    for placement in &result.placements {
        let style = config.style_for(placement);
        let center = config.to_pixel(placement.position);
        let radius = (style.radius as f32 * placement.scale).round().max(1.0) as i64;
        draw_disk(&mut img, center, radius, style.color);

        if config.show_heading {
            let forward = (placement.rotation * Vec3::Y).truncate().normalize_or_zero();
            let tip = (
                center.0 + (forward.x * (radius * 3) as f32) as i64,
                center.1 - (forward.y * (radius * 3) as f32) as i64,
            );
            draw_line(&mut img, center, tip, style.color);
        }
    }

    let path = path.as_ref();
    img.save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(
        "Wrote {} placements to {}.",
        result.placements.len(),
        path.display()
    );
    Ok(())
}
