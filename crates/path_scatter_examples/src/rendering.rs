use std::collections::HashMap;
use std::path::Path as FsPath;

use glam::{DVec2, DVec3};
use image::{Rgb, RgbImage};
use path_scatter::prelude::*;
use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber honouring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// How objects of one asset are drawn.
#[derive(Debug, Clone, Copy)]
pub enum AssetStyle {
    /// Filled disc with a fixed pixel radius.
    Circle { color: [u8; 3], radius: u32 },
    /// Outline of the object's scaled bounding sphere, in world units.
    Bounds { color: [u8; 3] },
}

/// Top-down (XY plane) rendering setup.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub image_size: (u32, u32),
    /// World-space center of the image.
    pub domain_center: DVec2,
    /// World-space size covered by the image.
    pub domain_extent: DVec2,
    pub background: [u8; 3],
    pub path_color: [u8; 3],
    styles: HashMap<String, AssetStyle>,
}

impl RenderConfig {
    pub fn new(image_size: (u32, u32), domain_extent: DVec2) -> Self {
        Self {
            image_size,
            domain_center: DVec2::ZERO,
            domain_extent,
            background: [240, 240, 240],
            path_color: [90, 90, 90],
            styles: HashMap::new(),
        }
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    pub fn with_domain_center(mut self, center: DVec2) -> Self {
        self.domain_center = center;
        self
    }

    pub fn with_path_color(mut self, color: [u8; 3]) -> Self {
        self.path_color = color;
        self
    }

    pub fn set_asset_style(&mut self, asset_id: impl Into<String>, style: AssetStyle) -> &mut Self {
        self.styles.insert(asset_id.into(), style);
        self
    }

    fn style(&self, asset_id: &str) -> AssetStyle {
        self.styles
            .get(asset_id)
            .copied()
            .unwrap_or(AssetStyle::Circle {
                color: [200, 30, 30],
                radius: 4,
            })
    }

    fn pixels_per_unit(&self) -> f64 {
        let (w, h) = self.image_size;
        (w as f64 / self.domain_extent.x).min(h as f64 / self.domain_extent.y)
    }

    fn to_pixel(&self, world: DVec3) -> (i64, i64) {
        let (w, h) = self.image_size;
        let scale = self.pixels_per_unit();
        let local = (world.truncate() - self.domain_center) * scale;
        // Image y grows downwards.
        (
            (w as f64 * 0.5 + local.x).round() as i64,
            (h as f64 * 0.5 - local.y).round() as i64,
        )
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: [u8; 3]) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }
}

fn fill_disc(img: &mut RgbImage, (cx, cy): (i64, i64), radius: i64, color: [u8; 3]) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put(img, cx + dx, cy + dy, color);
            }
        }
    }
}

fn ring(img: &mut RgbImage, (cx, cy): (i64, i64), radius: i64, color: [u8; 3]) {
    let steps = (radius.max(1) * 8) as usize;
    for i in 0..steps {
        let a = std::f64::consts::TAU * i as f64 / steps as f64;
        let x = cx + (radius as f64 * a.cos()).round() as i64;
        let y = cy + (radius as f64 * a.sin()).round() as i64;
        put(img, x, y, color);
    }
    put(img, cx, cy, color);
}

/// Renders the scene's live objects, and optionally the path, to a PNG file.
pub fn render_scene_to_png(
    scene: &InMemoryScene,
    path: Option<&Path>,
    config: &RenderConfig,
    out: impl AsRef<FsPath>,
) -> anyhow::Result<()> {
    let (w, h) = config.image_size;
    let mut img = RgbImage::from_pixel(w, h, Rgb(config.background));

    if let Some(path) = path {
        let steps = (path.total_length() * config.pixels_per_unit()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let d = path.total_length() * i as f64 / steps as f64;
            let (x, y) = config.to_pixel(path.sample_at(d).position);
            put(&mut img, x, y, config.path_color);
        }
    }

    for (_, object) in scene.objects() {
        let center = config.to_pixel(object.transform.translation);
        match config.style(&object.asset_id) {
            AssetStyle::Circle { color, radius } => fill_disc(&mut img, center, radius as i64, color),
            AssetStyle::Bounds { color } => {
                let world = (object.half_extent * object.transform.scale.abs()).max_element();
                let radius = (world * config.pixels_per_unit()).round() as i64;
                ring(&mut img, center, radius, color);
            }
        }
    }

    img.save(out.as_ref())?;
    tracing::info!("Wrote {}.", out.as_ref().display());
    Ok(())
}
