use std::time::Duration;

use criterion::{Criterion, Throughput};
use path_scatter::path::Path;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Quarter-circle arc of `radius` split into `segments` chords.
#[allow(dead_code)]
pub fn arc_path(radius: f64, segments: usize) -> Path {
    let points = (0..=segments).map(|i| {
        let angle = std::f64::consts::FRAC_PI_2 * i as f64 / segments.max(1) as f64;
        [radius * angle.cos(), radius * angle.sin(), 0.0]
    });
    Path::from_polyline(points).expect("arc path is valid")
}
