use glam::DVec2;
use path_scatter::prelude::*;
use path_scatter_examples::{init_tracing, render_scene_to_png, AssetStyle, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let content = InMemoryContent::new()
        .with_asset("lamp", [4.0, 4.0, 60.0])
        .with_asset("bench", [20.0, 8.0, 6.0])
        .with_asset("shrub", [12.0, 12.0, 10.0]);
    let mut scene = InMemoryScene::from_content(&content);

    let radius = 400.0;
    let arc = (0..=32).map(|i| {
        let angle = std::f64::consts::PI * i as f64 / 32.0;
        [radius * angle.cos(), radius * angle.sin() - 150.0, 0.0]
    });
    let path = Path::from_polyline(arc)?;

    let specs = [
        AssetSpec::new("lamp").with_quantity(8).with_spacing(40.0),
        AssetSpec::new("bench")
            .with_quantity(6)
            .with_spacing_range(20.0, 40.0)
            .with_scatter(15.0),
        AssetSpec::new("shrub")
            .with_quantity_range(6, 10)
            .with_spacing(5.0)
            .with_scale_range([0.7, 0.7, 0.7], [1.3, 1.3, 1.3])
            .with_scatter(30.0),
    ];

    let mut placer = Placer::try_new(PlacementConfig::default())?;
    let mut rng = StdRng::seed_from_u64(7);
    let mut sink = VecSink::new();
    let outcome = placer.generate_with_events(
        &specs,
        &path,
        SequenceMode::Interleaved,
        &mut HostContext::new(&content, &mut scene),
        &mut rng,
        &mut sink,
    )?;

    let retried = sink
        .as_slice()
        .iter()
        .filter(|e| matches!(e, PlacementEvent::InstanceCommitted { trials, .. } if *trials > 1))
        .count();
    let summary = outcome.summary();
    println!(
        "{:?}: placed {} / {}, skipped {}, {} needed retries",
        outcome.generation(),
        summary.placed,
        summary.requested,
        summary.skipped,
        retried
    );

    let mut rc = RenderConfig::new((1000, 600), DVec2::new(1000.0, 600.0))
        .with_domain_center(DVec2::new(0.0, 50.0))
        .with_background([26, 26, 26])
        .with_path_color([120, 120, 120]);
    rc.set_asset_style(
        "lamp",
        AssetStyle::Circle {
            color: [255, 214, 90],
            radius: 5,
        },
    )
    .set_asset_style("bench", AssetStyle::Bounds { color: [160, 110, 60] })
    .set_asset_style("shrub", AssetStyle::Bounds { color: [60, 170, 80] });
    render_scene_to_png(&scene, Some(&path), &rc, "lamps-interleaved-arc.png")?;
    Ok(())
}
