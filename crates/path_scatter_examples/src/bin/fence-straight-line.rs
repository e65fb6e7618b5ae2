use glam::DVec2;
use path_scatter::prelude::*;
use path_scatter_examples::{init_tracing, render_scene_to_png, AssetStyle, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let content = InMemoryContent::new().with_asset("fence_post", [5.0, 5.0, 40.0]);
    let mut scene = InMemoryScene::from_content(&content);
    let path = Path::straight([-450.0, 0.0, 0.0], [450.0, 0.0, 0.0])?;

    let specs = [AssetSpec::new("fence_post")
        .with_quantity(40)
        .with_spacing(10.0)];

    let mut placer = Placer::try_new(PlacementConfig::default())?;
    let mut rng = StdRng::seed_from_u64(42);
    let outcome = placer.generate(
        &specs,
        &path,
        SequenceMode::Sequential,
        &mut HostContext::new(&content, &mut scene),
        &mut rng,
    )?;

    let summary = outcome.summary();
    println!(
        "placed {} / {} posts, final distance {:.1} ({:?})",
        summary.placed, summary.requested, summary.final_distance, summary.state
    );

    let mut rc =
        RenderConfig::new((1000, 200), DVec2::new(1000.0, 200.0)).with_background([236, 238, 242]);
    rc.set_asset_style(
        "fence_post",
        AssetStyle::Circle {
            color: [139, 69, 19],
            radius: 4,
        },
    );
    render_scene_to_png(&scene, Some(&path), &rc, "fence-straight-line.png")?;
    Ok(())
}
