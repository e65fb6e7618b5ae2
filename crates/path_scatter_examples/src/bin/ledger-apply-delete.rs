use std::collections::HashMap;

use glam::DVec2;
use path_scatter::prelude::*;
use path_scatter_examples::{init_tracing, render_scene_to_png, AssetStyle, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let content = InMemoryContent::new()
        .with_asset("pillar", [15.0, 15.0, 50.0])
        .with_asset("statue", [20.0, 20.0, 35.0]);
    let mut scene = InMemoryScene::from_content(&content);
    let path = Path::from_polyline([
        [-450.0, -150.0, 0.0],
        [-150.0, 150.0, 0.0],
        [150.0, -150.0, 0.0],
        [450.0, 150.0, 0.0],
    ])?;
    let paths = HashMap::from([("colonnade".to_string(), path.clone())]);

    let specs = vec![
        AssetSpec::new("pillar").with_quantity(6).with_spacing(30.0),
        AssetSpec::new("statue").with_quantity(4).with_spacing(30.0),
    ];

    let mut placer = Placer::try_new(PlacementConfig::default())?;
    let mut rng = StdRng::seed_from_u64(2024);
    let Some(id) = placer
        .generate_for_selection(
            &paths,
            "colonnade",
            &specs,
            SequenceMode::Sequential,
            &mut HostContext::new(&content, &mut scene),
            &mut rng,
        )?
        .generation()
    else {
        anyhow::bail!("nothing was placed");
    };

    let mut rc =
        RenderConfig::new((1000, 400), DVec2::new(1000.0, 400.0)).with_background([235, 235, 240]);
    rc.set_asset_style("pillar", AssetStyle::Bounds { color: [70, 70, 160] })
        .set_asset_style("statue", AssetStyle::Bounds { color: [180, 60, 60] });
    render_scene_to_png(&scene, Some(&path), &rc, "ledger-apply-delete-generated.png")?;

    // Widen the statue spacing and rotate them; pillars keep their spots.
    let revised = vec![
        specs[0].clone(),
        specs[1]
            .clone()
            .with_spacing(80.0)
            .with_rotation([0.0, 90.0, 0.0]),
    ];
    // Someone removed the first pillar by hand; apply and delete report it.
    if let Some(first) = placer.ledger().get(id).and_then(|g| g.records.first()) {
        scene.destroy(first.handle)?;
    }
    let mut warnings = FnSink::new(|event| {
        if let PlacementEvent::Warning { context, message } = event {
            println!("warning: {context}: {message}");
        }
    });
    let applied = placer.apply_with_events(
        id,
        &revised,
        &path,
        &mut HostContext::new(&content, &mut scene),
        &mut rng,
        &mut warnings,
    )?;
    println!(
        "{id}: repositioned {}, missing {}, spacing changed for {:?}",
        applied.repositioned, applied.missing, applied.spacing_changed
    );
    render_scene_to_png(&scene, Some(&path), &rc, "ledger-apply-delete-applied.png")?;

    let deleted = placer.delete_with_events(id, &mut scene, &mut warnings)?;
    println!(
        "{id}: destroyed {} of {} objects, {} left in scene",
        deleted.destroyed,
        deleted.requested,
        scene.len()
    );
    Ok(())
}
