use atlas::prelude::*;

/// Example of using atlas in headless mode without any UI
fn main() -> atlas::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("🗺️ Atlas Headless Example");
    println!("=========================");

    // The host drives time; this clone stays with us, the other goes to the map
    let driver = ManualScheduler::new();
    let center = GeoPoint::new(37.7749, -122.4194); // San Francisco
    let size = PixelPoint::new(1024.0, 768.0);

    let source: Arc<dyn TileImageSource> = Arc::new(ImmediateTileSource::new(256));
    let mut map = MapBuilder::web_map(center, 12.0, size)
        .with_scheduler(Box::new(driver.clone()))
        .with_tile_source(
            TileOptions::new("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"),
            source,
        )
        .build()?;

    println!("✅ Map created:");
    println!("   Center: {}", map.center());
    println!("   Zoom: {}", map.zoom());
    println!("   Size: {}", map.size());

    // Vector overlay from GeoJSON
    let mut overlay = VectorSurface::new("landmarks");
    overlay.load_geojson(
        r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-122.4783, 37.8199]}, "properties": {"name": "Golden Gate Bridge"}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-122.4230, 37.8267]}, "properties": {"name": "Alcatraz"}},
                {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[-122.4783, 37.8199], [-122.4230, 37.8267]]}, "properties": {"name": "Ferry"}}
            ]
        }"#,
        &FeatureStyle::default().with_color("#ff7800"),
    )?;
    map.add_surface(Box::new(overlay));
    println!("✅ Added {} surfaces: {:?}", map.surfaces().len(), map.surfaces().ids());

    // Fit the overlay and render a frame
    if let Some(area) = map.surfaces().area() {
        map.fit_bounds(&area, FitOptions::padding(40.0), PanOptions::instant())?;
    }
    let mut ctx = RenderContext::new(size.x as u32, size.y as u32);
    let stats = map.render(&mut ctx)?;
    println!("\n🎨 Rendered frame at zoom {:.2}: {:?}", map.zoom(), stats);

    // Hit test the middle of the screen
    let hits = map.targets_at(size / 2.0);
    println!("   Features under the center: {:?}", hits);

    // Animated pans, one frame every 16ms
    println!("\n🚀 Animated pan:");
    map.pan_by(PixelPoint::new(200.0, -100.0), PanOptions::default())?;
    let frames = run(&mut map, &driver);
    println!("   Settled after {} frames at {}", frames, map.center());

    // A flight across the world
    println!("\n✈️ Flying to Tokyo:");
    map.fly_to(GeoPoint::new(35.6762, 139.6503), Some(10.0), FlyOptions::default())?;
    let frames = run(&mut map, &driver);
    println!("   Landed after {} frames at zoom {}", frames, map.zoom());

    // Event processing
    println!("\n⚡ Processing events:");
    let events = map.drain_events();
    println!("   Drained {} events", events.len());
    if let Some(last) = events.last() {
        println!("   Last event: {:?}", last);
    }

    // Final state
    println!("\n📊 Final map state:");
    println!("   Center: {}", map.center());
    println!("   Zoom: {:.2}", map.zoom());
    println!("   Visible area: {}", map.bounds().to_bbox_string());

    Ok(())
}

fn run(map: &mut Map, driver: &ManualScheduler) -> usize {
    let mut frames = 0;
    while driver.has_pending() {
        driver.fire();
        driver.advance_ms(16);
        map.on_frame();
        frames += 1;
    }
    frames
}
