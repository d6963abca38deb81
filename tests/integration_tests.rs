use atlas::prelude::*;

/// Integration tests for whole-map scenarios: build, move, render, hit test.
/// Everything runs headless against the recording RenderContext.
#[cfg(test)]
mod integration_tests {
    use super::*;

    fn pins() -> VectorSurface {
        VectorSurface::new("pins").with_features([
            Feature::point(1, GeoPoint::new(0.0, 0.0)),
            Feature::point(2, GeoPoint::new(0.0, 0.0)).with_property("name", "top"),
            Feature::point(3, GeoPoint::new(0.0, 0.0)).with_interactive(false),
        ])
    }

    fn world_map() -> Map {
        let source: Arc<dyn TileImageSource> = Arc::new(ImmediateTileSource::new(256));
        MapBuilder::web_map(GeoPoint::new(0.0, 0.0), 1.0, PixelPoint::new(512.0, 512.0))
            .with_tile_source(TileOptions::new("https://{s}.tile.test/{z}/{x}/{y}.png"), source)
            .with_surface(Box::new(pins()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_render_tiles_below_features() {
        let mut map = world_map();
        let mut ctx = RenderContext::new(512, 512);
        let stats = map.render(&mut ctx).unwrap();

        assert_eq!(stats.images, 4);
        assert_eq!(stats.features_drawn, 3);
        assert_eq!(ctx.images().len(), 4);
        assert_eq!(ctx.paths().len(), 3);

        // Tiles are drawn before any vector path
        let first_path = ctx
            .commands()
            .iter()
            .position(|c| matches!(c, atlas::rendering::DrawCommand::BeginPath))
            .unwrap();
        let last_image = ctx
            .commands()
            .iter()
            .rposition(|c| matches!(c, atlas::rendering::DrawCommand::Image { .. }))
            .unwrap();
        assert!(last_image < first_path);
    }

    #[test]
    fn test_hit_testing_is_topmost_first() {
        let mut map = world_map();
        let mut ctx = RenderContext::new(512, 512);
        map.render(&mut ctx).unwrap();

        let center = map.size() / 2.0;
        assert_eq!(map.targets_at(center), vec![FeatureId(2), FeatureId(1)]);
        assert!(map.targets_at(PixelPoint::new(10.0, 10.0)).is_empty());

        let mut seen = Vec::new();
        let stopped = map.dispatch(center, |id| {
            seen.push(id);
            Propagation::Stop
        });
        assert!(stopped);
        assert_eq!(seen, vec![FeatureId(2)]);

        let pins = map.surfaces().get_as::<VectorSurface>("pins").unwrap();
        assert_eq!(
            pins.feature(seen[0]).and_then(|f| f.property("name")),
            Some(&serde_json::json!("top"))
        );
    }

    #[test]
    fn test_hit_index_follows_the_view() {
        let mut map = world_map();
        let mut ctx = RenderContext::new(512, 512);

        map.pan_by(PixelPoint::new(100.0, 0.0), PanOptions::instant()).unwrap();
        map.render(&mut ctx).unwrap();

        // The pins moved left by the pan
        let moved = PixelPoint::new(156.0, 256.0);
        assert_eq!(map.targets_at(moved).len(), 2);
        assert!(map.targets_at(map.size() / 2.0).is_empty());
    }

    #[test]
    fn test_hidden_surface_is_skipped() {
        let mut map = world_map();
        map.surfaces_mut()
            .with_surface_mut("pins", |s| s.set_visible(false));

        let mut ctx = RenderContext::new(512, 512);
        let stats = map.render(&mut ctx).unwrap();
        assert_eq!(stats.features_drawn, 0);
        assert!(ctx.paths().is_empty());
        assert!(map.targets_at(map.size() / 2.0).is_empty());
    }

    #[test]
    fn test_fit_surfaces_area() {
        let mut map = Map::new(MapOptions::default(), PixelPoint::new(400.0, 300.0)).unwrap();
        let mut shapes = VectorSurface::new("shapes");
        shapes
            .load_geojson(
                r#"{
                    "type": "FeatureCollection",
                    "features": [
                        {"type": "Feature", "geometry": {"type": "Point", "coordinates": [2.35, 48.85]}, "properties": {}},
                        {"type": "Feature", "geometry": {"type": "Point", "coordinates": [13.40, 52.52]}, "properties": {}}
                    ]
                }"#,
                &FeatureStyle::default(),
            )
            .unwrap();
        map.add_surface(Box::new(shapes));

        let area = map.surfaces().area().unwrap();
        map.fit_bounds(&area, FitOptions::padding(20.0), PanOptions::instant())
            .unwrap();
        assert!(map.bounds().contains_area(&area));
        assert!(map.zoom() > 3.0);

        let mut ctx = RenderContext::new(400, 300);
        let stats = map.render(&mut ctx).unwrap();
        assert_eq!(stats.features_drawn, 2);
        assert_eq!(stats.features_culled, 0);
    }

    #[test]
    fn test_options_from_json() {
        let map = MapBuilder::from_json_str(
            r#"{
                "center": {"lat": 51.5, "lng": -0.12},
                "zoom": 7,
                "max_zoom": 12,
                "animation": {"enabled": false}
            }"#,
        )
        .unwrap()
        .with_size(PixelPoint::new(640.0, 480.0))
        .build()
        .unwrap();

        assert_eq!(map.zoom(), 7.0);
        assert_eq!(map.center(), GeoPoint::new(51.5, -0.12));
        assert!(!map.options().animation.enabled);
    }

    #[test]
    fn test_container_and_geo_round_trip() {
        let map = Map::new(
            MapOptions {
                center: GeoPoint::new(37.7749, -122.4194),
                zoom: 12.0,
                ..MapOptions::default()
            },
            PixelPoint::new(1024.0, 768.0),
        )
        .unwrap();

        let viewport = map.viewport();
        let corner = PixelPoint::new(100.0, 50.0);
        let geo = viewport.container_point_to_geo(&corner);
        let back = viewport.geo_to_container_point(&geo);
        assert!(back.distance_to(&corner) < 1e-6);

        let middle = viewport.geo_to_container_point(&map.center());
        assert!(middle.distance_to(&(map.size() / 2.0)) <= 1.0);
    }
}
