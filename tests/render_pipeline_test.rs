use atlas::prelude::*;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Rendering through real tile sources and GeoJSON input
#[cfg(test)]
mod render_pipeline_tests {
    use super::*;

    fn map_at(zoom: f64, size: PixelPoint) -> Map {
        MapBuilder::minimal_map(GeoPoint::new(0.0, 0.0), zoom, size)
            .build()
            .unwrap()
    }

    #[test]
    fn test_threaded_tiles_arrive_on_later_frames() {
        let source = ThreadedTileSource::new(|request: &TileRequest| {
            std::thread::sleep(Duration::from_millis(5));
            Ok(ImageHandle::new((request.coord.x * 2 + request.coord.y) as u64, 256, 256))
        });

        let mut map = map_at(1.0, PixelPoint::new(512.0, 512.0));
        let tiles = TileSurface::new(
            "osm",
            TileOptions::new("https://tile.test/{z}/{x}/{y}.png"),
            Arc::new(source),
        )
        .unwrap();
        map.add_surface(Box::new(tiles));

        let mut ctx = RenderContext::new(512, 512);
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut images = map.render(&mut ctx).unwrap().images;
        while images < 4 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
            images = map.render(&mut ctx).unwrap().images;
        }

        assert_eq!(images, 4);
        let tiles = map.surfaces().get_as::<TileSurface>("osm").unwrap();
        assert_eq!(tiles.loaded_count(), 4);
        assert_eq!(tiles.pending_count(), 0);
    }

    #[test]
    fn test_retina_requests_high_density_tiles() {
        let urls = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&urls);
        let source = move |request: TileRequest, completions: crossbeam_channel::Sender<TileLoadEvent>| {
            seen.lock().unwrap().push(request.url.clone());
            let _ = completions.send(TileLoadEvent::failed(request.coord, "offline"));
        };

        let mut map = MapBuilder::retina_map(GeoPoint::new(0.0, 0.0), 0.0, PixelPoint::new(256.0, 256.0))
            .with_tile_source(TileOptions::new("https://tile.test/{z}/{x}/{y}{r}.png"), Arc::new(source))
            .build()
            .unwrap();

        let mut ctx = RenderContext::new(256, 256);
        let stats = map.render(&mut ctx).unwrap();
        assert_eq!(stats.images, 0);
        assert_eq!(*urls.lock().unwrap(), vec!["https://tile.test/0/0/0@2x.png".to_string()]);

        // Failed tiles are not requested again
        map.render(&mut ctx).unwrap();
        assert_eq!(urls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_geojson_styles_and_clipping() {
        let mut map = map_at(3.0, PixelPoint::new(400.0, 300.0));
        let style = FeatureStyle::default()
            .with_color("#ff7800")
            .with_weight(5.0);

        let mut roads = VectorSurface::new("roads");
        let ids = roads
            .load_geojson(
                r#"{
                    "type": "Feature",
                    "geometry": {
                        "type": "MultiLineString",
                        "coordinates": [
                            [[-170, 0], [170, 0]],
                            [[-5, -5], [5, 5]]
                        ]
                    },
                    "properties": {"kind": "route"}
                }"#,
                &style,
            )
            .unwrap();
        assert_eq!(ids.len(), 2);
        map.add_surface(Box::new(roads));

        let mut ctx = RenderContext::new(400, 300);
        let stats = map.render(&mut ctx).unwrap();
        assert_eq!(stats.features_drawn, 2);

        // The view grown by half the 5px stroke, in whole pixels
        let bounds = Bounds::from_coords(-3.0, -3.0, 403.0, 303.0);
        for path in ctx.paths() {
            assert_eq!(path.stroke, Some(("#ff7800".to_string(), 5.0)));
            assert!(path.fill.is_none());
            assert!(path.points().all(|p| bounds.contains(p)));
        }
        let xs: Vec<f64> = ctx.paths()[0].points().map(|p| p.x).collect();
        assert_eq!(xs, vec![-3.0, 403.0]);
    }

    #[test]
    fn test_default_style_lines_leaving_right_and_bottom() {
        let mut map = map_at(3.0, PixelPoint::new(400.0, 300.0));
        let mut lines = VectorSurface::new("lines");
        lines.add_feature(Feature::polyline(
            1,
            vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 170.0)],
        ));
        lines.add_feature(Feature::polyline(
            2,
            vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(-80.0, 0.0)],
        ));
        map.add_surface(Box::new(lines));

        let mut ctx = RenderContext::new(400, 300);
        let stats = map.render(&mut ctx).unwrap();
        assert_eq!(stats.features_drawn, 2);

        let east: Vec<PixelPoint> = ctx.paths()[0].points().copied().collect();
        let south: Vec<PixelPoint> = ctx.paths()[1].points().copied().collect();
        assert_eq!(east, vec![PixelPoint::new(200.0, 150.0), PixelPoint::new(402.0, 150.0)]);
        assert_eq!(south, vec![PixelPoint::new(200.0, 150.0), PixelPoint::new(200.0, 302.0)]);
    }

    #[test]
    fn test_polygon_fill_and_hit() {
        let mut map = map_at(4.0, PixelPoint::new(400.0, 300.0));
        let square = Feature::polygon(
            1,
            vec![
                GeoPoint::new(-5.0, -5.0),
                GeoPoint::new(-5.0, 5.0),
                GeoPoint::new(5.0, 5.0),
                GeoPoint::new(5.0, -5.0),
            ],
        )
        .with_style(FeatureStyle::default().with_fill("red", 0.5));
        map.add_surface(Box::new(VectorSurface::new("areas").with_features([square])));

        let mut ctx = RenderContext::new(400, 300);
        map.render(&mut ctx).unwrap();

        let path = &ctx.paths()[0];
        assert!(path.closed);
        assert_eq!(path.fill.as_deref(), Some("red"));
        assert_eq!(map.targets_at(PixelPoint::new(200.0, 150.0)), vec![FeatureId(1)]);
        assert!(map.targets_at(PixelPoint::new(5.0, 5.0)).is_empty());
    }
}
