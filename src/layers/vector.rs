use crate::core::area::Area;
use crate::data::feature::{Feature, FeatureId, FeatureStyle};
use crate::data::geojson::{features_area, GeoJson};
use crate::layers::base::{Surface, SurfaceKind, SurfaceProperties};
use crate::rendering::{pipeline::RenderFrame, pipeline::RenderPipeline, surface::DrawingSurface};
use crate::Result;

/// Surface of points, polylines and polygons.
///
/// Features draw in insertion order, so later features sit on top and win hit tests.
#[derive(Debug, Clone)]
pub struct VectorSurface {
    properties: SurfaceProperties,
    features: Vec<Feature>,
    next_id: u64,
}

impl VectorSurface {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            properties: SurfaceProperties::new(id, SurfaceKind::Vector),
            features: Vec::new(),
            next_id: 1,
        }
    }

    pub fn with_features(mut self, features: impl IntoIterator<Item = Feature>) -> Self {
        for feature in features {
            self.add_feature(feature);
        }
        self
    }

    /// Adds a feature; an existing feature with the same id is replaced in place
    pub fn add_feature(&mut self, feature: Feature) -> FeatureId {
        let id = feature.id;
        self.next_id = self.next_id.max(id.0 + 1);
        match self.features.iter_mut().find(|f| f.id == id) {
            Some(existing) => *existing = feature,
            None => self.features.push(feature),
        }
        id
    }

    pub fn remove_feature(&mut self, id: FeatureId) -> Option<Feature> {
        let index = self.features.iter().position(|f| f.id == id)?;
        Some(self.features.remove(index))
    }

    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    pub fn feature_mut(&mut self, id: FeatureId) -> Option<&mut Feature> {
        self.features.iter_mut().find(|f| f.id == id)
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Id the next loaded feature will receive
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn clear(&mut self) {
        self.features.clear();
    }

    /// Appends every geometry of a GeoJSON document, painted with `style`
    pub fn load_geojson(&mut self, json: &str, style: &FeatureStyle) -> Result<Vec<FeatureId>> {
        let features = GeoJson::from_str(json)?.into_features(self.next_id, style)?;
        Ok(features.into_iter().map(|f| self.add_feature(f)).collect())
    }
}

impl Surface for VectorSurface {
    fn properties(&self) -> &SurfaceProperties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut SurfaceProperties {
        &mut self.properties
    }

    fn area(&self) -> Option<Area> {
        let area = features_area(&self.features);
        area.is_valid().then_some(area)
    }

    fn render(
        &mut self,
        frame: &RenderFrame<'_>,
        pipeline: &mut RenderPipeline,
        target: &mut dyn DrawingSurface,
    ) -> Result<()> {
        let opacity = self.opacity();
        let drawn = self
            .features
            .iter()
            .filter(|feature| !feature.geometry.is_empty())
            .filter(|feature| pipeline.draw_feature(frame, feature, opacity, target))
            .count();

        log::trace!(
            "Vector surface '{}' drew {}/{} features",
            self.id(),
            drawn,
            self.features.len()
        );
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
