use crate::core::area::Area;
use crate::layers::base::Surface;
use crate::rendering::{pipeline::RenderFrame, pipeline::RenderPipeline, surface::DrawingSurface};
use crate::Result;
use fxhash::FxHashMap;

/// The map's surface stack, kept in z-order
#[derive(Default)]
pub struct SurfaceManager {
    /// All surfaces indexed by ID
    surfaces: FxHashMap<String, Box<dyn Surface>>,
    /// Surface IDs sorted by z-index; equal z-indices keep insertion order
    render_order: Vec<String>,
}

impl SurfaceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a surface, replacing any surface that has the same id
    pub fn add(&mut self, surface: Box<dyn Surface>) {
        let surface_id = surface.id().to_string();
        let z_index = surface.z_index();

        if self.surfaces.insert(surface_id.clone(), surface).is_some() {
            self.render_order.retain(|id| *id != surface_id);
        }

        let insert_pos = self
            .render_order
            .iter()
            .position(|id| {
                self.surfaces
                    .get(id)
                    .map(|s| s.z_index() > z_index)
                    .unwrap_or(false)
            })
            .unwrap_or(self.render_order.len());

        log::debug!("Added {} surface '{}' at z {}", self.surfaces[&surface_id].kind(), surface_id, z_index);
        self.render_order.insert(insert_pos, surface_id);
    }

    pub fn remove(&mut self, surface_id: &str) -> Option<Box<dyn Surface>> {
        self.render_order.retain(|id| id != surface_id);
        self.surfaces.remove(surface_id)
    }

    pub fn get(&self, surface_id: &str) -> Option<&dyn Surface> {
        self.surfaces.get(surface_id).map(|s| s.as_ref())
    }

    /// Typed access, e.g. `get_as::<VectorSurface>("roads")`
    pub fn get_as<T: 'static>(&self, surface_id: &str) -> Option<&T> {
        self.get(surface_id)?.as_any().downcast_ref::<T>()
    }

    pub fn get_as_mut<T: 'static>(&mut self, surface_id: &str) -> Option<&mut T> {
        self.surfaces
            .get_mut(surface_id)?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// Applies a function to a specific surface mutably
    pub fn with_surface_mut<F, R>(&mut self, surface_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn Surface) -> R,
    {
        self.surfaces.get_mut(surface_id).map(|s| f(s.as_mut()))
    }

    /// Surface IDs in render order
    pub fn ids(&self) -> &[String] {
        &self.render_order
    }

    /// Gets all surfaces in render order
    pub fn surfaces(&self) -> Vec<&dyn Surface> {
        self.render_order
            .iter()
            .filter_map(|id| self.surfaces.get(id).map(|s| s.as_ref()))
            .collect()
    }

    /// Union of the areas of every visible surface
    pub fn area(&self) -> Option<Area> {
        let mut area = Area::empty();
        for surface in self.surfaces().into_iter().filter(|s| s.is_visible()) {
            if let Some(surface_area) = surface.area() {
                area.extend_area(&surface_area);
            }
        }
        area.is_valid().then_some(area)
    }

    /// Renders every visible surface, bottom to top
    pub fn render(
        &mut self,
        frame: &RenderFrame<'_>,
        pipeline: &mut RenderPipeline,
        target: &mut dyn DrawingSurface,
    ) -> Result<()> {
        for surface_id in &self.render_order {
            if let Some(surface) = self.surfaces.get_mut(surface_id) {
                if surface.is_visible() && surface.opacity() > 0.0 {
                    surface.render(frame, pipeline, target)?;
                }
            }
        }
        Ok(())
    }

    /// Re-sorts the stack after z-indices changed
    pub fn update_render_order(&mut self) {
        let surfaces = &self.surfaces;
        self.render_order.sort_by_key(|id| surfaces.get(id).map(|s| s.z_index()).unwrap_or(0));
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

impl std::fmt::Debug for SurfaceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceManager")
            .field("render_order", &self.render_order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::GeoPoint;
    use crate::data::feature::Feature;
    use crate::layers::vector::VectorSurface;

    fn vector(id: &str, z_index: i32) -> Box<dyn Surface> {
        let mut surface = VectorSurface::new(id);
        surface.set_z_index(z_index);
        Box::new(surface)
    }

    #[test]
    fn test_render_order_follows_z_index() {
        let mut manager = SurfaceManager::new();
        manager.add(vector("top", 10));
        manager.add(vector("bottom", -1));
        manager.add(vector("middle", 0));
        manager.add(vector("middle-2", 0));

        assert_eq!(manager.ids(), &["bottom", "middle", "middle-2", "top"]);

        manager.with_surface_mut("bottom", |s| s.set_z_index(20));
        manager.update_render_order();
        assert_eq!(manager.ids().last().map(String::as_str), Some("bottom"));
    }

    #[test]
    fn test_replace_and_remove() {
        let mut manager = SurfaceManager::new();
        manager.add(vector("a", 0));
        manager.add(vector("a", 5));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.get("a").map(|s| s.z_index()), Some(5));

        assert!(manager.remove("a").is_some());
        assert!(manager.remove("a").is_none());
        assert!(manager.is_empty());
        assert!(manager.ids().is_empty());
    }

    #[test]
    fn test_typed_access_and_area() {
        let mut manager = SurfaceManager::new();
        manager.add(vector("pins", 0));
        assert!(manager.area().is_none());

        let pins = manager.get_as_mut::<VectorSurface>("pins").unwrap();
        pins.add_feature(Feature::point(1, GeoPoint::new(10.0, 20.0)));
        pins.add_feature(Feature::point(2, GeoPoint::new(-5.0, 30.0)));

        let area = manager.area().unwrap();
        assert_eq!(area.north(), 10.0);
        assert_eq!(area.west(), 20.0);
    }
}
