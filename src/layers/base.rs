use crate::core::area::Area;
use crate::rendering::{pipeline::RenderFrame, pipeline::RenderPipeline, surface::DrawingSurface};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    Tile,
    Vector,
}

impl std::fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceKind::Tile => write!(f, "tile"),
            SurfaceKind::Vector => write!(f, "vector"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceProperties {
    pub id: String,
    pub name: String,
    pub kind: SurfaceKind,
    pub z_index: i32,
    pub opacity: f64,
    pub visible: bool,
}

impl SurfaceProperties {
    pub fn new(id: impl Into<String>, kind: SurfaceKind) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind,
            z_index: 0,
            opacity: 1.0,
            visible: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }
}

/// A drawable layer of the map: a tile grid or a set of vector features.
///
/// Only `properties`, `render` and the `Any` casts are required; the rest reads
/// and writes the shared [`SurfaceProperties`].
pub trait Surface {
    fn properties(&self) -> &SurfaceProperties;
    fn properties_mut(&mut self) -> &mut SurfaceProperties;

    fn id(&self) -> &str {
        &self.properties().id
    }

    fn name(&self) -> &str {
        &self.properties().name
    }

    fn kind(&self) -> SurfaceKind {
        self.properties().kind
    }

    fn z_index(&self) -> i32 {
        self.properties().z_index
    }

    /// Takes effect in the stack after [`SurfaceManager::update_render_order`](super::manager::SurfaceManager::update_render_order)
    fn set_z_index(&mut self, z_index: i32) {
        self.properties_mut().z_index = z_index;
    }

    fn opacity(&self) -> f64 {
        self.properties().opacity
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.properties_mut().opacity = opacity.clamp(0.0, 1.0);
    }

    fn is_visible(&self) -> bool {
        self.properties().visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.properties_mut().visible = visible;
    }

    /// Geographic extent of the content, `None` when unbounded or empty
    fn area(&self) -> Option<Area> {
        None
    }

    /// Draws the surface for one frame
    fn render(
        &mut self,
        frame: &RenderFrame<'_>,
        pipeline: &mut RenderPipeline,
        target: &mut dyn DrawingSurface,
    ) -> Result<()>;

    fn as_any(&self) -> &dyn std::any::Any;
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
