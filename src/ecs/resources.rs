use crate::domain::errors::ResourceError;
use crate::domain::logging::LogComponent;
use crate::log_warn;
use glam::Vec3;
use std::collections::BTreeMap;

/// Packed `0xRRGGBB` colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xffffff);

    pub fn to_rgb(self) -> [f32; 3] {
        [
            ((self.0 >> 16) & 0xff) as f32 / 255.0,
            ((self.0 >> 8) & 0xff) as f32 / 255.0,
            (self.0 & 0xff) as f32 / 255.0,
        ]
    }

    pub fn to_rgba(self, alpha: f32) -> [f32; 4] {
        let [r, g, b] = self.to_rgb();
        [r, g, b, alpha]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeometryId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterialId(pub u32);

/// CPU-side description of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryDesc {
    Box { width: f32, height: f32, depth: f32 },
    /// Horizontal plane in XZ
    Plane { width: f32, depth: f32 },
    Grid { size: f32, divisions: u32 },
    Polyline { points: Vec<Vec3> },
    Points { positions: Vec<Vec3> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterialDesc {
    Standard { color: Color, emissive: Color, emissive_intensity: f32, metalness: f32, roughness: f32 },
    Line { color: Color },
    Points { color: Color, size: f32, opacity: f32 },
    Grid { center: Color, lines: Color },
}

impl MaterialDesc {
    pub fn standard(color: Color, metalness: f32, roughness: f32) -> Self {
        MaterialDesc::Standard { color, emissive: Color(0), emissive_intensity: 0.0, metalness, roughness }
    }

    pub fn glowing(color: Color, emissive_intensity: f32, metalness: f32, roughness: f32) -> Self {
        MaterialDesc::Standard { color, emissive: color, emissive_intensity, metalness, roughness }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStats {
    pub geometries_created: u32,
    pub geometries_disposed: u32,
    pub materials_created: u32,
    pub materials_disposed: u32,
    pub double_disposals: u32,
}

/// Owner of every geometry and material in the scene.
///
/// Ids are never reused, so a second dispose of the same id is detected and
/// counted instead of touching a newer resource.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    geometries: BTreeMap<GeometryId, GeometryDesc>,
    materials: BTreeMap<MaterialId, MaterialDesc>,
    next_geometry: u32,
    next_material: u32,
    stats: ResourceStats,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_geometry(&mut self, desc: GeometryDesc) -> GeometryId {
        let id = GeometryId(self.next_geometry);
        self.next_geometry += 1;
        self.geometries.insert(id, desc);
        self.stats.geometries_created += 1;
        id
    }

    pub fn create_material(&mut self, desc: MaterialDesc) -> MaterialId {
        let id = MaterialId(self.next_material);
        self.next_material += 1;
        self.materials.insert(id, desc);
        self.stats.materials_created += 1;
        id
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&GeometryDesc> {
        self.geometries.get(&id)
    }

    pub fn material(&self, id: MaterialId) -> Option<&MaterialDesc> {
        self.materials.get(&id)
    }

    pub fn geometry_mut(&mut self, id: GeometryId) -> Result<&mut GeometryDesc, ResourceError> {
        self.geometries.get_mut(&id).ok_or(ResourceError::UnknownGeometry(id.0))
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Result<&mut MaterialDesc, ResourceError> {
        self.materials.get_mut(&id).ok_or(ResourceError::UnknownMaterial(id.0))
    }

    pub fn dispose_geometry(&mut self, id: GeometryId) -> Result<(), ResourceError> {
        if self.geometries.remove(&id).is_some() {
            self.stats.geometries_disposed += 1;
            Ok(())
        } else if id.0 < self.next_geometry {
            self.stats.double_disposals += 1;
            Err(ResourceError::AlreadyDisposed { kind: "geometry", id: id.0 })
        } else {
            Err(ResourceError::UnknownGeometry(id.0))
        }
    }

    pub fn dispose_material(&mut self, id: MaterialId) -> Result<(), ResourceError> {
        if self.materials.remove(&id).is_some() {
            self.stats.materials_disposed += 1;
            Ok(())
        } else if id.0 < self.next_material {
            self.stats.double_disposals += 1;
            Err(ResourceError::AlreadyDisposed { kind: "material", id: id.0 })
        } else {
            Err(ResourceError::UnknownMaterial(id.0))
        }
    }

    /// Dispose both halves of a mesh, logging misuse instead of failing.
    pub fn release(&mut self, geometry: GeometryId, material: MaterialId) {
        if let Err(e) = self.dispose_geometry(geometry) {
            log_warn!(LogComponent::Scene("Resources"), "{}", e);
        }
        if let Err(e) = self.dispose_material(material) {
            log_warn!(LogComponent::Scene("Resources"), "{}", e);
        }
    }

    pub fn live_geometries(&self) -> usize {
        self.geometries.len()
    }

    pub fn live_materials(&self) -> usize {
        self.materials.len()
    }

    pub fn stats(&self) -> ResourceStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_unpacks_channels() {
        assert_eq!(Color(0xff0000).to_rgb(), [1.0, 0.0, 0.0]);
        assert_eq!(Color(0x00ff00).to_rgba(0.5), [0.0, 1.0, 0.0, 0.5]);
    }

    #[test]
    fn second_dispose_is_reported() {
        let mut registry = ResourceRegistry::new();
        let geometry = registry.create_geometry(GeometryDesc::Box { width: 1.0, height: 1.0, depth: 1.0 });
        assert!(registry.dispose_geometry(geometry).is_ok());
        assert_eq!(
            registry.dispose_geometry(geometry),
            Err(ResourceError::AlreadyDisposed { kind: "geometry", id: 0 })
        );
        assert_eq!(registry.dispose_material(MaterialId(7)), Err(ResourceError::UnknownMaterial(7)));
        let stats = registry.stats();
        assert_eq!(stats.geometries_disposed, 1);
        assert_eq!(stats.double_disposals, 1);
    }
}
