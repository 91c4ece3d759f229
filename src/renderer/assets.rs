//! Point cloud assets
//!
//! The renderer needs three external objects: the point mesh (quad geometry
//! plus its draw metadata), the material shader and the culling kernel.
//! Built-in versions ship with the crate; callers may substitute their own.

use crate::gpu::buffer_layouts::{GeometryMeta, QuadVertex};
use crate::renderer::error::{missing_asset, RendererResult};

/// Geometry drawn once per visible point
#[derive(Debug, Clone, PartialEq)]
pub struct PointMesh {
    pub vertices: Vec<QuadVertex>,
    pub indices: Vec<u32>,
    pub meta: GeometryMeta,
}

impl PointMesh {
    /// Unit quad with corners at (+-1, +-1), two triangles
    pub fn quad() -> Self {
        let vertices = vec![
            QuadVertex { corner: [-1.0, -1.0] },
            QuadVertex { corner: [1.0, -1.0] },
            QuadVertex { corner: [1.0, 1.0] },
            QuadVertex { corner: [-1.0, 1.0] },
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];
        let meta = GeometryMeta {
            index_count: indices.len() as u32,
            start_index: 0,
            base_vertex: 0,
        };

        Self {
            vertices,
            indices,
            meta,
        }
    }
}

/// WGSL source of the point material
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSource {
    pub label: String,
    pub wgsl: String,
}

impl MaterialSource {
    pub fn builtin() -> Self {
        Self {
            label: "Point Material".to_string(),
            wgsl: include_str!("shaders/point_render.wgsl").to_string(),
        }
    }
}

/// WGSL source of the culling kernel
#[derive(Debug, Clone, PartialEq)]
pub struct KernelSource {
    pub label: String,
    pub wgsl: String,
}

impl KernelSource {
    pub fn builtin() -> Self {
        Self {
            label: "Point Culling Kernel".to_string(),
            wgsl: include_str!("shaders/point_cull.wgsl").to_string(),
        }
    }
}

/// Asset references; every one must be set before initialization
#[derive(Debug, Clone, Default)]
pub struct PointCloudAssets {
    pub mesh: Option<PointMesh>,
    pub material: Option<MaterialSource>,
    pub kernel: Option<KernelSource>,
}

/// Borrowed view of a fully populated asset set
pub struct ResolvedAssets<'a> {
    pub mesh: &'a PointMesh,
    pub material: &'a MaterialSource,
    pub kernel: &'a KernelSource,
}

impl PointCloudAssets {
    /// All built-in assets
    pub fn builtin() -> Self {
        Self {
            mesh: Some(PointMesh::quad()),
            material: Some(MaterialSource::builtin()),
            kernel: Some(KernelSource::builtin()),
        }
    }

    /// Fail with InvalidConfiguration on the first unset reference
    pub fn resolve(&self) -> RendererResult<ResolvedAssets<'_>> {
        let mesh = self.mesh.as_ref().ok_or_else(|| missing_asset("mesh"))?;
        let material = self
            .material
            .as_ref()
            .ok_or_else(|| missing_asset("material"))?;
        let kernel = self.kernel.as_ref().ok_or_else(|| missing_asset("kernel"))?;

        if mesh.indices.is_empty() || mesh.meta.index_count == 0 {
            return Err(crate::error::EngineError::invalid_config(
                "mesh",
                "point mesh has no indices",
            ));
        }

        Ok(ResolvedAssets {
            mesh,
            material,
            kernel,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{culling, material};
    use crate::error::EngineError;

    #[test]
    fn test_quad_meta() {
        let mesh = PointMesh::quad();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.meta.index_count, 6);
        assert_eq!(mesh.meta.start_index, 0);
        assert_eq!(mesh.meta.base_vertex, 0);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_default_assets_are_unset() {
        let assets = PointCloudAssets::default();
        match assets.resolve() {
            Err(EngineError::InvalidConfiguration { field, .. }) => assert_eq!(field, "mesh"),
            Err(other) => panic!("unexpected {:?}", other),
            Ok(_) => panic!("unset assets resolved"),
        }

        let without_kernel = PointCloudAssets {
            kernel: None,
            ..PointCloudAssets::builtin()
        };
        match without_kernel.resolve() {
            Err(EngineError::InvalidConfiguration { field, .. }) => assert_eq!(field, "kernel"),
            Err(other) => panic!("unexpected {:?}", other),
            Ok(_) => panic!("missing kernel resolved"),
        }

        assert!(PointCloudAssets::builtin().resolve().is_ok());
    }

    #[test]
    fn test_builtin_shaders_match_constants() {
        let kernel = KernelSource::builtin();
        assert!(kernel
            .wgsl
            .contains(&format!("@workgroup_size({})", culling::WORKGROUP_SIZE)));
        assert!(kernel
            .wgsl
            .contains(&format!("fn {}(", culling::CULL_ENTRY_POINT)));
        assert!(kernel
            .wgsl
            .contains(&format!(
                "SIZE_REFERENCE_DISTANCE: f32 = {:?};",
                culling::SIZE_REFERENCE_DISTANCE
            )));

        let material_source = MaterialSource::builtin();
        assert!(material_source
            .wgsl
            .contains(&format!("fn {}(", material::VERTEX_ENTRY_POINT)));
        assert!(material_source
            .wgsl
            .contains(&format!("fn {}(", material::FRAGMENT_ENTRY_POINT)));
    }
}
