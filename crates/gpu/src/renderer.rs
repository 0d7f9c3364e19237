use foundation::color::Rgb;
use foundation::math::Vec3;
use scene::components::{Material, Transform};
use scene::world::World;

use crate::camera::PerspectiveCamera;
use crate::mesh;

/// Lit triangle vertex in world space.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// One corner of a camera-facing point sprite.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointVertex {
    pub center: [f32; 3],
    pub size: f32,
    pub corner: [f32; 2],
    pub color: [f32; 4],
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointSprite {
    pub position: [f32; 3],
    /// World-space edge length.
    pub size: f32,
    pub color: [f32; 4],
}

const SPRITE_CORNERS: [[f32; 2]; 6] = [
    [-0.5, -0.5],
    [0.5, -0.5],
    [0.5, 0.5],
    [-0.5, -0.5],
    [0.5, 0.5],
    [-0.5, 0.5],
];

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub clear_color: Rgb,
    pub view_proj: [[f32; 4]; 4],
    pub triangles: Vec<MeshVertex>,
    pub points: Vec<PointSprite>,
}

impl RenderFrame {
    /// Expands sprites into two triangles each.
    pub fn point_vertices(&self) -> Vec<PointVertex> {
        let mut out = Vec::with_capacity(self.points.len() * 6);
        for sprite in &self.points {
            for corner in SPRITE_CORNERS {
                out.push(PointVertex {
                    center: sprite.position,
                    size: sprite.size,
                    corner,
                    color: sprite.color,
                });
            }
        }
        out
    }
}

/// A particle buffer to draw as sprites.
///
/// Final size is `base_size * sizes[i] * size_levels[i]`; absent buffers
/// count as 1. Every sprite shares the material's opacity.
#[derive(Debug, Copy, Clone)]
pub struct PointBatch<'a> {
    pub transform: Transform,
    pub positions: &'a [f32],
    pub base_size: f32,
    pub sizes: Option<&'a [f32]>,
    pub colors: Option<&'a [f32]>,
    pub size_levels: Option<&'a [f32]>,
    pub material: Material,
}

impl<'a> PointBatch<'a> {
    pub fn new(transform: Transform, positions: &'a [f32], material: Material) -> Self {
        Self {
            transform,
            positions,
            base_size: material.point_size,
            sizes: None,
            colors: None,
            size_levels: None,
            material,
        }
    }

    fn append(&self, out: &mut Vec<PointSprite>) {
        let at = |buf: Option<&[f32]>, i: usize| buf.and_then(|b| b.get(i)).copied().unwrap_or(1.0);
        let base = self.material.color.to_array();
        for (i, p) in self.positions.chunks_exact(3).enumerate() {
            let local = Vec3::new(p[0] as f64, p[1] as f64, p[2] as f64);
            let world = self.transform.apply(local);
            let rgb = match self.colors.and_then(|c| c.get(i * 3..i * 3 + 3)) {
                Some(c) => [c[0], c[1], c[2]],
                None => base,
            };
            let alpha = self.material.opacity.clamp(0.0, 1.0);
            let size = self.base_size * at(self.sizes, i) * at(self.size_levels, i);
            if alpha <= 0.0 || size <= 0.0 {
                continue;
            }
            out.push(PointSprite {
                position: world.to_f32(),
                size,
                color: [rgb[0], rgb[1], rgb[2], alpha],
            });
        }
    }
}

/// Tessellates and lights every visible mesh, then appends the sprites.
pub fn build_frame(world: &World, camera: &PerspectiveCamera, batches: &[PointBatch<'_>]) -> RenderFrame {
    let lights: Vec<_> = world.lights().map(|(_, light)| *light).collect();
    let mut triangles = Vec::new();
    for (_, transform, drawable, material) in world.drawables_3d() {
        if material.opacity <= 0.0 {
            continue;
        }
        let double_sided = mesh::is_double_sided(drawable.shape);
        for vertex in mesh::tessellate(drawable.shape) {
            let position = transform.apply(vertex.position);
            let normal = transform.rotate(vertex.normal);
            triangles.push(MeshVertex {
                position: position.to_f32(),
                color: mesh::shade(normal, double_sided, &material, &lights),
            });
        }
    }

    let mut points = Vec::new();
    for batch in batches {
        batch.append(&mut points);
    }

    RenderFrame {
        clear_color: world.background,
        view_proj: camera.view_proj().to_f32_cols(),
        triangles,
        points,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderError(pub String);

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "render failed: {}", self.0)
    }
}

impl std::error::Error for RenderError {}

/// Drawing backend driven once per frame.
pub trait Renderer {
    fn set_size(&mut self, width: u32, height: u32);
    fn set_pixel_ratio(&mut self, ratio: f64);
    fn render(&mut self, frame: &RenderFrame, camera: &PerspectiveCamera) -> Result<(), RenderError>;
}

/// Backend that only remembers what it was asked to draw.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordingRenderer {
    pub size: (u32, u32),
    pub pixel_ratio: f64,
    pub frames_rendered: u64,
    pub last_clear: Option<Rgb>,
    pub last_triangle_count: usize,
    pub last_point_count: usize,
    pub last_camera: Option<PerspectiveCamera>,
}

impl Renderer for RecordingRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    fn render(&mut self, frame: &RenderFrame, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        self.frames_rendered += 1;
        self.last_clear = Some(frame.clear_color);
        self.last_triangle_count = frame.triangles.len() / 3;
        self.last_point_count = frame.points.len();
        self.last_camera = Some(*camera);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{PointBatch, RecordingRenderer, Renderer, build_frame};
    use foundation::color::Rgb;
    use foundation::math::Vec3;
    use pretty_assertions::assert_eq;
    use scene::components::{Drawable3D, Light, Material, Transform, Visibility};
    use scene::world::World;

    use crate::camera::PerspectiveCamera;

    #[test]
    fn frame_collects_visible_meshes_and_points() {
        let mut world = World::new();
        world.background = Rgb::from_hex(0x87ceeb);
        world.add_light(Light::ambient(Rgb::WHITE, 0.4));
        let body = world.spawn();
        world.set_transform(body, Transform::translate(Vec3::new(0.0, 1.0, 0.0)));
        world.set_drawable_3d(body, Drawable3D::cuboid(2.5, 2.0, 2.0));
        world.set_material(body, Material::solid(0xf5f5dc));
        let hidden = world.spawn();
        world.set_transform(hidden, Transform::identity());
        world.set_drawable_3d(hidden, Drawable3D::sphere(1.0));
        world.set_visibility(hidden, Visibility::hidden());

        let positions = [0.0, 1.0, 0.0, 2.0, 3.0, 4.0];
        let levels = [1.0, 0.0];
        let mut batch = PointBatch::new(
            Transform::identity(),
            &positions,
            Material::solid(0xffffff).with_point_size(0.1),
        );
        batch.size_levels = Some(&levels);

        let camera = PerspectiveCamera::default();
        let frame = build_frame(&world, &camera, &[batch]);
        assert_eq!(frame.triangles.len(), 36);
        assert_eq!(frame.points.len(), 1);
        assert_eq!(frame.points[0].size, 0.1);
        assert_eq!(frame.clear_color, Rgb::from_hex(0x87ceeb));
        assert_eq!(frame.point_vertices().len(), 6);
    }

    #[test]
    fn per_particle_colours_override_material() {
        let positions = [0.0, 0.0, 0.0];
        let colors = [0.25, 0.5, 0.75];
        let mut batch = PointBatch::new(Transform::identity(), &positions, Material::default());
        batch.colors = Some(&colors);
        let frame = build_frame(&World::new(), &PerspectiveCamera::default(), &[batch]);
        assert_eq!(frame.points[0].color, [0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn recording_renderer_tracks_size_and_frames() {
        let mut renderer = RecordingRenderer::default();
        renderer.set_size(800, 600);
        renderer.set_pixel_ratio(2.0);
        let camera = PerspectiveCamera::default();
        let frame = build_frame(&World::new(), &camera, &[]);
        renderer.render(&frame, &camera).unwrap();
        assert_eq!(renderer.size, (800, 600));
        assert_eq!(renderer.frames_rendered, 1);
        assert_eq!(renderer.last_clear, Some(Rgb::BLACK));
    }
}
