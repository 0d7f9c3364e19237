//! CPU tessellation of scene shapes plus a simple Lambert shade.

use std::f64::consts::{PI, TAU};

use foundation::color::Rgb;
use foundation::math::Vec3;
use scene::components::{Light, LightKind, Material, Shape3D};

const SPHERE_RINGS: u32 = 12;
const SPHERE_SEGMENTS: u32 = 16;
const ROUND_SEGMENTS: u32 = 16;
const DISC_SEGMENTS: u32 = 48;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LocalVertex {
    pub position: Vec3,
    pub normal: Vec3,
}

fn v(position: Vec3, normal: Vec3) -> LocalVertex {
    LocalVertex { position, normal }
}

/// Flat shapes are lit from both sides.
pub fn is_double_sided(shape: Shape3D) -> bool {
    matches!(shape, Shape3D::Disc { .. } | Shape3D::Quad { .. })
}

/// Triangle list in the shape's local frame. Point clouds have no mesh.
pub fn tessellate(shape: Shape3D) -> Vec<LocalVertex> {
    match shape {
        Shape3D::Cuboid {
            width,
            height,
            depth,
        } => cuboid(width * 0.5, height * 0.5, depth * 0.5),
        Shape3D::Sphere { radius } => sphere(radius),
        Shape3D::Cylinder {
            radius_top,
            radius_bottom,
            height,
        } => frustum(radius_top, radius_bottom, height, ROUND_SEGMENTS),
        Shape3D::Cone {
            radius,
            height,
            sides,
        } => frustum(0.0, radius, height, sides.max(3)),
        Shape3D::Disc { radius } => disc(radius),
        Shape3D::Quad { width, height } => quad(width * 0.5, height * 0.5),
        Shape3D::Points => Vec::new(),
    }
}

fn push_quad(out: &mut Vec<LocalVertex>, corners: [Vec3; 4], normal: Vec3) {
    let [a, b, c, d] = corners;
    out.extend_from_slice(&[
        v(a, normal),
        v(b, normal),
        v(c, normal),
        v(a, normal),
        v(c, normal),
        v(d, normal),
    ]);
}

fn cuboid(hx: f64, hy: f64, hz: f64) -> Vec<LocalVertex> {
    let mut out = Vec::with_capacity(36);
    let p = |x: f64, y: f64, z: f64| Vec3::new(x * hx, y * hy, z * hz);
    push_quad(
        &mut out,
        [p(1., -1., 1.), p(1., -1., -1.), p(1., 1., -1.), p(1., 1., 1.)],
        Vec3::new(1.0, 0.0, 0.0),
    );
    push_quad(
        &mut out,
        [p(-1., -1., -1.), p(-1., -1., 1.), p(-1., 1., 1.), p(-1., 1., -1.)],
        Vec3::new(-1.0, 0.0, 0.0),
    );
    push_quad(
        &mut out,
        [p(-1., 1., 1.), p(1., 1., 1.), p(1., 1., -1.), p(-1., 1., -1.)],
        Vec3::UP,
    );
    push_quad(
        &mut out,
        [p(-1., -1., -1.), p(1., -1., -1.), p(1., -1., 1.), p(-1., -1., 1.)],
        Vec3::new(0.0, -1.0, 0.0),
    );
    push_quad(
        &mut out,
        [p(-1., -1., 1.), p(1., -1., 1.), p(1., 1., 1.), p(-1., 1., 1.)],
        Vec3::new(0.0, 0.0, 1.0),
    );
    push_quad(
        &mut out,
        [p(1., -1., -1.), p(-1., -1., -1.), p(-1., 1., -1.), p(1., 1., -1.)],
        Vec3::new(0.0, 0.0, -1.0),
    );
    out
}

fn sphere(radius: f64) -> Vec<LocalVertex> {
    let point = |ring: u32, seg: u32| {
        let phi = PI * ring as f64 / SPHERE_RINGS as f64;
        let theta = TAU * seg as f64 / SPHERE_SEGMENTS as f64;
        let n = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
        v(n * radius, n)
    };
    let mut out = Vec::with_capacity((SPHERE_RINGS * SPHERE_SEGMENTS * 6) as usize);
    for ring in 0..SPHERE_RINGS {
        for seg in 0..SPHERE_SEGMENTS {
            let a = point(ring, seg);
            let b = point(ring + 1, seg);
            let c = point(ring + 1, seg + 1);
            let d = point(ring, seg + 1);
            out.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }
    out
}

/// Capped frustum along Y centred on the origin; `top == 0` gives a cone.
fn frustum(top: f64, bottom: f64, height: f64, segments: u32) -> Vec<LocalVertex> {
    let half = height * 0.5;
    let slope = if height > 0.0 {
        (bottom - top) / height
    } else {
        0.0
    };
    let ring = |seg: u32, r: f64, y: f64| {
        let theta = TAU * seg as f64 / segments as f64;
        let (s, c) = theta.sin_cos();
        (Vec3::new(r * c, y, r * s), Vec3::new(c, slope, s).normalize())
    };
    let mut out = Vec::new();
    for seg in 0..segments {
        let (b0, n0) = ring(seg, bottom, -half);
        let (b1, n1) = ring(seg + 1, bottom, -half);
        let (t0, _) = ring(seg, top, half);
        let (t1, _) = ring(seg + 1, top, half);
        out.extend_from_slice(&[v(b0, n0), v(t0, n0), v(t1, n1), v(b0, n0), v(t1, n1), v(b1, n1)]);

        let down = Vec3::new(0.0, -1.0, 0.0);
        out.extend_from_slice(&[v(Vec3::new(0.0, -half, 0.0), down), v(b1, down), v(b0, down)]);
        if top > 0.0 {
            out.extend_from_slice(&[v(Vec3::new(0.0, half, 0.0), Vec3::UP), v(t0, Vec3::UP), v(t1, Vec3::UP)]);
        }
    }
    out
}

fn disc(radius: f64) -> Vec<LocalVertex> {
    let mut out = Vec::with_capacity(DISC_SEGMENTS as usize * 3);
    for seg in 0..DISC_SEGMENTS {
        let a = TAU * seg as f64 / DISC_SEGMENTS as f64;
        let b = TAU * (seg + 1) as f64 / DISC_SEGMENTS as f64;
        out.extend_from_slice(&[
            v(Vec3::ZERO, Vec3::UP),
            v(Vec3::new(radius * b.cos(), 0.0, radius * b.sin()), Vec3::UP),
            v(Vec3::new(radius * a.cos(), 0.0, radius * a.sin()), Vec3::UP),
        ]);
    }
    out
}

fn quad(hw: f64, hh: f64) -> Vec<LocalVertex> {
    let mut out = Vec::with_capacity(6);
    push_quad(
        &mut out,
        [
            Vec3::new(-hw, -hh, 0.0),
            Vec3::new(hw, -hh, 0.0),
            Vec3::new(hw, hh, 0.0),
            Vec3::new(-hw, hh, 0.0),
        ],
        Vec3::new(0.0, 0.0, 1.0),
    );
    out
}

/// Diffuse colour of a surface with world normal `normal`.
pub fn shade<'a>(
    normal: Vec3,
    double_sided: bool,
    material: &Material,
    lights: impl IntoIterator<Item = &'a Light>,
) -> [f32; 4] {
    let mut lit = [0.0f32; 3];
    for light in lights {
        let weight = match light.kind {
            LightKind::Ambient => light.intensity,
            LightKind::Directional { position } => {
                let d = normal.dot(position.normalize());
                let d = if double_sided { d.abs() } else { d.max(0.0) };
                light.intensity * d as f32
            }
        };
        let c = light.color.to_array();
        for i in 0..3 {
            lit[i] += c[i] * weight;
        }
    }
    let base = material.color.to_array();
    let glow = emissive(material).to_array();
    [
        (base[0] * lit[0] + glow[0]).clamp(0.0, 1.0),
        (base[1] * lit[1] + glow[1]).clamp(0.0, 1.0),
        (base[2] * lit[2] + glow[2]).clamp(0.0, 1.0),
        material.opacity.clamp(0.0, 1.0),
    ]
}

fn emissive(material: &Material) -> Rgb {
    let i = material.emissive_intensity.max(0.0);
    let c = material.emissive;
    Rgb::new(c.r * i, c.g * i, c.b * i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::color::Rgb;
    use pretty_assertions::assert_eq;
    use scene::components::Drawable3D;
    use scene::Season;

    #[test]
    fn vertex_counts_form_triangles() {
        for drawable in [
            Drawable3D::cuboid(1.0, 2.0, 3.0),
            Drawable3D::sphere(1.0),
            Drawable3D::cylinder(0.2, 0.4, 4.0),
            Drawable3D::cone(2.0, 1.5, 4),
            Drawable3D::disc(20.0),
            Drawable3D::quad(0.6, 1.2),
        ] {
            let mesh = tessellate(drawable.shape);
            assert!(!mesh.is_empty());
            assert_eq!(mesh.len() % 3, 0);
        }
        assert!(tessellate(Drawable3D::points().shape).is_empty());
    }

    #[test]
    fn sphere_vertices_sit_on_radius() {
        for vertex in tessellate(Drawable3D::sphere(2.5).shape) {
            assert!((vertex.position.length() - 2.5).abs() < 1e-9);
        }
    }

    #[test]
    fn cuboid_spans_its_extent() {
        let mesh = tessellate(Drawable3D::cuboid(2.5, 2.0, 2.0).shape);
        let max_x = mesh.iter().map(|v| v.position.x).fold(f64::MIN, f64::max);
        let min_y = mesh.iter().map(|v| v.position.y).fold(f64::MAX, f64::min);
        assert_eq!(max_x, 1.25);
        assert_eq!(min_y, -1.0);
    }

    #[test]
    fn shading_adds_ambient_direct_and_glow() {
        let ambient = Light::ambient(Rgb::WHITE, 0.4);
        let sun = Light::seasonal(Season::Summer, Rgb::WHITE, Vec3::new(0.0, 15.0, 0.0), 1.0);
        let material = Material::solid(0xffffff);

        let up = shade(Vec3::UP, false, &material, [&ambient, &sun]);
        assert_eq!(up, [1.0, 1.0, 1.0, 1.0]);
        let down = shade(Vec3::new(0.0, -1.0, 0.0), false, &material, [&ambient, &sun]);
        assert!((down[0] - 0.4).abs() < 1e-6);
        let flat = shade(Vec3::new(0.0, -1.0, 0.0), true, &material, [&ambient, &sun]);
        assert_eq!(flat[0], 1.0);

        let mut window = Material::solid(0x000000);
        window.emissive = Rgb::from_hex(0xffd700);
        window.emissive_intensity = 0.8;
        let glow = shade(Vec3::UP, false, &window, [&ambient]);
        assert!((glow[0] - 0.8).abs() < 1e-6);
    }
}
