//! Builds the diorama: terrain, cottage, boardwalk, the four seasonal trees,
//! fliers, weather fields and lights.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use foundation::color::Rgb;
use foundation::math::Vec3;
use particles::presets::{LEAVES, PETALS, SNOW};
use particles::{FlierKind, Galaxy, ParticleField, StarField, centered, unit};
use rand::Rng;
use scene::components::{
    DecorationKind, Drawable3D, Light, LightId, Material, Transform, Visibility,
};
use scene::entity::EntityId;
use scene::palette;
use scene::{Season, World};

use crate::config::DioramaConfig;

pub const HOUSE_ORIGIN: Vec3 = Vec3::new(-5.0, 0.0, -3.0);
const CHIMNEY_OFFSET: Vec3 = Vec3::new(0.6, 3.0, 0.6);
const CHIMNEY_HEIGHT: f64 = 1.0;

const GROUND_RADIUS: f64 = 20.0;
const PATH_Y: f64 = 0.05;
const PATH_DIVISIONS: usize = 60;
const DECORATION_COUNT: usize = 35;
const RAIL_EVERY: usize = 5;
const RAIL_OFFSET: f64 = 0.35;
const RAIL_HEIGHT: f64 = 0.6;
const WINTER_TWIGS: usize = 15;

/// World size of a star sprite per unit of its size attribute.
pub const STAR_SPRITE_SCALE: f32 = 0.3;
const GALAXY_SPRITE_SIZE: f32 = 0.05;

/// Path-side decoration made of one or more meshes.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoration {
    pub kind: DecorationKind,
    /// Stable id used to pick seasonal colours.
    pub index: u32,
    /// Flowers list the stem first, then the head.
    pub parts: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlierRig {
    pub kind: FlierKind,
    pub body: Option<EntityId>,
    /// One entity per `kind.wings()` entry, same order.
    pub wings: Vec<EntityId>,
}

/// Entity and light handles the season store and frame loop act on.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneHandles {
    pub terrain: EntityId,
    pub snow_ground: EntityId,
    pub snow_roof: EntityId,
    pub windows: Vec<EntityId>,
    pub chimney_top: Vec3,
    pub boards: Vec<EntityId>,
    pub railings: Vec<EntityId>,
    pub decorations: Vec<Decoration>,
    pub butterfly: FlierRig,
    pub dragonfly: FlierRig,
    pub sunspots: Vec<EntityId>,
    pub smoke: EntityId,
    pub stars: EntityId,
    pub galaxy: EntityId,
    pub ambient: LightId,
    pub seasonal_lights: Vec<(Season, LightId)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSlot {
    pub season: Season,
    pub entity: EntityId,
    pub field: ParticleField,
}

/// Particle buffers owned by the context.
#[derive(Debug, Clone, PartialEq)]
pub struct Fields {
    pub weather: Vec<WeatherSlot>,
    pub smoke: ParticleField,
    /// Drives the opacity of the sunspot quads.
    pub sunspots: ParticleField,
    pub stars: Option<StarField>,
    pub galaxy: Option<Galaxy>,
}

impl Fields {
    pub fn weather_for(&self, season: Season) -> Option<&WeatherSlot> {
        self.weather.iter().find(|slot| slot.season == season)
    }
}

fn mesh(world: &mut World, transform: Transform, drawable: Drawable3D, material: Material) -> EntityId {
    let e = world.spawn();
    world.set_transform(e, transform);
    world.set_drawable_3d(e, drawable);
    world.set_material(e, material);
    e
}

fn cloud(world: &mut World, material: Material) -> EntityId {
    mesh(world, Transform::identity(), Drawable3D::points(), material)
}

/// Flat colour that ignores scene lights.
fn unlit(hex: u32) -> Material {
    Material {
        color: Rgb::BLACK,
        emissive: Rgb::from_hex(hex),
        emissive_intensity: 1.0,
        ..Material::default()
    }
}

fn at(x: f64, y: f64, z: f64) -> Transform {
    Transform::translate(Vec3::new(x, y, z))
}

/// Spawns the whole diorama into `world`.
pub fn build<R: Rng + ?Sized>(
    world: &mut World,
    config: &DioramaConfig,
    rng: &mut R,
) -> (SceneHandles, Fields) {
    world.background = palette::sky_color(config.season, config.night);

    let terrain = mesh(
        world,
        Transform::identity(),
        Drawable3D::disc(GROUND_RADIUS),
        Material::solid(0x7cbb69).with_roughness(0.8),
    );

    let house = build_house(world);
    let path = build_path(world, rng);

    for season in [Season::Spring, Season::Summer, Season::Autumn] {
        build_tree(world, season);
    }
    build_winter_tree(world, rng);

    let snow_ground = mesh(
        world,
        at(0.0, PATH_Y, 0.0),
        Drawable3D::disc(GROUND_RADIUS),
        Material::solid(0xf0f8ff).with_roughness(0.8),
    );
    world.set_season_tag(snow_ground, Season::Winter);
    world.set_visibility(snow_ground, Visibility::hidden());

    let butterfly = build_flier(world, FlierKind::Butterfly, Season::Spring);
    let dragonfly = build_flier(world, FlierKind::Dragonfly, Season::Summer);

    let counts = config.particles;
    let sunspot_field = ParticleField::sunspots(counts.sunspots, rng);
    let sunspots = build_sunspots(world, &sunspot_field);

    let weather = vec![
        weather_slot(
            world,
            Season::Spring,
            ParticleField::weather(&PETALS, counts.petals, rng),
            Material::solid(0xffc6d9).with_point_size(0.1).with_opacity(0.8),
        ),
        weather_slot(
            world,
            Season::Autumn,
            ParticleField::weather(&LEAVES, counts.leaves, rng),
            Material::default().with_point_size(0.2).with_opacity(0.9),
        ),
        weather_slot(
            world,
            Season::Winter,
            ParticleField::weather(&SNOW, counts.snow, rng),
            Material::solid(0xffffff).with_point_size(0.1).with_opacity(0.8),
        ),
    ];

    let smoke = cloud(
        world,
        Material::solid(0xaaaaaa).with_point_size(0.4).with_opacity(0.6),
    );
    world.set_visibility(smoke, Visibility::hidden());
    let smoke_field = ParticleField::smoke(house.chimney_top, counts.smoke, rng);

    let stars = cloud(
        world,
        Material::default().with_point_size(STAR_SPRITE_SCALE),
    );
    world.set_visibility(stars, Visibility::hidden());
    let star_field = counts
        .preload_stars
        .then(|| StarField::generate(config.season, counts.stars, config.seed));

    let galaxy = cloud(
        world,
        Material::default().with_point_size(GALAXY_SPRITE_SIZE),
    );
    world.set_visibility(galaxy, Visibility::hidden());

    let ambient = world.add_light(Light::ambient(Rgb::WHITE, palette::ambient_intensity(false)));
    let seasonal_lights = Season::ALL
        .iter()
        .map(|&season| {
            let light = Light::seasonal(
                season,
                palette::light_color(season),
                palette::light_position(season),
                0.0,
            );
            (season, world.add_light(light))
        })
        .collect();

    tracing::debug!(
        entities = world.entity_count(),
        boards = path.boards.len(),
        decorations = path.decorations.len(),
        "diorama scene built"
    );

    let handles = SceneHandles {
        terrain,
        snow_ground,
        snow_roof: house.snow_roof,
        windows: house.windows,
        chimney_top: house.chimney_top,
        boards: path.boards,
        railings: path.railings,
        decorations: path.decorations,
        butterfly,
        dragonfly,
        sunspots,
        smoke,
        stars,
        galaxy,
        ambient,
        seasonal_lights,
    };
    let fields = Fields {
        weather,
        smoke: smoke_field,
        sunspots: sunspot_field,
        stars: star_field,
        galaxy: None,
    };
    (handles, fields)
}

struct House {
    snow_roof: EntityId,
    windows: Vec<EntityId>,
    chimney_top: Vec3,
}

fn build_house(world: &mut World) -> House {
    let local = |x: f64, y: f64, z: f64| Transform::translate(HOUSE_ORIGIN + Vec3::new(x, y, z));

    mesh(
        world,
        local(0.0, 1.0, 0.0),
        Drawable3D::cuboid(2.5, 2.0, 2.0),
        Material::solid(0xf5f5dc),
    );
    mesh(
        world,
        local(0.0, 2.75, 0.0).with_rotation(Vec3::new(0.0, FRAC_PI_4, 0.0)),
        Drawable3D::cone(2.0, 1.5, 4),
        Material {
            color: palette::WOOD,
            ..Material::default()
        },
    );
    let snow_roof = mesh(
        world,
        local(0.0, 2.75, 0.0).with_rotation(Vec3::new(0.0, FRAC_PI_4, 0.0)),
        Drawable3D::cone(2.05, 1.55, 4),
        Material::solid(0xffffff).with_roughness(palette::SNOW_ROUGHNESS),
    );
    world.set_visibility(snow_roof, Visibility::hidden());

    mesh(
        world,
        local(CHIMNEY_OFFSET.x, CHIMNEY_OFFSET.y, CHIMNEY_OFFSET.z),
        Drawable3D::cuboid(0.4, CHIMNEY_HEIGHT, 0.4),
        Material::solid(0x8b0000),
    );
    mesh(
        world,
        local(0.0, 0.6, 1.01),
        Drawable3D::quad(0.6, 1.2),
        Material {
            color: palette::WOOD,
            ..Material::default()
        },
    );

    let panes = [
        (Vec3::new(-0.7, 1.3, 1.01), 0.0),
        (Vec3::new(1.26, 1.3, 0.0), FRAC_PI_2),
        (Vec3::new(0.0, 1.3, -1.01), PI),
    ];
    let windows = panes
        .iter()
        .map(|(offset, yaw)| {
            mesh(
                world,
                Transform::translate(HOUSE_ORIGIN + *offset).with_rotation(Vec3::new(0.0, *yaw, 0.0)),
                Drawable3D::quad(0.5, 0.5),
                Material::solid(0xadd8e6).with_opacity(0.7),
            )
        })
        .collect();

    House {
        snow_roof,
        windows,
        chimney_top: HOUSE_ORIGIN + CHIMNEY_OFFSET + Vec3::new(0.0, CHIMNEY_HEIGHT * 0.5, 0.0),
    }
}

/// Centripetal Catmull-Rom spline through the boardwalk control points.
#[derive(Debug, Clone)]
pub struct PathCurve {
    points: Vec<Vec3>,
}

impl PathCurve {
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    /// The boardwalk from the cottage door to the edge of the ground.
    pub fn boardwalk() -> Self {
        let door = Self::door();
        let mut points = vec![door];
        points.extend(
            [
                (-4.7, -0.5),
                (-3.5, 1.0),
                (-2.0, 2.0),
                (0.0, 2.5),
                (2.0, 2.0),
                (4.0, 1.0),
                (6.0, 1.5),
                (8.0, 3.0),
            ]
            .iter()
            .map(|&(x, z)| Vec3::new(x, PATH_Y, z)),
        );
        Self::new(points)
    }

    pub fn door() -> Vec3 {
        Vec3::new(HOUSE_ORIGIN.x, PATH_Y, HOUSE_ORIGIN.z + 1.01)
    }

    /// Point at parameter `t` in `[0, 1]`, spread evenly over segments.
    pub fn point(&self, t: f64) -> Vec3 {
        let n = self.points.len();
        if n < 2 {
            return self.points.first().copied().unwrap_or(Vec3::ZERO);
        }
        let p = (n - 1) as f64 * t.clamp(0.0, 1.0);
        let mut i = p.floor() as usize;
        let mut w = p - i as f64;
        if i >= n - 1 {
            i = n - 2;
            w = 1.0;
        }

        let p1 = self.points[i];
        let p2 = self.points[i + 1];
        let p0 = if i > 0 { self.points[i - 1] } else { p1 * 2.0 - p2 };
        let p3 = if i + 2 < n {
            self.points[i + 2]
        } else {
            p2 * 2.0 - p1
        };

        let span = |a: Vec3, b: Vec3| {
            let d = b - a;
            d.dot(d).powf(0.25)
        };
        let mut dt1 = span(p1, p2);
        if dt1 < 1e-4 {
            dt1 = 1.0;
        }
        let mut dt0 = span(p0, p1);
        if dt0 < 1e-4 {
            dt0 = dt1;
        }
        let mut dt2 = span(p2, p3);
        if dt2 < 1e-4 {
            dt2 = dt1;
        }

        let axis = |x0: f64, x1: f64, x2: f64, x3: f64| {
            let t1 = ((x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1) * dt1;
            let t2 = ((x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2) * dt1;
            let c2 = -3.0 * x1 + 3.0 * x2 - 2.0 * t1 - t2;
            let c3 = 2.0 * x1 - 2.0 * x2 + t1 + t2;
            x1 + t1 * w + c2 * w * w + c3 * w * w * w
        };
        Vec3::new(
            axis(p0.x, p1.x, p2.x, p3.x),
            axis(p0.y, p1.y, p2.y, p3.y),
            axis(p0.z, p1.z, p2.z, p3.z),
        )
    }

    /// Unit tangent at `t`, by central difference.
    pub fn tangent(&self, t: f64) -> Vec3 {
        let h = 1e-4;
        let a = self.point((t - h).max(0.0));
        let b = self.point((t + h).min(1.0));
        (b - a).normalize()
    }

    pub fn samples(&self, divisions: usize) -> Vec<Vec3> {
        (0..=divisions)
            .map(|i| self.point(i as f64 / divisions as f64))
            .collect()
    }
}

/// Horizontal unit normal to the path at `t`.
fn side_normal(curve: &PathCurve, t: f64) -> Vec3 {
    let tangent = curve.tangent(t);
    Vec3::new(-tangent.z, 0.0, tangent.x).normalize()
}

/// Boards narrow at the door and widen toward the far end.
pub fn board_width(distance_from_door: f64) -> f64 {
    if distance_from_door < 2.0 {
        0.4 + distance_from_door * 0.05
    } else if distance_from_door > 10.0 {
        0.65
    } else {
        0.5 + (distance_from_door - 2.0) * 0.02
    }
}

struct Path {
    boards: Vec<EntityId>,
    railings: Vec<EntityId>,
    decorations: Vec<Decoration>,
}

fn build_path<R: Rng + ?Sized>(world: &mut World, rng: &mut R) -> Path {
    let curve = PathCurve::boardwalk();
    let points = curve.samples(PATH_DIVISIONS);
    let door = PathCurve::door();
    let wood = Material {
        color: palette::WOOD,
        roughness: palette::WOOD_ROUGHNESS,
        ..Material::default()
    };

    let boards = points
        .windows(2)
        .map(|pair| {
            let (current, next) = (pair[0], pair[1]);
            let dir = (next - current).normalize();
            let width = board_width(current.distance(door));
            mesh(
                world,
                Transform::translate(current).with_rotation(Vec3::new(0.0, dir.x.atan2(dir.z), 0.0)),
                Drawable3D::cuboid(width, 0.06, 0.3),
                wood,
            )
        })
        .collect();

    let n = points.len();
    let mut decorations = Vec::with_capacity(DECORATION_COUNT);
    for index in 0..DECORATION_COUNT {
        let at_index = ((unit(rng) * (n as f64 * 0.9) + n as f64 * 0.1).floor() as usize).min(n - 1);
        let anchor = points[at_index];
        let side = if unit(rng) > 0.5 { 1.0 } else { -1.0 };
        let offset = (unit(rng) * 0.4 + 0.2) * side;
        let normal = side_normal(&curve, at_index as f64 / PATH_DIVISIONS as f64);
        let base = Vec3::new(anchor.x + normal.x * offset, anchor.y, anchor.z + normal.z * offset);
        decorations.push(build_decoration(world, rng, index as u32, base));
    }

    let rail = Material {
        color: palette::WOOD,
        roughness: palette::RAILING_ROUGHNESS,
        ..Material::default()
    };
    let mut railings = Vec::new();
    for i in (1..n.saturating_sub(2)).step_by(RAIL_EVERY) {
        let ratio = i as f64 / (n - 1) as f64;
        let normal = side_normal(&curve, ratio);
        let p = points[i];
        let mut post = |sign: f64| {
            mesh(
                world,
                at(
                    p.x + sign * normal.x * RAIL_OFFSET,
                    p.y + RAIL_HEIGHT * 0.5,
                    p.z + sign * normal.z * RAIL_OFFSET,
                ),
                Drawable3D::cylinder(0.03, 0.03, RAIL_HEIGHT),
                rail,
            )
        };
        if ratio > 0.3 && ratio < 0.9 {
            railings.push(post(1.0));
        }
        if ratio > 0.25 && ratio < 0.85 {
            railings.push(post(-1.0));
        }
    }

    Path {
        boards,
        railings,
        decorations,
    }
}

fn build_decoration<R: Rng + ?Sized>(
    world: &mut World,
    rng: &mut R,
    index: u32,
    base: Vec3,
) -> Decoration {
    let (kind, parts) = if unit(rng) > 0.7 {
        let radius = 0.08 + unit(rng) * 0.05;
        let squash = 0.6 + unit(rng) * 0.4;
        let stone = mesh(
            world,
            Transform::translate(base).with_scale(Vec3::new(1.0, squash, 1.0)),
            Drawable3D::sphere(radius),
            Material {
                color: palette::STONE,
                roughness: palette::STONE_ROUGHNESS,
                ..Material::default()
            },
        );
        (DecorationKind::Stone, vec![stone])
    } else if unit(rng) > 0.5 {
        let petal = Material::solid(0xffb6c1).with_roughness(0.8);
        let stem = mesh(
            world,
            Transform::translate(base),
            Drawable3D::cylinder(0.05, 0.03, 0.15),
            Material::solid(0x228b22).with_roughness(0.8),
        );
        let head = mesh(
            world,
            Transform::translate(base + Vec3::new(0.0, 0.1, 0.0)),
            Drawable3D::sphere(0.06),
            petal.with_roughness(0.7),
        );
        (DecorationKind::Flower, vec![stem, head])
    } else {
        let blade = Material::solid(0x4ca64c).with_roughness(0.9);
        let mut parts = vec![mesh(
            world,
            Transform::translate(base).with_rotation(Vec3::new(0.0, unit(rng) * PI, 0.0)),
            Drawable3D::cone(0.06, 0.15, 4),
            blade,
        )];
        for _ in 0..3 {
            let height = 0.1 + unit(rng) * 0.1;
            let offset = Vec3::new(centered(rng, 0.08), unit(rng) * 0.05, centered(rng, 0.08));
            let yaw = unit(rng) * PI;
            let lean = centered(rng, 0.2);
            parts.push(mesh(
                world,
                Transform::translate(base + offset).with_rotation(Vec3::new(0.0, yaw, lean)),
                Drawable3D::cone(0.04, height, 3),
                blade,
            ));
        }
        (DecorationKind::Grass, parts)
    };
    Decoration { kind, index, parts }
}

fn tagged(world: &mut World, e: EntityId, season: Season) -> EntityId {
    world.set_season_tag(e, season);
    e
}

fn build_tree(world: &mut World, season: Season) {
    // (trunk top, trunk bottom, trunk height, crown radius, crown y, crown colour)
    let (top, bottom, height, radius, crown_y, crown) = match season {
        Season::Spring => (0.2, 0.4, 4.0, 2.5, 5.0, 0xffc6d9),
        Season::Summer => (0.3, 0.5, 5.0, 3.0, 6.0, 0x2e8b57),
        _ => (0.25, 0.4, 4.5, 2.5, 5.5, 0xd2691e),
    };
    let trunk = mesh(
        world,
        at(0.0, height * 0.5, 0.0),
        Drawable3D::cylinder(top, bottom, height),
        Material {
            color: palette::WOOD,
            ..Material::default()
        },
    );
    tagged(world, trunk, season);
    let crown = mesh(
        world,
        at(0.0, crown_y, 0.0),
        Drawable3D::sphere(radius),
        Material::solid(crown).with_roughness(0.8),
    );
    tagged(world, crown, season);
}

/// Cylinder of `length` leaning by `angle` about Z, starting at `start`.
fn branch(length: f64, thickness: f64, angle: f64, start: Vec3) -> (Transform, Drawable3D) {
    let half = length * 0.5;
    let centre = Vec3::new(start.x - angle.sin() * half, start.y + angle.cos() * half, start.z);
    (
        Transform::translate(centre).with_rotation(Vec3::new(0.0, 0.0, angle)),
        Drawable3D::cylinder(thickness * 0.7, thickness, length),
    )
}

fn build_winter_tree<R: Rng + ?Sized>(world: &mut World, rng: &mut R) {
    let bark = Material::solid(0x5c5c5c);
    let trunk = mesh(
        world,
        at(0.0, 2.0, 0.0),
        Drawable3D::cylinder(0.2, 0.35, 4.0),
        bark,
    );
    tagged(world, trunk, Season::Winter);

    let mut limbs = vec![
        branch(2.0, 0.1, FRAC_PI_4, Vec3::new(0.0, 3.5, 0.0)),
        branch(1.8, 0.1, -PI / 3.0, Vec3::new(0.0, 3.0, 0.0)),
        branch(1.5, 0.08, PI / 2.5, Vec3::new(0.0, 2.5, 0.0)),
        branch(1.3, 0.08, -PI / 2.8, Vec3::new(0.0, 3.2, 0.0)),
    ];
    for _ in 0..WINTER_TWIGS {
        let base_y = 2.0 + unit(rng) * 2.0;
        let angle = centered(rng, PI);
        let length = 0.5 + unit(rng) * 0.8;
        let thickness = 0.02 + unit(rng) * 0.03;
        let x = centered(rng, 0.5);
        let z = centered(rng, 0.5);
        limbs.push(branch(length, thickness, angle, Vec3::new(x, base_y, z)));
    }
    for (transform, drawable) in limbs {
        let e = mesh(world, transform, drawable, bark);
        tagged(world, e, Season::Winter);
    }
}

fn build_flier(world: &mut World, kind: FlierKind, season: Season) -> FlierRig {
    let (body, wing_shape, wing_material) = match kind {
        FlierKind::Butterfly => (None, Drawable3D::quad(1.0, 0.5), unlit(0xffaacc)),
        FlierKind::Dragonfly => {
            let body = mesh(
                world,
                kind.body_transform(0.0),
                Drawable3D::cuboid(0.06, 0.06, 1.0),
                unlit(0x6495ed),
            );
            (
                Some(tagged(world, body, season)),
                Drawable3D::quad(0.6, 0.2),
                unlit(0xffffff).with_opacity(0.5),
            )
        }
    };
    let wings = kind
        .wings()
        .iter()
        .map(|wing| {
            let e = mesh(
                world,
                kind.wing_transform(wing, 0.0),
                wing_shape,
                wing_material,
            );
            tagged(world, e, season)
        })
        .collect();
    FlierRig { kind, body, wings }
}

fn build_sunspots(world: &mut World, field: &ParticleField) -> Vec<EntityId> {
    (0..field.len())
        .filter_map(|k| {
            let position = field.position(k)?;
            let size = f64::from(*field.sizes().get(k)?);
            let e = mesh(
                world,
                Transform::translate(position).with_rotation(Vec3::new(-FRAC_PI_2, 0.0, 0.0)),
                Drawable3D::quad(size, size),
                unlit(0xffffcc).with_opacity(field.levels().get(k).copied().unwrap_or(0.0)),
            );
            Some(tagged(world, e, Season::Summer))
        })
        .collect()
}

fn weather_slot(
    world: &mut World,
    season: Season,
    field: ParticleField,
    material: Material,
) -> WeatherSlot {
    let entity = cloud(world, material);
    tagged(world, entity, season);
    WeatherSlot {
        season,
        entity,
        field,
    }
}
