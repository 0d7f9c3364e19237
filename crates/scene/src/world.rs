use foundation::color::Rgb;

use crate::components::{Drawable3D, Light, LightId, Material, Transform, Visibility};
use crate::entity::EntityId;
use crate::season::Season;

/// Column store for every scene object plus global lighting state.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    next_index: u32,
    transforms: Vec<Option<Transform>>,
    visibility: Vec<Option<Visibility>>,
    season_tags: Vec<Option<Season>>,
    drawables_3d: Vec<Option<Drawable3D>>,
    materials: Vec<Option<Material>>,
    lights: Vec<Light>,
    /// Clear colour of the sky.
    pub background: Rgb,
}

impl Default for World {
    fn default() -> Self {
        Self {
            next_index: 0,
            transforms: Vec::new(),
            visibility: Vec::new(),
            season_tags: Vec::new(),
            drawables_3d: Vec::new(),
            materials: Vec::new(),
            lights: Vec::new(),
            background: Rgb::BLACK,
        }
    }
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self) -> EntityId {
        let id = EntityId::from_row(self.next_index as usize);
        self.next_index += 1;
        let idx = id.row();
        self.ensure_capacity(idx);
        id
    }

    pub fn entity_count(&self) -> usize {
        self.next_index as usize
    }

    pub fn set_transform(&mut self, entity: EntityId, transform: Transform) {
        self.ensure_capacity(entity.row());
        self.transforms[entity.row()] = Some(transform);
    }

    pub fn set_visibility(&mut self, entity: EntityId, visibility: Visibility) {
        self.ensure_capacity(entity.row());
        self.visibility[entity.row()] = Some(visibility);
    }

    pub fn set_visible(&mut self, entity: EntityId, visible: bool) {
        self.set_visibility(entity, Visibility::from(visible));
    }

    pub fn set_season_tag(&mut self, entity: EntityId, season: Season) {
        self.ensure_capacity(entity.row());
        self.season_tags[entity.row()] = Some(season);
    }

    pub fn set_drawable_3d(&mut self, entity: EntityId, drawable: Drawable3D) {
        self.ensure_capacity(entity.row());
        self.drawables_3d[entity.row()] = Some(drawable);
    }

    pub fn set_material(&mut self, entity: EntityId, material: Material) {
        self.ensure_capacity(entity.row());
        self.materials[entity.row()] = Some(material);
    }

    pub fn transform(&self, entity: EntityId) -> Option<Transform> {
        self.transforms.get(entity.row()).and_then(|t| *t)
    }

    pub fn transform_mut(&mut self, entity: EntityId) -> Option<&mut Transform> {
        self.transforms
            .get_mut(entity.row())
            .and_then(|t| t.as_mut())
    }

    /// Entities without an explicit visibility component are visible.
    pub fn is_visible(&self, entity: EntityId) -> bool {
        self.visibility
            .get(entity.row())
            .and_then(|v| *v)
            .map(|v| v.visible)
            .unwrap_or(true)
    }

    pub fn season_tag(&self, entity: EntityId) -> Option<Season> {
        self.season_tags.get(entity.row()).and_then(|s| *s)
    }

    pub fn drawable_3d(&self, entity: EntityId) -> Option<Drawable3D> {
        self.drawables_3d.get(entity.row()).and_then(|d| *d)
    }

    pub fn material(&self, entity: EntityId) -> Option<Material> {
        self.materials.get(entity.row()).and_then(|m| *m)
    }

    pub fn material_mut(&mut self, entity: EntityId) -> Option<&mut Material> {
        self.materials
            .get_mut(entity.row())
            .and_then(|m| m.as_mut())
    }

    /// Every entity carrying a season tag (any season), in spawn order.
    pub fn season_tagged(&self) -> Vec<(EntityId, Season)> {
        let mut out = Vec::new();
        for (idx, tag) in self.season_tags.iter().enumerate() {
            if let Some(season) = tag {
                out.push((EntityId::from_row(idx), *season));
            }
        }
        out
    }

    pub fn add_light(&mut self, light: Light) -> LightId {
        let id = LightId(self.lights.len() as u32);
        self.lights.push(light);
        id
    }

    pub fn light(&self, id: LightId) -> Option<&Light> {
        self.lights.get(id.0 as usize)
    }

    pub fn light_mut(&mut self, id: LightId) -> Option<&mut Light> {
        self.lights.get_mut(id.0 as usize)
    }

    pub fn lights(&self) -> impl Iterator<Item = (LightId, &Light)> {
        self.lights
            .iter()
            .enumerate()
            .map(|(idx, light)| (LightId(idx as u32), light))
    }

    /// Visible entities with geometry, transform and material.
    pub fn drawables_3d(&self) -> Vec<(EntityId, Transform, Drawable3D, Material)> {
        let mut out = Vec::new();
        for (idx, drawable) in self.drawables_3d.iter().enumerate() {
            let Some(drawable) = drawable else { continue };
            let Some(transform) = self.transforms.get(idx).and_then(|t| *t) else {
                continue;
            };
            let entity = EntityId::from_row(idx);
            if !self.is_visible(entity) {
                continue;
            }
            let material = self.materials.get(idx).and_then(|m| *m).unwrap_or_default();
            out.push((entity, transform, *drawable, material));
        }
        out
    }

    fn ensure_capacity(&mut self, idx: usize) {
        if self.transforms.len() <= idx {
            let new_len = idx + 1;
            self.transforms.resize(new_len, None);
            self.visibility.resize(new_len, None);
            self.season_tags.resize(new_len, None);
            self.drawables_3d.resize(new_len, None);
            self.materials.resize(new_len, None);
        }
    }
}
