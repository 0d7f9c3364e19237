//! Per-frame jobs, in run order:
//! orbit, clock, transitions, timers, stars, galaxy, smoke, seasonal, render.

use gpu::{PointBatch, Renderer, build_frame};
use layers::LabelSink;
use particles::{FlickerTarget, ParticleField};
use runtime::frame::Frame;
use runtime::job::Job;
use runtime::scheduler::Scheduler;
use scene::components::Transform;
use scene::entity::EntityId;
use scene::Season;

use crate::context::Diorama;

pub fn register<R: Renderer, S: LabelSink>(scheduler: &mut Scheduler<Diorama<R, S>>) {
    scheduler.add_job(Job::with_priority("orbit", 0, orbit::<R, S>));
    scheduler.add_job(Job::with_priority("clock", 10, clock::<R, S>));
    scheduler.add_job(Job::with_priority("transitions", 20, transitions::<R, S>));
    scheduler.add_job(Job::with_priority("timers", 30, timers::<R, S>));
    scheduler.add_job(Job::with_priority("stars", 40, stars::<R, S>));
    scheduler.add_job(Job::with_priority("galaxy", 50, galaxy::<R, S>));
    scheduler.add_job(Job::with_priority("smoke", 60, smoke::<R, S>));
    scheduler.add_job(Job::with_priority("seasonal", 70, seasonal::<R, S>));
    scheduler.add_job(Job::with_priority("render", 100, render::<R, S>));
}

fn orbit<R: Renderer, S: LabelSink>(d: &mut Diorama<R, S>, _frame: Frame) {
    d.controller.recompute();
    d.camera.look_at(d.controller.position, d.controller.target);
}

fn clock<R: Renderer, S: LabelSink>(d: &mut Diorama<R, S>, frame: Frame) {
    d.now = frame.time;
}

fn transitions<R: Renderer, S: LabelSink>(d: &mut Diorama<R, S>, _frame: Frame) {
    d.advance_transitions();
}

fn timers<R: Renderer, S: LabelSink>(d: &mut Diorama<R, S>, _frame: Frame) {
    let hidden = d.labels.advance_timers(d.now, &mut d.sink);
    if hidden > 0 {
        tracing::debug!(hidden, "label auto-hide fired");
    }
    d.advance_hint();
}

fn stars<R: Renderer, S: LabelSink>(d: &mut Diorama<R, S>, _frame: Frame) {
    if !d.state.is_night {
        return;
    }
    if let Some(stars) = d.fields.stars.as_mut() {
        stars.update(d.now.seconds());
    }
}

fn galaxy<R: Renderer, S: LabelSink>(d: &mut Diorama<R, S>, _frame: Frame) {
    if !d.world.is_visible(d.handles.galaxy) {
        return;
    }
    if let Some(galaxy) = d.fields.galaxy.as_mut() {
        galaxy.update(d.now.seconds());
        d.world.set_transform(d.handles.galaxy, galaxy.transform());
    }
}

fn smoke<R: Renderer, S: LabelSink>(d: &mut Diorama<R, S>, _frame: Frame) {
    if d.world.is_visible(d.handles.smoke) {
        d.fields.smoke.update(d.now.seconds(), &mut d.rng);
    }
}

fn rig_visible(world: &scene::World, rig: &crate::prefab::FlierRig) -> bool {
    rig.wings.first().is_some_and(|wing| world.is_visible(*wing))
}

/// Weather of the current season, the fliers and the summer sunspots.
fn seasonal<R: Renderer, S: LabelSink>(d: &mut Diorama<R, S>, _frame: Frame) {
    let t = d.now.seconds();
    for slot in &mut d.fields.weather {
        if d.world.is_visible(slot.entity) {
            slot.field.update(t, &mut d.rng);
        }
    }

    for rig in [&d.handles.butterfly, &d.handles.dragonfly] {
        if !rig_visible(&d.world, rig) {
            continue;
        }
        if let Some(body) = rig.body {
            d.world.set_transform(body, rig.kind.body_transform(t));
        }
        for (wing, entity) in rig.kind.wings().iter().zip(&rig.wings) {
            d.world.set_transform(*entity, rig.kind.wing_transform(wing, t));
        }
    }

    if d.state.season == Season::Summer {
        d.fields.sunspots.update(t, &mut d.rng);
        if flicker_target(&d.fields.sunspots) != Some(FlickerTarget::Opacity) {
            return;
        }
        for (entity, level) in d.handles.sunspots.iter().zip(d.fields.sunspots.levels()) {
            if let Some(material) = d.world.material_mut(*entity) {
                material.opacity = *level;
            }
        }
    }
}

/// A visible field as a sprite batch. Size flicker scales the sprites;
/// opacity flicker is applied to entity materials in `seasonal`.
fn batch<'a>(
    world: &scene::World,
    entity: EntityId,
    transform: Transform,
    field: &'a ParticleField,
) -> Option<PointBatch<'a>> {
    if !world.is_visible(entity) {
        return None;
    }
    let material = world.material(entity).unwrap_or_default();
    let mut b = PointBatch::new(transform, field.positions(), material);
    b.sizes = Some(field.sizes());
    b.colors = field.colors();
    if flicker_target(field) == Some(FlickerTarget::Size) {
        b.size_levels = Some(field.levels());
    }
    Some(b)
}

fn flicker_target(field: &ParticleField) -> Option<FlickerTarget> {
    field.flicker().map(|f| f.target)
}

fn render<R: Renderer, S: LabelSink>(d: &mut Diorama<R, S>, _frame: Frame) {
    let mut batches = Vec::new();
    for slot in &d.fields.weather {
        batches.extend(batch(&d.world, slot.entity, Transform::identity(), &slot.field));
    }
    batches.extend(batch(
        &d.world,
        d.handles.smoke,
        Transform::identity(),
        &d.fields.smoke,
    ));
    if let Some(stars) = &d.fields.stars {
        batches.extend(batch(&d.world, d.handles.stars, Transform::identity(), stars.field()));
    }
    if let Some(galaxy) = &d.fields.galaxy {
        batches.extend(batch(&d.world, d.handles.galaxy, galaxy.transform(), galaxy.field()));
    }

    let frame = build_frame(&d.world, &d.camera, &batches);
    if let Err(err) = d.renderer.render(&frame, &d.camera) {
        tracing::debug!(%err, "frame not rendered");
        d.render_error = Some(err);
    }
}
