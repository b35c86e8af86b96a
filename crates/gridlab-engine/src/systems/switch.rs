//! Pressure switches, switch rings and the entities they toggle.
//!
//! Triggering is decided for every switch up front, against the pressable
//! flags as they were at the start of the system, so advancing a ring never
//! lets the newly pressable member fire in the same tick.

use std::collections::BTreeMap;

use gridlab_ecs::prelude::*;

use super::occupants;
use crate::tick::TickContext;

/// Update switch and ring state, then toggle every switchable whose
/// triggers include a pressed switch.
pub fn update_switches(ctx: &mut TickContext<'_>) {
    if ctx.is_finished() {
        return;
    }

    // switch -> whether it was pressable when triggered
    let mut triggered: BTreeMap<EntityId, bool> = BTreeMap::new();
    for (&switch_id, switch) in ctx.em.get::<Switch>() {
        let Some(&cell) = ctx.em.component::<Position>(switch_id) else {
            continue;
        };
        let pressed_by = occupants(ctx.em, cell, Some(switch_id)).into_iter().find(|&e| {
            let kind = ctx.em.component::<Identity>(e).map(|id| id.kind);
            switch.is_triggered_by(e, kind)
        });
        if pressed_by.is_some() {
            triggered.insert(switch_id, switch.pressable);
        }
    }

    let switch_ids: Vec<EntityId> = ctx.em.get::<Switch>().keys().copied().collect();
    for switch_id in switch_ids {
        let Some(group) = ctx.em.component::<Switch>(switch_id).map(|s| s.group.clone()) else {
            continue;
        };

        match (group, triggered.get(&switch_id).copied()) {
            (Some(ring), Some(true)) => advance_ring(ctx.em, &ring, switch_id),
            (Some(_), _) => {
                if let Some(switch) = ctx.em.component_mut::<Switch>(switch_id) {
                    switch.pressed = false;
                }
            }
            (None, None) => set_switch(ctx.em, switch_id, false, true),
            (None, Some(true)) => {
                tracing::debug!(switch = %switch_id, "switch pressed");
                set_switch(ctx.em, switch_id, true, false);
            }
            (None, Some(false)) => set_switch(ctx.em, switch_id, false, false),
        }
    }

    let switchables: Vec<EntityId> = ctx
        .em
        .get::<Switchable>()
        .iter()
        .filter(|(_, switchable)| {
            switchable.triggers.iter().any(|&s| {
                ctx.em.component::<Switch>(s).is_some_and(|switch| switch.pressed)
            })
        })
        .map(|(&e, _)| e)
        .collect();
    for entity in switchables {
        let active = ctx.em.toggle_active(entity);
        tracing::debug!(%entity, active, "switchable toggled");
    }
}

/// Press `pressed_id` and hand pressability to the next member of `ring`.
fn advance_ring(em: &mut EntityManager, ring: &[EntityId], pressed_id: EntityId) {
    let Some(index) = ring.iter().position(|&s| s == pressed_id) else {
        tracing::warn!(switch = %pressed_id, "switch missing from its own ring");
        return;
    };
    let next = ring[(index + 1) % ring.len()];
    tracing::debug!(switch = %pressed_id, %next, "ring switch pressed");

    set_switch(em, pressed_id, true, false);
    if next == pressed_id {
        return;
    }
    set_switch(em, next, false, true);
    for &other in ring {
        if other != pressed_id && other != next {
            set_switch(em, other, false, false);
        }
    }
}

/// Write both flags and keep the identity kind in step with pressability.
fn set_switch(em: &mut EntityManager, id: EntityId, pressed: bool, pressable: bool) {
    if let Some(switch) = em.component_mut::<Switch>(id) {
        switch.pressed = pressed;
        switch.pressable = pressable;
    }
    if let Some(identity) = em.component_mut::<Identity>(id) {
        identity.kind = if pressable {
            EntityKind::SwitchPressable
        } else {
            EntityKind::SwitchUnpressable
        };
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
