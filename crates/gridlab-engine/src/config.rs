//! World and enemy configuration.

use std::collections::BTreeSet;

use gridlab_ecs::component::EntityKind;
use serde::{Deserialize, Serialize};

/// Static description of a world: name, bounds and the entity kinds its
/// level may place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub name: String,
    pub width: i32,
    pub height: i32,
    /// Kinds the factories may create. `None` allows everything.
    pub allowed_kinds: Option<BTreeSet<EntityKind>>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: "untitled".to_owned(),
            width: 8,
            height: 8,
            allowed_kinds: None,
        }
    }
}

impl WorldConfig {
    pub fn new(name: &str, width: i32, height: i32) -> Self {
        Self {
            name: name.to_owned(),
            width,
            height,
            allowed_kinds: None,
        }
    }

    /// Restrict the factories to `kinds`.
    pub fn allowing(mut self, kinds: impl IntoIterator<Item = EntityKind>) -> Self {
        self.allowed_kinds = Some(kinds.into_iter().collect());
        self
    }

    /// Whether the factories may create an entity of `kind`.
    pub fn allows(&self, kind: EntityKind) -> bool {
        self.allowed_kinds
            .as_ref()
            .map_or(true, |kinds| kinds.contains(&kind))
    }
}

/// Tuning for chase enemies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaseOptions {
    /// Waypoints consumed per turn.
    pub steps: u32,
    /// Act only every `stagger` ticks.
    pub stagger: u32,
    pub diagonal: bool,
}

impl Default for ChaseOptions {
    fn default() -> Self {
        Self {
            steps: 1,
            stagger: 1,
            diagonal: false,
        }
    }
}

/// Which axes a mirror enemy negates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorOptions {
    pub mirror_x: bool,
    pub mirror_y: bool,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            mirror_x: false,
            mirror_y: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn everything_allowed_by_default() {
        let config = WorldConfig::default();
        assert!(config.allows(EntityKind::Enemy));
        assert!(config.allows(EntityKind::Fog));
    }

    #[test]
    fn restricted_config_rejects_unlisted_kinds() {
        let config = WorldConfig::new("spike", 4, 4).allowing([EntityKind::Player, EntityKind::Goal]);
        assert!(config.allows(EntityKind::Goal));
        assert!(!config.allows(EntityKind::Spike));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: WorldConfig =
            serde_json::from_str(r#"{"name":"door","allowed_kinds":["player","door"]}"#).unwrap();
        assert_eq!(config.width, 8);
        assert!(config.allows(EntityKind::Door));
        assert!(!config.allows(EntityKind::Key));

        let chase: ChaseOptions = serde_json::from_str(r#"{"steps":2}"#).unwrap();
        assert_eq!(chase, ChaseOptions { steps: 2, ..ChaseOptions::default() });
    }
}
