//! Room configuration.

use rolecall_protocol::Role;
use serde::{Deserialize, Serialize};

/// Settings shared by every room the registry creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Maximum members per room. Never more than one per role; larger
    /// values are clamped to the role count.
    pub max_players: usize,

    /// Members required before the host may `start`. The default of 1
    /// deals to whoever is present; set it to `max_players` to insist on
    /// a full table.
    pub min_players_to_start: usize,

    /// Whether members may `leave` explicitly and the host may `destroy`
    /// the room. Off for the basic flavor, where both actions are ignored.
    pub allow_disband: bool,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: Role::ALL.len(),
            min_players_to_start: 1,
            allow_disband: true,
        }
    }
}

impl RoomConfig {
    /// The basic flavor: no explicit leave, no disband.
    pub fn basic() -> Self {
        Self {
            allow_disband: false,
            ..Self::default()
        }
    }

    /// Effective member ceiling, `1..=Role::ALL.len()`.
    pub fn capacity(&self) -> usize {
        self.max_players.clamp(1, Role::ALL.len())
    }

    /// Effective start threshold, `1..=capacity()`.
    pub fn start_threshold(&self) -> usize {
        self.min_players_to_start.clamp(1, self.capacity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.capacity(), 5);
        assert_eq!(config.start_threshold(), 1);
        assert!(config.allow_disband);
    }

    #[test]
    fn test_basic_flavor_disables_disband() {
        let config = RoomConfig::basic();
        assert!(!config.allow_disband);
        assert_eq!(config.capacity(), 5);
    }

    #[test]
    fn test_capacity_never_exceeds_role_count() {
        let config = RoomConfig {
            max_players: 12,
            ..RoomConfig::default()
        };
        assert_eq!(config.capacity(), 5);
    }

    #[test]
    fn test_start_threshold_is_clamped() {
        let strict = RoomConfig {
            min_players_to_start: 9,
            ..RoomConfig::default()
        };
        assert_eq!(strict.start_threshold(), 5);

        let zero = RoomConfig {
            min_players_to_start: 0,
            ..RoomConfig::default()
        };
        assert_eq!(zero.start_threshold(), 1);
    }
}
