//! Collision groups and filtering.

use rapier3d::prelude::*;

/// Collision groups for terrain colliders.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Static environment (terrain tiles)
    Environment = 1 << 0,
}

impl CollisionGroup {
    /// Create a collision group for environment.
    pub fn environment() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Environment as u32);
        let filter = Group::ALL;
        (membership, filter)
    }

    pub fn interaction_groups(self) -> InteractionGroups {
        let (membership, filter) = match self {
            Self::Environment => Self::environment(),
        };
        InteractionGroups::new(membership, filter)
    }
}

/// Environment collision groups so terrain collides with everything that moves.
pub fn env_collision_groups() -> InteractionGroups {
    CollisionGroup::Environment.interaction_groups()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_belongs_to_environment_only() {
        let groups = env_collision_groups();
        assert_eq!(groups.memberships, Group::GROUP_1);
        assert_eq!(groups.filter, Group::ALL);
    }

    #[test]
    fn terrain_interacts_with_any_group() {
        let terrain = env_collision_groups();
        let other = InteractionGroups::new(Group::GROUP_2, Group::GROUP_1);
        assert!(terrain.test(other));
        assert!(!terrain.test(InteractionGroups::new(Group::GROUP_2, Group::GROUP_3)));
    }
}
