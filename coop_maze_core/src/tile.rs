use serde::{Deserialize, Serialize};

use crate::Role;

/// The static content of one maze cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileVariant {
    Floor,
    Wall,
    /// Wall that only role A can walk through.
    RoleWallA,
    /// Wall that only role B can walk through.
    RoleWallB,
    Goal,
}

impl TileVariant {
    /// Returns the wall variant passable by `role` alone.
    pub fn role_wall(role: Role) -> TileVariant {
        match role {
            Role::A => TileVariant::RoleWallA,
            Role::B => TileVariant::RoleWallB,
        }
    }
}

/// Decides whether `role` may stand on `tile`.
pub fn can_occupy(tile: TileVariant, role: Role) -> bool {
    match tile {
        TileVariant::Floor | TileVariant::Goal => true,
        TileVariant::Wall => false,
        TileVariant::RoleWallA => role == Role::A,
        TileVariant::RoleWallB => role == Role::B,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passability_table() {
        for role in Role::ALL {
            assert!(can_occupy(TileVariant::Floor, role));
            assert!(can_occupy(TileVariant::Goal, role));
            assert!(!can_occupy(TileVariant::Wall, role));
        }
        assert!(can_occupy(TileVariant::RoleWallA, Role::A));
        assert!(!can_occupy(TileVariant::RoleWallA, Role::B));
        assert!(can_occupy(TileVariant::RoleWallB, Role::B));
        assert!(!can_occupy(TileVariant::RoleWallB, Role::A));
    }

    #[test]
    fn role_wall_matches_role() {
        for role in Role::ALL {
            assert!(can_occupy(TileVariant::role_wall(role), role));
        }
    }
}
