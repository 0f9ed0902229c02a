//! Map grid: tile occupancy and the enemy path.

use rampart_core::config::MapLayout;
use rampart_core::enums::TileKind;
use rampart_core::error::{ConfigError, SimError};
use rampart_core::types::{Point, TileCoord};

#[derive(Debug, Clone)]
pub struct GameMap {
    width: usize,
    height: usize,
    tiles: Vec<TileKind>,
    path: Vec<Point>,
}

impl GameMap {
    pub fn from_layout(layout: &MapLayout) -> Result<Self, ConfigError> {
        let parsed = layout.parse_tiles()?;
        if layout.path.is_empty() {
            return Err(ConfigError::EmptyPath);
        }
        Ok(Self {
            width: parsed.width,
            height: parsed.height,
            tiles: parsed.tiles,
            path: layout.path.iter().map(TileCoord::center).collect(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Waypoints in world coordinates, spawn point first.
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
    }

    pub fn tile(&self, x: i32, y: i32) -> Result<TileKind, SimError> {
        self.index(x, y)
            .map(|i| self.tiles[i])
            .ok_or(SimError::TileOutOfBounds { x, y })
    }

    pub fn set_tile(&mut self, x: i32, y: i32, kind: TileKind) -> Result<(), SimError> {
        let i = self.index(x, y).ok_or(SimError::TileOutOfBounds { x, y })?;
        self.tiles[i] = kind;
        Ok(())
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }
}

#[cfg(test)]
mod tests {
    use rampart_core::config::GameConfig;
    use rampart_core::constants::TILE_SIZE;
    use rampart_core::enums::TowerKind;

    use super::*;

    fn default_map() -> GameMap {
        GameMap::from_layout(&GameConfig::default().map).unwrap()
    }

    #[test]
    fn parses_default_layout() {
        let map = default_map();
        assert_eq!((map.width(), map.height()), (12, 8));
        assert_eq!(map.tile(0, 0), Ok(TileKind::Blocked));
        assert_eq!(map.tile(0, 1), Ok(TileKind::Path));
        assert_eq!(map.tile(4, 3), Ok(TileKind::Buildable));
        assert_eq!(map.path().len(), 5);
        assert_eq!(map.path()[0], TileCoord::new(0, 1).center());
        assert_eq!(map.path()[0].x, TILE_SIZE / 2.0);
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let mut map = default_map();
        assert_eq!(
            map.tile(12, 0),
            Err(SimError::TileOutOfBounds { x: 12, y: 0 })
        );
        assert_eq!(
            map.tile(-1, 3),
            Err(SimError::TileOutOfBounds { x: -1, y: 3 })
        );
        assert!(map.set_tile(0, 8, TileKind::Blocked).is_err());
        assert!(!map.in_bounds(0, 8));
    }

    #[test]
    fn tiles_can_be_marked() {
        let mut map = default_map();
        let marker = TileKind::Tower {
            kind: TowerKind::Archer,
            level: 1,
        };
        map.set_tile(4, 3, marker).unwrap();
        assert_eq!(map.tile(4, 3), Ok(marker));
    }
}
