//! Static town layout: named waypoints and wall segments.
//!
//! The map is loaded once at startup and never mutated, so it can be shared
//! across tasks behind an `Arc` without locking.
use std::collections::{BTreeSet, HashMap};

use crate::config::MovementConfig;
use crate::error::MapError;
use crate::state::Vec2;

/// What a waypoint marks in the source map data.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WaypointKind {
    /// Center point of a room.
    Room { room: String },
    /// A piece of furniture inside a room (chair, easel, piano...).
    Furniture { room: String },
    /// A spot reserved for conversations.
    TalkingArea,
}

/// Named destination on the ground plane.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    pub id: String,
    pub position: Vec2,
    pub kind: WaypointKind,
}

/// Orientation group a wall belongs to in the map data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WallOrientation {
    Horizontal,
    Vertical,
}

/// Straight wall between two points, used only for collision checks.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WallSegment {
    pub start: Vec2,
    pub end: Vec2,
    pub orientation: WallOrientation,
}

impl WallSegment {
    pub fn new(start: Vec2, end: Vec2, orientation: WallOrientation) -> Self {
        Self {
            start,
            end,
            orientation,
        }
    }

    /// Perpendicular distance from `point` to this segment, or `None` when the
    /// foot of the perpendicular falls outside the segment's span.
    pub fn span_distance(&self, point: Vec2) -> Option<f32> {
        let along = self.end - self.start;
        let length_squared = along.length_squared();
        if length_squared <= f32::EPSILON {
            return None;
        }

        let t = (point - self.start).dot(along) / length_squared;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }

        let foot = self.start + along * t;
        Some(point.distance(foot))
    }
}

/// Read-only index over waypoints and walls.
#[derive(Clone, Debug, Default)]
pub struct SpatialMap {
    waypoints: HashMap<String, Waypoint>,
    walls: Vec<WallSegment>,
}

impl SpatialMap {
    /// Builds the index, rejecting duplicate waypoint ids.
    pub fn new(
        waypoints: impl IntoIterator<Item = Waypoint>,
        walls: impl IntoIterator<Item = WallSegment>,
    ) -> Result<Self, MapError> {
        let mut index = HashMap::new();
        for waypoint in waypoints {
            if index.contains_key(&waypoint.id) {
                return Err(MapError::DuplicateWaypoint(waypoint.id));
            }
            index.insert(waypoint.id.clone(), waypoint);
        }

        Ok(Self {
            waypoints: index,
            walls: walls.into_iter().collect(),
        })
    }

    /// Resolves a waypoint id to its ground position.
    pub fn resolve(&self, id: &str) -> Option<Vec2> {
        self.waypoints.get(id).map(|waypoint| waypoint.position)
    }

    pub fn waypoint(&self, id: &str) -> Option<&Waypoint> {
        self.waypoints.get(id)
    }

    /// All waypoint ids, sorted for stable presentation.
    pub fn list_waypoints(&self) -> BTreeSet<&str> {
        self.waypoints.keys().map(String::as_str).collect()
    }

    pub fn waypoints(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.values()
    }

    pub fn walls(&self) -> &[WallSegment] {
        &self.walls
    }

    /// True when `candidate` is closer than the wall clearance to any wall.
    pub fn collides(&self, candidate: Vec2) -> bool {
        self.walls.iter().any(|wall| {
            wall.span_distance(candidate)
                .is_some_and(|distance| distance < MovementConfig::WALL_CLEARANCE)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waypoint(id: &str, x: f32, z: f32) -> Waypoint {
        Waypoint {
            id: id.into(),
            position: Vec2::new(x, z),
            kind: WaypointKind::TalkingArea,
        }
    }

    fn map_with_wall() -> SpatialMap {
        SpatialMap::new(
            [waypoint("fountain", 3.0, 4.0)],
            [WallSegment::new(
                Vec2::new(0.0, 0.0),
                Vec2::new(10.0, 0.0),
                WallOrientation::Horizontal,
            )],
        )
        .unwrap()
    }

    #[test]
    fn resolves_known_waypoints_only() {
        let map = map_with_wall();
        assert_eq!(map.resolve("fountain"), Some(Vec2::new(3.0, 4.0)));
        assert_eq!(map.resolve("library"), None);
        assert_eq!(map.list_waypoints().into_iter().collect::<Vec<_>>(), vec!["fountain"]);
    }

    #[test]
    fn rejects_duplicate_waypoint_ids() {
        let err = SpatialMap::new(
            [waypoint("cafe", 0.0, 0.0), waypoint("cafe", 1.0, 1.0)],
            [],
        )
        .unwrap_err();
        assert_eq!(err, MapError::DuplicateWaypoint("cafe".into()));
    }

    #[test]
    fn collides_within_clearance_of_wall_span() {
        let map = map_with_wall();
        assert!(map.collides(Vec2::new(5.0, 0.4)));
        assert!(map.collides(Vec2::new(0.0, -0.3)));
        assert!(!map.collides(Vec2::new(5.0, 0.6)));
    }

    #[test]
    fn ignores_points_beyond_segment_ends() {
        let map = map_with_wall();
        // Close to the infinite line but past the segment's end point.
        assert!(!map.collides(Vec2::new(10.3, 0.1)));
        assert!(!map.collides(Vec2::new(-0.2, 0.0)));
    }

    #[test]
    fn zero_length_walls_never_collide() {
        let map = SpatialMap::new(
            [],
            [WallSegment::new(
                Vec2::new(1.0, 1.0),
                Vec2::new(1.0, 1.0),
                WallOrientation::Vertical,
            )],
        )
        .unwrap();
        assert!(!map.collides(Vec2::new(1.0, 1.0)));
    }
}
