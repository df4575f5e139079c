//! Town map loader.
//!
//! The RON file groups waypoints the way level designers think about them
//! (rooms with furniture, free-standing talking areas, walls by orientation);
//! the loader flattens that into a [`SpatialMap`].

use std::path::Path;

use game_core::{SpatialMap, Vec2, WallOrientation, WallSegment, Waypoint, WaypointKind};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};

/// Map data structure for RON files.
#[derive(Debug, Clone, Deserialize)]
struct MapDataRon {
    rooms: Vec<RoomRon>,
    #[serde(default)]
    talking_areas: Vec<PointRon>,
    #[serde(default)]
    walls: WallsRon,
}

#[derive(Debug, Clone, Deserialize)]
struct RoomRon {
    id: String,
    center: Vec2,
    #[serde(default)]
    furniture: Vec<PointRon>,
}

#[derive(Debug, Clone, Deserialize)]
struct PointRon {
    id: String,
    position: Vec2,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WallsRon {
    #[serde(default)]
    horizontal: Vec<(Vec2, Vec2)>,
    #[serde(default)]
    vertical: Vec<(Vec2, Vec2)>,
}

/// Loader for the town map from RON files.
pub struct MapLoader;

impl MapLoader {
    /// Load the map from a RON file.
    pub fn load(path: &Path) -> LoadResult<SpatialMap> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse map RON text.
    ///
    /// Fails when the text is malformed or two waypoints share an id.
    pub fn parse(content: &str) -> LoadResult<SpatialMap> {
        let data: MapDataRon = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse map RON: {}", e))?;

        let mut waypoints = Vec::new();
        for room in data.rooms {
            for item in room.furniture {
                waypoints.push(Waypoint {
                    id: item.id,
                    position: item.position,
                    kind: WaypointKind::Furniture {
                        room: room.id.clone(),
                    },
                });
            }
            waypoints.push(Waypoint {
                kind: WaypointKind::Room {
                    room: room.id.clone(),
                },
                id: room.id,
                position: room.center,
            });
        }
        waypoints.extend(data.talking_areas.into_iter().map(|area| Waypoint {
            id: area.id,
            position: area.position,
            kind: WaypointKind::TalkingArea,
        }));

        let walls = data
            .walls
            .horizontal
            .into_iter()
            .map(|(start, end)| WallSegment::new(start, end, WallOrientation::Horizontal))
            .chain(
                data.walls
                    .vertical
                    .into_iter()
                    .map(|(start, end)| WallSegment::new(start, end, WallOrientation::Vertical)),
            );

        SpatialMap::new(waypoints, walls).map_err(|e| anyhow::anyhow!("Invalid map data: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        (
            rooms: [
                (
                    id: "studio",
                    center: (x: -12.0, z: -12.0),
                    furniture: [
                        (id: "easel", position: (x: -14.0, z: -13.0)),
                    ],
                ),
            ],
            talking_areas: [
                (id: "bench", position: (x: 0.0, z: 6.0)),
            ],
            walls: (
                horizontal: [((x: -20.0, z: -20.0), (x: 20.0, z: -20.0))],
                vertical: [((x: 20.0, z: -20.0), (x: 20.0, z: 20.0))],
            ),
        )
    "#;

    #[test]
    fn flattens_rooms_furniture_and_talking_areas() {
        let map = MapLoader::parse(SAMPLE).unwrap();

        assert_eq!(
            map.list_waypoints().into_iter().collect::<Vec<_>>(),
            vec!["bench", "easel", "studio"]
        );
        assert_eq!(
            map.waypoint("easel").map(|w| &w.kind),
            Some(&WaypointKind::Furniture {
                room: "studio".into()
            })
        );
        assert_eq!(map.resolve("bench"), Some(Vec2::new(0.0, 6.0)));
        assert_eq!(map.walls().len(), 2);
        assert_eq!(map.walls()[1].orientation, WallOrientation::Vertical);
    }

    #[test]
    fn rejects_duplicate_ids_across_groups() {
        let content = r#"
            (
                rooms: [(id: "cafe", center: (x: 0.0, z: 0.0))],
                talking_areas: [(id: "cafe", position: (x: 1.0, z: 1.0))],
            )
        "#;
        let err = MapLoader::parse(content).unwrap_err();
        assert!(err.to_string().contains("cafe"));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MapLoader::load(&dir.path().join("missing.ron")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
