#![allow(dead_code)]

use std::time::Duration;

use tokio::sync::broadcast;

use game_core::{
    Character, CharacterId, SpatialMap, Vec2, WallSegment, Waypoint, WaypointKind,
};
use runtime::{
    ActionProvider, Event, ProposedAction, Runtime, RuntimeConfig, SchedulerConfig, Topic,
};

pub const MONET: CharacterId = CharacterId(1);
pub const SWIFT: CharacterId = CharacterId(2);
pub const CURIE: CharacterId = CharacterId(3);

fn room(id: &str, x: f32, z: f32) -> Waypoint {
    Waypoint {
        id: id.to_string(),
        position: Vec2::new(x, z),
        kind: WaypointKind::Room {
            room: id.to_string(),
        },
    }
}

/// Open square with four rooms and no walls.
pub fn town_map() -> SpatialMap {
    SpatialMap::new(
        [
            room("plaza", 0.0, 0.0),
            room("cafe", 6.0, 0.0),
            room("library", -6.0, 0.0),
            room("studio", 0.0, 6.0),
        ],
        Vec::<WallSegment>::new(),
    )
    .expect("fixture map has unique waypoints")
}

pub fn residents() -> Vec<Character> {
    vec![
        Character::new(MONET, "Monet", Vec2::new(0.0, 0.0)).with_clips(["Paint"]),
        Character::new(SWIFT, "Swift", Vec2::new(4.0, 0.0)).with_clips(["Sing"]),
        Character::new(CURIE, "Curie", Vec2::new(-4.0, 0.0)).with_clips(["Think"]),
    ]
}

/// Short timings so rounds stay small under the paused clock.
pub fn fast_config() -> RuntimeConfig {
    RuntimeConfig {
        scheduler: SchedulerConfig {
            animation_ms: 500,
            talk_min_ms: 1_000,
            talk_max_ms: 1_000,
            wander_ms: 400,
            goto_timeout_ms: 10_000,
            auto_run_idle_ms: 200,
            dialogue_turns: 2,
            dialogue_pause_ms: 100,
            ..SchedulerConfig::default()
        },
        event_buffer_size: 1_024,
        seed: Some(7),
        ..RuntimeConfig::default()
    }
}

pub async fn runtime_with(provider: impl ActionProvider + 'static) -> Runtime {
    Runtime::builder()
        .config(fast_config())
        .map(town_map())
        .characters(residents())
        .action_provider(provider)
        .build()
        .await
        .expect("runtime builds")
}

pub fn waves() -> Vec<ProposedAction> {
    vec![
        ProposedAction::animation("Wave"),
        ProposedAction::animation("Wave"),
        ProposedAction::animation("Wave"),
    ]
}

/// Everything buffered on `rx` right now.
pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn notice_messages(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Notice(notice) => Some(notice.message.clone()),
            _ => None,
        })
        .collect()
}

pub fn subscribe_notices(runtime: &Runtime) -> broadcast::Receiver<Event> {
    runtime.subscribe(Topic::Notice)
}

pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
