mod common;

use game_core::{ActionQueueEntry, QueueError};
use runtime::{ProposedAction, RuntimeError, ScriptedProvider};

use common::*;

#[tokio::test(start_paused = true)]
async fn a_short_response_discards_the_whole_round() {
    let provider = ScriptedProvider::new()
        .respond("Monet", waves())
        .respond(
            "Swift",
            vec![ProposedAction::Wander, ProposedAction::goto("cafe")],
        )
        .respond("Curie", waves());
    let runtime = runtime_with(provider).await;
    let mut notices = subscribe_notices(&runtime);

    let result = runtime.generate_round().await;

    assert!(matches!(
        result,
        Err(RuntimeError::GenerationIncomplete { character, .. }) if character == SWIFT
    ));
    let world = runtime.handle().query_world().await.unwrap();
    assert!(world.queues().all_empty());
    let messages = notice_messages(&drain(&mut notices));
    assert!(messages.iter().any(|m| m.starts_with("Action generation failed")));

    runtime.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn provider_failure_and_bad_targets_abort_generation() {
    let provider = ScriptedProvider::new()
        .repeat("Monet", waves())
        .repeat("Swift", waves())
        .fail("Curie", "oracle unreachable")
        .respond(
            "Curie",
            vec![
                ProposedAction::talk_to("Nobody"),
                ProposedAction::Wander,
                ProposedAction::Wander,
            ],
        )
        .respond(
            "Curie",
            vec![
                ProposedAction::talk_to("curie"),
                ProposedAction::Wander,
                ProposedAction::Wander,
            ],
        );
    let runtime = runtime_with(provider).await;

    for _ in 0..3 {
        let result = runtime.generate_round().await;
        assert!(matches!(
            result,
            Err(RuntimeError::GenerationIncomplete { character, .. }) if character == CURIE
        ));
    }
    let world = runtime.handle().query_world().await.unwrap();
    assert!(world.queues().all_empty());

    runtime.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn raw_oracle_payload_is_accepted() {
    let provider = ScriptedProvider::new()
        .respond_json(
            "Monet",
            r#"{"actions":[{"type":"goto","checkpoint":"cafe"},{"type":"animation","animation":"Paint"},{"type":"talkTo","targetName":"swift"}]}"#,
        )
        .respond("Swift", waves())
        .respond("Curie", waves());
    let runtime = runtime_with(provider).await;

    let summary = runtime.generate_round().await.unwrap();

    assert_eq!(summary.characters, 3);
    assert!(summary.conflicts.is_empty());
    let world = runtime.handle().query_world().await.unwrap();
    assert_eq!(
        world.queues().get(MONET).unwrap().entries(),
        &[
            ActionQueueEntry::goto("cafe"),
            ActionQueueEntry::animation("Paint"),
            ActionQueueEntry::talk_to(SWIFT),
        ]
    );

    runtime.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn later_initiator_loses_a_contested_target() {
    let contested = vec![
        ProposedAction::talk_to("Curie"),
        ProposedAction::animation("Wave"),
        ProposedAction::Wander,
    ];
    let provider = ScriptedProvider::new()
        .respond("Monet", contested.clone())
        .respond("Swift", contested)
        .respond("Curie", waves());
    let runtime = runtime_with(provider).await;
    let mut notices = subscribe_notices(&runtime);

    let summary = runtime.generate_round().await.unwrap();

    assert_eq!(summary.conflicts.len(), 1);
    let conflict = &summary.conflicts[0];
    assert_eq!(conflict.character, SWIFT);
    assert_eq!(conflict.claimed_by, MONET);
    assert_eq!(conflict.target, CURIE);

    let world = runtime.handle().query_world().await.unwrap();
    let monet = world.queues().get(MONET).unwrap();
    let swift = world.queues().get(SWIFT).unwrap();
    assert_eq!(monet.get(0), Some(&ActionQueueEntry::talk_to(CURIE)));
    assert_eq!(
        swift.get(0),
        Some(&ActionQueueEntry::animation(conflict.replacement.clip()))
    );

    let messages = notice_messages(&drain(&mut notices));
    assert!(
        messages
            .iter()
            .any(|m| m.starts_with("Swift wanted to talk to Curie, but Monet already will"))
    );

    runtime.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn a_round_that_does_not_fit_is_rejected_atomically() {
    let provider = ScriptedProvider::new()
        .repeat("Monet", waves())
        .repeat("Swift", waves())
        .repeat("Curie", waves());
    let runtime = runtime_with(provider).await;
    let handle = runtime.handle();
    handle.add_action(SWIFT, ActionQueueEntry::Wander).await.unwrap();

    let result = runtime.generate_round().await;

    assert!(matches!(
        result,
        Err(RuntimeError::Queue(QueueError::QueueFull { character, .. })) if character == SWIFT
    ));
    let world = handle.query_world().await.unwrap();
    assert!(world.queues().get(MONET).unwrap().is_empty());
    assert_eq!(world.queues().get(SWIFT).unwrap().len(), 1);

    runtime.shutdown().await.unwrap();
}
