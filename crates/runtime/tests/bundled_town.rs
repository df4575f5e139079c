use std::path::PathBuf;

use game_content::ContentFactory;
use runtime::{RandomProvider, Runtime, RuntimeConfig, TemplateDialogue};

fn content() -> ContentFactory {
    ContentFactory::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../game/content/data"))
}

#[tokio::test(start_paused = true)]
async fn bundled_town_runs_random_rounds() {
    let content = content();
    let map = content.load_map().unwrap();
    let roster = content.load_roster(&map).unwrap();
    let mut config: RuntimeConfig = content.load_config().unwrap();
    config.seed = Some(11);
    config.event_buffer_size = 1_024;

    let residents = roster.len();
    let runtime = Runtime::builder()
        .config(config)
        .map(map)
        .characters(roster)
        .action_provider(RandomProvider::new(11))
        .dialogue_provider(TemplateDialogue::new())
        .build()
        .await
        .unwrap();

    for _ in 0..2 {
        let report = runtime.run_round().await.unwrap();
        assert_eq!(report.steps, 3);
        assert_eq!(report.entries, residents * 3);
    }

    let world = runtime.handle().query_world().await.unwrap();
    assert!(world.queues().all_empty());
    assert!(world.characters().all(|c| !c.has_active_movement()));

    runtime.shutdown().await.unwrap();
}
