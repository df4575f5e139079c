//! Headless town client.
//!
//! Composition root that loads the town content, builds the runtime with the
//! offline providers, and either runs a fixed number of rounds or leaves the
//! auto-run loop going until Ctrl-C. Notices and dialogue lines are logged.
//!
//! ```bash
//! TOWN_ROUNDS=3 TOWN_SEED=7 cargo run -p town-client
//! TOWN_AUTO_RUN=true RUST_LOG=runtime=debug cargo run -p town-client
//! ```

mod config;

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use game_content::{ConfigLoader, ContentFactory};
use runtime::{
    ConversationEvent, Event, NoticeLevel, RandomProvider, Runtime, RuntimeConfig, RuntimeHandle,
    TemplateDialogue, Topic,
};

use crate::config::ClientConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let client = ClientConfig::from_env();
    let content = ContentFactory::new(&client.data_dir);

    let map = content
        .load_map()
        .with_context(|| format!("loading map from {}", content.data_dir().display()))?;
    let roster = content.load_roster(&map)?;
    let mut tuning: RuntimeConfig = ConfigLoader::load(&client.tuning_path())?;
    if client.seed.is_some() {
        tuning.seed = client.seed;
    }

    let actions = match tuning.seed {
        Some(seed) => RandomProvider::new(seed),
        None => RandomProvider::from_entropy(),
    };

    tracing::info!(
        characters = roster.len(),
        waypoints = map.list_waypoints().len(),
        auto_run = client.auto_run,
        "starting town"
    );

    let runtime = Runtime::builder()
        .config(tuning)
        .map(map)
        .characters(roster)
        .action_provider(actions)
        .dialogue_provider(TemplateDialogue::new())
        .build()
        .await?;

    let reporter = tokio::spawn(report(runtime.handle()));

    if client.auto_run {
        runtime.handle().set_auto_run(true).await?;
        tokio::signal::ctrl_c().await?;
        tracing::info!("stopping");
    } else {
        for round in 1..=client.rounds {
            match runtime.run_round().await {
                Ok(report) => tracing::info!(
                    round,
                    entries = report.entries,
                    failed = report.failed,
                    "round done"
                ),
                Err(err) => tracing::warn!(round, error = %err, "round skipped"),
            }
        }
    }

    runtime.shutdown().await?;
    reporter.abort();
    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Logs notices and dialogue lines until the runtime goes away.
async fn report(handle: RuntimeHandle) {
    let world = handle.query_world().await.ok();
    let name = |id| {
        world
            .as_ref()
            .and_then(|w| w.character(id))
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    let mut topics = handle.subscribe_multiple(&[Topic::Notice, Topic::Conversation]);
    let (Some(mut notices), Some(mut conversations)) = (
        topics.remove(&Topic::Notice),
        topics.remove(&Topic::Conversation),
    ) else {
        return;
    };

    loop {
        let received = tokio::select! {
            event = notices.recv() => event,
            event = conversations.recv() => event,
        };
        match received {
            Ok(Event::Notice(notice)) => match notice.level {
                NoticeLevel::Info => tracing::info!(target: "town", "{}", notice.message),
                NoticeLevel::Warning => tracing::warn!(target: "town", "{}", notice.message),
                NoticeLevel::Error => tracing::error!(target: "town", "{}", notice.message),
            },
            Ok(Event::Conversation(ConversationEvent::Line { line, .. })) => {
                tracing::info!(target: "town", "{}: {}", name(line.speaker), line.text);
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(target: "town", skipped, "event reporter lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
