use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::api::{ActionProvider, ActionRequest, ProposedAction, ProviderError};

#[derive(Debug, Clone)]
enum Reply {
    Actions(Vec<ProposedAction>),
    /// Raw oracle payload, parsed when served.
    Json(String),
    Fail(String),
}

#[derive(Debug, Default)]
struct Script {
    queued: VecDeque<Reply>,
    fallback: Option<Reply>,
}

/// Replays fixed responses per character name.
///
/// Queued replies are served in order; once they run out the `repeat` reply,
/// if any, is served forever. Names match case-insensitively.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    scripts: Mutex<HashMap<String, Script>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&mut self, name: &str) -> &mut Script {
        self.scripts
            .get_mut()
            .entry(name.to_lowercase())
            .or_default()
    }

    fn push(mut self, name: &str, reply: Reply) -> Self {
        self.script(name).queued.push_back(reply);
        self
    }

    pub fn respond(self, name: &str, actions: Vec<ProposedAction>) -> Self {
        self.push(name, Reply::Actions(actions))
    }

    pub fn respond_json(self, name: &str, payload: impl Into<String>) -> Self {
        self.push(name, Reply::Json(payload.into()))
    }

    pub fn fail(self, name: &str, reason: impl Into<String>) -> Self {
        self.push(name, Reply::Fail(reason.into()))
    }

    /// Serves `actions` whenever the queued replies for `name` are used up.
    pub fn repeat(mut self, name: &str, actions: Vec<ProposedAction>) -> Self {
        self.script(name).fallback = Some(Reply::Actions(actions));
        self
    }

    /// Number of requests served so far, failures included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ActionProvider for ScriptedProvider {
    async fn propose_actions(
        &self,
        request: &ActionRequest,
    ) -> Result<Vec<ProposedAction>, ProviderError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let name = &request.character.name;

        let reply = {
            let mut scripts = self.scripts.lock().await;
            let script = scripts
                .get_mut(&name.to_lowercase())
                .ok_or_else(|| ProviderError::Exhausted(name.clone()))?;
            script
                .queued
                .pop_front()
                .or_else(|| script.fallback.clone())
                .ok_or_else(|| ProviderError::Exhausted(name.clone()))?
        };

        match reply {
            Reply::Actions(actions) => Ok(actions),
            Reply::Json(payload) => ProposedAction::parse_list(&payload),
            Reply::Fail(reason) => Err(ProviderError::Request(reason)),
        }
    }
}
