use async_trait::async_trait;

use crate::api::{DialogueProvider, DialogueRequest, ProviderError};

const DEFAULT_LINES: &[&str] = &[
    "Hi {listener}, how is your day going?",
    "Pretty good, {listener}. Being a {occupation} keeps me busy.",
    "I've been thinking about {hobby} lately.",
    "We should talk again soon, {listener}.",
];

/// Fills canned lines with the speaker's and listener's details.
///
/// The line is chosen by how many lines the conversation already has, so the
/// same exchange always reads the same way. Placeholders: `{speaker}`,
/// `{listener}`, `{occupation}`, `{hobby}`.
#[derive(Debug, Clone)]
pub struct TemplateDialogue {
    lines: Vec<String>,
}

impl TemplateDialogue {
    pub fn new() -> Self {
        Self::with_lines(DEFAULT_LINES.iter().copied())
    }

    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for TemplateDialogue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DialogueProvider for TemplateDialogue {
    async fn next_line(&self, request: &DialogueRequest) -> Result<String, ProviderError> {
        if self.lines.is_empty() {
            return Err(ProviderError::Exhausted(request.speaker.name.clone()));
        }
        let template = &self.lines[request.history.len() % self.lines.len()];
        Ok(template
            .replace("{speaker}", &request.speaker.name)
            .replace("{listener}", &request.listener.name)
            .replace("{occupation}", &request.speaker.occupation)
            .replace("{hobby}", &request.speaker.hobby))
    }
}
