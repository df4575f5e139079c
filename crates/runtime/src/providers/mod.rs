//! Built-in provider implementations.
//!
//! None of these talk to a network service: [`ScriptedProvider`] replays
//! fixed responses for tests and demos, [`RandomProvider`] picks valid actions
//! from the request, and [`TemplateDialogue`] fills canned lines.

mod random;
mod scripted;
mod template;

pub use random::RandomProvider;
pub use scripted::ScriptedProvider;
pub use template::TemplateDialogue;
