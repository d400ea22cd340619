//! Shared test utilities for oaib core integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use oaib_abstraction::{ChatMessage, GenerationClient, ModelError, ModelParameters, ModelResponse};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What the client does for one prompt.
#[derive(Debug, Clone)]
pub struct Script {
    pub delay: Duration,
    pub reply: Result<String, ModelError>,
}

/// A generation client driven by per-prompt scripts.
///
/// Prompts without a script are echoed back after `default_delay`. The client
/// records how many calls are in flight, the peak of that number, and a
/// `start:`/`end:` log of calls in the order they happened.
pub struct ScriptedClient {
    scripts: HashMap<String, Script>,
    default_delay: Duration,
    calls: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
    log: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            default_delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn reply(mut self, prompt: &str, delay: Duration, text: &str) -> Self {
        self.scripts
            .insert(prompt.to_string(), Script { delay, reply: Ok(text.to_string()) });
        self
    }

    pub fn fail(mut self, prompt: &str, error: ModelError) -> Self {
        self.scripts
            .insert(prompt.to_string(), Script { delay: Duration::ZERO, reply: Err(error) });
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl Default for ScriptedClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight counter even when the call is dropped by a timeout.
struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        _parameters: &ModelParameters,
    ) -> Result<ModelResponse, ModelError> {
        let prompt = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_active, Ordering::SeqCst);
        let _guard = ActiveGuard(&self.active);
        self.log.lock().unwrap().push(format!("start:{prompt}"));

        let script = self.scripts.get(&prompt).cloned().unwrap_or(Script {
            delay: self.default_delay,
            reply: Ok(prompt.clone()),
        });
        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }

        self.log.lock().unwrap().push(format!("end:{prompt}"));
        script.reply.map(|text| ModelResponse::from_text(text).with_model_id("scripted"))
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}

/// Items with one user turn each.
pub fn prompts(texts: &[&str]) -> Vec<oaib_core::BatchItem> {
    texts.iter().map(|text| oaib_core::BatchItem::from_prompt(*text)).collect()
}

/// Post-processor returning the length of the generated text.
pub async fn text_len(response: ModelResponse) -> anyhow::Result<usize> {
    Ok(response.content.chars().count())
}

/// Post-processor extracting the number between `<count>` tags.
pub async fn parse_count(response: ModelResponse) -> anyhow::Result<u64> {
    let text = response.content;
    let start = text.find("<count>").ok_or_else(|| anyhow::anyhow!("No <count> tags found"))?;
    let rest = &text[start + "<count>".len()..];
    let end = rest.find("</count>").ok_or_else(|| anyhow::anyhow!("No <count> tags found"))?;
    Ok(rest[..end].trim().parse()?)
}
