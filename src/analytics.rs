use serde_json::Value;
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsEvent {
    pub name: String,
    pub metadata: Value,
}

#[derive(Debug, Default)]
pub struct Analytics {
    queue: Mutex<Vec<AnalyticsEvent>>,
}

impl Analytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_event(&self, name: &str, metadata: Value) {
        debug!(target: "analytics", event = name, %metadata);
        if let Ok(mut queue) = self.queue.lock() {
            queue.push(AnalyticsEvent {
                name: name.to_string(),
                metadata,
            });
        }
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.queue.lock().map(|q| q.clone()).unwrap_or_default()
    }
}
