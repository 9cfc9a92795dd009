use tokio::time::Instant;

/// Append-only log of item responses with display-to-action latency.
///
/// Exactly one item is outstanding at a time: `present` opens it and `record`
/// (or `dismiss`) closes it. Responses keep presentation order.
#[derive(Debug, Clone)]
pub struct ResponseRecorder<R> {
    shown_at: Option<Instant>,
    responses: Vec<R>,
}

impl<R> Default for ResponseRecorder<R> {
    fn default() -> Self {
        Self {
            shown_at: None,
            responses: Vec::new(),
        }
    }
}

impl<R> ResponseRecorder<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an item as displayed. Returns false if another item is still open.
    pub fn present(&mut self, now: Instant) -> bool {
        if self.shown_at.is_some() {
            return false;
        }
        self.shown_at = Some(now);
        true
    }

    pub fn is_awaiting(&self) -> bool {
        self.shown_at.is_some()
    }

    /// Closes the open item. `build` receives the latency in milliseconds.
    pub fn record<F>(&mut self, now: Instant, build: F) -> Option<&R>
    where
        F: FnOnce(u64) -> R,
    {
        let shown_at = self.shown_at.take()?;
        let latency_ms = now.saturating_duration_since(shown_at).as_millis() as u64;
        self.responses.push(build(latency_ms));
        self.responses.last()
    }

    /// Closes the open item without a record.
    pub fn dismiss(&mut self) -> bool {
        self.shown_at.take().is_some()
    }

    pub fn responses(&self) -> &[R] {
        &self.responses
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn into_responses(self) -> Vec<R> {
        self.responses
    }
}
