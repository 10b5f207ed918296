//! Keystroke debouncing for the search field.

use std::time::{Duration, Instant};

/// Quiet period after the last keystroke before the query fires.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

#[derive(Debug)]
struct Pending {
    text: String,
    due_at: Instant,
}

/// Coalesces a burst of search-term edits into one effective query.
///
/// Clock-injected and poll-driven: the caller passes `now` and polls once
/// per frame, so there are no timers to cancel and the quiet period is
/// unit-testable. At most one query is pending at any time.
#[derive(Debug)]
pub struct SearchDebouncer {
    quiet: Duration,
    pending: Option<Pending>,
}

impl SearchDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Record a keystroke: re-arms the single pending query with the new
    /// text and a fresh deadline.
    pub fn on_input(&mut self, text: &str, now: Instant) {
        self.pending = Some(Pending {
            text: text.to_string(),
            due_at: now + self.quiet,
        });
    }

    /// Explicit search action: cancels any pending query and returns the
    /// term for an immediate refresh.
    pub fn on_explicit_search(&mut self, text: &str) -> String {
        self.pending = None;
        text.to_string()
    }

    /// Reset action: cancels any pending query and returns the empty term
    /// for an immediate refresh.
    pub fn on_reset(&mut self) -> String {
        self.pending = None;
        String::new()
    }

    /// Yield the settled term once the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        if self.pending.as_ref().is_some_and(|p| now >= p.due_at) {
            return self.pending.take().map(|p| p.text);
        }
        None
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(300);

    #[test]
    fn burst_of_keystrokes_yields_one_query_with_last_text() {
        let mut debouncer = SearchDebouncer::new(QUIET);
        let t0 = Instant::now();

        debouncer.on_input("f", t0);
        debouncer.on_input("fi", t0 + Duration::from_millis(50));
        debouncer.on_input("fir", t0 + Duration::from_millis(100));
        debouncer.on_input("fire", t0 + Duration::from_millis(150));

        // Still inside the quiet window of the last keystroke.
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(400)), None);

        let settled = debouncer.poll(t0 + Duration::from_millis(450));
        assert_eq!(settled.as_deref(), Some("fire"));

        // Exactly one query per quiet period.
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(900)), None);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn keystroke_rearms_the_deadline() {
        let mut debouncer = SearchDebouncer::new(QUIET);
        let t0 = Instant::now();

        debouncer.on_input("a", t0);
        // A later keystroke pushes the deadline past the first one.
        debouncer.on_input("ab", t0 + Duration::from_millis(200));
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(350)), None);
        assert_eq!(
            debouncer.poll(t0 + Duration::from_millis(500)).as_deref(),
            Some("ab")
        );
    }

    #[test]
    fn explicit_search_cancels_pending_and_fires_immediately() {
        let mut debouncer = SearchDebouncer::new(QUIET);
        let t0 = Instant::now();

        debouncer.on_input("part", t0);
        assert_eq!(debouncer.on_explicit_search("full"), "full");
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn reset_cancels_pending_and_clears_the_term() {
        let mut debouncer = SearchDebouncer::new(QUIET);
        let t0 = Instant::now();

        debouncer.on_input("part", t0);
        assert_eq!(debouncer.on_reset(), "");
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn poll_exactly_at_deadline_fires() {
        let mut debouncer = SearchDebouncer::new(QUIET);
        let t0 = Instant::now();
        debouncer.on_input("x", t0);
        assert_eq!(debouncer.poll(t0 + QUIET).as_deref(), Some("x"));
    }
}
