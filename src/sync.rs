//! Filter-and-render synchronization loop.
//!
//! `FilterSync` owns the filter criteria and the page view model. Input
//! edits either schedule a debounced refresh (free text) or refresh right
//! away (selects). A refresh snapshots the criteria, spawns the request and
//! later applies the response to the results container, carrying the
//! checked cards over to the new list.
//!
//! Every refresh gets a new generation number. Only the completion of the
//! latest generation touches the page; older ones are cancelled through
//! their token and discarded if they still arrive.

use crate::api::{EmployeeSource, FetchError, FilterPage};
use crate::filter::{FilterCriteria, FilterField};
use crate::render;
use crate::view::Page;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Debounce window for the search field.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Result of one request, tagged with the generation that issued it.
#[derive(Debug)]
pub struct Completion {
    generation: u64,
    result: Result<FilterPage, FetchError>,
}

/// What applying a completion did to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// New list rendered
    Rendered { count: usize, restored: usize },
    /// Error notice shown; holds the unescaped error text
    Failed(String),
    /// Superseded response, page untouched
    Stale { generation: u64 },
}

/// The request currently awaited.
#[derive(Debug)]
struct InFlight {
    generation: u64,
    cancel: CancellationToken,
}

/// Filter state, debounce timer and request sequencing for the employees page.
#[derive(Debug)]
pub struct FilterSync<S: EmployeeSource> {
    source: S,
    criteria: FilterCriteria,
    page: Page,
    debounce: Duration,
    /// Time of the last debounced edit, if a refresh is pending
    pending_since: Option<Instant>,
    generation: u64,
    in_flight: Option<InFlight>,
    completions_tx: UnboundedSender<Completion>,
    completions_rx: UnboundedReceiver<Completion>,
}

impl<S: EmployeeSource> FilterSync<S> {
    /// Create the loop bound to a fresh page.
    ///
    /// # Arguments
    /// * `source` - Where filter queries are sent
    /// * `debounce` - Window for collapsing search keystrokes
    /// * `initial` - Criteria to start with; passed through the controls, so
    ///   free text is stripped before the first query
    pub fn new(source: S, debounce: Duration, initial: FilterCriteria) -> Self {
        let (completions_tx, completions_rx) = unbounded_channel();
        let mut page = Page::default();
        let mut criteria = FilterCriteria::default();
        for field in FilterField::ALL {
            let value = page.controls.input(field, initial.get(field));
            criteria.set(field, value);
        }
        Self {
            source,
            criteria,
            page,
            debounce,
            pending_since: None,
            generation: 0,
            in_flight: None,
            completions_tx,
            completions_rx,
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Mutable page access for checkbox changes made by the user.
    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn is_debounce_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Generation of the most recent refresh (0 before the first).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply an edit to one filter field.
    ///
    /// # Arguments
    /// * `field` - Edited field
    /// * `value` - New raw value from the control
    /// * `now` - Time of the edit
    ///
    /// # Details
    /// The search field restarts the debounce window, so only the last edit
    /// in a burst leads to a request. Select fields refresh immediately.
    pub fn update_field(&mut self, field: FilterField, value: &str, now: Instant) {
        let value = self.page.controls.input(field, value);
        self.criteria.set(field, value);

        if field.is_free_text() {
            debug!(field = field.param(), "debounce restarted");
            self.pending_since = Some(now);
        } else {
            self.refresh();
        }
    }

    /// Fire the debounced refresh if its window has elapsed.
    ///
    /// # Returns
    /// * `bool` - True if a refresh was issued
    pub fn poll_timers(&mut self, now: Instant) -> bool {
        match self.pending_since {
            Some(since) if now.duration_since(since) >= self.debounce => {
                self.refresh();
                true
            }
            _ => false,
        }
    }

    /// Issue a request for the current criteria.
    ///
    /// # Details
    /// Marks the container as loading, cancels the previous in-flight request
    /// and clears any pending debounce (the new request already carries the
    /// latest search text). The response is applied later by
    /// `poll_completions` or `next_completion`.
    pub fn refresh(&mut self) {
        self.pending_since = None;
        self.generation += 1;
        let generation = self.generation;

        if let Some(previous) = self.in_flight.take() {
            debug!(generation = previous.generation, "cancelling superseded request");
            previous.cancel.cancel();
        }

        self.page.container.set_loading(true);
        debug!(generation, query = ?self.criteria.query_pairs(), "refreshing employees");

        let request = self.source.fetch(&self.criteria);
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => Err(FetchError::Cancelled),
                result = request => result,
            };
            // The loop may already be gone on shutdown.
            let _ = tx.send(Completion { generation, result });
        });

        self.in_flight = Some(InFlight { generation, cancel });
    }

    /// Clear every filter and refresh immediately.
    pub fn reset(&mut self) {
        self.criteria.clear();
        self.page.controls.clear();
        self.refresh();
    }

    /// Apply every completion that has already arrived.
    pub fn poll_completions(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        while let Ok(completion) = self.completions_rx.try_recv() {
            outcomes.push(self.apply(completion));
        }
        outcomes
    }

    /// Wait for the next completion and apply it.
    ///
    /// # Returns
    /// * `Option<Outcome>` - None if nothing is in flight or queued
    pub async fn next_completion(&mut self) -> Option<Outcome> {
        if self.in_flight.is_none() {
            let completion = self.completions_rx.try_recv().ok()?;
            return Some(self.apply(completion));
        }
        let completion = self.completions_rx.recv().await?;
        Some(self.apply(completion))
    }

    fn apply(&mut self, completion: Completion) -> Outcome {
        if completion.generation != self.generation {
            debug!(
                generation = completion.generation,
                latest = self.generation,
                "discarding superseded response"
            );
            return Outcome::Stale {
                generation: completion.generation,
            };
        }
        self.in_flight = None;

        let outcome = match completion.result {
            Ok(page) => self.render_page(page),
            Err(err) => {
                warn!(error = %err, "employee filter failed");
                let message = err.to_string();
                self.page.container.show_error(message.clone());
                Outcome::Failed(message)
            }
        };

        self.page.container.set_loading(false);
        outcome
    }

    fn render_page(&mut self, page: FilterPage) -> Outcome {
        let container = &mut self.page.container;
        let selection = container.selection();
        container.replace_list(page.employees);
        let restored = container.restore_selection(&selection);

        self.page.count_label = render::count_label(page.count);
        self.page.tooltips.init(&self.page.container);

        info!(count = page.count, restored, "employees rendered");
        Outcome::Rendered {
            count: page.count,
            restored,
        }
    }
}

impl<S: EmployeeSource> Drop for FilterSync<S> {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Availability, EmployeeId, EmployeeRecord};
    use crate::view::{Notice, SelectionSet};
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::{Arc, Mutex};
    use tokio::sync::oneshot;

    enum Reply {
        Ready(Result<FilterPage, FetchError>),
        Gated(oneshot::Receiver<Result<FilterPage, FetchError>>),
    }

    /// Records every query and answers from a script.
    #[derive(Clone, Default)]
    struct ScriptedSource {
        queries: Arc<Mutex<Vec<Vec<(String, String)>>>>,
        replies: Arc<Mutex<VecDeque<Reply>>>,
    }

    impl ScriptedSource {
        fn reply(&self, reply: Reply) {
            self.replies.lock().unwrap().push_back(reply);
        }

        fn reply_with(&self, ids: &[&str]) {
            self.reply(Reply::Ready(Ok(page(ids))));
        }

        fn queries(&self) -> Vec<Vec<(String, String)>> {
            self.queries.lock().unwrap().clone()
        }
    }

    impl EmployeeSource for ScriptedSource {
        fn fetch(
            &self,
            criteria: &FilterCriteria,
        ) -> impl Future<Output = Result<FilterPage, FetchError>> + Send + 'static {
            let query = criteria
                .query_pairs()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            self.queries.lock().unwrap().push(query);
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Reply::Ready(Ok(FilterPage::default())));
            async move {
                match reply {
                    Reply::Ready(result) => result,
                    Reply::Gated(rx) => rx.await.unwrap_or(Err(FetchError::Cancelled)),
                }
            }
        }
    }

    fn page(ids: &[&str]) -> FilterPage {
        FilterPage::new(
            ids.iter()
                .map(|id| {
                    EmployeeRecord::sample(id, &format!("Employee {}", id), Availability::Free)
                })
                .collect(),
        )
    }

    fn ids(ids: &[&str]) -> SelectionSet {
        ids.iter().map(|id| EmployeeId::new(*id)).collect()
    }

    fn sync(source: &ScriptedSource) -> FilterSync<ScriptedSource> {
        FilterSync::new(source.clone(), DEFAULT_DEBOUNCE, FilterCriteria::default())
    }

    fn check(sync: &mut FilterSync<ScriptedSource>, id: &str) {
        assert!(sync.page_mut().container.on_change(&EmployeeId::new(id), true));
    }

    #[tokio::test]
    async fn test_search_burst_fires_one_request_with_final_value() {
        let source = ScriptedSource::default();
        let mut sync = sync(&source);
        let t0 = Instant::now();

        sync.update_field(FilterField::Search, "I", t0);
        sync.update_field(FilterField::Search, "Iv", t0 + Duration::from_millis(100));
        sync.update_field(FilterField::Search, "Iva", t0 + Duration::from_millis(200));
        assert!(source.queries().is_empty());

        assert!(!sync.poll_timers(t0 + Duration::from_millis(450)));
        assert!(source.queries().is_empty());

        assert!(sync.poll_timers(t0 + Duration::from_millis(500)));
        assert!(!sync.poll_timers(t0 + Duration::from_millis(900)));

        let queries = source.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0], vec![("search".to_string(), "Iva".to_string())]);
    }

    #[tokio::test]
    async fn test_search_input_is_stripped() {
        let source = ScriptedSource::default();
        let mut sync = sync(&source);
        let t0 = Instant::now();

        sync.update_field(FilterField::Search, "Iv<script>x</script>an", t0);
        assert_eq!(sync.criteria().search, "Ivan");
        assert_eq!(sync.page().controls.value(FilterField::Search), "Ivan");
    }

    #[tokio::test]
    async fn test_select_change_refreshes_immediately() {
        let source = ScriptedSource::default();
        let mut sync = sync(&source);

        sync.update_field(FilterField::Position, "Mechanic", Instant::now());
        let queries = source.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0], vec![("position".to_string(), "Mechanic".to_string())]);
        assert!(sync.is_in_flight());
        assert_eq!(sync.generation(), 1);
    }

    #[tokio::test]
    async fn test_select_change_carries_pending_search_text() {
        let source = ScriptedSource::default();
        let mut sync = sync(&source);
        let t0 = Instant::now();

        sync.update_field(FilterField::Search, "Pet", t0);
        sync.update_field(FilterField::Availability, "free", t0);
        assert!(!sync.is_debounce_pending());
        assert!(!sync.poll_timers(t0 + Duration::from_secs(1)));

        let queries = source.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(
            queries[0],
            vec![
                ("search".to_string(), "Pet".to_string()),
                ("availability".to_string(), "free".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_reset_clears_fields_and_fires_one_empty_query() {
        let source = ScriptedSource::default();
        let mut sync = sync(&source);
        let t0 = Instant::now();

        sync.update_field(FilterField::Position, "Mechanic", t0);
        sync.update_field(FilterField::Schedule, "2/2", t0);
        sync.update_field(FilterField::Search, "Iv", t0);
        let before = source.queries().len();

        sync.reset();
        assert!(sync.criteria().is_empty());
        assert!(FilterField::ALL
            .iter()
            .all(|f| sync.page().controls.value(*f).is_empty()));
        assert!(!sync.poll_timers(t0 + Duration::from_secs(1)));

        let queries = source.queries();
        assert_eq!(queries.len(), before + 1);
        assert!(queries.last().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_selection_survives_rerender() {
        let source = ScriptedSource::default();
        let mut sync = sync(&source);

        source.reply_with(&["A", "B", "C"]);
        sync.refresh();
        assert_eq!(
            sync.next_completion().await,
            Some(Outcome::Rendered { count: 3, restored: 0 })
        );
        check(&mut sync, "A");
        check(&mut sync, "B");
        check(&mut sync, "C");

        source.reply_with(&["B", "C", "D"]);
        sync.refresh();
        assert_eq!(
            sync.next_completion().await,
            Some(Outcome::Rendered { count: 3, restored: 2 })
        );

        let container = &sync.page().container;
        assert_eq!(container.selection(), ids(&["B", "C"]));
        assert!(container.cards().iter().filter(|c| c.checked).all(|c| c.selected));
        assert!(!container.cards()[2].checked);
        assert_eq!(sync.page().count_label, "Employees found: 3");
    }

    #[tokio::test]
    async fn test_empty_result_renders_notice() {
        let source = ScriptedSource::default();
        let mut sync = sync(&source);

        source.reply_with(&["A"]);
        sync.refresh();
        sync.next_completion().await;
        check(&mut sync, "A");

        source.reply_with(&[]);
        sync.refresh();
        assert_eq!(
            sync.next_completion().await,
            Some(Outcome::Rendered { count: 0, restored: 0 })
        );
        let container = &sync.page().container;
        assert_eq!(container.notice(), Some(&Notice::Empty));
        assert!(container.cards().is_empty());
        assert!(container.selection().is_empty());
        assert!(!container.inner_html().contains("employee-checkbox"));
    }

    #[tokio::test]
    async fn test_failures_keep_selection_and_escape_text() {
        let source = ScriptedSource::default();
        let mut sync = sync(&source);

        source.reply_with(&["A", "B"]);
        sync.refresh();
        sync.next_completion().await;
        check(&mut sync, "B");

        source.reply(Reply::Ready(Err(FetchError::Status {
            status: 500,
            message: "<script>alert(1)</script>".to_string(),
        })));
        sync.refresh();
        assert!(sync.page().container.is_loading());
        let outcome = sync.next_completion().await;
        assert!(matches!(outcome, Some(Outcome::Failed(_))));
        assert!(!sync.page().container.is_loading());

        let container = &sync.page().container;
        assert_eq!(container.selection(), ids(&["B"]));
        let html = container.inner_html();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert_eq!(sync.page().count_label, "Employees found: 2");

        source.reply(Reply::Ready(Err(FetchError::Application("bad filter".to_string()))));
        sync.refresh();
        assert_eq!(
            sync.next_completion().await,
            Some(Outcome::Failed("bad filter".to_string()))
        );
        assert_eq!(sync.page().container.selection(), ids(&["B"]));
    }

    #[tokio::test]
    async fn test_loading_indicator_cleared_on_both_paths() {
        let source = ScriptedSource::default();
        let mut sync = sync(&source);
        assert!(!sync.page().container.is_loading());

        source.reply_with(&["A"]);
        sync.refresh();
        assert!(sync.page().container.is_loading());
        sync.next_completion().await;
        assert!(!sync.page().container.is_loading());

        source.reply(Reply::Ready(Err(FetchError::Decode("eof".to_string()))));
        sync.refresh();
        assert!(sync.page().container.is_loading());
        sync.next_completion().await;
        assert!(!sync.page().container.is_loading());
    }

    #[tokio::test]
    async fn test_superseded_request_is_cancelled_and_discarded() {
        let source = ScriptedSource::default();
        let mut sync = sync(&source);
        let (_slow_tx, slow_rx) = oneshot::channel();

        source.reply(Reply::Gated(slow_rx));
        sync.update_field(FilterField::Position, "Painter", Instant::now());
        source.reply_with(&["D"]);
        sync.update_field(FilterField::Position, "Mechanic", Instant::now());
        assert_eq!(sync.generation(), 2);

        let mut outcomes = Vec::new();
        for _ in 0..2 {
            let completion = sync.completions_rx.recv().await.unwrap();
            outcomes.push(sync.apply(completion));
        }
        assert!(outcomes.contains(&Outcome::Stale { generation: 1 }));
        assert!(outcomes.contains(&Outcome::Rendered { count: 1, restored: 0 }));
        assert_eq!(
            sync.page().container.cards()[0].record.id,
            EmployeeId::new("D")
        );
        assert!(!sync.page().container.is_loading());
    }

    #[tokio::test]
    async fn test_late_response_does_not_clobber_newer_one() {
        let source = ScriptedSource::default();
        let mut sync = sync(&source);

        sync.refresh();
        source.reply_with(&["NEW"]);
        sync.refresh();
        while sync.next_completion().await.is_some() {}

        let late = Completion {
            generation: 1,
            result: Ok(page(&["OLD"])),
        };
        assert_eq!(sync.apply(late), Outcome::Stale { generation: 1 });
        let cards = sync.page().container.cards();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].record.id, EmployeeId::new("NEW"));
    }

    #[tokio::test]
    async fn test_tooltips_rebound_after_render() {
        let source = ScriptedSource::default();
        let mut sync = sync(&source);

        source.reply(Reply::Ready(Ok(FilterPage::new(vec![
            EmployeeRecord::sample("1", "Busy", Availability::Busy),
            EmployeeRecord::sample("2", "Free", Availability::Free),
        ]))));
        sync.refresh();
        sync.next_completion().await;
        assert_eq!(sync.page().tooltips.len(), 1);
        assert!(sync.page().tooltips.get(&EmployeeId::new("1")).is_some());
    }

    #[tokio::test]
    async fn test_initial_criteria_mirrored_into_controls() {
        let source = ScriptedSource::default();
        let mut initial = FilterCriteria::default();
        initial.set(FilterField::Schedule, "5/2");
        let sync = FilterSync::new(source.clone(), DEFAULT_DEBOUNCE, initial);
        assert_eq!(sync.page().controls.value(FilterField::Schedule), "5/2");
        assert_eq!(sync.criteria().schedule, "5/2");
        assert!(source.queries().is_empty());
    }

    #[tokio::test]
    async fn test_initial_search_is_stripped_before_first_query() {
        let source = ScriptedSource::default();
        let mut initial = FilterCriteria::default();
        initial.set(FilterField::Search, "a<script>x</script>b");
        let mut sync = FilterSync::new(source.clone(), DEFAULT_DEBOUNCE, initial);

        assert_eq!(sync.page().controls.value(FilterField::Search), "ab");
        assert_eq!(sync.criteria().search, "ab");

        sync.refresh();
        assert_eq!(source.queries()[0], vec![("search".to_string(), "ab".to_string())]);
    }
}
