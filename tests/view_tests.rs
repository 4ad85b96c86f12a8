use chrono::NaiveDate;
use std::sync::mpsc::{channel, Receiver};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use tally::aggregate::{customer_metrics, metric};
use tally::source::LiveFeed;
use tally::{
    text_field, Customer, FilterSet, MemorySource, Predicate, ReactiveView, RecordSource,
    RefreshOutcome, SourceError, ViewError, ViewEvent, ViewState, ViewValue,
};

const SHOP: &str = "shop-001";

fn customer(owner: &str, name: &str, dues: f64) -> Customer {
    Customer {
        id: name.to_lowercase(),
        owner_id: owner.into(),
        name: name.into(),
        phone: None,
        email: None,
        total_billed: dues,
        total_paid: 0.0,
        total_dues: dues,
        is_active: true,
        created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap(),
        deleted_at: None,
    }
}

fn customers() -> Vec<Customer> {
    let mut gone = customer(SHOP, "Gone Trader", 999.0);
    gone.deleted_at = Some(gone.created_at);
    vec![
        customer(SHOP, "Alice Cooper", 450.0),
        customer(SHOP, "Bob Singh", 500.0),
        customer("shop-002", "Other Shop Customer", 70.0),
        gone,
    ]
}

type CustomerView = ReactiveView<Customer, Arc<MemorySource<Customer>>>;

fn view_over(records: Vec<Customer>) -> (Arc<MemorySource<Customer>>, CustomerView) {
    let source = Arc::new(MemorySource::new(records));
    let view = ReactiveView::new(
        Arc::clone(&source),
        SHOP,
        FilterSet::new(),
        customer_metrics(),
    );
    (source, view)
}

fn names(value: &ViewValue<Customer>) -> Vec<&str> {
    value.records.iter().map(|c| c.name.as_str()).collect()
}

fn name_search(query: &str) -> Predicate<Customer> {
    Predicate::text_contains(vec![text_field(|c: &Customer| Some(c.name.as_str()))], query)
}

fn drain(rx: &Receiver<ViewEvent<Customer>>) -> Vec<ViewEvent<Customer>> {
    rx.try_iter().collect()
}

#[test]
fn refresh_scopes_to_tenant_and_drops_deleted() {
    let (_, view) = view_over(customers());
    assert_eq!(view.state(), ViewState::Uninitialized);

    assert_eq!(view.refresh(), RefreshOutcome::Applied);

    let value = view.current_value();
    assert_eq!(value.state, ViewState::Ready);
    assert_eq!(names(&value), ["Alice Cooper", "Bob Singh"]);
    assert_eq!(value.aggregates.number(metric::TOTAL_DUES), Some(950.0));
    assert!(value.retrieved_at.is_some());
}

#[test]
fn retrieval_failure_keeps_last_good_data() {
    let (source, view) = view_over(customers());
    view.refresh();

    source.set_failure(Some("connection reset"));
    let outcome = view.refresh();
    assert_eq!(
        outcome,
        RefreshOutcome::Failed(ViewError::Source("connection reset".into()))
    );

    let value = view.current_value();
    assert_eq!(value.state, ViewState::Error);
    assert_eq!(names(&value), ["Alice Cooper", "Bob Singh"]);
    assert_eq!(value.aggregates.number(metric::TOTAL_DUES), Some(950.0));

    // Next successful refresh leaves the error state
    source.set_failure(None);
    assert_eq!(view.refresh(), RefreshOutcome::Applied);
    assert_eq!(view.state(), ViewState::Ready);
    assert!(view.current_value().error.is_none());
}

#[test]
fn lost_session_clears_data() {
    let (source, view) = view_over(customers());
    view.refresh();

    source.sign_out(SHOP);
    assert_eq!(
        view.refresh(),
        RefreshOutcome::Failed(ViewError::NotSignedIn)
    );

    let value = view.current_value();
    assert_eq!(value.state, ViewState::Error);
    assert!(value.records.is_empty());
    assert_eq!(value.aggregates.number(metric::CUSTOMER_COUNT), Some(0.0));
    assert!(view.snapshot().is_none());
}

#[test]
fn empty_tenant_is_unavailable() {
    let source = MemorySource::new(customers());
    let view = ReactiveView::new(source, "", FilterSet::new(), customer_metrics());

    assert_eq!(view.refresh(), RefreshOutcome::Failed(ViewError::NotSignedIn));
}

#[test]
fn older_refresh_result_is_discarded() {
    let (_, view) = view_over(Vec::new());
    let first = view.begin_refresh();
    let second = view.begin_refresh();
    assert!(first < second);

    let newer = vec![customer(SHOP, "Newer", 10.0)];
    let older = vec![customer(SHOP, "Older", 20.0)];

    assert_eq!(view.complete_refresh(second, Ok(newer)), RefreshOutcome::Applied);
    assert_eq!(view.complete_refresh(first, Ok(older)), RefreshOutcome::Superseded);

    assert_eq!(names(&view.current_value()), ["Newer"]);
}

#[test]
fn early_result_of_overtaken_refresh_is_discarded() {
    let (_, view) = view_over(Vec::new());
    let first = view.begin_refresh();
    let second = view.begin_refresh();

    assert_eq!(
        view.complete_refresh(first, Ok(vec![customer(SHOP, "Older", 1.0)])),
        RefreshOutcome::Superseded
    );
    assert_eq!(view.state(), ViewState::Loading);

    let failed = view.complete_refresh(second, Err(SourceError::Retrieval("timeout".into())));
    assert_eq!(failed, RefreshOutcome::Failed(ViewError::Source("timeout".into())));
    assert!(view.current_value().records.is_empty());
}

#[test]
fn filter_change_recomputes_without_fetching() {
    let (source, view) = view_over(customers());
    view.refresh();

    // Any fetch would now fail, so a Ready state proves none happened
    source.set_failure(Some("offline"));
    view.update_filter("search", Some(name_search("bob")));

    let value = view.current_value();
    assert_eq!(value.state, ViewState::Ready);
    assert_eq!(names(&value), ["Bob Singh"]);
    assert_eq!(value.aggregates.number(metric::TOTAL_DUES), Some(500.0));

    view.update_filter("search", None);
    assert_eq!(view.current_value().records.len(), 2);
    assert!(view.filters().is_empty());
}

#[test]
fn subscriber_gets_current_value_first() {
    let (_, view) = view_over(customers());
    view.refresh();

    let rx = view.subscribe();
    match rx.try_recv() {
        Ok(ViewEvent::Updated(value)) => assert_eq!(value.records.len(), 2),
        other => panic!("expected current value, got {other:?}"),
    }
}

#[test]
fn refresh_publishes_loading_then_update() {
    let (source, view) = view_over(customers());
    let rx = view.subscribe();
    drain(&rx);

    view.refresh();
    let events = drain(&rx);
    assert!(matches!(events[0], ViewEvent::Loading));
    assert!(matches!(&events[1], ViewEvent::Updated(v) if v.state == ViewState::Ready));

    source.set_failure(Some("boom"));
    view.refresh();
    let events = drain(&rx);
    assert!(matches!(events[0], ViewEvent::Loading));
    assert!(matches!(
        events.last(),
        Some(ViewEvent::Failed(ViewError::Source(detail))) if detail == "boom"
    ));
}

#[test]
fn revisions_increase_with_each_recompute() {
    let (_, view) = view_over(customers());
    let before = view.current_value().revision;
    view.refresh();
    let after_refresh = view.current_value().revision;
    view.update_filter("search", Some(name_search("a")));
    let after_filter = view.current_value().revision;

    assert!(before < after_refresh);
    assert!(after_refresh < after_filter);
}

#[test]
fn snapshot_during_refresh_stays_loading() {
    let (_, view) = view_over(Vec::new());
    let ticket = view.begin_refresh();

    view.on_snapshot(vec![customer(SHOP, "Pushed", 5.0)]);
    assert_eq!(view.state(), ViewState::Loading);
    assert_eq!(names(&view.current_value()), ["Pushed"]);

    view.complete_refresh(ticket, Ok(vec![customer(SHOP, "Fetched", 5.0)]));
    assert_eq!(view.state(), ViewState::Ready);
    assert_eq!(names(&view.current_value()), ["Fetched"]);
}

#[test]
fn live_feed_snapshots_apply_in_order() {
    let (source, view) = view_over(customers());
    view.refresh();
    view.update_filter("search", Some(name_search("a")));
    assert!(view.attach_live());
    assert_eq!(source.subscriber_count(), 1);

    let mut next = customers();
    next.push(customer(SHOP, "Chitra Rao", 0.0));
    source.replace(next);
    source.replace(vec![customer(SHOP, "Dara Shah", 30.0)]);

    assert_eq!(view.drain_live(), 2);
    // Filters survive new snapshots
    assert_eq!(names(&view.current_value()), ["Dara Shah"]);
    assert_eq!(view.drain_live(), 0);
}

#[test]
fn follow_live_runs_until_feed_closes() {
    let (tx, rx) = channel();
    let view = Arc::new(ReactiveView::new(
        PushOnly(Mutex::new(Some(rx))),
        SHOP,
        FilterSet::new(),
        customer_metrics(),
    ));
    assert!(view.attach_live());

    let follower = {
        let view = Arc::clone(&view);
        thread::spawn(move || view.follow_live())
    };

    tx.send(vec![customer(SHOP, "Live One", 12.0)]).unwrap();
    drop(tx);
    follower.join().unwrap();

    let value = view.current_value();
    assert_eq!(value.state, ViewState::Ready);
    assert_eq!(names(&value), ["Live One"]);
    assert_eq!(value.aggregates.number(metric::TOTAL_DUES), Some(12.0));
}

/// Hands out one feed whose sender the test owns.
struct PushOnly(Mutex<Option<LiveFeed<Customer>>>);

impl RecordSource<Customer> for PushOnly {
    fn fetch_all(&self, _tenant: &str) -> Result<Vec<Customer>, SourceError> {
        Ok(Vec::new())
    }

    fn subscribe(&self, _tenant: &str) -> Option<LiveFeed<Customer>> {
        self.0.lock().ok()?.take()
    }
}

/// Holds the first fetch until the test lets it go; later fetches return at once.
struct GatedSource {
    calls: AtomicUsize,
    entered: Barrier,
    release: Barrier,
}

impl GatedSource {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            entered: Barrier::new(2),
            release: Barrier::new(2),
        }
    }
}

impl RecordSource<Customer> for GatedSource {
    fn fetch_all(&self, _tenant: &str) -> Result<Vec<Customer>, SourceError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.entered.wait();
            self.release.wait();
            return Ok(vec![customer(SHOP, "First", 1.0)]);
        }
        Ok(vec![customer(SHOP, "Second", 2.0)])
    }
}

#[test]
fn overlapping_refresh_calls_keep_the_later_result() {
    let gate = Arc::new(GatedSource::new());
    let view = Arc::new(ReactiveView::new(
        Arc::clone(&gate),
        SHOP,
        FilterSet::new(),
        customer_metrics(),
    ));

    let slow = {
        let view = Arc::clone(&view);
        thread::spawn(move || view.refresh())
    };

    // First fetch is parked inside the source; the view must not be locked
    gate.entered.wait();
    assert_eq!(view.refresh(), RefreshOutcome::Applied);
    gate.release.wait();

    assert_eq!(slow.join().unwrap(), RefreshOutcome::Superseded);
    let value = view.current_value();
    assert_eq!(value.state, ViewState::Ready);
    assert_eq!(names(&value), ["Second"]);
    assert_eq!(value.aggregates.number(metric::TOTAL_DUES), Some(2.0));
}

#[test]
fn retry_clears_previous_error_while_loading() {
    let (source, view) = view_over(customers());
    view.refresh();
    source.set_failure(Some("offline"));
    view.refresh();
    assert!(view.current_value().error.is_some());

    let ticket = view.begin_refresh();
    let value = view.current_value();
    assert_eq!(value.state, ViewState::Loading);
    assert!(value.error.is_none());
    // Last good data stays visible during the retry
    assert_eq!(names(&value), ["Alice Cooper", "Bob Singh"]);

    source.set_failure(None);
    let records = source.fetch_all(SHOP);
    assert_eq!(view.complete_refresh(ticket, records), RefreshOutcome::Applied);
    assert_eq!(view.state(), ViewState::Ready);
}
