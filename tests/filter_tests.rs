use chrono::NaiveDate;
use tally::{text_field, Bill, BillStatus, Comparison, FilterSet, PaymentMode, Predicate};

fn bill(invoice: &str, customer: &str, date: (i32, u32, u32), total: f64) -> Bill {
    Bill {
        id: invoice.to_lowercase(),
        owner_id: "shop-001".into(),
        invoice_number: invoice.into(),
        customer_id: None,
        customer_name: customer.into(),
        bill_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap(),
        subtotal: total,
        tax_amount: 0.0,
        discount_amount: 0.0,
        grand_total: total,
        paid_amount: 0.0,
        status: BillStatus::Unpaid,
        payment_mode: None,
        items: Vec::new(),
        deleted_at: None,
    }
}

fn ledger() -> Vec<Bill> {
    let mut paid = bill("INV-2", "Bob Singh", (2024, 3, 5), 250.0);
    paid.status = BillStatus::Paid;
    paid.paid_amount = 250.0;
    paid.payment_mode = Some(PaymentMode::Cash);

    vec![
        bill("INV-1", "Alice Cooper", (2024, 3, 1), 100.0),
        paid,
        bill("INV-3", "Malika Rao", (2024, 3, 10), 400.0),
        bill("INV-4", "Dev Patel", (2024, 3, 31), 75.0),
    ]
}

fn search(query: &str) -> Predicate<Bill> {
    Predicate::text_contains(
        vec![
            text_field(|b: &Bill| Some(b.invoice_number.as_str())),
            text_field(|b: &Bill| Some(b.customer_name.as_str())),
        ],
        query,
    )
}

fn march_range(start: u32, end: u32) -> Predicate<Bill> {
    Predicate::date_range(
        |b: &Bill| Some(b.bill_date),
        NaiveDate::from_ymd_opt(2024, 3, start),
        NaiveDate::from_ymd_opt(2024, 3, end),
    )
}

fn invoices(bills: &[Bill]) -> Vec<&str> {
    bills.iter().map(|b| b.invoice_number.as_str()).collect()
}

#[test]
fn empty_filter_set_is_identity() {
    let bills = ledger();
    assert_eq!(FilterSet::new().apply(&bills), bills);
}

#[test]
fn applying_twice_changes_nothing() {
    let bills = ledger();
    let filters = FilterSet::new()
        .with("search", search("a"))
        .with("date", march_range(1, 10));

    let once = filters.apply(&bills);
    let twice = filters.apply(&once);
    assert_eq!(once, twice);
}

#[test]
fn output_keeps_input_order() {
    let bills = ledger();
    let filters = FilterSet::new().with(
        "total",
        Predicate::threshold(|b: &Bill| Some(b.grand_total), Comparison::GreaterOrEqual, 100.0),
    );

    assert_eq!(invoices(&filters.apply(&bills)), ["INV-1", "INV-2", "INV-3"]);
}

#[test]
fn adding_a_filter_only_narrows() {
    let bills = ledger();
    let base = FilterSet::new().with("date", march_range(1, 31));
    let narrowed = base.with("search", search("rao"));

    let wide = base.apply(&bills);
    let narrow = narrowed.apply(&bills);
    assert!(narrow.len() <= wide.len());
    assert!(narrow.iter().all(|b| wide.contains(b)));
    assert_eq!(invoices(&narrow), ["INV-3"]);
}

#[test]
fn search_matches_any_field_ignoring_case() {
    let bills = ledger();
    let filters = FilterSet::new().with("search", search("ALI"));

    // "Alice Cooper" and "Malika Rao" both contain "ali"
    assert_eq!(invoices(&filters.apply(&bills)), ["INV-1", "INV-3"]);

    let by_invoice = FilterSet::new().with("search", search("inv-4"));
    assert_eq!(invoices(&by_invoice.apply(&bills)), ["INV-4"]);
}

#[test]
fn blank_search_matches_everything() {
    let bills = ledger();
    let filters = FilterSet::new().with("search", search("   "));
    assert_eq!(filters.apply(&bills).len(), bills.len());
}

#[test]
fn date_range_includes_both_end_days() {
    let bills = ledger();
    let filters = FilterSet::new().with("date", march_range(5, 31));

    // INV-4 is at 14:30 on the end date and still counts
    assert_eq!(invoices(&filters.apply(&bills)), ["INV-2", "INV-3", "INV-4"]);
}

#[test]
fn open_ended_date_range() {
    let bills = ledger();
    let until_fifth = Predicate::date_range(
        |b: &Bill| Some(b.bill_date),
        None,
        NaiveDate::from_ymd_opt(2024, 3, 5),
    );
    let filters = FilterSet::new().with("date", until_fifth);
    assert_eq!(invoices(&filters.apply(&bills)), ["INV-1", "INV-2"]);
}

#[test]
fn replacing_and_clearing_by_key() {
    let bills = ledger();
    let mut filters = FilterSet::new();
    filters.set("status", Predicate::equals(|b: &Bill| Some(b.status), Some(BillStatus::Paid)));
    assert_eq!(invoices(&filters.apply(&bills)), ["INV-2"]);

    filters.set("status", Predicate::equals(|b: &Bill| Some(b.status), Some(BillStatus::Unpaid)));
    assert_eq!(filters.len(), 1);
    assert_eq!(invoices(&filters.apply(&bills)), ["INV-1", "INV-3", "INV-4"]);

    assert!(filters.clear("status"));
    assert!(!filters.clear("status"));
    assert_eq!(filters.apply(&bills).len(), 4);
}

#[test]
fn missing_category_never_matches_a_choice() {
    let bills = ledger();
    let cash = FilterSet::new().with(
        "mode",
        Predicate::equals(|b: &Bill| b.payment_mode, Some(PaymentMode::Cash)),
    );
    assert_eq!(invoices(&cash.apply(&bills)), ["INV-2"]);

    let all_modes = FilterSet::new().with(
        "mode",
        Predicate::equals(|b: &Bill| b.payment_mode, None::<PaymentMode>),
    );
    assert_eq!(all_modes.apply(&bills).len(), 4);
}

#[test]
fn conditions_parse_against_record_fields() {
    let bills = ledger();
    let filters = FilterSet::new()
        .with("cond", tally::parse_condition::<Bill>("total > 90").unwrap())
        .with("who", tally::parse_condition::<Bill>("customer_name ~ o").unwrap());

    assert_eq!(invoices(&filters.apply(&bills)), ["INV-1", "INV-2", "INV-3"]);
}

#[test]
fn last_minute_of_a_single_day_range_matches() {
    let mut late = bill("INV-9", "Night Owl", (2024, 3, 10), 10.0);
    late.bill_date = NaiveDate::from_ymd_opt(2024, 3, 10)
        .unwrap()
        .and_hms_opt(23, 59, 0)
        .unwrap();

    let day = march_range(10, 10);
    assert!(day.matches(&late));
    assert!(!march_range(11, 11).matches(&late));
}

#[test]
fn search_scenario_with_two_names() {
    let bills = vec![
        bill("INV-A", "Alice Cooper", (2024, 3, 1), 1.0),
        bill("INV-B", "Bob", (2024, 3, 1), 1.0),
    ];
    let only_names = Predicate::text_contains(
        vec![text_field(|b: &Bill| Some(b.customer_name.as_str()))],
        "ali",
    );
    let filters = FilterSet::new().with("search", only_names);
    assert_eq!(invoices(&filters.apply(&bills)), ["INV-A"]);
}
