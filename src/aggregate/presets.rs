use crate::filter::{Comparison, Predicate};
use crate::record::{Bill, BillStatus, Customer, Product};

use super::AggregateSpec;

/// Keys of the ready-made metric bundles.
pub mod metric {
    pub const TOTAL_SALES: &str = "total_sales";
    pub const TOTAL_PAID: &str = "total_paid";
    pub const TOTAL_DUES: &str = "total_dues";
    pub const BILL_COUNT: &str = "bill_count";
    pub const AVERAGE_BILL: &str = "average_bill";
    pub const PAID_TOTAL: &str = "paid_total";
    pub const PAID_COUNT: &str = "paid_count";
    pub const PENDING_COUNT: &str = "pending_count";
    pub const UNITS_SOLD: &str = "units_sold";
    pub const SALES_BY_STATUS: &str = "sales_by_status";
    pub const COUNT_BY_STATUS: &str = "count_by_status";
    pub const SALES_BY_MODE: &str = "sales_by_mode";
    pub const ITEMS_SOLD: &str = "items_sold";

    pub const CUSTOMER_COUNT: &str = "customer_count";
    pub const CUSTOMERS_WITH_DUES: &str = "customers_with_dues";

    pub const PRODUCT_COUNT: &str = "product_count";
    pub const LOW_STOCK_COUNT: &str = "low_stock_count";
    pub const STOCK_VALUE: &str = "stock_value";
}

fn has_dues() -> Predicate<Bill> {
    Predicate::threshold(|bill: &Bill| Some(bill.dues()), Comparison::Greater, 0.0)
}

/// Totals shown on the billing report, total-bills and dashboard screens.
pub fn bill_metrics() -> Vec<AggregateSpec<Bill>> {
    vec![
        AggregateSpec::sum(metric::TOTAL_SALES, |bill: &Bill| Some(bill.grand_total)),
        AggregateSpec::sum(metric::TOTAL_PAID, |bill: &Bill| Some(bill.paid_amount)),
        AggregateSpec::sum(metric::TOTAL_DUES, |bill: &Bill| Some(bill.dues())),
        AggregateSpec::count(metric::BILL_COUNT),
        AggregateSpec::average(metric::AVERAGE_BILL, |bill: &Bill| Some(bill.grand_total)),
        AggregateSpec::sum(metric::PAID_TOTAL, |bill: &Bill| Some(bill.grand_total))
            .guarded(Predicate::equals(|bill: &Bill| Some(bill.status), Some(BillStatus::Paid))),
        AggregateSpec::count(metric::PAID_COUNT)
            .guarded(Predicate::equals(|bill: &Bill| Some(bill.status), Some(BillStatus::Paid))),
        AggregateSpec::count(metric::PENDING_COUNT).guarded(has_dues()),
        AggregateSpec::sum(metric::UNITS_SOLD, |bill: &Bill| Some(bill.item_quantity())),
        AggregateSpec::group_sum(
            metric::SALES_BY_STATUS,
            |bill: &Bill| Some(bill.status.label().to_string()),
            |bill: &Bill| Some(bill.grand_total),
        ),
        AggregateSpec::group_sum(
            metric::COUNT_BY_STATUS,
            |bill: &Bill| Some(bill.status.label().to_string()),
            |_: &Bill| Some(1.0),
        ),
        AggregateSpec::group_sum(
            metric::SALES_BY_MODE,
            |bill: &Bill| bill.payment_mode.map(|mode| mode.label().to_string()),
            |bill: &Bill| Some(bill.grand_total),
        ),
        AggregateSpec::breakdown(metric::ITEMS_SOLD, |bill: &Bill| {
            bill.items
                .iter()
                .map(|item| (item.name.clone(), item.quantity))
                .collect()
        }),
    ]
}

/// Totals shown on the pending-dues and total-paid screens.
pub fn customer_metrics() -> Vec<AggregateSpec<Customer>> {
    vec![
        AggregateSpec::count(metric::CUSTOMER_COUNT),
        AggregateSpec::sum(metric::TOTAL_DUES, |c: &Customer| Some(c.total_dues)),
        AggregateSpec::sum(metric::TOTAL_PAID, |c: &Customer| Some(c.total_paid)),
        AggregateSpec::count(metric::CUSTOMERS_WITH_DUES).guarded(Predicate::threshold(
            |c: &Customer| Some(c.total_dues),
            Comparison::Greater,
            0.0,
        )),
    ]
}

pub fn stock_metrics() -> Vec<AggregateSpec<Product>> {
    vec![
        AggregateSpec::count(metric::PRODUCT_COUNT),
        AggregateSpec::count(metric::LOW_STOCK_COUNT)
            .guarded(Predicate::new("low_stock", Product::is_low_stock)),
        AggregateSpec::sum(metric::STOCK_VALUE, |p: &Product| Some(p.stock_value())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::compute;
    use crate::record::{BillItem, PaymentMode};
    use chrono::NaiveDate;

    fn bill(id: &str, total: f64, paid: f64, status: BillStatus, mode: Option<PaymentMode>) -> Bill {
        Bill {
            id: id.into(),
            owner_id: "shop".into(),
            invoice_number: format!("INV-{id}"),
            customer_id: None,
            customer_name: "Walk-in".into(),
            bill_date: NaiveDate::from_ymd_opt(2024, 3, 10)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            subtotal: total,
            tax_amount: 0.0,
            discount_amount: 0.0,
            grand_total: total,
            paid_amount: paid,
            status,
            payment_mode: mode,
            items: vec![BillItem {
                name: "Rice".into(),
                quantity: 2.0,
                price: total / 2.0,
                total,
            }],
            deleted_at: None,
        }
    }

    #[test]
    fn bill_metrics_cover_report_totals() {
        let bills = vec![
            bill("1", 100.0, 100.0, BillStatus::Paid, Some(PaymentMode::Cash)),
            bill("2", 50.0, 20.0, BillStatus::Partial, Some(PaymentMode::Credit)),
            bill("3", 30.0, 0.0, BillStatus::Unpaid, None),
        ];
        let result = compute(&bills, &bill_metrics());

        assert_eq!(result.number(metric::TOTAL_SALES), Some(180.0));
        assert_eq!(result.number(metric::TOTAL_PAID), Some(120.0));
        assert_eq!(result.number(metric::TOTAL_DUES), Some(60.0));
        assert_eq!(result.number(metric::BILL_COUNT), Some(3.0));
        assert_eq!(result.number(metric::AVERAGE_BILL), Some(60.0));
        assert_eq!(result.number(metric::PAID_TOTAL), Some(100.0));
        assert_eq!(result.number(metric::PENDING_COUNT), Some(2.0));
        assert_eq!(result.number(metric::UNITS_SOLD), Some(6.0));

        let by_mode = result.groups(metric::SALES_BY_MODE).unwrap();
        assert_eq!(by_mode.len(), 2);
        assert_eq!(by_mode.get("Credit"), Some(&50.0));
        assert_eq!(result.top(metric::ITEMS_SOLD, 5), vec![("Rice".to_string(), 6.0)]);
    }
}
