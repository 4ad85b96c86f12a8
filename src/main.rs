use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::{settings::Style, Table, Tabled};

use tally::aggregate::{bill_metrics, customer_metrics, metric, stock_metrics};
use tally::config::{config_dir, load_config, open_source, Config, CONFIG_TEMPLATE, SAMPLE_DATA};
use tally::source::Collection;
use tally::{
    parse_condition, text_field, AggregateSpec, Bill, BillStatus, Comparison, Customer, FilterSet,
    PaymentMode, Predicate, Product, ReactiveView, RecordSource, RefreshOutcome, Result,
    TallyError,
};

#[derive(Parser)]
#[command(name = "tally")]
#[command(version, about = "Shop billing, dues and stock at a glance", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.tally or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Override the shop tenant from config.toml
    #[arg(short, long, global = true)]
    tenant: Option<String>,

    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config and sample data
    Init,

    /// Show configuration and record counts
    Status,

    /// Search and filter bills
    Bills {
        /// Match invoice number or customer name (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,

        /// Bills on or after this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Bills on or before this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Bill status (paid, unpaid, partial, draft, cancelled)
        #[arg(long)]
        status: Option<String>,

        /// Payment mode (cash, online, credit)
        #[arg(long)]
        mode: Option<String>,

        /// Extra condition, e.g. "grand_total >= 500" (can be repeated)
        #[arg(short, long = "where", value_name = "CONDITION")]
        conditions: Vec<String>,

        /// Number of bills to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Billing report: totals by status and payment mode
    Report {
        /// Report from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Report to this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Customers with pending dues
    Dues {
        /// Match customer name or phone
        #[arg(short, long)]
        search: Option<String>,

        /// Only list dues above this amount (default: [dues] threshold)
        #[arg(long)]
        min: Option<f64>,
    },

    /// Products at or below their low-stock threshold
    Stock {
        /// List every product, not just low stock
        #[arg(short, long)]
        all: bool,

        /// Match product name or category
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Sales, dues and stock summary
    Dashboard {
        /// Day to report on (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,

        /// Trailing period in days (default: [dashboard] period_days)
        #[arg(long)]
        days: Option<u32>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    tally::logging::init(cli.verbose);

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    if let Commands::Init = cli.command {
        return cmd_init(&cfg_dir);
    }

    let config = load_config(&cfg_dir)?;
    let tenant = cli.tenant.unwrap_or_else(|| config.shop.tenant.clone());
    let ctx = Context {
        cfg_dir,
        config,
        tenant,
    };

    match cli.command {
        Commands::Init => Ok(()),
        Commands::Status => cmd_status(&ctx),
        Commands::Bills {
            search,
            from,
            to,
            status,
            mode,
            conditions,
            limit,
        } => {
            let filters = BillFilters {
                search,
                from,
                to,
                status,
                mode,
                conditions,
            };
            cmd_bills(&ctx, &filters, limit)
        }
        Commands::Report { from, to } => cmd_report(&ctx, from, to),
        Commands::Dues { search, min } => cmd_dues(&ctx, search, min),
        Commands::Stock { all, search } => cmd_stock(&ctx, all, search),
        Commands::Dashboard { date, days } => cmd_dashboard(&ctx, date, days),
    }
}

struct Context {
    cfg_dir: PathBuf,
    config: Config,
    tenant: String,
}

impl Context {
    fn symbol(&self) -> &str {
        &self.config.shop.currency_symbol
    }
}

type View<T> = ReactiveView<T, Arc<dyn RecordSource<T>>>;

/// Build a view over one collection and load it once.
fn open_view<T: Collection>(ctx: &Context, specs: Vec<AggregateSpec<T>>) -> Result<View<T>> {
    let source = open_source::<T>(&ctx.config, &ctx.cfg_dir)?;
    let view = ReactiveView::new(source, ctx.tenant.clone(), FilterSet::new(), specs);
    match view.refresh() {
        RefreshOutcome::Applied => Ok(view),
        RefreshOutcome::Failed(error) => Err(TallyError::Refresh(error)),
        // Nothing else refreshes this view.
        RefreshOutcome::Superseded => Ok(view),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(TallyError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(cfg_dir.join("data.json"), SAMPLE_DATA)?;

    println!("Initialized tally config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Set your shop and tenant:   $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!(
        "  2. Replace the sample data:    {}/data.json",
        cfg_dir.display()
    );
    println!();
    println!("Then look at your bills:");
    println!("  tally bills --status unpaid");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct BillRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "INVOICE")]
    invoice: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "CUSTOMER")]
    customer: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "MODE")]
    mode: String,
}

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "GROUP")]
    name: String,
    #[tabled(rename = "BILLS")]
    count: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

#[derive(Tabled)]
struct DuesRow {
    #[tabled(rename = "CUSTOMER")]
    name: String,
    #[tabled(rename = "PHONE")]
    phone: String,
    #[tabled(rename = "BILLED")]
    billed: String,
    #[tabled(rename = "PAID")]
    paid: String,
    #[tabled(rename = "DUES")]
    dues: String,
}

#[derive(Tabled)]
struct StockRow {
    #[tabled(rename = "PRODUCT")]
    name: String,
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "IN STOCK")]
    quantity: String,
    #[tabled(rename = "ALERT AT")]
    threshold: String,
    #[tabled(rename = "PRICE")]
    price: String,
}

#[derive(Tabled)]
struct TopItemRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "ITEM")]
    name: String,
    #[tabled(rename = "QTY SOLD")]
    quantity: String,
}

fn format_money(value: f64, currency_symbol: &str) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!(
        "{sign}{currency_symbol}{}.{:02}",
        format_grouped_int((cents / 100) as i64),
        cents % 100
    )
}

fn format_grouped_int(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Append summary rows under a rounded table. The first `label_columns`
/// columns merge into one label cell and the next column carries the value.
fn add_summary_footer(table: &str, label_columns: usize, rows: &[(&str, String)]) -> String {
    let lines: Vec<&str> = table.lines().collect();
    if lines.len() < 4 || rows.is_empty() || label_columns == 0 {
        return table.to_string();
    }

    // Parse the top border to discover column widths
    let top = lines[0];
    let Some(inner) = top.strip_prefix('╭').and_then(|s| s.strip_suffix('╮')) else {
        return table.to_string();
    };

    let widths: Vec<usize> = inner.split('┬').map(|p| p.chars().count()).collect();
    if widths.len() <= label_columns {
        return table.to_string();
    }

    let left_width = widths[..label_columns].iter().sum::<usize>() + label_columns - 1;
    let value_width = widths[label_columns];
    let trailing = &widths[label_columns + 1..];

    let dashes = |cols: &[usize]| -> String {
        cols.iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("┴")
    };

    // Strip the original bottom border and start building
    let mut out = lines[..lines.len() - 1].join("\n");
    out.push('\n');

    out.push('├');
    out.push_str(&dashes(&widths[..label_columns]));
    out.push('┼');
    out.push_str(&"─".repeat(value_width));
    if trailing.is_empty() {
        out.push_str("┤\n");
    } else {
        out.push('┼');
        out.push_str(&dashes(trailing));
        out.push_str("╯\n");
    }

    for (idx, (label, value)) in rows.iter().enumerate() {
        out.push_str(&format!(
            "│ {:>left$} │ {:>value$} │\n",
            label,
            value,
            left = left_width - 2,
            value = value_width - 2
        ));
        if idx < rows.len() - 1 {
            out.push_str(&format!(
                "├{}┼{}┤\n",
                "─".repeat(left_width),
                "─".repeat(value_width)
            ));
        }
    }

    out.push_str(&format!(
        "╰{}┴{}╯",
        "─".repeat(left_width),
        "─".repeat(value_width)
    ));

    out
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| TallyError::InvalidDate(value.to_string()))
}

fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value.map(parse_date).transpose()
}

fn parse_status(value: &str) -> Result<BillStatus> {
    value.parse().map_err(|_| TallyError::InvalidChoice {
        what: "status",
        value: value.to_string(),
        expected: BillStatus::CHOICES,
    })
}

fn parse_mode(value: &str) -> Result<PaymentMode> {
    value.parse().map_err(|_| TallyError::InvalidChoice {
        what: "payment mode",
        value: value.to_string(),
        expected: PaymentMode::CHOICES,
    })
}

fn bill_date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Predicate<Bill> {
    Predicate::date_range(|bill: &Bill| Some(bill.bill_date), from, to)
}

/// Show configuration and record counts
fn cmd_status(ctx: &Context) -> Result<()> {
    let bills = open_view::<Bill>(ctx, vec![AggregateSpec::count(metric::BILL_COUNT)])?;
    let customers =
        open_view::<Customer>(ctx, vec![AggregateSpec::count(metric::CUSTOMER_COUNT)])?;
    let products = open_view::<Product>(ctx, vec![AggregateSpec::count(metric::PRODUCT_COUNT)])?;

    let source = match ctx.config.source.kind {
        tally::config::SourceKind::File => {
            let path = tally::config::resolve_data_path(&ctx.config.source, &ctx.cfg_dir)?;
            format!("file {}", path.display())
        }
        tally::config::SourceKind::Http => format!(
            "http {}",
            ctx.config.source.url.as_deref().unwrap_or_default()
        ),
    };

    let count = |value: Option<f64>| value.unwrap_or(0.0) as u64;

    println!("Tally Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", ctx.cfg_dir.display());
    println!("Shop:             {}", ctx.config.shop.name);
    println!("Tenant:           {}", ctx.tenant);
    println!("Source:           {source}");
    println!(
        "Bills:            {}",
        count(bills.current_value().aggregates.number(metric::BILL_COUNT))
    );
    println!(
        "Customers:        {}",
        count(customers.current_value().aggregates.number(metric::CUSTOMER_COUNT))
    );
    println!(
        "Products:         {}",
        count(products.current_value().aggregates.number(metric::PRODUCT_COUNT))
    );

    Ok(())
}

struct BillFilters {
    search: Option<String>,
    from: Option<String>,
    to: Option<String>,
    status: Option<String>,
    mode: Option<String>,
    conditions: Vec<String>,
}

/// Search and filter bills
fn cmd_bills(ctx: &Context, args: &BillFilters, limit: Option<usize>) -> Result<()> {
    // Validate every flag before touching the source
    let from = parse_optional_date(args.from.as_deref())?;
    let to = parse_optional_date(args.to.as_deref())?;
    let status = args.status.as_deref().map(parse_status).transpose()?;
    let mode = args.mode.as_deref().map(parse_mode).transpose()?;
    let conditions = args
        .conditions
        .iter()
        .map(|c| parse_condition::<Bill>(c))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let view = open_view::<Bill>(ctx, bill_metrics())?;

    if let Some(query) = &args.search {
        let search = Predicate::text_contains(
            vec![
                text_field(|bill: &Bill| Some(bill.invoice_number.as_str())),
                text_field(|bill: &Bill| Some(bill.customer_name.as_str())),
            ],
            query,
        );
        view.update_filter("search", Some(search));
    }
    if from.is_some() || to.is_some() {
        view.update_filter("date", Some(bill_date_range(from, to)));
    }
    view.update_filter(
        "status",
        status.map(|s| Predicate::equals(|bill: &Bill| Some(bill.status), Some(s))),
    );
    view.update_filter(
        "mode",
        mode.map(|m| Predicate::equals(|bill: &Bill| bill.payment_mode, Some(m))),
    );
    for condition in conditions {
        let key = condition.key().to_string();
        view.update_filter(&key, Some(condition));
    }

    let value = view.current_value();
    if value.records.is_empty() {
        println!("No bills match the given filters.");
        return Ok(());
    }

    // Newest first
    let mut bills: Vec<&Bill> = value.records.iter().collect();
    bills.sort_by(|a, b| b.bill_date.cmp(&a.bill_date));
    let shown = match limit {
        Some(n) => &bills[..n.min(bills.len())],
        None => &bills[..],
    };

    let symbol = ctx.symbol();
    let rows: Vec<BillRow> = shown
        .iter()
        .enumerate()
        .map(|(idx, bill)| BillRow {
            index: idx + 1,
            invoice: bill.invoice_number.clone(),
            date: bill.bill_date.format("%Y-%m-%d").to_string(),
            customer: bill.customer_name.clone(),
            total: format_money(bill.grand_total, symbol),
            status: bill.status.to_string(),
            mode: bill.payment_mode.map(|m| m.to_string()).unwrap_or_default(),
        })
        .collect();

    // Summary covers every matching bill, not only the shown ones
    let totals = &value.aggregates;
    let figure = |key: &str| format_money(totals.number(key).unwrap_or(0.0), symbol);
    let table = Table::new(rows).with(Style::rounded()).to_string();
    let table = add_summary_footer(
        &table,
        4,
        &[
            ("TOTAL", figure(metric::TOTAL_SALES)),
            ("(-) PAID", figure(metric::TOTAL_PAID)),
            ("(=) DUES", figure(metric::TOTAL_DUES)),
        ],
    );

    println!("{table}");
    println!();
    println!(
        "Showing {} of {} matching bills",
        shown.len(),
        value.records.len()
    );

    Ok(())
}

/// Billing report: totals by status and payment mode
fn cmd_report(ctx: &Context, from: Option<String>, to: Option<String>) -> Result<()> {
    let from_date = parse_optional_date(from.as_deref())?;
    let to_date = parse_optional_date(to.as_deref())?;

    let view = open_view::<Bill>(ctx, bill_metrics())?;
    view.update_filter("date", Some(bill_date_range(from_date, to_date)));

    let value = view.current_value();
    let totals = &value.aggregates;
    let symbol = ctx.symbol();
    let figure = |key: &str| format_money(totals.number(key).unwrap_or(0.0), symbol);

    let period = match (&from, &to) {
        (Some(f), Some(t)) => format!("{f} to {t}"),
        (Some(f), None) => format!("from {f}"),
        (None, Some(t)) => format!("up to {t}"),
        (None, None) => "all time".to_string(),
    };

    println!("Billing Report ({period})");
    println!("{}", "-".repeat(50));
    println!(
        "Bills:        {}",
        totals.number(metric::BILL_COUNT).unwrap_or(0.0) as u64
    );
    println!("Sales:        {}", figure(metric::TOTAL_SALES));
    println!("Collected:    {}", figure(metric::TOTAL_PAID));
    println!("Outstanding:  {}", figure(metric::TOTAL_DUES));
    println!("Average bill: {}", figure(metric::AVERAGE_BILL));

    if value.records.is_empty() {
        return Ok(());
    }

    let counts = totals.groups(metric::COUNT_BY_STATUS);
    if let Some(by_status) = totals.groups(metric::SALES_BY_STATUS) {
        let rows: Vec<GroupRow> = by_status
            .iter()
            .map(|(name, amount)| GroupRow {
                name: name.clone(),
                count: counts
                    .and_then(|c| c.get(name))
                    .map(|n| format_quantity(*n))
                    .unwrap_or_default(),
                amount: format_money(*amount, symbol),
            })
            .collect();
        println!();
        println!("By status");
        println!("{}", Table::new(rows).with(Style::rounded()));
    }

    if let Some(by_mode) = totals.groups(metric::SALES_BY_MODE) {
        if !by_mode.is_empty() {
            let rows: Vec<GroupRow> = by_mode
                .iter()
                .map(|(name, amount)| {
                    let bills = value
                        .records
                        .iter()
                        .filter(|b| b.payment_mode.map(|m| m.label()) == Some(name.as_str()))
                        .count();
                    GroupRow {
                        name: name.clone(),
                        count: bills.to_string(),
                        amount: format_money(*amount, symbol),
                    }
                })
                .collect();
            println!();
            println!("By payment mode");
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
    }

    Ok(())
}

/// Customers with pending dues
fn cmd_dues(ctx: &Context, search: Option<String>, min: Option<f64>) -> Result<()> {
    let threshold = min.unwrap_or(ctx.config.dues.threshold);

    let view = open_view::<Customer>(ctx, customer_metrics())?;
    view.update_filter(
        "dues",
        Some(Predicate::threshold(
            |c: &Customer| Some(c.total_dues),
            Comparison::Greater,
            threshold,
        )),
    );
    if let Some(query) = &search {
        view.update_filter(
            "search",
            Some(Predicate::text_contains(
                vec![
                    text_field(|c: &Customer| Some(c.name.as_str())),
                    text_field(|c: &Customer| c.phone.as_deref()),
                ],
                query,
            )),
        );
    }

    let value = view.current_value();
    if value.records.is_empty() {
        println!("No customers with pending dues.");
        return Ok(());
    }

    // Largest dues first
    let mut customers: Vec<&Customer> = value.records.iter().collect();
    customers.sort_by(|a, b| b.total_dues.total_cmp(&a.total_dues));

    let symbol = ctx.symbol();
    let rows: Vec<DuesRow> = customers
        .iter()
        .map(|c| DuesRow {
            name: c.name.clone(),
            phone: c.phone.clone().unwrap_or_default(),
            billed: format_money(c.total_billed, symbol),
            paid: format_money(c.total_paid, symbol),
            dues: format_money(c.total_dues, symbol),
        })
        .collect();

    let total = value
        .aggregates
        .number(metric::TOTAL_DUES)
        .unwrap_or(0.0);
    let table = Table::new(rows).with(Style::rounded()).to_string();
    let table = add_summary_footer(
        &table,
        4,
        &[("TOTAL DUES", format_money(total, symbol))],
    );

    println!("{table}");
    println!();
    println!("{} customers owe money", customers.len());

    Ok(())
}

/// Products at or below their low-stock threshold
fn cmd_stock(ctx: &Context, all: bool, search: Option<String>) -> Result<()> {
    let view = open_view::<Product>(ctx, stock_metrics())?;
    if !all {
        view.update_filter("low_stock", Some(Predicate::new("low_stock", Product::is_low_stock)));
    }
    if let Some(query) = &search {
        view.update_filter(
            "search",
            Some(Predicate::text_contains(
                vec![
                    text_field(|p: &Product| Some(p.name.as_str())),
                    text_field(|p: &Product| p.category.as_deref()),
                ],
                query,
            )),
        );
    }

    let value = view.current_value();
    if value.records.is_empty() {
        if all {
            println!("No products found.");
        } else {
            println!("No products are low on stock.");
        }
        return Ok(());
    }

    let symbol = ctx.symbol();
    let rows: Vec<StockRow> = value
        .records
        .iter()
        .map(|p| StockRow {
            name: p.name.clone(),
            category: p.category.clone().unwrap_or_default(),
            quantity: format!("{} {}", format_quantity(p.stock_quantity), p.unit),
            threshold: format_quantity(p.low_stock_threshold),
            price: format_money(p.selling_price, symbol),
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::rounded()));
    println!();
    println!(
        "{} products, {} low on stock, stock value {}",
        value.records.len(),
        value
            .aggregates
            .number(metric::LOW_STOCK_COUNT)
            .unwrap_or(0.0) as u64,
        format_money(
            value.aggregates.number(metric::STOCK_VALUE).unwrap_or(0.0),
            symbol
        )
    );

    Ok(())
}

/// Sales, dues and stock summary
fn cmd_dashboard(ctx: &Context, date: Option<String>, days: Option<u32>) -> Result<()> {
    let day = match date {
        Some(d) => parse_date(&d)?,
        None => Local::now().date_naive(),
    };
    let days = days.unwrap_or(ctx.config.dashboard.period_days).max(1);
    let period_start = day
        .checked_sub_signed(Duration::days(i64::from(days) - 1))
        .ok_or(TallyError::InvalidPeriod { days, day })?;

    let bills = open_view::<Bill>(ctx, bill_metrics())?;
    let customers = open_view::<Customer>(ctx, customer_metrics())?;
    let products = open_view::<Product>(ctx, stock_metrics())?;

    // Same snapshot, two windows: today, then the trailing period
    bills.update_filter("date", Some(bill_date_range(Some(day), Some(day))));
    let today = bills.current_value().aggregates;
    bills.update_filter("date", Some(bill_date_range(Some(period_start), Some(day))));
    let period = bills.current_value().aggregates;

    let dues = customers.current_value().aggregates;
    let stock = products.current_value().aggregates;

    let symbol = ctx.symbol();
    let money = |value: Option<f64>| format_money(value.unwrap_or(0.0), symbol);
    let count = |value: Option<f64>| value.unwrap_or(0.0) as u64;

    println!("{} - {}", ctx.config.shop.name, day.format("%Y-%m-%d"));
    println!("{}", "-".repeat(50));
    println!(
        "Today:          {} from {} bills",
        money(today.number(metric::TOTAL_SALES)),
        count(today.number(metric::BILL_COUNT))
    );
    println!(
        "Last {:<3} days:  {} from {} bills",
        days,
        money(period.number(metric::TOTAL_SALES)),
        count(period.number(metric::BILL_COUNT))
    );
    println!(
        "Average bill:   {}",
        money(period.number(metric::AVERAGE_BILL))
    );
    println!(
        "Collected:      {}",
        money(period.number(metric::TOTAL_PAID))
    );
    println!(
        "Pending dues:   {} across {} customers",
        money(dues.number(metric::TOTAL_DUES)),
        count(dues.number(metric::CUSTOMERS_WITH_DUES))
    );
    println!(
        "Low stock:      {} of {} products",
        count(stock.number(metric::LOW_STOCK_COUNT)),
        count(stock.number(metric::PRODUCT_COUNT))
    );

    let top = period.top(metric::ITEMS_SOLD, ctx.config.dashboard.top_items);
    if !top.is_empty() {
        let rows: Vec<TopItemRow> = top
            .into_iter()
            .enumerate()
            .map(|(idx, (name, quantity))| TopItemRow {
                rank: idx + 1,
                name,
                quantity: format_quantity(quantity),
            })
            .collect();
        println!();
        println!("Top items");
        println!("{}", Table::new(rows).with(Style::rounded()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(format_money(2450.0, "₹"), "₹2,450.00");
        assert_eq!(format_money(-1234567.891, "$"), "-$1,234,567.89");
        assert_eq!(format_money(0.0, "$"), "$0.00");
    }

    #[test]
    fn footer_merges_label_columns() {
        let table = "╭───┬───┬─────╮\n│ a │ b │ c   │\n├───┼───┼─────┤\n│ 1 │ 2 │ 3   │\n╰───┴───┴─────╯";
        let out = add_summary_footer(table, 2, &[("T", "9".to_string())]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[4], "├───┴───┼─────┤");
        assert_eq!(lines[5], "│     T │   9 │");
        assert_eq!(lines[6], "╰───────┴─────╯");
    }
}
