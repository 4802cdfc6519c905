mod config;
mod domain;
mod lifecycle;
mod reports;
mod storage;

use chrono::NaiveDate;
use config::Config;
use domain::OrderStatus;
use lifecycle::OrderManager;
use reports::ProfitFilter;
use rust_decimal::Decimal;
use std::env;
use std::sync::Arc;
use storage::{OrderStore, SqliteStore, SqliteStoreConfig};
use tracing::{Level, error, info};
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_CONFIG_PATH: &str = "configs/config.yaml";

fn parse_config_path() -> String {
    for arg in env::args().skip(1) {
        if let Some(path) = arg.strip_prefix("--config=") {
            return path.to_string();
        }
    }
    DEFAULT_CONFIG_PATH.to_string()
}

fn parse_arg(name: &str) -> Option<String> {
    let prefix = format!("--{}=", name);
    for arg in env::args().skip(1) {
        if let Some(value) = arg.strip_prefix(&prefix) {
            return Some(value.to_string());
        }
    }
    None
}

fn parse_date_arg(name: &str) -> Option<NaiveDate> {
    let raw = parse_arg(name)?;
    match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            eprintln!("Ignoring --{}: expected YYYY-MM-DD, got {}", name, raw);
            None
        }
    }
}

fn init_tracing(log_level: Option<&str>) {
    let level = match log_level {
        Some("debug") => Level::DEBUG,
        Some("info") => Level::INFO,
        Some("warn") | Some("warning") => Level::WARN,
        Some("error") => Level::ERROR,
        Some("trace") => Level::TRACE,
        _ => Level::INFO,
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Formats an amount the way receipts do: space-grouped digits, no
/// fraction, "FCFA" suffix.
fn format_amount(amount: Decimal) -> String {
    let whole = amount.round_dp(0).to_string();
    let (sign, digits) = match whole.strip_prefix('-') {
        Some(rest) => ("-", rest.to_string()),
        None => ("", whole),
    };

    let mut grouped = String::new();
    let len = digits.len();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    format!("{}{} FCFA", sign, grouped)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config_path = parse_config_path();
    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return;
        }
    };

    init_tracing(config.app.log_level.as_deref());

    let store_config = SqliteStoreConfig {
        path: config.store.path.clone(),
        max_connections: config.store.max_connections,
    };
    let store = match SqliteStore::new(store_config).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to open order store");
            return;
        }
    };

    let store = Arc::new(store);
    let manager = OrderManager::new(store.clone());

    info!(config = %config_path, app = %config.app.name, "Order store opened");

    if env::args().any(|arg| arg == "--debts") {
        print_debt_list(&manager).await;
    } else if env::args().any(|arg| arg == "--profit") {
        print_profit_report(&manager).await;
    } else {
        print_summary(&manager).await;
    }

    if let Err(e) = store.close().await {
        error!(error = %e, "Failed to close order store");
    }
}

/// Prints the printable debt list: every order not yet fully paid.
async fn print_debt_list(manager: &OrderManager) {
    let orders = match manager.list_orders().await {
        Ok(orders) => orders,
        Err(e) => {
            error!(error = %e, "Failed to list orders");
            return;
        }
    };

    let entries = reports::debt_list(&orders);
    if entries.is_empty() {
        println!("No outstanding special-order debts.");
        return;
    }

    println!("DEBT LIST ({} orders)", entries.len());
    let mut total = Decimal::ZERO;
    for entry in &entries {
        total += entry.remaining_balance;
        println!(
            "  #{:<5} {:<24} {:<10} {} {} - paid {} of {}, remaining {}",
            entry.order_id,
            entry.client_name,
            entry.client_phone.as_deref().unwrap_or("-"),
            entry.brand,
            entry.model,
            format_amount(entry.amount_paid),
            format_amount(entry.sale_price),
            format_amount(entry.remaining_balance),
        );
    }
    println!("Total outstanding: {}", format_amount(total));
}

/// Prints realized profit bucketed by sale day, honoring the optional
/// --search=, --from= and --to= filters.
async fn print_profit_report(manager: &OrderManager) {
    let orders = match manager.list_orders().await {
        Ok(orders) => orders,
        Err(e) => {
            error!(error = %e, "Failed to list orders");
            return;
        }
    };

    let filter = ProfitFilter {
        search: parse_arg("search"),
        start: parse_date_arg("from"),
        end: parse_date_arg("to"),
    };

    let report = reports::daily_profit(&orders, &filter);
    if report.days.is_empty() {
        println!("No sold special orders match the filter.");
        return;
    }

    println!("PROFIT REPORT - total {}", format_amount(report.total_profit));
    for day in &report.days {
        println!("{} : {}", day.date, format_amount(day.total_profit));
        for line in &day.lines {
            println!(
                "    #{:<5} {} {} - profit {}",
                line.order_id,
                line.brand,
                line.model,
                format_amount(line.profit),
            );
        }
    }
}

/// Prints a one-line-per-status summary of the order book.
async fn print_summary(manager: &OrderManager) {
    let orders = match manager.list_orders().await {
        Ok(orders) => orders,
        Err(e) => {
            error!(error = %e, "Failed to list orders");
            return;
        }
    };

    let statuses = [
        OrderStatus::Pending,
        OrderStatus::Ordered,
        OrderStatus::Received,
        OrderStatus::PartialPayment,
        OrderStatus::Sold,
        OrderStatus::Cancelled,
        OrderStatus::Replaced,
    ];

    println!("{} special orders", orders.len());
    for status in statuses {
        let count = orders.iter().filter(|o| o.status == status).count();
        if count > 0 {
            println!("  {:<16} {}", status.to_string(), count);
        }
    }

    let outstanding: Decimal = reports::debt_list(&orders)
        .iter()
        .map(|e| e.remaining_balance)
        .sum();
    println!("Outstanding debts: {}", format_amount(outstanding));
}
