//! Read-model aggregation over an order snapshot.
//!
//! Everything here is a pure function over the last-fetched order
//! collection: the debt list, the daily profit report and the free-text
//! search. Nothing is persisted; reports are recomputed on each query.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::{OrderStatus, SpecialOrder};

/// DebtEntry is one line of the printable debt list.
#[derive(Debug, Clone, PartialEq)]
pub struct DebtEntry {
    pub order_id: i64,
    pub client_name: String,
    pub client_phone: Option<String>,
    pub brand: String,
    pub model: String,
    pub sale_price: Decimal,
    pub amount_paid: Decimal,
    pub remaining_balance: Decimal,
}

/// ProfitLine is one sold article inside a daily bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfitLine {
    pub order_id: i64,
    pub brand: String,
    pub model: String,
    pub profit: Decimal,
}

/// DailyProfit is the realized profit of one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyProfit {
    pub date: NaiveDate,
    pub total_profit: Decimal,
    pub lines: Vec<ProfitLine>,
}

/// ProfitReport is the full date-bucketed profit breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfitReport {
    /// Daily buckets, most recent day first.
    pub days: Vec<DailyProfit>,
    /// Grand total across all buckets.
    pub total_profit: Decimal,
}

/// ProfitFilter narrows the profit report by text and date range.
#[derive(Debug, Clone, Default)]
pub struct ProfitFilter {
    /// Case-insensitive substring matched against client, supplier, brand
    /// and model.
    pub search: Option<String>,
    /// First day included.
    pub start: Option<NaiveDate>,
    /// Last day included, up to the whole calendar day.
    pub end: Option<NaiveDate>,
}

/// Builds the debt list: orders not yet fully paid, with their remaining
/// balance. Iteration order follows the input snapshot.
pub fn debt_list(orders: &[SpecialOrder]) -> Vec<DebtEntry> {
    orders
        .iter()
        .filter(|o| matches!(o.status, OrderStatus::Pending | OrderStatus::PartialPayment))
        .map(|o| DebtEntry {
            order_id: o.id,
            client_name: o.client_name.clone(),
            client_phone: o.client_phone.clone(),
            brand: o.brand.clone(),
            model: o.model.clone(),
            sale_price: o.sale_price,
            amount_paid: o.amount_paid,
            remaining_balance: o.remaining_balance(),
        })
        .collect()
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn matches_profit_search(order: &SpecialOrder, term: &str) -> bool {
    contains_ci(&order.client_name, term)
        || contains_ci(&order.supplier_name, term)
        || contains_ci(&order.brand, term)
        || contains_ci(&order.model, term)
}

/// Computes realized profit of sold orders, bucketed by the calendar date
/// of the sale (the last status change), newest day first.
///
/// Both date bounds are inclusive; the end bound covers the entire calendar
/// day. Profit is counted only for orders currently Sold, so a sale that
/// was later replaced drops out of the report.
pub fn daily_profit(orders: &[SpecialOrder], filter: &ProfitFilter) -> ProfitReport {
    let term = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    let mut sold: Vec<&SpecialOrder> = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Sold)
        .filter(|o| term.as_deref().is_none_or(|t| matches_profit_search(o, t)))
        .filter(|o| {
            let day = o.status_changed_date.date_naive();
            filter.start.is_none_or(|start| day >= start)
                && filter.end.is_none_or(|end| day <= end)
        })
        .collect();

    // Newest sales first; stable within a day.
    sold.sort_by(|a, b| b.status_changed_date.cmp(&a.status_changed_date));

    let mut days: Vec<DailyProfit> = Vec::new();
    let mut total_profit = Decimal::ZERO;

    for order in sold {
        let date = order.status_changed_date.date_naive();
        let profit = order.sale_price - order.purchase_price;
        total_profit += profit;

        let line = ProfitLine {
            order_id: order.id,
            brand: order.brand.clone(),
            model: order.model.clone(),
            profit,
        };

        match days.last_mut() {
            Some(day) if day.date == date => {
                day.total_profit += profit;
                day.lines.push(line);
            }
            _ => days.push(DailyProfit {
                date,
                total_profit: profit,
                lines: vec![line],
            }),
        }
    }

    ProfitReport { days, total_profit }
}

/// Free-text search across the whole order book: brand, model, IMEI,
/// storage capacity, item type, carton grade, client and supplier names.
pub fn search_orders<'a>(orders: &'a [SpecialOrder], term: &str) -> Vec<&'a SpecialOrder> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }

    orders
        .iter()
        .filter(|o| {
            contains_ci(&o.brand, &term)
                || contains_ci(&o.model, &term)
                || o.imei.as_deref().is_some_and(|v| contains_ci(v, &term))
                || o.storage_capacity
                    .as_deref()
                    .is_some_and(|v| contains_ci(v, &term))
                || contains_ci(&o.item_type.to_string(), &term)
                || o.carton_grade
                    .map(|g| g.to_string())
                    .is_some_and(|v| contains_ci(&v, &term))
                || contains_ci(&o.client_name, &term)
                || contains_ci(&o.supplier_name, &term)
        })
        .collect()
}
