//! # Report Aggregator
//!
//! Read-only summaries over the transaction log.
//!
//! ## Date Ranges
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Report Ranges                                   │
//! │                                                                         │
//! │  ◄──── yesterday ────►◄──────── today ─────────►                       │
//! │  │                    │                         │                       │
//! │  prev midnight        local midnight            now                     │
//! │                                                                         │
//! │  ◄──────────────── week: now − 7×24h ──────────►                       │
//! │  ◄──────────────── month: now − 30×24h ────────►  (rolling window)     │
//! │                                                                         │
//! │  Lower bounds inclusive, upper bounds exclusive.                       │
//! │  Midnights are taken in the caller's timezone, compared in UTC.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{Money, PreciseMoney};
use crate::types::{PaymentMethod, Transaction};

/// Default length of the top-products list.
pub const DEFAULT_TOP_PRODUCTS: usize = 5;

// =============================================================================
// Report Range
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ReportRange {
    #[default]
    Today,
    Yesterday,
    Week,
    Month,
    All,
}

impl ReportRange {
    pub const ALL: [ReportRange; 5] = [
        ReportRange::Today,
        ReportRange::Yesterday,
        ReportRange::Week,
        ReportRange::Month,
        ReportRange::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportRange::Today => "today",
            ReportRange::Yesterday => "yesterday",
            ReportRange::Week => "week",
            ReportRange::Month => "month",
            ReportRange::All => "all",
        }
    }

    /// Returns `[start, end)` in UTC. `None` means unbounded.
    pub fn bounds<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let tz = now.timezone();
        let today = now.date_naive();
        let now_utc = now.with_timezone(&Utc);

        match self {
            ReportRange::Today => (Some(local_midnight(&tz, today)), None),
            ReportRange::Yesterday => {
                let yesterday = today.pred_opt().unwrap_or(today);
                (
                    Some(local_midnight(&tz, yesterday)),
                    Some(local_midnight(&tz, today)),
                )
            }
            ReportRange::Week => (Some(now_utc - Duration::days(7)), None),
            ReportRange::Month => (Some(now_utc - Duration::days(30)), None),
            ReportRange::All => (None, None),
        }
    }

    /// Whether `timestamp` falls inside this range as seen from `now`.
    pub fn contains<Tz: TimeZone>(&self, timestamp: &DateTime<Utc>, now: &DateTime<Tz>) -> bool {
        let (start, end) = self.bounds(now);
        start.map_or(true, |s| *timestamp >= s) && end.map_or(true, |e| *timestamp < e)
    }
}

impl fmt::Display for ReportRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportRange {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportRange::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "range".to_string(),
                allowed: ReportRange::ALL.iter().map(|r| r.as_str().to_string()).collect(),
            })
    }
}

/// Start of `date` in `tz`, as UTC.
///
/// When local midnight does not exist (DST gap), the offset in force at
/// that wall-clock instant is used instead.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        None => {
            let offset = tz.offset_from_utc_datetime(&naive).fix().local_minus_utc();
            Utc.from_utc_datetime(&(naive - Duration::seconds(i64::from(offset))))
        }
    }
}

/// Transactions inside `range`, log order preserved.
pub fn filter_by_range<'a, Tz: TimeZone>(
    transactions: &'a [Transaction],
    range: ReportRange,
    now: &DateTime<Tz>,
) -> Vec<&'a Transaction> {
    let (start, end) = range.bounds(now);
    transactions
        .iter()
        .filter(|t| start.map_or(true, |s| t.timestamp >= s))
        .filter(|t| end.map_or(true, |e| t.timestamp < e))
        .collect()
}

// =============================================================================
// Metrics
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesMetrics {
    pub total_sales: PreciseMoney,
    pub total_gst: PreciseMoney,
    pub total_discount: PreciseMoney,
    pub transaction_count: usize,
    /// Zero when there are no transactions.
    pub average_sale: PreciseMoney,
}

pub fn compute_metrics(transactions: &[&Transaction]) -> SalesMetrics {
    let total_sales: PreciseMoney = transactions.iter().map(|t| t.total).sum();
    let count = transactions.len();

    SalesMetrics {
        total_sales,
        total_gst: transactions.iter().map(|t| t.gst_amount).sum(),
        total_discount: transactions.iter().map(|t| t.discount_amount).sum(),
        transaction_count: count,
        average_sale: total_sales.div_count(count),
    }
}

// =============================================================================
// Top Products
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductSales {
    pub product_id: String,
    /// Name as of the first sale seen.
    pub name: String,
    pub quantity: i64,
    /// Snapshot price × quantity, before discount and GST.
    pub revenue: Money,
}

/// Best sellers by revenue.
///
/// Ties keep first-seen order (newest transaction first).
pub fn top_products(transactions: &[&Transaction], limit: usize) -> Vec<ProductSales> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<ProductSales> = Vec::new();

    for line in transactions.iter().flat_map(|t| t.lines.iter()) {
        match index.get(line.product_id.as_str()) {
            Some(&i) => {
                rows[i].quantity += line.quantity;
                rows[i].revenue += line.revenue();
            }
            None => {
                index.insert(line.product_id.as_str(), rows.len());
                rows.push(ProductSales {
                    product_id: line.product_id.clone(),
                    name: line.name_snapshot.clone(),
                    quantity: line.quantity,
                    revenue: line.revenue(),
                });
            }
        }
    }

    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    rows.truncate(limit);
    rows
}

// =============================================================================
// Payment Breakdown
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentBreakdown {
    pub cash: PreciseMoney,
    pub card: PreciseMoney,
    pub upi: PreciseMoney,
}

impl PaymentBreakdown {
    pub fn get(&self, method: PaymentMethod) -> PreciseMoney {
        match method {
            PaymentMethod::Cash => self.cash,
            PaymentMethod::Card => self.card,
            PaymentMethod::Upi => self.upi,
        }
    }

    fn slot_mut(&mut self, method: PaymentMethod) -> &mut PreciseMoney {
        match method {
            PaymentMethod::Cash => &mut self.cash,
            PaymentMethod::Card => &mut self.card,
            PaymentMethod::Upi => &mut self.upi,
        }
    }
}

pub fn payment_breakdown(transactions: &[&Transaction]) -> PaymentBreakdown {
    let mut breakdown = PaymentBreakdown::default();
    for t in transactions {
        *breakdown.slot_mut(t.payment_method) += t.total;
    }
    breakdown
}

// =============================================================================
// Sales Report
// =============================================================================

/// Everything the reports screen shows for one range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReport {
    pub range: ReportRange,
    pub metrics: SalesMetrics,
    pub top_products: Vec<ProductSales>,
    pub payment_breakdown: PaymentBreakdown,
}

impl SalesReport {
    pub fn build<Tz: TimeZone>(
        transactions: &[Transaction],
        range: ReportRange,
        now: &DateTime<Tz>,
        top_limit: usize,
    ) -> Self {
        let selected = filter_by_range(transactions, range, now);
        SalesReport {
            range,
            metrics: compute_metrics(&selected),
            top_products: top_products(&selected, top_limit),
            payment_breakdown: payment_breakdown(&selected),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::tests::transaction;
    use crate::types::{DiscountRate, LineAmounts, TaxRate, TransactionLine};
    use chrono::FixedOffset;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 1800).unwrap()
    }

    fn ist_at(day: u32, h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
        ist().with_ymd_and_hms(2026, 10, day, h, m, s).unwrap()
    }

    fn sale(id: &str, at: DateTime<Utc>, method: PaymentMethod, total_paise: i64) -> Transaction {
        let mut t = transaction(id, &format!("INV-{}", id), at);
        t.payment_method = method;
        t.total = PreciseMoney::from_money(Money::from_paise(total_paise));
        t
    }

    fn line(product_id: &str, price_paise: i64, quantity: i64) -> TransactionLine {
        let unit_price = Money::from_paise(price_paise);
        TransactionLine {
            product_id: product_id.to_string(),
            name_snapshot: format!("Product {}", product_id),
            barcode_snapshot: format!("89010308754{:0>2}", product_id),
            unit_price,
            gst_rate: TaxRate::from_bps(500),
            quantity,
            discount: DiscountRate::NONE,
            amounts: LineAmounts::compute(unit_price, quantity, DiscountRate::NONE, TaxRate::from_bps(500)),
        }
    }

    #[test]
    fn test_today_boundary_in_local_time() {
        let now = ist_at(15, 14, 0, 0);
        let log = vec![
            sale("late", ist_at(14, 23, 59, 59).with_timezone(&Utc), PaymentMethod::Cash, 100),
            sale("early", ist_at(15, 0, 0, 1).with_timezone(&Utc), PaymentMethod::Cash, 100),
        ];

        let today: Vec<&str> = filter_by_range(&log, ReportRange::Today, &now)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(today, vec!["early"]);

        let yesterday: Vec<&str> = filter_by_range(&log, ReportRange::Yesterday, &now)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(yesterday, vec!["late"]);
    }

    #[test]
    fn test_yesterday_excludes_today_midnight() {
        let now = ist_at(15, 9, 0, 0);
        let midnight = ist_at(15, 0, 0, 0).with_timezone(&Utc);
        let prev_midnight = ist_at(14, 0, 0, 0).with_timezone(&Utc);

        assert!(!ReportRange::Yesterday.contains(&midnight, &now));
        assert!(ReportRange::Yesterday.contains(&prev_midnight, &now));
        assert!(ReportRange::Today.contains(&midnight, &now));
    }

    #[test]
    fn test_month_is_rolling_thirty_days() {
        let now = Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap();
        let inside = now - Duration::days(30) + Duration::seconds(1);
        let outside = now - Duration::days(30) - Duration::seconds(1);
        // Same calendar month but outside the 7-day window
        let early_october = Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap();

        assert!(ReportRange::Month.contains(&inside, &now));
        assert!(!ReportRange::Month.contains(&outside, &now));
        assert!(ReportRange::Month.contains(&early_october, &now));
        assert!(!ReportRange::Week.contains(&early_october, &now));
        assert!(ReportRange::All.contains(&outside, &now));
    }

    #[test]
    fn test_average_sale_of_nothing_is_zero() {
        let metrics = compute_metrics(&[]);
        assert_eq!(metrics.transaction_count, 0);
        assert!(metrics.average_sale.is_zero());
    }

    #[test]
    fn test_metrics_sum_totals() {
        let now = Utc::now();
        let a = sale("a", now, PaymentMethod::Cash, 25200);
        let b = sale("b", now, PaymentMethod::Upi, 6825);

        let metrics = compute_metrics(&[&a, &b]);
        assert_eq!(metrics.transaction_count, 2);
        assert_eq!(metrics.total_sales.round_to_paise().paise(), 32025);
        assert_eq!(metrics.average_sale.round_to_paise().paise(), 16013);
    }

    #[test]
    fn test_top_products_aggregates_across_transactions() {
        let now = Utc::now();
        let mut a = sale("a", now, PaymentMethod::Cash, 0);
        a.lines = vec![line("1", 12000, 2), line("2", 6500, 1)];
        let mut b = sale("b", now, PaymentMethod::Card, 0);
        b.lines = vec![line("1", 12000, 1)];

        let top = top_products(&[&a, &b], DEFAULT_TOP_PRODUCTS);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_id, "1");
        assert_eq!(top[0].quantity, 3);
        assert_eq!(top[0].revenue.paise(), 36000);
    }

    #[test]
    fn test_top_products_ties_keep_first_seen_and_truncate() {
        let now = Utc::now();
        let mut a = sale("a", now, PaymentMethod::Cash, 0);
        a.lines = vec![line("7", 1000, 1), line("3", 1000, 1), line("5", 500, 1)];

        let top = top_products(&[&a], 2);
        let ids: Vec<&str> = top.iter().map(|p| p.product_id.as_str()).collect();
        assert_eq!(ids, vec!["7", "3"]);
    }

    #[test]
    fn test_payment_breakdown_per_method() {
        let now = Utc::now();
        let a = sale("a", now, PaymentMethod::Cash, 1000);
        let b = sale("b", now, PaymentMethod::Cash, 500);
        let c = sale("c", now, PaymentMethod::Upi, 250);

        let breakdown = payment_breakdown(&[&a, &b, &c]);
        assert_eq!(breakdown.get(PaymentMethod::Cash).round_to_paise().paise(), 1500);
        assert!(breakdown.card.is_zero());
        assert_eq!(breakdown.upi.round_to_paise().paise(), 250);
    }

    #[test]
    fn test_build_report_for_range() {
        let now = ist_at(15, 18, 0, 0);
        let log = vec![
            sale("new", ist_at(15, 10, 0, 0).with_timezone(&Utc), PaymentMethod::Card, 4000),
            sale("old", ist_at(1, 10, 0, 0).with_timezone(&Utc), PaymentMethod::Cash, 9000),
        ];

        let report = SalesReport::build(&log, ReportRange::Today, &now, DEFAULT_TOP_PRODUCTS);
        assert_eq!(report.metrics.transaction_count, 1);
        assert_eq!(report.payment_breakdown.card.round_to_paise().paise(), 4000);

        let all = SalesReport::build(&log, ReportRange::All, &now, DEFAULT_TOP_PRODUCTS);
        assert_eq!(all.metrics.transaction_count, 2);
    }

    #[test]
    fn test_range_parsing() {
        assert_eq!("Month".parse::<ReportRange>().unwrap(), ReportRange::Month);
        assert!(matches!(
            "quarter".parse::<ReportRange>(),
            Err(ValidationError::NotAllowed { .. })
        ));
        assert_eq!(serde_json::to_string(&ReportRange::Week).unwrap(), "\"week\"");
    }
}
