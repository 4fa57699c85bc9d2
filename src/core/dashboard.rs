//! Dashboard aggregation service.
//!
//! [`DashboardService`] reads a point-in-time snapshot through the data access
//! layer on every call and folds it into metrics, chart series and alerts. It
//! holds no state between calls and never writes. Any data-source failure is
//! returned to the caller; nothing is replaced by zeroed defaults.

use super::{
    DateRange,
    alerts::{self, Alert, AlertInputs},
    charts::{self, ChartSeries, Period},
    cycle::get_active_cycles,
    expense::{ExpenseFilter, get_all_expenses},
    pen::get_all_pens,
    purchase::{PurchaseFilter, get_all_purchases},
    report::{self, CashFlow, IncomeStatement, LotProfitability},
    revenue::{RevenueFilter, get_all_revenues},
    stats::{self, ExpenseStats, RevenueStats},
    sum_amounts, to_amount,
};
use crate::{
    config::AlertThresholds,
    entities::{PurchaseStatus, cattle_purchase, cycle, expense, pen, revenue},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, Iterable};
use serde::Serialize;
use std::{collections::BTreeMap, future::Future, sync::Arc, time::Duration};
use tracing::{debug, instrument, warn};

/// Headline numbers for the dashboard tiles
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    /// Every purchase on record
    pub total_purchases: u64,
    /// Purchases neither sold nor cancelled
    pub active_purchases: u64,
    /// Purchase count per status, every status present
    pub purchases_by_status: BTreeMap<String, u64>,
    /// Heads in confined lots
    pub confined_heads: i64,
    /// Every pen on record
    pub total_pens: u64,
    /// Pens flagged active
    pub active_pens: u64,
    /// Capacity of active pens
    pub total_capacity: i64,
    /// Confined heads allocated to active pens
    pub occupancy: i64,
    /// `occupancy / total_capacity` in percent, 0 without capacity
    pub occupancy_rate: f64,
    /// Sum of pending revenue amounts
    pub total_receivables: f64,
    /// Sum of unpaid expense amounts
    pub total_payables: f64,
    /// Revenue statistics
    pub revenues: RevenueStats,
    /// Expense statistics
    pub expenses: ExpenseStats,
    /// Name of the active cycle, if any
    pub active_cycle: Option<String>,
}

/// Combined dashboard payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    /// Headline numbers
    pub metrics: DashboardMetrics,
    /// Chart series for the requested period
    pub charts: ChartSeries,
    /// Sorted alerts
    pub alerts: Vec<Alert>,
    /// When the snapshot was taken
    pub last_update: DateTime<Utc>,
}

/// Rows the metrics are computed from
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot<'a> {
    /// All purchases
    pub purchases: &'a [cattle_purchase::Model],
    /// All pens
    pub pens: &'a [pen::Model],
    /// All revenues
    pub revenues: &'a [revenue::Model],
    /// All expenses
    pub expenses: &'a [expense::Model],
    /// Cycles marked active
    pub active_cycles: &'a [cycle::Model],
}

/// Folds a snapshot into [`DashboardMetrics`].
#[must_use]
pub fn build_metrics(snapshot: MetricsSnapshot<'_>, now: DateTime<Utc>) -> DashboardMetrics {
    let mut purchases_by_status: BTreeMap<String, u64> = PurchaseStatus::iter()
        .map(|status| (status.as_str().to_string(), 0))
        .collect();
    let mut active_purchases = 0;
    let mut confined_heads = 0;
    for purchase in snapshot.purchases {
        *purchases_by_status
            .entry(purchase.status.as_str().to_string())
            .or_insert(0) += 1;
        if purchase.status.is_active() {
            active_purchases += 1;
        }
        if purchase.status == PurchaseStatus::Confined {
            confined_heads += i64::from(purchase.head_count);
        }
    }

    let occupancy_by_pen = alerts::occupancy_by_pen(snapshot.purchases);
    let active_pens: Vec<&pen::Model> = snapshot.pens.iter().filter(|p| p.is_active).collect();
    let total_capacity: i64 = active_pens.iter().map(|p| i64::from(p.capacity)).sum();
    let occupancy: i64 = active_pens
        .iter()
        .filter_map(|p| occupancy_by_pen.get(&p.id))
        .sum();
    #[allow(clippy::cast_precision_loss)] // head counts are far below 2^52
    let occupancy_rate = if total_capacity > 0 {
        occupancy as f64 / total_capacity as f64 * 100.0
    } else {
        0.0
    };

    let revenues = stats::revenue_stats(snapshot.revenues, now);
    let expenses = stats::expense_stats(snapshot.expenses, now);
    let total_receivables = to_amount(sum_amounts(
        snapshot
            .revenues
            .iter()
            .filter(|r| !r.is_received)
            .map(|r| r.total_amount),
    ));

    DashboardMetrics {
        total_purchases: snapshot.purchases.len() as u64,
        active_purchases,
        purchases_by_status,
        confined_heads,
        total_pens: snapshot.pens.len() as u64,
        active_pens: active_pens.len() as u64,
        total_capacity,
        occupancy,
        occupancy_rate,
        total_receivables,
        total_payables: expenses.pending_amount,
        revenues,
        expenses,
        active_cycle: snapshot.active_cycles.first().map(|c| c.name.clone()),
    }
}

/// Read-only aggregation over the current contents of the database
#[derive(Debug, Clone)]
pub struct DashboardService {
    db: Arc<DatabaseConnection>,
    timeout: Duration,
    thresholds: AlertThresholds,
}

impl DashboardService {
    /// Creates a service over `db`. Every call is cut off after `timeout`.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        timeout: Duration,
        thresholds: AlertThresholds,
    ) -> Self {
        Self {
            db,
            timeout,
            thresholds,
        }
    }

    async fn bounded<T, F>(&self, operation: &'static str, work: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.timeout, work)
            .await
            .map_err(|_| {
                warn!(operation, timeout_ms = self.timeout.as_millis(), "Dashboard call timed out");
                Error::Timeout {
                    operation,
                    millis: self.timeout.as_millis(),
                }
            })?
    }

    /// Headline metrics as of now.
    pub async fn metrics(&self) -> Result<DashboardMetrics> {
        self.metrics_at(Utc::now()).await
    }

    /// Headline metrics as of `now`.
    #[instrument(skip(self))]
    pub async fn metrics_at(&self, now: DateTime<Utc>) -> Result<DashboardMetrics> {
        self.bounded("metrics", async {
            let purchases = get_all_purchases(&self.db, PurchaseFilter::default()).await?;
            let pens = get_all_pens(&self.db).await?;
            let revenues = get_all_revenues(&self.db, RevenueFilter::default()).await?;
            let expenses = get_all_expenses(&self.db, ExpenseFilter::default()).await?;
            let active_cycles = get_active_cycles(&self.db).await?;
            debug!(
                purchases = purchases.len(),
                pens = pens.len(),
                revenues = revenues.len(),
                expenses = expenses.len(),
                "Metrics snapshot loaded"
            );

            Ok(build_metrics(
                MetricsSnapshot {
                    purchases: &purchases,
                    pens: &pens,
                    revenues: &revenues,
                    expenses: &expenses,
                    active_cycles: &active_cycles,
                },
                now,
            ))
        })
        .await
    }

    /// Chart series for `period` ending now.
    pub async fn charts(&self, period: Period) -> Result<ChartSeries> {
        self.charts_at(period, Utc::now()).await
    }

    /// Chart series for `period` ending at `now`.
    #[instrument(skip(self))]
    pub async fn charts_at(&self, period: Period, now: DateTime<Utc>) -> Result<ChartSeries> {
        self.bounded("charts", async {
            let range = charts::window(period, now);
            let revenues = get_all_revenues(
                &self.db,
                RevenueFilter {
                    range,
                    ..RevenueFilter::default()
                },
            )
            .await?;
            let expenses = get_all_expenses(
                &self.db,
                ExpenseFilter {
                    range,
                    ..ExpenseFilter::default()
                },
            )
            .await?;
            let purchases = get_all_purchases(
                &self.db,
                PurchaseFilter {
                    range,
                    ..PurchaseFilter::default()
                },
            )
            .await?;

            Ok(charts::build_series(period, now, &revenues, &expenses, &purchases))
        })
        .await
    }

    /// Alerts as of now.
    pub async fn alerts(&self) -> Result<Vec<Alert>> {
        self.alerts_at(Utc::now()).await
    }

    /// Alerts as of `now`, most severe first.
    #[instrument(skip(self))]
    pub async fn alerts_at(&self, now: DateTime<Utc>) -> Result<Vec<Alert>> {
        self.bounded("alerts", async {
            let pens = get_all_pens(&self.db).await?;
            let purchases = get_all_purchases(
                &self.db,
                PurchaseFilter {
                    status: Some(PurchaseStatus::Confined),
                    ..PurchaseFilter::default()
                },
            )
            .await?;
            let revenues = get_all_revenues(
                &self.db,
                RevenueFilter {
                    is_received: Some(false),
                    ..RevenueFilter::default()
                },
            )
            .await?;
            let expenses = get_all_expenses(
                &self.db,
                ExpenseFilter {
                    is_paid: Some(false),
                    ..ExpenseFilter::default()
                },
            )
            .await?;
            let active_cycles = get_active_cycles(&self.db).await?;

            Ok(alerts::scan_alerts(
                AlertInputs {
                    pens: &pens,
                    purchases: &purchases,
                    revenues: &revenues,
                    expenses: &expenses,
                    active_cycles: &active_cycles,
                },
                now,
                self.thresholds,
            ))
        })
        .await
    }

    /// Revenue summary under the same time limit as the dashboard.
    #[instrument(skip(self))]
    pub async fn revenue_stats(&self) -> Result<RevenueStats> {
        self.bounded("revenue_stats", stats::get_revenue_stats(&self.db, Utc::now()))
            .await
    }

    /// Expense summary under the same time limit as the dashboard.
    #[instrument(skip(self))]
    pub async fn expense_stats(&self) -> Result<ExpenseStats> {
        self.bounded("expense_stats", stats::get_expense_stats(&self.db, Utc::now()))
            .await
    }

    /// Income statement over `range`.
    #[instrument(skip(self))]
    pub async fn income_statement(&self, range: DateRange) -> Result<IncomeStatement> {
        self.bounded("income_statement", report::income_statement(&self.db, range))
            .await
    }

    /// Cash flow over `range`.
    #[instrument(skip(self))]
    pub async fn cash_flow(&self, range: DateRange) -> Result<CashFlow> {
        self.bounded("cash_flow", report::cash_flow(&self.db, range)).await
    }

    /// Profitability of every lot.
    #[instrument(skip(self))]
    pub async fn lot_profitability(&self) -> Result<Vec<LotProfitability>> {
        self.bounded("lot_profitability", report::lot_profitability(&self.db))
            .await
    }

    /// Metrics, charts and alerts fetched concurrently.
    ///
    /// All three must succeed. A failure is reported with the name of the
    /// section that produced it.
    pub async fn overview(&self, period: Period) -> Result<DashboardOverview> {
        self.overview_at(period, Utc::now()).await
    }

    /// [`Self::overview`] as of `now`.
    #[instrument(skip(self))]
    pub async fn overview_at(
        &self,
        period: Period,
        now: DateTime<Utc>,
    ) -> Result<DashboardOverview> {
        let section = |name: &'static str| {
            move |source: Error| Error::DashboardSection {
                section: name,
                source: Box::new(source),
            }
        };

        let (metrics, charts, alerts) = tokio::try_join!(
            async { self.metrics_at(now).await.map_err(section("metrics")) },
            async { self.charts_at(period, now).await.map_err(section("charts")) },
            async { self.alerts_at(now).await.map_err(section("alerts")) },
        )?;

        Ok(DashboardOverview {
            metrics,
            charts,
            alerts,
            last_update: now,
        })
    }
}
