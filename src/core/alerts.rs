//! Condition-based dashboard alerts.
//!
//! Alerts are derived at read time from a snapshot of pens, purchases, revenues,
//! expenses and cycles. Nothing here is stored.

use super::stats::{is_expense_overdue, is_revenue_overdue};
use crate::{
    config::AlertThresholds,
    entities::{PurchaseStatus, cattle_purchase, cycle, expense, pen, revenue},
};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::{cmp::Ordering, collections::HashMap};

/// How urgent an alert is. Ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Heads-up
    Info,
    /// Needs attention
    Warning,
    /// Needs attention now
    Critical,
}

/// What condition raised the alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    /// Pending revenue past its expected date
    OverdueRevenue,
    /// Confined heads exceed pen capacity
    PenOverCapacity,
    /// Unpaid expense past its due date
    OverdueExpense,
    /// Unpaid expense due within the configured window
    ExpenseDueSoon,
    /// More than one cycle marked active
    MultipleActiveCycles,
}

/// One alert
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Urgency
    pub severity: Severity,
    /// Triggering condition
    pub kind: AlertKind,
    /// Human-readable description
    pub message: String,
    /// Id of the related row (pen, revenue, expense or cycle)
    pub entity_id: i64,
    /// Relevant due date, when the condition has one
    pub due_date: Option<DateTime<Utc>>,
}

/// Everything the scanner looks at
#[derive(Debug, Clone, Copy)]
pub struct AlertInputs<'a> {
    /// All pens
    pub pens: &'a [pen::Model],
    /// All purchases (only confined ones count towards occupancy)
    pub purchases: &'a [cattle_purchase::Model],
    /// All revenues
    pub revenues: &'a [revenue::Model],
    /// All expenses
    pub expenses: &'a [expense::Model],
    /// Cycles currently marked active
    pub active_cycles: &'a [cycle::Model],
}

/// Confined head count per pen id.
#[must_use]
pub fn occupancy_by_pen(purchases: &[cattle_purchase::Model]) -> HashMap<i64, i64> {
    let mut occupancy = HashMap::new();
    for purchase in purchases {
        if purchase.status == PurchaseStatus::Confined
            && let Some(pen_id) = purchase.pen_id
        {
            *occupancy.entry(pen_id).or_insert(0) += i64::from(purchase.head_count);
        }
    }
    occupancy
}

fn overdue_severity(
    due: DateTime<Utc>,
    now: DateTime<Utc>,
    thresholds: AlertThresholds,
) -> Severity {
    let critical = TimeDelta::try_days(thresholds.critical_overdue_days)
        .is_some_and(|limit| now.signed_duration_since(due) > limit);
    if critical {
        Severity::Critical
    } else {
        Severity::Warning
    }
}

/// Orders alerts: most severe first, then earliest due date (undated last),
/// then entity id.
pub fn sort_alerts(alerts: &mut [Alert]) {
    alerts.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });
}

/// Scans the snapshot and returns sorted alerts.
#[must_use]
pub fn scan_alerts(
    inputs: AlertInputs<'_>,
    now: DateTime<Utc>,
    thresholds: AlertThresholds,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    let occupancy = occupancy_by_pen(inputs.purchases);
    for pen in inputs.pens.iter().filter(|p| p.is_active) {
        let heads = occupancy.get(&pen.id).copied().unwrap_or(0);
        if heads > i64::from(pen.capacity) {
            alerts.push(Alert {
                severity: Severity::Critical,
                kind: AlertKind::PenOverCapacity,
                message: format!(
                    "Pen {} holds {heads} head for a capacity of {}",
                    pen.pen_number, pen.capacity
                ),
                entity_id: pen.id,
                due_date: None,
            });
        }
    }

    for row in inputs.revenues {
        if is_revenue_overdue(row, now)
            && let Some(due) = row.received_date
        {
            alerts.push(Alert {
                severity: overdue_severity(due, now, thresholds),
                kind: AlertKind::OverdueRevenue,
                message: format!(
                    "Revenue '{}' was expected on {}",
                    row.description,
                    due.format("%Y-%m-%d")
                ),
                entity_id: row.id,
                due_date: Some(due),
            });
        }
    }

    let due_soon = TimeDelta::try_days(thresholds.due_soon_days)
        .and_then(|ahead| now.checked_add_signed(ahead))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    for row in inputs.expenses.iter().filter(|e| !e.is_paid) {
        if is_expense_overdue(row, now) {
            alerts.push(Alert {
                severity: overdue_severity(row.due_date, now, thresholds),
                kind: AlertKind::OverdueExpense,
                message: format!(
                    "Expense '{}' was due on {}",
                    row.description,
                    row.due_date.format("%Y-%m-%d")
                ),
                entity_id: row.id,
                due_date: Some(row.due_date),
            });
        } else if row.due_date <= due_soon {
            alerts.push(Alert {
                severity: Severity::Info,
                kind: AlertKind::ExpenseDueSoon,
                message: format!(
                    "Expense '{}' is due on {}",
                    row.description,
                    row.due_date.format("%Y-%m-%d")
                ),
                entity_id: row.id,
                due_date: Some(row.due_date),
            });
        }
    }

    if inputs.active_cycles.len() > 1 {
        let names: Vec<&str> = inputs.active_cycles.iter().map(|c| c.name.as_str()).collect();
        for cycle in inputs.active_cycles {
            alerts.push(Alert {
                severity: Severity::Warning,
                kind: AlertKind::MultipleActiveCycles,
                message: format!("Several cycles are active at once: {}", names.join(", ")),
                entity_id: cycle.id,
                due_date: None,
            });
        }
    }

    sort_alerts(&mut alerts);
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CycleStatus, PenStatus, PenType};
    use crate::test_utils::{expense_row, purchase_row, revenue_row};
    use chrono::Duration;

    fn pen(id: i64, capacity: i32) -> pen::Model {
        pen::Model {
            id,
            pen_number: format!("P-{id:02}"),
            capacity,
            status: PenStatus::Occupied,
            pen_type: PenType::Fattening,
            is_active: true,
        }
    }

    fn confined(id: i64, pen_id: i64, heads: i32) -> cattle_purchase::Model {
        let mut row = purchase_row(id, Some(1000.0), Utc::now());
        row.status = PurchaseStatus::Confined;
        row.pen_id = Some(pen_id);
        row.head_count = heads;
        row
    }

    fn active_cycle(id: i64, name: &str) -> cycle::Model {
        cycle::Model {
            id,
            name: name.to_string(),
            start_date: Utc::now(),
            end_date: None,
            status: CycleStatus::Active,
        }
    }

    fn inputs<'a>(
        pens: &'a [pen::Model],
        purchases: &'a [cattle_purchase::Model],
        revenues: &'a [revenue::Model],
        expenses: &'a [expense::Model],
        active_cycles: &'a [cycle::Model],
    ) -> AlertInputs<'a> {
        AlertInputs {
            pens,
            purchases,
            revenues,
            expenses,
            active_cycles,
        }
    }

    #[test]
    fn test_occupancy_counts_only_confined() {
        let mut received = confined(3, 1, 50);
        received.status = PurchaseStatus::Received;
        let purchases = vec![confined(1, 1, 30), confined(2, 1, 25), received, confined(4, 2, 10)];

        let occupancy = occupancy_by_pen(&purchases);
        assert_eq!(occupancy.get(&1), Some(&55));
        assert_eq!(occupancy.get(&2), Some(&10));
    }

    #[test]
    fn test_pen_over_capacity() {
        let pens = vec![pen(1, 50), pen(2, 100)];
        let purchases = vec![confined(1, 1, 30), confined(2, 1, 25), confined(3, 2, 100)];

        let alerts = scan_alerts(
            inputs(&pens, &purchases, &[], &[], &[]),
            Utc::now(),
            AlertThresholds::default(),
        );
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::PenOverCapacity);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].entity_id, 1);
    }

    #[test]
    fn test_overdue_severity_by_age() {
        let now = Utc::now();
        let revenues = vec![
            revenue_row(1, Some(10.0), false, Some(now - Duration::days(3))),
            revenue_row(2, Some(10.0), false, Some(now - Duration::days(45))),
            revenue_row(3, Some(10.0), true, Some(now - Duration::days(45))),
            revenue_row(4, Some(10.0), false, Some(now + Duration::days(1))),
        ];

        let alerts = scan_alerts(
            inputs(&[], &[], &revenues, &[], &[]),
            now,
            AlertThresholds::default(),
        );
        assert_eq!(alerts.len(), 2);
        assert_eq!((alerts[0].entity_id, alerts[0].severity), (2, Severity::Critical));
        assert_eq!((alerts[1].entity_id, alerts[1].severity), (1, Severity::Warning));
    }

    #[test]
    fn test_ordering_severity_then_due_date() {
        let now = Utc::now();
        let pens = vec![pen(9, 1)];
        let purchases = vec![confined(1, 9, 2)];
        let expenses = vec![
            expense_row(1, Some(5.0), false, now + Duration::days(2)),
            expense_row(2, Some(5.0), false, now - Duration::days(1)),
            expense_row(3, Some(5.0), false, now - Duration::days(5)),
            expense_row(4, Some(5.0), false, now - Duration::days(60)),
            expense_row(5, Some(5.0), false, now + Duration::days(30)),
            expense_row(6, Some(5.0), true, now - Duration::days(60)),
        ];
        let cycles = vec![active_cycle(1, "A"), active_cycle(2, "B")];

        let alerts = scan_alerts(
            inputs(&pens, &purchases, &[], &expenses, &cycles),
            now,
            AlertThresholds::default(),
        );
        let order: Vec<(AlertKind, i64)> = alerts.iter().map(|a| (a.kind, a.entity_id)).collect();
        assert_eq!(
            order,
            [
                (AlertKind::OverdueExpense, 4),
                (AlertKind::PenOverCapacity, 9),
                (AlertKind::OverdueExpense, 3),
                (AlertKind::OverdueExpense, 2),
                (AlertKind::MultipleActiveCycles, 1),
                (AlertKind::MultipleActiveCycles, 2),
                (AlertKind::ExpenseDueSoon, 1),
            ]
        );
        assert!(alerts.windows(2).all(|w| w[0].severity >= w[1].severity));
    }

    #[test]
    fn test_single_active_cycle_is_quiet() {
        let cycles = vec![active_cycle(1, "A")];
        let alerts = scan_alerts(
            inputs(&[], &[], &[], &[], &cycles),
            Utc::now(),
            AlertThresholds::default(),
        );
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_out_of_range_thresholds_do_not_overflow() {
        let now = Utc::now();
        let expenses = vec![
            expense_row(1, Some(5.0), false, now - Duration::days(400)),
            expense_row(2, Some(5.0), false, now + Duration::days(400)),
        ];
        let thresholds = AlertThresholds {
            due_soon_days: i64::MAX,
            critical_overdue_days: i64::MAX,
        };

        let alerts = scan_alerts(inputs(&[], &[], &[], &expenses, &[]), now, thresholds);
        let kinds: Vec<(AlertKind, Severity)> =
            alerts.iter().map(|a| (a.kind, a.severity)).collect();
        assert_eq!(
            kinds,
            [
                (AlertKind::OverdueExpense, Severity::Warning),
                (AlertKind::ExpenseDueSoon, Severity::Info),
            ]
        );
    }
}
