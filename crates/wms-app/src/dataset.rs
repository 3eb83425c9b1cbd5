// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use crate::model::{
    Adjustment, Assignment, AssignmentStatus, Category, InventorySummary, Product, ProductStatus,
    PurchaseOrder, PurchaseOrderStatus, Receiving, ReceivingStatus, StockLevel, TabKind, Transfer,
    TransferStatus,
};
use crate::workflow::{
    PURCHASE_ORDER_WORKFLOW, RECEIVING_WORKFLOW, TRANSFER_WORKFLOW, Workflow, assignment_workflow,
};

/// Every record the admin screens display, as one serializable bundle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub stock: Vec<StockLevel>,
    pub adjustments: Vec<Adjustment>,
    pub transfers: Vec<Transfer>,
    pub purchase_orders: Vec<PurchaseOrder>,
    pub receivings: Vec<Receiving>,
    pub assignments: Vec<Assignment>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read dataset {}", path.display()))?;
        let dataset: Self = serde_json::from_str(&raw).with_context(|| {
            format!(
                "parse dataset {} -- expected a JSON object of record arrays",
                path.display()
            )
        })?;
        tracing::info!(
            path = %path.display(),
            products = dataset.products.len(),
            stock = dataset.stock.len(),
            assignments = dataset.assignments.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create dataset directory {}", parent.display()))?;
        }
        let encoded = serde_json::to_string_pretty(self).context("encode dataset as JSON")?;
        fs::write(path, encoded).with_context(|| format!("write dataset {}", path.display()))?;
        tracing::info!(path = %path.display(), "saved dataset");
        Ok(())
    }

    pub fn summary(&self) -> InventorySummary {
        InventorySummary {
            total_products: self.products.len(),
            active_products: self
                .products
                .iter()
                .filter(|product| product.status == ProductStatus::Active)
                .count(),
            low_stock: self.stock.iter().filter(|stock| stock.is_low_stock()).count(),
            out_of_stock: self
                .stock
                .iter()
                .filter(|stock| stock.is_out_of_stock())
                .count(),
            inventory_value_cents: self.stock.iter().map(StockLevel::total_value_cents).sum(),
            open_transfers: self
                .transfers
                .iter()
                .filter(|transfer| {
                    matches!(
                        transfer.status,
                        TransferStatus::Pending | TransferStatus::InTransit
                    )
                })
                .count(),
            pending_assignments: self
                .assignments
                .iter()
                .filter(|assignment| assignment.status == AssignmentStatus::Pending)
                .count(),
        }
    }

    pub fn record_count(&self, tab: TabKind) -> usize {
        match tab {
            TabKind::Dashboard => 0,
            TabKind::Products => self.products.len(),
            TabKind::Categories => self.categories.len(),
            TabKind::Inventory => self.stock.len(),
            TabKind::Adjustments => self.adjustments.len(),
            TabKind::Transfers => self.transfers.len(),
            TabKind::PurchaseOrders => self.purchase_orders.len(),
            TabKind::Receiving => self.receivings.len(),
            TabKind::Picking | TabKind::Checking | TabKind::Tagging => {
                let kind = tab.assignment_kind();
                self.assignments
                    .iter()
                    .filter(|assignment| Some(assignment.kind) == kind)
                    .count()
            }
        }
    }

    /// Moves one record along its workflow. `to` is the target status string
    /// and must be the single transition offered from the current status.
    pub fn apply_transition(&mut self, tab: TabKind, id: i64, to: &str) -> Result<()> {
        match tab {
            TabKind::Transfers => {
                let transfer = find_mut(&mut self.transfers, |row| row.id.get() == id, tab, id)?;
                transfer.status = advance(
                    TRANSFER_WORKFLOW,
                    transfer.status,
                    true,
                    to,
                    TransferStatus::parse,
                )?;
            }
            TabKind::PurchaseOrders => {
                let order =
                    find_mut(&mut self.purchase_orders, |row| row.id.get() == id, tab, id)?;
                order.status = advance(
                    PURCHASE_ORDER_WORKFLOW,
                    order.status,
                    true,
                    to,
                    PurchaseOrderStatus::parse,
                )?;
            }
            TabKind::Receiving => {
                let receiving =
                    find_mut(&mut self.receivings, |row| row.id.get() == id, tab, id)?;
                receiving.status = advance(
                    RECEIVING_WORKFLOW,
                    receiving.status,
                    true,
                    to,
                    ReceivingStatus::parse,
                )?;
            }
            TabKind::Picking | TabKind::Checking | TabKind::Tagging => {
                let kind = tab
                    .assignment_kind()
                    .ok_or_else(|| anyhow!("{} has no assignment kind", tab.label()))?;
                let assignment = find_mut(
                    &mut self.assignments,
                    |row| row.id.get() == id && row.kind == kind,
                    tab,
                    id,
                )?;
                let assigned = assignment.is_assigned();
                assignment.status = advance(
                    assignment_workflow(kind),
                    assignment.status,
                    assigned,
                    to,
                    AssignmentStatus::parse,
                )?;
            }
            _ => bail!("{} records have no workflow", tab.label()),
        }
        tracing::info!(tab = tab.label(), id, to, "applied workflow transition");
        Ok(())
    }

    /// Removes one record. Returns false when no record had that id.
    pub fn delete(&mut self, tab: TabKind, id: i64) -> Result<bool> {
        let removed = match tab {
            TabKind::Dashboard => bail!("the dashboard has no rows to delete"),
            TabKind::Products => remove_where(&mut self.products, |row| row.id.get() == id),
            TabKind::Categories => remove_where(&mut self.categories, |row| row.id.get() == id),
            TabKind::Inventory => remove_where(&mut self.stock, |row| row.id.get() == id),
            TabKind::Adjustments => remove_where(&mut self.adjustments, |row| row.id.get() == id),
            TabKind::Transfers => remove_where(&mut self.transfers, |row| row.id.get() == id),
            TabKind::PurchaseOrders => {
                remove_where(&mut self.purchase_orders, |row| row.id.get() == id)
            }
            TabKind::Receiving => remove_where(&mut self.receivings, |row| row.id.get() == id),
            TabKind::Picking | TabKind::Checking | TabKind::Tagging => {
                let kind = tab.assignment_kind();
                remove_where(&mut self.assignments, |row| {
                    row.id.get() == id && Some(row.kind) == kind
                })
            }
        };
        if removed {
            tracing::info!(tab = tab.label(), id, "deleted record");
        } else {
            tracing::warn!(tab = tab.label(), id, "delete found no record");
        }
        Ok(removed)
    }
}

fn find_mut<'a, T>(
    rows: &'a mut [T],
    matches: impl Fn(&T) -> bool,
    tab: TabKind,
    id: i64,
) -> Result<&'a mut T> {
    rows.iter_mut()
        .find(|row| matches(row))
        .ok_or_else(|| anyhow!("{} record {id} not found -- refresh and try again", tab.label()))
}

fn remove_where<T>(rows: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
    let before = rows.len();
    rows.retain(|row| !matches(row));
    rows.len() != before
}

fn advance<S>(
    workflow: Workflow<S>,
    current: S,
    is_assigned: bool,
    to: &str,
    parse: fn(&str) -> Option<S>,
) -> Result<S>
where
    S: Copy + PartialEq + std::fmt::Display,
{
    let target = parse(to).ok_or_else(|| anyhow!("unknown status {to:?}"))?;
    if !is_assigned {
        bail!("record is not assigned -- assign it before changing status");
    }
    if !workflow.allows(current, target) {
        bail!("cannot move from {current} to {target}");
    }
    Ok(target)
}

/// Next `PREFIX-YEAR-NNN` number: one past the highest sequence already used
/// for that prefix and year. Numbers with another prefix or year are ignored.
pub fn next_document_number<'a>(
    prefix: &str,
    year: i32,
    existing: impl IntoIterator<Item = &'a str>,
) -> String {
    let stem = format!("{prefix}-{year}-");
    let highest = existing
        .into_iter()
        .filter_map(|number| number.strip_prefix(&stem))
        .filter_map(|sequence| sequence.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{stem}{:03}", highest.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::{Dataset, next_document_number};
    use crate::ids::{AssignmentId, ProductId, StockLevelId, TransferId};
    use crate::model::{
        Assignment, AssignmentKind, AssignmentStatus, StockLevel, TabKind, Transfer,
        TransferStatus,
    };
    use anyhow::Result;
    use time::macros::date;

    fn stock(id: i64, available: i64, reorder_point: i64, unit_cost: i64) -> StockLevel {
        StockLevel {
            id: StockLevelId::new(id),
            product_id: ProductId::new(id),
            sku: format!("SKU-{id:06}"),
            product_name: format!("Product {id}"),
            warehouse: "WH-001".to_owned(),
            location: "A-01".to_owned(),
            available,
            reserved: 0,
            allocated: 0,
            reorder_point,
            lot_number: None,
            expiry_date: None,
            unit_cost_cents: Some(unit_cost),
        }
    }

    fn assignment(id: i64, kind: AssignmentKind, assignee: Option<&str>) -> Assignment {
        Assignment {
            id: AssignmentId::new(id),
            kind,
            order_number: format!("SO-2024-{id:03}"),
            assignee: assignee.map(str::to_owned),
            item_count: 3,
            status: AssignmentStatus::Pending,
            updated_on: date!(2024 - 03 - 01),
        }
    }

    fn transfer(id: i64, status: TransferStatus) -> Transfer {
        Transfer {
            id: TransferId::new(id),
            number: format!("TRF-2024-{id:03}"),
            product_id: ProductId::new(1),
            sku: "SKU-000001".to_owned(),
            quantity: 4,
            from_location: "WH-001 / A-01".to_owned(),
            to_location: "WH-002 / B-02".to_owned(),
            unit_cost_cents: 250,
            requested_by: "Admin".to_owned(),
            requested_on: date!(2024 - 03 - 02),
            status,
        }
    }

    fn sample() -> Dataset {
        Dataset {
            stock: vec![stock(1, 0, 5, 100), stock(2, 5, 5, 200), stock(3, 40, 5, 50)],
            transfers: vec![
                transfer(1, TransferStatus::Pending),
                transfer(2, TransferStatus::Completed),
            ],
            assignments: vec![
                assignment(1, AssignmentKind::Picker, Some("Dana")),
                assignment(2, AssignmentKind::Picker, None),
                assignment(3, AssignmentKind::Checker, Some("Lee")),
            ],
            ..Dataset::default()
        }
    }

    #[test]
    fn summary_counts_stock_flags_and_open_work() {
        let summary = sample().summary();
        assert_eq!(summary.low_stock, 2);
        assert_eq!(summary.out_of_stock, 1);
        assert_eq!(summary.inventory_value_cents, 5 * 200 + 40 * 50);
        assert_eq!(summary.open_transfers, 1);
        assert_eq!(summary.pending_assignments, 3);
    }

    #[test]
    fn record_count_splits_assignments_by_kind() {
        let dataset = sample();
        assert_eq!(dataset.record_count(TabKind::Picking), 2);
        assert_eq!(dataset.record_count(TabKind::Checking), 1);
        assert_eq!(dataset.record_count(TabKind::Tagging), 0);
    }

    #[test]
    fn transition_follows_the_workflow() -> Result<()> {
        let mut dataset = sample();
        dataset.apply_transition(TabKind::Picking, 1, "picking")?;
        assert_eq!(dataset.assignments[0].status, AssignmentStatus::Picking);
        dataset.apply_transition(TabKind::Picking, 1, "picked")?;
        assert_eq!(dataset.assignments[0].status, AssignmentStatus::Picked);

        let error = dataset
            .apply_transition(TabKind::Picking, 1, "picking")
            .expect_err("picked is terminal");
        assert!(error.to_string().contains("cannot move"));
        Ok(())
    }

    #[test]
    fn transition_rejects_unassigned_and_mismatched_records() {
        let mut dataset = sample();
        let error = dataset
            .apply_transition(TabKind::Picking, 2, "picking")
            .expect_err("unassigned");
        assert!(error.to_string().contains("not assigned"));

        let error = dataset
            .apply_transition(TabKind::Picking, 3, "picking")
            .expect_err("checker row on picking tab");
        assert!(error.to_string().contains("not found"));

        let error = dataset
            .apply_transition(TabKind::Products, 1, "active")
            .expect_err("products have no workflow");
        assert!(error.to_string().contains("no workflow"));
    }

    #[test]
    fn transfers_are_always_actionable() -> Result<()> {
        let mut dataset = sample();
        dataset.apply_transition(TabKind::Transfers, 1, "in_transit")?;
        assert_eq!(dataset.transfers[0].status, TransferStatus::InTransit);
        assert!(dataset.apply_transition(TabKind::Transfers, 2, "pending").is_err());
        Ok(())
    }

    #[test]
    fn delete_reports_whether_a_row_was_removed() -> Result<()> {
        let mut dataset = sample();
        assert!(dataset.delete(TabKind::Inventory, 2)?);
        assert!(!dataset.delete(TabKind::Inventory, 2)?);
        assert_eq!(dataset.stock.len(), 2);
        assert!(!dataset.delete(TabKind::Tagging, 1)?);
        assert!(dataset.delete(TabKind::Dashboard, 1).is_err());
        Ok(())
    }

    #[test]
    fn save_then_load_preserves_records() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("data.json");
        let dataset = sample();
        dataset.save(&path)?;
        assert_eq!(Dataset::load(&path)?, dataset);
        Ok(())
    }

    #[test]
    fn load_reports_bad_json_with_path() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "[1, 2")?;
        let error = Dataset::load(&path).expect_err("invalid JSON");
        assert!(format!("{error:#}").contains("broken.json"));

        std::fs::write(&path, "{\"products\": []}")?;
        assert_eq!(Dataset::load(&path)?, Dataset::default());
        Ok(())
    }

    #[test]
    fn document_numbers_continue_the_year_sequence() {
        let existing = ["ADJ-2024-001", "ADJ-2024-007", "ADJ-2023-042", "TRF-2024-050"];
        assert_eq!(next_document_number("ADJ", 2024, existing), "ADJ-2024-008");
        assert_eq!(next_document_number("ADJ", 2025, existing), "ADJ-2025-001");
        assert_eq!(next_document_number("PO", 2024, []), "PO-2024-001");
    }

    #[test]
    fn document_numbers_stop_at_the_largest_sequence() {
        let existing = ["RCV-2024-4294967295"];
        assert_eq!(
            next_document_number("RCV", 2024, existing),
            "RCV-2024-4294967295"
        );
    }
}
