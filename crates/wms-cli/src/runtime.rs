// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::path::PathBuf;
use wms_app::{Dataset, InventorySummary, TabKind};
use wms_tui::TabSnapshot;

/// In-memory record source. Mutations are written back to `persist_path`
/// when one is set; demo datasets stay in memory.
pub struct DatasetRuntime {
    dataset: Dataset,
    persist_path: Option<PathBuf>,
}

impl DatasetRuntime {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            persist_path: None,
        }
    }

    pub fn with_persist_path(dataset: Dataset, persist_path: Option<PathBuf>) -> Self {
        Self {
            dataset,
            persist_path,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.persist_path else {
            return Ok(());
        };
        self.dataset
            .save(path)
            .with_context(|| format!("persist change to {}", path.display()))
    }
}

impl wms_tui::AppRuntime for DatasetRuntime {
    fn load_summary(&mut self) -> Result<InventorySummary> {
        Ok(self.dataset.summary())
    }

    fn load_tab_snapshot(&mut self, tab: TabKind) -> Result<Option<TabSnapshot>> {
        let dataset = &self.dataset;
        let snapshot = match tab {
            TabKind::Dashboard => None,
            TabKind::Products => Some(TabSnapshot::Products(dataset.products.clone())),
            TabKind::Categories => Some(TabSnapshot::Categories(dataset.categories.clone())),
            TabKind::Inventory => Some(TabSnapshot::Inventory(dataset.stock.clone())),
            TabKind::Adjustments => Some(TabSnapshot::Adjustments(dataset.adjustments.clone())),
            TabKind::Transfers => Some(TabSnapshot::Transfers(dataset.transfers.clone())),
            TabKind::PurchaseOrders => {
                Some(TabSnapshot::PurchaseOrders(dataset.purchase_orders.clone()))
            }
            TabKind::Receiving => Some(TabSnapshot::Receivings(dataset.receivings.clone())),
            TabKind::Picking | TabKind::Checking | TabKind::Tagging => {
                tab.assignment_kind().map(|kind| {
                    TabSnapshot::Assignments(
                        kind,
                        dataset
                            .assignments
                            .iter()
                            .filter(|assignment| assignment.kind == kind)
                            .cloned()
                            .collect(),
                    )
                })
            }
        };
        Ok(snapshot)
    }

    fn apply_transition(&mut self, tab: TabKind, row_id: i64, to: &str) -> Result<()> {
        self.dataset.apply_transition(tab, row_id, to)?;
        self.persist()
    }

    fn delete_row(&mut self, tab: TabKind, row_id: i64) -> Result<bool> {
        let removed = self.dataset.delete(tab, row_id)?;
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::DatasetRuntime;
    use anyhow::Result;
    use wms_app::{AssignmentKind, AssignmentStatus, Dataset, TabKind, TransferStatus};
    use wms_testkit::{demo_dataset, temp_dataset_path};
    use wms_tui::{AppRuntime, TabSnapshot};

    fn assign_first_pending(dataset: &mut Dataset, kind: AssignmentKind) -> Option<i64> {
        let row = dataset.assignments.iter_mut().find(|row| row.kind == kind)?;
        row.assignee = Some("Dana".to_owned());
        row.status = AssignmentStatus::Pending;
        Some(row.id.get())
    }

    #[test]
    fn snapshots_cover_every_table_tab() -> Result<()> {
        let dataset = demo_dataset(7, 40);
        let mut runtime = DatasetRuntime::new(dataset.clone());

        assert!(runtime.load_tab_snapshot(TabKind::Dashboard)?.is_none());
        for tab in TabKind::ALL.into_iter().skip(1) {
            let snapshot = runtime
                .load_tab_snapshot(tab)?
                .expect("table tabs have snapshots");
            assert_eq!(snapshot.tab_kind(), tab);
            assert_eq!(snapshot.row_count(), dataset.record_count(tab));
        }
        Ok(())
    }

    #[test]
    fn assignment_snapshots_are_filtered_by_kind() -> Result<()> {
        let mut runtime = DatasetRuntime::new(demo_dataset(3, 30));
        let Some(TabSnapshot::Assignments(kind, rows)) =
            runtime.load_tab_snapshot(TabKind::Checking)?
        else {
            panic!("checking tab should load assignments");
        };
        assert_eq!(kind, AssignmentKind::Checker);
        assert!(rows.iter().all(|row| row.kind == AssignmentKind::Checker));
        Ok(())
    }

    #[test]
    fn summary_matches_dataset() -> Result<()> {
        let dataset = demo_dataset(11, 25);
        let mut runtime = DatasetRuntime::new(dataset.clone());
        assert_eq!(runtime.load_summary()?, dataset.summary());
        Ok(())
    }

    #[test]
    fn transition_is_persisted_to_data_file() -> Result<()> {
        let (_temp, path) = temp_dataset_path()?;
        let mut dataset = demo_dataset(5, 40);
        let id = assign_first_pending(&mut dataset, AssignmentKind::Picker)
            .expect("demo data has picker tasks");
        dataset.save(&path)?;

        let mut runtime = DatasetRuntime::with_persist_path(dataset, Some(path.clone()));
        runtime.apply_transition(TabKind::Picking, id, "picking")?;

        let reloaded = Dataset::load(&path)?;
        let row = reloaded
            .assignments
            .iter()
            .find(|row| row.id.get() == id)
            .expect("assignment still present");
        assert_eq!(row.status, AssignmentStatus::Picking);
        Ok(())
    }

    #[test]
    fn rejected_transition_leaves_data_untouched() -> Result<()> {
        let dataset = demo_dataset(5, 40);
        let completed = dataset
            .transfers
            .iter()
            .find(|row| row.status == TransferStatus::Completed)
            .map(|row| row.id.get());
        let mut runtime = DatasetRuntime::new(dataset.clone());

        let error = runtime
            .apply_transition(TabKind::Transfers, 9_999, "in_transit")
            .expect_err("missing transfer should fail");
        assert!(error.to_string().contains("not found"));

        if let Some(id) = completed {
            assert!(
                runtime
                    .apply_transition(TabKind::Transfers, id, "in_transit")
                    .is_err()
            );
        }
        assert_eq!(runtime.dataset(), &dataset);
        Ok(())
    }

    #[test]
    fn delete_reports_missing_rows() -> Result<()> {
        let dataset = demo_dataset(9, 12);
        let id = dataset.products[0].id.get();
        let mut runtime = DatasetRuntime::new(dataset);

        assert!(runtime.delete_row(TabKind::Products, id)?);
        assert!(!runtime.delete_row(TabKind::Products, id)?);
        assert_eq!(runtime.dataset().products.len(), 11);
        assert!(runtime.delete_row(TabKind::Dashboard, id).is_err());
        Ok(())
    }
}
