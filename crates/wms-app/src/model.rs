// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::Date;

use crate::ids::*;

macro_rules! string_enum {
    ($name:ident { $($variant:ident => ($value:literal, $label:literal)),+ $(,)? }) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value),+
                }
            }

            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(CategoryStatus {
    Active => ("active", "Active"),
    Inactive => ("inactive", "Inactive"),
});

string_enum!(ProductStatus {
    Active => ("active", "Active"),
    Inactive => ("inactive", "Inactive"),
    Discontinued => ("discontinued", "Discontinued"),
});

string_enum!(AdjustmentType {
    Increase => ("increase", "Stock Increase"),
    Decrease => ("decrease", "Stock Decrease"),
});

string_enum!(AdjustmentCategory {
    PhysicalCount => ("physical_count", "Physical Count"),
    Damage => ("damage", "Damage"),
    Theft => ("theft", "Theft"),
    Correction => ("correction", "Data Correction"),
    Expiry => ("expiry", "Expiry"),
});

string_enum!(TransferStatus {
    Pending => ("pending", "Pending"),
    InTransit => ("in_transit", "In Transit"),
    Completed => ("completed", "Completed"),
    Cancelled => ("cancelled", "Cancelled"),
});

string_enum!(PurchaseOrderStatus {
    Draft => ("draft", "Draft"),
    Submitted => ("submitted", "Submitted"),
    Approved => ("approved", "Approved"),
    Received => ("received", "Received"),
    Cancelled => ("cancelled", "Cancelled"),
});

string_enum!(ReceivingStatus {
    Draft => ("draft", "Draft"),
    Received => ("received", "Received"),
    Inspected => ("inspected", "Inspected"),
    Approved => ("approved", "Approved"),
    Rejected => ("rejected", "Rejected"),
});

string_enum!(AssignmentKind {
    Picker => ("picker", "Picker"),
    Checker => ("checker", "Checker"),
    Tagger => ("tagger", "Tagger"),
});

string_enum!(AssignmentStatus {
    Pending => ("pending", "Pending"),
    Picking => ("picking", "Picking"),
    Picked => ("picked", "Picked"),
    Checking => ("checking", "Checking"),
    Checked => ("checked", "Checked"),
    Tagging => ("tagging", "Tagging"),
    Tagged => ("tagged", "Tagged"),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabKind {
    Dashboard,
    Products,
    Categories,
    Inventory,
    Adjustments,
    Transfers,
    PurchaseOrders,
    Receiving,
    Picking,
    Checking,
    Tagging,
}

impl TabKind {
    pub const ALL: [Self; 11] = [
        Self::Dashboard,
        Self::Products,
        Self::Categories,
        Self::Inventory,
        Self::Adjustments,
        Self::Transfers,
        Self::PurchaseOrders,
        Self::Receiving,
        Self::Picking,
        Self::Checking,
        Self::Tagging,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Inventory => "inventory",
            Self::Adjustments => "adjust",
            Self::Transfers => "transfers",
            Self::PurchaseOrders => "orders",
            Self::Receiving => "receiving",
            Self::Picking => "picking",
            Self::Checking => "checking",
            Self::Tagging => "tagging",
        }
    }

    pub const fn assignment_kind(self) -> Option<AssignmentKind> {
        match self {
            Self::Picking => Some(AssignmentKind::Picker),
            Self::Checking => Some(AssignmentKind::Checker),
            Self::Tagging => Some(AssignmentKind::Tagger),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMode {
    Nav,
    Search,
    Filter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub code: String,
    pub name: String,
    pub parent: Option<String>,
    pub description: String,
    pub status: CategoryStatus,
}

impl Category {
    pub fn full_path(&self) -> String {
        match &self.parent {
            Some(parent) if !parent.is_empty() => format!("{parent} > {}", self.name),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub barcode: Option<String>,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub unit: String,
    pub cost_cents: i64,
    pub price_cents: i64,
    pub minimum_stock: i64,
    pub reorder_point: i64,
    pub supplier: String,
    pub status: ProductStatus,
}

impl Product {
    /// Margin over cost in percent, `None` when cost is not positive.
    pub fn profit_margin_percent(&self) -> Option<f64> {
        if self.cost_cents <= 0 {
            return None;
        }
        let cost = self.cost_cents as f64;
        Some((self.price_cents as f64 - cost) / cost * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub id: StockLevelId,
    pub product_id: ProductId,
    pub sku: String,
    pub product_name: String,
    pub warehouse: String,
    pub location: String,
    pub available: i64,
    pub reserved: i64,
    pub allocated: i64,
    pub reorder_point: i64,
    pub lot_number: Option<String>,
    pub expiry_date: Option<Date>,
    pub unit_cost_cents: Option<i64>,
}

impl StockLevel {
    pub fn total_value_cents(&self) -> i64 {
        self.available * self.unit_cost_cents.unwrap_or(0)
    }

    pub fn is_low_stock(&self) -> bool {
        self.available <= self.reorder_point
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.available == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub id: AdjustmentId,
    pub number: String,
    pub product_id: ProductId,
    pub sku: String,
    pub warehouse: String,
    pub location: String,
    pub previous_qty: i64,
    pub adjusted_qty: i64,
    pub adjustment_type: AdjustmentType,
    pub category: AdjustmentCategory,
    pub reason: String,
    pub adjusted_by: String,
    pub created_on: Date,
    pub cost_impact_cents: Option<i64>,
}

impl Adjustment {
    pub fn delta(&self) -> i64 {
        self.adjusted_qty - self.previous_qty
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: TransferId,
    pub number: String,
    pub product_id: ProductId,
    pub sku: String,
    pub quantity: i64,
    pub from_location: String,
    pub to_location: String,
    pub unit_cost_cents: i64,
    pub requested_by: String,
    pub requested_on: Date,
    pub status: TransferStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: PurchaseOrderId,
    pub number: String,
    pub supplier: String,
    pub order_date: Date,
    pub expected_date: Option<Date>,
    pub line_count: i64,
    pub total_cents: i64,
    pub status: PurchaseOrderStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiving {
    pub id: ReceivingId,
    pub number: String,
    pub supplier: String,
    pub purchase_order_number: Option<String>,
    pub warehouse: String,
    pub location: String,
    pub received_by: String,
    pub received_on: Date,
    pub status: ReceivingStatus,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub kind: AssignmentKind,
    pub order_number: String,
    pub assignee: Option<String>,
    pub item_count: i64,
    pub status: AssignmentStatus,
    pub updated_on: Date,
}

impl Assignment {
    pub fn is_assigned(&self) -> bool {
        self.assignee
            .as_deref()
            .is_some_and(|assignee| !assignee.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InventorySummary {
    pub total_products: usize,
    pub active_products: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub inventory_value_cents: i64,
    pub open_transfers: usize,
    pub pending_assignments: usize,
}
