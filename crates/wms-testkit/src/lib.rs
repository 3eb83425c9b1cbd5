// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;
use time::macros::date;
use time::{Date, Duration};
use wms_app::{
    Adjustment, AdjustmentCategory, AdjustmentId, AdjustmentType, Assignment, AssignmentId,
    AssignmentKind, AssignmentStatus, Category, CategoryId, CategoryStatus, Dataset, Product,
    ProductId, ProductStatus, PurchaseOrder, PurchaseOrderId, PurchaseOrderStatus, Receiving,
    ReceivingId, ReceivingStatus, StockLevel, StockLevelId, Transfer, TransferId, TransferStatus,
    next_document_number,
};

const CATEGORY_TREE: [(&str, Option<&str>); 10] = [
    ("Electronics", None),
    ("Laptops", Some("Electronics")),
    ("Clothing", None),
    ("Books", None),
    ("Home", None),
    ("Kitchen", Some("Home")),
    ("Sports", None),
    ("Tools", None),
    ("Power Tools", Some("Tools")),
    ("Food", None),
];

const PRODUCT_NOUNS: [&str; 16] = [
    "Widget", "Bracket", "Hinge", "Gasket", "Cable", "Adapter", "Charger", "Kettle", "Drill",
    "Jacket", "Notebook", "Lamp", "Bottle", "Sensor", "Clamp", "Valve",
];
const PRODUCT_ADJECTIVES: [&str; 12] = [
    "Blue", "Compact", "Heavy Duty", "Mini", "Pro", "Classic", "Steel", "Smart", "Eco", "Deluxe",
    "Basic", "Ultra",
];
const BRANDS: [&str; 10] = [
    "Acme", "Northwind", "Contoso", "Globex", "Initech", "Umbrella", "Stark", "Wayne", "Hooli",
    "Vandelay",
];
const UNITS: [&str; 5] = ["pcs", "box", "kg", "pack", "set"];

const WAREHOUSES: [&str; 3] = ["WH-001", "WH-002", "WH-003"];
const AISLES: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

const STAFF: [&str; 14] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Rowan",
];

const ADJUSTMENT_REASONS: [&str; 6] = [
    "cycle count variance",
    "damaged in handling",
    "missing after audit",
    "label correction",
    "expired stock removed",
    "found during recount",
];
const RECEIVING_NOTES: [&str; 5] = [
    "",
    "pallet wrap torn",
    "partial delivery",
    "carrier arrived late",
    "all cartons sealed",
];

const ADJUSTMENT_CATEGORIES: [AdjustmentCategory; 5] = [
    AdjustmentCategory::PhysicalCount,
    AdjustmentCategory::Damage,
    AdjustmentCategory::Theft,
    AdjustmentCategory::Correction,
    AdjustmentCategory::Expiry,
];
const TRANSFER_STATUSES: [TransferStatus; 4] = [
    TransferStatus::Pending,
    TransferStatus::InTransit,
    TransferStatus::Completed,
    TransferStatus::Cancelled,
];
const PURCHASE_ORDER_STATUSES: [PurchaseOrderStatus; 5] = [
    PurchaseOrderStatus::Draft,
    PurchaseOrderStatus::Submitted,
    PurchaseOrderStatus::Approved,
    PurchaseOrderStatus::Received,
    PurchaseOrderStatus::Cancelled,
];
const RECEIVING_STATUSES: [ReceivingStatus; 4] = [
    ReceivingStatus::Draft,
    ReceivingStatus::Received,
    ReceivingStatus::Inspected,
    ReceivingStatus::Approved,
];

const SUPPLIER_COUNT: i32 = 20;
const REFERENCE_DATE: Date = date!(2026 - 01 - 01);
const REFERENCE_YEAR: i32 = 2026;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    /// True with roughly `percent` percent probability.
    fn chance(&mut self, percent: u64) -> bool {
        self.next_u64() % 100 < percent
    }
}

/// Seeded generator for warehouse records. The same seed always yields the
/// same sequence.
#[derive(Debug, Clone)]
pub struct WarehouseFaker {
    rng: DeterministicRng,
    seed: u64,
    last_numbers: BTreeMap<&'static str, String>,
}

impl WarehouseFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
            last_numbers: BTreeMap::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn category(&mut self, index: usize) -> Category {
        let (name, parent) = CATEGORY_TREE[index % CATEGORY_TREE.len()];
        Category {
            id: CategoryId::new(index as i64 + 1),
            code: format!("CAT-{:03}", index + 1),
            name: name.to_owned(),
            parent: parent.map(str::to_owned),
            description: format!("{name} stock"),
            status: if self.rng.chance(90) {
                CategoryStatus::Active
            } else {
                CategoryStatus::Inactive
            },
        }
    }

    pub fn product(&mut self, index: usize, category: &Category) -> Product {
        let number = index as i64 + 1;
        let price_cents = self.int_range_i64(1_000, 50_000);
        let cost_cents = price_cents * self.int_range_i64(50, 80) / 100;
        Product {
            id: ProductId::new(number),
            sku: format!("SKU-{number:06}"),
            barcode: self
                .rng
                .chance(80)
                .then(|| format!("{:012}", self.int_range_i64(100_000_000_000, 999_999_999_999))),
            name: format!(
                "{} {} {number}",
                self.pick(&PRODUCT_ADJECTIVES),
                self.pick(&PRODUCT_NOUNS)
            ),
            category: category.full_path(),
            brand: self.pick(&BRANDS).to_owned(),
            unit: self.pick(&UNITS).to_owned(),
            cost_cents,
            price_cents,
            minimum_stock: self.int_range_i64(0, 5),
            reorder_point: self.int_range_i64(5, 50),
            supplier: self.supplier(),
            status: if self.rng.chance(95) {
                ProductStatus::Active
            } else if self.rng.chance(50) {
                ProductStatus::Inactive
            } else {
                ProductStatus::Discontinued
            },
        }
    }

    pub fn stock_level(&mut self, index: usize, product: &Product) -> StockLevel {
        let available = if self.rng.chance(10) {
            0
        } else {
            self.int_range_i64(0, 1_000)
        };
        StockLevel {
            id: StockLevelId::new(index as i64 + 1),
            product_id: product.id,
            sku: product.sku.clone(),
            product_name: product.name.clone(),
            warehouse: self.pick(&WAREHOUSES).to_owned(),
            location: self.location(),
            available,
            reserved: self.int_range_i64(0, available / 4),
            allocated: self.int_range_i64(0, available / 4),
            reorder_point: product.reorder_point,
            lot_number: self
                .rng
                .chance(60)
                .then(|| format!("LOT-{:05}", self.int_range_i64(1, 99_999))),
            expiry_date: self
                .rng
                .chance(30)
                .then(|| REFERENCE_DATE.saturating_add(Duration::days(self.int_range_i64(30, 720)))),
            unit_cost_cents: Some(product.cost_cents),
        }
    }

    pub fn adjustment(&mut self, index: usize, stock: &StockLevel) -> Adjustment {
        let adjustment_type = if self.rng.chance(40) {
            AdjustmentType::Increase
        } else {
            AdjustmentType::Decrease
        };
        let change = self.int_range_i64(1, 25);
        let adjusted_qty = match adjustment_type {
            AdjustmentType::Increase => stock.available + change,
            AdjustmentType::Decrease => (stock.available - change).max(0),
        };
        let unit_cost = stock.unit_cost_cents.unwrap_or(0);
        Adjustment {
            id: AdjustmentId::new(index as i64 + 1),
            number: self.document_number("ADJ"),
            product_id: stock.product_id,
            sku: stock.sku.clone(),
            warehouse: stock.warehouse.clone(),
            location: stock.location.clone(),
            previous_qty: stock.available,
            adjusted_qty,
            adjustment_type,
            category: ADJUSTMENT_CATEGORIES[self.rng.int_n(ADJUSTMENT_CATEGORIES.len())],
            reason: self.pick(&ADJUSTMENT_REASONS).to_owned(),
            adjusted_by: self.pick(&STAFF).to_owned(),
            created_on: self.recent_date(180),
            cost_impact_cents: Some((adjusted_qty - stock.available) * unit_cost),
        }
    }

    pub fn transfer(&mut self, index: usize, product: &Product) -> Transfer {
        let from = self.rng.int_n(WAREHOUSES.len());
        let to = (from + 1 + self.rng.int_n(WAREHOUSES.len() - 1)) % WAREHOUSES.len();
        Transfer {
            id: TransferId::new(index as i64 + 1),
            number: self.document_number("TRF"),
            product_id: product.id,
            sku: product.sku.clone(),
            quantity: self.int_range_i64(1, 200),
            from_location: format!("{} / {}", WAREHOUSES[from], self.location()),
            to_location: format!("{} / {}", WAREHOUSES[to], self.location()),
            unit_cost_cents: product.cost_cents,
            requested_by: self.pick(&STAFF).to_owned(),
            requested_on: self.recent_date(60),
            status: TRANSFER_STATUSES[self.rng.int_n(TRANSFER_STATUSES.len())],
        }
    }

    pub fn purchase_order(&mut self, index: usize) -> PurchaseOrder {
        let order_date = self.recent_date(120);
        PurchaseOrder {
            id: PurchaseOrderId::new(index as i64 + 1),
            number: self.document_number("PO"),
            supplier: self.supplier(),
            order_date,
            expected_date: self
                .rng
                .chance(85)
                .then(|| order_date.saturating_add(Duration::days(self.int_range_i64(3, 30)))),
            line_count: self.int_range_i64(1, 12),
            total_cents: self.int_range_i64(5_000, 2_500_000),
            status: PURCHASE_ORDER_STATUSES[self.rng.int_n(PURCHASE_ORDER_STATUSES.len())],
        }
    }

    pub fn receiving(&mut self, index: usize, order: Option<&PurchaseOrder>) -> Receiving {
        Receiving {
            id: ReceivingId::new(index as i64 + 1),
            number: self.document_number("RCV"),
            supplier: order.map_or_else(|| self.supplier(), |order| order.supplier.clone()),
            purchase_order_number: order.map(|order| order.number.clone()),
            warehouse: self.pick(&WAREHOUSES).to_owned(),
            location: self.location(),
            received_by: self.pick(&STAFF).to_owned(),
            received_on: self.recent_date(90),
            status: RECEIVING_STATUSES[self.rng.int_n(RECEIVING_STATUSES.len())],
            notes: self.pick(&RECEIVING_NOTES).to_owned(),
        }
    }

    /// Unassigned work only ever sits in `pending`.
    pub fn assignment(&mut self, index: usize, kind: AssignmentKind) -> Assignment {
        let assignee = self
            .rng
            .chance(75)
            .then(|| self.pick(&STAFF).to_owned());
        let status = if assignee.is_none() {
            AssignmentStatus::Pending
        } else {
            let (active, done) = match kind {
                AssignmentKind::Picker => (AssignmentStatus::Picking, AssignmentStatus::Picked),
                AssignmentKind::Checker => (AssignmentStatus::Checking, AssignmentStatus::Checked),
                AssignmentKind::Tagger => (AssignmentStatus::Tagging, AssignmentStatus::Tagged),
            };
            [AssignmentStatus::Pending, active, done][self.rng.int_n(3)]
        };
        Assignment {
            id: AssignmentId::new(index as i64 + 1),
            kind,
            order_number: format!("SO-{REFERENCE_YEAR}-{:03}", index / 3 + 1),
            assignee,
            item_count: self.int_range_i64(1, 40),
            status,
            updated_on: self.recent_date(14),
        }
    }

    /// Numbers continue from the last one this faker issued for `prefix`.
    fn document_number(&mut self, prefix: &'static str) -> String {
        let number = next_document_number(
            prefix,
            REFERENCE_YEAR,
            self.last_numbers.get(prefix).map(String::as_str),
        );
        self.last_numbers.insert(prefix, number.clone());
        number
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range_i64(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }

    fn supplier(&mut self) -> String {
        format!("Supplier {}", self.int_range_i64(1, i64::from(SUPPLIER_COUNT)))
    }

    fn location(&mut self) -> String {
        format!(
            "{}-{:02}-{:02}",
            self.pick(&AISLES),
            self.int_range_i64(1, 20),
            self.int_range_i64(1, 6)
        )
    }

    fn recent_date(&mut self, max_days_back: i64) -> Date {
        REFERENCE_DATE.saturating_sub(Duration::days(self.int_range_i64(0, max_days_back)))
    }
}

/// A complete dataset sized around `products`. Other record counts scale
/// with it so large sets exercise windowed tables on every tab.
pub fn demo_dataset(seed: u64, products: usize) -> Dataset {
    let mut faker = WarehouseFaker::new(seed);

    let categories = (0..CATEGORY_TREE.len())
        .map(|index| faker.category(index))
        .collect::<Vec<_>>();
    let product_rows = (0..products)
        .map(|index| {
            let category = &categories[faker.int_n(categories.len())];
            faker.product(index, category)
        })
        .collect::<Vec<_>>();
    let stock = product_rows
        .iter()
        .enumerate()
        .map(|(index, product)| faker.stock_level(index, product))
        .collect::<Vec<_>>();
    let adjustments = stock
        .iter()
        .step_by(3)
        .enumerate()
        .map(|(index, level)| faker.adjustment(index, level))
        .collect();
    let transfers = product_rows
        .iter()
        .step_by(4)
        .enumerate()
        .map(|(index, product)| faker.transfer(index, product))
        .collect();
    let purchase_orders = (0..products.div_ceil(5))
        .map(|index| faker.purchase_order(index))
        .collect::<Vec<_>>();
    let receivings = purchase_orders
        .iter()
        .enumerate()
        .map(|(index, order)| faker.receiving(index, Some(order)))
        .collect();
    let assignments = (0..products.div_ceil(2))
        .map(|index| {
            let kind = AssignmentKind::ALL[index % AssignmentKind::ALL.len()];
            faker.assignment(index, kind)
        })
        .collect();

    Dataset {
        categories,
        products: product_rows,
        stock,
        adjustments,
        transfers,
        purchase_orders,
        receivings,
        assignments,
    }
}

pub fn temp_dataset_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("wms.json");
    Ok((dir, path))
}
