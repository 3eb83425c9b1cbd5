// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_json::{Map, Value};
use time::Date;

use crate::{
    Adjustment, Assignment, Category, Product, PurchaseOrder, Receiving, StockLevel, Transfer,
};

/// A row the table engine can display.
///
/// Field access is by key. `field` returns `None` for keys the record does not
/// carry, which the engine renders as an empty cell. Field text is the raw,
/// sortable form (plain numbers, ISO dates); presentation belongs in a
/// column's render function.
pub trait Record {
    fn record_id(&self) -> i64;

    fn field_keys(&self) -> Box<dyn Iterator<Item = &str> + '_>;

    fn field(&self, key: &str) -> Option<Cow<'_, str>>;
}

/// Plain decimal text for a cent amount, e.g. `1234.50`.
pub fn cents_text(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Money for display, e.g. `$1,234.50`.
pub fn format_money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let dollars = (abs / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (index, ch) in dollars.chars().enumerate() {
        if index > 0 && (dollars.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{:02}", abs % 100)
}

fn text(value: &str) -> Option<Cow<'_, str>> {
    Some(Cow::Borrowed(value))
}

fn owned(value: impl ToString) -> Option<Cow<'static, str>> {
    Some(Cow::Owned(value.to_string()))
}

fn optional_text(value: Option<&str>) -> Option<Cow<'_, str>> {
    value.map(Cow::Borrowed)
}

fn optional_date(value: Option<Date>) -> Option<Cow<'static, str>> {
    value.map(|date| Cow::Owned(date.to_string()))
}

const CATEGORY_KEYS: &[&str] = &[
    "id",
    "code",
    "name",
    "parent",
    "path",
    "description",
    "status",
];

const PRODUCT_KEYS: &[&str] = &[
    "id",
    "sku",
    "barcode",
    "name",
    "category",
    "brand",
    "unit",
    "cost",
    "price",
    "minimum_stock",
    "reorder_point",
    "supplier",
    "status",
];

const STOCK_LEVEL_KEYS: &[&str] = &[
    "id",
    "sku",
    "product",
    "warehouse",
    "location",
    "available",
    "reserved",
    "allocated",
    "reorder_point",
    "lot_number",
    "expiry_date",
    "unit_cost",
    "value",
];

const ADJUSTMENT_KEYS: &[&str] = &[
    "id",
    "number",
    "sku",
    "warehouse",
    "location",
    "previous_qty",
    "adjusted_qty",
    "delta",
    "type",
    "category",
    "reason",
    "adjusted_by",
    "created_on",
    "cost_impact",
];

const TRANSFER_KEYS: &[&str] = &[
    "id",
    "number",
    "sku",
    "quantity",
    "from",
    "to",
    "unit_cost",
    "requested_by",
    "requested_on",
    "status",
];

const PURCHASE_ORDER_KEYS: &[&str] = &[
    "id",
    "number",
    "supplier",
    "order_date",
    "expected_date",
    "lines",
    "total",
    "status",
];

const RECEIVING_KEYS: &[&str] = &[
    "id",
    "number",
    "supplier",
    "purchase_order",
    "warehouse",
    "location",
    "received_by",
    "received_on",
    "status",
    "notes",
];

const ASSIGNMENT_KEYS: &[&str] = &[
    "id",
    "kind",
    "order",
    "assignee",
    "items",
    "status",
    "updated_on",
];

impl Record for Category {
    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn field_keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(CATEGORY_KEYS.iter().copied())
    }

    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        match key {
            "id" => owned(self.id),
            "code" => text(&self.code),
            "name" => text(&self.name),
            "parent" => optional_text(self.parent.as_deref()),
            "path" => owned(self.full_path()),
            "description" => text(&self.description),
            "status" => text(self.status.as_str()),
            _ => None,
        }
    }
}

impl Record for Product {
    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn field_keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(PRODUCT_KEYS.iter().copied())
    }

    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        match key {
            "id" => owned(self.id),
            "sku" => text(&self.sku),
            "barcode" => optional_text(self.barcode.as_deref()),
            "name" => text(&self.name),
            "category" => text(&self.category),
            "brand" => text(&self.brand),
            "unit" => text(&self.unit),
            "cost" => owned(cents_text(self.cost_cents)),
            "price" => owned(cents_text(self.price_cents)),
            "minimum_stock" => owned(self.minimum_stock),
            "reorder_point" => owned(self.reorder_point),
            "supplier" => text(&self.supplier),
            "status" => text(self.status.as_str()),
            _ => None,
        }
    }
}

impl Record for StockLevel {
    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn field_keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(STOCK_LEVEL_KEYS.iter().copied())
    }

    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        match key {
            "id" => owned(self.id),
            "sku" => text(&self.sku),
            "product" => text(&self.product_name),
            "warehouse" => text(&self.warehouse),
            "location" => text(&self.location),
            "available" => owned(self.available),
            "reserved" => owned(self.reserved),
            "allocated" => owned(self.allocated),
            "reorder_point" => owned(self.reorder_point),
            "lot_number" => optional_text(self.lot_number.as_deref()),
            "expiry_date" => optional_date(self.expiry_date),
            "unit_cost" => self.unit_cost_cents.map(|cents| Cow::Owned(cents_text(cents))),
            "value" => owned(cents_text(self.total_value_cents())),
            _ => None,
        }
    }
}

impl Record for Adjustment {
    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn field_keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(ADJUSTMENT_KEYS.iter().copied())
    }

    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        match key {
            "id" => owned(self.id),
            "number" => text(&self.number),
            "sku" => text(&self.sku),
            "warehouse" => text(&self.warehouse),
            "location" => text(&self.location),
            "previous_qty" => owned(self.previous_qty),
            "adjusted_qty" => owned(self.adjusted_qty),
            "delta" => owned(self.delta()),
            "type" => text(self.adjustment_type.as_str()),
            "category" => text(self.category.as_str()),
            "reason" => text(&self.reason),
            "adjusted_by" => text(&self.adjusted_by),
            "created_on" => owned(self.created_on),
            "cost_impact" => self
                .cost_impact_cents
                .map(|cents| Cow::Owned(cents_text(cents))),
            _ => None,
        }
    }
}

impl Record for Transfer {
    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn field_keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(TRANSFER_KEYS.iter().copied())
    }

    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        match key {
            "id" => owned(self.id),
            "number" => text(&self.number),
            "sku" => text(&self.sku),
            "quantity" => owned(self.quantity),
            "from" => text(&self.from_location),
            "to" => text(&self.to_location),
            "unit_cost" => owned(cents_text(self.unit_cost_cents)),
            "requested_by" => text(&self.requested_by),
            "requested_on" => owned(self.requested_on),
            "status" => text(self.status.as_str()),
            _ => None,
        }
    }
}

impl Record for PurchaseOrder {
    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn field_keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(PURCHASE_ORDER_KEYS.iter().copied())
    }

    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        match key {
            "id" => owned(self.id),
            "number" => text(&self.number),
            "supplier" => text(&self.supplier),
            "order_date" => owned(self.order_date),
            "expected_date" => optional_date(self.expected_date),
            "lines" => owned(self.line_count),
            "total" => owned(cents_text(self.total_cents)),
            "status" => text(self.status.as_str()),
            _ => None,
        }
    }
}

impl Record for Receiving {
    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn field_keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(RECEIVING_KEYS.iter().copied())
    }

    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        match key {
            "id" => owned(self.id),
            "number" => text(&self.number),
            "supplier" => text(&self.supplier),
            "purchase_order" => optional_text(self.purchase_order_number.as_deref()),
            "warehouse" => text(&self.warehouse),
            "location" => text(&self.location),
            "received_by" => text(&self.received_by),
            "received_on" => owned(self.received_on),
            "status" => text(self.status.as_str()),
            "notes" => text(&self.notes),
            _ => None,
        }
    }
}

impl Record for Assignment {
    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn field_keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(ASSIGNMENT_KEYS.iter().copied())
    }

    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        match key {
            "id" => owned(self.id),
            "kind" => text(self.kind.as_str()),
            "order" => text(&self.order_number),
            "assignee" => optional_text(self.assignee.as_deref()),
            "items" => owned(self.item_count),
            "status" => text(self.status.as_str()),
            "updated_on" => owned(self.updated_on),
            _ => None,
        }
    }
}

/// Loosely shaped rows, e.g. ad-hoc fixtures. The identity is the `id` key.
impl Record for BTreeMap<String, String> {
    fn record_id(&self) -> i64 {
        self.get("id")
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0)
    }

    fn field_keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.keys().map(String::as_str))
    }

    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|value| Cow::Borrowed(value.as_str()))
    }
}

/// JSON objects as decoded from a dataset or an API payload.
impl Record for Map<String, Value> {
    fn record_id(&self) -> i64 {
        match self.get("id") {
            Some(Value::Number(number)) => number.as_i64().unwrap_or(0),
            Some(Value::String(value)) => value.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    fn field_keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.keys().map(String::as_str))
    }

    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        match self.get(key)? {
            Value::Null => None,
            Value::String(value) => Some(Cow::Borrowed(value.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}
