// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Client-side table engine: global search, per-column filters, a single
//! sort key and pagination over an in-memory record slice.
//!
//! The engine never reorders or mutates the caller's records. Every derived
//! view is a list of indices into the source slice, recomputed from scratch
//! for each state change.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Record;
use crate::window::{Viewport, WindowConfig, row_offset, visible_range};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_VIRTUALIZATION_THRESHOLD: usize = 100;
pub const DEFAULT_EMPTY_MESSAGE: &str = "No records found";
pub const DEFAULT_SEARCH_PLACEHOLDER: &str = "Search...";
pub const NO_MATCHES_HINT: &str = "Try clearing the search or column filters";

pub type CellRenderer<R> = Arc<dyn Fn(&R) -> String + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "↑",
            Self::Desc => "↓",
        }
    }
}

/// Static facts about a column, without its renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMeta {
    pub key: &'static str,
    pub label: &'static str,
    pub sortable: bool,
    pub filterable: bool,
}

pub struct ColumnDef<R> {
    pub key: &'static str,
    pub label: &'static str,
    pub sortable: bool,
    pub filterable: bool,
    render: Option<CellRenderer<R>>,
}

impl<R> Clone for ColumnDef<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            label: self.label,
            sortable: self.sortable,
            filterable: self.filterable,
            render: self.render.clone(),
        }
    }
}

impl<R> fmt::Debug for ColumnDef<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("render", &self.render.is_some())
            .finish()
    }
}

impl<R: Record> ColumnDef<R> {
    pub fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            sortable: false,
            filterable: false,
            render: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn render(mut self, render: impl Fn(&R) -> String + Send + Sync + 'static) -> Self {
        self.render = Some(Arc::new(render));
        self
    }

    pub fn meta(&self) -> ColumnMeta {
        ColumnMeta {
            key: self.key,
            label: self.label,
            sortable: self.sortable,
            filterable: self.filterable,
        }
    }

    /// Display text for one cell. Missing fields render empty.
    pub fn cell_text(&self, record: &R) -> String {
        match &self.render {
            Some(render) => render(record),
            None => record
                .field(self.key)
                .map(|value| value.into_owned())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub search: String,
    pub columns: BTreeMap<&'static str, String>,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.columns.values().any(|value| !value.is_empty())
    }

    pub fn column(&self, key: &str) -> Option<&str> {
        self.columns
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: &'static str,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub active: Option<SortSpec>,
}

impl SortState {
    /// Same key flips direction; a new key starts ascending.
    pub fn toggle(&mut self, key: &'static str) -> SortDirection {
        let direction = match self.active {
            Some(spec) if spec.key == key => spec.direction.toggled(),
            _ => SortDirection::Asc,
        };
        self.active = Some(SortSpec { key, direction });
        direction
    }

    pub fn direction_for(&self, key: &str) -> Option<SortDirection> {
        self.active
            .filter(|spec| spec.key == key)
            .map(|spec| spec.direction)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub page: usize,
    pub page_size: usize,
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn total_pages(&self, filtered_count: usize) -> usize {
        total_pages(filtered_count, self.page_size)
    }

    /// Page clamped into `1..=max(1, total_pages)`.
    pub fn clamped(&self, filtered_count: usize) -> usize {
        self.page.clamp(1, self.total_pages(filtered_count).max(1))
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

pub fn total_pages(filtered_count: usize, page_size: usize) -> usize {
    filtered_count.div_ceil(page_size.max(1))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableState {
    pub filter: FilterState,
    pub sort: SortState,
    pub page: PageState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCommand {
    SetSearch(String),
    SetFilter { key: &'static str, value: String },
    ClearFilters,
    ToggleSort(&'static str),
    ClearSort,
    FirstPage,
    PrevPage,
    NextPage,
    LastPage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    SearchSet(String),
    SearchCleared,
    FilterSet(&'static str),
    FilterCleared(&'static str),
    FilterUnavailable(&'static str),
    FiltersCleared,
    SortAsc(&'static str),
    SortDesc(&'static str),
    SortUnavailable(&'static str),
    SortCleared,
    UnknownColumn(&'static str),
    Page { page: usize, total: usize },
}

impl TableStatus {
    pub fn message(&self) -> String {
        match self {
            Self::SearchSet(text) => format!("search: {text}"),
            Self::SearchCleared => "search cleared".to_owned(),
            Self::FilterSet(label) => format!("filter on {label}"),
            Self::FilterCleared(label) => format!("filter off {label}"),
            Self::FilterUnavailable(label) => format!("{label} is not filterable"),
            Self::FiltersCleared => "filters cleared".to_owned(),
            Self::SortAsc(label) => format!("sort {label} asc"),
            Self::SortDesc(label) => format!("sort {label} desc"),
            Self::SortUnavailable(label) => format!("{label} is not sortable"),
            Self::SortCleared => "sort cleared".to_owned(),
            Self::UnknownColumn(key) => format!("unknown column {key}"),
            Self::Page { page, total } => format!("page {page}/{}", (*total).max(1)),
        }
    }
}

impl TableState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page: PageState::new(page_size),
            ..Self::default()
        }
    }

    /// Applies one user event. `filtered_count` is the size of the filtered
    /// view before the event and bounds page navigation.
    pub fn apply(
        &mut self,
        command: TableCommand,
        columns: &[ColumnMeta],
        filtered_count: usize,
    ) -> TableStatus {
        match command {
            TableCommand::SetSearch(text) => {
                self.filter.search = text;
                self.page.page = 1;
                if self.filter.search.is_empty() {
                    TableStatus::SearchCleared
                } else {
                    TableStatus::SearchSet(self.filter.search.clone())
                }
            }
            TableCommand::SetFilter { key, value } => {
                let Some(column) = columns.iter().find(|column| column.key == key) else {
                    return TableStatus::UnknownColumn(key);
                };
                if !column.filterable {
                    return TableStatus::FilterUnavailable(column.label);
                }
                self.page.page = 1;
                if value.is_empty() {
                    self.filter.columns.remove(key);
                    TableStatus::FilterCleared(column.label)
                } else {
                    self.filter.columns.insert(key, value);
                    TableStatus::FilterSet(column.label)
                }
            }
            TableCommand::ClearFilters => {
                self.filter = FilterState::default();
                self.page.page = 1;
                TableStatus::FiltersCleared
            }
            TableCommand::ToggleSort(key) => {
                let Some(column) = columns.iter().find(|column| column.key == key) else {
                    return TableStatus::UnknownColumn(key);
                };
                if !column.sortable {
                    return TableStatus::SortUnavailable(column.label);
                }
                self.page.page = self.page.clamped(filtered_count);
                match self.sort.toggle(key) {
                    SortDirection::Asc => TableStatus::SortAsc(column.label),
                    SortDirection::Desc => TableStatus::SortDesc(column.label),
                }
            }
            TableCommand::ClearSort => {
                self.sort = SortState::default();
                TableStatus::SortCleared
            }
            TableCommand::FirstPage => self.go_to_page(1, filtered_count),
            TableCommand::PrevPage => {
                let current = self.page.clamped(filtered_count);
                self.go_to_page(current.saturating_sub(1), filtered_count)
            }
            TableCommand::NextPage => {
                let current = self.page.clamped(filtered_count);
                self.go_to_page(current.saturating_add(1), filtered_count)
            }
            TableCommand::LastPage => {
                self.go_to_page(self.page.total_pages(filtered_count), filtered_count)
            }
        }
    }

    fn go_to_page(&mut self, page: usize, filtered_count: usize) -> TableStatus {
        let total = self.page.total_pages(filtered_count);
        self.page.page = page.clamp(1, total.max(1));
        TableStatus::Page {
            page: self.page.page,
            total,
        }
    }
}

/// Case-insensitive, digit-aware comparison: `"item 2"` sorts before
/// `"item 10"`. Runs of ASCII digits compare by numeric value; everything else
/// compares by lowercased characters.
pub fn natural_cmp(left: &str, right: &str) -> Ordering {
    let mut left_chars = left.chars().peekable();
    let mut right_chars = right.chars().peekable();

    loop {
        match (left_chars.peek().copied(), right_chars.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let left_run = take_digits(&mut left_chars);
                let right_run = take_digits(&mut right_chars);
                let order = compare_digit_runs(&left_run, &right_run);
                if order != Ordering::Equal {
                    return order;
                }
            }
            (Some(l), Some(r)) => {
                let order = l.to_lowercase().cmp(r.to_lowercase());
                if order != Ordering::Equal {
                    return order;
                }
                left_chars.next();
                right_chars.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(ch) = chars.peek().copied() {
        if !ch.is_ascii_digit() {
            break;
        }
        run.push(ch);
        chars.next();
    }
    run
}

fn compare_digit_runs(left: &str, right: &str) -> Ordering {
    let left = left.trim_start_matches('0');
    let right = right.trim_start_matches('0');
    left.len().cmp(&right.len()).then_with(|| left.cmp(right))
}

fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    haystack.to_lowercase().contains(folded_needle)
}

/// Indices of records passing the global search and then every column filter.
pub fn filter_indices<R: Record>(
    records: &[R],
    columns: &[ColumnDef<R>],
    filter: &FilterState,
) -> Vec<usize> {
    let search = filter.search.to_lowercase();
    let column_filters = columns
        .iter()
        .filter_map(|column| {
            filter
                .column(column.key)
                .map(|value| (column.key, value.to_lowercase()))
        })
        .collect::<Vec<_>>();

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            search.is_empty()
                || record.field_keys().any(|key| {
                    record
                        .field(key)
                        .is_some_and(|value| contains_folded(&value, &search))
                })
        })
        .filter(|(_, record)| {
            column_filters.iter().all(|(key, needle)| {
                record
                    .field(key)
                    .is_some_and(|value| contains_folded(&value, needle))
            })
        })
        .map(|(index, _)| index)
        .collect()
}

/// Stable sort of `indices` by the active sort key. Missing fields sort as
/// empty text.
pub fn sort_indices<R: Record>(records: &[R], indices: &mut [usize], sort: &SortState) {
    let Some(spec) = sort.active else {
        return;
    };
    if indices.len() < 2 {
        return;
    }

    let keys = indices
        .iter()
        .map(|index| {
            records[*index]
                .field(spec.key)
                .map(|value| value.into_owned())
                .unwrap_or_default()
        })
        .collect::<Vec<_>>();
    let mut order = (0..indices.len()).collect::<Vec<_>>();
    order.sort_by(|left, right| {
        let ordering = natural_cmp(&keys[*left], &keys[*right]);
        match spec.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    let sorted = order.iter().map(|position| indices[*position]).collect::<Vec<_>>();
    indices.copy_from_slice(&sorted);
}

/// Filtered then sorted indices into `records`.
pub fn ordered_indices<R: Record>(
    records: &[R],
    columns: &[ColumnDef<R>],
    filter: &FilterState,
    sort: &SortState,
) -> Vec<usize> {
    let mut indices = filter_indices(records, columns, filter);
    sort_indices(records, &mut indices, sort);
    indices
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableVariant {
    Paged,
    Windowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmartTableConfig {
    pub virtualization_threshold: usize,
    pub window: WindowConfig,
}

impl Default for SmartTableConfig {
    fn default() -> Self {
        Self {
            virtualization_threshold: DEFAULT_VIRTUALIZATION_THRESHOLD,
            window: WindowConfig::default(),
        }
    }
}

pub fn select_variant(record_count: usize, virtualization_threshold: usize) -> TableVariant {
    if record_count >= virtualization_threshold {
        TableVariant::Windowed
    } else {
        TableVariant::Paged
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAction<A> {
    pub label: String,
    pub action: A,
}

impl<A> RowAction<A> {
    pub fn new(label: impl Into<String>, action: A) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

pub type ActionsFn<'a, R, A> = &'a dyn Fn(&R) -> Vec<RowAction<A>>;

/// Inputs for one render pass.
pub struct TableProps<'a, R, A> {
    pub records: &'a [R],
    pub columns: &'a [ColumnDef<R>],
    pub actions: Option<ActionsFn<'a, R, A>>,
    pub search: Option<&'a str>,
    pub search_placeholder: &'a str,
    pub is_loading: bool,
    pub empty_message: &'a str,
}

impl<'a, R: Record, A: Clone> TableProps<'a, R, A> {
    pub fn new(records: &'a [R], columns: &'a [ColumnDef<R>]) -> Self {
        Self {
            records,
            columns,
            actions: None,
            search: None,
            search_placeholder: DEFAULT_SEARCH_PLACEHOLDER,
            is_loading: false,
            empty_message: DEFAULT_EMPTY_MESSAGE,
        }
    }

    pub fn actions(mut self, actions: ActionsFn<'a, R, A>) -> Self {
        self.actions = Some(actions);
        self
    }

    /// Search text owned by the caller; overrides the state's own search.
    pub fn controlled_search(mut self, search: &'a str) -> Self {
        self.search = Some(search);
        self
    }

    pub fn search_placeholder(mut self, placeholder: &'a str) -> Self {
        self.search_placeholder = placeholder;
        self
    }

    pub fn loading(mut self, is_loading: bool) -> Self {
        self.is_loading = is_loading;
        self
    }

    pub fn empty_message(mut self, message: &'a str) -> Self {
        self.empty_message = message;
        self
    }

    pub fn column_meta(&self) -> Vec<ColumnMeta> {
        self.columns.iter().map(ColumnDef::meta).collect()
    }

    pub fn effective_filter(&self, state: &TableState) -> FilterState {
        match self.search {
            Some(search) => FilterState {
                search: search.to_owned(),
                columns: state.filter.columns.clone(),
            },
            None => state.filter.clone(),
        }
    }

    pub fn ordered(&self, state: &TableState) -> Vec<usize> {
        ordered_indices(
            self.records,
            self.columns,
            &self.effective_filter(state),
            &state.sort,
        )
    }

    pub fn filtered_count(&self, state: &TableState) -> usize {
        filter_indices(self.records, self.columns, &self.effective_filter(state)).len()
    }

    pub fn dispatch(&self, state: &mut TableState, command: TableCommand) -> TableStatus {
        let filtered_count = self.filtered_count(state);
        state.apply(command, &self.column_meta(), filtered_count)
    }

    /// Paginated rendering: the rows of the current (clamped) page.
    pub fn render_paged(&self, state: &TableState) -> TableRender<A> {
        let ordered = self.ordered(state);
        let filtered_count = ordered.len();
        let page = state.page.clamped(filtered_count);
        let size = state.page.page_size;
        let start = ((page - 1) * size).min(filtered_count);
        let end = (page * size).min(filtered_count);

        let rows = (start..end)
            .map(|position| self.render_row(position, ordered[position], None))
            .collect();
        let total = state.page.total_pages(filtered_count);
        self.finish(
            state,
            TableVariant::Paged,
            rows,
            filtered_count,
            TableLayout::Paged(Pagination {
                page,
                total_pages: total,
                page_size: size,
                has_prev: page > 1,
                has_next: page < total,
            }),
        )
    }

    /// Windowed rendering: only rows intersecting the viewport plus the
    /// over-render margin, each with its vertical offset.
    pub fn render_windowed(
        &self,
        state: &TableState,
        viewport: Viewport,
        config: WindowConfig,
    ) -> TableRender<A> {
        let ordered = self.ordered(state);
        let filtered_count = ordered.len();
        let range = visible_range(filtered_count, viewport, config);
        let rows = (range.start..range.end)
            .map(|position| {
                self.render_row(
                    position,
                    ordered[position],
                    Some(row_offset(position, config)),
                )
            })
            .collect();
        self.finish(
            state,
            TableVariant::Windowed,
            rows,
            filtered_count,
            TableLayout::Windowed(WindowGeometry {
                start: range.start,
                end: range.end,
                total_height: range.total_height,
                row_height: config.row_height,
            }),
        )
    }

    /// Picks the windowed renderer for large record sets.
    pub fn render_smart(
        &self,
        state: &TableState,
        config: SmartTableConfig,
        viewport: Viewport,
    ) -> TableRender<A> {
        match select_variant(self.records.len(), config.virtualization_threshold) {
            TableVariant::Paged => self.render_paged(state),
            TableVariant::Windowed => self.render_windowed(state, viewport, config.window),
        }
    }

    fn render_row(
        &self,
        position: usize,
        source_index: usize,
        offset: Option<u64>,
    ) -> RenderedRow<A> {
        let record = &self.records[source_index];
        RenderedRow {
            position,
            source_index,
            id: record.record_id(),
            offset,
            cells: self
                .columns
                .iter()
                .map(|column| column.cell_text(record))
                .collect(),
            actions: self
                .actions
                .map(|actions| actions(record))
                .unwrap_or_default(),
        }
    }

    fn finish(
        &self,
        state: &TableState,
        variant: TableVariant,
        rows: Vec<RenderedRow<A>>,
        filtered_count: usize,
        layout: TableLayout,
    ) -> TableRender<A> {
        let filter = self.effective_filter(state);
        let headers = self
            .columns
            .iter()
            .map(|column| HeaderCell {
                column: column.meta(),
                sort: state.sort.direction_for(column.key),
                filter: filter.column(column.key).map(str::to_owned),
            })
            .collect();

        let placeholder = if self.is_loading {
            Some(Placeholder::Loading)
        } else if filtered_count == 0 {
            Some(Placeholder::Empty {
                message: self.empty_message.to_owned(),
                hint: filter.is_active().then(|| NO_MATCHES_HINT.to_owned()),
            })
        } else {
            None
        };

        TableRender {
            variant,
            headers,
            rows: if self.is_loading { Vec::new() } else { rows },
            placeholder,
            layout,
            search: filter.search,
            search_placeholder: self.search_placeholder.to_owned(),
            filtered_count,
            total_count: self.records.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub column: ColumnMeta,
    pub sort: Option<SortDirection>,
    pub filter: Option<String>,
}

impl HeaderCell {
    pub fn title(&self) -> String {
        let mut title = self.column.label.to_owned();
        if let Some(direction) = self.sort {
            title.push(' ');
            title.push_str(direction.arrow());
        }
        if self.filter.is_some() {
            title.push_str(" ▼");
        }
        title
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow<A> {
    /// Position in the filtered, sorted view.
    pub position: usize,
    pub source_index: usize,
    pub id: i64,
    /// Vertical offset in the windowed variant.
    pub offset: Option<u64>,
    pub cells: Vec<String>,
    pub actions: Vec<RowAction<A>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    Loading,
    Empty {
        message: String,
        hint: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    pub start: usize,
    pub end: usize,
    pub total_height: u64,
    pub row_height: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLayout {
    Paged(Pagination),
    Windowed(WindowGeometry),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRender<A> {
    pub variant: TableVariant,
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<RenderedRow<A>>,
    pub placeholder: Option<Placeholder>,
    pub layout: TableLayout,
    pub search: String,
    pub search_placeholder: String,
    pub filtered_count: usize,
    pub total_count: usize,
}

impl<A> TableRender<A> {
    pub fn column_meta(&self) -> Vec<ColumnMeta> {
        self.headers.iter().map(|header| header.column).collect()
    }

    pub fn row_at(&self, position: usize) -> Option<&RenderedRow<A>> {
        self.rows.iter().find(|row| row.position == position)
    }

    pub fn pagination(&self) -> Option<Pagination> {
        match self.layout {
            TableLayout::Paged(pagination) => Some(pagination),
            TableLayout::Windowed(_) => None,
        }
    }
}
