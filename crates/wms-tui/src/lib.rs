// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use wms_app::{
    ActionsFn, Adjustment, AppCommand, AppMode, AppState, Assignment, AssignmentKind,
    AssignmentStatus, Category, ColumnDef, DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_PLACEHOLDER,
    InventorySummary, PURCHASE_ORDER_WORKFLOW, Placeholder, Product, PurchaseOrder,
    PurchaseOrderStatus, RECEIVING_WORKFLOW, Receiving, ReceivingStatus, Record, RenderedRow,
    RowAction, SmartTableConfig, StockLevel, TRANSFER_WORKFLOW, TabKind, TableCommand, TableProps,
    TableRender, TableState, TableVariant, Transfer, TransferStatus, Viewport, WorkflowButton,
    assignment_workflow, clamp_scroll, format_money, scroll_to_row,
};

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const TABLE_CHROME_ROWS: u16 = 11;
const ACTIONS_HEADER: &str = "Actions";

#[derive(Debug, Clone, PartialEq)]
pub enum TabSnapshot {
    Products(Vec<Product>),
    Categories(Vec<Category>),
    Inventory(Vec<StockLevel>),
    Adjustments(Vec<Adjustment>),
    Transfers(Vec<Transfer>),
    PurchaseOrders(Vec<PurchaseOrder>),
    Receivings(Vec<Receiving>),
    Assignments(AssignmentKind, Vec<Assignment>),
}

impl TabSnapshot {
    pub const fn tab_kind(&self) -> TabKind {
        match self {
            Self::Products(_) => TabKind::Products,
            Self::Categories(_) => TabKind::Categories,
            Self::Inventory(_) => TabKind::Inventory,
            Self::Adjustments(_) => TabKind::Adjustments,
            Self::Transfers(_) => TabKind::Transfers,
            Self::PurchaseOrders(_) => TabKind::PurchaseOrders,
            Self::Receivings(_) => TabKind::Receiving,
            Self::Assignments(AssignmentKind::Picker, _) => TabKind::Picking,
            Self::Assignments(AssignmentKind::Checker, _) => TabKind::Checking,
            Self::Assignments(AssignmentKind::Tagger, _) => TabKind::Tagging,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            Self::Products(rows) => rows.len(),
            Self::Categories(rows) => rows.len(),
            Self::Inventory(rows) => rows.len(),
            Self::Adjustments(rows) => rows.len(),
            Self::Transfers(rows) => rows.len(),
            Self::PurchaseOrders(rows) => rows.len(),
            Self::Receivings(rows) => rows.len(),
            Self::Assignments(_, rows) => rows.len(),
        }
    }
}

/// Record source behind the UI. Mutations return errors instead of
/// panicking; the UI reports them in the status line.
pub trait AppRuntime {
    fn load_summary(&mut self) -> Result<InventorySummary>;
    fn load_tab_snapshot(&mut self, tab: TabKind) -> Result<Option<TabSnapshot>>;
    fn apply_transition(&mut self, tab: TabKind, row_id: i64, to: &str) -> Result<()>;
    /// Returns false when the row was already gone.
    fn delete_row(&mut self, tab: TabKind, row_id: i64) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSettings {
    pub page_size: usize,
    pub smart: SmartTableConfig,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            smart: SmartTableConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowCommand {
    Advance { to: &'static str },
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableKey {
    MoveRow(isize),
    MoveColumn(isize),
    ToggleSort,
    ClearSort,
    ClearFilters,
    FirstPage,
    PrevPage,
    NextPage,
    LastPage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq)]
struct ViewData {
    settings: TableSettings,
    summary: InventorySummary,
    snapshot: Option<TabSnapshot>,
    loading: bool,
    table: TableState,
    selected: usize,
    selected_col: usize,
    scroll_offset: u64,
    viewport_rows: usize,
    input: String,
    filter_key: Option<&'static str>,
    status_token: u64,
}

impl ViewData {
    fn new(settings: TableSettings) -> Self {
        Self {
            settings,
            summary: InventorySummary::default(),
            snapshot: None,
            loading: false,
            table: TableState::with_page_size(settings.page_size),
            selected: 0,
            selected_col: 0,
            scroll_offset: 0,
            viewport_rows: settings.page_size.max(1),
            input: String::new(),
            filter_key: None,
            status_token: 0,
        }
    }

    fn viewport(&self) -> Viewport {
        Viewport {
            scroll_offset: self.scroll_offset,
            height: self.viewport_height(),
        }
    }

    fn viewport_height(&self) -> u64 {
        (self.viewport_rows as u64).saturating_mul(self.settings.smart.window.row_height.max(1))
    }
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    settings: TableSettings,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(settings);
    let (internal_tx, internal_rx) = mpsc::channel();

    if let Err(error) = refresh_view_data(state, runtime, &mut view_data) {
        tracing::warn!(error = %format!("{error:#}"), "initial load failed");
        state.dispatch(AppCommand::SetStatus(format!("load failed: {error}")));
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        match terminal.size() {
            Ok(size) => {
                let rows = size.height.saturating_sub(TABLE_CHROME_ROWS).max(1);
                view_data.viewport_rows = usize::from(rows);
            }
            Err(error) => {
                result = Err(error).context("read terminal size");
                break;
            }
        }
        ensure_selection(&mut view_data);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event
            && let Event::Key(key) = event::read().context("read event")?
            && handle_key_event(state, runtime, &mut view_data, &internal_tx, key)
        {
            break;
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if matches!(state.mode, AppMode::Search | AppMode::Filter) {
        handle_input_key(state, view_data, internal_tx, key);
        return false;
    }

    if state.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            state.dispatch(AppCommand::ToggleHelp);
        }
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) => return true,
        (KeyCode::Char('?'), _) => {
            state.dispatch(AppCommand::ToggleHelp);
        }
        (KeyCode::Tab, _) | (KeyCode::Char(']'), _) => {
            dispatch_and_refresh(state, runtime, view_data, internal_tx, AppCommand::NextTab);
        }
        (KeyCode::BackTab, _) | (KeyCode::Char('['), _) => {
            dispatch_and_refresh(state, runtime, view_data, internal_tx, AppCommand::PrevTab);
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            match refresh_view_data(state, runtime, view_data) {
                Ok(()) => emit_status(state, view_data, internal_tx, "refreshed"),
                Err(error) => {
                    emit_status(state, view_data, internal_tx, format!("refresh failed: {error}"));
                }
            }
        }
        (KeyCode::Char('a'), KeyModifiers::NONE) => {
            advance_selected_row(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Char('x'), KeyModifiers::NONE) => {
            delete_selected_row(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Char('/'), _) => begin_search(state, view_data),
        (KeyCode::Char('f'), KeyModifiers::NONE) => begin_filter(state, view_data, internal_tx),
        _ => {
            if state.active_tab != TabKind::Dashboard
                && let Some(table_key) = table_key_for(key)
                && let Some(message) = apply_table_key(view_data, table_key)
            {
                emit_status(state, view_data, internal_tx, message);
            }
        }
    }
    false
}

fn dispatch_and_refresh<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    state.dispatch(command);
    if let Err(error) = refresh_view_data(state, runtime, view_data) {
        emit_status(state, view_data, internal_tx, format!("load failed: {error}"));
    }
}

fn table_key_for(key: KeyEvent) -> Option<TableKey> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(TableKey::MoveRow(1)),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(TableKey::MoveRow(-1)),
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => Some(TableKey::MoveColumn(-1)),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => Some(TableKey::MoveColumn(1)),
        (KeyCode::Char('s'), KeyModifiers::NONE) => Some(TableKey::ToggleSort),
        (KeyCode::Char('S'), _) => Some(TableKey::ClearSort),
        (KeyCode::Char('c'), KeyModifiers::NONE) => Some(TableKey::ClearFilters),
        (KeyCode::Char('g'), _) | (KeyCode::Home, _) => Some(TableKey::FirstPage),
        (KeyCode::Char('p'), _) | (KeyCode::PageUp, _) => Some(TableKey::PrevPage),
        (KeyCode::Char('n'), _) | (KeyCode::PageDown, _) => Some(TableKey::NextPage),
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => Some(TableKey::LastPage),
        _ => None,
    }
}

fn apply_table_key(view_data: &mut ViewData, key: TableKey) -> Option<String> {
    let render = active_render(view_data)?;
    let command = match key {
        TableKey::MoveRow(delta) => {
            move_row(view_data, &render, delta);
            return None;
        }
        TableKey::MoveColumn(delta) => {
            let last = render.headers.len().saturating_sub(1) as isize;
            let column = (view_data.selected_col as isize + delta).clamp(0, last);
            view_data.selected_col = column as usize;
            return None;
        }
        TableKey::ToggleSort => {
            TableCommand::ToggleSort(render.headers.get(view_data.selected_col)?.column.key)
        }
        TableKey::ClearSort => TableCommand::ClearSort,
        TableKey::ClearFilters => TableCommand::ClearFilters,
        TableKey::FirstPage => TableCommand::FirstPage,
        TableKey::PrevPage => TableCommand::PrevPage,
        TableKey::NextPage => TableCommand::NextPage,
        TableKey::LastPage => TableCommand::LastPage,
    };

    let is_page_move = matches!(
        command,
        TableCommand::FirstPage
            | TableCommand::PrevPage
            | TableCommand::NextPage
            | TableCommand::LastPage
    );
    if is_page_move && render.variant == TableVariant::Windowed {
        return Some(scroll_window(view_data, &render, command));
    }

    let status = view_data
        .table
        .apply(command.clone(), &render.column_meta(), render.filtered_count);
    match command {
        TableCommand::ClearFilters => reset_cursor(view_data),
        _ if is_page_move => {
            view_data.selected = (view_data.table.page.page - 1) * view_data.table.page.page_size;
        }
        _ => {}
    }
    Some(status.message())
}

/// Page keys in the windowed variant jump the cursor by one viewport.
fn scroll_window(
    view_data: &mut ViewData,
    render: &TableRender<RowCommand>,
    command: TableCommand,
) -> String {
    let last = render.filtered_count.saturating_sub(1);
    let rows = view_data.viewport_rows.max(1);
    view_data.selected = match command {
        TableCommand::FirstPage => 0,
        TableCommand::LastPage => last,
        TableCommand::PrevPage => view_data.selected.saturating_sub(rows),
        _ => view_data.selected.saturating_add(rows).min(last),
    };
    follow_selection(view_data, render.filtered_count);
    format!("row {}/{}", view_data.selected + 1, render.filtered_count)
}

fn move_row(view_data: &mut ViewData, render: &TableRender<RowCommand>, delta: isize) {
    match render.variant {
        TableVariant::Paged => {
            let (Some(first), Some(last)) = (render.rows.first(), render.rows.last()) else {
                return;
            };
            let next = (view_data.selected as isize + delta)
                .clamp(first.position as isize, last.position as isize);
            view_data.selected = next as usize;
        }
        TableVariant::Windowed => {
            if render.filtered_count == 0 {
                return;
            }
            let last = render.filtered_count as isize - 1;
            view_data.selected = (view_data.selected as isize + delta).clamp(0, last) as usize;
            follow_selection(view_data, render.filtered_count);
        }
    }
}

fn follow_selection(view_data: &mut ViewData, row_count: usize) {
    let window = view_data.settings.smart.window;
    let height = view_data.viewport_height();
    let offset = scroll_to_row(view_data.scroll_offset, view_data.selected, height, window);
    view_data.scroll_offset = clamp_scroll(offset, row_count, height, window);
}

fn reset_cursor(view_data: &mut ViewData) {
    view_data.selected = 0;
    view_data.scroll_offset = 0;
}

/// Keeps the cursor on a rendered row after the record set or geometry changes.
fn ensure_selection(view_data: &mut ViewData) {
    let Some(render) = active_render(view_data) else {
        return;
    };
    view_data.selected_col = view_data
        .selected_col
        .min(render.headers.len().saturating_sub(1));
    match render.variant {
        TableVariant::Paged => {
            if let (Some(first), Some(last)) = (render.rows.first(), render.rows.last()) {
                view_data.selected = view_data.selected.clamp(first.position, last.position);
            } else {
                view_data.selected = 0;
            }
        }
        TableVariant::Windowed => {
            view_data.selected = view_data
                .selected
                .min(render.filtered_count.saturating_sub(1));
            follow_selection(view_data, render.filtered_count);
        }
    }
}

fn begin_search(state: &mut AppState, view_data: &mut ViewData) {
    state.dispatch(AppCommand::EnterSearch);
    if state.mode == AppMode::Search {
        view_data.input = view_data.table.filter.search.clone();
    }
}

fn begin_filter(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(render) = active_render(view_data) else {
        state.dispatch(AppCommand::EnterFilter);
        return;
    };
    let Some(header) = render.headers.get(view_data.selected_col) else {
        return;
    };
    if !header.column.filterable {
        let message = format!("{} is not filterable", header.column.label);
        emit_status(state, view_data, internal_tx, message);
        return;
    }
    state.dispatch(AppCommand::EnterFilter);
    view_data.filter_key = Some(header.column.key);
    view_data.input = header.filter.clone().unwrap_or_default();
}

fn handle_input_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            view_data.filter_key = None;
            state.dispatch(AppCommand::ExitToNav);
            return;
        }
        KeyCode::Backspace => {
            view_data.input.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.input.push(ch);
        }
        _ => return,
    }

    let command = match (state.mode, view_data.filter_key) {
        (AppMode::Filter, Some(key)) => TableCommand::SetFilter {
            key,
            value: view_data.input.clone(),
        },
        _ => TableCommand::SetSearch(view_data.input.clone()),
    };
    let Some(render) = active_render(view_data) else {
        return;
    };
    let status = view_data
        .table
        .apply(command, &render.column_meta(), render.filtered_count);
    reset_cursor(view_data);
    emit_status(state, view_data, internal_tx, status.message());
}

fn selected_row(view_data: &ViewData) -> Option<(i64, Vec<RowAction<RowCommand>>)> {
    let render = active_render(view_data)?;
    let row = render.row_at(view_data.selected)?;
    Some((row.id, row.actions.clone()))
}

fn advance_selected_row<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let tab = state.active_tab;
    let Some((row_id, _)) = selected_row(view_data) else {
        emit_status(state, view_data, internal_tx, "no row selected");
        return;
    };
    let pressed = view_data
        .snapshot
        .as_ref()
        .and_then(|snapshot| press_workflow(snapshot, row_id, runtime));
    let Some((label, to, outcome)) = pressed else {
        emit_status(state, view_data, internal_tx, "no workflow action for this row");
        return;
    };

    match outcome {
        Ok(()) => {
            tracing::info!(tab = tab.label(), row_id, to, "workflow action");
            if let Err(error) = refresh_view_data(state, runtime, view_data) {
                emit_status(state, view_data, internal_tx, format!("reload failed: {error}"));
                return;
            }
            emit_status(state, view_data, internal_tx, format!("{label}: {row_id} -> {to}"));
        }
        Err(error) => {
            tracing::warn!(
                tab = tab.label(),
                row_id,
                to,
                error = %format!("{error:#}"),
                "workflow action failed"
            );
            emit_status(state, view_data, internal_tx, format!("{label} failed: {error}"));
        }
    }
}

type Pressed = (&'static str, &'static str, Result<()>);

/// Presses the workflow button of row `row_id`; the runtime applies the
/// transition from inside the button's handler.
fn press_workflow<R: AppRuntime>(
    snapshot: &TabSnapshot,
    row_id: i64,
    runtime: &mut R,
) -> Option<Pressed> {
    let tab = snapshot.tab_kind();
    let mut apply = |to: &'static str| runtime.apply_transition(tab, row_id, to);
    match snapshot {
        TabSnapshot::Transfers(rows) => {
            let row = rows.iter().find(|row| row.id.get() == row_id)?;
            press_button(
                TRANSFER_WORKFLOW.button(row.status, true),
                TransferStatus::as_str,
                &mut apply,
            )
        }
        TabSnapshot::PurchaseOrders(rows) => {
            let row = rows.iter().find(|row| row.id.get() == row_id)?;
            press_button(
                PURCHASE_ORDER_WORKFLOW.button(row.status, true),
                PurchaseOrderStatus::as_str,
                &mut apply,
            )
        }
        TabSnapshot::Receivings(rows) => {
            let row = rows.iter().find(|row| row.id.get() == row_id)?;
            press_button(
                RECEIVING_WORKFLOW.button(row.status, true),
                ReceivingStatus::as_str,
                &mut apply,
            )
        }
        TabSnapshot::Assignments(kind, rows) => {
            let row = rows.iter().find(|row| row.id.get() == row_id)?;
            press_button(
                assignment_workflow(*kind).button(row.status, row.is_assigned()),
                AssignmentStatus::as_str,
                &mut apply,
            )
        }
        TabSnapshot::Products(_)
        | TabSnapshot::Categories(_)
        | TabSnapshot::Inventory(_)
        | TabSnapshot::Adjustments(_) => None,
    }
}

fn press_button<S: Copy>(
    button: WorkflowButton<S>,
    status_key: fn(S) -> &'static str,
    apply: &mut dyn FnMut(&'static str) -> Result<()>,
) -> Option<Pressed> {
    let label = button.label()?;
    button.press(|to| {
        let to = status_key(to);
        (label, to, apply(to))
    })
}

fn delete_selected_row<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let tab = state.active_tab;
    let Some((row_id, actions)) = selected_row(view_data) else {
        emit_status(state, view_data, internal_tx, "no row selected");
        return;
    };
    if !actions.iter().any(|action| action.action == RowCommand::Delete) {
        emit_status(state, view_data, internal_tx, "row cannot be deleted");
        return;
    }

    let message = match runtime.delete_row(tab, row_id) {
        Ok(true) => format!("deleted {row_id}"),
        Ok(false) => format!("{row_id} was already deleted"),
        Err(error) => {
            emit_status(state, view_data, internal_tx, format!("delete failed: {error}"));
            return;
        }
    };
    if let Err(error) = refresh_view_data(state, runtime, view_data) {
        emit_status(state, view_data, internal_tx, format!("reload failed: {error}"));
        return;
    }
    emit_status(state, view_data, internal_tx, message);
}

fn refresh_view_data<R: AppRuntime>(
    state: &AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
) -> Result<()> {
    view_data.summary = runtime.load_summary()?;

    let tab = state.active_tab;
    if tab == TabKind::Dashboard {
        view_data.snapshot = None;
        view_data.loading = false;
        return Ok(());
    }

    let tab_changed = view_data
        .snapshot
        .as_ref()
        .is_none_or(|snapshot| snapshot.tab_kind() != tab);
    if tab_changed {
        view_data.table = TableState::with_page_size(view_data.settings.page_size);
        view_data.selected_col = 0;
        reset_cursor(view_data);
    }

    view_data.loading = true;
    let snapshot = match runtime.load_tab_snapshot(tab) {
        Ok(snapshot) => snapshot,
        Err(error) => {
            view_data.loading = false;
            if tab_changed {
                view_data.snapshot = None;
            }
            tracing::warn!(tab = tab.label(), error = %format!("{error:#}"), "tab load failed");
            return Err(error);
        }
    };
    tracing::debug!(
        tab = tab.label(),
        rows = snapshot.as_ref().map_or(0, TabSnapshot::row_count),
        "loaded tab"
    );
    view_data.snapshot = snapshot;
    view_data.loading = false;
    ensure_selection(view_data);
    Ok(())
}

fn active_render(view_data: &ViewData) -> Option<TableRender<RowCommand>> {
    let snapshot = view_data.snapshot.as_ref()?;
    Some(match snapshot {
        TabSnapshot::Products(rows) => render_records(
            view_data,
            rows,
            &product_columns(),
            &delete_only::<Product>,
            "No products",
        ),
        TabSnapshot::Categories(rows) => render_records(
            view_data,
            rows,
            &category_columns(),
            &delete_only::<Category>,
            "No categories",
        ),
        TabSnapshot::Inventory(rows) => render_records(
            view_data,
            rows,
            &stock_columns(),
            &delete_only::<StockLevel>,
            "No stock levels",
        ),
        TabSnapshot::Adjustments(rows) => render_records(
            view_data,
            rows,
            &adjustment_columns(),
            &delete_only::<Adjustment>,
            "No adjustments",
        ),
        TabSnapshot::Transfers(rows) => render_records(
            view_data,
            rows,
            &transfer_columns(),
            &|row: &Transfer| {
                row_actions(TRANSFER_WORKFLOW.button(row.status, true), TransferStatus::as_str)
            },
            "No transfers",
        ),
        TabSnapshot::PurchaseOrders(rows) => render_records(
            view_data,
            rows,
            &purchase_order_columns(),
            &|row: &PurchaseOrder| {
                row_actions(
                    PURCHASE_ORDER_WORKFLOW.button(row.status, true),
                    PurchaseOrderStatus::as_str,
                )
            },
            "No purchase orders",
        ),
        TabSnapshot::Receivings(rows) => render_records(
            view_data,
            rows,
            &receiving_columns(),
            &|row: &Receiving| {
                row_actions(RECEIVING_WORKFLOW.button(row.status, true), ReceivingStatus::as_str)
            },
            "No receivings",
        ),
        TabSnapshot::Assignments(kind, rows) => {
            let workflow = assignment_workflow(*kind);
            render_records(
                view_data,
                rows,
                &assignment_columns(),
                &|row: &Assignment| {
                    row_actions(
                        workflow.button(row.status, row.is_assigned()),
                        AssignmentStatus::as_str,
                    )
                },
                "No assignments",
            )
        }
    })
}

fn render_records<R: Record>(
    view_data: &ViewData,
    records: &[R],
    columns: &[ColumnDef<R>],
    actions: ActionsFn<'_, R, RowCommand>,
    empty_message: &str,
) -> TableRender<RowCommand> {
    TableProps::new(records, columns)
        .actions(actions)
        .loading(view_data.loading)
        .empty_message(empty_message)
        .render_smart(&view_data.table, view_data.settings.smart, view_data.viewport())
}

fn delete_only<R>(_: &R) -> Vec<RowAction<RowCommand>> {
    vec![RowAction::new("Delete", RowCommand::Delete)]
}

fn row_actions<S: Copy>(
    button: WorkflowButton<S>,
    status_key: fn(S) -> &'static str,
) -> Vec<RowAction<RowCommand>> {
    let mut actions = Vec::with_capacity(2);
    if let Some(label) = button.label()
        && let Some(to) = button.target()
    {
        actions.push(RowAction::new(
            label,
            RowCommand::Advance {
                to: status_key(*to),
            },
        ));
    }
    actions.push(RowAction::new("Delete", RowCommand::Delete));
    actions
}

fn money(cents: i64) -> String {
    format_money(cents)
}

fn product_columns() -> Vec<ColumnDef<Product>> {
    vec![
        ColumnDef::new("sku", "SKU").sortable().filterable(),
        ColumnDef::new("name", "Name").sortable().filterable(),
        ColumnDef::new("category", "Category").sortable().filterable(),
        ColumnDef::new("brand", "Brand").sortable().filterable(),
        ColumnDef::new("price", "Price")
            .sortable()
            .render(|row: &Product| money(row.price_cents)),
        ColumnDef::new("margin", "Margin").render(|row: &Product| {
            row.profit_margin_percent()
                .map(|margin| format!("{margin:.1}%"))
                .unwrap_or_default()
        }),
        ColumnDef::new("reorder_point", "Reorder").sortable(),
        ColumnDef::new("supplier", "Supplier").sortable().filterable(),
        ColumnDef::new("status", "Status").sortable().filterable(),
    ]
}

fn category_columns() -> Vec<ColumnDef<Category>> {
    vec![
        ColumnDef::new("code", "Code").sortable().filterable(),
        ColumnDef::new("path", "Category").sortable().filterable(),
        ColumnDef::new("description", "Description").filterable(),
        ColumnDef::new("status", "Status").sortable().filterable(),
    ]
}

fn stock_columns() -> Vec<ColumnDef<StockLevel>> {
    vec![
        ColumnDef::new("sku", "SKU").sortable().filterable(),
        ColumnDef::new("product", "Product").sortable().filterable(),
        ColumnDef::new("warehouse", "Warehouse").sortable().filterable(),
        ColumnDef::new("location", "Location").sortable().filterable(),
        ColumnDef::new("available", "Available")
            .sortable()
            .render(|row: &StockLevel| {
                if row.is_out_of_stock() {
                    "0 out".to_owned()
                } else if row.is_low_stock() {
                    format!("{} low", row.available)
                } else {
                    row.available.to_string()
                }
            }),
        ColumnDef::new("reserved", "Reserved").sortable(),
        ColumnDef::new("allocated", "Allocated").sortable(),
        ColumnDef::new("value", "Value")
            .sortable()
            .render(|row: &StockLevel| money(row.total_value_cents())),
        ColumnDef::new("lot_number", "Lot").filterable(),
        ColumnDef::new("expiry_date", "Expires").sortable(),
    ]
}

fn adjustment_columns() -> Vec<ColumnDef<Adjustment>> {
    vec![
        ColumnDef::new("number", "Number").sortable().filterable(),
        ColumnDef::new("sku", "SKU").sortable().filterable(),
        ColumnDef::new("type", "Type").sortable().filterable(),
        ColumnDef::new("category", "Category").sortable().filterable(),
        ColumnDef::new("delta", "Change").render(|row: &Adjustment| format!("{:+}", row.delta())),
        ColumnDef::new("reason", "Reason").filterable(),
        ColumnDef::new("adjusted_by", "By").sortable().filterable(),
        ColumnDef::new("created_on", "Date").sortable(),
    ]
}

fn transfer_columns() -> Vec<ColumnDef<Transfer>> {
    vec![
        ColumnDef::new("number", "Number").sortable().filterable(),
        ColumnDef::new("sku", "SKU").sortable().filterable(),
        ColumnDef::new("quantity", "Qty").sortable(),
        ColumnDef::new("from", "From").sortable().filterable(),
        ColumnDef::new("to", "To").sortable().filterable(),
        ColumnDef::new("requested_by", "Requested by").sortable().filterable(),
        ColumnDef::new("requested_on", "Date").sortable(),
        ColumnDef::new("status", "Status").sortable().filterable(),
    ]
}

fn purchase_order_columns() -> Vec<ColumnDef<PurchaseOrder>> {
    vec![
        ColumnDef::new("number", "Number").sortable().filterable(),
        ColumnDef::new("supplier", "Supplier").sortable().filterable(),
        ColumnDef::new("order_date", "Ordered").sortable(),
        ColumnDef::new("expected_date", "Expected").sortable(),
        ColumnDef::new("lines", "Lines").sortable(),
        ColumnDef::new("total", "Total")
            .sortable()
            .render(|row: &PurchaseOrder| money(row.total_cents)),
        ColumnDef::new("status", "Status").sortable().filterable(),
    ]
}

fn receiving_columns() -> Vec<ColumnDef<Receiving>> {
    vec![
        ColumnDef::new("number", "Number").sortable().filterable(),
        ColumnDef::new("supplier", "Supplier").sortable().filterable(),
        ColumnDef::new("purchase_order", "PO").sortable().filterable(),
        ColumnDef::new("warehouse", "Warehouse").sortable().filterable(),
        ColumnDef::new("received_by", "Received by").sortable().filterable(),
        ColumnDef::new("received_on", "Date").sortable(),
        ColumnDef::new("status", "Status").sortable().filterable(),
    ]
}

fn assignment_columns() -> Vec<ColumnDef<Assignment>> {
    vec![
        ColumnDef::new("order", "Order").sortable().filterable(),
        ColumnDef::new("assignee", "Assignee")
            .sortable()
            .filterable()
            .render(|row: &Assignment| match row.assignee.as_deref() {
                Some(name) if row.is_assigned() => name.to_owned(),
                _ => "unassigned".to_owned(),
            }),
        ColumnDef::new("items", "Items").sortable(),
        ColumnDef::new("status", "Status").sortable().filterable(),
        ColumnDef::new("updated_on", "Updated").sortable(),
    ]
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let selected = TabKind::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let tab_titles = TabKind::ALL
        .iter()
        .map(|tab| tab_title(*tab, state, &view_data.table))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title("wms").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    let search = Paragraph::new(search_line_text(state, view_data))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(search, layout[1]);

    if state.active_tab == TabKind::Dashboard {
        let body = Paragraph::new(render_dashboard_text(&view_data.summary))
            .block(Block::default().borders(Borders::ALL).title("dashboard"));
        frame.render_widget(body, layout[2]);
    } else {
        render_table(frame, layout[2], state, view_data);
    }

    let status_widget = Paragraph::new(status_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status_widget, layout[3]);

    if state.help_visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn tab_title(tab: TabKind, state: &AppState, table: &TableState) -> String {
    if state.active_tab == tab && table.filter.is_active() {
        format!(" {} ▼ ", tab.label())
    } else {
        format!(" {} ", tab.label())
    }
}

fn search_line_text(state: &AppState, view_data: &ViewData) -> String {
    match state.mode {
        AppMode::Search => format!("search: {}▏", view_data.input),
        AppMode::Filter => format!(
            "filter {}: {}▏",
            view_data.filter_key.unwrap_or_default(),
            view_data.input
        ),
        AppMode::Nav if view_data.table.filter.search.is_empty() => {
            DEFAULT_SEARCH_PLACEHOLDER.to_owned()
        }
        AppMode::Nav => format!("search: {}", view_data.table.filter.search),
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let Some(render) = active_render(view_data) else {
        let empty = Paragraph::new("loading...").block(
            Block::default()
                .borders(Borders::ALL)
                .title(state.active_tab.label()),
        );
        frame.render_widget(empty, area);
        return;
    };

    if let Some(placeholder) = &render.placeholder {
        let text = match placeholder {
            Placeholder::Loading => "loading...".to_owned(),
            Placeholder::Empty { message, hint } => match hint {
                Some(hint) => format!("{message}\n{hint}"),
                None => message.clone(),
            },
        };
        let empty = Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .title(table_title(state.active_tab, &render)),
        );
        frame.render_widget(empty, area);
        return;
    }

    let mut header_cells = render
        .headers
        .iter()
        .map(|header| header.title())
        .collect::<Vec<_>>();
    header_cells.push(ACTIONS_HEADER.to_owned());
    let header = Row::new(header_cells.into_iter().map(|label| {
        Cell::from(label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));
    let widths = vec![Constraint::Min(6); render.headers.len() + 1];

    let visible = visible_rows(view_data, &render);
    let rows = visible.into_iter().map(|row| {
        let selected_row = row.position == view_data.selected;
        let mut cells = row
            .cells
            .iter()
            .enumerate()
            .map(|(column_index, text)| {
                let mut style = Style::default();
                if selected_row {
                    style = style.bg(Color::DarkGray);
                }
                if selected_row && column_index == view_data.selected_col {
                    style = Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD);
                }
                Cell::from(text.clone()).style(style)
            })
            .collect::<Vec<_>>();
        let action_style = if selected_row {
            Style::default().fg(Color::Green).bg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Green)
        };
        cells.push(Cell::from(action_labels(&row.actions)).style(action_style));
        Row::new(cells)
    });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(state.active_tab, &render))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

/// The windowed variant materializes over-render rows; only those inside the
/// viewport are drawn.
fn visible_rows<'a>(
    view_data: &ViewData,
    render: &'a TableRender<RowCommand>,
) -> Vec<&'a RenderedRow<RowCommand>> {
    match render.variant {
        TableVariant::Paged => render.rows.iter().collect(),
        TableVariant::Windowed => {
            let top = view_data.scroll_offset;
            let bottom = top + view_data.viewport_height();
            render
                .rows
                .iter()
                .filter(|row| row.offset.is_some_and(|offset| offset >= top && offset < bottom))
                .collect()
        }
    }
}

fn action_labels(actions: &[RowAction<RowCommand>]) -> String {
    actions
        .iter()
        .filter(|action| matches!(action.action, RowCommand::Advance { .. }))
        .map(|action| format!("[a] {}", action.label))
        .collect::<Vec<_>>()
        .join(" ")
}

fn table_title(tab: TabKind, render: &TableRender<RowCommand>) -> String {
    let counts = if render.filtered_count == render.total_count {
        render.total_count.to_string()
    } else {
        format!("{}/{}", render.filtered_count, render.total_count)
    };
    let position = match (render.pagination(), render.rows.first(), render.rows.last()) {
        (Some(pagination), _, _) => {
            format!("page {}/{}", pagination.page, pagination.total_pages.max(1))
        }
        (None, Some(first), Some(last)) => {
            format!("rows {}-{}", first.position + 1, last.position + 1)
        }
        (None, _, _) => "rows 0".to_owned(),
    };
    format!(" {} {counts} | {position} ", tab.label())
}

fn render_dashboard_text(summary: &InventorySummary) -> String {
    [
        format!(
            "products: {} ({} active)",
            summary.total_products, summary.active_products
        ),
        format!("low stock: {}", summary.low_stock),
        format!("out of stock: {}", summary.out_of_stock),
        format!("inventory value: {}", money(summary.inventory_value_cents)),
        String::new(),
        format!("open transfers: {}", summary.open_transfers),
        format!("pending assignments: {}", summary.pending_assignments),
    ]
    .join("\n")
}

fn status_text(state: &AppState) -> String {
    let (mode, hints) = match state.mode {
        AppMode::Nav => (
            "NAV",
            "j/k/h/l | / search f filter c clear | s/S sort | n/p g/G page | a advance x delete | r | tab | ? | q",
        ),
        AppMode::Search => ("SEARCH", "type to search | enter/esc done"),
        AppMode::Filter => ("FILTER", "type to filter | enter/esc done"),
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn help_overlay_text() -> &'static str {
    "nav: j/k rows | h/l columns | tab/shift+tab or ]/[ switch tabs\n\
table: / search all fields | f filter selected column | c clear search and filters\n\
table: s sort selected column (asc, desc) | S clear sort\n\
pages: n/p next/prev | g/G first/last (windowed tables jump by screen)\n\
rows: a advance workflow | x delete\n\
global: r refresh | ? help | q or ctrl+c quit"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, InternalEvent, RowCommand, TabSnapshot, TableSettings, ViewData,
        active_render, handle_key_event, process_internal_events, refresh_view_data,
        render_dashboard_text, status_text, table_title, visible_rows,
    };
    use anyhow::bail;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::mpsc;
    use time::macros::date;
    use wms_app::{
        AppMode, AppState, Assignment, AssignmentId, AssignmentKind, AssignmentStatus,
        InventorySummary, Placeholder, Product, ProductId, ProductStatus, SmartTableConfig, TabKind,
        TableVariant, Transfer, TransferId, TransferStatus, WindowConfig,
    };

    #[derive(Debug, Default)]
    struct TestRuntime {
        products: Vec<Product>,
        transfers: Vec<Transfer>,
        assignments: Vec<Assignment>,
        transitions: Vec<(TabKind, i64, String)>,
        deletes: Vec<(TabKind, i64)>,
        fail_transitions: bool,
        fail_loads: bool,
    }

    impl TestRuntime {
        fn sample_product(id: i64, name: &str) -> Product {
            Product {
                id: ProductId::new(id),
                sku: format!("SKU-{id:06}"),
                barcode: None,
                name: name.to_owned(),
                category: "Tools".to_owned(),
                brand: "Acme".to_owned(),
                unit: "pcs".to_owned(),
                cost_cents: 500,
                price_cents: 900 + id,
                minimum_stock: 0,
                reorder_point: 10,
                supplier: format!("Supplier {id}"),
                status: ProductStatus::Active,
            }
        }

        fn sample_transfer(id: i64, status: TransferStatus) -> Transfer {
            Transfer {
                id: TransferId::new(id),
                number: format!("TRF-2026-{id:03}"),
                product_id: ProductId::new(1),
                sku: "SKU-000001".to_owned(),
                quantity: 5,
                from_location: "WH-001 / A-01-01".to_owned(),
                to_location: "WH-002 / B-02-02".to_owned(),
                unit_cost_cents: 500,
                requested_by: "Avery".to_owned(),
                requested_on: date!(2026 - 01 - 02),
                status,
            }
        }

        fn sample_assignment(id: i64, assignee: Option<&str>) -> Assignment {
            Assignment {
                id: AssignmentId::new(id),
                kind: AssignmentKind::Picker,
                order_number: format!("SO-2026-{id:03}"),
                assignee: assignee.map(str::to_owned),
                item_count: 4,
                status: AssignmentStatus::Pending,
                updated_on: date!(2026 - 01 - 03),
            }
        }

        fn warehouse() -> Self {
            let names = [
                "Blue Widget",
                "Hex Bolt",
                "Red Widget",
                "Washer",
                "Hinge",
                "Bracket",
                "Gasket",
                "Spring",
            ];
            Self {
                products: names
                    .iter()
                    .enumerate()
                    .map(|(index, name)| Self::sample_product(index as i64 + 1, name))
                    .collect(),
                transfers: vec![
                    Self::sample_transfer(1, TransferStatus::Pending),
                    Self::sample_transfer(2, TransferStatus::Completed),
                ],
                assignments: vec![
                    Self::sample_assignment(1, Some("Dana")),
                    Self::sample_assignment(2, None),
                ],
                ..Self::default()
            }
        }
    }

    impl AppRuntime for TestRuntime {
        fn load_summary(&mut self) -> anyhow::Result<InventorySummary> {
            Ok(InventorySummary {
                total_products: self.products.len(),
                active_products: self.products.len(),
                ..InventorySummary::default()
            })
        }

        fn load_tab_snapshot(&mut self, tab: TabKind) -> anyhow::Result<Option<TabSnapshot>> {
            if self.fail_loads {
                bail!("dataset unreadable");
            }
            Ok(match tab {
                TabKind::Products => Some(TabSnapshot::Products(self.products.clone())),
                TabKind::Transfers => Some(TabSnapshot::Transfers(self.transfers.clone())),
                TabKind::Picking => Some(TabSnapshot::Assignments(
                    AssignmentKind::Picker,
                    self.assignments.clone(),
                )),
                TabKind::Dashboard => None,
                _ => Some(TabSnapshot::Categories(Vec::new())),
            })
        }

        fn apply_transition(&mut self, tab: TabKind, row_id: i64, to: &str) -> anyhow::Result<()> {
            if self.fail_transitions {
                bail!("store unavailable");
            }
            self.transitions.push((tab, row_id, to.to_owned()));
            if let Some(row) = self
                .assignments
                .iter_mut()
                .find(|row| row.id.get() == row_id)
                && let Some(status) = AssignmentStatus::parse(to)
            {
                row.status = status;
            }
            Ok(())
        }

        fn delete_row(&mut self, tab: TabKind, row_id: i64) -> anyhow::Result<bool> {
            self.deletes.push((tab, row_id));
            let before = self.products.len();
            self.products.retain(|row| row.id.get() != row_id);
            Ok(before != self.products.len())
        }
    }

    fn view_data_for_test() -> ViewData {
        ViewData::new(TableSettings::default())
    }

    fn internal_tx() -> mpsc::Sender<InternalEvent> {
        let (tx, _rx) = mpsc::channel();
        tx
    }

    fn press(
        state: &mut AppState,
        runtime: &mut TestRuntime,
        view_data: &mut ViewData,
        code: KeyCode,
    ) -> bool {
        let tx = internal_tx();
        handle_key_event(
            state,
            runtime,
            view_data,
            &tx,
            KeyEvent::new(code, KeyModifiers::NONE),
        )
    }

    fn type_text(
        state: &mut AppState,
        runtime: &mut TestRuntime,
        view_data: &mut ViewData,
        text: &str,
    ) {
        for ch in text.chars() {
            press(state, runtime, view_data, KeyCode::Char(ch));
        }
    }

    fn on_tab(tab: TabKind) -> AppState {
        AppState {
            active_tab: tab,
            ..AppState::default()
        }
    }

    #[test]
    fn refresh_loads_summary_and_active_tab() {
        let mut state = on_tab(TabKind::Products);
        let mut runtime = TestRuntime::warehouse();
        let mut view_data = view_data_for_test();

        refresh_view_data(&state, &mut runtime, &mut view_data).expect("refresh should work");
        assert_eq!(view_data.summary.total_products, 8);
        assert_eq!(
            view_data.snapshot.as_ref().map(TabSnapshot::row_count),
            Some(8)
        );

        state.active_tab = TabKind::Dashboard;
        refresh_view_data(&state, &mut runtime, &mut view_data).expect("refresh should work");
        assert!(view_data.snapshot.is_none());
        assert!(render_dashboard_text(&view_data.summary).contains("products: 8 (8 active)"));
    }

    #[test]
    fn typing_a_search_filters_rows_live() {
        let mut state = on_tab(TabKind::Products);
        let mut runtime = TestRuntime::warehouse();
        let mut view_data = view_data_for_test();
        refresh_view_data(&state, &mut runtime, &mut view_data).expect("refresh should work");

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('/'));
        assert_eq!(state.mode, AppMode::Search);
        type_text(&mut state, &mut runtime, &mut view_data, "Widget");

        let render = active_render(&view_data).expect("table render");
        assert_eq!(render.filtered_count, 2);
        assert_eq!(render.pagination().map(|page| page.total_pages), Some(1));
        assert_eq!(state.status_line.as_deref(), Some("search: Widget"));

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Enter);
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(view_data.table.filter.search, "Widget");

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('c'));
        let render = active_render(&view_data).expect("table render");
        assert_eq!(render.filtered_count, 8);
    }

    #[test]
    fn column_filter_targets_selected_column() {
        let mut state = on_tab(TabKind::Products);
        let mut runtime = TestRuntime::warehouse();
        let mut view_data = view_data_for_test();
        refresh_view_data(&state, &mut runtime, &mut view_data).expect("refresh should work");

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('l'));
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('f'));
        assert_eq!(state.mode, AppMode::Filter);
        assert_eq!(view_data.filter_key, Some("name"));
        type_text(&mut state, &mut runtime, &mut view_data, "bolt");
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Esc);

        let render = active_render(&view_data).expect("table render");
        assert_eq!(render.filtered_count, 1);
        assert_eq!(render.headers[1].title(), "Name ▼");
    }

    #[test]
    fn filter_refuses_non_filterable_column() {
        let mut state = on_tab(TabKind::Products);
        let mut runtime = TestRuntime::warehouse();
        let mut view_data = view_data_for_test();
        refresh_view_data(&state, &mut runtime, &mut view_data).expect("refresh should work");

        for _ in 0..4 {
            press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('l'));
        }
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('f'));
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(state.status_line.as_deref(), Some("Price is not filterable"));
    }

    #[test]
    fn sort_key_toggles_direction_on_selected_column() {
        let mut state = on_tab(TabKind::Products);
        let mut runtime = TestRuntime::warehouse();
        let mut view_data = view_data_for_test();
        refresh_view_data(&state, &mut runtime, &mut view_data).expect("refresh should work");

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('l'));
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('s'));
        let render = active_render(&view_data).expect("table render");
        assert_eq!(render.rows[0].cells[1], "Blue Widget");
        assert_eq!(render.headers[1].title(), "Name ↑");

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('s'));
        let render = active_render(&view_data).expect("table render");
        assert_eq!(render.rows[0].cells[1], "Washer");
        assert_eq!(state.status_line.as_deref(), Some("sort Name desc"));

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('S'));
        let render = active_render(&view_data).expect("table render");
        assert_eq!(render.rows[0].cells[1], "Blue Widget");
        assert_eq!(render.headers[1].title(), "Name");
    }

    #[test]
    fn page_keys_move_between_pages_and_cursor() {
        let mut state = on_tab(TabKind::Products);
        let mut runtime = TestRuntime::warehouse();
        let mut view_data = ViewData::new(TableSettings {
            page_size: 3,
            ..TableSettings::default()
        });
        refresh_view_data(&state, &mut runtime, &mut view_data).expect("refresh should work");

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('n'));
        assert_eq!(view_data.table.page.page, 2);
        assert_eq!(view_data.selected, 3);
        assert_eq!(state.status_line.as_deref(), Some("page 2/3"));

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('G'));
        let render = active_render(&view_data).expect("table render");
        assert_eq!(render.rows.len(), 2);
        assert_eq!(table_title(TabKind::Products, &render), " products 8 | page 3/3 ");

        for _ in 0..5 {
            press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('j'));
        }
        assert_eq!(view_data.selected, 7);
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('g'));
        assert_eq!(view_data.selected, 0);
    }

    #[test]
    fn large_tables_switch_to_windowed_rendering() {
        let mut state = on_tab(TabKind::Products);
        let mut runtime = TestRuntime {
            products: (1..=300)
                .map(|id| TestRuntime::sample_product(id, &format!("Item {id}")))
                .collect(),
            ..TestRuntime::default()
        };
        let mut view_data = ViewData::new(TableSettings {
            page_size: 10,
            smart: SmartTableConfig {
                virtualization_threshold: 100,
                window: WindowConfig {
                    row_height: 1,
                    overscan: 2,
                },
            },
        });
        view_data.viewport_rows = 10;
        refresh_view_data(&state, &mut runtime, &mut view_data).expect("refresh should work");

        let render = active_render(&view_data).expect("table render");
        assert_eq!(render.variant, TableVariant::Windowed);
        assert_eq!(render.rows.len(), 12);
        assert_eq!(visible_rows(&view_data, &render).len(), 10);

        for _ in 0..15 {
            press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('j'));
        }
        assert_eq!(view_data.selected, 15);
        assert_eq!(view_data.scroll_offset, 6);
        let render = active_render(&view_data).expect("table render");
        assert!(render.row_at(15).is_some());

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('G'));
        assert_eq!(view_data.selected, 299);
        assert_eq!(view_data.scroll_offset, 290);
        assert_eq!(state.status_line.as_deref(), Some("row 300/300"));
    }

    #[test]
    fn advance_runs_the_single_workflow_transition() {
        let mut state = on_tab(TabKind::Picking);
        let mut runtime = TestRuntime::warehouse();
        let mut view_data = view_data_for_test();
        refresh_view_data(&state, &mut runtime, &mut view_data).expect("refresh should work");

        let render = active_render(&view_data).expect("table render");
        assert_eq!(
            render.rows[0].actions[0].action,
            RowCommand::Advance { to: "picking" }
        );
        assert_eq!(render.rows[0].actions[0].label, "Start picking");
        assert_eq!(render.rows[1].actions.len(), 1);
        assert!(runtime.transitions.is_empty());

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('a'));
        assert_eq!(
            runtime.transitions,
            vec![(TabKind::Picking, 1, "picking".to_owned())]
        );
        let render = active_render(&view_data).expect("table render");
        assert_eq!(render.rows[0].actions[0].label, "Complete picking");

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('j'));
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('a'));
        assert_eq!(runtime.transitions.len(), 1);
        assert_eq!(
            state.status_line.as_deref(),
            Some("no workflow action for this row")
        );
    }

    #[test]
    fn failed_transition_is_reported_and_ui_keeps_running() {
        let mut state = on_tab(TabKind::Transfers);
        let mut runtime = TestRuntime {
            fail_transitions: true,
            ..TestRuntime::warehouse()
        };
        let mut view_data = view_data_for_test();
        refresh_view_data(&state, &mut runtime, &mut view_data).expect("refresh should work");

        let quit = press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('a'));
        assert!(!quit);
        assert_eq!(
            state.status_line.as_deref(),
            Some("Dispatch failed: store unavailable")
        );
    }

    #[test]
    fn failed_tab_load_clears_loading_and_stale_rows() {
        let mut state = on_tab(TabKind::Products);
        let mut runtime = TestRuntime::warehouse();
        let mut view_data = view_data_for_test();
        refresh_view_data(&state, &mut runtime, &mut view_data).expect("refresh should work");

        runtime.fail_loads = true;
        let quit = press(&mut state, &mut runtime, &mut view_data, KeyCode::Tab);
        assert!(!quit);
        assert_eq!(state.active_tab, TabKind::Categories);
        assert_eq!(
            state.status_line.as_deref(),
            Some("load failed: dataset unreadable")
        );
        assert!(!view_data.loading);
        assert!(view_data.snapshot.is_none());
        assert!(active_render(&view_data).is_none());

        runtime.fail_loads = false;
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('r'));
        let render = active_render(&view_data).expect("table render");
        assert_ne!(render.placeholder, Some(Placeholder::Loading));
        assert_eq!(state.status_line.as_deref(), Some("refreshed"));
    }

    #[test]
    fn failed_refresh_keeps_current_rows_without_loading() {
        let mut state = on_tab(TabKind::Products);
        let mut runtime = TestRuntime::warehouse();
        let mut view_data = view_data_for_test();
        refresh_view_data(&state, &mut runtime, &mut view_data).expect("refresh should work");

        runtime.fail_loads = true;
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('r'));
        assert_eq!(
            state.status_line.as_deref(),
            Some("refresh failed: dataset unreadable")
        );
        assert!(!view_data.loading);
        let render = active_render(&view_data).expect("table render");
        assert_eq!(render.placeholder, None);
        assert_eq!(render.rows.len(), 8);
    }

    #[test]
    fn delete_removes_selected_row() {
        let mut state = on_tab(TabKind::Products);
        let mut runtime = TestRuntime::warehouse();
        let mut view_data = view_data_for_test();
        refresh_view_data(&state, &mut runtime, &mut view_data).expect("refresh should work");

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('j'));
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('x'));
        assert_eq!(runtime.deletes, vec![(TabKind::Products, 2)]);
        assert_eq!(state.status_line.as_deref(), Some("deleted 2"));
        assert_eq!(
            view_data.snapshot.as_ref().map(TabSnapshot::row_count),
            Some(7)
        );
    }

    #[test]
    fn tab_switch_resets_table_state() {
        let mut state = on_tab(TabKind::Products);
        let mut runtime = TestRuntime::warehouse();
        let mut view_data = view_data_for_test();
        refresh_view_data(&state, &mut runtime, &mut view_data).expect("refresh should work");

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('/'));
        type_text(&mut state, &mut runtime, &mut view_data, "bolt");
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Enter);
        assert!(view_data.table.filter.is_active());

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Tab);
        assert_eq!(state.active_tab, TabKind::Categories);
        assert!(!view_data.table.filter.is_active());
    }

    #[test]
    fn search_is_unavailable_on_dashboard() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::warehouse();
        let mut view_data = view_data_for_test();
        refresh_view_data(&state, &mut runtime, &mut view_data).expect("refresh should work");

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('/'));
        assert_eq!(state.mode, AppMode::Nav);
        assert!(!press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('j')));
        assert!(press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('q')));
    }

    #[test]
    fn help_overlay_swallows_keys_until_closed() {
        let mut state = on_tab(TabKind::Products);
        let mut runtime = TestRuntime::warehouse();
        let mut view_data = view_data_for_test();
        refresh_view_data(&state, &mut runtime, &mut view_data).expect("refresh should work");

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('?'));
        assert!(state.help_visible);
        assert!(!press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('q')));
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Esc);
        assert!(!state.help_visible);
    }

    #[test]
    fn stale_status_clear_tokens_are_ignored() {
        let mut state = AppState::default();
        let mut view_data = view_data_for_test();
        let (tx, rx) = mpsc::channel();
        state.status_line = Some("saved".to_owned());
        view_data.status_token = 2;

        tx.send(InternalEvent::ClearStatus { token: 1 })
            .expect("send should work");
        process_internal_events(&mut state, &view_data, &rx);
        assert_eq!(state.status_line.as_deref(), Some("saved"));

        tx.send(InternalEvent::ClearStatus { token: 2 })
            .expect("send should work");
        process_internal_events(&mut state, &view_data, &rx);
        assert_eq!(state.status_line, None);
    }

    #[test]
    fn status_text_shows_mode_badge() {
        let mut state = AppState::default();
        assert!(status_text(&state).starts_with("NAV | "));
        state.mode = AppMode::Search;
        state.status_line = Some("search: bolt".to_owned());
        assert!(status_text(&state).starts_with("SEARCH | search: bolt | "));
    }
}
