// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Row windowing for large tables. Only rows that intersect the viewport,
//! plus an over-render margin on each side, are materialized.

pub const DEFAULT_ROW_HEIGHT: u64 = 48;
pub const DEFAULT_OVERSCAN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    pub row_height: u64,
    pub overscan: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            overscan: DEFAULT_OVERSCAN,
        }
    }
}

impl WindowConfig {
    fn row_height(&self) -> u64 {
        self.row_height.max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub scroll_offset: u64,
    pub height: u64,
}

/// Half-open range of view positions to materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRange {
    pub start: usize,
    pub end: usize,
    pub total_height: u64,
}

impl WindowRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

pub fn total_height(row_count: usize, config: WindowConfig) -> u64 {
    (row_count as u64).saturating_mul(config.row_height())
}

pub fn row_offset(position: usize, config: WindowConfig) -> u64 {
    (position as u64).saturating_mul(config.row_height())
}

pub fn visible_range(row_count: usize, viewport: Viewport, config: WindowConfig) -> WindowRange {
    let total_height = total_height(row_count, config);
    if row_count == 0 {
        return WindowRange {
            start: 0,
            end: 0,
            total_height,
        };
    }

    let row_height = config.row_height();
    let offset = clamp_scroll(viewport.scroll_offset, row_count, viewport.height, config);
    let first = (offset / row_height) as usize;
    let last = offset
        .saturating_add(viewport.height)
        .div_ceil(row_height)
        .min(row_count as u64) as usize;

    let start = first.saturating_sub(config.overscan).min(row_count);
    let end = last.saturating_add(config.overscan).min(row_count).max(start);
    WindowRange {
        start,
        end,
        total_height,
    }
}

/// Largest useful scroll offset keeps the last row at the viewport bottom.
pub fn clamp_scroll(offset: u64, row_count: usize, height: u64, config: WindowConfig) -> u64 {
    offset.min(total_height(row_count, config).saturating_sub(height))
}

/// Minimal scroll change that brings `position` fully into view.
pub fn scroll_to_row(offset: u64, position: usize, height: u64, config: WindowConfig) -> u64 {
    let top = row_offset(position, config);
    let bottom = top.saturating_add(config.row_height());
    if top < offset {
        top
    } else if bottom > offset.saturating_add(height) {
        bottom.saturating_sub(height)
    } else {
        offset
    }
}
