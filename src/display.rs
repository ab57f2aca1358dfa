//! Text display contract and an in-memory cell buffer
//!
//! Modes write cells with `set_cell` and finish each refresh with a single
//! `all_done`, which is the only point where the frame becomes visible.

use crate::grid::ControlGrid;
use tracing::{info, trace};

/// Display driver used by modes and views
pub trait TextDisplay: Send {
    /// Write text into a cell; out-of-range cells are ignored
    fn set_cell(&mut self, row: usize, column: usize, text: &str);

    /// Flush the cells written since the previous flush
    fn all_done(&mut self);

    /// Show a transient user-facing message
    fn notify(&mut self, message: &str);
}

/// Display buffer for a grid
///
/// Writes go to a pending frame; `all_done` publishes it. Text is truncated
/// to the cell capacity.
#[derive(Debug, Clone)]
pub struct CellBuffer {
    rows: usize,
    columns: usize,
    capacity: usize,
    pending: Vec<String>,
    visible: Vec<String>,
    flush_count: u64,
    notifications: Vec<String>,
}

impl CellBuffer {
    pub fn new(grid: &ControlGrid) -> Self {
        let rows = grid.display_rows();
        let columns = grid.display_columns();
        let capacity = grid.cell(0, 0).map(|c| c.capacity).unwrap_or(0);
        Self {
            rows,
            columns,
            capacity,
            pending: vec![String::new(); rows * columns],
            visible: vec![String::new(); rows * columns],
            flush_count: 0,
            notifications: Vec::new(),
        }
    }

    /// Visible text of a cell
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.visible.get(row * self.columns + column).map(String::as_str)
    }

    /// Visible row as fixed-width cells separated by `|`
    pub fn row_text(&self, row: usize) -> String {
        (0..self.columns)
            .map(|column| {
                format!(
                    "{:<width$}",
                    self.cell(row, column).unwrap_or(""),
                    width = self.capacity
                )
            })
            .collect::<Vec<_>>()
            .join("|")
    }

    /// All visible rows
    pub fn lines(&self) -> Vec<String> {
        (0..self.rows).map(|row| self.row_text(row)).collect()
    }

    /// Number of `all_done` flushes so far
    pub fn flush_count(&self) -> u64 {
        self.flush_count
    }

    /// Take notifications shown since the last call
    pub fn take_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notifications)
    }
}

impl TextDisplay for CellBuffer {
    fn set_cell(&mut self, row: usize, column: usize, text: &str) {
        if row >= self.rows || column >= self.columns {
            trace!("Cell ({}, {}) outside display, ignored", row, column);
            return;
        }
        let truncated: String = text.chars().take(self.capacity).collect();
        self.pending[row * self.columns + column] = truncated;
    }

    fn all_done(&mut self) {
        self.visible.clone_from(&self.pending);
        self.flush_count += 1;
    }

    fn notify(&mut self, message: &str) {
        info!("📟 {}", message);
        self.notifications.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;

    fn make_buffer() -> CellBuffer {
        CellBuffer::new(&ControlGrid::new(&GridConfig {
            cell_width: 4,
            ..GridConfig::default()
        }))
    }

    #[test]
    fn test_cells_visible_only_after_flush() {
        let mut display = make_buffer();

        display.set_cell(0, 1, "Bass");
        assert_eq!(display.cell(0, 1), Some(""));

        display.all_done();
        assert_eq!(display.cell(0, 1), Some("Bass"));
        assert_eq!(display.flush_count(), 1);
    }

    #[test]
    fn test_truncates_and_ignores_out_of_range() {
        let mut display = make_buffer();

        display.set_cell(1, 0, "Drums");
        display.set_cell(2, 0, "nope");
        display.set_cell(0, 8, "nope");
        display.all_done();

        assert_eq!(display.cell(1, 0), Some("Drum"));
        assert_eq!(display.cell(2, 0), None);
        assert!(display.row_text(1).starts_with("Drum|    |"));
    }

    #[test]
    fn test_notifications_are_drained() {
        let mut display = make_buffer();

        display.notify("hello");
        assert_eq!(display.take_notifications(), vec!["hello".to_string()]);
        assert!(display.take_notifications().is_empty());
    }
}
