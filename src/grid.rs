//! Static description of the control surface hardware
//!
//! The grid is built once from configuration and shared by every mode and
//! view of a device. It lists the physical buttons (five rows of eight, the
//! row-select strip and the P1 rocker), the knobs and the display cells.

use crate::config::GridConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of buttons in each of the five button rows
pub const ROW_BUTTONS: usize = 8;

/// Number of row-select buttons (numbered 1-7)
pub const ROW_SELECT_BUTTONS: u8 = 7;

/// Button press edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonEvent {
    Down,
    Up,
}

impl ButtonEvent {
    pub fn is_down(self) -> bool {
        self == ButtonEvent::Down
    }
}

/// One of the five physical button rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ButtonRow {
    Row1,
    Row2,
    Row3,
    Row4,
    Row5,
}

impl ButtonRow {
    pub const ALL: [ButtonRow; 5] = [
        ButtonRow::Row1,
        ButtonRow::Row2,
        ButtonRow::Row3,
        ButtonRow::Row4,
        ButtonRow::Row5,
    ];

    /// 1-based row number as printed on the hardware
    pub fn number(self) -> u8 {
        match self {
            ButtonRow::Row1 => 1,
            ButtonRow::Row2 => 2,
            ButtonRow::Row3 => 3,
            ButtonRow::Row4 => 4,
            ButtonRow::Row5 => 5,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.get((number as usize).checked_sub(1)?).copied()
    }
}

/// Identity of a physical button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonId {
    /// Button `index` (0-7) of a button row
    Row { row: ButtonRow, index: u8 },
    /// Row-select button (1-7)
    RowSelect(u8),
    P1Up,
    P1Down,
}

impl ButtonId {
    pub fn row(row: ButtonRow, index: usize) -> Self {
        ButtonId::Row {
            row,
            index: index as u8,
        }
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonId::Row { row, index } => write!(f, "row{}_{}", row.number(), index + 1),
            ButtonId::RowSelect(n) => write!(f, "select{}", n),
            ButtonId::P1Up => write!(f, "p1_up"),
            ButtonId::P1Down => write!(f, "p1_down"),
        }
    }
}

/// Error returned when a button name cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown button '{0}' (expected rowN_M, selectN, p1_up or p1_down)")]
pub struct UnknownButton(pub String);

impl FromStr for ButtonId {
    type Err = UnknownButton;

    /// Parses the names produced by `Display` (`row2_5`, `select3`, `p1_up`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let unknown = || UnknownButton(s.to_string());

        match name.as_str() {
            "p1_up" => return Ok(ButtonId::P1Up),
            "p1_down" => return Ok(ButtonId::P1Down),
            _ => {}
        }

        if let Some(n) = name.strip_prefix("select") {
            let n: u8 = n.parse().map_err(|_| unknown())?;
            if (1..=ROW_SELECT_BUTTONS).contains(&n) {
                return Ok(ButtonId::RowSelect(n));
            }
            return Err(unknown());
        }

        let rest = name.strip_prefix("row").ok_or_else(unknown)?;
        let (row, column) = rest.split_once('_').ok_or_else(unknown)?;
        let row = row
            .parse::<u8>()
            .ok()
            .and_then(ButtonRow::from_number)
            .ok_or_else(unknown)?;
        let column: usize = column.parse().map_err(|_| unknown())?;
        if !(1..=ROW_BUTTONS).contains(&column) {
            return Err(unknown());
        }
        Ok(ButtonId::row(row, column - 1))
    }
}

/// Physical button position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonSlot {
    pub id: ButtonId,
    pub row: u8,
    pub column: u8,
}

/// Physical knob position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnobSlot {
    pub id: u8,
    pub index: usize,
}

/// One text cell of the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayCell {
    pub row: usize,
    pub column: usize,
    /// Maximum number of characters shown in the cell
    pub capacity: usize,
}

/// Immutable hardware layout shared by all modes and views of one device
#[derive(Debug, Clone)]
pub struct ControlGrid {
    buttons: Vec<ButtonSlot>,
    knobs: Vec<KnobSlot>,
    cells: Vec<DisplayCell>,
    display_rows: usize,
    display_columns: usize,
    touch_sensitive: bool,
}

impl ControlGrid {
    /// Build the grid described by the configuration
    pub fn new(config: &GridConfig) -> Self {
        let mut buttons = Vec::with_capacity(ButtonRow::ALL.len() * ROW_BUTTONS + 9);
        for row in ButtonRow::ALL {
            for index in 0..ROW_BUTTONS {
                buttons.push(ButtonSlot {
                    id: ButtonId::row(row, index),
                    row: row.number() - 1,
                    column: index as u8,
                });
            }
        }
        for n in 1..=ROW_SELECT_BUTTONS {
            buttons.push(ButtonSlot {
                id: ButtonId::RowSelect(n),
                row: 5,
                column: n - 1,
            });
        }
        buttons.push(ButtonSlot {
            id: ButtonId::P1Up,
            row: 6,
            column: 0,
        });
        buttons.push(ButtonSlot {
            id: ButtonId::P1Down,
            row: 6,
            column: 1,
        });

        let knobs = (0..config.knobs)
            .map(|index| KnobSlot {
                id: (index + 1) as u8,
                index,
            })
            .collect();

        let cells = (0..config.display_rows)
            .flat_map(|row| {
                (0..config.display_columns).map(move |column| DisplayCell {
                    row,
                    column,
                    capacity: config.cell_width,
                })
            })
            .collect();

        Self {
            buttons,
            knobs,
            cells,
            display_rows: config.display_rows,
            display_columns: config.display_columns,
            touch_sensitive: config.touch_sensitive,
        }
    }

    pub fn buttons(&self) -> &[ButtonSlot] {
        &self.buttons
    }

    pub fn knobs(&self) -> &[KnobSlot] {
        &self.knobs
    }

    pub fn cells(&self) -> &[DisplayCell] {
        &self.cells
    }

    /// Number of physical knobs
    pub fn knob_count(&self) -> usize {
        self.knobs.len()
    }

    pub fn display_rows(&self) -> usize {
        self.display_rows
    }

    pub fn display_columns(&self) -> usize {
        self.display_columns
    }

    /// Whether the knobs report touch events (turns are gated on touch)
    pub fn is_touch_sensitive(&self) -> bool {
        self.touch_sensitive
    }

    pub fn contains(&self, id: ButtonId) -> bool {
        self.buttons.iter().any(|slot| slot.id == id)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&DisplayCell> {
        if row >= self.display_rows || column >= self.display_columns {
            return None;
        }
        self.cells.get(row * self.display_columns + column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_layout() {
        let grid = ControlGrid::new(&GridConfig::default());

        // 5 rows x 8 + 7 row-select + P1 up/down
        assert_eq!(grid.buttons().len(), 49);
        assert_eq!(grid.knob_count(), 8);
        assert_eq!(grid.cells().len(), 16);
        assert!(grid.contains(ButtonId::RowSelect(7)));
        assert!(!grid.contains(ButtonId::RowSelect(8)));

        let cell = grid.cell(1, 7).unwrap();
        assert_eq!((cell.row, cell.column), (1, 7));
        assert!(grid.cell(2, 0).is_none());
    }

    #[test]
    fn test_button_names() {
        let id: ButtonId = "row2_5".parse().unwrap();
        assert_eq!(id, ButtonId::row(ButtonRow::Row2, 4));
        assert_eq!(id.to_string(), "row2_5");

        assert_eq!("SELECT3".parse::<ButtonId>().unwrap(), ButtonId::RowSelect(3));
        assert_eq!("p1_down".parse::<ButtonId>().unwrap(), ButtonId::P1Down);

        assert!("row6_1".parse::<ButtonId>().is_err());
        assert!("row1_9".parse::<ButtonId>().is_err());
        assert!("select0".parse::<ButtonId>().is_err());
        assert!("fader".parse::<ButtonId>().is_err());
    }
}
