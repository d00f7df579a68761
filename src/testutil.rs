//! In-memory stand-ins for the display hardware and the key queue.

use std::collections::VecDeque;
use std::string::String;
use std::vec::Vec;

use crate::constants::vga::{BUFFER_HEIGHT, BUFFER_WIDTH};
use crate::line_editor::KeySource;
use crate::vga_buffer::{Color, CursorRegisters, Display, ScreenChar, TextBuffer};

pub struct MemoryBuffer {
    cells: [[ScreenChar; BUFFER_WIDTH]; BUFFER_HEIGHT],
}

impl Default for MemoryBuffer {
    fn default() -> Self {
        MemoryBuffer {
            cells: [[ScreenChar::new(0, Color::Black, Color::Black); BUFFER_WIDTH]; BUFFER_HEIGHT],
        }
    }
}

impl MemoryBuffer {
    /// Row contents with trailing blanks removed.
    pub fn row_text(&self, row: usize) -> String {
        let text: String = self.cells[row]
            .iter()
            .map(|cell| match cell.ascii_character {
                0 => ' ',
                c => c as char,
            })
            .collect();
        text.trim_end().into()
    }

    /// Non-empty rows, top to bottom.
    pub fn lines(&self) -> Vec<String> {
        (0..BUFFER_HEIGHT)
            .map(|row| self.row_text(row))
            .filter(|line| !line.is_empty())
            .collect()
    }
}

impl TextBuffer for MemoryBuffer {
    fn write(&mut self, row: usize, col: usize, cell: ScreenChar) {
        self.cells[row][col] = cell;
    }

    fn read(&self, row: usize, col: usize) -> ScreenChar {
        self.cells[row][col]
    }
}

#[derive(Default)]
pub struct RecordingCursor {
    pub offsets: Vec<u16>,
}

impl RecordingCursor {
    pub fn last(&self) -> Option<u16> {
        self.offsets.last().copied()
    }
}

impl CursorRegisters for RecordingCursor {
    fn set_offset(&mut self, offset: u16) {
        self.offsets.push(offset);
    }
}

pub struct ScriptedKeys {
    keys: VecDeque<u8>,
}

impl ScriptedKeys {
    pub fn new(keys: &[u8]) -> Self {
        ScriptedKeys {
            keys: keys.iter().copied().collect(),
        }
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self) -> u8 {
        self.keys.pop_front().expect("script ran out of keys")
    }
}

pub type TestDisplay = Display<MemoryBuffer, RecordingCursor>;

pub fn display() -> TestDisplay {
    Display::new(MemoryBuffer::default(), RecordingCursor::default())
}
