//! VGA text mode display driver.
//!
//! [`Display`] is the only writer of the character grid. It owns the logical
//! cursor, the current colour, and the hardware cursor registers, and keeps
//! the latter in step with the former after every cursor-affecting call.

use core::fmt;
use volatile::Volatile;
use x86_64::instructions::port::Port;
use crate::constants::vga::{
    BUFFER_ADDR, BUFFER_HEIGHT, BUFFER_WIDTH, COMMAND_PORT, CURSOR_LOCATION_HIGH,
    CURSOR_LOCATION_LOW, DATA_PORT,
};
use crate::error::KernelError;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    Pink = 13,
    Yellow = 14,
    White = 15,
}

impl Color {
    pub fn from_nibble(value: u8) -> Color {
        match value & 0x0f {
            0 => Color::Black,
            1 => Color::Blue,
            2 => Color::Green,
            3 => Color::Cyan,
            4 => Color::Red,
            5 => Color::Magenta,
            6 => Color::Brown,
            7 => Color::LightGray,
            8 => Color::DarkGray,
            9 => Color::LightBlue,
            10 => Color::LightGreen,
            11 => Color::LightCyan,
            12 => Color::LightRed,
            13 => Color::Pink,
            14 => Color::Yellow,
            _ => Color::White,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ColorCode(u8);

impl ColorCode {
    pub const fn new(foreground: Color, background: Color) -> ColorCode {
        ColorCode((background as u8) << 4 | (foreground as u8))
    }

    pub const fn foreground(self) -> u8 {
        self.0 & 0x0f
    }

    pub const fn background(self) -> u8 {
        self.0 >> 4
    }
}

/// One grid cell as the hardware stores it: character byte, then attribute byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct ScreenChar {
    pub ascii_character: u8,
    pub color_code: ColorCode,
}

impl ScreenChar {
    pub const fn new(ascii_character: u8, foreground: Color, background: Color) -> ScreenChar {
        ScreenChar {
            ascii_character,
            color_code: ColorCode::new(foreground, background),
        }
    }

    const fn blank(color_code: ColorCode) -> ScreenChar {
        ScreenChar {
            ascii_character: b' ',
            color_code,
        }
    }

    /// Packed 16-bit cell: `bg << 12 | fg << 8 | char`.
    pub const fn to_cell(self) -> u16 {
        ((self.color_code.0 as u16) << 8) | self.ascii_character as u16
    }
}

/// Cell storage behind the display. Indices are always in range when called
/// from [`Display`].
pub trait TextBuffer {
    fn write(&mut self, row: usize, col: usize, cell: ScreenChar);
    fn read(&self, row: usize, col: usize) -> ScreenChar;
}

/// The index/data register pair that positions the blinking cursor.
pub trait CursorRegisters {
    fn set_offset(&mut self, offset: u16);
}

#[repr(transparent)]
struct Buffer {
    chars: [[Volatile<ScreenChar>; BUFFER_WIDTH]; BUFFER_HEIGHT],
}

/// Memory-mapped grid at 0xb8000.
pub struct VgaBuffer {
    buffer: &'static mut Buffer,
}

impl VgaBuffer {
    /// # Safety
    ///
    /// The text buffer must be identity mapped and no other `VgaBuffer` may be
    /// alive, except in the panic path where the previous owner never resumes.
    pub unsafe fn new() -> Self {
        VgaBuffer {
            buffer: &mut *(BUFFER_ADDR as *mut Buffer),
        }
    }
}

impl TextBuffer for VgaBuffer {
    fn write(&mut self, row: usize, col: usize, cell: ScreenChar) {
        self.buffer.chars[row][col].write(cell);
    }

    fn read(&self, row: usize, col: usize) -> ScreenChar {
        self.buffer.chars[row][col].read()
    }
}

/// Register writes that move the hardware cursor to `offset`, low byte first.
pub fn cursor_register_writes(offset: u16) -> [(u8, u8); 2] {
    [
        (CURSOR_LOCATION_LOW, (offset & 0xff) as u8),
        (CURSOR_LOCATION_HIGH, (offset >> 8) as u8),
    ]
}

pub struct VgaCursor {
    command: Port<u8>,
    data: Port<u8>,
}

impl VgaCursor {
    pub const fn new() -> Self {
        VgaCursor {
            command: Port::new(COMMAND_PORT),
            data: Port::new(DATA_PORT),
        }
    }
}

impl Default for VgaCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorRegisters for VgaCursor {
    fn set_offset(&mut self, offset: u16) {
        for (register, value) in cursor_register_writes(offset) {
            unsafe {
                self.command.write(register);
                self.data.write(value);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorPosition {
    pub column: usize,
    pub row: usize,
}

impl CursorPosition {
    pub const fn new(column: usize, row: usize) -> Self {
        CursorPosition { column, row }
    }

    pub const fn offset(self) -> u16 {
        (self.row * BUFFER_WIDTH + self.column) as u16
    }
}

pub struct Display<B: TextBuffer, C: CursorRegisters> {
    buffer: B,
    registers: C,
    cursor: CursorPosition,
    color_code: ColorCode,
}

impl<B: TextBuffer, C: CursorRegisters> Display<B, C> {
    pub fn new(buffer: B, registers: C) -> Self {
        let mut display = Display {
            buffer,
            registers,
            cursor: CursorPosition::default(),
            color_code: ColorCode::new(Color::LightGray, Color::Black),
        };
        display.sync_cursor();
        display
    }

    pub fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    pub fn color(&self) -> ColorCode {
        self.color_code
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn registers(&self) -> &C {
        &self.registers
    }

    pub fn set_color(&mut self, foreground: Color, background: Color) {
        self.color_code = ColorCode::new(foreground, background);
    }

    pub fn write_cell(
        &mut self,
        column: usize,
        row: usize,
        character: u8,
        foreground: Color,
        background: Color,
    ) -> Result<(), KernelError> {
        check_bounds(column, row)?;
        self.buffer.write(row, column, ScreenChar::new(character, foreground, background));
        Ok(())
    }

    pub fn read_cell(&self, column: usize, row: usize) -> Result<ScreenChar, KernelError> {
        check_bounds(column, row)?;
        Ok(self.buffer.read(row, column))
    }

    /// Writes at the cursor and advances it. `\n` only moves the cursor.
    pub fn put_char(&mut self, character: u8, foreground: Color, background: Color) {
        if character == b'\n' {
            self.advance_row();
        } else {
            let CursorPosition { column, row } = self.cursor;
            self.buffer.write(row, column, ScreenChar::new(character, foreground, background));
            if column + 1 >= BUFFER_WIDTH {
                self.advance_row();
            } else {
                self.cursor.column += 1;
            }
        }
        self.sync_cursor();
    }

    /// Non-printable bytes show up as a block placeholder.
    pub fn print(&mut self, s: &str, foreground: Color, background: Color) {
        for byte in s.bytes() {
            match byte {
                0x20..=0x7e | b'\n' => self.put_char(byte, foreground, background),
                b'\r' => {}
                _ => self.put_char(0xfe, foreground, background),
            }
        }
    }

    pub fn newline(&mut self) {
        self.advance_row();
        self.sync_cursor();
    }

    pub fn backspace(&mut self) {
        let CursorPosition { column, row } = self.cursor;
        if column > 0 {
            self.cursor.column -= 1;
        } else if row > 0 {
            self.cursor = CursorPosition::new(BUFFER_WIDTH - 1, row - 1);
        } else {
            return;
        }
        let CursorPosition { column, row } = self.cursor;
        self.buffer.write(row, column, ScreenChar::blank(self.color_code));
        self.sync_cursor();
    }

    pub fn move_cursor(&mut self, column: usize, row: usize) -> Result<(), KernelError> {
        check_bounds(column, row)?;
        self.cursor = CursorPosition::new(column, row);
        self.sync_cursor();
        Ok(())
    }

    pub fn clear(&mut self, foreground: Color, background: Color) {
        let blank = ScreenChar::blank(ColorCode::new(foreground, background));
        for row in 0..BUFFER_HEIGHT {
            for col in 0..BUFFER_WIDTH {
                self.buffer.write(row, col, blank);
            }
        }
        self.cursor = CursorPosition::default();
        self.sync_cursor();
    }

    // no scroll: the last row absorbs further output
    fn advance_row(&mut self) {
        self.cursor.column = 0;
        if self.cursor.row + 1 < BUFFER_HEIGHT {
            self.cursor.row += 1;
        }
    }

    fn sync_cursor(&mut self) {
        self.registers.set_offset(self.cursor.offset());
    }

    pub fn current_colors(&self) -> (Color, Color) {
        (
            Color::from_nibble(self.color_code.foreground()),
            Color::from_nibble(self.color_code.background()),
        )
    }
}

fn check_bounds(column: usize, row: usize) -> Result<(), KernelError> {
    if column < BUFFER_WIDTH && row < BUFFER_HEIGHT {
        Ok(())
    } else {
        Err(KernelError::CellOutOfBounds { column, row })
    }
}

impl<B: TextBuffer, C: CursorRegisters> fmt::Write for Display<B, C> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let (fg, bg) = self.current_colors();
        self.print(s, fg, bg);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{display, MemoryBuffer, RecordingCursor};
    use core::fmt::Write;

    #[test]
    fn cell_encoding_packs_colors_above_character() {
        let cell = ScreenChar::new(b'A', Color::LightGreen, Color::Blue);
        assert_eq!(cell.to_cell(), 0x1a41);
    }

    #[test]
    fn cursor_writes_low_then_high_byte() {
        let offset = CursorPosition::new(79, 24).offset();
        assert_eq!(offset, 1999);
        assert_eq!(cursor_register_writes(offset), [(0x0f, 0xcf), (0x0e, 0x07)]);
    }

    #[test]
    fn write_cell_rejects_out_of_bounds() {
        let mut screen = display();
        assert!(screen.write_cell(79, 24, b'x', Color::White, Color::Black).is_ok());
        assert_eq!(
            screen.write_cell(80, 0, b'x', Color::White, Color::Black),
            Err(KernelError::CellOutOfBounds { column: 80, row: 0 })
        );
        assert!(screen.write_cell(0, 25, b'x', Color::White, Color::Black).is_err());
    }

    #[test]
    fn put_char_advances_and_syncs_hardware_cursor() {
        let mut screen = display();
        screen.put_char(b'h', Color::LightGray, Color::Black);
        screen.put_char(b'i', Color::LightGray, Color::Black);
        assert_eq!(screen.cursor(), CursorPosition::new(2, 0));
        assert_eq!(screen.registers().last(), Some(2));
        assert_eq!(screen.buffer().row_text(0), "hi");
    }

    #[test]
    fn newline_moves_without_writing() {
        let mut screen = display();
        screen.put_char(b'a', Color::LightGray, Color::Black);
        screen.put_char(b'\n', Color::LightGray, Color::Black);
        assert_eq!(screen.cursor(), CursorPosition::new(0, 1));
        assert_eq!(screen.buffer().row_text(1), "");
        assert_eq!(screen.registers().last(), Some(80));
    }

    #[test]
    fn writing_past_last_column_wraps() {
        let mut screen = display();
        screen.move_cursor(79, 3).unwrap();
        screen.put_char(b'z', Color::LightGray, Color::Black);
        assert_eq!(screen.cursor(), CursorPosition::new(0, 4));
        assert_eq!(screen.read_cell(79, 3).unwrap().ascii_character, b'z');
    }

    #[test]
    fn bottom_row_is_clamped() {
        let mut screen = display();
        screen.move_cursor(79, 24).unwrap();
        screen.put_char(b'z', Color::LightGray, Color::Black);
        assert_eq!(screen.cursor(), CursorPosition::new(0, 24));
        screen.newline();
        assert_eq!(screen.cursor(), CursorPosition::new(0, 24));
    }

    #[test]
    fn backspace_at_row_start_goes_to_previous_row_end() {
        let mut screen = display();
        screen.write_cell(79, 4, b'q', Color::White, Color::Black).unwrap();
        screen.move_cursor(0, 5).unwrap();
        screen.backspace();
        assert_eq!(screen.cursor(), CursorPosition::new(79, 4));
        let cell = screen.read_cell(79, 4).unwrap();
        assert_eq!(cell.ascii_character, b' ');
        assert_eq!(cell.color_code, screen.color());
        assert_eq!(screen.registers().last(), Some(4 * 80 + 79));
    }

    #[test]
    fn backspace_at_origin_is_noop() {
        let mut screen = display();
        let writes = screen.registers().offsets.len();
        screen.backspace();
        assert_eq!(screen.cursor(), CursorPosition::new(0, 0));
        assert_eq!(screen.registers().offsets.len(), writes);
    }

    #[test]
    fn move_cursor_rejects_invalid_position() {
        let mut screen = display();
        assert!(screen.move_cursor(80, 0).is_err());
        assert_eq!(screen.cursor(), CursorPosition::new(0, 0));
        screen.move_cursor(10, 2).unwrap();
        assert_eq!(screen.registers().last(), Some(170));
    }

    #[test]
    fn clear_fills_with_colored_blanks_and_homes_cursor() {
        let mut screen = Display::new(MemoryBuffer::default(), RecordingCursor::default());
        screen.print("junk", Color::White, Color::Black);
        screen.move_cursor(40, 12).unwrap();
        screen.clear(Color::Yellow, Color::Blue);
        assert_eq!(screen.cursor(), CursorPosition::new(0, 0));
        assert_eq!(screen.registers().last(), Some(0));
        let expected = ScreenChar::new(b' ', Color::Yellow, Color::Blue);
        assert_eq!(screen.read_cell(0, 0).unwrap(), expected);
        assert_eq!(screen.read_cell(79, 24).unwrap(), expected);
    }

    #[test]
    fn formatted_output_uses_current_color() {
        let mut screen = display();
        screen.set_color(Color::LightGreen, Color::Black);
        write!(screen, "{} {:#x}", -42, 255).unwrap();
        assert_eq!(screen.buffer().row_text(0), "-42 0xff");
        assert_eq!(
            screen.read_cell(0, 0).unwrap().color_code,
            ColorCode::new(Color::LightGreen, Color::Black)
        );
    }

    #[test]
    fn print_replaces_unprintable_bytes() {
        let mut screen = display();
        screen.print("a\u{1}b", Color::White, Color::Black);
        assert_eq!(screen.read_cell(1, 0).unwrap().ascii_character, 0xfe);
    }
}
