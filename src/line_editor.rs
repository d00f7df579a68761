use core::str;
use crate::queue::Consumer;
use crate::vga_buffer::{CursorRegisters, Display, TextBuffer};

const BACKSPACE: u8 = 0x08;

/// Where the editor gets its characters from.
pub trait KeySource {
    /// Blocks until a character is available.
    fn next_key(&mut self) -> u8;
}

impl<'a, const N: usize> KeySource for Consumer<'a, N> {
    fn next_key(&mut self) -> u8 {
        self.dequeue_blocking()
    }
}

/// Assembles one line with echo. Holds at most `CAP - 1` characters, the
/// last slot being the terminator's.
pub struct LineEditor<const CAP: usize> {
    buf: [u8; CAP],
    len: usize,
}

impl<const CAP: usize> LineEditor<CAP> {
    pub const fn new() -> Self {
        LineEditor { buf: [0; CAP], len: 0 }
    }

    pub const fn max_length(&self) -> usize {
        CAP
    }

    pub fn read_line<K, B, C>(&mut self, keys: &mut K, display: &mut Display<B, C>) -> &str
    where
        K: KeySource,
        B: TextBuffer,
        C: CursorRegisters,
    {
        self.len = 0;
        loop {
            match keys.next_key() {
                b'\n' => {
                    display.newline();
                    break;
                }
                BACKSPACE => {
                    if self.len > 0 {
                        self.len -= 1;
                        display.backspace();
                    }
                }
                c @ b' '..=b'~' => {
                    if self.len + 1 < CAP {
                        self.buf[self.len] = c;
                        self.len += 1;
                        let (fg, bg) = display.current_colors();
                        display.put_char(c, fg, bg);
                    }
                    // full: silently dropped
                }
                other => log::trace!("ignoring key {:#04x}", other),
            }
        }
        // only printable ASCII is stored
        str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }
}

impl<const CAP: usize> Default for LineEditor<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{display, ScriptedKeys};
    use crate::vga_buffer::CursorPosition;

    #[test]
    fn returns_typed_line_and_echoes_it() {
        let mut screen = display();
        let mut keys = ScriptedKeys::new(b"echo hello\n");
        let mut editor = LineEditor::<256>::new();
        assert_eq!(editor.read_line(&mut keys, &mut screen), "echo hello");
        assert_eq!(screen.buffer().row_text(0), "echo hello");
        assert_eq!(screen.cursor(), CursorPosition::new(0, 1));
    }

    #[test]
    fn immediate_newline_gives_empty_line() {
        let mut screen = display();
        let mut keys = ScriptedKeys::new(b"\n");
        let mut editor = LineEditor::<256>::new();
        assert_eq!(editor.read_line(&mut keys, &mut screen), "");
    }

    #[test]
    fn backspace_on_empty_line_is_noop() {
        let mut screen = display();
        screen.move_cursor(8, 3).unwrap();
        let mut keys = ScriptedKeys::new(b"\x08\x08ok\n");
        let mut editor = LineEditor::<256>::new();
        assert_eq!(editor.read_line(&mut keys, &mut screen), "ok");
        assert_eq!(screen.buffer().row_text(3), "        ok");
    }

    #[test]
    fn backspace_removes_last_character_and_erases_cell() {
        let mut screen = display();
        let mut keys = ScriptedKeys::new(b"helpx\x08\n");
        let mut editor = LineEditor::<256>::new();
        assert_eq!(editor.read_line(&mut keys, &mut screen), "help");
        assert_eq!(screen.read_cell(4, 0).unwrap().ascii_character, b' ');
        assert_eq!(screen.buffer().row_text(0), "help");
    }

    #[test]
    fn full_buffer_discards_extra_characters() {
        let mut screen = display();
        let mut keys = ScriptedKeys::new(b"abcdefgh\n");
        let mut editor = LineEditor::<5>::new();
        let max_length = editor.max_length();
        let line = editor.read_line(&mut keys, &mut screen);
        assert_eq!(line, "abcd");
        assert!(line.len() < max_length);
        assert_eq!(screen.buffer().row_text(0), "abcd");
    }

    #[test]
    fn editor_is_reusable_across_lines() {
        let mut screen = display();
        let mut keys = ScriptedKeys::new(b"first\nsecond\n");
        let mut editor = LineEditor::<256>::new();
        assert_eq!(editor.read_line(&mut keys, &mut screen), "first");
        assert_eq!(editor.read_line(&mut keys, &mut screen), "second");
    }

    #[test]
    fn non_printable_bytes_are_neither_stored_nor_echoed() {
        let mut screen = display();
        let mut keys = ScriptedKeys::new(b"ab\xffc\x01\x7f\n");
        let mut editor = LineEditor::<256>::new();
        assert_eq!(editor.read_line(&mut keys, &mut screen), "abc");
        assert_eq!(screen.buffer().row_text(0), "abc");
        assert_eq!(screen.cursor(), CursorPosition::new(0, 1));
    }
}
