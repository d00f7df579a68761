//! Kernel state for the foreground: the display, the consumer end of the key
//! queue, and the line being edited. Built once at boot and driven forever.

use crate::constants::terminal::{BANNER, HINT, MAX_COMMAND_LENGTH, PROMPT};
use crate::line_editor::{KeySource, LineEditor};
use crate::shell;
use crate::vga_buffer::{Color, CursorRegisters, Display, TextBuffer};

pub struct Terminal<K: KeySource, B: TextBuffer, C: CursorRegisters> {
    display: Display<B, C>,
    keys: K,
    editor: LineEditor<MAX_COMMAND_LENGTH>,
}

impl<K: KeySource, B: TextBuffer, C: CursorRegisters> Terminal<K, B, C> {
    pub fn new(display: Display<B, C>, keys: K) -> Self {
        Terminal {
            display,
            keys,
            editor: LineEditor::new(),
        }
    }

    pub fn display(&self) -> &Display<B, C> {
        &self.display
    }

    pub fn init(&mut self) {
        self.display.clear(Color::LightGray, Color::Black);
        self.display.set_color(Color::LightCyan, Color::Black);
        self.display.print(BANNER, Color::LightCyan, Color::Black);
        self.display.print(HINT, Color::LightGray, Color::Black);
    }

    fn prompt(&mut self) {
        self.display.set_color(Color::LightGreen, Color::Black);
        self.display.print(PROMPT, Color::LightGreen, Color::Black);
        self.display.set_color(Color::LightGray, Color::Black);
    }

    /// Prompt, read one line (blocking), dispatch it.
    pub fn step(&mut self) {
        self.prompt();
        let line = self.editor.read_line(&mut self.keys, &mut self.display);
        shell::execute(line, &mut self.display);
    }

    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }
}
