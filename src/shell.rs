use core::fmt::Write;
use crate::constants::terminal::{MAX_ARGS_LENGTH, MAX_COMMAND_LENGTH};
use crate::vga_buffer::{Color, CursorRegisters, Display, TextBuffer};

/// A completed line split at the first space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInvocation<'a> {
    pub name: &'a str,
    pub args: &'a str,
}

impl<'a> CommandInvocation<'a> {
    /// Spaces before the name and between name and arguments are dropped;
    /// the argument text is otherwise kept verbatim.
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim_start_matches(' ');
        let (name, rest) = match line.find(' ') {
            Some(i) => line.split_at(i),
            None => (line, ""),
        };
        CommandInvocation {
            name: truncate(name, MAX_COMMAND_LENGTH - 1),
            args: truncate(rest.trim_start_matches(' '), MAX_ARGS_LENGTH - 1),
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Echo,
    Clear,
    Help,
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Builtin(Builtin),
    Unknown(&'a str),
}

/// Command registry entry
struct CommandEntry {
    name: &'static str,
    usage: &'static str,
    help: &'static str,
    builtin: Builtin,
}

/// Command dispatch table - add new commands here
const COMMANDS: &[CommandEntry] = &[
    CommandEntry {
        name: "echo",
        usage: "echo [text]",
        help: "Display the provided text",
        builtin: Builtin::Echo,
    },
    CommandEntry {
        name: "clear",
        usage: "clear",
        help: "Clear the screen",
        builtin: Builtin::Clear,
    },
    CommandEntry {
        name: "help",
        usage: "help",
        help: "Show this help message",
        builtin: Builtin::Help,
    },
    CommandEntry {
        name: "version",
        usage: "version",
        help: "Display OS version",
        builtin: Builtin::Version,
    },
];

/// Exact, case-sensitive lookup. The table is tiny, a scan is enough.
pub fn find_command(name: &str) -> Option<Builtin> {
    COMMANDS
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| entry.builtin)
}

pub fn resolve(name: &str) -> Command<'_> {
    match find_command(name) {
        Some(builtin) => Command::Builtin(builtin),
        None => Command::Unknown(name),
    }
}

/// Runs one line. An empty command name does nothing.
pub fn execute<B: TextBuffer, C: CursorRegisters>(line: &str, display: &mut Display<B, C>) {
    let invocation = CommandInvocation::parse(line);
    if invocation.name.is_empty() {
        return;
    }

    match resolve(invocation.name) {
        Command::Builtin(builtin) => builtin.run(invocation.args, display),
        Command::Unknown(name) => {
            log::debug!("unknown command {:?}", name);
            display.set_color(Color::LightRed, Color::Black);
            display.print("Unknown command: ", Color::LightRed, Color::Black);
            display.print(name, Color::LightRed, Color::Black);
            display.print(
                "\nType 'help' for available commands.\n",
                Color::LightGray,
                Color::Black,
            );
        }
    }
}

impl Builtin {
    pub fn run<B: TextBuffer, C: CursorRegisters>(self, args: &str, display: &mut Display<B, C>) {
        match self {
            Builtin::Echo => cmd_echo(args, display),
            Builtin::Clear => cmd_clear(display),
            Builtin::Help => cmd_help(display),
            Builtin::Version => cmd_version(display),
        }
    }
}

// ============================================================================
// Command implementations
// ============================================================================

fn cmd_echo<B: TextBuffer, C: CursorRegisters>(args: &str, display: &mut Display<B, C>) {
    display.set_color(Color::LightGray, Color::Black);
    display.print(args, Color::LightGray, Color::Black);
    display.print("\n", Color::LightGray, Color::Black);
}

fn cmd_clear<B: TextBuffer, C: CursorRegisters>(display: &mut Display<B, C>) {
    display.clear(Color::LightGray, Color::Black);
    display.set_color(Color::LightGray, Color::Black);
}

fn cmd_help<B: TextBuffer, C: CursorRegisters>(display: &mut Display<B, C>) {
    display.set_color(Color::LightCyan, Color::Black);
    display.print("Available commands:\n", Color::LightCyan, Color::Black);
    display.set_color(Color::LightGray, Color::Black);
    for cmd in COMMANDS {
        let _ = writeln!(display, "  {:<12} - {}", cmd.usage, cmd.help);
    }
    display.newline();
}

fn cmd_version<B: TextBuffer, C: CursorRegisters>(display: &mut Display<B, C>) {
    display.set_color(Color::LightGreen, Color::Black);
    let _ = writeln!(display, "DxKern v{}", env!("CARGO_PKG_VERSION"));
    display.print(
        "Built with interrupts and keyboard support\n",
        Color::LightGray,
        Color::Black,
    );
}
