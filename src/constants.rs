/// System-wide constants to avoid magic numbers

/// VGA text mode constants
pub mod vga {
    /// VGA text buffer physical address
    pub const BUFFER_ADDR: usize = 0xb8000;

    /// VGA text mode dimensions
    pub const BUFFER_HEIGHT: usize = 25;
    pub const BUFFER_WIDTH: usize = 80;

    /// VGA control ports
    pub const COMMAND_PORT: u16 = 0x3D4;
    pub const DATA_PORT: u16 = 0x3D5;

    /// Cursor control registers
    pub const CURSOR_LOCATION_HIGH: u8 = 0x0E;
    pub const CURSOR_LOCATION_LOW: u8 = 0x0F;
}

/// PS/2 Keyboard controller constants
pub mod keyboard {
    /// PS/2 keyboard data port
    pub const DATA_PORT: u16 = 0x60;

    /// Highest make code with a table entry (set 1, keypad period)
    pub const MAX_SCANCODE: u8 = 83;
    pub const SCANCODE_TABLE_LEN: usize = MAX_SCANCODE as usize + 1;

    /// Characters buffered between the ISR and the foreground
    pub const KEY_QUEUE_CAPACITY: usize = 16;
}

/// Interrupt constants
pub mod interrupts {
    /// PIC (Programmable Interrupt Controller) offset
    /// We remap PIC interrupts to start at 32 to avoid conflicts with CPU exceptions
    pub const PIC_1_OFFSET: u8 = 32;
    pub const PIC_2_OFFSET: u8 = PIC_1_OFFSET + 8;

    /// PIC data (mask) ports
    pub const PIC_1_DATA: u16 = 0x21;
    pub const PIC_2_DATA: u16 = 0xA1;

    /// IRQ2 on the master carries everything from the slave
    pub const CASCADE_IRQ: u8 = 2;

    pub const TIMER_IRQ: u8 = 0;
    pub const KEYBOARD_IRQ: u8 = 1;

    /// Leave IRQ0 masked unless something needs a tick
    pub const TIMER_ENABLED: bool = false;
}

/// Terminal / shell constants
pub mod terminal {
    pub const PROMPT: &str = "dxkern> ";
    pub const BANNER: &str = "DxKern Terminal\n";
    pub const HINT: &str = "Type 'help' for available commands\n\n";

    /// Line buffer size including the terminator slot
    pub const MAX_COMMAND_LENGTH: usize = 256;
    pub const MAX_ARGS_LENGTH: usize = 200;
}

/// Serial diagnostics
pub mod logging {
    use log::LevelFilter;

    pub const COM1_PORT: u16 = 0x3F8;
    pub const LEVEL: LevelFilter = LevelFilter::Debug;
}
