#![no_std]
#![no_main]

use core::fmt::Write;
use core::panic::PanicInfo;
use dxkern::constants::{logging, vga::BUFFER_HEIGHT};
use dxkern::terminal::Terminal;
use dxkern::vga_buffer::{Color, Display, VgaBuffer, VgaCursor};
use dxkern::{interrupts, keyboard, logger};

fn halt_loop() -> ! {
    loop {
        x86_64::instructions::hlt();
    }
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    x86_64::instructions::interrupts::disable();
    log::error!("{}", info);

    // the terminal never resumes, so taking the screen over is fine
    let mut display = Display::new(unsafe { VgaBuffer::new() }, VgaCursor::new());
    let _ = display.move_cursor(0, BUFFER_HEIGHT - 1);
    display.set_color(Color::LightRed, Color::Black);
    let _ = write!(display, "KERNEL PANIC: {}", info);
    halt_loop()
}

#[no_mangle]
pub extern "C" fn _start() -> ! {
    // a second init is the only failure; the screen works either way
    let _ = logger::init(logging::LEVEL);
    log::info!("starting DxKern v{}", env!("CARGO_PKG_VERSION"));

    let mut display = Display::new(unsafe { VgaBuffer::new() }, VgaCursor::new());
    display.clear(Color::LightGray, Color::Black);

    interrupts::install();

    let keys = match keyboard::init() {
        Ok(keys) => keys,
        Err(err) => {
            log::error!("keyboard init failed: {}", err);
            halt_loop()
        }
    };

    let mut terminal = Terminal::new(display, keys);
    terminal.init();

    // IRQ1 may fire from here on
    interrupts::enable();

    terminal.run()
}
