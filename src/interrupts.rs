use x86_64::structures::idt::{HandlerFunc, InterruptDescriptorTable, InterruptStackFrame};
use lazy_static::lazy_static;
use crate::constants::interrupts::{KEYBOARD_IRQ, PIC_1_OFFSET, TIMER_ENABLED, TIMER_IRQ};
use crate::pic::PICS;

/// Hardware interrupt numbers (after remapping)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InterruptIndex {
    Timer = PIC_1_OFFSET + TIMER_IRQ,
    Keyboard = PIC_1_OFFSET + KEYBOARD_IRQ,
}

impl InterruptIndex {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn as_usize(self) -> usize {
        usize::from(self.as_u8())
    }

    pub fn irq(self) -> u8 {
        self.as_u8() - PIC_1_OFFSET
    }
}

/// Vectors that get a present gate. Every other entry stays not-present,
/// including the timer's while its line is unused.
pub const INSTALLED_VECTORS: &[InterruptIndex] = if TIMER_ENABLED {
    &[InterruptIndex::Timer, InterruptIndex::Keyboard]
} else {
    &[InterruptIndex::Keyboard]
};

/// Points `vector` at `handler` as a present ring 0 interrupt gate in the
/// current code segment. `set_handler_fn` splits the address across the
/// entry's offset fields.
pub fn init_descriptor(
    idt: &mut InterruptDescriptorTable,
    vector: InterruptIndex,
    handler: HandlerFunc,
) {
    idt[vector.as_u8()].set_handler_fn(handler);
}

fn handler_for(vector: InterruptIndex) -> HandlerFunc {
    match vector {
        InterruptIndex::Timer => timer_interrupt_handler,
        InterruptIndex::Keyboard => keyboard_interrupt_handler,
    }
}

lazy_static! {
    static ref IDT: InterruptDescriptorTable = {
        // new() leaves all 256 entries not present
        let mut idt = InterruptDescriptorTable::new();
        for &vector in INSTALLED_VECTORS {
            init_descriptor(&mut idt, vector, handler_for(vector));
        }
        idt
    };
}

/// Loads the vector table, remaps the controllers and unmasks the installed
/// lines. Interrupts stay disabled; call [`enable`] once the consumer side is
/// ready.
pub fn install() {
    x86_64::instructions::interrupts::disable();

    IDT.load();
    log::debug!("IDT loaded, {} vectors installed", INSTALLED_VECTORS.len());

    let mut pics = PICS.lock();
    unsafe {
        pics.remap();
        for vector in INSTALLED_VECTORS {
            pics.unmask(vector.irq());
        }
    }
}

pub fn enable() {
    x86_64::instructions::interrupts::enable();
    log::info!("interrupts enabled");
}

extern "x86-interrupt" fn timer_interrupt_handler(_stack_frame: InterruptStackFrame) {
    unsafe {
        PICS.lock().acknowledge(InterruptIndex::Timer.as_u8());
    }
}

extern "x86-interrupt" fn keyboard_interrupt_handler(_stack_frame: InterruptStackFrame) {
    crate::keyboard::handle_interrupt();

    unsafe {
        PICS.lock().acknowledge(InterruptIndex::Keyboard.as_u8());
    }
}
