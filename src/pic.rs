//! Cascaded 8259 interrupt controllers.
//!
//! `pic8259` emits the ICW1..ICW4 byte sequence and the end-of-interrupt
//! commands; the mask registers are driven here so that only installed lines
//! ever reach the CPU.

use pic8259::ChainedPics;
use spin::Mutex;
use x86_64::instructions::port::Port;
use crate::constants::interrupts::{CASCADE_IRQ, PIC_1_DATA, PIC_1_OFFSET, PIC_2_DATA, PIC_2_OFFSET};

/// Offsets and masks of the master/slave pair. Offsets never change once set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    pub master_offset: u8,
    pub slave_offset: u8,
    /// `[master, slave]`, a set bit masks the line
    pub masks: [u8; 2],
    remapped: bool,
}

impl ControllerState {
    pub const fn new(master_offset: u8, slave_offset: u8) -> Self {
        ControllerState {
            master_offset,
            slave_offset,
            masks: [0xff, 0xff],
            remapped: false,
        }
    }

    /// True exactly once: the caller then programs the chips and every line
    /// starts masked. Later calls change nothing.
    pub fn begin_remap(&mut self) -> bool {
        if self.remapped {
            return false;
        }
        self.remapped = true;
        self.masks = [0xff, 0xff];
        true
    }

    pub fn is_master_vector(&self, vector: u8) -> bool {
        self.master_offset <= vector && vector < self.master_offset.saturating_add(8)
    }

    pub fn is_slave_vector(&self, vector: u8) -> bool {
        self.slave_offset <= vector && vector < self.slave_offset.saturating_add(8)
    }

    pub fn handles(&self, vector: u8) -> bool {
        self.is_master_vector(vector) || self.is_slave_vector(vector)
    }

    pub fn vector_for(&self, irq: u8) -> u8 {
        if irq < 8 {
            self.master_offset + irq
        } else {
            self.slave_offset + (irq - 8)
        }
    }

    /// Clears the line's mask bit; slave lines also open the cascade.
    pub fn unmask(&mut self, irq: u8) {
        if irq < 8 {
            self.masks[0] &= !(1 << irq);
        } else {
            self.masks[1] &= !(1 << (irq - 8));
            self.masks[0] &= !(1 << CASCADE_IRQ);
        }
    }
}

pub struct InterruptController {
    pics: ChainedPics,
    state: ControllerState,
}

impl InterruptController {
    /// # Safety
    ///
    /// Offsets must not overlap the CPU exception vectors (0..32).
    pub const unsafe fn new(master_offset: u8, slave_offset: u8) -> Self {
        InterruptController {
            pics: ChainedPics::new(master_offset, slave_offset),
            state: ControllerState::new(master_offset, slave_offset),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Reprograms both chips in cascade mode at the configured offsets and
    /// masks every line. Later calls are ignored.
    ///
    /// # Safety
    ///
    /// Interrupts must be disabled and the vector table for the offsets loaded.
    pub unsafe fn remap(&mut self) {
        if !self.state.begin_remap() {
            log::warn!(
                "PIC already remapped, keeping offsets {}/{}",
                self.state.master_offset,
                self.state.slave_offset
            );
            return;
        }
        self.pics.initialize();
        self.write_masks();
        log::debug!("PIC remapped to {}/{}", self.state.master_offset, self.state.slave_offset);
    }

    /// # Safety
    ///
    /// A handler must be installed at the line's vector.
    pub unsafe fn unmask(&mut self, irq: u8) {
        self.state.unmask(irq);
        self.write_masks();
        log::debug!(
            "IRQ{} unmasked, masks {:#04x}/{:#04x}",
            irq,
            self.state.masks[0],
            self.state.masks[1]
        );
    }

    /// End of interrupt: slave first when the vector is its, then master.
    ///
    /// # Safety
    ///
    /// Must be the last thing the handler for `vector` does.
    pub unsafe fn acknowledge(&mut self, vector: u8) {
        self.pics.notify_end_of_interrupt(vector);
    }

    unsafe fn write_masks(&mut self) {
        let mut master: Port<u8> = Port::new(PIC_1_DATA);
        let mut slave: Port<u8> = Port::new(PIC_2_DATA);
        master.write(self.state.masks[0]);
        slave.write(self.state.masks[1]);
    }
}

/// Programmable Interrupt Controller (PIC) setup
pub static PICS: Mutex<InterruptController> =
    Mutex::new(unsafe { InterruptController::new(PIC_1_OFFSET, PIC_2_OFFSET) });
