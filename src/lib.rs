//! DxKern: interrupt-driven keyboard line input and VGA text output for a
//! single-core, freestanding x86_64 kernel.
//!
//! Key press -> IRQ1 -> [`keyboard`] translates and enqueues into the
//! [`queue`] -> [`terminal`] blocks on the queue, edits the line through
//! [`line_editor`] and hands it to the [`shell`] -> output via [`vga_buffer`].

#![cfg_attr(not(test), no_std)]
#![feature(abi_x86_interrupt)]

pub mod constants;
pub mod error;
pub mod serial;
pub mod logger;
pub mod vga_buffer;
pub mod queue;
pub mod keyboard;
pub mod pic;
pub mod interrupts;
pub mod line_editor;
pub mod shell;
pub mod terminal;

#[cfg(test)]
mod testutil;

pub use error::KernelError;
