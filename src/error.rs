//! Kernel-wide recoverable error type.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    /// Key event queue has no free slot; the newest character is lost
    QueueFull,
    /// Producer/consumer handles were already handed out
    QueueAlreadySplit,
    /// A keyboard pipeline is already wired to the ISR
    KeyboardAlreadyAttached,
    /// Cell coordinates outside the text grid
    CellOutOfBounds { column: usize, row: usize },
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::QueueFull => write!(f, "key event queue full"),
            KernelError::QueueAlreadySplit => write!(f, "key event queue already split"),
            KernelError::KeyboardAlreadyAttached => write!(f, "keyboard pipeline already attached"),
            KernelError::CellOutOfBounds { column, row } => {
                write!(f, "cell ({}, {}) outside the text grid", column, row)
            }
        }
    }
}
