//! Single-producer/single-consumer ring buffer between the keyboard ISR and
//! the foreground.
//!
//! Only the [`Producer`] advances `tail` and only the [`Consumer`] advances
//! `head`. Both handles come out of [`KeyEventQueue::split`] exactly once and
//! neither is `Clone`, so a second writer cannot exist.
//!
//! Indices run over `0..2 * N` so that a full queue (`len == N`) and an empty
//! one (`len == 0`) are told apart without sacrificing a slot.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use crate::error::KernelError;

pub struct KeyEventQueue<const N: usize> {
    slots: UnsafeCell<[u8; N]>,
    head: AtomicUsize,
    tail: AtomicUsize,
    split: AtomicBool,
}

// SAFETY: slot `i` is written only by the producer while `i` is outside
// `head..tail`, and read only by the consumer while it is inside. The Release
// store of the index that moves the boundary publishes the slot.
unsafe impl<const N: usize> Sync for KeyEventQueue<N> {}

impl<const N: usize> KeyEventQueue<N> {
    pub const fn new() -> Self {
        assert!(N > 0, "queue capacity must be non-zero");
        KeyEventQueue {
            slots: UnsafeCell::new([0; N]),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            split: AtomicBool::new(false),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        distance(head, tail, N)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    /// Hands out the two endpoints. Succeeds once per queue.
    pub fn split(&self) -> Result<(Producer<'_, N>, Consumer<'_, N>), KernelError> {
        if self.split.swap(true, Ordering::AcqRel) {
            return Err(KernelError::QueueAlreadySplit);
        }
        Ok((Producer { queue: self }, Consumer { queue: self }))
    }
}

impl<const N: usize> Default for KeyEventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

fn distance(head: usize, tail: usize, capacity: usize) -> usize {
    (tail + 2 * capacity - head) % (2 * capacity)
}

fn step(index: usize, capacity: usize) -> usize {
    (index + 1) % (2 * capacity)
}

/// Interrupt-side endpoint. Never blocks.
pub struct Producer<'a, const N: usize> {
    queue: &'a KeyEventQueue<N>,
}

impl<'a, const N: usize> Producer<'a, N> {
    /// Drops `byte` and leaves the contents untouched when the queue is full.
    pub fn enqueue(&mut self, byte: u8) -> Result<(), KernelError> {
        let tail = self.queue.tail.load(Ordering::Relaxed);
        let head = self.queue.head.load(Ordering::Acquire);
        if distance(head, tail, N) == N {
            return Err(KernelError::QueueFull);
        }
        // SAFETY: tail's slot is outside head..tail, so the consumer is not reading it
        unsafe {
            (*self.queue.slots.get())[tail % N] = byte;
        }
        self.queue.tail.store(step(tail, N), Ordering::Release);
        Ok(())
    }
}

/// Foreground endpoint.
pub struct Consumer<'a, const N: usize> {
    queue: &'a KeyEventQueue<N>,
}

impl<'a, const N: usize> Consumer<'a, N> {
    pub fn try_dequeue(&mut self) -> Option<u8> {
        let head = self.queue.head.load(Ordering::Relaxed);
        let tail = self.queue.tail.load(Ordering::Acquire);
        if head == tail {
            return None;
        }
        // SAFETY: head's slot is inside head..tail and was published by the producer
        let byte = unsafe { (*self.queue.slots.get())[head % N] };
        self.queue.head.store(step(head, N), Ordering::Release);
        Some(byte)
    }

    /// Spins until the ISR delivers a character. No timeout.
    pub fn dequeue_blocking(&mut self) -> u8 {
        loop {
            if let Some(byte) = self.try_dequeue() {
                return byte;
            }
            core::hint::spin_loop();
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
