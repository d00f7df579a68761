use spin::Mutex;
use pc_keyboard::{layouts, DecodedKey, HandleControl, Keyboard, ScancodeSet1};
use x86_64::instructions::port::Port;
use crate::constants::keyboard::{DATA_PORT, KEY_QUEUE_CAPACITY, MAX_SCANCODE, SCANCODE_TABLE_LEN};
use crate::error::KernelError;
use crate::queue::{Consumer, KeyEventQueue, Producer};

/// Make code -> ASCII, generated once from the set 1 US layout.
/// Release codes, prefixes, and keys without a printable mapping are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCodeTable {
    map: [Option<u8>; SCANCODE_TABLE_LEN],
}

impl ScanCodeTable {
    pub fn us104() -> Self {
        let mut map = [None; SCANCODE_TABLE_LEN];
        for code in 0..=MAX_SCANCODE {
            map[code as usize] = decode_unshifted(code);
        }
        ScanCodeTable { map }
    }

    pub fn translate(&self, scan_code: u8) -> Option<u8> {
        self.map.get(scan_code as usize).copied().flatten()
    }
}

// fresh decoder per code so no modifier state leaks between entries
fn decode_unshifted(scan_code: u8) -> Option<u8> {
    let mut decoder = Keyboard::new(ScancodeSet1::new(), layouts::Us104Key, HandleControl::Ignore);
    let event = decoder.add_byte(scan_code).ok()??;
    match decoder.process_keyevent(event)? {
        DecodedKey::Unicode(c) => match c {
            ' '..='~' | '\n' | '\u{8}' => Some(c as u8),
            _ => None,
        },
        DecodedKey::RawKey(_) => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Queued(u8),
    /// Queue full; the character is lost
    Dropped(u8),
    /// No printable mapping
    Ignored,
}

/// ISR-side half of the input path: translate, then enqueue or drop.
pub struct KeyboardPipeline<'a, const N: usize> {
    table: ScanCodeTable,
    producer: Producer<'a, N>,
}

impl<'a, const N: usize> KeyboardPipeline<'a, N> {
    pub fn new(table: ScanCodeTable, producer: Producer<'a, N>) -> Self {
        KeyboardPipeline { table, producer }
    }

    pub fn handle_scan_code(&mut self, scan_code: u8) -> KeyOutcome {
        match self.table.translate(scan_code) {
            Some(ascii) => match self.producer.enqueue(ascii) {
                Ok(()) => KeyOutcome::Queued(ascii),
                Err(_) => KeyOutcome::Dropped(ascii),
            },
            None => KeyOutcome::Ignored,
        }
    }
}

pub type KeyConsumer = Consumer<'static, KEY_QUEUE_CAPACITY>;

static KEY_QUEUE: KeyEventQueue<KEY_QUEUE_CAPACITY> = KeyEventQueue::new();
static PIPELINE: Mutex<Option<KeyboardPipeline<'static, KEY_QUEUE_CAPACITY>>> = Mutex::new(None);

/// Builds the scan code table, wires the producer to the ISR and returns the
/// foreground's end of the queue. Call before unmasking IRQ1.
pub fn init() -> Result<KeyConsumer, KernelError> {
    let (producer, consumer) = KEY_QUEUE.split()?;
    let pipeline = KeyboardPipeline::new(ScanCodeTable::us104(), producer);
    x86_64::instructions::interrupts::without_interrupts(|| {
        let mut slot = PIPELINE.lock();
        if slot.is_some() {
            return Err(KernelError::KeyboardAlreadyAttached);
        }
        *slot = Some(pipeline);
        Ok(())
    })?;
    log::debug!("keyboard pipeline attached, queue capacity {}", KEY_QUEUE.capacity());
    Ok(consumer)
}

pub fn read_scan_code() -> u8 {
    let mut port = Port::new(DATA_PORT);
    unsafe { port.read() }
}

/// Body of the IRQ1 handler. Bounded work, never waits on the queue.
pub fn handle_interrupt() {
    // always read, or the controller keeps the byte latched
    let scan_code = read_scan_code();
    if let Some(pipeline) = PIPELINE.lock().as_mut() {
        if let KeyOutcome::Dropped(ascii) = pipeline.handle_scan_code(scan_code) {
            log::trace!("key queue full, dropped {:#04x}", ascii);
        }
    }
}
