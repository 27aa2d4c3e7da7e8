//! Single-producer/single-consumer handoff of one sample window.
//!
//! The conversion interrupt fills the window while the main loop is busy
//! transmitting the previous result, yet there is only one buffer. Ownership
//! alternates on a ready flag:
//!
//! - flag clear: only the [`Producer`] (interrupt side) may touch the window
//! - flag set: only the [`Consumer`] (main loop) may touch the window
//!
//! Access goes through scoped handles. A [`WriteHandle`] sets the flag when it
//! is dropped after [`WriteHandle::mark_ready`]; a [`ReadHandle`] clears it
//! when dropped. No other code path writes the flag, and each half can hold at
//! most one handle at a time, so the two sides never observe the window
//! mid-mutation.
//!
//! The flag is read and written inside short `critical_section` blocks, which
//! act as compiler and memory barriers on every supported target. The main
//! loop never holds a critical section while it transmits.
//!
//! ## Example
//!
//! ```
//! use powerline_daq::acquisition::{Accumulator, Channel, RawBuffer, WindowCell};
//!
//! let mut cell: WindowCell<RawBuffer<4>> = WindowCell::new(RawBuffer::new());
//! let (mut producer, mut consumer) = cell.split();
//!
//! if let Some(mut window) = producer.try_claim_for_write() {
//!     window.data.on_conversion(Channel::Current, 0x155);
//!     window.mark_ready();
//! }
//! assert!(producer.try_claim_for_write().is_none());
//!
//! let window = consumer.try_take_ready().unwrap();
//! assert_eq!(window.data.samples(), &[0x155]);
//! drop(window);
//! assert!(producer.try_claim_for_write().is_some());
//! ```

use core::cell::{Cell, UnsafeCell};
use core::fmt;
use core::ops::{Deref, DerefMut};

use critical_section::Mutex;

use crate::clock::Timestamp;

/// The unit of work handed from the interrupt to the main loop.
#[derive(Debug, Clone, Default)]
pub struct SampleWindow<A> {
    /// Clock reading when the first sample of the window was taken.
    pub started_at: Timestamp,
    /// Accumulated readings.
    pub data: A,
}

/// Storage for one [`SampleWindow`] plus its ready flag.
pub struct WindowCell<A> {
    ready: Mutex<Cell<bool>>,
    window: UnsafeCell<SampleWindow<A>>,
}

// The window is only reached through `WriteHandle` (flag clear) or
// `ReadHandle` (flag set), and `split` hands out exactly one of each side.
unsafe impl<A: Send> Sync for WindowCell<A> {}

impl<A> WindowCell<A> {
    /// Wraps `data` in an empty, not-ready window.
    pub const fn new(data: A) -> Self {
        Self {
            ready: Mutex::new(Cell::new(false)),
            window: UnsafeCell::new(SampleWindow {
                started_at: Timestamp::new(0, 0),
                data,
            }),
        }
    }

    /// Splits the cell into its interrupt-side and main-loop halves.
    pub fn split(&mut self) -> (Producer<'_, A>, Consumer<'_, A>) {
        let cell: &WindowCell<A> = self;
        (Producer { cell }, Consumer { cell })
    }

    fn is_ready(&self) -> bool {
        critical_section::with(|cs| self.ready.borrow(cs).get())
    }

    fn set_ready(&self, ready: bool) {
        critical_section::with(|cs| self.ready.borrow(cs).set(ready));
    }
}

impl<A> fmt::Debug for WindowCell<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowCell")
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

/// Interrupt-side half of a [`WindowCell`].
#[derive(Debug)]
pub struct Producer<'a, A> {
    cell: &'a WindowCell<A>,
}

impl<A> Producer<'_, A> {
    /// Claims the window for writing, unless it is waiting to be consumed.
    pub fn try_claim_for_write(&mut self) -> Option<WriteHandle<'_, A>> {
        if self.cell.is_ready() {
            None
        } else {
            Some(WriteHandle {
                cell: self.cell,
                publish: false,
            })
        }
    }
}

/// Main-loop half of a [`WindowCell`].
#[derive(Debug)]
pub struct Consumer<'a, A> {
    cell: &'a WindowCell<A>,
}

impl<A> Consumer<'_, A> {
    /// Takes the window if the producer has published it.
    pub fn try_take_ready(&mut self) -> Option<ReadHandle<'_, A>> {
        if self.cell.is_ready() {
            Some(ReadHandle { cell: self.cell })
        } else {
            None
        }
    }

    /// Whether a published window is waiting.
    pub fn is_ready(&self) -> bool {
        self.cell.is_ready()
    }
}

/// Exclusive write access to a window that is still being filled.
#[derive(Debug)]
pub struct WriteHandle<'p, A> {
    cell: &'p WindowCell<A>,
    publish: bool,
}

impl<A> WriteHandle<'_, A> {
    /// Publishes the window to the consumer when this handle is dropped.
    pub fn mark_ready(&mut self) {
        self.publish = true;
    }
}

impl<A> Deref for WriteHandle<'_, A> {
    type Target = SampleWindow<A>;

    fn deref(&self) -> &SampleWindow<A> {
        // SAFETY: the flag is clear and the producer is mutably borrowed.
        unsafe { &*self.cell.window.get() }
    }
}

impl<A> DerefMut for WriteHandle<'_, A> {
    fn deref_mut(&mut self) -> &mut SampleWindow<A> {
        // SAFETY: the flag is clear and the producer is mutably borrowed.
        unsafe { &mut *self.cell.window.get() }
    }
}

impl<A> Drop for WriteHandle<'_, A> {
    fn drop(&mut self) {
        if self.publish {
            self.cell.set_ready(true);
        }
    }
}

/// Exclusive access to a published window; releases it on drop.
#[derive(Debug)]
pub struct ReadHandle<'c, A> {
    cell: &'c WindowCell<A>,
}

impl<A> Deref for ReadHandle<'_, A> {
    type Target = SampleWindow<A>;

    fn deref(&self) -> &SampleWindow<A> {
        // SAFETY: the flag is set, so the producer cannot claim the window.
        unsafe { &*self.cell.window.get() }
    }
}

impl<A> DerefMut for ReadHandle<'_, A> {
    fn deref_mut(&mut self) -> &mut SampleWindow<A> {
        // SAFETY: the flag is set, so the producer cannot claim the window.
        unsafe { &mut *self.cell.window.get() }
    }
}

impl<A> Drop for ReadHandle<'_, A> {
    fn drop(&mut self) {
        self.cell.set_ready(false);
    }
}
