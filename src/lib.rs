//! # powerline-daq
//!
//! A portable, no_std acquisition and telemetry core for single-phase AC power
//! monitoring nodes. A free-running ADC alternates between a current
//! transducer and a voltage divider; every window of readings (one mains
//! cycle) is checksummed, rendered as an ASCII-hex frame, and sent to a host
//! over a wired serial link or an XBee radio in API mode.
//!
//! This crate implements:
//! - interrupt-driven sampling with a single-producer/single-consumer window
//!   handoff built on `critical-section`
//! - two accumulation variants: raw samples or an on-node power integral
//! - a bit-serial CRC16 and ASCII-hex framing shared by both links
//! - chunked, acknowledged and retried XBee transmit requests
//!
//! All hardware is reached through `embedded-hal` and `embedded-hal-nb`
//! traits plus the small [`ConversionSource`](acquisition::ConversionSource)
//! trait; no registers are touched.
//!
//! ## Crate features
//! | Feature               | Description |
//! |-----------------------|-------------|
//! | `std`                 | Disables `#![no_std]` support |
//! | `timer-isr` (default) | Global engine slot and macros for the conversion interrupt |
//! | `defmt-0-3`           | Uses `defmt` logging |
//! | `log`                 | Uses `log` logging |
//!
//! ## Usage
//!
//! ```ignore
//! use powerline_daq::acquisition::{RawBuffer, WindowCell};
//! use powerline_daq::config::Config;
//! use powerline_daq::dispatch::{Dispatcher, boot};
//!
//! init_acquisition_engine!(RawBuffer, MyAdc, MyLed);
//!
//! let mode = boot(&mut mode_pin, &mut delay);
//! let config = Config::new::<RawBuffer>(mode);
//! let (producer, consumer) = cell.split(); // cell: &'static mut WindowCell<RawBuffer>
//! setup_acquisition_engine!(producer, adc, led, config.window_len);
//! // enable the conversion interrupt, which calls `conversion_complete!()`
//!
//! Dispatcher::new(consumer, serial, delay, config).run();
//! ```
//!
//! ## Integration Notes
//!
//! - The clock assumes one conversion every ~83 µs; other rates scale every
//!   timestamp accordingly.
//! - Only one engine instance should be active at a time.
//! - The wired link is fire-and-forget; only the radio reads anything back.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
mod fmt;

pub use critical_section;
pub use heapless;

pub mod acquisition;
pub mod clock;
pub mod config;
pub mod consts;
pub mod crc;
pub mod dispatch;
pub mod encoding;
pub mod error;
pub mod frame;
#[cfg(feature = "timer-isr")]
pub mod isr;
pub mod link;
pub mod transport;

pub use error::{Error, Result};
