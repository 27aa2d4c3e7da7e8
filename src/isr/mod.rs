//! Glue for running the [`AcquisitionEngine`] from the conversion-complete
//! interrupt.
//!
//! The engine lives in a global `critical_section::Mutex` slot. `main` fills
//! the slot once the converter and indicator are configured; the interrupt
//! handler then calls into it on every conversion. Until the slot is filled
//! the interrupt does nothing.
//!
//! Two equivalent styles are offered:
//!
//! - functions over an explicit static: [`global_engine_init`],
//!   [`global_engine_setup`], [`global_conversion_complete`]
//! - macros over a conventionally named `ACQUISITION_ENGINE` static:
//!   [`init_acquisition_engine!`](crate::init_acquisition_engine),
//!   [`setup_acquisition_engine!`](crate::setup_acquisition_engine),
//!   [`conversion_complete!`](crate::conversion_complete)
//!
//! The engine borrows its [`WindowCell`](crate::acquisition::WindowCell) for
//! `'static`, so the cell has to be a `&'static mut` obtained from a
//! singleton helper of the target's runtime crate.

mod macros;

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::OutputPin;

use crate::acquisition::{Accumulator, AcquisitionEngine, ConversionSource, Producer};

/// Global slot holding the engine.
pub type EngineSlot<A, ADC, LED> = Mutex<RefCell<Option<AcquisitionEngine<'static, A, ADC, LED>>>>;

/// Creates an empty engine slot for a `static`.
///
/// # Example
/// ```ignore
/// use powerline_daq::acquisition::RawBuffer;
/// use powerline_daq::isr::{EngineSlot, global_engine_init};
///
/// static ENGINE: EngineSlot<RawBuffer, MyAdc, MyLed> = global_engine_init();
/// ```
pub const fn global_engine_init<A, ADC, LED>() -> EngineSlot<A, ADC, LED> {
    Mutex::new(RefCell::new(None))
}

/// Builds the engine and stores it in `slot`.
///
/// # Arguments
/// * `slot`: the static created with [`global_engine_init`]
/// * `producer`: interrupt half of the window cell
/// * `adc`: converter the readings come from
/// * `indicator`: activity output toggled once per sample
/// * `window_len`: readings per window, usually `Config::window_len`
pub fn global_engine_setup<A, ADC, LED>(
    slot: &'static EngineSlot<A, ADC, LED>,
    producer: Producer<'static, A>,
    adc: ADC,
    indicator: LED,
    window_len: u16,
) where
    A: Accumulator,
    ADC: ConversionSource,
    LED: OutputPin,
{
    critical_section::with(|cs| {
        let _ = slot
            .borrow(cs)
            .replace(Some(AcquisitionEngine::new(producer, adc, indicator, window_len)));
    });
}

/// Handles one finished conversion; call it from the interrupt.
///
/// # Example
/// ```ignore
/// #[interrupt]
/// fn ADC() {
///     global_conversion_complete(&ENGINE);
/// }
/// ```
pub fn global_conversion_complete<A, ADC, LED>(slot: &'static EngineSlot<A, ADC, LED>)
where
    A: Accumulator,
    ADC: ConversionSource,
    LED: OutputPin,
{
    critical_section::with(|cs| {
        if let Some(engine) = slot.borrow(cs).borrow_mut().as_mut() {
            engine.on_conversion();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::{EngineSlot, global_conversion_complete, global_engine_init, global_engine_setup};
    use crate::acquisition::mock::{CountingPin, ScriptedAdc};
    use crate::acquisition::{RawBuffer, WindowCell};
    use crate::consts::TICKS_PER_CLOCK_STEP;

    static ENGINE: EngineSlot<RawBuffer<2>, ScriptedAdc, CountingPin> = global_engine_init();

    #[test]
    fn test_functions_drive_engine() {
        // nothing happens before setup
        global_conversion_complete(&ENGINE);

        let cell: &'static mut WindowCell<RawBuffer<2>> =
            Box::leak(Box::new(WindowCell::new(RawBuffer::new())));
        let (producer, mut consumer) = cell.split();
        global_engine_setup(&ENGINE, producer, ScriptedAdc::new(&[4, 5]), CountingPin::default(), 2);

        for _ in 0..(TICKS_PER_CLOCK_STEP + 1) {
            global_conversion_complete(&ENGINE);
        }
        let window = consumer.try_take_ready().unwrap();
        assert_eq!(window.data.samples(), &[4, 5]);
    }

    #[test]
    fn test_macros_drive_engine() {
        crate::init_acquisition_engine!(RawBuffer<3>, ScriptedAdc, CountingPin);

        let cell: &'static mut WindowCell<RawBuffer<3>> =
            Box::leak(Box::new(WindowCell::new(RawBuffer::new())));
        let (producer, mut consumer) = cell.split();
        crate::setup_acquisition_engine!(
            producer,
            ScriptedAdc::new(&[7, 8, 9]),
            CountingPin::default(),
            3
        );

        for _ in 0..(TICKS_PER_CLOCK_STEP + 1) {
            crate::conversion_complete!();
        }
        assert!(!consumer.is_ready());
        crate::conversion_complete!();
        assert_eq!(consumer.try_take_ready().unwrap().data.samples(), &[7, 8, 9]);

        critical_section::with(|cs| {
            let engine = ACQUISITION_ENGINE.borrow(cs).borrow();
            assert_eq!(engine.as_ref().map(|e| e.index()), Some(0));
        });
    }
}
