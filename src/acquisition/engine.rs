use embedded_hal::digital::OutputPin;

use super::{Accumulator, Channel, ConversionSource, Producer};
use crate::clock::{MillisClock, Timestamp};
use crate::consts::ADC_MAX;

/// Conversion-complete interrupt handler state.
///
/// Call [`on_conversion`](AcquisitionEngine::on_conversion) once per finished
/// conversion, from the interrupt (see [`crate::isr`]). Each call:
///
/// 1. advances the millisecond clock
/// 2. if the shared window is free, stores the reading, flips the
///    multiplexer, and blinks the indicator
/// 3. publishes the window once `window_len` readings have been taken
///
/// A window only starts on a clock step boundary so its timestamp is exact;
/// conversions arriving before that are skipped.
///
/// ## Channel order
///
/// The converter runs free, so a new conversion has already started on the
/// previously selected input by the time the interrupt fires. Flipping the
/// multiplexer first and labelling the reading with the channel it now points
/// at therefore names the input the reading was really taken from. The
/// multiplexer rests on [`Channel::Voltage`], so every window starts with a
/// current reading.
#[derive(Debug)]
pub struct AcquisitionEngine<'a, A, ADC, LED> {
    clock: MillisClock,
    mux: Channel,
    index: u16,
    window_len: u16,
    producer: Producer<'a, A>,
    adc: ADC,
    indicator: LED,
    indicator_on: bool,
    /// Conversions discarded because the previous window was not yet consumed.
    pub overruns: u32,
}

impl<'a, A, ADC, LED> AcquisitionEngine<'a, A, ADC, LED>
where
    A: Accumulator,
    ADC: ConversionSource,
    LED: OutputPin,
{
    /// Creates an engine filling windows of `window_len` readings.
    ///
    /// The multiplexer is routed to its resting channel and the indicator is
    /// switched off. A zero `window_len` is treated as one.
    pub fn new(producer: Producer<'a, A>, adc: ADC, indicator: LED, window_len: u16) -> Self {
        let mut engine = Self {
            clock: MillisClock::new(),
            mux: Channel::default(),
            index: 0,
            window_len: window_len.max(1),
            producer,
            adc,
            indicator,
            indicator_on: true,
            overruns: 0,
        };
        engine.adc.select(engine.mux);
        engine.set_indicator(false);
        engine
    }

    /// Handles one finished conversion.
    pub fn on_conversion(&mut self) {
        self.clock.tick();

        let Some(mut window) = self.producer.try_claim_for_write() else {
            self.overruns = self.overruns.wrapping_add(1);
            return;
        };

        if self.index == 0 {
            if !self.clock.at_step_boundary() {
                return;
            }
            window.started_at = self.clock.now();
            window.data.reset();
        }

        let value = self.adc.latest();
        debug_assert!(value <= ADC_MAX, "conversion out of range: {}", value);
        self.index += 1;
        self.mux = self.mux.toggled();
        self.adc.select(self.mux);
        window.data.on_conversion(self.mux, value);

        let complete = self.index == self.window_len;
        if complete {
            window.data.finalize();
            window.mark_ready();
        }
        drop(window);

        if complete {
            self.index = 0;
            self.mux = Channel::Voltage;
            self.adc.select(self.mux);
            self.set_indicator(false);
        } else {
            self.set_indicator(!self.indicator_on);
        }
    }

    /// Current clock reading.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Readings taken so far in the window being filled.
    pub fn index(&self) -> u16 {
        self.index
    }

    /// Channel the multiplexer currently points at.
    pub fn channel(&self) -> Channel {
        self.mux
    }

    /// Configured window length.
    pub fn window_len(&self) -> u16 {
        self.window_len
    }

    fn set_indicator(&mut self, on: bool) {
        if on == self.indicator_on {
            return;
        }
        self.indicator_on = on;
        let _ = if on {
            self.indicator.set_high()
        } else {
            self.indicator.set_low()
        };
    }
}


#[cfg(test)]
mod tests {
    use super::mock::{CountingPin, ScriptedAdc};
    use super::*;
    use crate::acquisition::{PowerIntegral, RawBuffer, WindowCell};
    use crate::consts::TICKS_PER_CLOCK_STEP;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    /// Runs conversions until the clock reaches its first step boundary.
    fn align<A, ADC, LED>(engine: &mut AcquisitionEngine<'_, A, ADC, LED>)
    where
        A: Accumulator,
        ADC: ConversionSource,
        LED: OutputPin,
    {
        for _ in 0..(TICKS_PER_CLOCK_STEP - 1) {
            engine.on_conversion();
        }
        assert_eq!(engine.index(), 0);
    }

    #[test]
    fn test_waits_for_clock_boundary_before_sampling() {
        let mut cell: WindowCell<RawBuffer<4>> = WindowCell::new(RawBuffer::new());
        let (producer, _consumer) = cell.split();
        let adc = ScriptedAdc::new(&[100]);
        let mut engine = AcquisitionEngine::new(producer, adc, CountingPin::default(), 4);

        for _ in 0..(TICKS_PER_CLOCK_STEP - 1) {
            engine.on_conversion();
        }
        assert_eq!(engine.index(), 0);
        assert_eq!(engine.adc.next, 0);
        assert_eq!(engine.indicator.edges, 1);

        engine.on_conversion();
        assert_eq!(engine.index(), 1);
        assert_eq!(engine.now().as_millis(), 83);
    }

    #[test]
    fn test_end_to_end_window_of_three() {
        let mut cell: WindowCell<RawBuffer<3>> = WindowCell::new(RawBuffer::new());
        let (producer, mut consumer) = cell.split();
        let adc = ScriptedAdc::new(&[0x0055, 0x03AA, 0x0200]);
        let led = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ]);
        let mut engine = AcquisitionEngine::new(producer, adc, led, 3);
        align(&mut engine);

        for _ in 0..3 {
            assert!(!consumer.is_ready());
            engine.on_conversion();
        }
        assert!(consumer.is_ready());
        assert_eq!(engine.index(), 0);
        assert_eq!(engine.channel(), Channel::Voltage);

        let window = consumer.try_take_ready().unwrap();
        assert_eq!(window.started_at, Timestamp::new(0, 83));
        assert_eq!(window.data.samples(), &[0x0055, 0x03AA, 0x0200]);
        drop(window);
        engine.indicator.done();
    }

    #[test]
    fn test_channels_alternate_starting_with_current() {
        let mut cell: WindowCell<RawBuffer<4>> = WindowCell::new(RawBuffer::new());
        let (producer, _consumer) = cell.split();
        let mut engine = AcquisitionEngine::new(
            producer,
            ScriptedAdc::new(&[1]),
            CountingPin::default(),
            4,
        );
        align(&mut engine);
        for _ in 0..4 {
            engine.on_conversion();
        }
        assert_eq!(
            engine.adc.selected,
            vec![
                Channel::Voltage,
                Channel::Current,
                Channel::Voltage,
                Channel::Current,
                Channel::Voltage,
                Channel::Voltage,
            ]
        );
    }

    #[test]
    fn test_ready_window_is_not_touched_until_released() {
        let mut cell: WindowCell<RawBuffer<4>> = WindowCell::new(RawBuffer::new());
        let (producer, mut consumer) = cell.split();
        let adc = ScriptedAdc::new(&[10, 11, 12, 13, 14, 15, 16, 17]);
        let mut engine = AcquisitionEngine::new(producer, adc, CountingPin::default(), 4);
        align(&mut engine);
        for _ in 0..4 {
            engine.on_conversion();
        }
        assert!(consumer.is_ready());
        let edges = engine.indicator.edges;

        for _ in 0..50 {
            engine.on_conversion();
        }
        assert_eq!(engine.overruns, 50);
        assert_eq!(engine.indicator.edges, edges);
        assert_eq!(engine.adc.next, 4);
        {
            let window = consumer.try_take_ready().unwrap();
            assert_eq!(window.data.samples(), &[10, 11, 12, 13]);
        }
        assert!(consumer.try_take_ready().is_none());
    }

    #[test]
    fn test_ready_flag_set_exactly_once_per_window() {
        let mut cell: WindowCell<RawBuffer<6>> = WindowCell::new(RawBuffer::new());
        let (producer, consumer) = cell.split();
        let mut engine = AcquisitionEngine::new(
            producer,
            ScriptedAdc::new(&[512]),
            CountingPin::default(),
            6,
        );
        align(&mut engine);
        let mut transitions = 0;
        let mut was_ready = false;
        for _ in 0..100 {
            engine.on_conversion();
            let ready = consumer.is_ready();
            if ready && !was_ready {
                transitions += 1;
            }
            was_ready = ready;
        }
        assert_eq!(transitions, 1);
        assert!(consumer.is_ready());
    }

    #[test]
    fn test_next_window_restarts_on_boundary_after_release() {
        let mut cell: WindowCell<RawBuffer<2>> = WindowCell::new(RawBuffer::new());
        let (producer, mut consumer) = cell.split();
        let mut engine = AcquisitionEngine::new(
            producer,
            ScriptedAdc::new(&[5]),
            CountingPin::default(),
            2,
        );
        align(&mut engine);
        engine.on_conversion();
        engine.on_conversion();
        drop(consumer.try_take_ready().unwrap());

        // Off-boundary conversions are skipped until the next clock step.
        for _ in 0..(TICKS_PER_CLOCK_STEP - 2) {
            engine.on_conversion();
            assert_eq!(engine.index(), 0);
        }
        engine.on_conversion();
        assert_eq!(engine.index(), 1);
        engine.on_conversion();
        let window = consumer.try_take_ready().unwrap();
        assert_eq!(window.started_at.as_millis(), 2 * 83);
        assert_eq!(window.data.samples(), &[5, 5]);
    }

    #[test]
    #[should_panic(expected = "conversion out of range")]
    fn test_out_of_range_conversion_is_caught() {
        let mut cell: WindowCell<RawBuffer<2>> = WindowCell::new(RawBuffer::new());
        let (producer, _consumer) = cell.split();
        let adc = ScriptedAdc::new(&[ADC_MAX + 1]);
        let mut engine = AcquisitionEngine::new(producer, adc, CountingPin::default(), 2);
        align(&mut engine);
        engine.on_conversion();
    }

    #[test]
    fn test_power_variant_integrates_pairs() {
        let mut cell: WindowCell<PowerIntegral> = WindowCell::new(PowerIntegral::new());
        let (producer, mut consumer) = cell.split();
        // current, voltage, current, voltage, current
        let adc = ScriptedAdc::new(&[522, 700, 502, 300, 600]);
        let mut engine = AcquisitionEngine::new(producer, adc, CountingPin::default(), 5);
        align(&mut engine);
        for _ in 0..5 {
            engine.on_conversion();
        }
        let window = consumer.try_take_ready().unwrap();
        assert_eq!(window.data.sum(), 10 * 700 + 10 * 300);
        assert_eq!(window.data.last_current(), 88);
        assert_eq!(window.data.last_voltage(), 300);
    }
}
