/// Declares a static `ACQUISITION_ENGINE` slot protected by a
/// `critical_section` mutex.
///
/// # Arguments
/// - `$acc`: the accumulator type (e.g. `RawBuffer` or `PowerIntegral`)
/// - `$adc`: the concrete converter type (must implement `ConversionSource`)
/// - `$led`: the concrete indicator pin type (must implement `OutputPin`)
///
/// # Example
/// ```ignore
/// init_acquisition_engine!(RawBuffer, MyAdc, MyLedPin);
/// ```
#[macro_export]
macro_rules! init_acquisition_engine {
    ( $acc:ty, $adc:ty, $led:ty ) => {
        pub static ACQUISITION_ENGINE: $crate::critical_section::Mutex<
            core::cell::RefCell<
                Option<$crate::acquisition::AcquisitionEngine<'static, $acc, $adc, $led>>,
            >,
        > = $crate::critical_section::Mutex::new(core::cell::RefCell::new(None));
    };
}

/// Builds the engine and stores it in `ACQUISITION_ENGINE`.
///
/// # Arguments
/// - `$producer`: the interrupt half of a `'static` window cell
/// - `$adc`: the converter
/// - `$led`: the indicator pin
/// - `$len`: readings per window
///
/// # Example
/// ```ignore
/// let (producer, consumer) = cell.split();
/// setup_acquisition_engine!(producer, adc, led, config.window_len);
/// ```
///
/// # Notes
/// - Requires `init_acquisition_engine!` to have been used earlier.
/// - Call it once the converter is configured but before its interrupt is
///   enabled.
#[macro_export]
macro_rules! setup_acquisition_engine {
    ( $producer:expr, $adc:expr, $led:expr, $len:expr ) => {
        $crate::critical_section::with(|cs| {
            let _ = ACQUISITION_ENGINE.borrow(cs).replace(Some(
                $crate::acquisition::AcquisitionEngine::new($producer, $adc, $led, $len),
            ));
        });
    };
}

/// Runs the engine stored in `ACQUISITION_ENGINE` for one conversion.
///
/// # Example
/// ```ignore
/// #[interrupt]
/// fn ADC() {
///     conversion_complete!();
/// }
/// ```
///
/// Does nothing until `setup_acquisition_engine!` has run.
#[macro_export]
macro_rules! conversion_complete {
    () => {
        $crate::critical_section::with(|cs| {
            if let Some(engine) = ACQUISITION_ENGINE.borrow(cs).borrow_mut().as_mut() {
                engine.on_conversion();
            }
        });
    };
}
