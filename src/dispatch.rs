//! Main-loop side of the node: boot, then ship every finished window.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

use crate::acquisition::{Accumulator, Consumer};
use crate::config::{Config, LinkMode};
use crate::consts::{BOOT_MODE_DELAY_MS, BOOT_SETTLE_MS};
use crate::link::SerialLink;
use crate::transport::{RadioTransport, TransparentTransport};

/// Runs the boot sequence and returns the link selected by `mode_pin`.
///
/// Waits for the board to settle, samples the pin once (high selects the
/// radio, an unreadable pin the wired link), then pauses again before
/// acquisition may start.
pub fn boot<P, D>(mode_pin: &mut P, delay: &mut D) -> LinkMode
where
    P: InputPin,
    D: DelayNs,
{
    delay.delay_ms(BOOT_SETTLE_MS);
    let high = mode_pin.is_high().unwrap_or(false);
    info!("mode pin high: {}", high);
    delay.delay_ms(BOOT_MODE_DELAY_MS);
    LinkMode::from_detect_pin(high)
}

/// Polls for finished windows and sends them over the selected link.
///
/// One window is in flight at a time: the engine cannot start the next
/// window until the current one has been sent (or given up on) and released.
#[derive(Debug)]
pub struct Dispatcher<'a, A, L, D> {
    consumer: Consumer<'a, A>,
    link: L,
    delay: D,
    config: Config,
    transparent: TransparentTransport,
    radio: RadioTransport,
    /// Windows delivered in full.
    pub windows_sent: u32,
    /// Windows with a link fault or at least one unacknowledged packet.
    pub windows_failed: u32,
}

impl<'a, A, L, D> Dispatcher<'a, A, L, D>
where
    A: Accumulator,
    L: SerialLink,
    D: DelayNs,
{
    /// Creates a dispatcher draining `consumer` according to `config`.
    pub fn new(consumer: Consumer<'a, A>, link: L, delay: D, config: Config) -> Self {
        Self {
            consumer,
            link,
            delay,
            transparent: TransparentTransport::new(&config),
            radio: RadioTransport::new(&config),
            config,
            windows_sent: 0,
            windows_failed: 0,
        }
    }

    /// Sends the waiting window, if any, and releases it to the engine.
    ///
    /// Returns whether a window was handled. Transmission faults are logged
    /// and counted, never returned.
    pub fn poll(&mut self) -> bool {
        let Some(mut window) = self.consumer.try_take_ready() else {
            return false;
        };

        let delivered = match self.config.mode {
            LinkMode::Transparent => self.transparent.send(&mut self.link, &window).map(|_| true),
            LinkMode::Radio => self
                .radio
                .send_window(&mut self.link, &mut self.delay, &window)
                .map(|delivery| {
                    if delivery.unacknowledged > 0 {
                        warn!(
                            "{} of {} packets unacknowledged",
                            delivery.unacknowledged, delivery.packets
                        );
                    }
                    delivery.unacknowledged == 0
                }),
        };

        match delivered {
            Ok(true) => {
                self.windows_sent = self.windows_sent.wrapping_add(1);
                debug!("window at {} ms sent", window.started_at.as_millis());
            }
            Ok(false) | Err(_) => {
                self.windows_failed = self.windows_failed.wrapping_add(1);
                warn!("window at {} ms not delivered", window.started_at.as_millis());
            }
        }

        if self.config.window_holdoff_ms > 0 {
            self.delay.delay_ms(self.config.window_holdoff_ms);
        }
        window.data.reset();
        true
    }

    /// Polls forever.
    pub fn run(&mut self) -> ! {
        loop {
            let _ = self.poll();
        }
    }

    /// Settings in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Radio counters.
    pub fn radio(&self) -> &RadioTransport {
        &self.radio
    }

    /// Gives back the link and delay.
    pub fn release(self) -> (L, D) {
        (self.link, self.delay)
    }
}
