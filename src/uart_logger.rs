//! Debug log output on a TX-only UART.
//!
//! The data UART carries terminal traffic, so logs go to a second,
//! TX-only UART (UART1) wired to a USB-UART adapter:
//!
//! ```text
//! ESP32 UART1 TX ──────▶ USB-UART RX
//!                         └─▶ PC Serial Monitor
//! ```
//!
//! Draining is cooperative: [`LogDrain::tick`] runs from a Scheduler handler
//! and writes a bounded batch per call, so a log burst cannot stall the
//! session loop.

use crate::logging::{LogEntry, LogStream};

#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::gpio;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::peripheral::Peripheral;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::uart::{self, UartTxDriver};

/// Entries written per Scheduler tick.
pub const DRAIN_BATCH: usize = 4;

/// Interval between dropped-message reports.
pub const DROPPED_REPORT_INTERVAL_US: i64 = 10_000_000;

/// Destination for formatted log lines.
pub trait LogSink {
    /// Write bytes; may drop on overflow, must not block for long.
    fn write(&self, bytes: &[u8]);
}

/// UART configuration for logging.
pub struct UartLoggerConfig {
    pub baud_rate: u32,
    pub tx_pin: u8,
}

impl Default for UartLoggerConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115200,
            tx_pin: 17, // UART1 TX, away from the VGA and USB pins
        }
    }
}

/// Format log entry to string.
///
/// Format: `[timestamp_us] LEVEL: message\n`
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    crate::logging::format_to_buffer(
        buf,
        format_args!(
            "[{:10}] {}: {}\n",
            entry.timestamp_us,
            entry.level.as_str(),
            entry.message()
        ),
    )
}

/// Cooperative log drain state.
pub struct LogDrain {
    last_dropped_report: i64,
    format_buf: [u8; 160],
}

impl LogDrain {
    pub const fn new() -> Self {
        Self {
            last_dropped_report: 0,
            format_buf: [0u8; 160],
        }
    }

    /// Write up to [`DRAIN_BATCH`] entries, and the dropped count when due.
    ///
    /// Returns the number of entries written.
    pub fn tick<const N: usize>(&mut self, stream: &LogStream<N>, sink: &dyn LogSink, now_us: i64) -> usize {
        let mut written = 0;
        while written < DRAIN_BATCH {
            let Some(entry) = stream.pop() else { break };
            let len = format_log_entry(&entry, &mut self.format_buf);
            sink.write(&self.format_buf[..len]);
            written += 1;
        }

        if now_us - self.last_dropped_report > DROPPED_REPORT_INTERVAL_US {
            let dropped = stream.take_dropped();
            if dropped > 0 {
                let len = crate::logging::format_to_buffer(
                    &mut self.format_buf,
                    format_args!("[WARN] Dropped: {}\n", dropped),
                );
                sink.write(&self.format_buf[..len]);
            }
            self.last_dropped_report = now_us;
        }

        written
    }
}

impl Default for LogDrain {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize UART1 TX-only for logging output.
#[cfg(target_os = "espidf")]
pub fn init_uart_logger<'d>(
    uart: impl Peripheral<P = esp_idf_svc::hal::uart::UART1> + 'd,
    tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
    config: &UartLoggerConfig,
) -> Result<UartTxDriver<'d>, esp_idf_svc::sys::EspError> {
    let uart_config = uart::config::Config::default()
        .baudrate(esp_idf_svc::hal::units::Hertz(config.baud_rate));

    UartTxDriver::new(
        uart,
        tx_pin,
        Option::<gpio::AnyIOPin>::None, // CTS
        Option::<gpio::AnyIOPin>::None, // RTS
        &uart_config,
    )
}

#[cfg(target_os = "espidf")]
impl LogSink for UartTxDriver<'_> {
    fn write(&self, bytes: &[u8]) {
        // Non-blocking: whatever does not fit the TX FIFO is lost
        let _ = UartTxDriver::write_nb(self, bytes);
    }
}
