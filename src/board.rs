//! ESP-IDF board bring-up.
//!
//! Wires the on-chip peripherals this crate drives itself (data UART,
//! debug log UART, status LED, NVS, timers) to the board libraries the
//! firmware image links in (USB host, video compositor, terminal engine,
//! audio), then hands everything to the [`Supervisor`] for good.
//!
//! # Pins (ESP32-S3)
//!
//! | Function      | Peripheral | Pin    |
//! |---------------|------------|--------|
//! | data UART TX  | UART2      | GPIO15 |
//! | data UART RX  | UART2      | GPIO16 |
//! | debug log TX  | UART1      | GPIO17 |
//! | status LED    | GPIO       | GPIO2  |

use core::convert::Infallible;

use esp_idf_svc::hal::gpio::{AnyIOPin, PinDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::uart::{self, UartDriver};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys::{self as esp_idf_sys, EspError};

use crate::config::nvs::NvsStorage;
use crate::config::{MemoryStorage, SettingsStorage};
use crate::fault::HotKey;
use crate::hal::esp::{EspLed, EspSystem, EspUart};
use crate::hal::{Audio, SystemMonitor, TerminalFactory, UsbHost, VideoController};
use crate::logging::log_stream;
use crate::supervisor::{Devices, Supervisor};
use crate::uart_logger::{init_uart_logger, LogSink, UartLoggerConfig};
use crate::rt_warn;

/// Board libraries adapted by the firmware image.
pub struct BoardLibs<'a> {
    pub usb: &'a dyn UsbHost,
    pub video: &'a mut dyn VideoController,
    pub terminals: &'a mut dyn TerminalFactory,
    pub audio: &'a dyn Audio,
    /// Raised by the USB keyboard driver on ctrl-alt-del.
    pub hotkey: &'static HotKey,
}

/// Bring up the board and run sessions forever.
///
/// Only returns if a peripheral cannot be claimed.
pub fn start(libs: BoardLibs<'_>) -> Result<Infallible, EspError> {
    esp_idf_sys::link_patches();

    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    let log_tx = init_uart_logger(peripherals.uart1, pins.gpio17, &UartLoggerConfig::default())?;

    // Baud rate is applied per session from the live settings
    let uart_config = uart::config::Config::default().baudrate(Hertz(9600));
    let mut serial = EspUart::new(UartDriver::new(
        peripherals.uart2,
        pins.gpio15,
        pins.gpio16,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )?);

    let led = EspLed::new(PinDriver::output(pins.gpio2)?);
    let system = EspSystem;

    let mut nvs;
    let mut ram;
    let storage: &mut dyn SettingsStorage = match NvsStorage::take() {
        Ok(s) => {
            nvs = s;
            &mut nvs
        }
        Err(e) => {
            rt_warn!(log_stream(), system.now_us() as i64, "nvs unavailable: {}", e);
            ram = MemoryStorage::new();
            &mut ram
        }
    };

    let devices = Devices {
        usb: libs.usb,
        video: libs.video,
        serial: &mut serial,
        terminals: libs.terminals,
        system: &system,
        audio: libs.audio,
        led: &led,
        log_sink: Some(&log_tx as &dyn LogSink),
    };
    Supervisor::bootstrap(devices, storage, libs.hotkey).run()
}
