//! ESP-IDF implementations of the HAL seams.
//!
//! Only the data UART, the status LED and system introspection live here.
//! USB host, video compositor, terminal engine and audio are board
//! libraries linked in by the firmware image and adapted there.

use alloc::vec;
use core::cell::RefCell;

use esp_idf_svc::hal::delay::NON_BLOCK;
use esp_idf_svc::hal::gpio::{Output, OutputPin, PinDriver};
use esp_idf_svc::hal::uart::UartDriver;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys as esp_idf_sys;

use super::{SerialPort, StatusLed, SystemInfo, SystemMonitor};

/// Data UART.
pub struct EspUart<'d> {
    uart: UartDriver<'d>,
}

impl<'d> EspUart<'d> {
    pub fn new(uart: UartDriver<'d>) -> Self {
        Self { uart }
    }
}

impl SerialPort for EspUart<'_> {
    fn read_byte(&mut self) -> Option<u8> {
        let mut buf = [0u8; 1];
        match self.uart.read(&mut buf, NON_BLOCK) {
            Ok(1) => Some(buf[0]),
            _ => None,
        }
    }

    fn write_byte(&mut self, byte: u8) {
        let _ = self.uart.write(&[byte]);
    }

    fn set_baud_rate(&mut self, baud: u32) {
        let _ = self.uart.change_baudrate(Hertz(baud));
    }
}

/// On-board LED.
pub struct EspLed<'d, P: OutputPin> {
    pin: RefCell<PinDriver<'d, P, Output>>,
}

impl<'d, P: OutputPin> EspLed<'d, P> {
    pub fn new(pin: PinDriver<'d, P, Output>) -> Self {
        Self {
            pin: RefCell::new(pin),
        }
    }
}

impl<P: OutputPin> StatusLed for EspLed<'_, P> {
    fn set(&self, on: bool) {
        let mut pin = self.pin.borrow_mut();
        let _ = if on { pin.set_high() } else { pin.set_low() };
    }
}

/// Timer and heap statistics from ESP-IDF.
#[derive(Default)]
pub struct EspSystem;

impl SystemMonitor for EspSystem {
    fn now_us(&self) -> u64 {
        unsafe { esp_idf_sys::esp_timer_get_time() as u64 }
    }

    fn start_load_sensor(&self) {
        // No load sampler on this target; `info().load` stays `None`
    }

    fn info(&self) -> SystemInfo {
        let mut heap = esp_idf_sys::multi_heap_info_t::default();
        unsafe { esp_idf_sys::heap_caps_get_info(&mut heap, esp_idf_sys::MALLOC_CAP_DEFAULT) };
        let total = unsafe { esp_idf_sys::heap_caps_get_total_size(esp_idf_sys::MALLOC_CAP_DEFAULT) };

        let largest = heap.largest_free_block as u32;
        let rest = (heap.total_free_bytes as u32).saturating_sub(largest);
        let mut free_chunks = vec![largest];
        if rest > 0 {
            free_chunks.push(rest);
        }

        SystemInfo {
            core: unsafe { esp_idf_sys::xPortGetCoreID() } as u32,
            heap_size: total as u32,
            free_chunks,
            stack_free: unsafe { esp_idf_sys::uxTaskGetStackHighWaterMark(core::ptr::null_mut()) },
            sysclock_hz: unsafe { esp_idf_sys::ets_get_cpu_frequency() } * 1_000_000,
            ..SystemInfo::default()
        }
    }
}
