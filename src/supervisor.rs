//! Top-level session loop.
//!
//! ```text
//! bootstrap ──▶ ┌─ acquire ──▶ run ──▶ teardown ─┐
//!               └────────────────────────────────┘  (forever)
//! ```
//!
//! Every session rebuilds video and terminal from the live settings. A
//! session that ends in a fault (ctrl-alt-del included) makes the next one
//! start in the safe video mode, without the mouse plane, straight into the
//! setup menu with the fault reason as its banner.

use alloc::borrow::Cow;

use crate::bridge::{self, SerialBridge};
use crate::config::defaults::{KEYBOARD_WAIT_US, SCANLINE_BUFFER_SIZE};
use crate::config::store::LoadResult;
use crate::config::{ConfigStore, Settings, SettingsStorage};
use crate::context::Context;
use crate::diagnostics::{print_system_info, VERSION};
use crate::fault::{Fault, HotKey, SessionError};
use crate::hal::{Audio, SerialPort, StatusLed, SystemMonitor, TerminalFactory, UsbHost, VideoController};
use crate::logging::log_stream;
use crate::menu::{MenuEnv, MenuExit, SetupMenu};
use crate::scheduler::{self, Scheduler};
use crate::uart_logger::LogSink;
use crate::video::{MousePointer, Pixmap, Plane, SAFE_VGA_MODE};
use crate::{rt_error, rt_info, rt_warn};

/// Board collaborators handed to the Supervisor at boot.
pub struct Devices<'a> {
    pub usb: &'a dyn UsbHost,
    pub video: &'a mut dyn VideoController,
    pub serial: &'a mut dyn SerialPort,
    pub terminals: &'a mut dyn TerminalFactory,
    pub system: &'a dyn SystemMonitor,
    pub audio: &'a dyn Audio,
    pub led: &'a dyn StatusLed,
    /// Debug log output, if the board has one.
    pub log_sink: Option<&'a dyn LogSink>,
}

pub struct Supervisor<'a> {
    ctx: Context<'a>,
    scheduler: Scheduler<'a>,
    usb: &'a dyn UsbHost,
    video: &'a mut dyn VideoController,
    serial: &'a mut dyn SerialPort,
    terminals: &'a mut dyn TerminalFactory,
    system: &'a dyn SystemMonitor,
    audio: &'a dyn Audio,
    bridge: SerialBridge,
    error: SessionError,
    sessions: u32,
}

impl<'a> Supervisor<'a> {
    /// Bring up USB, load the settings, register the background handlers
    /// and give the keyboard time to enumerate.
    pub fn bootstrap(
        devices: Devices<'a>,
        storage: &'a mut dyn SettingsStorage,
        hotkey: &'a HotKey,
    ) -> Self {
        let Devices {
            usb,
            video,
            serial,
            terminals,
            system,
            audio,
            led,
            log_sink,
        } = devices;
        let now = || system.now_us() as i64;

        rt_info!(log_stream(), now(), "{}", VERSION);
        usb.init();
        system.start_load_sensor();

        let mut store = ConfigStore::new(storage);
        let (settings, loaded) = store.load_with_result();
        match &loaded {
            LoadResult::Stored => rt_info!(log_stream(), now(), "settings loaded"),
            LoadResult::FreshInstall => rt_info!(log_stream(), now(), "no settings stored, using defaults"),
            LoadResult::Invalid => rt_warn!(log_stream(), now(), "stored settings invalid, using defaults"),
            LoadResult::ReadFailed(e) => rt_warn!(log_stream(), now(), "settings read failed: {}", e),
        }

        let mut scheduler = Scheduler::new();
        scheduler.add_handler(scheduler::heartbeat(led, system));
        scheduler.add_handler(scheduler::usb_poll(usb));
        if let Some(sink) = log_sink {
            scheduler.add_handler(scheduler::log_drain(log_stream(), sink, system));
        }

        audio.start();

        let wait_end = system.now_us() + KEYBOARD_WAIT_US;
        while !usb.keyboard_present() {
            if system.now_us() >= wait_end {
                rt_warn!(log_stream(), now(), "no keyboard detected");
                break;
            }
            scheduler.run();
        }

        Self {
            ctx: Context {
                settings,
                hotkey,
                store,
                system,
            },
            scheduler,
            usb,
            video,
            serial,
            terminals,
            system,
            audio,
            bridge: SerialBridge::new(),
            error: SessionError::NoError,
            sessions: 0,
        }
    }

    /// Run sessions forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.run_session();
        }
    }

    /// One acquire → run → teardown cycle. Returns the error that selects
    /// the next session's mode.
    pub fn run_session(&mut self) -> &SessionError {
        self.sessions += 1;
        let outcome = self.session();
        self.video.stop_video();

        self.error = match outcome {
            Ok(()) => SessionError::NoError,
            Err(fault) => {
                rt_error!(log_stream(), self.ctx.now_us(), "session {}: {}", self.sessions, fault);
                fault.into()
            }
        };
        if self.ctx.hotkey.take() {
            rt_info!(log_stream(), self.ctx.now_us(), "ctrl-alt-del #{}", self.ctx.hotkey.count());
            if !self.error.is_error() {
                self.error = Fault::HotKey.into();
            }
        }
        &self.error
    }

    fn session(&mut self) -> Result<(), Fault> {
        let settings = self.ctx.settings;
        let faulted = self.error.is_error();

        self.usb.set_key_table(settings.keyboard());
        self.serial.set_baud_rate(settings.baud_rate());

        let mode = if faulted { SAFE_VGA_MODE } else { settings.vga_mode() };
        rt_info!(
            log_stream(),
            self.ctx.now_us(),
            "session {}: {} {} baud, kbd {}",
            self.sessions,
            mode,
            settings.baud_rate(),
            settings.keyboard()
        );

        let surface = Pixmap::for_mode(mode)?.into_shared();
        self.video.add_plane(Plane::FrameBuffer(surface.clone()))?;
        if !faulted && settings.enable_mouse {
            self.video.add_plane(Plane::MousePointer(MousePointer::default()))?;
        }
        self.video.start_video(mode, 0, SCANLINE_BUFFER_SIZE)?;

        let mut terminal = self.terminals.open(surface)?;
        let terminal = terminal.as_mut();

        if faulted {
            let banner = match &self.error {
                SessionError::Reason(reason) => reason.clone(),
                SessionError::NoError => Cow::Borrowed(""),
            };
            let mut menu = SetupMenu::new(&settings, banner);
            let mut env = MenuEnv {
                ctx: &mut self.ctx,
                scheduler: &mut self.scheduler,
                usb: self.usb,
                audio: self.audio,
            };
            let exit = menu.run(&mut env, terminal);
            if exit != MenuExit::HotKey {
                rt_info!(log_stream(), self.ctx.now_us(), "setup done: {:?}", exit);
            }
        } else {
            terminal.set_defaults(settings.terminal_defaults());
            terminal.reset(true);
            terminal.identify();
            let info = self.system.info();
            print_system_info(terminal, &info, &settings, self.usb);
            let _ = terminal.write_str("press ctrl-alt-del to enter setup\n\r");
            let _ = terminal.write_str("READY\n\n\r");

            self.bridge = SerialBridge::new();
            self.bridge
                .run(&mut *self.serial, terminal, &mut self.scheduler, self.ctx.hotkey);
        }
        Ok(())
    }

    /// Error left by the last session.
    pub fn last_error(&self) -> &SessionError {
        &self.error
    }

    /// Live settings.
    pub fn settings(&self) -> &Settings {
        &self.ctx.settings
    }

    /// Completed plus running sessions.
    pub fn sessions(&self) -> u32 {
        self.sessions
    }

    pub fn scheduler_ticks(&self) -> u64 {
        self.scheduler.ticks()
    }

    /// Board clock-change notification: the UART divisor follows the
    /// peripheral clock, so the live baud rate is applied again.
    pub fn sysclock_changed(&mut self) {
        bridge::sysclock_changed(&mut *self.serial, &self.ctx.settings);
    }
}
