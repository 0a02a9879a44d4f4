//! Mock collaborators shared by the integration tests.
//!
//! Scripts run out into ctrl-alt-del: a mock terminal or serial port with
//! an attached hot-key raises it once its input is exhausted, so every
//! blocking loop under test terminates.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use vga_ansi_terminal::config::MemoryStorage;
use vga_ansi_terminal::fault::{Fault, HotKey};
use vga_ansi_terminal::hal::{
    Audio, Beep, KeyTable, SerialPort, StatusLed, SystemInfo, SystemMonitor, Terminal,
    TerminalFactory, TerminalFlags, UsbHost, VideoController,
};
use vga_ansi_terminal::video::{Plane, SharedPixmap, VgaMode};
use vga_ansi_terminal::{Devices, Supervisor};

/// A hot-key that outlives every borrow in the test.
pub fn leaked_hotkey() -> &'static HotKey {
    Box::leak(Box::new(HotKey::new()))
}

/// Cursor down.
pub const DOWN: &[u8] = b"\x1b[B";
/// Cursor up.
pub const UP: &[u8] = b"\x1b[A";
/// Cursor left.
pub const LEFT: &[u8] = b"\x1b[D";
/// Double ESC.
pub const LEAVE: &[u8] = b"\x1b\x1b";

/// Concatenate key sequences into one script.
pub fn keys(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

/// `n` cursor-down presses.
pub fn downs(n: usize) -> Vec<u8> {
    DOWN.repeat(n)
}

// ----------------------------------------------------------------------------
// Terminal
// ----------------------------------------------------------------------------

#[derive(Default)]
pub struct TermState {
    /// Keyboard bytes handed out by `getc`.
    pub input: VecDeque<u8>,
    /// Everything written to the screen.
    pub output: String,
    /// Bytes fed from the host via `putc`.
    pub received: Vec<u8>,
    pub defaults: TerminalFlags,
    pub hard_resets: u32,
    pub identified: bool,
    /// Pixmap size the terminal was opened on.
    pub surface: (u32, u32),
}

pub struct MockTerminal {
    pub state: Rc<RefCell<TermState>>,
    pub flags: TerminalFlags,
    pub hotkey: Option<&'static HotKey>,
}

impl MockTerminal {
    pub fn new(input: &[u8]) -> Self {
        let state = TermState {
            input: input.iter().copied().collect(),
            ..TermState::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
            flags: TerminalFlags::default(),
            hotkey: None,
        }
    }

    pub fn with_hotkey(mut self, hotkey: &'static HotKey) -> Self {
        self.hotkey = Some(hotkey);
        self
    }

    pub fn output(&self) -> String {
        self.state.borrow().output.clone()
    }

    pub fn clear_output(&self) {
        self.state.borrow_mut().output.clear();
    }
}

impl core::fmt::Write for MockTerminal {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.state.borrow_mut().output.push_str(s);
        Ok(())
    }
}

impl Terminal for MockTerminal {
    fn putc(&mut self, byte: u8) {
        self.state.borrow_mut().received.push(byte);
    }

    fn getc(&mut self) -> Option<u8> {
        let byte = self.state.borrow_mut().input.pop_front();
        if byte.is_none() {
            if let Some(hotkey) = self.hotkey {
                hotkey.raise();
            }
        }
        byte
    }

    fn flags(&self) -> TerminalFlags {
        self.flags
    }

    fn flags_mut(&mut self) -> &mut TerminalFlags {
        &mut self.flags
    }

    fn set_defaults(&mut self, defaults: TerminalFlags) {
        self.state.borrow_mut().defaults = defaults;
    }

    fn reset(&mut self, hard: bool) {
        let mut state = self.state.borrow_mut();
        self.flags = state.defaults;
        if hard {
            state.hard_resets += 1;
        }
    }

    fn identify(&mut self) {
        let mut state = self.state.borrow_mut();
        state.identified = true;
        state.output.push_str("MOCKTERM\n");
    }
}

/// Hands out one scripted terminal per session.
#[derive(Default)]
pub struct MockTerminals {
    pub scripts: VecDeque<Vec<u8>>,
    pub sessions: Vec<Rc<RefCell<TermState>>>,
    pub hotkey: Option<&'static HotKey>,
    pub fail_next: Option<Fault>,
}

impl MockTerminals {
    pub fn session(&self, i: usize) -> std::cell::Ref<'_, TermState> {
        self.sessions[i].borrow()
    }
}

impl TerminalFactory for MockTerminals {
    fn open(&mut self, surface: SharedPixmap) -> Result<Box<dyn Terminal>, Fault> {
        if let Some(fault) = self.fail_next.take() {
            return Err(fault);
        }
        let script = self.scripts.pop_front().unwrap_or_default();
        let mut terminal = MockTerminal::new(&script);
        terminal.hotkey = self.hotkey;
        {
            let pm = surface.borrow();
            terminal.state.borrow_mut().surface = (pm.width(), pm.height());
        }
        self.sessions.push(terminal.state.clone());
        Ok(Box::new(terminal))
    }
}

// ----------------------------------------------------------------------------
// Serial
// ----------------------------------------------------------------------------

#[derive(Default)]
pub struct MockSerial {
    /// One entry per `read_byte` call; `None` is an idle poll.
    pub rx: VecDeque<Option<u8>>,
    pub tx: Vec<u8>,
    pub bauds: Vec<u32>,
    pub hotkey: Option<&'static HotKey>,
}

impl MockSerial {
    pub fn script(rx: &[Option<u8>]) -> Self {
        Self {
            rx: rx.iter().copied().collect(),
            ..Self::default()
        }
    }
}

impl SerialPort for MockSerial {
    fn read_byte(&mut self) -> Option<u8> {
        match self.rx.pop_front() {
            Some(slot) => slot,
            None => {
                if let Some(hotkey) = self.hotkey {
                    hotkey.raise();
                }
                None
            }
        }
    }

    fn write_byte(&mut self, byte: u8) {
        self.tx.push(byte);
    }

    fn set_baud_rate(&mut self, baud: u32) {
        self.bauds.push(baud);
    }
}

// ----------------------------------------------------------------------------
// Video
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoEvent {
    FrameBuffer(u32, u32),
    Mouse,
    Start(&'static str),
    Stop,
}

#[derive(Default)]
pub struct MockVideo {
    pub events: Vec<VideoEvent>,
    pub fail_start: Option<Fault>,
}

impl MockVideo {
    /// Events of session `i`, split at each stop.
    pub fn session(&self, i: usize) -> Vec<VideoEvent> {
        self.events
            .split(|e| *e == VideoEvent::Stop)
            .nth(i)
            .map(|s| s.to_vec())
            .unwrap_or_default()
    }

    pub fn stops(&self) -> usize {
        self.events.iter().filter(|e| **e == VideoEvent::Stop).count()
    }
}

impl VideoController for MockVideo {
    fn add_plane(&mut self, plane: Plane) -> Result<(), Fault> {
        self.events.push(match plane {
            Plane::FrameBuffer(pm) => {
                let pm = pm.borrow();
                VideoEvent::FrameBuffer(pm.width(), pm.height())
            }
            Plane::MousePointer(_) => VideoEvent::Mouse,
        });
        Ok(())
    }

    fn start_video(&mut self, mode: &'static VgaMode, _baseline: u32, _buffers: u32) -> Result<(), Fault> {
        if let Some(fault) = self.fail_start.take() {
            return Err(fault);
        }
        self.events.push(VideoEvent::Start(mode.name));
        Ok(())
    }

    fn stop_video(&mut self) {
        self.events.push(VideoEvent::Stop);
    }
}

// ----------------------------------------------------------------------------
// Background facades
// ----------------------------------------------------------------------------

pub struct MockUsb {
    pub keyboard: Cell<bool>,
    pub mouse: Cell<bool>,
    pub inited: Cell<bool>,
    pub polls: Cell<u32>,
    pub tables: RefCell<Vec<&'static str>>,
}

impl Default for MockUsb {
    fn default() -> Self {
        Self {
            keyboard: Cell::new(true),
            mouse: Cell::new(false),
            inited: Cell::new(false),
            polls: Cell::new(0),
            tables: RefCell::new(Vec::new()),
        }
    }
}

impl UsbHost for MockUsb {
    fn init(&self) {
        self.inited.set(true);
    }

    fn poll(&self) {
        self.polls.set(self.polls.get() + 1);
    }

    fn keyboard_present(&self) -> bool {
        self.keyboard.get()
    }

    fn mouse_present(&self) -> bool {
        self.mouse.get()
    }

    fn set_key_table(&self, table: &'static KeyTable) {
        self.tables.borrow_mut().push(table.name);
    }
}

/// Clock that advances by `step_us` on every read.
pub struct MockSystem {
    pub now: Cell<u64>,
    pub step_us: u64,
    pub load_started: Cell<bool>,
}

impl Default for MockSystem {
    fn default() -> Self {
        Self {
            now: Cell::new(0),
            step_us: 1_000,
            load_started: Cell::new(false),
        }
    }
}

impl SystemMonitor for MockSystem {
    fn now_us(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now + self.step_us);
        now
    }

    fn start_load_sensor(&self) {
        self.load_started.set(true);
    }

    fn info(&self) -> SystemInfo {
        SystemInfo {
            core: 0,
            heap_size: 262_144,
            free_chunks: vec![100_000, 2_048],
            stack_free: 3_000,
            sysclock_hz: 240_000_000,
            ..SystemInfo::default()
        }
    }
}

#[derive(Default)]
pub struct MockAudio {
    pub started: Cell<bool>,
    pub beeps: RefCell<Vec<Beep>>,
}

impl Audio for MockAudio {
    fn start(&self) {
        self.started.set(true);
    }

    fn beep(&self, beep: Beep) {
        self.beeps.borrow_mut().push(beep);
    }
}

#[derive(Default)]
pub struct MockLed {
    pub on: Cell<bool>,
    pub toggles: Cell<u32>,
}

impl StatusLed for MockLed {
    fn set(&self, on: bool) {
        if self.on.get() != on {
            self.toggles.set(self.toggles.get() + 1);
        }
        self.on.set(on);
    }
}

// ----------------------------------------------------------------------------
// Whole board
// ----------------------------------------------------------------------------

pub struct Rig {
    pub usb: MockUsb,
    pub video: MockVideo,
    pub serial: MockSerial,
    pub terminals: MockTerminals,
    pub system: MockSystem,
    pub audio: MockAudio,
    pub led: MockLed,
    pub storage: MemoryStorage,
    pub hotkey: &'static HotKey,
}

impl Rig {
    /// Board with erased flash, a keyboard attached and one terminal
    /// script per session.
    pub fn new(scripts: &[&[u8]]) -> Self {
        let hotkey = leaked_hotkey();
        Self {
            usb: MockUsb::default(),
            video: MockVideo::default(),
            serial: MockSerial::default(),
            terminals: MockTerminals {
                scripts: scripts.iter().map(|s| s.to_vec()).collect(),
                hotkey: Some(hotkey),
                ..MockTerminals::default()
            },
            system: MockSystem::default(),
            audio: MockAudio::default(),
            led: MockLed::default(),
            storage: MemoryStorage::new(),
            hotkey,
        }
    }

    pub fn supervisor(&mut self) -> Supervisor<'_> {
        let devices = Devices {
            usb: &self.usb,
            video: &mut self.video,
            serial: &mut self.serial,
            terminals: &mut self.terminals,
            system: &self.system,
            audio: &self.audio,
            led: &self.led,
            log_sink: None,
        };
        Supervisor::bootstrap(devices, &mut self.storage, self.hotkey)
    }
}
