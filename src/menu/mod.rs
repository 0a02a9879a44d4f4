//! Setup menu.
//!
//! Full-screen editor over a working copy of the live settings. Each row
//! shows its pending value inside a marker that is green while it agrees
//! with the live value and red once edited. Nothing reaches the live
//! settings until "save to flash", "exit" or a double ESC.
//!
//! Entered either by ctrl-alt-del or by the Supervisor after a session
//! fault, in which case the fault text is shown as the banner
//! ("fault-entry mode").

pub mod keys;
pub mod rows;

use alloc::borrow::Cow;

use crate::config::Settings;
use crate::context::Context;
use crate::diagnostics::print_system_info;
use crate::hal::{Audio, Terminal, UsbHost, SAVE_BEEP};
use crate::logging::log_stream;
use crate::scheduler::Scheduler;
use crate::{rt_info, rt_warn};

pub use keys::{Decoded, KeyDecoder, MenuKey};
pub use rows::{inked, Inked, Row, RowValue, ROWS};

/// Screen line of the first row.
pub const FIRST_ROW_LINE: usize = 5;

/// Banner shown after saving in fault-entry mode.
pub const SAVED_BANNER: &str = "settings saved";

/// Why the menu returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuExit {
    /// "exit" row selected.
    Exit,
    /// Double ESC.
    Escape,
    /// Ctrl-alt-del while waiting for input.
    HotKey,
}

/// Outcome of one menu key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Redraw the rows and keep going.
    Continue,
    /// Show the system information screen.
    ShowInfo,
    /// Settings saved, stay in the menu.
    Saved,
    Leave(MenuExit),
}

/// Devices and state the menu needs while it owns the terminal.
pub struct MenuEnv<'e, 'a> {
    pub ctx: &'e mut Context<'a>,
    pub scheduler: &'e mut Scheduler<'a>,
    pub usb: &'a dyn UsbHost,
    pub audio: &'a dyn Audio,
}

pub struct SetupMenu {
    working: Settings,
    cursor: usize,
    banner: Cow<'static, str>,
    fault_entry: bool,
    decoder: KeyDecoder,
}

impl SetupMenu {
    /// Start editing a copy of `live`. A non-empty banner selects
    /// fault-entry mode.
    pub fn new(live: &Settings, banner: impl Into<Cow<'static, str>>) -> Self {
        let banner = banner.into();
        Self {
            working: *live,
            cursor: 0,
            fault_entry: !banner.is_empty(),
            banner,
            decoder: KeyDecoder::new(),
        }
    }

    /// Pending settings.
    pub fn working(&self) -> &Settings {
        &self.working
    }

    /// Row under the cursor.
    pub fn row(&self) -> Row {
        ROWS[self.cursor]
    }

    pub fn banner(&self) -> &str {
        &self.banner
    }

    pub fn is_fault_entry(&self) -> bool {
        self.fault_entry
    }

    /// Apply one key to the working copy.
    ///
    /// Save and exit commit the working copy to `ctx.settings`; only save
    /// writes it to storage. Save never leaves the menu.
    pub fn handle_key(&mut self, key: MenuKey, ctx: &mut Context<'_>) -> Action {
        match key {
            MenuKey::Up => {
                self.cursor = (self.cursor + ROWS.len() - 1) % ROWS.len();
                Action::Continue
            }
            MenuKey::Down => {
                self.cursor = (self.cursor + 1) % ROWS.len();
                Action::Continue
            }
            MenuKey::Leave => {
                ctx.settings = self.working;
                rt_info!(log_stream(), ctx.now_us(), "setup: leave");
                Action::Leave(MenuExit::Escape)
            }
            MenuKey::Left => {
                if let Row::Index(field) = self.row() {
                    field.retreat(&mut self.working);
                }
                Action::Continue
            }
            MenuKey::Activate => self.activate(ctx),
        }
    }

    fn activate(&mut self, ctx: &mut Context<'_>) -> Action {
        match self.row() {
            Row::SystemInfo => Action::ShowInfo,
            Row::Index(field) => {
                field.advance(&mut self.working);
                Action::Continue
            }
            Row::Flag(flag) => {
                flag.toggle(&mut self.working);
                Action::Continue
            }
            Row::Save => {
                ctx.settings = self.working;
                let now = ctx.now_us();
                match ctx.store.save(&mut ctx.settings) {
                    Ok(()) => rt_info!(log_stream(), now, "setup: settings saved"),
                    Err(e) => rt_warn!(log_stream(), now, "setup: save failed: {}", e),
                }
                self.working = ctx.settings;
                if self.fault_entry {
                    self.banner = Cow::Borrowed(SAVED_BANNER);
                }
                Action::Saved
            }
            Row::Exit => {
                ctx.settings = self.working;
                rt_info!(log_stream(), ctx.now_us(), "setup: exit");
                Action::Leave(MenuExit::Exit)
            }
        }
    }

    /// Clear the screen and draw banner and key help.
    pub fn draw_header(&self, terminal: &mut dyn Terminal, keyboard_present: bool) {
        let flags = terminal.flags_mut();
        flags.newline_mode = true;
        flags.utf8_mode = false;
        flags.cursor_visible = false;

        let _ = terminal.write_str("\x1b[2J\x1b[H");
        let _ = write!(terminal, "{}\n\n", self.banner);
        let _ = terminal.write_str(if keyboard_present {
            "use cursor keys, space, enter, esc"
        } else {
            "***no keyboard present!***"
        });
    }

    /// Draw every row with its marker, then the `>` cursor.
    pub fn draw_rows(&self, terminal: &mut dyn Terminal, live: &Settings) {
        let _ = write!(terminal, "\x1b[{}H", FIRST_ROW_LINE);
        for (i, row) in ROWS.iter().enumerate() {
            let _ = write!(terminal, "  {:<21}", row.label());
            if let Some(marker) = row.marker(&self.working, live) {
                // Trailing blanks erase a longer previous value
                let _ = write!(terminal, "{}  ", marker);
            }
            if i + 1 < ROWS.len() {
                let _ = terminal.write_str("\n");
            }
        }
        let _ = write!(terminal, "\x1b[{}H>\r", FIRST_ROW_LINE + self.cursor);
    }

    /// Interactive loop. Returns when the menu is left or ctrl-alt-del
    /// is pressed.
    pub fn run(&mut self, env: &mut MenuEnv<'_, '_>, terminal: &mut dyn Terminal) -> MenuExit {
        'screen: loop {
            self.draw_header(terminal, env.usb.keyboard_present());
            loop {
                self.draw_rows(terminal, &env.ctx.settings);

                let _ = terminal.write_str("\x1b[?25h");
                let key = loop {
                    let Some(byte) = wait_byte(env, terminal) else {
                        return MenuExit::HotKey;
                    };
                    match self.decoder.feed(byte) {
                        Decoded::Pending => {}
                        Decoded::Ignored => break None,
                        Decoded::Key(key) => break Some(key),
                    }
                };
                let _ = terminal.write_str("\x1b[?25l");

                let Some(key) = key else { continue };
                match self.handle_key(key, env.ctx) {
                    Action::Continue => {}
                    Action::ShowInfo => {
                        if !self.show_info(env, terminal) {
                            return MenuExit::HotKey;
                        }
                        continue 'screen;
                    }
                    Action::Saved => {
                        env.audio.beep(SAVE_BEEP);
                        continue 'screen;
                    }
                    Action::Leave(exit) => return exit,
                }
            }
        }
    }

    /// System information below the header until any key. Returns false
    /// on ctrl-alt-del.
    fn show_info(&mut self, env: &mut MenuEnv<'_, '_>, terminal: &mut dyn Terminal) -> bool {
        let _ = write!(terminal, "\x1b[{}H\x1b[J", FIRST_ROW_LINE);
        let info = env.ctx.system.info();
        print_system_info(terminal, &info, &env.ctx.settings, env.usb);

        if wait_byte(env, terminal).is_none() {
            return false;
        }
        // Rest of a multi-byte key
        while terminal.getc().is_some() {}
        self.decoder.reset();
        true
    }
}

/// Poll the terminal, ticking the Scheduler on every attempt. `None` once
/// the hot-key flag is seen.
fn wait_byte(env: &mut MenuEnv<'_, '_>, terminal: &mut dyn Terminal) -> Option<u8> {
    loop {
        env.scheduler.run();
        let byte = terminal.getc();
        if env.ctx.hotkey.is_raised() {
            return None;
        }
        if byte.is_some() {
            return byte;
        }
    }
}
