//! Video modes, pixel surfaces and compositor planes.
//!
//! The compositor itself (scanline generation, colour map, timing) lives
//! outside this crate behind [`crate::hal::VideoController`]. This module
//! only owns what a session has to build before scan-out starts:
//!
//! ```text
//! VgaMode ──▶ Pixmap::try_new ──▶ Plane::FrameBuffer ──▶ add_plane()
//!                                 Plane::MousePointer ─┘   start_video()
//! ```

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::fault::Fault;

/// A VGA timing the compositor can scan out.
#[derive(Debug, PartialEq, Eq)]
pub struct VgaMode {
    /// Short name, also used for compile-time default selection.
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    /// Vertical refresh in Hz.
    pub refresh_hz: u32,
    /// Pixel clock in Hz.
    pub pixel_clock_hz: u32,
}

impl core::fmt::Display for VgaMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

pub const VGA_MODE_320X240_60: VgaMode = VgaMode {
    name: "320x240",
    width: 320,
    height: 240,
    refresh_hz: 60,
    pixel_clock_hz: 12_587_500,
};

pub const VGA_MODE_400X300_60: VgaMode = VgaMode {
    name: "400x300",
    width: 400,
    height: 300,
    refresh_hz: 60,
    pixel_clock_hz: 20_000_000,
};

pub const VGA_MODE_512X384_60: VgaMode = VgaMode {
    name: "512x384",
    width: 512,
    height: 384,
    refresh_hz: 60,
    pixel_clock_hz: 32_500_000,
};

pub const VGA_MODE_640X480_60: VgaMode = VgaMode {
    name: "640x480",
    width: 640,
    height: 480,
    refresh_hz: 60,
    pixel_clock_hz: 25_175_000,
};

pub const VGA_MODE_800X600_60: VgaMode = VgaMode {
    name: "800x600",
    width: 800,
    height: 600,
    refresh_hz: 60,
    pixel_clock_hz: 40_000_000,
};

pub const VGA_MODE_1024X768_60: VgaMode = VgaMode {
    name: "1024x768",
    width: 1024,
    height: 768,
    refresh_hz: 60,
    pixel_clock_hz: 65_000_000,
};

pub const VGA_MODE_640X384_60: VgaMode = VgaMode {
    name: "640x384",
    width: 640,
    height: 384,
    refresh_hz: 60,
    pixel_clock_hz: 25_175_000,
};

/// Mode used for the session after a fault. Every display syncs to it.
pub const SAFE_VGA_MODE: &VgaMode = &VGA_MODE_320X240_60;

/// Height of one attribute cell in pixel rows.
pub const ATTR_HEIGHT: u32 = 12;

/// Pixels covered by one attribute cell horizontally.
const ATTR_WIDTH: u32 = 8;

/// Bytes per attribute cell: foreground and background colour.
const ATTR_BYTES: usize = 2;

/// One-bit-per-pixel surface with a colour attribute per 8×`attr_height` cell.
///
/// The terminal engine draws into it, the compositor reads it during
/// scan-out. Both hold a [`SharedPixmap`] for the duration of a session.
pub struct Pixmap {
    width: u32,
    height: u32,
    attr_height: u32,
    pixels: Vec<u8>,
    attributes: Vec<u8>,
}

pub type SharedPixmap = Rc<RefCell<Pixmap>>;

impl Pixmap {
    /// Allocate a cleared surface.
    ///
    /// Uses fallible reservation: a mode too large for the heap is reported
    /// as a fault instead of aborting, so the degrade policy can recover.
    pub fn try_new(width: u32, height: u32, attr_height: u32) -> Result<Self, Fault> {
        if width == 0 || height == 0 || attr_height == 0 {
            return Err(Fault::Reason("invalid surface size".into()));
        }

        let row_bytes = width.div_ceil(ATTR_WIDTH) as usize;
        let pixel_bytes = row_bytes * height as usize;
        let attr_rows = height.div_ceil(attr_height) as usize;
        let attr_bytes = row_bytes * attr_rows * ATTR_BYTES;

        Ok(Self {
            width,
            height,
            attr_height,
            pixels: zeroed(pixel_bytes)?,
            attributes: zeroed(attr_bytes)?,
        })
    }

    /// Surface sized for a video mode with the default attribute height.
    pub fn for_mode(mode: &VgaMode) -> Result<Self, Fault> {
        Self::try_new(mode.width, mode.height, ATTR_HEIGHT)
    }

    pub fn into_shared(self) -> SharedPixmap {
        Rc::new(RefCell::new(self))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn attr_height(&self) -> u32 {
        self.attr_height
    }

    /// Bytes per pixel row.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.width.div_ceil(ATTR_WIDTH) as usize
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn attributes(&self) -> &[u8] {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut [u8] {
        &mut self.attributes
    }
}

fn zeroed(len: usize) -> Result<Vec<u8>, Fault> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Fault::Reason("out of memory".into()))?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Pointer sprite drawn on top of the framebuffer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MousePointer {
    pub x: i32,
    pub y: i32,
    pub visible: bool,
}

/// A compositable layer. The first plane added is the primary framebuffer.
pub enum Plane {
    FrameBuffer(SharedPixmap),
    MousePointer(MousePointer),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixmap_layout_for_safe_mode() {
        let pm = Pixmap::for_mode(SAFE_VGA_MODE).unwrap();
        assert_eq!(pm.row_bytes(), 40);
        assert_eq!(pm.pixels().len(), 40 * 240);
        // 240 / 12 = 20 attribute rows, 2 bytes per cell
        assert_eq!(pm.attributes().len(), 40 * 20 * 2);
        assert!(pm.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_pixmap_partial_attribute_row() {
        let pm = Pixmap::try_new(400, 300, 12).unwrap();
        assert_eq!(pm.row_bytes(), 50);
        assert_eq!(pm.attributes().len(), 50 * 25 * 2);
    }

    #[test]
    fn test_pixmap_rejects_empty() {
        assert!(Pixmap::try_new(0, 240, 12).is_err());
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(std::format!("{}", VGA_MODE_1024X768_60), "1024x768");
    }
}
