//! Linux output enumeration via the X11 RandR extension.
//!
//! Outputs come from `XRRGetScreenResourcesCurrent`; each connected output's
//! position and size come from the CRTC driving it, and its physical size
//! from the output info (millimetres).
//!
//! RandR 1.5 *monitors* (`XRRGetMonitors`) are reported as grouping units:
//! every output of one monitor carries the monitor's index in
//! [`OutputDescriptor::unit`], so the `NativeUnits` merge policy turns a
//! tiled panel driven over two connectors into a single screen.  The RandR
//! primary output is enumerated first.
//!
//! Change notifications (`RRScreenChangeNotify`, `RRNotify`) are read from
//! the display connection in [`dispatch_pending`](OutputSource::dispatch_pending).

use std::collections::HashMap;
use std::ffi::c_int;
use std::sync::{Mutex, PoisonError};

use screen_core::{Area, OutputDescriptor, OutputId, PhysicalSize};
use tracing::{debug, warn};
use x11::{xlib, xrandr};

use crate::application::scan_screens::{OutputChangeCallback, OutputQueryError, OutputSource};

/// An open display connection with RandR change events selected.
struct DisplayHandle {
    display: *mut xlib::Display,
    root: xlib::Window,
}

// SAFETY: the raw display pointer is only ever used while the surrounding
// `Mutex` is held, so Xlib never sees concurrent calls on this connection.
unsafe impl Send for DisplayHandle {}

impl Drop for DisplayHandle {
    fn drop(&mut self) {
        // SAFETY: `display` was returned non-null by XOpenDisplay and is not
        // used after this point.
        unsafe { xlib::XCloseDisplay(self.display) };
    }
}

/// XRandR implementation of [`OutputSource`].
pub struct XrandrOutputSource {
    handle: Mutex<DisplayHandle>,
    event_base: c_int,
    callbacks: Mutex<Vec<OutputChangeCallback>>,
}

impl XrandrOutputSource {
    /// Connects to the display named by `DISPLAY` and subscribes to RandR
    /// change events.
    ///
    /// # Errors
    ///
    /// Returns [`OutputQueryError::Platform`] if the display cannot be opened
    /// or lacks the RandR extension.
    pub fn open() -> Result<Self, OutputQueryError> {
        // SAFETY: a null name makes Xlib use the DISPLAY environment variable.
        let display = unsafe { xlib::XOpenDisplay(std::ptr::null()) };
        if display.is_null() {
            let display_env = std::env::var("DISPLAY").unwrap_or_else(|_| "<unset>".to_string());
            return Err(OutputQueryError::Platform(format!(
                "XOpenDisplay failed; DISPLAY={display_env}"
            )));
        }
        // SAFETY: `display` is a valid non-null connection.
        let root = unsafe { xlib::XDefaultRootWindow(display) };
        let handle = DisplayHandle { display, root };

        let (mut event_base, mut error_base) = (0, 0);
        // SAFETY: both out-pointers reference live locals.
        let has_randr =
            unsafe { xrandr::XRRQueryExtension(display, &mut event_base, &mut error_base) };
        if has_randr == 0 {
            return Err(OutputQueryError::Platform(
                "X server lacks the RandR extension".to_string(),
            ));
        }

        // SAFETY: `root` belongs to `display`.
        unsafe {
            xrandr::XRRSelectInput(
                display,
                root,
                xrandr::RRScreenChangeNotifyMask | xrandr::RROutputChangeNotifyMask,
            );
        }
        debug!(event_base, "RandR change events selected");

        Ok(Self {
            handle: Mutex::new(handle),
            event_base,
            callbacks: Mutex::new(Vec::new()),
        })
    }
}

impl OutputSource for XrandrOutputSource {
    fn enumerate_outputs(&self) -> Result<Vec<OutputDescriptor>, OutputQueryError> {
        let handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        // SAFETY: the connection is open and exclusively borrowed for the call.
        unsafe { enumerate(handle.display, handle.root) }
    }

    fn on_output_change(&self, callback: OutputChangeCallback) {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(callback);
    }

    fn dispatch_pending(&self) {
        let mut changed = false;
        {
            let handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
            // SAFETY: the connection is open; `event` is fully written by
            // XNextEvent before it is read.
            unsafe {
                while xlib::XPending(handle.display) > 0 {
                    let mut event: xlib::XEvent = std::mem::zeroed();
                    xlib::XNextEvent(handle.display, &mut event);
                    let kind = event.get_type() - self.event_base;
                    if kind == xrandr::RRScreenChangeNotify || kind == xrandr::RRNotify {
                        xrandr::XRRUpdateConfiguration(&mut event);
                        changed = true;
                    }
                }
            }
        }

        if changed {
            debug!("RandR topology changed");
            let callbacks = self.callbacks.lock().unwrap_or_else(PoisonError::into_inner);
            for callback in callbacks.iter() {
                callback();
            }
        }
    }
}

/// Maps each output XID to the index of the RandR monitor containing it.
///
/// # Safety
///
/// `display` must be an open connection and `root` its root window.
unsafe fn monitor_units(display: *mut xlib::Display, root: xlib::Window) -> HashMap<u64, u32> {
    let mut units = HashMap::new();
    let mut count: c_int = 0;
    let monitors = xrandr::XRRGetMonitors(display, root, xlib::True, &mut count);
    if monitors.is_null() {
        return units;
    }
    let monitors_slice = std::slice::from_raw_parts(monitors, count.max(0) as usize);
    for (index, monitor) in monitors_slice.iter().enumerate() {
        if monitor.outputs.is_null() {
            continue;
        }
        let outputs = std::slice::from_raw_parts(monitor.outputs, monitor.noutput.max(0) as usize);
        for output in outputs {
            units.insert(*output as u64, index as u32);
        }
    }
    xrandr::XRRFreeMonitors(monitors);
    units
}

/// Queries every output of the screen.
///
/// # Safety
///
/// `display` must be an open connection and `root` its root window.
unsafe fn enumerate(
    display: *mut xlib::Display,
    root: xlib::Window,
) -> Result<Vec<OutputDescriptor>, OutputQueryError> {
    let resources = xrandr::XRRGetScreenResourcesCurrent(display, root);
    if resources.is_null() {
        return Err(OutputQueryError::Platform(
            "XRRGetScreenResourcesCurrent returned null".to_string(),
        ));
    }

    let units = monitor_units(display, root);
    let primary = xrandr::XRRGetOutputPrimary(display, root);
    let output_ids: &[xrandr::RROutput] = if (*resources).outputs.is_null() {
        &[]
    } else {
        std::slice::from_raw_parts((*resources).outputs, (*resources).noutput.max(0) as usize)
    };

    let mut outputs = Vec::with_capacity(output_ids.len());
    for &xid in output_ids {
        let info = xrandr::XRRGetOutputInfo(display, resources, xid);
        if info.is_null() {
            warn!(xid, "XRRGetOutputInfo returned null; output skipped");
            continue;
        }

        let name_bytes = std::slice::from_raw_parts((*info).name as *const u8, (*info).nameLen.max(0) as usize);
        let name = String::from_utf8_lossy(name_bytes).into_owned();

        let mut geometry = Area::default();
        if (*info).crtc != 0 {
            let crtc = xrandr::XRRGetCrtcInfo(display, resources, (*info).crtc);
            if !crtc.is_null() {
                geometry = Area::new((*crtc).x, (*crtc).y, (*crtc).width, (*crtc).height);
                xrandr::XRRFreeCrtcInfo(crtc);
            }
        }

        let physical = ((*info).mm_width > 0 && (*info).mm_height > 0).then(|| PhysicalSize {
            width_mm: (*info).mm_width as u32,
            height_mm: (*info).mm_height as u32,
        });

        outputs.push(OutputDescriptor {
            id: OutputId(xid as u32),
            name,
            geometry,
            physical,
            connected: (*info).connection == xrandr::RR_Connected as xrandr::Connection,
            unit: units.get(&(xid as u64)).copied(),
        });
        xrandr::XRRFreeOutputInfo(info);
    }
    xrandr::XRRFreeScreenResources(resources);

    // Stable sort: the primary output first, everything else in server order.
    outputs.sort_by_key(|o| u64::from(o.id.0) != primary as u64);
    debug!(count = outputs.len(), "RandR outputs enumerated");
    Ok(outputs)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
