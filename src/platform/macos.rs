//! macOS input backend
//!
//! Trust queries go through the Accessibility API (`AXIsProcessTrusted*`),
//! pointer sampling and injection through CoreGraphics events (top-left
//! oriented screen coordinates, consistent between sample and inject), and
//! key listening through `NSEvent` global/local monitors.
//!
//! Monitor registration and removal must happen on the main thread; the
//! process root constructs the backend and holds the listener handles there.

use std::ptr::NonNull;

use block2::RcBlock;
use core_graphics::event::{CGEvent, CGEventTapLocation, CGEventType, CGMouseButton};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;
use objc2_app_kit::{NSEvent, NSEventMask, NSEventModifierFlags};

use crate::platform::{InputBackend, KeyHandler, ListenerHandle, ListenerScope};
use crate::tracker::types::{KeyEvent, Modifiers, PointerPosition};
use crate::tracker::{TrackerError, TrackerResult};

/// Deep link to the Accessibility section of Privacy & Security settings.
const ACCESSIBILITY_SETTINGS_URL: &str =
    "x-apple.systempreferences:com.apple.preference.security?Privacy_Accessibility";

pub struct MacosBackend;

impl MacosBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MacosBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn hid_event_source() -> TrackerResult<CGEventSource> {
    CGEventSource::new(CGEventSourceStateID::HIDSystemState)
        .map_err(|_| TrackerError::Platform("failed to create CGEventSource".into()))
}

impl InputBackend for MacosBackend {
    fn query_trust(&self, prompt: bool) -> TrackerResult<bool> {
        use core_foundation::base::TCFType;
        use core_foundation::boolean::CFBoolean;
        use core_foundation::dictionary::CFDictionary;
        use core_foundation::string::CFString;

        extern "C" {
            fn AXIsProcessTrustedWithOptions(options: core_foundation::base::CFTypeRef) -> bool;
        }

        let key = CFString::new("AXTrustedCheckOptionPrompt");
        let value = if prompt {
            CFBoolean::true_value()
        } else {
            CFBoolean::false_value()
        };
        let options = CFDictionary::from_CFType_pairs(&[(key.as_CFType(), value.as_CFType())]);

        let trusted = unsafe { AXIsProcessTrustedWithOptions(options.as_concrete_TypeRef() as _) };
        Ok(trusted)
    }

    fn open_permission_settings(&self) {
        // The grant is keyed to the bundle; a bare executable may not get a
        // working checkbox in the settings pane.
        if let Ok(exe) = std::env::current_exe() {
            if !exe.to_string_lossy().contains(".app/") {
                tracing::warn!(
                    "Not running from a .app bundle; the accessibility grant may not apply"
                );
            }
        }

        if let Err(err) = open::that_detached(ACCESSIBILITY_SETTINGS_URL) {
            tracing::warn!("Failed to open system settings: {err}");
        }
    }

    fn sample_pointer(&self) -> TrackerResult<PointerPosition> {
        let event = CGEvent::new(hid_event_source()?)
            .map_err(|_| TrackerError::Platform("failed to create CGEvent".into()))?;
        let location = event.location();
        Ok(PointerPosition::new(location.x, location.y))
    }

    fn inject_pointer_move(&self, position: PointerPosition) -> TrackerResult<()> {
        let event = CGEvent::new_mouse_event(
            hid_event_source()?,
            CGEventType::MouseMoved,
            CGPoint::new(position.x, position.y),
            CGMouseButton::Left,
        )
        .map_err(|_| TrackerError::Platform("failed to create mouse-move CGEvent".into()))?;
        event.post(CGEventTapLocation::HID);
        Ok(())
    }

    fn register_key_listener(
        &self,
        scope: ListenerScope,
        handler: KeyHandler,
    ) -> TrackerResult<ListenerHandle> {
        let mask = NSEventMask::NSEventMaskKeyDown;

        match scope {
            ListenerScope::Global => {
                let block = RcBlock::new(move |event: NonNull<NSEvent>| {
                    handler(key_event_from(unsafe { event.as_ref() }));
                });
                let monitor = unsafe {
                    NSEvent::addGlobalMonitorForEventsMatchingMask_handler(mask, &block)
                }
                .ok_or_else(|| {
                    TrackerError::ListenerRegistration("global key monitor".into())
                })?;
                Ok(ListenerHandle::new(move || unsafe {
                    NSEvent::removeMonitor(&monitor);
                }))
            }
            ListenerScope::Local => {
                // Local monitors return the event to keep it in the delivery
                // chain; we observe and pass it through untouched.
                let block = RcBlock::new(move |event: NonNull<NSEvent>| -> *mut NSEvent {
                    handler(key_event_from(unsafe { event.as_ref() }));
                    event.as_ptr()
                });
                let monitor = unsafe {
                    NSEvent::addLocalMonitorForEventsMatchingMask_handler(mask, &block)
                }
                .ok_or_else(|| {
                    TrackerError::ListenerRegistration("local key monitor".into())
                })?;
                Ok(ListenerHandle::new(move || unsafe {
                    NSEvent::removeMonitor(&monitor);
                }))
            }
        }
    }
}

fn key_event_from(event: &NSEvent) -> KeyEvent {
    let timestamp = unsafe { event.timestamp() };
    KeyEvent {
        key_code: unsafe { event.keyCode() },
        modifiers: modifiers_from_flags(unsafe { event.modifierFlags() }),
        timestamp_us: (timestamp * 1_000_000.0) as u64,
    }
}

fn modifiers_from_flags(flags: NSEventModifierFlags) -> Modifiers {
    // NSEventModifierFlags is a newtype struct - use bitwise AND
    Modifiers {
        shift: (flags.0 & NSEventModifierFlags::NSEventModifierFlagShift.0) != 0,
        control: (flags.0 & NSEventModifierFlags::NSEventModifierFlagControl.0) != 0,
        option: (flags.0 & NSEventModifierFlags::NSEventModifierFlagOption.0) != 0,
        command: (flags.0 & NSEventModifierFlags::NSEventModifierFlagCommand.0) != 0,
    }
}
