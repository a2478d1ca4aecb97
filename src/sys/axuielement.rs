//! A small safe wrapper over accessibility elements.

use std::ffi::c_void;
use std::fmt::{self, Debug};
use std::ptr::{self, NonNull};

use nix::libc::pid_t;
use objc2_application_services::{AXError, AXUIElement as RawElement, AXValue, AXValueType};
use objc2_core_foundation::{
    CFArray, CFData, CFEqual, CFRetained, CFString, CFType, CGPoint, CGSize,
};
use objc2_core_graphics::CGWindowID;

use super::ax_token::remote_token;
use super::skylight::{_AXUIElementCreateWithRemoteToken, _AXUIElementGetWindow};
use crate::model::window::WindowServerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("accessibility call failed: {0:?}")]
    Ax(AXError),
    #[error("attribute not found or of an unexpected type")]
    NotFound,
}

pub type Result<T> = std::result::Result<T, Error>;

fn ax_ok(err: AXError) -> Result<()> {
    if err == AXError::Success { Ok(()) } else { Err(Error::Ax(err)) }
}

#[derive(Clone)]
pub struct AXUIElement(CFRetained<RawElement>);

impl AXUIElement {
    pub fn application(pid: pid_t) -> AXUIElement {
        AXUIElement(unsafe { RawElement::new_application(pid) })
    }

    /// Asks the accessibility server for element `element_id` of `pid`
    /// directly. This reaches windows that `AXWindows` leaves out.
    pub fn from_remote_token(pid: pid_t, element_id: u64) -> Option<AXUIElement> {
        let token = remote_token(pid, element_id);
        let data = CFData::from_bytes(&token);
        let raw = NonNull::new(unsafe { _AXUIElementCreateWithRemoteToken(&data) })?;
        Some(AXUIElement(unsafe { CFRetained::from_raw(raw) }))
    }

    pub fn set_messaging_timeout(&self, seconds: f32) -> Result<()> {
        ax_ok(unsafe { self.0.set_messaging_timeout(seconds) })
    }

    fn attribute(&self, name: &'static str) -> Result<CFRetained<CFType>> {
        let attribute = CFString::from_static_str(name);
        let mut value: *const CFType = ptr::null();
        ax_ok(unsafe { self.0.copy_attribute_value(&attribute, NonNull::from(&mut value)) })?;
        let value = NonNull::new(value.cast_mut()).ok_or(Error::NotFound)?;
        Ok(unsafe { CFRetained::from_raw(value) })
    }

    fn string_attribute(&self, name: &'static str) -> Result<String> {
        let value = self.attribute(name)?;
        let string = value.downcast::<CFString>().map_err(|_| Error::NotFound)?;
        Ok(string.to_string())
    }

    fn value_attribute<T>(&self, name: &'static str, value_type: AXValueType, mut out: T) -> Result<T> {
        let value = self.attribute(name)?;
        let value = value.downcast::<AXValue>().map_err(|_| Error::NotFound)?;
        let ok = unsafe { value.value(value_type, NonNull::from(&mut out).cast::<c_void>()) };
        if ok { Ok(out) } else { Err(Error::NotFound) }
    }

    pub fn windows(&self) -> Result<Vec<AXUIElement>> {
        let value = self.attribute("AXWindows")?;
        let array = value.downcast::<CFArray>().map_err(|_| Error::NotFound)?;
        let array = unsafe { CFRetained::cast_unchecked::<CFArray<RawElement>>(array) };
        Ok(array.iter().map(AXUIElement).collect())
    }

    pub fn subrole(&self) -> Result<String> { self.string_attribute("AXSubrole") }

    pub fn title(&self) -> Result<String> { self.string_attribute("AXTitle") }

    pub fn position(&self) -> Result<CGPoint> {
        self.value_attribute("AXPosition", AXValueType::CGPoint, CGPoint::ZERO)
    }

    pub fn size(&self) -> Result<CGSize> {
        self.value_attribute("AXSize", AXValueType::CGSize, CGSize::ZERO)
    }

    pub fn window_id(&self) -> Result<WindowServerId> {
        let mut id: CGWindowID = 0;
        ax_ok(unsafe { _AXUIElementGetWindow(&self.0, &mut id) })?;
        Ok(WindowServerId::new(id))
    }

    pub fn raise(&self) -> Result<()> { self.perform("AXRaise") }

    pub fn press(&self) -> Result<()> { self.perform("AXPress") }

    fn perform(&self, action: &'static str) -> Result<()> {
        let action = CFString::from_static_str(action);
        ax_ok(unsafe { self.0.perform_action(&action) })
    }

    fn as_cf(&self) -> &CFType { &self.0 }
}

impl PartialEq for AXUIElement {
    fn eq(&self, other: &Self) -> bool { CFEqual(Some(self.as_cf()), Some(other.as_cf())) }
}

impl Eq for AXUIElement {}

impl Debug for AXUIElement {
    // Printing attributes here would message the app.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AXUIElement({:p})", self.as_cf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_elements_compare_by_process() {
        let own = std::process::id() as pid_t;
        let a = AXUIElement::application(own);
        assert_eq!(a, AXUIElement::application(own));
        assert_eq!(a, a.clone());
        assert_ne!(a, AXUIElement::application(1));
        assert!(format!("{a:?}").starts_with("AXUIElement(0x"));
    }
}
