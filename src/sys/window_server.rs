use objc2::rc::{Retained, autoreleasepool};
use objc2::runtime::AnyObject;
use objc2_core_foundation::{CFArray, CFDictionary, CFRetained, CGRect};
use objc2_core_graphics::{
    CGImage, CGRectMakeWithDictionaryRepresentation, CGRectNull, CGWindowImageOption,
    CGWindowListCopyWindowInfo, CGWindowListCreateImage, CGWindowListOption, kCGNullWindowID,
};
use objc2_foundation::{NSArray, NSDictionary, NSNumber, NSString, ns_string};
use tracing::{debug, trace};

pub use crate::model::window::{WindowListEntry, WindowServerId, frontmost_window_id};

/// On-screen windows, front to back, as reported by the window server.
pub fn on_screen_windows() -> Vec<WindowListEntry> {
    autoreleasepool(|_| {
        let options =
            CGWindowListOption::OptionOnScreenOnly | CGWindowListOption::ExcludeDesktopElements;
        let Some(list) = CGWindowListCopyWindowInfo(options, kCGNullWindowID) else {
            debug!("CGWindowListCopyWindowInfo returned nothing");
            return Vec::new();
        };
        // Toll-free bridged; the dictionaries are easier to read through Foundation.
        let list = unsafe { &*(&*list as *const CFArray as *const WindowInfoList) };
        let entries: Vec<_> = list.iter().filter_map(|info| parse_entry(&info)).collect();
        trace!(count = entries.len(), "window list");
        entries
    })
}

type WindowInfoList = NSArray<NSDictionary<NSString, AnyObject>>;

/// The window that currently has focus, if the window server knows.
pub fn frontmost_window() -> Option<WindowServerId> { frontmost_window_id(&on_screen_windows()) }

fn number(info: &NSDictionary<NSString, AnyObject>, key: &NSString) -> Option<Retained<NSNumber>> {
    info.objectForKey(key)?.downcast::<NSNumber>().ok()
}

fn string(info: &NSDictionary<NSString, AnyObject>, key: &NSString) -> Option<String> {
    let value = info.objectForKey(key)?.downcast::<NSString>().ok()?;
    Some(value.to_string())
}

fn parse_entry(info: &NSDictionary<NSString, AnyObject>) -> Option<WindowListEntry> {
    let id = number(info, ns_string!("kCGWindowNumber"))?.as_u32();
    let bounds_dict = info.objectForKey(ns_string!("kCGWindowBounds"))?;
    let mut bounds = CGRect::ZERO;
    let bounds_dict = unsafe { &*(Retained::as_ptr(&bounds_dict) as *const CFDictionary) };
    let ok = unsafe { CGRectMakeWithDictionaryRepresentation(Some(bounds_dict), &mut bounds) };
    if !ok {
        return None;
    }
    Some(WindowListEntry {
        id: WindowServerId::new(id),
        layer: number(info, ns_string!("kCGWindowLayer")).map_or(0, |n| n.as_i32()),
        owner_pid: number(info, ns_string!("kCGWindowOwnerPID"))?.as_i32(),
        owner_name: string(info, ns_string!("kCGWindowOwnerName")).unwrap_or_default(),
        name: string(info, ns_string!("kCGWindowName")),
        bounds: bounds.into(),
    })
}

/// Captures the current contents of a single window.
pub fn capture_window(id: WindowServerId) -> Option<CFRetained<CGImage>> {
    if !id.is_known() {
        return None;
    }
    #[allow(deprecated)]
    CGWindowListCreateImage(
        unsafe { CGRectNull },
        CGWindowListOption::OptionIncludingWindow,
        id.get(),
        CGWindowImageOption::BoundsIgnoreFraming | CGWindowImageOption::BestResolution,
    )
}
