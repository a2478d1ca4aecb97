//! Remote tokens for `_AXUIElementCreateWithRemoteToken`.
//!
//! The accessibility server will hand out an element for any (pid, element
//! id) pair encoded this way, including windows that `AXWindows` does not
//! report (windows on other spaces, some minimized windows). Probing a
//! range of element ids is the only known way to find them.

use nix::libc::pid_t;

pub const REMOTE_TOKEN_LEN: usize = 20;

/// Marker the accessibility server expects in bytes 8..12 ("coco").
pub const REMOTE_TOKEN_MAGIC: i32 = 0x636f_636f;

/// Encodes the token for element `element_id` of process `pid`.
///
/// Layout (native endian): pid `i32`, zero `i32`, magic `i32`, element id
/// `u64`.
pub fn remote_token(pid: pid_t, element_id: u64) -> [u8; REMOTE_TOKEN_LEN] {
    let mut token = [0u8; REMOTE_TOKEN_LEN];
    token[0..4].copy_from_slice(&pid.to_ne_bytes());
    token[4..8].copy_from_slice(&0i32.to_ne_bytes());
    token[8..12].copy_from_slice(&REMOTE_TOKEN_MAGIC.to_ne_bytes());
    token[12..20].copy_from_slice(&element_id.to_ne_bytes());
    token
}
