pub mod console;
#[cfg(target_os = "macos")]
pub mod overlay;
