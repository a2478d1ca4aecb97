pub mod ax_token;
pub mod geometry;
pub mod hotkey;

#[cfg(target_os = "macos")]
pub mod app;
#[cfg(target_os = "macos")]
pub mod axuielement;
#[cfg(target_os = "macos")]
pub mod discovery;
#[cfg(target_os = "macos")]
pub mod event_tap;
#[cfg(target_os = "macos")]
pub mod executor;
#[cfg(target_os = "macos")]
pub mod permissions;
#[cfg(target_os = "macos")]
pub mod run_loop;
#[cfg(target_os = "macos")]
pub mod signal;
#[cfg(target_os = "macos")]
pub mod skylight;
#[cfg(target_os = "macos")]
pub mod window_server;
