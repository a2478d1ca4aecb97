//! An alt-tab style window switcher for macOS.
//!
//! The platform-independent core (window model, session state, paging and
//! overlay geometry, key decoding) lives in [`model`], [`actor`] and the pure
//! parts of [`sys`]. Everything that talks to the window server, the
//! accessibility API or AppKit is compiled on macOS only.

#![cfg_attr(not(target_os = "macos"), allow(dead_code))]

pub mod actor;
pub mod app;
pub mod common;
pub mod model;
pub mod sys;
pub mod ui;
