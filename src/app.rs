//! Command line entry point shared by the three switcher binaries.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::common::config::{Config, SwitcherSettings};
use crate::common::log::init_logging;
use crate::model::window::WindowInfo;
use crate::sys::hotkey::SymbolicHotKey;

#[derive(Parser, Debug)]
#[command(version, about = "An alt-tab style window switcher for macOS")]
pub struct Cli {
    /// Config file to use instead of ~/.config/rift-switcher/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug output from the switcher
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the switcher (the default)
    Run,
    /// Print the switchable windows once and exit
    List {
        #[arg(long)]
        json: bool,
    },
    /// Re-enable the system Cmd+Tab switcher, e.g. after a crash
    RestoreHotkeys,
}

/// How windows are found and shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Variant {
    /// Window server list, printed to stdout.
    Console,
    /// Window server list, icon grid overlay.
    Icons,
    /// Accessibility discovery, paginated grid with a thumbnail.
    Thumbnails,
}

impl Variant {
    pub fn uses_accessibility(self) -> bool { self == Variant::Thumbnails }

    /// The icon overlay never shows a thumbnail.
    pub fn switcher_settings(self, settings: &SwitcherSettings) -> SwitcherSettings {
        let mut settings = settings.clone();
        if self == Variant::Icons {
            settings.preview.enabled = false;
        }
        settings
    }
}

pub fn launch(variant: Variant) -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("could not load configuration")?;
    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            info!(%variant, "starting switcher");
            platform::run(variant, config)
        }
        Command::List { json } => platform::list(variant, config, json),
        Command::RestoreHotkeys => platform::restore_hotkeys(&config),
    }
}

/// Formats windows for `list`: numbered lines, or a JSON array.
pub fn render_list<H>(windows: &[WindowInfo<H>], json: bool) -> anyhow::Result<String> {
    if json {
        return serde_json::to_string_pretty(windows).context("could not serialize windows");
    }
    let lines: Vec<String> = windows
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let active = if w.is_active { " *" } else { "" };
            format!(
                "{:>3}. {} [pid {}, id {}]{active}",
                i + 1,
                w.display_title(),
                w.owner_pid,
                w.id.get()
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

/// The hotkeys `is_enabled` reports as off, e.g. after a restore attempt.
pub fn still_disabled(
    hotkeys: &[SymbolicHotKey],
    is_enabled: impl Fn(SymbolicHotKey) -> bool,
) -> Vec<SymbolicHotKey> {
    hotkeys.iter().copied().filter(|&hotkey| !is_enabled(hotkey)).collect()
}

#[cfg(target_os = "macos")]
mod platform {
    use anyhow::{Context, bail};
    use objc2::MainThreadMarker;
    use objc2_app_kit::{NSApplication, NSApplicationActivationPolicy};
    use tracing::{info, warn};

    use super::{Variant, render_list, still_disabled};
    use crate::actor;
    use crate::actor::notification_center::NotificationCenter;
    use crate::actor::switcher::{Presenter, Receiver, Sender, SwitcherActor, WindowSource};
    use crate::common::config::{Config, SwitcherSettings};
    use crate::sys::discovery::{AccessibilitySource, WindowServerSource};
    use crate::sys::event_tap::EventTap;
    use crate::sys::executor::Executor;
    use crate::sys::permissions;
    use crate::sys::signal::restore_hotkeys_on_termination;
    use crate::sys::skylight::{
        NativeSwitcherGuard, native_switcher_enabled, set_native_switcher_enabled,
    };
    use crate::ui::console::ConsolePresenter;
    use crate::ui::overlay::SwitcherOverlay;

    pub fn run(variant: Variant, config: Config) -> anyhow::Result<()> {
        let mtm = MainThreadMarker::new().context("the switcher must run on the main thread")?;
        let hotkeys = &config.settings.hotkeys;

        // Signals must be blocked before any other thread starts.
        if hotkeys.disable_native {
            restore_hotkeys_on_termination(hotkeys.native.clone())
                .context("could not install signal handlers")?;
        }

        NSApplication::sharedApplication(mtm)
            .setActivationPolicy(NSApplicationActivationPolicy::Accessory);

        if !permissions::ensure_accessibility() {
            warn!("continuing without accessibility access; switching may not work");
        }

        let _native = hotkeys
            .disable_native
            .then(|| NativeSwitcherGuard::disable(hotkeys.native.clone()));

        let settings = variant.switcher_settings(&config.settings.switcher);
        let discovery = config.settings.discovery.clone();
        let (tx, rx) = actor::channel();
        let restore = if hotkeys.disable_native { hotkeys.native.clone() } else { Vec::new() };
        let _notifications = NotificationCenter::new(mtm, tx.clone(), restore);
        match variant {
            Variant::Console => drive(
                mtm,
                WindowServerSource::new(discovery),
                ConsolePresenter::stdout(),
                &settings,
                (tx, rx),
            ),
            Variant::Icons => drive(
                mtm,
                WindowServerSource::new(discovery),
                SwitcherOverlay::new(mtm, settings.clone()),
                &settings,
                (tx, rx),
            ),
            Variant::Thumbnails => drive(
                mtm,
                AccessibilitySource::new(discovery),
                SwitcherOverlay::new(mtm, settings.clone()),
                &settings,
                (tx, rx),
            ),
        }
    }

    fn drive<S, P>(
        mtm: MainThreadMarker,
        source: S,
        presenter: P,
        settings: &SwitcherSettings,
        (tx, rx): (Sender, Receiver),
    ) -> anyhow::Result<()>
    where
        S: WindowSource + 'static,
        S::Handle: 'static,
        P: Presenter<S::Handle> + 'static,
    {
        let actor = SwitcherActor::new(source, presenter, settings, rx);
        let _tap = EventTap::install(tx, actor.showing_flag())
            .context("could not install the keyboard event tap")?;

        info!("ready; hold Command and press Tab to switch windows");
        Executor::run_main(mtm, actor.run());
        Ok(())
    }

    pub fn list(variant: Variant, config: Config, json: bool) -> anyhow::Result<()> {
        let discovery = config.settings.discovery;
        let output = if variant.uses_accessibility() {
            if !permissions::is_trusted() {
                warn!("accessibility access is not granted; the list will be empty");
            }
            render_list(&AccessibilitySource::new(discovery).windows(), json)?
        } else {
            render_list(&WindowServerSource::new(discovery).windows(), json)?
        };
        println!("{output}");
        Ok(())
    }

    pub fn restore_hotkeys(config: &Config) -> anyhow::Result<()> {
        let hotkeys = &config.settings.hotkeys.native;
        set_native_switcher_enabled(true, hotkeys);
        let still_disabled = still_disabled(hotkeys, native_switcher_enabled);
        if !still_disabled.is_empty() {
            bail!("could not re-enable system hotkeys {still_disabled:?}");
        }
        info!("native Cmd+Tab re-enabled");
        Ok(())
    }
}

#[cfg(not(target_os = "macos"))]
mod platform {
    use anyhow::bail;

    use super::Variant;
    use crate::common::config::Config;

    pub fn run(_variant: Variant, _config: Config) -> anyhow::Result<()> {
        bail!("the switcher only runs on macOS")
    }

    pub fn list(_variant: Variant, _config: Config, _json: bool) -> anyhow::Result<()> {
        bail!("listing windows is only supported on macOS")
    }

    pub fn restore_hotkeys(_config: &Config) -> anyhow::Result<()> {
        bail!("system hotkeys can only be restored on macOS")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::window::tests::window;

    #[test]
    fn run_is_the_default_command() {
        let cli = Cli::try_parse_from(["rift-switcher"]).unwrap();
        assert_eq!(cli.command, None);
        assert!(!cli.verbose);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn global_flags_work_after_the_subcommand() {
        let cli =
            Cli::try_parse_from(["rift-switcher", "list", "--json", "--config", "/tmp/c.toml", "-v"])
                .unwrap();
        assert_eq!(cli.command, Some(Command::List { json: true }));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(cli.verbose);

        let cli = Cli::try_parse_from(["rift-switcher", "restore-hotkeys"]).unwrap();
        assert_eq!(cli.command, Some(Command::RestoreHotkeys));
    }

    #[test]
    fn unknown_subcommands_are_rejected() {
        assert!(Cli::try_parse_from(["rift-switcher", "frobnicate"]).is_err());
    }

    #[test]
    fn only_the_thumbnail_variant_previews() {
        let settings = SwitcherSettings::default();
        assert!(!Variant::Icons.switcher_settings(&settings).preview.enabled);
        assert!(Variant::Thumbnails.switcher_settings(&settings).preview.enabled);
        assert!(Variant::Thumbnails.uses_accessibility());
        assert!(!Variant::Console.uses_accessibility());
        assert_eq!(Variant::Thumbnails.to_string(), "thumbnails");
    }

    #[test]
    fn reports_hotkeys_left_disabled() {
        let hotkeys = [SymbolicHotKey::CommandTab, SymbolicHotKey::CommandShiftTab];
        assert_eq!(still_disabled(&hotkeys, |_| true), vec![]);
        assert_eq!(
            still_disabled(&hotkeys, |hotkey| hotkey != SymbolicHotKey::CommandShiftTab),
            vec![SymbolicHotKey::CommandShiftTab]
        );
        assert_eq!(still_disabled(&[], |_| false), vec![]);
    }

    #[test]
    fn lists_windows_as_text_and_json() {
        let mut safari = window(7, "Safari", "Apple");
        safari.is_active = true;
        let windows = vec![window(3, "Finder", ""), safari];

        let text = render_list(&windows, false).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  1. Finder [pid"));
        assert!(lines[0].ends_with("id 3]"));
        assert!(lines[1].contains("Safari - Apple"));
        assert!(lines[1].ends_with(" *"));

        let json: serde_json::Value =
            serde_json::from_str(&render_list(&windows, true).unwrap()).unwrap();
        assert_eq!(json[1]["title"], "Apple");
        assert_eq!(json[1]["id"], 7);
        assert_eq!(json[1]["is_active"], true);
        assert!(json[0].get("handle").is_none());
    }
}
