//! The on-screen switcher panel.
//!
//! One borderless window is created on first use and reused for every
//! session. Tiles are plain `CALayer`s inside a layer-backed grid view; they
//! are rebuilt on every update, which is cheap for a page of icons.

use nix::libc::pid_t;
use objc2::msg_send;
use objc2::rc::Retained;
use objc2::runtime::AnyObject;
use objc2_app_kit::{
    NSBackingStoreType, NSColor, NSFont, NSFontWeightMedium, NSImage, NSPopUpMenuWindowLevel,
    NSScreen, NSTextAlignment, NSTextField, NSView, NSVisualEffectBlendingMode,
    NSVisualEffectMaterial, NSVisualEffectState, NSVisualEffectView, NSWindow,
    NSWindowCollectionBehavior, NSWindowStyleMask,
};
use objc2_core_foundation::{CFRetained, CGPoint, CGRect, CGSize};
use objc2_core_graphics::CGImage;
use objc2_foundation::{MainThreadMarker, NSString};
use objc2_quartz_core::{CALayer, CATransaction, kCAGravityResizeAspect};
use tracing::{debug, instrument, trace, warn};

use crate::actor::switcher::Presenter;
use crate::common::collections::HashMap;
use crate::common::config::SwitcherSettings;
use crate::model::layout::OverlayLayout;
use crate::model::switcher::SwitcherView;
use crate::sys::app::app_icon;
use crate::sys::geometry::Rect;
use crate::sys::window_server::capture_window;

const PANEL_RADIUS: f64 = 12.0;
const TILE_RADIUS: f64 = 8.0;
const ICON_INSET: f64 = 5.0;
const PREVIEW_RADIUS: f64 = 6.0;
const PREVIEW_BACKGROUND_ALPHA: f64 = 0.9;

struct Panel {
    window: Retained<NSWindow>,
    background: Retained<NSVisualEffectView>,
    grid: Retained<NSView>,
    grid_layer: Retained<CALayer>,
    title: Retained<NSTextField>,
    indicator: Retained<NSTextField>,
    preview: Retained<NSView>,
    preview_layer: Retained<CALayer>,
    tiles: Vec<Retained<CALayer>>,
}

pub struct SwitcherOverlay {
    mtm: MainThreadMarker,
    settings: SwitcherSettings,
    panel: Option<Panel>,
    icons: HashMap<pid_t, Option<Retained<NSImage>>>,
}

impl SwitcherOverlay {
    pub fn new(mtm: MainThreadMarker, settings: SwitcherSettings) -> Self {
        SwitcherOverlay {
            mtm,
            settings,
            panel: None,
            icons: HashMap::default(),
        }
    }

    fn screen_frame(&self) -> Rect {
        NSScreen::mainScreen(self.mtm)
            .map(|screen| screen.visibleFrame().into())
            .unwrap_or(Rect::new(0.0, 0.0, 1440.0, 900.0))
    }

    fn icon(&mut self, pid: pid_t) -> Option<Retained<NSImage>> {
        self.icons.entry(pid).or_insert_with(|| app_icon(pid)).clone()
    }

    fn panel(&mut self) -> Option<&mut Panel> {
        if self.panel.is_none() {
            self.panel = Panel::create(self.mtm);
            match &self.panel {
                Some(_) => debug!("switcher panel created"),
                None => warn!("could not create the switcher panel"),
            }
        }
        self.panel.as_mut()
    }
}

impl Panel {
    fn create(mtm: MainThreadMarker) -> Option<Panel> {
        let window = unsafe {
            NSWindow::initWithContentRect_styleMask_backing_defer(
                NSWindow::alloc(mtm),
                CGRect::default(),
                NSWindowStyleMask::Borderless,
                NSBackingStoreType::Buffered,
                false,
            )
        };
        window.setBackgroundColor(Some(&NSColor::clearColor()));
        window.setOpaque(false);
        window.setHasShadow(true);
        window.setLevel(NSPopUpMenuWindowLevel);
        window.setIgnoresMouseEvents(true);
        window.setCollectionBehavior(
            NSWindowCollectionBehavior::CanJoinAllSpaces
                | NSWindowCollectionBehavior::Transient
                | NSWindowCollectionBehavior::FullScreenAuxiliary,
        );
        unsafe { window.setReleasedWhenClosed(false) };

        let background = NSVisualEffectView::new(mtm);
        background.setMaterial(NSVisualEffectMaterial::HUDWindow);
        background.setBlendingMode(NSVisualEffectBlendingMode::BehindWindow);
        background.setState(NSVisualEffectState::Active);
        background.setWantsLayer(true);
        let background_layer = background.layer()?;
        background_layer.setCornerRadius(PANEL_RADIUS);
        background_layer.setMasksToBounds(true);
        window.setContentView(Some(&background));

        let grid = NSView::new(mtm);
        grid.setWantsLayer(true);
        let grid_layer = grid.layer()?;
        background.addSubview(&grid);

        let medium = unsafe { NSFontWeightMedium };
        let title = label(mtm, NSFont::systemFontOfSize_weight(16.0, medium));
        title.setTextColor(Some(&NSColor::whiteColor()));
        background.addSubview(&title);

        let indicator = label(mtm, NSFont::systemFontOfSize(12.0));
        indicator.setTextColor(Some(&NSColor::lightGrayColor()));
        background.addSubview(&indicator);

        let preview = NSView::new(mtm);
        preview.setWantsLayer(true);
        let preview_layer = CALayer::layer();
        preview_layer.setCornerRadius(PREVIEW_RADIUS);
        preview_layer.setBorderWidth(2.0);
        preview_layer.setBorderColor(Some(&NSColor::controlAccentColor().CGColor()));
        preview_layer.setBackgroundColor(Some(&preview_background().CGColor()));
        preview_layer.setMasksToBounds(true);
        preview_layer.setContentsGravity(unsafe { kCAGravityResizeAspect });
        preview.layer()?.addSublayer(&preview_layer);
        background.addSubview(&preview);

        Some(Panel {
            window,
            background,
            grid,
            grid_layer,
            title,
            indicator,
            preview,
            preview_layer,
            tiles: Vec::new(),
        })
    }

    fn place(&self, layout: &OverlayLayout) {
        let frame = CGRect::from(layout.frame);
        self.window.setFrame_display(frame, true);
        self.background.setFrame(CGRect::new(CGPoint::ZERO, frame.size));
        self.grid.setFrame(layout.grid.into());
        self.title.setFrame(layout.title.into());
        self.indicator.setFrame(layout.indicator.into());
        self.preview.setFrame(layout.preview.into());
    }

    fn clear_tiles(&mut self) {
        for tile in self.tiles.drain(..) {
            tile.removeFromSuperlayer();
        }
    }
}

fn preview_background() -> Retained<NSColor> {
    NSColor::controlBackgroundColor().colorWithAlphaComponent(PREVIEW_BACKGROUND_ALPHA)
}

fn label(mtm: MainThreadMarker, font: Retained<NSFont>) -> Retained<NSTextField> {
    let field = NSTextField::labelWithString(&NSString::new(), mtm);
    field.setFont(Some(&font));
    field.setAlignment(NSTextAlignment::Center);
    field
}

fn tile(frame: Rect, selected: bool, icon: Option<&NSImage>) -> Retained<CALayer> {
    let layer = CALayer::layer();
    layer.setFrame(frame.into());
    layer.setCornerRadius(TILE_RADIUS);

    if selected {
        let accent = NSColor::controlAccentColor();
        layer.setBackgroundColor(Some(&accent.colorWithAlphaComponent(0.3).CGColor()));
        layer.setBorderWidth(3.0);
        layer.setBorderColor(Some(&accent.CGColor()));
        layer.setShadowColor(Some(&accent.CGColor()));
        layer.setShadowRadius(10.0);
        layer.setShadowOpacity(0.5);
        layer.setShadowOffset(CGSize::new(0.0, 0.0));
    } else {
        layer.setBackgroundColor(Some(&NSColor::clearColor().CGColor()));
    }

    if let Some(icon) = icon {
        let image = CALayer::layer();
        image.setFrame(
            Rect::new(
                ICON_INSET,
                ICON_INSET,
                frame.size.width - 2.0 * ICON_INSET,
                frame.size.height - 2.0 * ICON_INSET,
            )
            .into(),
        );
        image.setContentsGravity(unsafe { kCAGravityResizeAspect });
        set_contents(&image, Some(icon as *const NSImage as *mut AnyObject));
        layer.addSublayer(&image);
    }
    layer
}

fn set_contents(layer: &CALayer, contents: Option<*mut AnyObject>) {
    let ptr = contents.unwrap_or(std::ptr::null_mut());
    unsafe {
        let _: () = msg_send![layer, setContents: ptr];
    }
}

impl<H> Presenter<H> for SwitcherOverlay {
    #[instrument(skip_all, fields(selected = view.selected, count = view.windows.len()))]
    fn present(&mut self, view: &SwitcherView<'_, H>) {
        let screen = self.screen_frame();
        let visible = view.windows.get(view.visible.clone()).unwrap_or_default();
        let layout = OverlayLayout::compute(&self.settings, visible.len(), screen);

        let icons: Vec<_> = visible.iter().map(|w| self.icon(w.owner_pid)).collect();
        let selected = view.selected_window();
        let preview = match selected {
            Some(window) if self.settings.preview.enabled => Some(
                capture_window(window.id)
                    .map(Preview::Captured)
                    .or_else(|| self.icon(window.owner_pid).map(Preview::Icon)),
            ),
            _ => None,
        };
        let preview_frame = layout.preview_frame(&self.settings);
        let title = selected.map(|w| w.display_title()).unwrap_or_default();
        let indicator = view.indicator.clone().unwrap_or_default();

        let Some(panel) = self.panel() else {
            return;
        };

        CATransaction::begin();
        CATransaction::setDisableActions(true);

        panel.place(&layout);
        panel.clear_tiles();
        for (i, (frame, icon)) in layout.icons.iter().zip(&icons).enumerate() {
            let is_selected = view.visible.start + i == view.selected;
            let layer = tile(*frame, is_selected, icon.as_deref());
            panel.grid_layer.addSublayer(&layer);
            panel.tiles.push(layer);
        }

        panel.title.setStringValue(&NSString::from_str(&title));
        panel.indicator.setStringValue(&NSString::from_str(&indicator));
        panel.indicator.setHidden(indicator.is_empty());

        match preview {
            Some(image) => {
                panel.preview.setHidden(false);
                panel.preview_layer.setFrame(preview_frame.into());
                let contents = image.as_ref().map(|image| match image {
                    Preview::Captured(image) => &**image as *const CGImage as *mut AnyObject,
                    Preview::Icon(icon) => &**icon as *const NSImage as *mut AnyObject,
                });
                set_contents(&panel.preview_layer, contents);
            }
            None => {
                panel.preview.setHidden(true);
                set_contents(&panel.preview_layer, None);
            }
        }

        CATransaction::commit();

        panel.window.orderFrontRegardless();
        trace!(tiles = panel.tiles.len(), "panel updated");
    }

    fn dismiss(&mut self) {
        if let Some(panel) = self.panel.as_mut() {
            panel.window.orderOut(None);
            panel.clear_tiles();
            set_contents(&panel.preview_layer, None);
        }
        // Applications may have quit or changed icon by the next session.
        self.icons.clear();
    }
}

enum Preview {
    Captured(CFRetained<CGImage>),
    Icon(Retained<NSImage>),
}

#[cfg(test)]
mod tests {
    use objc2_core_graphics::CGColor;

    use super::*;

    #[test]
    fn preview_sits_on_a_translucent_control_background() {
        let color = preview_background();
        assert!((color.alphaComponent() - PREVIEW_BACKGROUND_ALPHA).abs() < 1e-6);
        assert!((CGColor::alpha(Some(&color.CGColor())) - PREVIEW_BACKGROUND_ALPHA).abs() < 1e-6);
    }

    #[test]
    fn unselected_tiles_are_clear() {
        let layer = tile(Rect::new(0.0, 0.0, 60.0, 60.0), false, None);
        let background = layer.backgroundColor();
        assert!(background.is_some_and(|color| CGColor::alpha(Some(&color)) == 0.0));
        assert_eq!(layer.borderWidth(), 0.0);

        let selected = tile(Rect::new(0.0, 0.0, 60.0, 60.0), true, None);
        assert_eq!(selected.borderWidth(), 3.0);
    }
}
