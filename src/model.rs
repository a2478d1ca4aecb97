pub mod layout;
pub mod pager;
pub mod switcher;
pub mod window;

pub use pager::Pager;
pub use switcher::{Switcher, SwitcherView};
pub use window::{WindowInfo, WindowServerId};
