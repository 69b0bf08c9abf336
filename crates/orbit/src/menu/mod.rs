pub mod item;
pub mod model;

pub use item::{ActionError, ItemAction, ItemId, ItemLabel, MenuItem, ShellAction, ShellCommand};
pub use model::{Hotspot, ListenerHost, ListenerKind, MenuEvent, MenuUpdate, RadialMenu, Snapshot};
