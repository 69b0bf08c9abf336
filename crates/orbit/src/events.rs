use crate::menu::MenuEvent;

#[derive(Debug, Clone)]
pub enum AppEvent {
    Menu(MenuEvent),
    ConfigReload,
}
