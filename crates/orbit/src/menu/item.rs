use crate::config::ItemConfig;
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::{Command, Stdio};
use std::rc::Rc;
use thiserror::Error;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ItemId(String);

crate::impl_string_newtype!(ItemId);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ItemLabel(String);

crate::impl_string_newtype!(ItemLabel);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ShellCommand(String);

crate::impl_string_newtype!(ShellCommand);

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("empty command for item '{0}'")]
    EmptyCommand(ItemId),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Something a menu item does when selected.
pub trait ItemAction {
    fn invoke(&self) -> Result<(), ActionError>;
}

/// Runs a shell command detached from the daemon.
#[derive(Debug, Clone)]
pub struct ShellAction {
    pub id: ItemId,
    pub command: ShellCommand,
}

impl ItemAction for ShellAction {
    fn invoke(&self) -> Result<(), ActionError> {
        if self.command.trim().is_empty() {
            return Err(ActionError::EmptyCommand(self.id.clone()));
        }
        Command::new("sh")
            .arg("-c")
            .arg(self.command.as_str())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(())
    }
}

struct FnAction<F>(F);

impl<F: Fn()> ItemAction for FnAction<F> {
    fn invoke(&self) -> Result<(), ActionError> {
        (self.0)();
        Ok(())
    }
}

/// An entry of the ring. The menu only reads it.
#[derive(Clone)]
pub struct MenuItem {
    pub id: ItemId,
    pub label: ItemLabel,
    pub description: Option<String>,
    pub action: Rc<dyn ItemAction>,
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl MenuItem {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        action: impl Fn() + 'static,
    ) -> Self {
        Self {
            id: ItemId::new(id),
            label: ItemLabel::new(label),
            description: None,
            action: Rc::new(FnAction(action)),
        }
    }

    pub fn from_config(cfg: &ItemConfig) -> Self {
        Self {
            id: cfg.id.clone(),
            label: cfg.label.clone(),
            description: cfg.description.clone(),
            action: Rc::new(ShellAction {
                id: cfg.id.clone(),
                command: cfg.exec.clone(),
            }),
        }
    }

    pub fn activate(&self) {
        if let Err(e) = self.action.invoke() {
            log::error!("Failed to run action of '{}': {}", self.label, e);
        }
    }
}
