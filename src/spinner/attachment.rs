use std::rc::Rc;

use crate::spinner::{
    error::SpinnerError,
    handle::{HandleSpec, SpinnerHandle},
    registry::SpinnerRegistry,
    types::{SpinnerKey, SpinnerOptions, ThemeName},
};

/// Values the UI tree supplies when a spinner node is attached.
#[derive(Debug, Clone, Default)]
pub struct AttachRequest {
    pub instance_options: SpinnerOptions,
    pub key: Option<SpinnerKey>,
    pub theme_name: Option<ThemeName>,
    pub start_active: bool,
    /// Live spin/stop binding. When bound it alone decides whether the
    /// spinner runs; auto-start and `start_active` are ignored.
    pub spin_on: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BindingChange {
    InstanceOptions(SpinnerOptions),
    Theme(Option<ThemeName>),
    Key(Option<SpinnerKey>),
    StartActive(bool),
    SpinOn(bool),
}

/// Glue between one attached UI node and its spinner handle.
///
/// Dropping the attachment destroys the handle.
#[derive(Debug)]
pub struct SpinnerAttachment {
    handle: Rc<SpinnerHandle>,
    start_active: bool,
    spin_on: Option<bool>,
}

impl SpinnerAttachment {
    pub fn attach(
        registry: &Rc<SpinnerRegistry>,
        request: AttachRequest,
    ) -> Result<Self, SpinnerError> {
        let handle = SpinnerHandle::create(
            registry,
            HandleSpec {
                instance_options: request.instance_options,
                key: request.key,
                theme_name: request.theme_name,
            },
        )?;

        let attachment = Self {
            handle,
            start_active: request.start_active,
            spin_on: request.spin_on,
        };
        if attachment.should_auto_start() {
            attachment.handle.start();
        }
        Ok(attachment)
    }

    pub fn handle(&self) -> &Rc<SpinnerHandle> {
        &self.handle
    }

    fn should_auto_start(&self) -> bool {
        match self.spin_on {
            Some(on) => on,
            None => self.handle.key().is_none() || self.start_active,
        }
    }

    pub fn apply(&mut self, change: BindingChange) -> Result<(), SpinnerError> {
        match change {
            BindingChange::InstanceOptions(options) => {
                self.handle.reconfigure(options, self.handle.theme_name())?;
            }
            BindingChange::Theme(theme_name) => {
                self.handle
                    .reconfigure(self.handle.instance_options(), theme_name)?;
            }
            BindingChange::Key(key) => {
                self.handle.rekey(key);
            }
            BindingChange::StartActive(active) => {
                let rising = active && !self.start_active;
                self.start_active = active;
                if rising && self.spin_on.is_none() {
                    self.handle.start();
                }
            }
            BindingChange::SpinOn(on) => {
                self.spin_on = Some(on);
                if on {
                    self.handle.start();
                } else {
                    self.handle.stop();
                }
            }
        }
        Ok(())
    }

    pub fn detach(self) {
        tracing::debug!(target: "spinner", handle_id = self.handle.id(), "attachment_detached");
    }
}

impl Drop for SpinnerAttachment {
    fn drop(&mut self) {
        self.handle.destroy();
    }
}
