use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
    sync::atomic::{AtomicU64, Ordering},
};

use crate::spinner::{
    error::{SpinnerError, internal_error},
    ports::SpinnerPrimitive,
    registry::SpinnerRegistry,
    types::{HandleId, SpinState, SpinnerKey, SpinnerOptions, ThemeName},
};

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

fn next_handle_id() -> HandleId {
    NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Default)]
pub struct HandleSpec {
    pub instance_options: SpinnerOptions,
    pub key: Option<SpinnerKey>,
    pub theme_name: Option<ThemeName>,
}

struct HandleState {
    key: Option<SpinnerKey>,
    instance_options: SpinnerOptions,
    theme_name: Option<ThemeName>,
    merged_options: SpinnerOptions,
    spin_state: SpinState,
    destroyed: bool,
}

/// The primitive plus the last state it was actually told to be in.
struct PrimitiveSlot {
    primitive: Box<dyn SpinnerPrimitive>,
    applied: SpinState,
}

/// One attached spinner: its option layers, its primitive and its spin state.
///
/// `spin_state` is the logical state; the primitive is driven towards it
/// with no handle borrow held, so a primitive may call back into its own
/// handle (including destroying it) from `spin`/`stop`.
pub struct SpinnerHandle {
    id: HandleId,
    registry: Weak<SpinnerRegistry>,
    state: RefCell<HandleState>,
    primitive: RefCell<Option<PrimitiveSlot>>,
}

impl SpinnerHandle {
    /// Merges options, builds the primitive and registers the handle under its key.
    pub fn create(
        registry: &Rc<SpinnerRegistry>,
        spec: HandleSpec,
    ) -> Result<Rc<Self>, SpinnerError> {
        let merged_options =
            registry.merged_options(spec.theme_name.as_deref(), &spec.instance_options);
        let primitive = registry.build_primitive(&merged_options)?;

        let handle = Rc::new(Self {
            id: next_handle_id(),
            registry: Rc::downgrade(registry),
            state: RefCell::new(HandleState {
                key: spec.key,
                instance_options: spec.instance_options,
                theme_name: spec.theme_name,
                merged_options,
                spin_state: SpinState::Idle,
                destroyed: false,
            }),
            primitive: RefCell::new(Some(PrimitiveSlot {
                primitive,
                applied: SpinState::Idle,
            })),
        });
        registry.register(&handle)?;

        tracing::debug!(
            target: "spinner",
            handle_id = handle.id,
            key = ?handle.key(),
            theme = ?handle.theme_name(),
            "handle_created"
        );
        Ok(handle)
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn key(&self) -> Option<SpinnerKey> {
        self.state.borrow().key.clone()
    }

    pub fn theme_name(&self) -> Option<ThemeName> {
        self.state.borrow().theme_name.clone()
    }

    pub fn instance_options(&self) -> SpinnerOptions {
        self.state.borrow().instance_options.clone()
    }

    pub fn merged_options(&self) -> SpinnerOptions {
        self.state.borrow().merged_options.clone()
    }

    pub fn state(&self) -> SpinState {
        self.state.borrow().spin_state
    }

    pub fn is_spinning(&self) -> bool {
        self.state() == SpinState::Spinning
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }

    pub(crate) fn belongs_to(&self, registry: &SpinnerRegistry) -> bool {
        std::ptr::eq(self.registry.as_ptr(), registry)
    }

    /// Returns `true` only when the handle moved from idle to spinning.
    pub fn start(&self) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if state.destroyed || state.spin_state == SpinState::Spinning {
                return false;
            }
            state.spin_state = SpinState::Spinning;
        }
        self.sync_primitive();
        true
    }

    /// Returns `true` only when the handle moved from spinning to idle.
    pub fn stop(&self) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if state.destroyed || state.spin_state == SpinState::Idle {
                return false;
            }
            state.spin_state = SpinState::Idle;
        }
        self.sync_primitive();
        true
    }

    /// Re-merges the option layers and swaps in a fresh primitive when the
    /// merged record changed. The spin state carries over to the new primitive.
    ///
    /// Returns whether a new primitive was built. On factory failure the
    /// handle keeps its previous layers and primitive.
    pub fn reconfigure(
        &self,
        instance_options: SpinnerOptions,
        theme_name: Option<ThemeName>,
    ) -> Result<bool, SpinnerError> {
        if self.is_destroyed() {
            return Ok(false);
        }
        let registry = self.registry()?;
        let merged_options = registry.merged_options(theme_name.as_deref(), &instance_options);

        {
            let mut state = self.state.borrow_mut();
            if state.merged_options == merged_options {
                state.instance_options = instance_options;
                state.theme_name = theme_name;
                return Ok(false);
            }
        }

        let next = registry.build_primitive(&merged_options)?;

        let was_spinning = {
            let mut state = self.state.borrow_mut();
            if state.destroyed {
                return Ok(false);
            }
            state.instance_options = instance_options;
            state.theme_name = theme_name;
            state.merged_options = merged_options;
            state.spin_state == SpinState::Spinning
        };

        let previous = self.primitive.borrow_mut().replace(PrimitiveSlot {
            primitive: next,
            applied: SpinState::Idle,
        });
        if let Some(previous) = previous {
            halt(previous);
        }
        self.sync_primitive();

        tracing::debug!(
            target: "spinner",
            handle_id = self.id,
            was_spinning,
            "handle_reconfigured"
        );
        Ok(true)
    }

    /// Re-merges the current layers against the registry's current config.
    pub fn refresh(&self) -> Result<bool, SpinnerError> {
        let (instance_options, theme_name) = {
            let state = self.state.borrow();
            (state.instance_options.clone(), state.theme_name.clone())
        };
        self.reconfigure(instance_options, theme_name)
    }

    /// Moves the handle to the bucket for `key`. Returns whether the key changed.
    ///
    /// A handle that was unregistered from a live registry keeps its old key.
    pub fn rekey(&self, key: Option<SpinnerKey>) -> bool {
        {
            let state = self.state.borrow();
            if state.destroyed || state.key == key {
                return false;
            }
        }

        let moved = match self.registry.upgrade() {
            Some(registry) => registry.rekey(self.id, key.clone()),
            None => true,
        };
        if moved {
            self.state.borrow_mut().key = key;
        }
        moved
    }

    /// Stops the primitive if it is spinning, then leaves the registry.
    /// Every later call on the handle is a no-op.
    pub fn destroy(&self) {
        let was_spinning = {
            let mut state = self.state.borrow_mut();
            if state.destroyed {
                return;
            }
            let was_spinning = state.spin_state == SpinState::Spinning;
            state.spin_state = SpinState::Idle;
            state.destroyed = true;
            was_spinning
        };
        self.sync_primitive();

        if let Some(registry) = self.registry.upgrade() {
            registry.unregister(self.id);
        }
        tracing::debug!(target: "spinner", handle_id = self.id, was_spinning, "handle_destroyed");
    }

    /// Drives the primitive until it matches the logical spin state.
    ///
    /// The slot is empty while an outer call is inside the primitive; that
    /// call re-checks the logical state once the primitive returns.
    fn sync_primitive(&self) {
        loop {
            let desired = self.state.borrow().spin_state;
            let Some(mut slot) = self.primitive.borrow_mut().take() else {
                return;
            };
            if slot.applied == desired {
                self.restore_primitive(slot);
                return;
            }

            match desired {
                SpinState::Spinning => slot.primitive.spin(),
                SpinState::Idle => slot.primitive.stop(),
            }
            slot.applied = desired;
            self.restore_primitive(slot);
        }
    }

    fn restore_primitive(&self, slot: PrimitiveSlot) {
        let mut cell = self.primitive.borrow_mut();
        if cell.is_none() {
            *cell = Some(slot);
            return;
        }
        drop(cell);
        // A reconfigure swapped in a replacement while this one was running.
        halt(slot);
    }

    fn registry(&self) -> Result<Rc<SpinnerRegistry>, SpinnerError> {
        self.registry
            .upgrade()
            .ok_or_else(|| internal_error(format!("registry dropped before handle {}", self.id)))
    }
}

fn halt(mut slot: PrimitiveSlot) {
    if slot.applied == SpinState::Spinning {
        slot.primitive.stop();
    }
}

impl fmt::Debug for SpinnerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SpinnerHandle")
            .field("id", &self.id)
            .field("key", &state.key)
            .field("theme_name", &state.theme_name)
            .field("merged_options", &state.merged_options)
            .field("spin_state", &state.spin_state)
            .field("destroyed", &state.destroyed)
            .finish()
    }
}
