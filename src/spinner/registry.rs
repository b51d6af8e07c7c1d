use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use crate::spinner::{
    error::{SpinnerError, already_registered, foreign_handle, internal_error},
    handle::SpinnerHandle,
    noop::NoopSpinnerFactory,
    ports::{SpinnerControlPort, SpinnerFactoryPort, SpinnerPrimitive},
    types::{HandleId, SpinnerConfig, SpinnerKey, SpinnerOptions, ThemeName},
};

type Bucket = BTreeMap<HandleId, Rc<SpinnerHandle>>;

#[derive(Default)]
struct RegistryState {
    by_key: BTreeMap<SpinnerKey, Bucket>,
    unkeyed: Bucket,
    locations: BTreeMap<HandleId, Option<SpinnerKey>>,
}

impl RegistryState {
    fn bucket_mut(&mut self, key: Option<&SpinnerKey>) -> &mut Bucket {
        match key {
            Some(key) => self.by_key.entry(key.clone()).or_default(),
            None => &mut self.unkeyed,
        }
    }

    fn take(&mut self, id: HandleId) -> Option<(Option<SpinnerKey>, Rc<SpinnerHandle>)> {
        let location = self.locations.remove(&id)?;
        let removed = match &location {
            Some(key) => {
                let bucket = self.by_key.get_mut(key)?;
                let removed = bucket.remove(&id);
                if bucket.is_empty() {
                    self.by_key.remove(key);
                }
                removed
            }
            None => self.unkeyed.remove(&id),
        };
        removed.map(|handle| (location, handle))
    }
}

/// Keyed broadcast directory of live spinner handles.
///
/// Owns the option layers and the primitive factory every handle is built
/// from. Broadcasts snapshot their targets before calling into handles, so a
/// handle may register, rekey or destroy itself mid-broadcast.
pub struct SpinnerRegistry {
    config: RefCell<SpinnerConfig>,
    factory: Box<dyn SpinnerFactoryPort>,
    state: RefCell<RegistryState>,
}

impl SpinnerRegistry {
    pub fn new(config: SpinnerConfig, factory: Box<dyn SpinnerFactoryPort>) -> Rc<Self> {
        Rc::new(Self {
            config: RefCell::new(config),
            factory,
            state: RefCell::new(RegistryState::default()),
        })
    }

    pub fn with_noop_factory(config: SpinnerConfig) -> Rc<Self> {
        Self::new(config, Box::new(NoopSpinnerFactory))
    }

    pub(crate) fn build_primitive(
        &self,
        options: &SpinnerOptions,
    ) -> Result<Box<dyn SpinnerPrimitive>, SpinnerError> {
        self.factory.create(options)
    }

    pub fn merged_options(
        &self,
        theme_name: Option<&str>,
        instance_options: &SpinnerOptions,
    ) -> SpinnerOptions {
        self.config.borrow().merged(theme_name, instance_options)
    }

    pub fn defaults(&self) -> SpinnerOptions {
        self.config.borrow().defaults().clone()
    }

    pub fn theme(&self, name: &str) -> Option<SpinnerOptions> {
        self.config.borrow().theme(name).cloned()
    }

    pub fn config_snapshot(&self) -> SpinnerConfig {
        self.config.borrow().clone()
    }

    /// Replaces the defaults layer and re-merges every live handle.
    pub fn set_defaults(&self, options: SpinnerOptions) -> Result<(), SpinnerError> {
        self.config.borrow_mut().set_defaults(options);
        self.refresh_all()
    }

    /// Inserts or overwrites one theme and re-merges every live handle.
    pub fn set_theme(
        &self,
        name: impl Into<ThemeName>,
        options: SpinnerOptions,
    ) -> Result<(), SpinnerError> {
        self.config.borrow_mut().set_theme(name, options);
        self.refresh_all()
    }

    fn refresh_all(&self) -> Result<(), SpinnerError> {
        let mut first_error = None;
        let mut rebuilt = 0usize;
        for handle in self.snapshot(None) {
            match handle.refresh() {
                Ok(true) => rebuilt += 1,
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(
                        target: "spinner",
                        handle_id = handle.id(),
                        error = %err,
                        "handle_refresh_failed"
                    );
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }
        tracing::debug!(target: "spinner", rebuilt, "config_applied");

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Inserts `handle` into the bucket for its current key.
    ///
    /// Registering a handle that is already present is rejected; the existing
    /// registration is left untouched. Handles created for another registry
    /// are rejected.
    pub fn register(&self, handle: &Rc<SpinnerHandle>) -> Result<(), SpinnerError> {
        if !handle.belongs_to(self) {
            return Err(foreign_handle(format!(
                "handle {} was created for another registry",
                handle.id()
            )));
        }
        if handle.is_destroyed() {
            return Err(internal_error(format!(
                "handle {} is destroyed and cannot be registered",
                handle.id()
            )));
        }

        let key = handle.key();
        let mut state = self.state.borrow_mut();
        if state.locations.contains_key(&handle.id()) {
            return Err(already_registered(format!(
                "handle {} is already registered",
                handle.id()
            )));
        }

        state
            .bucket_mut(key.as_ref())
            .insert(handle.id(), Rc::clone(handle));
        state.locations.insert(handle.id(), key.clone());
        drop(state);

        tracing::debug!(target: "spinner", handle_id = handle.id(), key = ?key, "handle_registered");
        Ok(())
    }

    /// Removes the handle from whichever bucket holds it. Unknown ids are ignored.
    pub fn unregister(&self, id: HandleId) -> bool {
        let removed = self.state.borrow_mut().take(id);
        match removed {
            Some((key, _handle)) => {
                tracing::debug!(target: "spinner", handle_id = id, key = ?key, "handle_unregistered");
                true
            }
            None => false,
        }
    }

    /// Moves a registered handle to the bucket for `key`.
    pub fn rekey(&self, id: HandleId, key: Option<SpinnerKey>) -> bool {
        let mut state = self.state.borrow_mut();
        let Some((previous, handle)) = state.take(id) else {
            return false;
        };

        state.bucket_mut(key.as_ref()).insert(id, handle);
        state.locations.insert(id, key.clone());
        drop(state);

        tracing::debug!(
            target: "spinner",
            handle_id = id,
            from = ?previous,
            to = ?key,
            "handle_rekeyed"
        );
        true
    }

    pub fn contains(&self, id: HandleId) -> bool {
        self.state.borrow().locations.contains_key(&id)
    }

    /// Starts every handle under `key`, or every handle when `key` is `None`.
    /// Returns how many handles moved to spinning.
    pub fn spin(&self, key: Option<&str>) -> usize {
        let targets = self.snapshot(key);
        let mut changed = 0;
        for handle in &targets {
            if handle.start() {
                changed += 1;
            }
        }

        tracing::debug!(
            target: "spinner",
            key = key.unwrap_or("*"),
            members = targets.len(),
            changed,
            "spin_broadcast"
        );
        changed
    }

    /// Stops every handle under `key`, or every handle when `key` is `None`.
    /// Returns how many handles moved to idle.
    pub fn stop(&self, key: Option<&str>) -> usize {
        let targets = self.snapshot(key);
        let mut changed = 0;
        for handle in &targets {
            if handle.stop() {
                changed += 1;
            }
        }

        tracing::debug!(
            target: "spinner",
            key = key.unwrap_or("*"),
            members = targets.len(),
            changed,
            "stop_broadcast"
        );
        changed
    }

    fn snapshot(&self, key: Option<&str>) -> Vec<Rc<SpinnerHandle>> {
        let state = self.state.borrow();
        match key {
            Some(key) => state
                .by_key
                .get(key)
                .map(|bucket| bucket.values().cloned().collect())
                .unwrap_or_default(),
            None => state
                .unkeyed
                .values()
                .chain(state.by_key.values().flat_map(|bucket| bucket.values()))
                .cloned()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.state.borrow().locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<SpinnerKey> {
        self.state.borrow().by_key.keys().cloned().collect()
    }

    pub fn members(&self, key: &str) -> Vec<Rc<SpinnerHandle>> {
        self.snapshot(Some(key))
    }

    pub fn unkeyed(&self) -> Vec<Rc<SpinnerHandle>> {
        self.state.borrow().unkeyed.values().cloned().collect()
    }

    pub fn spinning_count(&self) -> usize {
        self.snapshot(None)
            .iter()
            .filter(|handle| handle.is_spinning())
            .count()
    }
}

impl SpinnerControlPort for SpinnerRegistry {
    fn spin(&self, key: Option<&str>) {
        SpinnerRegistry::spin(self, key);
    }

    fn stop(&self, key: Option<&str>) {
        SpinnerRegistry::stop(self, key);
    }
}
