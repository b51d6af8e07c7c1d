use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::spinner::{
    error::{SpinnerError, primitive_creation},
    ports::{SpinnerFactoryPort, SpinnerPrimitive},
    types::SpinnerOptions,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveCall {
    Spin(usize),
    Stop(usize),
}

/// Everything a [`RecordingSpinnerFactory`] and its primitives observed.
/// Primitives are numbered in creation order, starting at zero.
#[derive(Debug, Clone, Default)]
pub struct SpinnerCallLog {
    pub created: Vec<SpinnerOptions>,
    pub calls: Vec<PrimitiveCall>,
}

impl SpinnerCallLog {
    pub fn create_count(&self) -> usize {
        self.created.len()
    }

    pub fn spin_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, PrimitiveCall::Spin(_)))
            .count()
    }

    pub fn stop_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, PrimitiveCall::Stop(_)))
            .count()
    }

    pub fn spins_of(&self, primitive: usize) -> usize {
        self.calls
            .iter()
            .filter(|call| **call == PrimitiveCall::Spin(primitive))
            .count()
    }

    pub fn stops_of(&self, primitive: usize) -> usize {
        self.calls
            .iter()
            .filter(|call| **call == PrimitiveCall::Stop(primitive))
            .count()
    }

    pub fn last_created(&self) -> Option<&SpinnerOptions> {
        self.created.last()
    }
}

/// Shared view onto a recording factory that stays usable after the factory
/// has been moved into a registry.
#[derive(Debug, Clone, Default)]
pub struct SpinnerRecorder {
    log: Rc<RefCell<SpinnerCallLog>>,
    fail_creation: Rc<Cell<bool>>,
}

impl SpinnerRecorder {
    pub fn log(&self) -> SpinnerCallLog {
        self.log.borrow().clone()
    }

    pub fn create_count(&self) -> usize {
        self.log.borrow().create_count()
    }

    pub fn spin_count(&self) -> usize {
        self.log.borrow().spin_count()
    }

    pub fn stop_count(&self) -> usize {
        self.log.borrow().stop_count()
    }

    pub fn last_created(&self) -> Option<SpinnerOptions> {
        self.log.borrow().last_created().cloned()
    }

    pub fn fail_creation(&self, fail: bool) {
        self.fail_creation.set(fail);
    }
}

pub struct RecordingSpinnerFactory {
    recorder: SpinnerRecorder,
}

impl RecordingSpinnerFactory {
    pub fn with_recorder() -> (Self, SpinnerRecorder) {
        let recorder = SpinnerRecorder::default();
        (
            Self {
                recorder: recorder.clone(),
            },
            recorder,
        )
    }
}

impl SpinnerFactoryPort for RecordingSpinnerFactory {
    fn create(&self, options: &SpinnerOptions) -> Result<Box<dyn SpinnerPrimitive>, SpinnerError> {
        if self.recorder.fail_creation.get() {
            return Err(primitive_creation("recording factory told to fail"));
        }

        let mut log = self.recorder.log.borrow_mut();
        let index = log.created.len();
        log.created.push(options.clone());
        Ok(Box::new(RecordingPrimitive {
            index,
            log: Rc::clone(&self.recorder.log),
        }))
    }
}

struct RecordingPrimitive {
    index: usize,
    log: Rc<RefCell<SpinnerCallLog>>,
}

impl SpinnerPrimitive for RecordingPrimitive {
    fn spin(&mut self) {
        self.log.borrow_mut().calls.push(PrimitiveCall::Spin(self.index));
    }

    fn stop(&mut self) {
        self.log.borrow_mut().calls.push(PrimitiveCall::Stop(self.index));
    }
}
