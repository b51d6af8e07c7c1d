use crate::spinner::{
    error::SpinnerError,
    ports::{SpinnerFactoryPort, SpinnerPrimitive},
    types::SpinnerOptions,
};

type PrimitiveConstructor =
    dyn Fn(&SpinnerOptions) -> Result<Box<dyn SpinnerPrimitive>, SpinnerError>;

/// Factory backed by a host-supplied constructor closure.
pub struct FnSpinnerFactory {
    constructor: Box<PrimitiveConstructor>,
}

impl FnSpinnerFactory {
    pub fn new<F>(constructor: F) -> Self
    where
        F: Fn(&SpinnerOptions) -> Result<Box<dyn SpinnerPrimitive>, SpinnerError> + 'static,
    {
        Self {
            constructor: Box::new(constructor),
        }
    }
}

impl SpinnerFactoryPort for FnSpinnerFactory {
    fn create(&self, options: &SpinnerOptions) -> Result<Box<dyn SpinnerPrimitive>, SpinnerError> {
        (self.constructor)(options).inspect_err(|err| {
            tracing::warn!(
                target: "spinner",
                error = %err,
                option_count = options.len(),
                "primitive_creation_failed"
            );
        })
    }
}
