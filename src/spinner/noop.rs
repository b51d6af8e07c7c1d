use crate::spinner::{
    error::SpinnerError,
    ports::{SpinnerFactoryPort, SpinnerPrimitive},
    types::SpinnerOptions,
};

#[derive(Debug, Clone, Default)]
pub struct NoopSpinnerPrimitive;

impl SpinnerPrimitive for NoopSpinnerPrimitive {
    fn spin(&mut self) {}

    fn stop(&mut self) {}
}

#[derive(Debug, Clone, Default)]
pub struct NoopSpinnerFactory;

impl SpinnerFactoryPort for NoopSpinnerFactory {
    fn create(
        &self,
        _options: &SpinnerOptions,
    ) -> Result<Box<dyn SpinnerPrimitive>, SpinnerError> {
        Ok(Box::new(NoopSpinnerPrimitive))
    }
}
