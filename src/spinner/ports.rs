use crate::spinner::{error::SpinnerError, types::SpinnerOptions};

/// Opaque rendering primitive. Calls always succeed.
pub trait SpinnerPrimitive {
    fn spin(&mut self);
    fn stop(&mut self);
}

pub trait SpinnerFactoryPort {
    /// Builds exactly one primitive from `options`, passed through unmodified.
    fn create(&self, options: &SpinnerOptions) -> Result<Box<dyn SpinnerPrimitive>, SpinnerError>;
}

/// Broadcast control surface injected into the host application.
pub trait SpinnerControlPort {
    fn spin(&self, key: Option<&str>);
    fn stop(&self, key: Option<&str>);
}
