pub mod attachment;
pub mod error;
pub mod factory;
pub mod handle;
pub mod merge;
pub mod noop;
pub mod ports;
pub mod registry;
pub mod testing;
pub mod types;

pub use attachment::{AttachRequest, BindingChange, SpinnerAttachment};
pub use error::{SpinnerError, SpinnerErrorKind};
pub use factory::FnSpinnerFactory;
pub use handle::{HandleSpec, SpinnerHandle};
pub use merge::merge;
pub use noop::{NoopSpinnerFactory, NoopSpinnerPrimitive};
pub use ports::{SpinnerControlPort, SpinnerFactoryPort, SpinnerPrimitive};
pub use registry::SpinnerRegistry;
pub use types::{
    HandleId, OptionValue, SpinState, SpinnerConfig, SpinnerKey, SpinnerOptions, ThemeName,
};
