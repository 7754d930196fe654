pub mod embedded;
pub mod factory;
#[cfg(feature = "llama")]
pub mod llama;
pub mod remote;
pub mod traits;

pub use embedded::{EmbeddedInference, ModelSession};
pub use factory::create_inference;
pub use remote::RemoteInference;
pub use traits::{InferenceAdapter, Readiness};
