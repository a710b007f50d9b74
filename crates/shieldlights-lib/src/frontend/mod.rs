//! Protocol front-ends — the two platform ABI generations over one core.

pub mod aidl;
pub mod hidl;

pub use aidl::AidlLights;
pub use hidl::HidlLights;
