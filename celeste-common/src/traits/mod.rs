pub mod collaborator_traits;

pub use collaborator_traits::{FileLister, IconResolver, PlatformApi, VibeKeeper, ViewerResolver};
