//! Asset management system

pub mod resource_cache;

pub use resource_cache::{
    MaterialDescriptor, ModelDescriptor, ResourceCache, ResourceError, ShaderDescriptor,
    TextureDescriptor,
};
