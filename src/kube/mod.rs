//! # Remote Resource API
//!
//! The subset of the Kubernetes API the stores rely on: get-by-name,
//! merge-patch-by-name, create, and delete-by-name against one namespaced
//! resource collection.
//!
//! - [`ResourceClient`]: the access handle trait every remote store is built on
//! - [`HttpResourceClient`]: `reqwest` implementation for a live cluster
//! - [`MemoryResourceClient`]: in-process implementation for tests and
//!   offline use
//! - [`Status`]: API server failure responses, classified by
//!   [`StoreError::is_not_found_status`](crate::StoreError::is_not_found_status)

pub mod client;
pub mod memory;
pub mod objects;
pub mod resource;
pub mod status;

pub use client::{HttpResourceClient, ResourceClient, MERGE_PATCH_CONTENT_TYPE};
pub use memory::{apply_merge_patch, MemoryResourceClient};
pub use objects::{AnnotationPatch, DataField, DataObject, DataPatch, ObjectMeta, PartialObject};
pub use resource::ResourceType;
pub use status::Status;
