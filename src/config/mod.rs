//! Stage-aware variable composition.
//!
//! Composes two namespaces of a service document from files next to it:
//! 1. **Custom** (`custom`) - `variables.<ext>` then `variables.<stage>.<ext>`, deep merged
//! 2. **Environment** (`provider.environment`) - `environment.<ext>` then
//!    `environment.<stage>.<ext>`, shallow merged
//!
//! ## Sources
//! - Inline object values are the lowest-precedence source
//! - A `${file(path)}` string replaces the conventional names with `path`
//!   and its `<name>.<stage>.<ext>` sibling
//! - Extensions are probed in the order `yml`, `yaml`, `json`, `js`

pub mod files;
mod loader;
mod merge;
mod reference;

pub use files::{FileExtension, FileSystem, SUPPORTED_EXTENSIONS, ServiceDir, probe_extension};
pub use loader::{Composer, Composition, Namespace, Resolved};
pub use merge::{MergeStrategy, deep_merge, merge, shallow_merge};
pub use reference::{FileReference, stage_file_path};
