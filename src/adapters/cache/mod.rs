//! Cache adapters - local session snapshot mirrors.

mod file_mirror;
mod in_memory_mirror;

pub use file_mirror::FileCacheMirror;
pub use in_memory_mirror::InMemoryCacheMirror;
