//! Built-in pipeline module implementations.

pub mod filter;
pub mod for_each;
pub mod int_source;
pub mod multiply;
pub mod to_string;
pub mod transform;

pub use filter::FilterModule;
pub use for_each::ForEachModule;
pub use int_source::IntSourceModule;
pub use multiply::MultiplyModule;
pub use to_string::ToStringModule;
pub use transform::TransformModule;
