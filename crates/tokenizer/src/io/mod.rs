//! Model persistence: the JSON model file format, loading and saving.

pub mod format;
pub mod load;
pub mod save;

pub use format::SerializedModel;
pub use load::ModelLoader;
pub use save::ModelSaver;
