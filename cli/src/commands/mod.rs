//! CLI commands for the shabda tokenizer.

pub mod decode;
pub mod encode;
pub mod preprocess;
pub mod train;

pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use preprocess::PreprocessCommand;
pub use train::TrainCommand;
