pub mod automation;
pub mod error;
pub mod metadata;
pub mod pipeline;
pub mod platforms;
pub mod scorer;
pub mod segmenter;
pub mod transcript;
