pub mod clips;
pub mod jobs;
pub mod settings;
pub mod videos;
