pub mod core;
pub mod scene;
