pub mod app;
pub mod generate;

pub use app::{health_check, index};
pub use generate::generate_image;
