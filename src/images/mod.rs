pub mod services;

pub use services::normalize_image;
