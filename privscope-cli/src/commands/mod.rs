pub mod common;
pub mod extract;
pub mod fetch;
pub mod info;
