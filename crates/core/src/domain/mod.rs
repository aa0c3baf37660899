pub mod payload;
pub mod view;
