pub mod resolve;
pub mod ring;
pub mod timeline;
pub mod validate;
