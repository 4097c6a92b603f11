pub mod collation;
pub mod domain;
pub mod error;
pub mod view;
