pub mod form;
pub mod service;
