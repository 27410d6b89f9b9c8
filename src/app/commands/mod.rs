pub mod catalog;
pub mod devices;
pub mod dispatcher;
pub mod form_builder;
