pub mod command_runner;
pub mod object_store;
