pub mod invocation;
pub mod normalise;
pub mod transfer;
