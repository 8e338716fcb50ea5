//! Side-effecting operations: filesystem artifacts and process execution.

pub mod batch;
pub mod process;
pub mod rcfile;
pub mod script;
