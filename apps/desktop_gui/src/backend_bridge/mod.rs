//! Backend bridge: command queue from the UI and the worker that drains it.

pub mod commands;
pub mod runtime;
