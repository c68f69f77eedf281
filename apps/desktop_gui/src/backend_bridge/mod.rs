//! Backend bridge: command queue types and the worker that services them.

pub mod commands;
pub mod runtime;
