//! Dispatch runtime: values, method tables, libraries and the fluent wrapper.

pub mod api;
pub mod ds;
pub mod plugin;
pub mod repository;
pub mod std_lib;
