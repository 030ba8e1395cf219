#![allow(clippy::too_many_arguments, clippy::type_complexity)]

pub mod error;
pub mod validation;
pub mod model;
pub mod db;
pub mod ops;
pub mod queries;
pub mod extract;
pub mod integrations;
pub mod config;
pub mod telemetry;
pub mod api;
