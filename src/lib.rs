#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod analysis;
pub mod app;
pub mod classification;
pub mod config;
pub mod observability;
pub mod pipeline;
pub mod util;
