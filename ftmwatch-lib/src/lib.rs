#![allow(clippy::new_without_default)]

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod extractor;
pub mod model;
pub mod similarity;
pub mod template;

#[macro_use]
extern crate diesel;
