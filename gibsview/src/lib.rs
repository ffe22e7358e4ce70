#![doc = include_str!("../README.md")]

pub mod config;
pub mod render;
pub mod session;
pub mod timelapse;
