//! # Itemshot
//!
//! Batch-composites product photographs: each row of a CSV job table layers
//! named image assets onto a fixed 600×600 white canvas, optionally overlays
//! auto-sized text in the top-right corner, and writes the result to the
//! output directory.

pub mod config;
pub mod data;
pub mod error;
pub mod image;
pub mod layer;
pub mod logs;
pub mod pipeline;
pub mod text;

pub use error::{Error, Result};
