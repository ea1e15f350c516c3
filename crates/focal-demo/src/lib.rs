//! Focal Demo
//!
//! A todo page and a scripted keyboard session exercising the focus layer.

pub mod config;
pub mod page;
pub mod session;

pub use config::DemoConfig;
pub use page::{Todo, TodoPage, describe};
pub use session::{Step, run_session};
