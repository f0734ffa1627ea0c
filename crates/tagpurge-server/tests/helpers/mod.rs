//! Test helpers para tagpurge-server.

#![allow(dead_code, unused_imports)]

pub mod backend;
pub mod client;

pub use backend::{Call, MockBackend};
pub use client::{TestClient, TestResponse, app, app_with_dedup, client};
