//! API models for request and response payloads

use serde::Serialize;

pub mod playlist;
pub mod track;
pub mod user;

/// Wrapper of every successful JSON response
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
