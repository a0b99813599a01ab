//! Browser implementations of the session crate's I/O seams.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` sends requests with `gloo-net`, `storage` keeps the token in
//! `localStorage`. During server rendering both degrade to inert stand-ins so
//! the same component tree renders on either side.

pub mod storage;
pub mod transport;
