//! Pipeline stages for decoding and encoding Ignition documents.
//!
//! Each submodule implements exactly one concern, so each is independently
//! testable.
//!
//! ## Data Flow
//!
//! ```text
//! document ──▶ transform ──▶ document
//!  (load)      │      ▲       (save)
//!              ▼      │
//!            codec ──▶ materialize
//!          (data URI)   (files on disk)
//! ```
//!
//! 1. [`document`]    — load, discover and save the JSON tree
//! 2. [`transform`]   — walk `storage.files`, plan and apply source rewrites
//! 3. [`codec`]       — parse data URIs and transcode their payloads
//! 4. [`materialize`] — deterministic payload paths and byte I/O

pub mod codec;
pub mod document;
pub mod materialize;
pub mod transform;
