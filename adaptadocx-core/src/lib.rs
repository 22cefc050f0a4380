#![doc = "adaptadocx-core: build orchestration library for Adaptadocx."]

//! This crate holds every piece of the documentation build that is not CLI glue:
//! resolving where the site generator left its output, patching playbooks for
//! local builds, driving the PDF and DOCX toolchains per locale and version,
//! and copying the finished artifacts into the site's download folders.
//!
//! Rendering itself is delegated to external programs (Antora, Asciidoctor,
//! Pandoc); they are reached only through the [`contract::CommandRunner`] seam.
//!
//! # Usage
//! Build a [`config::BuildConfig`], pick a runner ([`tools::SystemRunner`] in
//! production, `MockCommandRunner` in tests) and call one of the targets in
//! [`pipeline`].

pub mod banned;
pub mod config;
pub mod contract;
pub mod error;
pub mod exports;
pub mod images;
pub mod layout;
pub mod pipeline;
pub mod playbook;
pub mod tools;
pub mod validate;
pub mod versions;

pub use error::BuildError;
