//! Shared test utilities for the folder mirror workspace.
//!
//! This crate provides standardised source/replica fixtures so crate test
//! suites do not each hand-roll temp trees. It is a dev-dependency only and
//! never published.
//!
//! # Modules
//!
//! - [`fixture`] — [`MirrorFixture`](fixture::MirrorFixture) with a source and
//!   a replica tree, mtime control and tree snapshots

pub mod fixture;

pub use fixture::{Entry, MirrorFixture, snapshot};
