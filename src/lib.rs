// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Persistent, hierarchical grouping of 3D scene objects, plus the
//! clustering tools that derive groups automatically.
//!
//! The crate never owns scene objects. A host implements the collaborator
//! traits in [`entity`] and hands live entities to the grouper, which
//! stores durable [`entity::EntityRef`]s.
//!
//! # Key entry points
//!
//! - [`manager::GroupManager`] - CRUD over the group tree, cascading
//!   visibility/lock, reverse membership lookup, undo descriptors
//! - [`cluster`] - filters, partitions (material, tag, proximity, grid),
//!   pivots, align/snap
//! - [`naming`] - `{token}` naming templates
//! - [`options::GrouperOptions`] - TOML configuration
//! - [`scene::MemoryScene`] - in-memory host used by the CLI and tests
//!
//! # Architecture
//!
//! The [`store::GroupStore`] is the single source of truth and is written
//! through to a JSON file after every mutating call. The
//! [`cache::MembershipCache`] is a derived entity -> groups index, rebuilt
//! in full whenever membership, structure or the set of live entities
//! changes. Clustering functions are stateless; their output is fed to
//! [`manager::GroupManager::create_smart_groups`].

pub mod cache;
pub mod cluster;
pub mod entity;
pub mod error;
pub mod group;
pub mod manager;
pub mod naming;
pub mod options;
pub mod scene;
pub mod store;

pub use error::GrouperError;
pub use manager::GroupManager;
