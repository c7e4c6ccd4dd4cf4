//! # aig-rs: DAG-aware rewriting of And-Inverter Graphs in Rust
//!
//! **`aig-rs`** is a safe, manager-centric library for **And-Inverter Graphs
//! (AIGs)** and their incremental optimization by DAG-aware rewriting.
//! It is designed for logic synthesis, equivalence checking front-ends, and
//! combinational optimization pipelines.
//!
//! ## What is an AIG?
//!
//! An And-Inverter Graph represents a boolean network using only two-input
//! AND nodes and edge-level complement attributes. Construction goes through
//! a **structural hash**, so structurally identical nodes are shared and the
//! trivial identities (`x & 1`, `x & 0`, `x & x`, `x & !x`) never materialize
//! as nodes.
//!
//! ## What is DAG-aware rewriting?
//!
//! Rewriting replaces the small cone of logic above each node with a
//! pre-computed, functionally equivalent structure, **accounting for
//! sharing**: logic reachable from elsewhere in the network is not charged
//! to the replacement, and existing nodes are reused through the structural
//! hash. One pass visits every node once, in creation order, and accepts a
//! replacement only when it strictly shrinks the network (optionally also
//! when it breaks even).
//!
//! ## Key Features
//!
//! - **Manager-Centric Architecture**: all construction goes through the
//!   [`Network`][crate::network::Network] manager, which owns the node arena,
//!   the structural hash, and the fanout lists.
//! - **Transactional Substitutions**: a replacement either commits fully or
//!   rolls back without a trace, so the network is structurally sound after
//!   every step, even when construction capacity runs out.
//! - **NPN-Canonical Matching**: cut functions are canonized up to input
//!   negation, input permutation, and output negation, so each function
//!   class is synthesized at most once per pass.
//! - **Depth Control**: the update-aware level mode refuses replacements
//!   that would deepen the network.
//!
//! ## Basic Usage
//!
//! ```rust
//! use aig_rs::network::Network;
//! use aig_rs::rewrite::{rewrite, RewriteOptions};
//!
//! // Build xor(a, b) twice, structured differently.
//! let mut network = Network::new();
//! let a = network.add_input();
//! let b = network.add_input();
//! let p = network.mk_and(a, -b).unwrap();
//! let q = network.mk_and(-a, b).unwrap();
//! let f = network.mk_and(-p, -q).unwrap();
//! let u = network.mk_and(a, b).unwrap();
//! let v = network.mk_and(-a, -b).unwrap();
//! let g = network.mk_and(-u, -v).unwrap();
//! network.add_output(-f);
//! network.add_output(g);
//! assert_eq!(network.num_ands(), 6);
//!
//! // One rewriting pass discovers the duplication and shares one structure.
//! let result = rewrite(&mut network, &RewriteOptions::default());
//! assert_eq!(result.status.code(), 1);
//! assert_eq!(network.num_ands(), 3);
//! ```
//!
//! ## Core Components
//!
//! - **[`network`]**: the [`Network`][crate::network::Network] manager and
//!   the structural-hash construction primitives.
//! - **[`rewrite`]**: the rewriting pass, its options, and its statistics.
//! - **[`cut`]**: k-feasible cut enumeration with truth-table propagation.
//! - **[`npn`]** and **[`library`]**: canonical function classes and the
//!   synthesized replacement templates.
//! - **[`check`]**: the structural integrity check run after every pass.
//! - **[`sim`]**: bit-parallel simulation, the functional oracle of the
//!   test suite.
//! - **[`dot`]**: Graphviz export for visualizing small networks.

pub mod check;
pub mod cut;
pub mod dgraph;
pub mod dot;
pub mod edge;
pub mod level;
pub mod library;
pub mod network;
pub mod npn;
pub mod progress;
pub mod rewrite;
pub mod sim;
pub mod strash;
pub mod substitute;
pub mod truth;
pub mod utils;
