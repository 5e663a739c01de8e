// Copyright (c) 2026 Blockgate Contributors. MIT License.
// See LICENSE for details.

//! # Blockgate: Block-Queue Admission
//!
//! A peer announces "I produced block N". Before the node spends bandwidth
//! and a chain lock pulling it, something has to decide whether N is worth
//! chasing. That something lives here.
//!
//! ## Architecture
//!
//! - **config**: defaults for rollback depth, ports and timing.
//! - **storage**: the local chain tip and the single-slot candidate queue,
//!   persisted in sled.
//! - **network**: honor-node address resolution and the `ChainUpdater`
//!   seam to the block fetch pipeline.
//! - **admission**: the policy, the single-flight controller, and the
//!   daemon that runs it on a timer.
//!
//! Fetching, verifying and applying blocks happen behind `ChainUpdater`.
//! This crate never opens a socket.

pub mod admission;
pub mod config;
pub mod network;
pub mod storage;
