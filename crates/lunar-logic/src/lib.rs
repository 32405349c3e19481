//! Pure evaluation engine for the lunar outpost planner.
//!
//! This crate contains all game logic that is independent of any renderer
//! or UI toolkit. Functions take plain data and return results, making
//! them unit-testable and usable from the headless harness, a desktop
//! front end, or a WASM page alike.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Map size, lunar cycle, comm range, penalties, score weights |
//! | [`constraints`] | Power balance, buildability, light/full evaluation, warnings |
//! | [`map`] | Per-cell terrain, solar, and resource generation for a mission day |
//! | [`mission`] | Mission descriptor, reference mission, placement rules |
//! | [`network`] | Comm link derivation and BFS connectivity from command |
//! | [`noise`] | Sine-hash value noise and octave noise |
//! | [`outpost`] | Outpost kinds, metadata table, placed outpost records |
//! | [`scoring`] | Cost, survival, science, stability, and overall scores |
//! | [`session`] | Orchestration: transitions + map regeneration + evaluation |
//! | [`state`] | Turn state, pure transitions, bounded undo history |
//! | [`terrain`] | Caller-owned crater layout (`TerrainSeed`) |

pub mod constants;
pub mod constraints;
pub mod map;
pub mod mission;
pub mod network;
pub mod noise;
pub mod outpost;
pub mod scoring;
pub mod session;
pub mod state;
pub mod terrain;
