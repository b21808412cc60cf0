//! Core domain
//!
//! Pure data and encoding logic: key codecs, lamport arithmetic, program
//! layouts. Nothing here talks to the network.

pub mod anchor;
pub mod enrollment;
pub mod idl;
pub mod keys;
pub mod lamports;
pub mod network;
pub mod result;

pub use enrollment::{EnrollmentProgram, SubmissionTrack};
pub use lamports::LAMPORTS_PER_SOL;
pub use network::{Cluster, Commitment};
