//! Topic tables: theme refinement, excerpt-level modeling, clustering and
//! comparison.

pub mod cluster;
pub mod compare;
pub mod excerpts;
pub mod refine;

pub use cluster::TopicRow;
