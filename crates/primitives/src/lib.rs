//! Content-addressed leaves, the DAGs they form, and the Merkle capability
//! used to verify them.

pub mod builder;
pub mod cache;
pub mod dag;
pub mod hash;
pub mod leaf;
pub mod merkle;

pub use builder::{DagBuilder, DagLeafBuilder};
pub use cache::CacheData;
pub use dag::{Dag, DagError};
pub use leaf::{ClassicTreeBranch, DagLeaf, DagLeafData, LeafError, LeafType};
pub use merkle::MerkleProof;
