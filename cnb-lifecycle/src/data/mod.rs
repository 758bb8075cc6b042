//! Data structures for the files exchanged with the CNB lifecycle.

pub mod build_plan;
pub mod buildpack;
pub mod buildpack_plan;
pub mod launch;
pub mod layer_content_metadata;
