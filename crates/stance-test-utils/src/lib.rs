//! Shared test fixtures for the stance crates.
//!
//! Provides a humanoid URDF, generated controller and hardware documents
//! for it, and a table-backed kinematic tree.

pub mod biped;
pub mod documents;
pub mod mocks;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use biped::{
    BIPED_DOFS, LEFT_FOOT_ID, RIGHT_FOOT_ID, actuated_efforts, actuated_joint_names, biped_model,
    biped_urdf,
};
pub use documents::{
    DocumentFiles, biped_controller_document, biped_metadata, hardware_document,
    hardware_joint_names, parameter_set, remove_path, set_path, write_documents,
};
pub use mocks::MockTree;
