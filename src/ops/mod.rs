//! High-level operations.
//!
//! This module contains the implementation of lpm commands.

pub mod lpm_add;
pub mod lpm_install;
pub mod lpm_remove;
pub mod lpm_status;
pub mod lpm_update;

pub use lpm_add::{add_dependency, remove_dependency, AddResult};
pub use lpm_install::{
    install_dependency, install_project, InstallFailure, InstallOutcome, ProjectInstallReport,
    Stage,
};
pub use lpm_remove::uninstall;
pub use lpm_status::{list_installed, package_status, PackageStatus};
pub use lpm_update::{configured_repositories, update_repositories, UpdateReport};
