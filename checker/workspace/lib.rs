mod build_constraints;
mod discovery;
mod patterns;
mod types;

pub use build_constraints::{BuildContext, ConstraintError};
pub use discovery::{discover_workspace, find_workspace_root};
pub use patterns::select_packages;
pub use types::{DiscoveredPackage, DiscoveryError, PackageId, Workspace, WorkspaceRoot};
