pub mod credentials;
pub mod diff_parser;
pub mod manifest_editor;
pub mod project_scanner;
pub mod version_control;

pub use credentials::NetrcWriter;
pub use diff_parser::{extract_added_dependency_line, parse_dependency_change};
pub use manifest_editor::{AppliedChange, ManifestEditor};
pub use project_scanner::ProjectScannerAgent;
pub use version_control::{GitAgent, VersionControl, check_branch_name};
