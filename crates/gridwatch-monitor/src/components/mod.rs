//! TUI components.

pub mod dashboard;
pub mod discovery;
pub mod footer;
pub mod header;
pub mod jobs;
pub mod timeline;
pub mod view_tabs;

pub use dashboard::DashboardView;
pub use discovery::DiscoveryView;
pub use footer::Footer;
pub use header::{Header, HeaderInfo};
pub use jobs::JobsView;
pub use timeline::TimelineView;
pub use view_tabs::ViewTabs;
