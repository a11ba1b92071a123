//! Role-based view gating.
//!
//! Mirrors the console's routing rules: superadmins get the
//! platform-wide management views, org admins get single-organization
//! views, and members get nothing at all.

use hwa_core::Role;

/// The console's views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleView {
    /// Pipeline analytics landing page (platform-wide for superadmins).
    Dashboard,
    /// Organization member management.
    Members,
    /// Single member detail page.
    MemberDetail,
    /// Students & members roster.
    Students,
    /// Platform organization management.
    Organizations,
    /// All platform users.
    PlatformUsers,
    /// Own profile and password settings.
    Profile,
}

impl ConsoleView {
    /// The route path this view lives under.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/",
            Self::Members => "/members",
            Self::MemberDetail => "/members/:id",
            Self::Students => "/students",
            Self::Organizations => "/organizations",
            Self::PlatformUsers => "/platform-users",
            Self::Profile => "/profile",
        }
    }
}

/// Outcome of asking whether a role may open a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAccess {
    /// The view renders.
    Granted,
    /// The console sends the user elsewhere instead.
    Redirect(ConsoleView),
    /// No console access at all.
    Denied,
}

/// Resolve a view request for a role.
///
/// Superadmins navigating to Members land on `PlatformUsers` instead
/// (they have no single organization to manage); admins asking for
/// platform-wide views are sent back to the dashboard.
#[must_use]
pub const fn resolve(role: Role, view: ConsoleView) -> ViewAccess {
    match role {
        Role::Member => ViewAccess::Denied,
        Role::Admin => match view {
            ConsoleView::Organizations | ConsoleView::PlatformUsers => {
                ViewAccess::Redirect(ConsoleView::Dashboard)
            }
            _ => ViewAccess::Granted,
        },
        Role::Superadmin => match view {
            ConsoleView::Members => ViewAccess::Redirect(ConsoleView::PlatformUsers),
            ConsoleView::Students => ViewAccess::Redirect(ConsoleView::Dashboard),
            _ => ViewAccess::Granted,
        },
    }
}

/// The navigation menu shown to a role. Empty for members.
#[must_use]
pub const fn navigation(role: Role) -> &'static [ConsoleView] {
    match role {
        Role::Member => &[],
        Role::Admin => &[
            ConsoleView::Dashboard,
            ConsoleView::Members,
            ConsoleView::Students,
        ],
        Role::Superadmin => &[
            ConsoleView::Dashboard,
            ConsoleView::Organizations,
            ConsoleView::PlatformUsers,
        ],
    }
}

/// Where a freshly logged-in user lands. `None` means no console access.
#[must_use]
pub const fn landing_view(role: Role) -> Option<ConsoleView> {
    if role.can_use_console() {
        Some(ConsoleView::Dashboard)
    } else {
        None
    }
}
