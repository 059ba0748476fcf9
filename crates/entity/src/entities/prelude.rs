pub use super::badge::Entity as Badge;
pub use super::badge_defaults::Entity as BadgeDefaults;
pub use super::badge_design::Entity as BadgeDesign;
pub use super::badge_permission::Entity as BadgePermission;
pub use super::badge_role::Entity as BadgeRole;
pub use super::badge_role_permissions::Entity as BadgeRolePermissions;
pub use super::badge_settings::Entity as BadgeSettings;
pub use super::event::Entity as Event;
pub use super::event_admins::Entity as EventAdmins;
pub use super::helper::Entity as Helper;
pub use super::helper_shifts::Entity as HelperShifts;
pub use super::job::Entity as Job;
pub use super::shift::Entity as Shift;
pub use super::users::Entity as Users;
