pub mod prelude;

pub mod badge;
pub mod badge_defaults;
pub mod badge_design;
pub mod badge_permission;
pub mod badge_role;
pub mod badge_role_permissions;
pub mod badge_settings;
pub mod event;
pub mod event_admins;
pub mod helper;
pub mod helper_shifts;
pub mod job;
pub mod shift;
pub mod users;
