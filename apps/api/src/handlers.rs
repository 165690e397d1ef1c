pub mod admin_groups;
pub mod admins;
pub mod health;
pub mod preflight;
