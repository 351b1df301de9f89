// One handler module per resource; admin-only handlers take the AuthAdmin
// extractor as their first argument, public reads go unguarded.
pub mod auth;
pub mod contact;
pub mod contact_info;
pub mod projects;
pub mod skills;
pub mod writings;
