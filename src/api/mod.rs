pub(crate) mod activities;
pub(crate) mod auth;
pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod meetings;
pub(crate) mod query;
pub(crate) mod router;
pub(crate) mod users;
