pub(crate) mod activities;
pub(crate) mod badges;
pub(crate) mod meetings;
pub(crate) mod schools;
pub(crate) mod seeds;
pub(crate) mod themes;
pub(crate) mod users;
