// Account profile and job preferences. Preferences feed the search form and the
// dashboard's "profile complete" flag.

pub mod handlers;
pub mod store;
pub mod validation;
