pub(crate) mod gamification;
