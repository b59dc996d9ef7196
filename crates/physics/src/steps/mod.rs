pub(crate) mod integration;
pub(crate) mod joint;
pub(crate) mod sleep;
