//! Static source GIF storage.

pub(crate) mod store;
