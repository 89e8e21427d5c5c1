//! Frame compositing: avatar paste and whole-frame rotation.

pub(crate) mod composite;
pub(crate) mod rotate;
