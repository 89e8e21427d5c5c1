//! Circular avatar masking.

pub(crate) mod circle;
