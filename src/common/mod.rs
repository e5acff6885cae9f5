//! Helpers shared by the decoders.
pub(crate) mod parse;
