//! Projection and volume geometry descriptors.
//!
//! These are the two outputs the downstream reconstruction engine consumes:
//! a cone-beam projection geometry (where rays originate and land) and a
//! rotated volume geometry (where the reconstructed object lives, per angle).

mod cone;
mod volume;

pub use cone::*;
pub use volume::*;
