//! Unicode utilities: grapheme segmentation, special-token merging, and
//! display width.

mod grapheme;
mod special;
mod width;

pub use grapheme::{Segmenter, segment};
pub use special::{SpecialChars, merge_special};
pub use width::{WidthMethod, display_width, display_width_with_method};
