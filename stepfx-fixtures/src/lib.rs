#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

pub mod chars;
pub mod counting;
pub mod equals;
pub mod string_iter;
pub mod transcript;
pub mod two_items;

pub use chars::{char_iter_from_string, CharIter};
pub use counting::CountUp;
pub use equals::{str_iter_equals, str_iter_equals_inverse, EqualsBody};
pub use string_iter::{IterClone, IterNext, StrIter};
pub use transcript::{assert_transcript, exchange, Exchange};
pub use two_items::{EmitTwice, ResultSecond};
