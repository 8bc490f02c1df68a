//! Built-in chip behaviors for the weft simulation engine.
//!
//! Each public function returns a ready-made
//! [`BuiltinTemplate`](weft_core::BuiltinTemplate) with freshly allocated
//! pins, so every call produces an independent template. Sharing one
//! returned template across several chip instances is also valid: the
//! mesh disambiguates instances by ancestry, and stateless behaviors
//! (sources, gates) are safe to share. Stateful behaviors such as
//! [`Toggle`] expose their state handle so callers can stimulate the
//! circuit between ticks.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod gates;
pub mod source;
pub mod toggle;

pub use gates::{nand, nor};
pub use source::{driven, pulled};
pub use toggle::{toggle, Toggle};
