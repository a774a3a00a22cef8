//! Save-image integrity for handheld RPG saves from generation 4 to 7:
//! locating the authoritative copy of double-buffered regions and
//! recomputing every block checksum after an edit.
//!
//! The crate never performs I/O. Callers hand in the whole image as a byte
//! slice and get it back with only checksum bytes changed.

pub mod checksum;
pub mod core_api;
pub mod format;
pub mod layout;
pub mod rewrite;
pub mod slot;
pub mod version;

pub use rewrite::{NoResign, Resigner, RewriteSummary, rewrite_checksums, verify_checksums};
pub use slot::{
    ActiveSlots, SlotIndex, locate_active_slots, locate_general_block, locate_storage_block,
};
pub use version::{Family, GameVersion};
