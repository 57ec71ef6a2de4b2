//! FrameFit Asset Store
//!
//! Filesystem side of bezel handling:
//! - **Library:** locating and decoding bezel artwork
//! - **Region table:** the persisted filename -> rectangle mapping
//! - **Store:** read-through region/mask lookup with live flood-fill
//!   fallback and catalog resolution
//!
//! Detection itself lives in `framefit-detect-core`; this crate decides
//! where results come from and where they are kept.

pub mod library;
pub mod regions;
pub mod store;

pub use library::BezelLibrary;
pub use regions::RegionTable;
pub use store::RegionStore;
