//! Memory Model
//!
//! Address types and the simulated per-process user segment. Paging and
//! physical memory are the virtual-memory subsystem's business; this
//! layer only needs to tell user addresses from kernel ones and perform
//! checked accesses.

mod address;
mod uspace;

pub use address::{VirtAddr, USER_CODE_BASE, USER_TOP, WORD_SIZE};
pub use uspace::{UserFault, UserSpace};
