//! Reference site adapters, one module per target catalog.

mod petsmart;
mod petvalu;

pub use petsmart::{petsmart_next_control, PetSmartAdapter};
pub use petvalu::PetValuAdapter;
