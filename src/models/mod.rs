mod academics;
mod institution;
mod people;
mod scheduling;

pub use academics::*;
pub use institution::*;
pub use people::*;
pub use scheduling::*;
