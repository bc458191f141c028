pub mod demand;
pub mod forecast;
pub mod inventory;
pub mod promotions;
pub mod suppliers;

pub use demand::*;
pub use forecast::*;
pub use inventory::*;
pub use promotions::*;
pub use suppliers::*;
