pub mod auc;
pub mod event;
pub mod regimen;
pub use event::*;
pub use regimen::{Regimen, RegimenBuilder};
