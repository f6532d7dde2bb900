//! Services for roasts, beans and blends

pub mod beans;
pub mod blends;
pub mod roasting;

pub use beans::BeanService;
pub use blends::BlendService;
pub use roasting::{RoastDraft, RoastService};
