mod controller;
mod hover;
mod notice;

pub use controller::*;
pub use hover::*;
pub use notice::*;
