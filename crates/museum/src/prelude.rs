pub use crate::components::*;
pub use crate::controller::MuseumController;
pub use crate::highlight::HighlightTable;
pub use crate::notice::Notices;
pub use crate::utils::raycast::Ray;
pub use mathaf_engine::prelude::*;
