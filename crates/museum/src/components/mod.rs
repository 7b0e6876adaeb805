mod exhibit;

pub use exhibit::*;
