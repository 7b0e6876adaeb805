mod camera;
mod light;
mod material;
mod mesh;
mod resources;
mod tag;
mod transform;

pub use camera::*;
pub use light::*;
pub use material::*;
pub use mesh::*;
pub use resources::*;
pub use tag::*;
pub use transform::*;
