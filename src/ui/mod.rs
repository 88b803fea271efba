pub mod container;

pub use container::{ContainerElement, MapContainer};
