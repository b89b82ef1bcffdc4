pub mod controller;
pub mod markers;
pub mod panel;
pub mod surface;
