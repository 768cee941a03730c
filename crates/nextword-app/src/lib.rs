// Library root: the prediction controller and the application event loop
// that drives it.

pub mod app;
pub mod controller;
