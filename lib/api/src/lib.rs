pub mod rest;

pub use rest::{configure, status_for, ApiState, RestApi};
