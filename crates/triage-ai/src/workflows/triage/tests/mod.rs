mod common;
mod recommendations;
mod routing;
mod service;
