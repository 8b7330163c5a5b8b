//! Integration tests for the faces request-processing core

mod config_loading;
mod exception_dispatch;
mod partial_writer;
mod properties;
mod request_lifecycle;
mod scoped_maps;
mod test_utils;
