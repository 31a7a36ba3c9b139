mod loader_tests;
mod quality_tests;
mod utils;
