mod app;
mod config;
mod error;
mod library;
mod logging;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
