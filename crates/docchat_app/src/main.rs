mod app;
mod commands;
mod config;
mod effects;
mod logging;
mod render;

fn main() -> anyhow::Result<()> {
    app::run_app()
}
