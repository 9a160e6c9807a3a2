mod anim;
mod app;
mod config;
mod ecs;
mod error;
mod gallery;
mod layout;
mod orchestrator;
mod render;
mod rig;
mod state;
mod tile;
mod topbar;

fn main() {
    env_logger::init();
    log::info!("Carousel starting up");

    if let Err(e) = app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
