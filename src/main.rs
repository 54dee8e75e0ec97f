use cytodrift::{SceneConfig, TextureSources};

fn main() {
    env_logger::init();

    // Optional first argument: directory holding the texture images.
    let sources = match std::env::args().nth(1) {
        Some(dir) => {
            log::info!("Loading textures from {}", dir);
            TextureSources::from_dir(dir)
        }
        None => {
            log::info!("Using procedural textures");
            TextureSources::procedural()
        }
    };

    if let Err(e) = cytodrift::run(SceneConfig::default(), sources) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
