use pinwheel::app::App;
use pinwheel::config;
use pinwheel::sys::runtime;
use pinwheel::sys::server::Subscribers;

fn main() {
    env_logger::init();

    match config::write_default_config() {
        Ok(path) => log::debug!("Using config {}", path.display()),
        Err(e) => log::warn!("Failed to write default config: {}", e),
    }
    let config = config::load_or_default();

    let subscribers = Subscribers::default();
    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(config.socket_path.clone(), tx, subscribers.clone());

    App::new(&config, subscribers).run(rx);
}
