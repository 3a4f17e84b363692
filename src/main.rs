use log::warn;
use observatory::config::ObservatoryConfig;
use observatory::{App, init_logging};

fn main() {
	let (config, rejected) = ObservatoryConfig::from_location();
	init_logging(config.log_level);
	for e in rejected {
		warn!("{}", e);
	}
	leptos::mount::mount_to_body(move || leptos::view! { <App config=config /> });
}
