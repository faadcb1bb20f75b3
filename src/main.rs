use env_logger::Builder;
use launchd_activate::{get_command, run, Config};
use log::error;

#[tokio::main]
async fn main() {
    let mut builder = Builder::from_default_env();
    builder.format_timestamp(None).init();

    let matches = get_command().get_matches();
    match Config::try_from(&matches) {
        Ok(config) => {
            if let Err(e) = run(config).await {
                error!("launchd-activate stopped: {}", e);
            }
        }
        Err(e) => error!("Could not start launchd-activate: {}", e),
    }
}
