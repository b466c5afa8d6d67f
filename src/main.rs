use tracing::error;
use waitlist::{config::AppConfig, App, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // We have a different logging mechanism for production
    #[cfg(not(debug_assertions))]
    {
        waitlist::init_production_tracing()
    }
    #[cfg(debug_assertions)]
    {
        waitlist::init_dbg_tracing();
    }

    let config = AppConfig::load().inspect_err(|er| error!("{:<20} - {er}", "startup"))?;
    let app = App::build_from_config(config)
        .await
        .inspect_err(|er| error!("{:<20} - {er}", "startup"))?;

    waitlist::serve(app).await
}
