use crate::config::Config;
use crate::error::Result;
use crate::server;

pub async fn execute(bind: Option<&str>) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(bind) = bind {
        config.server.bind = bind.to_string();
    }

    server::serve(&config).await
}
