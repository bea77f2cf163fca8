use std::sync::Arc;

use crate::{error::Result, server, service::ReleaseService};

pub async fn execute(service: ReleaseService, host: &str, port: u16) -> Result<()> {
    server::start_server(Arc::new(service), host, port).await
}
