//! Generates and stores the release notes document for one release.
use log::*;

use crate::{command::write_output, error::Result, service::ReleaseService};

pub async fn execute(
    service: &ReleaseService,
    id: &str,
    output: Option<String>,
) -> Result<()> {
    let document = service.generate(id).await?;

    if !document.failures.is_empty() {
        warn!(
            "{} items could not be summarized; their entries are placeholders",
            document.failures.len()
        );
    }

    if let Some(out_file) = output {
        info!("writing release notes for {id} to: {out_file}");
        write_output(&out_file, &document.markdown).await?;
    } else {
        print!("{}", document.markdown);
    }

    Ok(())
}
