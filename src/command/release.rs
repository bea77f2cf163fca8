//! Release record subcommands.
use log::*;
use tokio::fs;

use crate::{
    cli::{ReleaseCommand, ReleaseDetails},
    error::{RelnotesError, Result},
    release::{ReleaseDraft, ReleasePatch, split_list},
    service::ReleaseService,
};

pub async fn execute(service: &ReleaseService, cmd: ReleaseCommand) -> Result<()> {
    match cmd {
        ReleaseCommand::Create {
            project,
            version,
            details,
        } => {
            let draft = draft_from_args(project, version, details).await?;
            let release = service.create_release(draft).await?;
            info!("created release {} {}", release.project, release.version);
            println!("{}", release.id);
        }
        ReleaseCommand::Update {
            id,
            project,
            version,
            details,
            clear_codename,
            clear_date,
        } => {
            let patch =
                patch_from_args(project, version, details, clear_codename, clear_date)
                    .await?;
            let release = service.update_release(&id, patch).await?;
            println!("{}", serde_json::to_string_pretty(&release)?);
        }
        ReleaseCommand::Get { id, markdown } => {
            let release = service.get_release(&id).await?;

            if markdown {
                let document = release.generated_markdown.ok_or_else(|| {
                    RelnotesError::not_found(format!(
                        "generated document for release {id}: run `relnotes generate {id}` first"
                    ))
                })?;
                print!("{document}");
            } else {
                println!("{}", serde_json::to_string_pretty(&release)?);
            }
        }
        ReleaseCommand::List => {
            let releases = service.list_releases().await?;
            println!("{}", serde_json::to_string_pretty(&releases)?);
        }
        ReleaseCommand::Delete { id } => {
            service.delete_release(&id).await?;
            info!("deleted release {id}");
        }
    }

    Ok(())
}

/// Creation input from CLI flags. Highlights may come from a file.
pub async fn draft_from_args(
    project: String,
    version: String,
    details: ReleaseDetails,
) -> Result<ReleaseDraft> {
    let highlights = highlights(&details).await?;

    Ok(ReleaseDraft {
        project,
        version,
        codename: details.codename,
        planned_date: details.date,
        highlights,
        ticket_keys: details.tickets.as_deref().map(split_list).unwrap_or_default(),
        upstream_release_urls: details
            .upstream_release_urls
            .as_deref()
            .map(split_list)
            .unwrap_or_default(),
        upstream_bug_urls: details
            .upstream_bug_urls
            .as_deref()
            .map(split_list)
            .unwrap_or_default(),
    })
}

/// Partial update from CLI flags. Flags that were not given leave the field
/// untouched.
pub async fn patch_from_args(
    project: Option<String>,
    version: Option<String>,
    details: ReleaseDetails,
    clear_codename: bool,
    clear_date: bool,
) -> Result<ReleasePatch> {
    let highlights = highlights(&details).await?;

    let codename = if clear_codename {
        Some(None)
    } else {
        details.codename.map(Some)
    };

    let planned_date = if clear_date {
        Some(None)
    } else {
        details.date.map(Some)
    };

    Ok(ReleasePatch {
        project,
        version,
        codename,
        planned_date,
        highlights,
        ticket_keys: details.tickets.as_deref().map(split_list),
        upstream_release_urls: details.upstream_release_urls.as_deref().map(split_list),
        upstream_bug_urls: details.upstream_bug_urls.as_deref().map(split_list),
    })
}

async fn highlights(details: &ReleaseDetails) -> Result<Option<String>> {
    if let Some(path) = &details.highlights_file {
        let content = fs::read_to_string(path).await.map_err(|e| {
            RelnotesError::invalid_input(format!(
                "failed to read highlights file {path}: {e}"
            ))
        })?;
        return Ok(Some(content));
    }

    Ok(details.highlights.clone())
}
