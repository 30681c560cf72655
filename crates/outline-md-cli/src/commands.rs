use anyhow::{Context, Result};
use outline_md_config::Config;
use outline_md_engine::{Output, ParseOptions, io, prepare_upload, render_fetched};

use crate::api::{OutlineClient, UpdateRequest, document_id};
use crate::{GetArgs, UpdateArgs};

/// Resolve a document argument to its url-id, rejecting input with nothing after the last `-`.
fn required_id(arg: &str) -> Result<&str> {
    let id = document_id(arg);
    if id.is_empty() {
        anyhow::bail!("{arg:?} does not end in a document id");
    }
    Ok(id)
}

fn client(config: &Config) -> Result<OutlineClient> {
    let token = config.token()?;
    Ok(OutlineClient::new(&config.api_url, token)?)
}

/// `outline-md get`: fetch a document and save it with its title as a level 1 heading.
pub fn get(config: &Config, args: GetArgs) -> Result<()> {
    let id = required_id(&args.document)?;
    let client = client(config)?;

    log::info!("fetching document {id}");
    let document = client
        .document_info(id)
        .with_context(|| format!("failed to fetch document {id}"))?;

    let output = Output::from_arg(args.output.as_deref());
    io::write_output(&output, &render_fetched(&document.title, &document.text))?;
    if let Output::File(path) = &output {
        log::info!("saved {:?} to {}", document.title, path.display());
    }
    Ok(())
}

/// `outline-md update`: convert a local file and replace the hosted document with it.
pub fn update(config: &Config, args: UpdateArgs) -> Result<()> {
    let id = required_id(&args.id)?;

    // Fail on a missing token before doing any work, unless nothing is sent.
    let client = if args.dry_run {
        None
    } else {
        Some(client(config)?)
    };

    let source = io::read_source(&args.source)?;
    let options = ParseOptions {
        strikethrough: args.strikethrough,
        emoji: args.emoji,
    };
    let prepared = prepare_upload(&source, options);
    log::info!(
        "prepared {:?}: {} heading link(s) rewritten",
        prepared.title,
        prepared.rewritten_links
    );

    let request = UpdateRequest {
        id: id.to_string(),
        title: prepared.title,
        text: prepared.text,
    };

    match client {
        None => {
            let body = serde_json::to_string_pretty(&request)?;
            io::write_output(&Output::Stdout, &format!("{body}\n"))?;
        }
        Some(client) => {
            client
                .update_document(&request)
                .with_context(|| format!("failed to update document {id}"))?;
            log::info!("updated document {id}");
        }
    }
    Ok(())
}
