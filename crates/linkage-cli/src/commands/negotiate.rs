//! Negotiate command

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use linkage_media::{parse_accept_header, MediaType};
use serde::Serialize;

use crate::blog::Blog;
use crate::codecs;
use crate::output::{to_json, OutputFormat};
use crate::Cli;

#[derive(Args)]
pub struct NegotiateArgs {
    /// Accept header value
    #[arg(long)]
    pub accept: Option<String>,

    /// Content-Type header value
    #[arg(long)]
    pub content_type: Option<String>,
}

#[derive(Debug, Default, Serialize)]
struct Outcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    encoder: Option<EncoderOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    decoder: Option<DecoderOutcome>,
}

#[derive(Debug, Serialize)]
struct EncoderOutcome {
    accept: String,
    media_type: Option<String>,
    matched: Option<String>,
    quality: Option<f32>,
}

#[derive(Debug, Serialize)]
struct DecoderOutcome {
    content_type: String,
    media_type: Option<String>,
}

pub fn run(args: &NegotiateArgs, cli: &Cli) -> anyhow::Result<()> {
    if args.accept.is_none() && args.content_type.is_none() {
        anyhow::bail!("Nothing to negotiate: pass --accept and/or --content-type");
    }

    let config = cli.load_config()?;
    let blog = Arc::new(Blog::sample()?);
    let mut codecs = codecs::with_decoders(&config)?;
    codecs::register_encoders(&mut codecs, &config, Arc::new(blog.registry()), &config.encoder)?;

    let mut outcome = Outcome::default();

    if let Some(accept) = &args.accept {
        let candidates =
            parse_accept_header(accept).with_context(|| format!("Invalid Accept header '{}'", accept))?;
        let found = codecs.match_encoder(&candidates);
        outcome.encoder = Some(EncoderOutcome {
            accept: accept.clone(),
            media_type: found.as_ref().map(|m| m.registered().to_string()),
            matched: found.as_ref().map(|m| m.accepted().media_type().to_string()),
            quality: found.as_ref().map(|m| m.accepted().quality()),
        });
    }

    if let Some(content_type) = &args.content_type {
        let media_type: MediaType = content_type
            .parse()
            .with_context(|| format!("Invalid Content-Type '{}'", content_type))?;
        outcome.decoder = Some(DecoderOutcome {
            content_type: content_type.clone(),
            media_type: codecs
                .match_decoder(&media_type)
                .map(|m| m.registered().to_string()),
        });
    }

    match cli.output_format() {
        OutputFormat::Json => println!("{}", to_json(&outcome)?),
        OutputFormat::Text => print_text(&outcome),
    }

    if let Some(encoder) = outcome.encoder.as_ref().filter(|e| e.media_type.is_none()) {
        anyhow::bail!("Not acceptable: no configured media type matches '{}'", encoder.accept);
    }
    if let Some(decoder) = outcome.decoder.as_ref().filter(|d| d.media_type.is_none()) {
        anyhow::bail!("Unsupported media type: {}", decoder.content_type);
    }
    Ok(())
}

fn print_text(outcome: &Outcome) {
    if let Some(encoder) = &outcome.encoder {
        match (&encoder.media_type, &encoder.matched, encoder.quality) {
            (Some(media_type), Some(matched), Some(quality)) => {
                println!("encoder: {} (matched {};q={})", media_type, matched, quality)
            }
            _ => println!("encoder: none"),
        }
    }
    if let Some(decoder) = &outcome.decoder {
        println!("decoder: {}", decoder.media_type.as_deref().unwrap_or("none"));
    }
}
