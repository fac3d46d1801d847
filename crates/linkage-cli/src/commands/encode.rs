//! Encode command

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::Args;
use linkage_core::EncodingParameters;
use linkage_media::{parse_accept_header, MediaType};

use crate::blog;
use crate::codecs::{self, Codecs};
use crate::Cli;

#[derive(Args)]
pub struct EncodeArgs {
    /// Primary data: a resource type, or TYPE:ID for a single resource
    pub root: String,

    /// Blog data file (JSON); the built-in sample when omitted
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Media type of the input (default: first configured decoder)
    #[arg(long)]
    pub content_type: Option<String>,

    /// Relationship paths to include, comma separated; an empty value
    /// disables the schema defaults
    #[arg(long, value_delimiter = ',')]
    pub include: Option<Vec<String>>,

    /// Sparse field-set, e.g. --fields people=first_name,comments
    #[arg(long = "fields", value_name = "TYPE=FIELDS")]
    pub fields: Vec<String>,

    /// Emit resource identifiers only
    #[arg(long)]
    pub identifiers: bool,

    /// Accept header negotiated against the configured encoders
    #[arg(long, default_value = "*/*")]
    pub accept: String,

    /// Override encoder.url_prefix
    #[arg(long)]
    pub url_prefix: Option<String>,

    /// Pretty-print the document
    #[arg(long)]
    pub pretty: bool,

    /// Top-level meta, as a JSON value
    #[arg(long)]
    pub meta: Option<String>,
}

impl EncodeArgs {
    fn root(&self) -> (&str, Option<&str>) {
        match self.root.split_once(':') {
            Some((resource_type, id)) => (resource_type, Some(id)),
            None => (self.root.as_str(), None),
        }
    }

    fn parameters(&self) -> anyhow::Result<EncodingParameters> {
        let mut params = EncodingParameters::new();
        if let Some(include) = &self.include {
            params = params.with_include_paths(include.iter().map(|p| p.trim()).filter(|p| !p.is_empty()));
        }
        for entry in &self.fields {
            let (resource_type, fields) = entry
                .split_once('=')
                .with_context(|| format!("Invalid field-set '{}', expected TYPE=FIELD,...", entry))?;
            params = params.with_field_set(
                resource_type.trim(),
                fields.split(',').map(str::trim).filter(|f| !f.is_empty()),
            );
        }
        Ok(params)
    }
}

fn read_input(args: &EncodeArgs, codecs: &Codecs) -> anyhow::Result<blog::Blog> {
    let text = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => blog::SAMPLE.to_string(),
    };

    let content_type = match &args.content_type {
        Some(value) => value
            .parse::<MediaType>()
            .with_context(|| format!("Invalid Content-Type '{}'", value))?,
        None => codecs
            .decoder_types()
            .next()
            .cloned()
            .context("No decoders configured")?,
    };

    let decoder = codecs
        .match_decoder(&content_type)
        .ok_or_else(|| anyhow!("Unsupported media type: {}", content_type))?;
    decoder.create().decode(&text)
}

pub fn run(args: &EncodeArgs, cli: &Cli) -> anyhow::Result<()> {
    let config = cli.load_config()?;
    let mut options = config.encoder.clone();
    if let Some(prefix) = &args.url_prefix {
        options.url_prefix = Some(prefix.clone());
    }
    if args.pretty {
        options.pretty = true;
    }

    let mut codecs = codecs::with_decoders(&config)?;
    let blog = Arc::new(read_input(args, &codecs)?);
    codecs::register_encoders(&mut codecs, &config, Arc::new(blog.registry()), &options)?;

    let candidates = parse_accept_header(&args.accept)
        .with_context(|| format!("Invalid Accept header '{}'", args.accept))?;
    let found = codecs
        .match_encoder(&candidates)
        .ok_or_else(|| anyhow!("Not acceptable: no configured media type matches '{}'", args.accept))?;
    tracing::info!("Encoding as {}", found.registered());

    let mut encoder = found.create();
    if let Some(meta) = &args.meta {
        encoder = encoder.with_meta(serde_json::from_str(meta).context("--meta must be valid JSON")?);
    }

    let (resource_type, id) = args.root();
    let data = blog.select(resource_type, id)?;
    let params = args.parameters()?;
    tracing::debug!("Encoding {} with {:?}", args.root, params);

    let document = if args.identifiers {
        encoder.encode_identifiers(data, &params)?
    } else {
        encoder.encode_data(data, &params)?
    };
    println!("{}", document);
    Ok(())
}
