//! Encoder/decoder registration from config

use std::sync::Arc;

use linkage_core::{Encoder, EncoderOptions, SchemaRegistry};
use linkage_media::CodecMatcher;

use crate::blog::Blog;
use crate::config::Config;

/// Reads blog input files
#[derive(Debug, Clone, Copy, Default)]
pub struct BlogDecoder;

impl BlogDecoder {
    pub fn decode(&self, text: &str) -> anyhow::Result<Blog> {
        Blog::from_json(text)
    }
}

pub type Codecs = CodecMatcher<Encoder, BlogDecoder>;

/// Matcher with the configured decoders; encoders are added once the schema
/// registry for the decoded input exists
pub fn with_decoders(config: &Config) -> anyhow::Result<Codecs> {
    let mut codecs = Codecs::new();
    for media_type in config.decoder_types()? {
        codecs.register_decoder(media_type, || BlogDecoder);
    }
    Ok(codecs)
}

/// One encoder per configured encoder media type, all sharing `registry`
pub fn register_encoders(
    codecs: &mut Codecs,
    config: &Config,
    registry: Arc<SchemaRegistry>,
    options: &EncoderOptions,
) -> anyhow::Result<()> {
    for media_type in config.encoder_types()? {
        let registry = registry.clone();
        let options = options.clone();
        codecs.register_encoder(media_type, move || {
            Encoder::new(registry.clone()).with_options(options.clone())
        });
    }
    Ok(())
}
