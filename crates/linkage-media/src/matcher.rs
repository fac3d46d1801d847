//! Encoder/decoder negotiation

use crate::accept::AcceptMediaType;
use crate::media_type::MediaType;
use std::sync::Arc;

/// Creates a codec on demand
pub type Factory<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Registered encoders and decoders keyed by media type
///
/// Register everything up front, then share the matcher read-only.
pub struct CodecMatcher<E, D> {
    encoders: Vec<(MediaType, Factory<E>)>,
    decoders: Vec<(MediaType, Factory<D>)>,
}

/// Result of [`CodecMatcher::match_encoder`]
pub struct EncoderMatch<'a, E> {
    registered: &'a MediaType,
    accepted: &'a AcceptMediaType,
    factory: &'a Factory<E>,
}

impl<'a, E> EncoderMatch<'a, E> {
    /// Registered media type the response should be labelled with
    pub fn registered(&self) -> &'a MediaType {
        self.registered
    }

    /// Client candidate that selected it
    pub fn accepted(&self) -> &'a AcceptMediaType {
        self.accepted
    }

    pub fn create(&self) -> E {
        (self.factory)()
    }
}

/// Result of [`CodecMatcher::match_decoder`]
pub struct DecoderMatch<'a, D> {
    registered: &'a MediaType,
    factory: &'a Factory<D>,
}

impl<'a, D> DecoderMatch<'a, D> {
    pub fn registered(&self) -> &'a MediaType {
        self.registered
    }

    pub fn create(&self) -> D {
        (self.factory)()
    }
}

fn register<T>(registry: &mut Vec<(MediaType, Factory<T>)>, media_type: MediaType, factory: Factory<T>) {
    match registry.iter_mut().find(|(existing, _)| existing.equals(&media_type)) {
        Some(entry) => entry.1 = factory,
        None => registry.push((media_type, factory)),
    }
}

impl<E, D> CodecMatcher<E, D> {
    pub fn new() -> Self {
        Self {
            encoders: Vec::new(),
            decoders: Vec::new(),
        }
    }

    /// Register an encoder; an identical media type replaces the earlier
    /// factory but keeps its registration order
    pub fn register_encoder<F>(&mut self, media_type: MediaType, factory: F) -> &mut Self
    where
        F: Fn() -> E + Send + Sync + 'static,
    {
        tracing::debug!("Registering encoder for {}", media_type);
        register(&mut self.encoders, media_type, Arc::new(factory));
        self
    }

    pub fn register_decoder<F>(&mut self, media_type: MediaType, factory: F) -> &mut Self
    where
        F: Fn() -> D + Send + Sync + 'static,
    {
        tracing::debug!("Registering decoder for {}", media_type);
        register(&mut self.decoders, media_type, Arc::new(factory));
        self
    }

    pub fn with_encoder<F>(mut self, media_type: MediaType, factory: F) -> Self
    where
        F: Fn() -> E + Send + Sync + 'static,
    {
        self.register_encoder(media_type, factory);
        self
    }

    pub fn with_decoder<F>(mut self, media_type: MediaType, factory: F) -> Self
    where
        F: Fn() -> D + Send + Sync + 'static,
    {
        self.register_decoder(media_type, factory);
        self
    }

    pub fn encoder_types(&self) -> impl Iterator<Item = &MediaType> {
        self.encoders.iter().map(|(media_type, _)| media_type)
    }

    pub fn decoder_types(&self) -> impl Iterator<Item = &MediaType> {
        self.decoders.iter().map(|(media_type, _)| media_type)
    }

    /// Pick an encoder for the client's `Accept` candidates
    ///
    /// Candidates are tried by descending quality, then header position.
    /// For the first candidate with any match, the earliest registered
    /// encoder wins. `None` means nothing acceptable is registered.
    pub fn match_encoder<'a>(&'a self, candidates: &'a [AcceptMediaType]) -> Option<EncoderMatch<'a, E>> {
        let mut ordered: Vec<&AcceptMediaType> = candidates.iter().collect();
        ordered.sort_by(|a, b| {
            b.quality()
                .total_cmp(&a.quality())
                .then_with(|| a.position().cmp(&b.position()))
        });

        let found = ordered.into_iter().find_map(|accepted| {
            self.encoders
                .iter()
                .find(|(registered, _)| accepted.matches(registered))
                .map(|(registered, factory)| EncoderMatch {
                    registered,
                    accepted,
                    factory,
                })
        });

        match &found {
            Some(found) => tracing::debug!("Matched encoder {} for {}", found.registered, found.accepted.media_type()),
            None => tracing::debug!("No encoder matches {} accept candidates", candidates.len()),
        }
        found
    }

    /// Pick the decoder registered for exactly `content_type`
    pub fn match_decoder(&self, content_type: &MediaType) -> Option<DecoderMatch<'_, D>> {
        let found = self
            .decoders
            .iter()
            .find(|(registered, _)| registered.equals(content_type))
            .map(|(registered, factory)| DecoderMatch { registered, factory });

        if found.is_none() {
            tracing::debug!("No decoder registered for {}", content_type);
        }
        found
    }
}

impl<E, D> Default for CodecMatcher<E, D> {
    fn default() -> Self {
        Self::new()
    }
}
