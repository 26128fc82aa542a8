use distil_core::{
    readability, ContentExtractor, DistilError, ImageGenerator, PipelineConfig, Result, Session,
    SessionState, TextRefiner, COMIC_MIN_PASSES, MAX_SIMPLIFY_PASSES,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Orchestrates one session through extraction, synthesis, simplification
/// passes, and comic rendering.
///
/// Every operation validates against the session state before any network
/// call, and only commits its mutation once the collaborator call has
/// succeeded. A failed pass leaves the session exactly as it found it, so
/// callers can always retry.
pub struct RefinementPipeline {
    extractor: Arc<dyn ContentExtractor>,
    refiner: Arc<dyn TextRefiner>,
    renderer: Arc<dyn ImageGenerator>,
    config: PipelineConfig,
}

impl RefinementPipeline {
    pub fn new(
        extractor: Arc<dyn ContentExtractor>,
        refiner: Arc<dyn TextRefiner>,
        renderer: Arc<dyn ImageGenerator>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            extractor,
            refiner,
            renderer,
            config,
        }
    }

    /// Extract a page and synthesize the initial dense summary.
    ///
    /// Starts the session over: any previous summary, pass count, and comic
    /// are discarded before the new URL is fetched. On failure the session
    /// returns to `Idle` with the attempted URL still recorded.
    #[instrument(skip(self, session, url), fields(session = %session.id))]
    pub async fn submit(&self, session: &mut Session, url: &str) -> Result<String> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DistilError::InvalidInput("URL is required".to_string()));
        }

        session.reset();
        session.source_url = Some(url.to_string());
        session.state = SessionState::Extracting;
        info!(%url, "Retrieving content from the page");

        let content = match self.extractor.extract(url).await {
            Ok(content) => content,
            Err(e) => {
                session.state = SessionState::Idle;
                return Err(e);
            }
        };

        session.state = SessionState::Reasoning;
        info!(chars = content.chars().count(), "Content retrieved, extracting key insights");

        let summary = match self.refiner.synthesize(&content).await {
            Ok(summary) => summary,
            Err(e) => {
                session.state = SessionState::Idle;
                return Err(e);
            }
        };

        log_readability("synthesize", &summary);
        session.current_text = Some(summary.clone());
        session.state = SessionState::Ready;
        Ok(summary)
    }

    /// Run one simplification pass over the current summary.
    #[instrument(skip(self, session), fields(session = %session.id))]
    pub async fn simplify(&self, session: &mut Session) -> Result<String> {
        let text = self.ready_text(session, "simplify")?;
        if session.simplify_passes >= MAX_SIMPLIFY_PASSES {
            return Err(DistilError::LimitReached(MAX_SIMPLIFY_PASSES));
        }

        session.state = SessionState::Simplifying;
        info!(pass = session.simplify_passes + 1, "Simplifying further");

        match self.refiner.simplify(&text).await {
            Ok(simplified) => {
                log_readability("simplify", &simplified);
                session.current_text = Some(simplified.clone());
                session.simplify_passes += 1;
                session.state = SessionState::Ready;
                Ok(simplified)
            }
            Err(e) => {
                session.state = SessionState::Ready;
                Err(e)
            }
        }
    }

    /// Expand the current summary with more context and detail.
    ///
    /// Does not count against the simplification cap, and does not undo it:
    /// a session that has already simplified three times stays eligible for
    /// a comic after expanding.
    #[instrument(skip(self, session), fields(session = %session.id))]
    pub async fn expand(&self, session: &mut Session) -> Result<String> {
        let text = self.ready_text(session, "expand")?;

        session.state = SessionState::Simplifying;
        info!("Expanding summary with additional detail");

        match self.refiner.expand(&text).await {
            Ok(expanded) => {
                log_readability("expand", &expanded);
                session.current_text = Some(expanded.clone());
                session.state = SessionState::Ready;
                Ok(expanded)
            }
            Err(e) => {
                session.state = SessionState::Ready;
                Err(e)
            }
        }
    }

    /// Condense the current summary to a word budget.
    ///
    /// `max_words` falls back to the configured default when `None`.
    #[instrument(skip(self, session, max_words), fields(session = %session.id))]
    pub async fn condense(
        &self,
        session: &mut Session,
        max_words: Option<usize>,
    ) -> Result<String> {
        let words = max_words.unwrap_or(self.config.default_condense_words);
        if words == 0 {
            return Err(DistilError::InvalidInput(
                "condense target must be at least one word".to_string(),
            ));
        }
        let text = self.ready_text(session, "condense")?;

        session.state = SessionState::Simplifying;
        info!(words, "Condensing summary");

        match self.refiner.condense(&text, words).await {
            Ok(condensed) => {
                log_readability("condense", &condensed);
                session.current_text = Some(condensed.clone());
                session.state = SessionState::Ready;
                Ok(condensed)
            }
            Err(e) => {
                session.state = SessionState::Ready;
                Err(e)
            }
        }
    }

    /// Script and render the four-panel comic for a well-simplified summary.
    ///
    /// Requires at least [`COMIC_MIN_PASSES`] simplification passes. The
    /// script and render steps are separate upstream calls; if the render
    /// fails the session stays `Ready` and can retry from scratch.
    #[instrument(skip(self, session), fields(session = %session.id))]
    pub async fn visualize(&self, session: &mut Session) -> Result<()> {
        let text = self.ready_text(session, "visualize")?;
        if session.simplify_passes < COMIC_MIN_PASSES {
            return Err(DistilError::InvalidState(format!(
                "comic rendering requires at least {} simplification passes, session has {}",
                COMIC_MIN_PASSES, session.simplify_passes
            )));
        }

        session.state = SessionState::Visualizing;
        info!("Interpreting content");

        let script = match self.refiner.script(&text).await {
            Ok(script) => script,
            Err(e) => {
                session.state = SessionState::Ready;
                return Err(e);
            }
        };

        info!("Generating comic visuals");
        match self.renderer.render(&script).await {
            Ok(artifact) => {
                debug!(
                    bytes = artifact.image.len(),
                    media_type = %artifact.media_type,
                    "Comic rendered"
                );
                session.comic = Some(artifact);
                session.state = SessionState::Visualized;
                Ok(())
            }
            Err(e) => {
                session.state = SessionState::Ready;
                Err(e)
            }
        }
    }

    /// Clear the session back to `Idle`.
    pub fn reset(&self, session: &mut Session) {
        debug!(session = %session.id, "Resetting session");
        session.reset();
    }

    /// Fetch the working summary, enforcing that the session is `Ready`.
    fn ready_text(&self, session: &Session, operation: &str) -> Result<String> {
        match session.state {
            SessionState::Ready => {}
            SessionState::Visualized => {
                return Err(DistilError::InvalidState(format!(
                    "cannot {} after the comic has been generated",
                    operation
                )));
            }
            other => {
                return Err(DistilError::InvalidState(format!(
                    "cannot {} while session is {}",
                    operation, other
                )));
            }
        }
        session
            .current_text
            .clone()
            .ok_or_else(|| DistilError::InvalidState("session has no summary".to_string()))
    }
}

fn log_readability(pass: &str, text: &str) {
    if let Ok(metrics) = readability::analyze(text) {
        debug!(
            pass,
            grade = metrics.grade_level,
            words = metrics.word_count,
            "Readability after pass"
        );
    }
}
