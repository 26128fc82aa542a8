use async_trait::async_trait;
use distil_ai::RefinementPipeline;
use distil_core::{
    ComicArtifact, ContentExtractor, DistilError, ImageGenerator, PipelineConfig, Result, Session,
    SessionState, TextRefiner, COMIC_MIN_PASSES, MAX_SIMPLIFY_PASSES,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const PAGE_BODY: &str = "The committee voted on Tuesday to approve the new transit plan, \
which allocates funding for three light-rail lines and a downtown bus corridor over the \
next decade.";

enum ExtractOutcome {
    Ok,
    Insufficient(usize),
    Timeout,
}

struct StubExtractor {
    calls: AtomicUsize,
    outcome: ExtractOutcome,
}

impl StubExtractor {
    fn ok() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            outcome: ExtractOutcome::Ok,
        }
    }

    fn failing(outcome: ExtractOutcome) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            outcome,
        }
    }
}

#[async_trait]
impl ContentExtractor for StubExtractor {
    async fn extract(&self, _url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            ExtractOutcome::Ok => Ok(PAGE_BODY.to_string()),
            ExtractOutcome::Insufficient(got) => {
                Err(DistilError::InsufficientContent { got, min: 100 })
            }
            ExtractOutcome::Timeout => Err(DistilError::Timeout("scrape timed out".to_string())),
        }
    }
}

#[derive(Default)]
struct MockRefiner {
    synthesize_calls: AtomicUsize,
    simplify_calls: AtomicUsize,
    expand_calls: AtomicUsize,
    condense_calls: AtomicUsize,
    script_calls: AtomicUsize,
    condense_words: AtomicUsize,
    fail_synthesize: bool,
    fail_simplify: bool,
}

#[async_trait]
impl TextRefiner for MockRefiner {
    async fn synthesize(&self, _content: &str) -> Result<String> {
        self.synthesize_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_synthesize {
            return Err(DistilError::Upstream("synthesis unavailable".to_string()));
        }
        Ok("dense synthesis of the transit plan article".to_string())
    }

    async fn simplify(&self, _content: &str) -> Result<String> {
        let pass = self.simplify_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_simplify {
            return Err(DistilError::Timeout("completion timed out".to_string()));
        }
        Ok(format!("simplified text after pass {}", pass))
    }

    async fn expand(&self, _content: &str) -> Result<String> {
        self.expand_calls.fetch_add(1, Ordering::SeqCst);
        Ok("expanded summary with extra background".to_string())
    }

    async fn condense(&self, _content: &str, max_words: usize) -> Result<String> {
        self.condense_calls.fetch_add(1, Ordering::SeqCst);
        self.condense_words.store(max_words, Ordering::SeqCst);
        Ok(format!("condensed to at most {} words", max_words))
    }

    async fn script(&self, _content: &str) -> Result<String> {
        self.script_calls.fetch_add(1, Ordering::SeqCst);
        Ok("Panel 1: a crowded council chamber.".to_string())
    }
}

struct MockRenderer {
    calls: AtomicUsize,
    fail_first: bool,
}

impl MockRenderer {
    fn ok() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_first: false,
        }
    }

    fn flaky() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_first: true,
        }
    }
}

#[async_trait]
impl ImageGenerator for MockRenderer {
    async fn render(&self, script: &str) -> Result<ComicArtifact> {
        let previous = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_first && previous == 0 {
            return Err(DistilError::Timeout("image render timed out".to_string()));
        }
        assert!(!script.is_empty());
        Ok(ComicArtifact {
            image: vec![0xFF, 0xD8, 0xFF, 0xE0],
            media_type: "image/jpeg".to_string(),
        })
    }
}

struct Harness {
    extractor: Arc<StubExtractor>,
    refiner: Arc<MockRefiner>,
    renderer: Arc<MockRenderer>,
    pipeline: RefinementPipeline,
}

fn harness(extractor: StubExtractor, refiner: MockRefiner, renderer: MockRenderer) -> Harness {
    let extractor = Arc::new(extractor);
    let refiner = Arc::new(refiner);
    let renderer = Arc::new(renderer);
    let pipeline = RefinementPipeline::new(
        extractor.clone(),
        refiner.clone(),
        renderer.clone(),
        PipelineConfig::default(),
    );
    Harness {
        extractor,
        refiner,
        renderer,
        pipeline,
    }
}

fn default_harness() -> Harness {
    harness(StubExtractor::ok(), MockRefiner::default(), MockRenderer::ok())
}

async fn session_with_passes(h: &Harness, passes: u8) -> Session {
    let mut session = Session::new();
    h.pipeline
        .submit(&mut session, "https://example.com/article")
        .await
        .unwrap();
    for _ in 0..passes {
        h.pipeline.simplify(&mut session).await.unwrap();
    }
    session
}

#[tokio::test]
async fn test_submit_extracts_and_synthesizes() {
    let h = default_harness();
    let mut session = Session::new();

    let summary = h
        .pipeline
        .submit(&mut session, "https://example.com/article")
        .await
        .unwrap();

    assert_eq!(summary, "dense synthesis of the transit plan article");
    assert_eq!(session.state, SessionState::Ready);
    assert_eq!(session.current_text.as_deref(), Some(summary.as_str()));
    assert_eq!(session.source_url.as_deref(), Some("https://example.com/article"));
    assert_eq!(session.simplify_passes, 0);
    assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.refiner.synthesize_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_submit_rejects_blank_url() {
    let h = default_harness();
    let mut session = Session::new();

    let err = h.pipeline.submit(&mut session, "   ").await.unwrap_err();

    assert!(matches!(err, DistilError::InvalidInput(_)));
    assert_eq!(session.state, SessionState::Idle);
    assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_thin_page_returns_session_to_idle() {
    let h = harness(
        StubExtractor::failing(ExtractOutcome::Insufficient(42)),
        MockRefiner::default(),
        MockRenderer::ok(),
    );
    let mut session = Session::new();

    let err = h
        .pipeline
        .submit(&mut session, "https://example.com/thin")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DistilError::InsufficientContent { got: 42, min: 100 }
    ));
    assert_eq!(session.state, SessionState::Idle);
    assert!(session.current_text.is_none());
    assert_eq!(session.source_url.as_deref(), Some("https://example.com/thin"));
    assert_eq!(h.refiner.synthesize_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_synthesis_failure_returns_session_to_idle() {
    let h = harness(
        StubExtractor::ok(),
        MockRefiner {
            fail_synthesize: true,
            ..MockRefiner::default()
        },
        MockRenderer::ok(),
    );
    let mut session = Session::new();

    let err = h
        .pipeline
        .submit(&mut session, "https://example.com/article")
        .await
        .unwrap_err();

    assert!(matches!(err, DistilError::Upstream(_)));
    assert_eq!(session.state, SessionState::Idle);
    assert!(session.current_text.is_none());
}

#[tokio::test]
async fn test_resubmit_discards_previous_progress() {
    let h = default_harness();
    let mut session = session_with_passes(&h, 3).await;
    h.pipeline.visualize(&mut session).await.unwrap();

    h.pipeline
        .submit(&mut session, "https://example.com/other")
        .await
        .unwrap();

    assert_eq!(session.state, SessionState::Ready);
    assert_eq!(session.simplify_passes, 0);
    assert!(session.comic.is_none());
    assert_eq!(session.source_url.as_deref(), Some("https://example.com/other"));
}

#[tokio::test]
async fn test_simplify_updates_text_and_counts_passes() {
    let h = default_harness();
    let mut session = session_with_passes(&h, 0).await;

    let first = h.pipeline.simplify(&mut session).await.unwrap();
    let second = h.pipeline.simplify(&mut session).await.unwrap();

    assert_eq!(first, "simplified text after pass 1");
    assert_eq!(second, "simplified text after pass 2");
    assert_eq!(session.simplify_passes, 2);
    assert_eq!(session.current_text.as_deref(), Some(second.as_str()));
    assert_eq!(session.state, SessionState::Ready);
}

#[tokio::test]
async fn test_simplify_cap_blocks_sixth_pass_without_a_call() {
    let h = default_harness();
    let mut session = session_with_passes(&h, MAX_SIMPLIFY_PASSES).await;
    let text_at_cap = session.current_text.clone();

    let err = h.pipeline.simplify(&mut session).await.unwrap_err();

    assert!(matches!(err, DistilError::LimitReached(MAX_SIMPLIFY_PASSES)));
    assert_eq!(session.simplify_passes, MAX_SIMPLIFY_PASSES);
    assert_eq!(session.current_text, text_at_cap);
    assert_eq!(
        h.refiner.simplify_calls.load(Ordering::SeqCst),
        usize::from(MAX_SIMPLIFY_PASSES)
    );
}

#[tokio::test]
async fn test_failed_simplify_leaves_session_unchanged() {
    let h = harness(
        StubExtractor::ok(),
        MockRefiner {
            fail_simplify: true,
            ..MockRefiner::default()
        },
        MockRenderer::ok(),
    );
    let mut session = session_with_passes(&h, 0).await;
    let original = session.current_text.clone();

    let err = h.pipeline.simplify(&mut session).await.unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(session.simplify_passes, 0);
    assert_eq!(session.current_text, original);
    assert_eq!(session.state, SessionState::Ready);
}

#[tokio::test]
async fn test_simplify_requires_an_active_summary() {
    let h = default_harness();
    let mut session = Session::new();

    let err = h.pipeline.simplify(&mut session).await.unwrap_err();

    assert!(matches!(err, DistilError::InvalidState(_)));
    assert_eq!(h.refiner.simplify_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_expand_does_not_touch_the_pass_count() {
    let h = default_harness();
    let mut session = session_with_passes(&h, COMIC_MIN_PASSES).await;

    let expanded = h.pipeline.expand(&mut session).await.unwrap();

    assert_eq!(expanded, "expanded summary with extra background");
    assert_eq!(session.simplify_passes, COMIC_MIN_PASSES);

    // Comic eligibility earned through simplification survives an expand.
    h.pipeline.visualize(&mut session).await.unwrap();
    assert_eq!(session.state, SessionState::Visualized);
}

#[tokio::test]
async fn test_condense_falls_back_to_configured_word_budget() {
    let h = default_harness();
    let mut session = session_with_passes(&h, 0).await;

    let condensed = h.pipeline.condense(&mut session, None).await.unwrap();

    assert_eq!(condensed, "condensed to at most 100 words");
    assert_eq!(h.refiner.condense_words.load(Ordering::SeqCst), 100);
}

#[tokio::test]
async fn test_condense_rejects_zero_word_budget() {
    let h = default_harness();
    let mut session = session_with_passes(&h, 0).await;

    let err = h.pipeline.condense(&mut session, Some(0)).await.unwrap_err();

    assert!(matches!(err, DistilError::InvalidInput(_)));
    assert_eq!(h.refiner.condense_calls.load(Ordering::SeqCst), 0);
    assert_eq!(session.state, SessionState::Ready);
}

#[tokio::test]
async fn test_visualize_blocked_below_minimum_passes() {
    let h = default_harness();
    let mut session = session_with_passes(&h, 2).await;

    let err = h.pipeline.visualize(&mut session).await.unwrap_err();

    assert!(matches!(err, DistilError::InvalidState(_)));
    assert_eq!(h.refiner.script_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.renderer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(session.state, SessionState::Ready);
}

#[tokio::test]
async fn test_visualize_renders_after_three_passes() {
    let h = default_harness();
    let mut session = session_with_passes(&h, COMIC_MIN_PASSES).await;

    h.pipeline.visualize(&mut session).await.unwrap();

    assert_eq!(session.state, SessionState::Visualized);
    let comic = session.comic.as_ref().unwrap();
    assert_eq!(comic.media_type, "image/jpeg");
    assert!(!comic.image.is_empty());
    assert_eq!(h.refiner.script_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.renderer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_visualized_session_blocks_further_refinement() {
    let h = default_harness();
    let mut session = session_with_passes(&h, COMIC_MIN_PASSES).await;
    h.pipeline.visualize(&mut session).await.unwrap();

    let simplify_err = h.pipeline.simplify(&mut session).await.unwrap_err();
    let visualize_err = h.pipeline.visualize(&mut session).await.unwrap_err();

    assert!(matches!(simplify_err, DistilError::InvalidState(_)));
    assert!(matches!(visualize_err, DistilError::InvalidState(_)));
    assert_eq!(h.renderer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_render_failure_keeps_session_ready_for_retry() {
    let h = harness(
        StubExtractor::ok(),
        MockRefiner::default(),
        MockRenderer::flaky(),
    );
    let mut session = session_with_passes(&h, COMIC_MIN_PASSES).await;

    let err = h.pipeline.visualize(&mut session).await.unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(session.state, SessionState::Ready);
    assert!(session.comic.is_none());

    // Retry scripts again from the same summary and succeeds.
    h.pipeline.visualize(&mut session).await.unwrap();
    assert_eq!(session.state, SessionState::Visualized);
    assert!(session.comic.is_some());
    assert_eq!(h.refiner.script_calls.load(Ordering::SeqCst), 2);
    assert_eq!(h.renderer.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_reset_clears_everything() {
    let h = default_harness();
    let mut session = session_with_passes(&h, COMIC_MIN_PASSES).await;
    h.pipeline.visualize(&mut session).await.unwrap();

    h.pipeline.reset(&mut session);

    assert_eq!(session.state, SessionState::Idle);
    assert!(session.source_url.is_none());
    assert!(session.current_text.is_none());
    assert_eq!(session.simplify_passes, 0);
    assert!(session.comic.is_none());

    // A reset session accepts a fresh submission.
    h.pipeline
        .submit(&mut session, "https://example.com/next")
        .await
        .unwrap();
    assert_eq!(session.state, SessionState::Ready);
}
