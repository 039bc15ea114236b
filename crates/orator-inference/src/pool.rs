// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failover pool over the configured inference candidates.
//!
//! Each assessment walks the candidate list once, bounded by a total attempt
//! counter. Transient failures are retried on the same candidate with
//! exponential backoff. Candidates that cannot serve the request get a shared
//! exclusion mark that pushes them to the back of the list for later requests
//! until the cool-down passes.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use secrecy::SecretString;
use tracing::{debug, info, warn};

use orator_config::model::OratorConfig;
use orator_core::types::{
    AssessmentRequest, AssessmentResult, ProviderRequest, TokenUsage, UsageLogEntry,
};
use orator_core::{OratorError, ProviderAdapter, UsageRecorder};

use crate::classify::{FailureClass, classify};
use crate::gemini::GeminiProvider;
use crate::openai::OpenAiProvider;
use crate::prompt::build_instruction;
use crate::schema::parse_assessment;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// One `provider:model` entry of the candidate list.
pub struct BackendCandidate {
    id: String,
    model: String,
    priority: usize,
    provider: Arc<dyn ProviderAdapter>,
    /// Milliseconds since the pool epoch plus one; zero means not excluded.
    excluded_at: AtomicU64,
}

impl BackendCandidate {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn priority(&self) -> usize {
        self.priority
    }

    fn mark_excluded(&self, now_ms: u64) {
        self.excluded_at.store(now_ms + 1, Ordering::Relaxed);
    }

    fn clear_exclusion(&self) {
        self.excluded_at.store(0, Ordering::Relaxed);
    }

    fn is_cooling(&self, now_ms: u64, cool_down: Duration) -> bool {
        match self.excluded_at.load(Ordering::Relaxed) {
            0 => false,
            mark => now_ms < (mark - 1).saturating_add(cool_down.as_millis() as u64),
        }
    }
}

/// Knobs for the failover loop.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_attempts: u32,
    pub same_backend_retries: u32,
    pub backoff_base: Duration,
    pub request_timeout: Duration,
    pub reprobe_after: Duration,
    pub max_tokens: u32,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self::from(&orator_config::model::InferenceConfig::default())
    }
}

impl From<&orator_config::model::InferenceConfig> for PoolSettings {
    fn from(config: &orator_config::model::InferenceConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            same_backend_retries: config.same_backend_retries,
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            reprobe_after: Duration::from_secs(config.reprobe_after_secs),
            max_tokens: config.max_tokens,
        }
    }
}

/// Process-wide inference pool.
pub struct InferencePool {
    candidates: Vec<BackendCandidate>,
    settings: PoolSettings,
    recorder: Option<Arc<dyn UsageRecorder>>,
    epoch: Instant,
}

impl InferencePool {
    /// Builds a pool from `(provider:model, adapter)` pairs in priority order.
    pub fn new(
        candidates: Vec<(String, Arc<dyn ProviderAdapter>)>,
        settings: PoolSettings,
    ) -> Self {
        if candidates.is_empty() {
            warn!("inference pool has no candidates; every assessment will fail");
        }
        let candidates = candidates
            .into_iter()
            .enumerate()
            .map(|(priority, (id, provider))| {
                let model = id
                    .split_once(':')
                    .map(|(_, model)| model.to_string())
                    .unwrap_or_else(|| id.clone());
                BackendCandidate {
                    id,
                    model,
                    priority,
                    provider,
                    excluded_at: AtomicU64::new(0),
                }
            })
            .collect();
        Self {
            candidates,
            settings,
            recorder: None,
            epoch: Instant::now(),
        }
    }

    /// Attaches the sink that receives one usage entry per successful call.
    pub fn with_recorder(mut self, recorder: Arc<dyn UsageRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Builds the pool from configuration.
    ///
    /// A provider with no API key (neither in config nor in its environment
    /// variable) is dropped along with its candidates, with a warning.
    pub fn from_config(config: &OratorConfig) -> Result<Self, OratorError> {
        let mut providers: HashMap<&str, Arc<dyn ProviderAdapter>> = HashMap::new();

        match resolve_key(config.gemini.api_key.as_deref(), "GEMINI_API_KEY") {
            Some(key) => {
                let provider = GeminiProvider::new(key, config.gemini.base_url.clone())?;
                providers.insert("gemini", Arc::new(provider));
            }
            None => warn!("no Gemini API key configured; gemini candidates removed"),
        }
        match resolve_key(config.openai.api_key.as_deref(), "OPENAI_API_KEY") {
            Some(key) => {
                let provider = OpenAiProvider::new(key, config.openai.base_url.clone())?;
                providers.insert("openai", Arc::new(provider));
            }
            None => warn!("no OpenAI API key configured; openai candidates removed"),
        }

        let mut candidates = Vec::new();
        for id in &config.inference.candidates {
            let provider_name = id.split_once(':').map(|(p, _)| p).unwrap_or(id);
            match providers.get(provider_name) {
                Some(provider) => candidates.push((id.clone(), Arc::clone(provider))),
                None => debug!(candidate = %id, "skipping candidate without provider"),
            }
        }
        info!(count = candidates.len(), "inference pool initialized");

        Ok(Self::new(candidates, PoolSettings::from(&config.inference)))
    }

    pub fn candidates(&self) -> &[BackendCandidate] {
        &self.candidates
    }

    /// Ids of candidates currently inside their exclusion cool-down.
    pub fn excluded_ids(&self) -> Vec<String> {
        let now = self.now_ms();
        self.candidates
            .iter()
            .filter(|c| c.is_cooling(now, self.settings.reprobe_after))
            .map(|c| c.id.clone())
            .collect()
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Fresh candidates first, then the ones still cooling down, each group
    /// in priority order.
    fn attempt_order(&self) -> Vec<&BackendCandidate> {
        let now = self.now_ms();
        let (mut fresh, cooling): (Vec<_>, Vec<_>) = self
            .candidates
            .iter()
            .partition(|c| !c.is_cooling(now, self.settings.reprobe_after));
        fresh.extend(cooling);
        fresh
    }

    /// Runs one assessment through the failover loop.
    pub async fn assess(&self, request: &AssessmentRequest) -> Result<AssessmentResult, OratorError> {
        let instruction = build_instruction(request.kind, request.target_text.as_deref());
        let mut attempts: u32 = 0;
        let mut last_error: Option<OratorError> = None;
        let mut all_malformed = true;

        'candidates: for candidate in self.attempt_order() {
            let mut retries: u32 = 0;
            loop {
                if attempts >= self.settings.max_attempts {
                    warn!(attempts, "inference attempt bound reached");
                    break 'candidates;
                }
                attempts += 1;

                let err = match self.call(candidate, request, &instruction).await {
                    Ok((result, usage)) => {
                        candidate.clear_exclusion();
                        info!(
                            backend = %candidate.id,
                            attempts,
                            score = result.overall_score,
                            "assessment completed"
                        );
                        self.record_usage(request, &candidate.id, usage).await;
                        return Ok(result);
                    }
                    Err(err) => err,
                };

                if !matches!(err, OratorError::MalformedResponse { .. }) {
                    all_malformed = false;
                }

                match classify(&err) {
                    FailureClass::Fatal => {
                        warn!(backend = %candidate.id, error = %err, "fatal inference failure");
                        return Err(err);
                    }
                    FailureClass::SwitchBackend => {
                        candidate.mark_excluded(self.now_ms());
                        warn!(backend = %candidate.id, error = %err, "backend excluded");
                        last_error = Some(err);
                        continue 'candidates;
                    }
                    FailureClass::SameBackend => {
                        last_error = Some(err);
                        if retries >= self.settings.same_backend_retries {
                            warn!(backend = %candidate.id, retries, "retries exhausted, moving on");
                            continue 'candidates;
                        }
                        let delay = self.settings.backoff_base * 2u32.saturating_pow(retries);
                        retries += 1;
                        warn!(
                            backend = %candidate.id,
                            retry = retries,
                            delay_ms = delay.as_millis() as u64,
                            "transient failure, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        match last_error {
            Some(err @ OratorError::MalformedResponse { .. }) if all_malformed => Err(err),
            Some(err) => Err(OratorError::ProviderExhausted {
                attempts,
                last_error: err.to_string(),
            }),
            None => Err(OratorError::ProviderExhausted {
                attempts,
                last_error: "no inference backends available".into(),
            }),
        }
    }

    async fn call(
        &self,
        candidate: &BackendCandidate,
        request: &AssessmentRequest,
        instruction: &str,
    ) -> Result<(AssessmentResult, TokenUsage), OratorError> {
        let provider_request = ProviderRequest {
            model: candidate.model.clone(),
            instruction: instruction.to_string(),
            audio: request.audio.clone(),
            max_tokens: self.settings.max_tokens,
        };
        let timeout = self.settings.request_timeout;
        let response = tokio::time::timeout(timeout, candidate.provider.complete(provider_request))
            .await
            .map_err(|_| OratorError::Timeout { duration: timeout })??;

        let parsed =
            parse_assessment(&response.text).map_err(|e| OratorError::MalformedResponse {
                backend: candidate.id.clone(),
                message: e.0,
            })?;

        let result = AssessmentResult {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: request.user_id.clone(),
            kind: request.kind,
            target_text: request.target_text.clone(),
            task_id: request.task_id.clone(),
            backend_id: candidate.id.clone(),
            overall_score: parsed.overall_score,
            scores: parsed.scores,
            transcription: parsed.transcription,
            level: parsed.level,
            feedback: parsed.feedback,
            created_at: chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string(),
        };
        Ok((result, response.usage))
    }

    async fn record_usage(&self, request: &AssessmentRequest, backend_id: &str, usage: TokenUsage) {
        let Some(recorder) = &self.recorder else {
            return;
        };
        let entry = UsageLogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: request.user_id.clone(),
            backend_id: backend_id.to_string(),
            purpose: request.kind,
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            cost_usd: 0.0,
            created_at: chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string(),
        };
        if let Err(e) = recorder.record_usage(entry).await {
            warn!(backend = %backend_id, error = %e, "failed to record usage");
        }
    }
}

fn resolve_key(configured: Option<&str>, env_var: &str) -> Option<SecretString> {
    configured
        .filter(|k| !k.trim().is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok().filter(|k| !k.trim().is_empty()))
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use orator_core::types::{
        AdapterType, AssessmentKind, AudioPayload, HealthStatus, ProviderResponse, UserId,
    };
    use orator_core::PluginAdapter;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const VALID: &str = r#"{
        "overall_score": 82,
        "scores": {"accuracy": 80, "fluency": 85, "prosody": 78, "completeness": 90, "word_accuracy": 79},
        "transcription": "the cat sat down",
        "level": "B2",
        "feedback": {"strengths": ["clear vowels"], "mispronounced": [], "action_plan": ["slow down"]}
    }"#;

    type Reply = Result<String, (Option<u16>, &'static str)>;

    /// Replays scripted replies per model; falls back to `default` once the
    /// script for a model runs out.
    struct Scripted {
        scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
        default: Reply,
        calls: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(default: Reply) -> Self {
            Self {
                scripts: Mutex::new(HashMap::new()),
                default,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn script(self, model: &str, replies: Vec<Reply>) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .insert(model.to_string(), replies.into());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PluginAdapter for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 0, 0)
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Provider
        }
        async fn health_check(&self) -> Result<HealthStatus, OratorError> {
            Ok(HealthStatus::Healthy)
        }
        async fn shutdown(&self) -> Result<(), OratorError> {
            Ok(())
        }
    }

    #[async_trait]
    impl ProviderAdapter for Scripted {
        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, OratorError> {
            self.calls.lock().unwrap().push(request.model.clone());
            let reply = self
                .scripts
                .lock()
                .unwrap()
                .get_mut(&request.model)
                .and_then(|q| q.pop_front())
                .unwrap_or_else(|| self.default.clone());
            match reply {
                Ok(text) => Ok(ProviderResponse {
                    text,
                    model: request.model,
                    usage: TokenUsage {
                        input_tokens: 100,
                        output_tokens: 10,
                    },
                }),
                Err((Some(status), msg)) => Err(OratorError::provider_status(status, msg)),
                Err((None, msg)) => Err(OratorError::provider(msg)),
            }
        }
    }

    #[derive(Default)]
    struct CollectingRecorder {
        entries: Mutex<Vec<UsageLogEntry>>,
    }

    #[async_trait]
    impl UsageRecorder for CollectingRecorder {
        async fn record_usage(&self, entry: UsageLogEntry) -> Result<(), OratorError> {
            self.entries.lock().unwrap().push(entry);
            Ok(())
        }
    }

    struct FailingRecorder;

    #[async_trait]
    impl UsageRecorder for FailingRecorder {
        async fn record_usage(&self, _entry: UsageLogEntry) -> Result<(), OratorError> {
            Err(OratorError::Internal("usage table locked".into()))
        }
    }

    fn settings() -> PoolSettings {
        PoolSettings {
            max_attempts: 5,
            same_backend_retries: 2,
            backoff_base: Duration::from_millis(1),
            request_timeout: Duration::from_secs(5),
            reprobe_after: Duration::from_secs(300),
            max_tokens: 512,
        }
    }

    fn pool_with(provider: &Arc<Scripted>, models: &[&str], settings: PoolSettings) -> InferencePool {
        let candidates = models
            .iter()
            .map(|m| {
                let adapter: Arc<dyn ProviderAdapter> = provider.clone();
                (format!("test:{m}"), adapter)
            })
            .collect();
        InferencePool::new(candidates, settings)
    }

    fn request() -> AssessmentRequest {
        AssessmentRequest {
            user_id: UserId::from("u1"),
            audio: AudioPayload {
                data: vec![0; 16],
                duration_secs: 4,
                media_type: "audio/ogg".into(),
            },
            kind: AssessmentKind::Test,
            target_text: Some("the cat sat down".into()),
            task_id: None,
        }
    }

    #[tokio::test]
    async fn quota_error_switches_to_next_backend() {
        let provider = Arc::new(
            Scripted::new(Ok(VALID.into())).script("a", vec![Err((Some(429), "quota exceeded"))]),
        );
        let recorder = Arc::new(CollectingRecorder::default());
        let pool = pool_with(&provider, &["a", "b"], settings()).with_recorder(recorder.clone());

        let result = pool.assess(&request()).await.unwrap();
        assert_eq!(result.backend_id, "test:b");
        assert_eq!(result.overall_score, 82);
        assert_eq!(result.target_text.as_deref(), Some("the cat sat down"));
        assert_eq!(pool.excluded_ids(), vec!["test:a".to_string()]);

        let entries = recorder.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].backend_id, "test:b");
        assert_eq!(entries[0].purpose, AssessmentKind::Test);
    }

    #[tokio::test]
    async fn all_switching_backends_exhaust_the_pool() {
        let provider = Arc::new(Scripted::new(Err((Some(404), "model not found"))));
        let pool = pool_with(&provider, &["a", "b", "c"], settings());

        let err = pool.assess(&request()).await.unwrap_err();
        match err {
            OratorError::ProviderExhausted { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(provider.calls(), vec!["a", "b", "c"]);
        assert_eq!(pool.excluded_ids().len(), 3);
    }

    #[tokio::test]
    async fn fatal_error_stops_immediately() {
        let provider = Arc::new(
            Scripted::new(Ok(VALID.into())).script("a", vec![Err((Some(401), "bad credentials"))]),
        );
        let pool = pool_with(&provider, &["a", "b"], settings());

        let err = pool.assess(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            OratorError::Provider {
                status: Some(401),
                ..
            }
        ));
        assert_eq!(provider.calls(), vec!["a"]);
        assert!(pool.excluded_ids().is_empty());
    }

    #[tokio::test]
    async fn transient_error_retries_same_backend() {
        let provider = Arc::new(Scripted::new(Ok(VALID.into())).script(
            "a",
            vec![Err((Some(503), "overloaded")), Err((None, "connection reset"))],
        ));
        let pool = pool_with(&provider, &["a", "b"], settings());

        let result = pool.assess(&request()).await.unwrap();
        assert_eq!(result.backend_id, "test:a");
        assert_eq!(provider.calls(), vec!["a", "a", "a"]);
        assert!(pool.excluded_ids().is_empty());
    }

    #[tokio::test]
    async fn transient_retries_are_bounded_per_backend() {
        let provider = Arc::new(Scripted::new(Ok(VALID.into())).script(
            "a",
            vec![
                Err((Some(503), "unavailable")),
                Err((Some(503), "unavailable")),
                Err((Some(503), "unavailable")),
            ],
        ));
        let pool = pool_with(&provider, &["a", "b"], settings());

        let result = pool.assess(&request()).await.unwrap();
        assert_eq!(result.backend_id, "test:b");
        assert_eq!(provider.calls(), vec!["a", "a", "a", "b"]);
    }

    #[tokio::test]
    async fn attempt_bound_is_respected() {
        let provider = Arc::new(Scripted::new(Err((Some(500), "internal"))));
        let mut s = settings();
        s.max_attempts = 4;
        let pool = pool_with(&provider, &["a", "b", "c"], s);

        let err = pool.assess(&request()).await.unwrap_err();
        match err {
            OratorError::ProviderExhausted { attempts, .. } => assert_eq!(attempts, 4),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(provider.calls().len(), 4);
    }

    #[tokio::test]
    async fn every_reply_malformed_reports_malformed() {
        let provider = Arc::new(Scripted::new(Ok("I cannot score this recording.".into())));
        let pool = pool_with(&provider, &["a", "b"], settings());

        let err = pool.assess(&request()).await.unwrap_err();
        assert!(matches!(err, OratorError::MalformedResponse { .. }), "got: {err:?}");
        assert_eq!(err.user_facing(), orator_core::UserFacing::MalformedResponse);
    }

    #[tokio::test]
    async fn mixed_failures_report_exhaustion() {
        let provider = Arc::new(
            Scripted::new(Ok("no json here".into())).script("a", vec![Err((Some(429), "quota"))]),
        );
        let pool = pool_with(&provider, &["a", "b"], settings());

        let err = pool.assess(&request()).await.unwrap_err();
        assert!(matches!(err, OratorError::ProviderExhausted { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn fenced_json_is_accepted() {
        let fenced = format!("Here you go:\n```json\n{VALID}\n```");
        let provider = Arc::new(Scripted::new(Ok(fenced)));
        let pool = pool_with(&provider, &["a"], settings());

        let result = pool.assess(&request()).await.unwrap();
        assert_eq!(result.level, "B2");
        assert_eq!(result.scores.fluency, 85);
    }

    #[tokio::test]
    async fn excluded_backend_is_tried_last_until_cool_down_passes() {
        let provider = Arc::new(
            Scripted::new(Ok(VALID.into())).script("a", vec![Err((Some(429), "quota"))]),
        );
        let mut s = settings();
        s.reprobe_after = Duration::from_millis(200);
        let pool = pool_with(&provider, &["a", "b"], s);

        pool.assess(&request()).await.unwrap();
        assert_eq!(provider.calls(), vec!["a", "b"]);

        // Still cooling: b goes first.
        let second = pool.assess(&request()).await.unwrap();
        assert_eq!(second.backend_id, "test:b");

        tokio::time::sleep(Duration::from_millis(250)).await;
        let third = pool.assess(&request()).await.unwrap();
        assert_eq!(third.backend_id, "test:a");
        assert!(pool.excluded_ids().is_empty());
    }

    #[tokio::test]
    async fn empty_pool_is_exhausted() {
        let pool = InferencePool::new(Vec::new(), settings());
        let err = pool.assess(&request()).await.unwrap_err();
        match err {
            OratorError::ProviderExhausted { attempts, .. } => assert_eq!(attempts, 0),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn usage_recorder_failure_is_swallowed() {
        let provider = Arc::new(Scripted::new(Ok(VALID.into())));
        let pool = pool_with(&provider, &["a"], settings()).with_recorder(Arc::new(FailingRecorder));

        let result = pool.assess(&request()).await.unwrap();
        assert_eq!(result.overall_score, 82);
    }

    #[tokio::test]
    async fn slow_backend_times_out_as_transient() {
        struct Slow;

        #[async_trait]
        impl PluginAdapter for Slow {
            fn name(&self) -> &str {
                "slow"
            }
            fn version(&self) -> semver::Version {
                semver::Version::new(0, 0, 0)
            }
            fn adapter_type(&self) -> AdapterType {
                AdapterType::Provider
            }
            async fn health_check(&self) -> Result<HealthStatus, OratorError> {
                Ok(HealthStatus::Healthy)
            }
            async fn shutdown(&self) -> Result<(), OratorError> {
                Ok(())
            }
        }

        #[async_trait]
        impl ProviderAdapter for Slow {
            async fn complete(&self, _r: ProviderRequest) -> Result<ProviderResponse, OratorError> {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Err(OratorError::Internal("unreachable".into()))
            }
        }

        let mut s = settings();
        s.request_timeout = Duration::from_millis(20);
        s.same_backend_retries = 1;
        let slow: Arc<dyn ProviderAdapter> = Arc::new(Slow);
        let pool = InferencePool::new(vec![("test:slow".to_string(), slow)], s);

        let err = pool.assess(&request()).await.unwrap_err();
        match err {
            OratorError::ProviderExhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 2);
                assert!(last_error.contains("timed out"), "got: {last_error}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Timeouts never mark a shared exclusion.
        assert!(pool.excluded_ids().is_empty());
    }

    #[test]
    fn settings_follow_config() {
        let config = orator_config::model::InferenceConfig::default();
        let s = PoolSettings::from(&config);
        assert_eq!(s.max_attempts, 5);
        assert_eq!(s.request_timeout, Duration::from_secs(75));
        assert_eq!(s.reprobe_after, Duration::from_secs(300));
    }

    #[test]
    fn from_config_drops_providers_without_keys() {
        let mut config = OratorConfig::default();
        config.gemini.api_key = Some("g-key".into());
        config.openai.api_key = Some("   ".into());
        config.openai.base_url = "http://127.0.0.1:1".into();
        // An OPENAI_API_KEY in the environment would re-enable openai.
        if std::env::var("OPENAI_API_KEY").is_ok() {
            return;
        }
        let pool = InferencePool::from_config(&config).unwrap();
        let ids: Vec<&str> = pool.candidates().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["gemini:gemini-2.5-flash", "gemini:gemini-2.0-flash"]);
        assert_eq!(pool.candidates()[1].priority(), 1);
    }
}
