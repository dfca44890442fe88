//! Translation request controller
//!
//! Serializes exactly one in-flight translation request and maps its
//! outcome onto the history ledger: success appends a record, failure
//! surfaces an error and leaves the ledger untouched. The remote service
//! sits behind [`TranslationBackend`] so the controller never knows about
//! HTTP details.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Client;

use crate::core::history::HistoryLedger;
use crate::core::languages;
use crate::shared::error::{AppError, AppResult};
use crate::shared::settings::ApiSettings;
use crate::shared::types::{TranslateRequest, TranslationRecord};

/// Network boundary for the translation collaborator.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Checked before a request is issued; a misconfigured backend is
    /// reported inline without entering the pending state.
    fn validate_config(&self) -> AppResult<()> {
        Ok(())
    }

    async fn translate(&self, request: &TranslateRequest) -> AppResult<String>;
}

/// Controller state: Idle until a request is issued, Pending until the
/// backend resolves, then back to Idle with either a record or an error.
pub struct TranslationController {
    backend: Arc<dyn TranslationBackend>,
    ledger: Arc<Mutex<HistoryLedger>>,
    pending: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl TranslationController {
    pub fn new(backend: Arc<dyn TranslationBackend>, ledger: Arc<Mutex<HistoryLedger>>) -> Self {
        Self {
            backend,
            ledger,
            pending: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    /// Translate `text` into the target language and record the result.
    ///
    /// Rejected without issuing a request when the trimmed input is empty,
    /// the backend is not configured, or another request is already
    /// pending. Failures never mutate the ledger; the user re-triggers
    /// manually, there is no retry.
    pub async fn translate(
        &self,
        text: &str,
        target_language_code: &str,
    ) -> AppResult<TranslationRecord> {
        let input = text.trim();
        if input.is_empty() {
            return Err(AppError::Validation(
                "Please enter some text to translate".to_string(),
            ));
        }

        self.backend.validate_config()?;

        if self
            .pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AppError::Validation(
                "A translation is already in progress".to_string(),
            ));
        }

        self.set_last_error(None);

        let request = TranslateRequest {
            target_lang: target_language_code.to_string(),
            text: input.to_string(),
        };

        let result = match self.backend.translate(&request).await {
            Ok(translated) => {
                let name = languages::display_name(target_language_code);
                let mut ledger = match self.ledger.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                Ok(ledger.add(input, &translated, target_language_code, &name))
            }
            Err(e) => {
                self.set_last_error(Some(e.to_string()));
                Err(e)
            }
        };

        self.pending.store(false, Ordering::SeqCst);
        result
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn last_error(&self) -> Option<String> {
        match self.last_error.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_last_error(&self, value: Option<String>) {
        let mut guard = match self.last_error.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = value;
    }
}

/// HTTP implementation of the translation collaborator.
pub struct HttpTranslationBackend {
    http: Client,
    api: ApiSettings,
}

impl HttpTranslationBackend {
    pub fn new(api: ApiSettings) -> AppResult<Self> {
        let http = Client::builder()
            .user_agent("lingo/translator")
            .build()
            .map_err(|e| AppError::Network(e.to_string()))?;

        Ok(Self { http, api })
    }
}

#[async_trait]
impl TranslationBackend for HttpTranslationBackend {
    fn validate_config(&self) -> AppResult<()> {
        if self.api.api_key.trim().is_empty() {
            return Err(AppError::Feature(
                "Translation API key is not configured. Set it with `lingo config set --api-key ...` or the LINGO_API_KEY environment variable".to_string(),
            ));
        }
        Ok(())
    }

    async fn translate(&self, request: &TranslateRequest) -> AppResult<String> {
        let response = self
            .http
            .post(&self.api.endpoint)
            .header("x-rapidapi-key", &self.api.api_key)
            .header("x-rapidapi-host", &self.api.api_host)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Translation request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Network(format!(
                "Translation API error: {}",
                response.status()
            )));
        }

        let payload = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to parse translation response: {}", e)))?;

        extract_translated_text(&payload)
    }
}

/// A response without a populated `translatedText` field is a failure, the
/// same as a bad status code.
fn extract_translated_text(payload: &serde_json::Value) -> AppResult<String> {
    match payload.get("translatedText").and_then(|v| v.as_str()) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(AppError::Validation(
            "Translation failed: no translated text received".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::store::MemoryStore;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::oneshot;

    struct MockBackend {
        response: Result<String, String>,
        calls: AtomicUsize,
    }

    impl MockBackend {
        fn ok(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                response: Err(message.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranslationBackend for MockBackend {
        async fn translate(&self, _request: &TranslateRequest) -> AppResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(AppError::Network(message.clone())),
            }
        }
    }

    /// Backend that parks until released, to hold the controller in Pending.
    struct BlockingBackend {
        release: Mutex<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait]
    impl TranslationBackend for BlockingBackend {
        async fn translate(&self, _request: &TranslateRequest) -> AppResult<String> {
            let release = self.release.lock().unwrap().take();
            if let Some(release) = release {
                let _ = release.await;
            }
            Ok("done".to_string())
        }
    }

    fn new_ledger() -> Arc<Mutex<HistoryLedger>> {
        Arc::new(Mutex::new(HistoryLedger::load(Arc::new(MemoryStore::new()))))
    }

    #[tokio::test]
    async fn success_appends_a_record() {
        let ledger = new_ledger();
        let backend = Arc::new(MockBackend::ok("Bonjour"));
        let controller = TranslationController::new(backend.clone(), ledger.clone());

        let record = controller.translate("Hello", "fr").await.unwrap();

        assert_eq!(record.input_text, "Hello");
        assert_eq!(record.translated_text, "Bonjour");
        assert_eq!(record.target_language_code, "fr");
        assert_eq!(record.target_language_name, "French");
        assert_eq!(ledger.lock().unwrap().len(), 1);
        assert!(!controller.is_pending());
        assert!(controller.last_error().is_none());
    }

    #[tokio::test]
    async fn input_is_trimmed_before_recording() {
        let ledger = new_ledger();
        let backend = Arc::new(MockBackend::ok("Bonjour"));
        let controller = TranslationController::new(backend, ledger);

        let record = controller.translate("  Hello  ", "fr").await.unwrap();
        assert_eq!(record.input_text, "Hello");
    }

    #[tokio::test]
    async fn empty_input_never_reaches_the_backend() {
        let ledger = new_ledger();
        let backend = Arc::new(MockBackend::ok("unused"));
        let controller = TranslationController::new(backend.clone(), ledger.clone());

        let result = controller.translate("   ", "fr").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(backend.call_count(), 0);
        assert!(ledger.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failure_leaves_the_ledger_untouched() {
        let ledger = new_ledger();
        let backend = Arc::new(MockBackend::failing("connection reset"));
        let controller = TranslationController::new(backend, ledger.clone());

        let result = controller.translate("Hello", "fr").await;

        assert!(matches!(result, Err(AppError::Network(_))));
        assert!(ledger.lock().unwrap().is_empty());
        assert!(!controller.is_pending());
        assert!(controller.last_error().unwrap().contains("connection reset"));
    }

    /// Backend that fails once, then succeeds.
    struct FlakyBackend {
        responses: Mutex<Vec<Result<String, String>>>,
    }

    #[async_trait]
    impl TranslationBackend for FlakyBackend {
        async fn translate(&self, _request: &TranslateRequest) -> AppResult<String> {
            let next = self.responses.lock().unwrap().remove(0);
            next.map_err(AppError::Network)
        }
    }

    #[tokio::test]
    async fn a_new_request_clears_the_previous_error() {
        let ledger = new_ledger();
        let backend = Arc::new(FlakyBackend {
            responses: Mutex::new(vec![Err("boom".to_string()), Ok("Bonjour".to_string())]),
        });
        let controller = TranslationController::new(backend, ledger);

        let _ = controller.translate("Hello", "fr").await;
        assert!(controller.last_error().is_some());

        let record = controller.translate("Hello", "fr").await.unwrap();
        assert_eq!(record.translated_text, "Bonjour");
        assert!(controller.last_error().is_none());
    }

    #[tokio::test]
    async fn overlapping_requests_are_rejected() {
        let (release_tx, release_rx) = oneshot::channel();
        let ledger = new_ledger();
        let backend = Arc::new(BlockingBackend {
            release: Mutex::new(Some(release_rx)),
        });
        let controller = Arc::new(TranslationController::new(backend, ledger.clone()));

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.translate("hello", "fr").await })
        };

        while !controller.is_pending() {
            tokio::task::yield_now().await;
        }

        // Second invocation while Pending is rejected, not queued
        let second = controller.translate("world", "fr").await;
        assert!(second.is_err());

        release_tx.send(()).unwrap();
        let record = first.await.unwrap().unwrap();

        assert_eq!(record.input_text, "hello");
        assert_eq!(ledger.lock().unwrap().len(), 1);
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn unconfigured_backend_is_rejected_inline() {
        struct Unconfigured;

        #[async_trait]
        impl TranslationBackend for Unconfigured {
            fn validate_config(&self) -> AppResult<()> {
                Err(AppError::Feature("missing API key".to_string()))
            }

            async fn translate(&self, _request: &TranslateRequest) -> AppResult<String> {
                panic!("must not be called");
            }
        }

        let ledger = new_ledger();
        let controller = TranslationController::new(Arc::new(Unconfigured), ledger.clone());

        let result = controller.translate("Hello", "fr").await;
        assert!(matches!(result, Err(AppError::Feature(_))));
        assert!(ledger.lock().unwrap().is_empty());
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn http_backend_requires_an_api_key() {
        let api = ApiSettings {
            endpoint: "https://example.invalid/translate".to_string(),
            api_key: String::new(),
            api_host: "example.invalid".to_string(),
        };
        let backend = HttpTranslationBackend::new(api).unwrap();
        assert!(matches!(backend.validate_config(), Err(AppError::Feature(_))));
    }

    #[test]
    fn response_parsing_accepts_populated_text_only() {
        let ok = serde_json::json!({ "translatedText": "Bonjour" });
        assert_eq!(extract_translated_text(&ok).unwrap(), "Bonjour");

        let empty = serde_json::json!({ "translatedText": "" });
        assert!(extract_translated_text(&empty).is_err());

        let missing = serde_json::json!({ "status": "ok" });
        assert!(extract_translated_text(&missing).is_err());

        let wrong_type = serde_json::json!({ "translatedText": 42 });
        assert!(extract_translated_text(&wrong_type).is_err());
    }
}
