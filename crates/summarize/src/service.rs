use std::collections::BTreeMap;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use tokio::sync::oneshot;
use tracing::{error, info, warn};

use crate::onnx::OnnxSummaryEngine;
use crate::stub::LeadSummaryEngine;
use crate::{SummarizeConfig, SummarizeError};

/// Anything that turns a batch of documents into summaries, one per input, in order.
pub trait SummaryEngine {
    fn summarize_batch(&mut self, texts: &[String]) -> Result<Vec<String>, SummarizeError>;
}

struct Job {
    texts: Vec<String>,
    reply: oneshot::Sender<Result<Vec<String>, SummarizeError>>,
}

/// Handle to a summarization model loaded on its own inference thread.
///
/// The engine is built on that thread and never leaves it, so engines that are
/// not `Send` (ONNX sessions) still work. Requests queue and run one at a time.
#[derive(Debug)]
pub struct Summarizer {
    jobs: mpsc::Sender<Job>,
    backend: String,
}

impl Summarizer {
    /// Validates `cfg`, loads the configured backend and waits until it is ready.
    pub fn load(cfg: &SummarizeConfig) -> Result<Self, SummarizeError> {
        cfg.validate()?;
        let backend = cfg.backend.clone();
        match backend.as_str() {
            "stub" => {
                let (sentences, max_words) = (cfg.stub_sentences, cfg.max_length);
                Self::spawn(&backend, move || {
                    Ok(LeadSummaryEngine::new(sentences, max_words))
                })
            }
            _ => {
                let cfg = cfg.clone();
                Self::spawn(&backend, move || OnnxSummaryEngine::load(&cfg))
            }
        }
    }

    /// Starts an inference thread running the engine built by `factory`.
    pub fn spawn<E, F>(backend: &str, factory: F) -> Result<Self, SummarizeError>
    where
        E: SummaryEngine + 'static,
        F: FnOnce() -> Result<E, SummarizeError> + Send + 'static,
    {
        let start = Instant::now();
        let (jobs, inbox) = mpsc::channel::<Job>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), SummarizeError>>(1);

        thread::Builder::new()
            .name(format!("summarize-{backend}"))
            .spawn(move || {
                let mut engine = match factory() {
                    Ok(engine) => {
                        let _ = ready_tx.send(Ok(()));
                        engine
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                while let Ok(job) = inbox.recv() {
                    let result = run_job(&mut engine, &job.texts);
                    if job.reply.send(result).is_err() {
                        warn!("summarize_caller_gone");
                    }
                }
            })
            .map_err(|e| SummarizeError::ModelUnavailable(format!("spawn inference thread: {e}")))?;

        ready_rx
            .recv()
            .map_err(|_| SummarizeError::WorkerStopped)??;

        info!(
            backend,
            elapsed_micros = start.elapsed().as_micros(),
            "summarizer_ready"
        );
        Ok(Self {
            jobs,
            backend: backend.to_string(),
        })
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Summarizes every document in one batch. The result has exactly the input's keys.
    pub async fn summarize(
        &self,
        docs: BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, SummarizeError> {
        let (keys, texts) = split(docs)?;
        let rx = self.submit(texts)?;
        let summaries = rx.await.map_err(|_| SummarizeError::WorkerStopped)??;
        zip_back(keys, summaries)
    }

    /// Blocking variant of [`summarize`](Self::summarize) for non-async callers.
    pub fn summarize_blocking(
        &self,
        docs: BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, SummarizeError> {
        let (keys, texts) = split(docs)?;
        let rx = self.submit(texts)?;
        let summaries = rx
            .blocking_recv()
            .map_err(|_| SummarizeError::WorkerStopped)??;
        zip_back(keys, summaries)
    }

    fn submit(
        &self,
        texts: Vec<String>,
    ) -> Result<oneshot::Receiver<Result<Vec<String>, SummarizeError>>, SummarizeError> {
        let (reply, rx) = oneshot::channel();
        self.jobs
            .send(Job { texts, reply })
            .map_err(|_| SummarizeError::WorkerStopped)?;
        Ok(rx)
    }
}

fn run_job<E: SummaryEngine>(
    engine: &mut E,
    texts: &[String],
) -> Result<Vec<String>, SummarizeError> {
    let start = Instant::now();
    match engine.summarize_batch(texts) {
        Ok(summaries) => {
            info!(
                docs = texts.len(),
                elapsed_micros = start.elapsed().as_micros(),
                "summarize_success"
            );
            Ok(summaries)
        }
        Err(err) => {
            error!(docs = texts.len(), error = %err, "summarize_failed");
            Err(err)
        }
    }
}

fn split(docs: BTreeMap<String, String>) -> Result<(Vec<String>, Vec<String>), SummarizeError> {
    if docs.is_empty() {
        return Err(SummarizeError::InvalidInput("no documents supplied".into()));
    }
    Ok(docs.into_iter().unzip())
}

fn zip_back(
    keys: Vec<String>,
    summaries: Vec<String>,
) -> Result<BTreeMap<String, String>, SummarizeError> {
    if keys.len() != summaries.len() {
        return Err(SummarizeError::Inference(format!(
            "engine returned {} summaries for {} documents",
            summaries.len(),
            keys.len()
        )));
    }
    Ok(keys.into_iter().zip(summaries).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    /// Not `Send`, like an ONNX session.
    struct Shouting {
        _local: Rc<()>,
    }

    impl SummaryEngine for Shouting {
        fn summarize_batch(&mut self, texts: &[String]) -> Result<Vec<String>, SummarizeError> {
            Ok(texts.iter().map(|t| t.to_uppercase()).collect())
        }
    }

    struct Lossy;

    impl SummaryEngine for Lossy {
        fn summarize_batch(&mut self, _: &[String]) -> Result<Vec<String>, SummarizeError> {
            Ok(vec!["only one".into()])
        }
    }

    fn docs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn keys_map_to_their_own_summaries() {
        let summarizer = Summarizer::spawn("test", || Ok(Shouting { _local: Rc::new(()) })).unwrap();
        let out = summarizer
            .summarize(docs(&[("doc2", "second"), ("doc1", "first")]))
            .await
            .unwrap();
        assert_eq!(out, docs(&[("doc1", "FIRST"), ("doc2", "SECOND")]));
    }

    #[test]
    fn blocking_variant() {
        let summarizer = Summarizer::spawn("test", || Ok(Shouting { _local: Rc::new(()) })).unwrap();
        let out = summarizer.summarize_blocking(docs(&[("a", "x")])).unwrap();
        assert_eq!(out["a"], "X");
    }

    #[test]
    fn load_failure_reported_at_spawn() {
        let err = Summarizer::spawn::<Shouting, _>("test", || {
            Err(SummarizeError::ModelUnavailable("missing".into()))
        })
        .unwrap_err();
        assert_eq!(err, SummarizeError::ModelUnavailable("missing".into()));
    }

    #[tokio::test]
    async fn empty_map_rejected() {
        let summarizer = Summarizer::spawn("test", || Ok(Lossy)).unwrap();
        assert!(matches!(
            summarizer.summarize(BTreeMap::new()).await,
            Err(SummarizeError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn count_mismatch_is_error() {
        let summarizer = Summarizer::spawn("test", || Ok(Lossy)).unwrap();
        assert!(matches!(
            summarizer.summarize(docs(&[("a", "1"), ("b", "2")])).await,
            Err(SummarizeError::Inference(_))
        ));
    }

    #[tokio::test]
    async fn stub_backend_loads_from_config() {
        let cfg = SummarizeConfig {
            backend: "stub".into(),
            ..Default::default()
        };
        let summarizer = Summarizer::load(&cfg).unwrap();
        assert_eq!(summarizer.backend(), "stub");
        let out = summarizer
            .summarize(docs(&[("doc1", "First sentence. Second one. Third.")]))
            .await
            .unwrap();
        assert_eq!(out["doc1"], "First sentence. Second one.");
    }

    #[test]
    fn onnx_backend_without_files_is_unavailable() {
        let cfg = SummarizeConfig {
            model: "./no/such/model".into(),
            ..Default::default()
        };
        assert!(matches!(
            Summarizer::load(&cfg),
            Err(SummarizeError::ModelUnavailable(_))
        ));
    }
}
