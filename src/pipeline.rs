use crate::archive::{build_archive, has_artifacts};
use crate::audio::{AudioEngine, ChunkPolicy, FfmpegEngine};
use crate::config::Config;
use crate::course::{CourseState, LectureRecord};
use crate::document::{paginate, write_pages, PageGeometry};
use crate::error::{Result, StudypackError};
use crate::generate::{GeminiClient, StructuredGenerator};
use crate::questions::{generate_question_set, QuestionPlan};
use crate::request::{
    validate_request, ErrorResponse, PackagedArchive, StudyRequest, StudyResponse, VideoUpload,
};
use crate::summarize::summarize_pages;
use crate::transcribe::{transcribe_to_file, SpeechToText, WhisperClient};
use crate::workspace::Workspace;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

/// Sampling temperatures per generation role. Summaries and the running
/// combined summary stay close to the source text, candidate questions
/// get room to vary, and arbitration is kept nearly deterministic.
const SUMMARY_TEMPERATURE: f32 = 0.5;
const COMBINE_TEMPERATURE: f32 = 0.5;
const QUESTION_TEMPERATURE: f32 = 0.7;
const SELECTION_TEMPERATURE: f32 = 0.3;

/// The whole study-material pipeline behind one entry point.
///
/// Every external dependency sits behind a trait object, so tests can run
/// the full request lifecycle against scripted backends.
pub struct Pipeline {
    engine: Arc<dyn AudioEngine>,
    speech: Arc<dyn SpeechToText>,
    summarizer: Arc<dyn StructuredGenerator>,
    combiner: Arc<dyn StructuredGenerator>,
    selector: Arc<dyn StructuredGenerator>,
    question_pool: Vec<Arc<dyn StructuredGenerator>>,
    chunk_policy: ChunkPolicy,
    geometry: PageGeometry,
    data_dir: PathBuf,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("question_pool_len", &self.question_pool.len())
            .field("chunk_policy", &self.chunk_policy)
            .field("geometry", &self.geometry)
            .field("data_dir", &self.data_dir)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Build a pipeline with real backends from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let openai_key = config.openai_api_key.clone().ok_or_else(|| {
            StudypackError::Config(
                "OPENAI_API_KEY not set. Export it with: export OPENAI_API_KEY=sk-...".to_string(),
            )
        })?;
        let gemini_key = config.gemini_api_key.clone().ok_or_else(|| {
            StudypackError::Config(
                "GEMINI_API_KEY not set. Get one at https://aistudio.google.com/apikey".to_string(),
            )
        })?;
        if config.question_models.is_empty() {
            return Err(StudypackError::Config(
                "At least one question model must be configured".to_string(),
            ));
        }

        let speech = Arc::new(WhisperClient::new(openai_key));
        let summarizer = Arc::new(
            GeminiClient::new(gemini_key.clone(), config.summary_model.clone())
                .with_temperature(SUMMARY_TEMPERATURE),
        );
        let combiner = Arc::new(
            GeminiClient::new(gemini_key.clone(), config.combine_model.clone())
                .with_temperature(COMBINE_TEMPERATURE),
        );
        let selector = Arc::new(
            GeminiClient::new(gemini_key.clone(), config.selection_model.clone())
                .with_temperature(SELECTION_TEMPERATURE),
        );
        let question_pool = config
            .question_models
            .iter()
            .map(|model| {
                Arc::new(
                    GeminiClient::new(gemini_key.clone(), model.clone())
                        .with_temperature(QUESTION_TEMPERATURE),
                ) as Arc<dyn StructuredGenerator>
            })
            .collect();

        Ok(Self::new(
            Arc::new(FfmpegEngine),
            speech,
            summarizer,
            combiner,
            selector,
            question_pool,
            config.data_dir.clone(),
        ))
    }

    /// Assemble a pipeline from explicit backends.
    pub fn new(
        engine: Arc<dyn AudioEngine>,
        speech: Arc<dyn SpeechToText>,
        summarizer: Arc<dyn StructuredGenerator>,
        combiner: Arc<dyn StructuredGenerator>,
        selector: Arc<dyn StructuredGenerator>,
        question_pool: Vec<Arc<dyn StructuredGenerator>>,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            engine,
            speech,
            summarizer,
            combiner,
            selector,
            question_pool,
            chunk_policy: ChunkPolicy::openai(),
            geometry: PageGeometry::default(),
            data_dir,
        }
    }

    pub fn with_chunk_policy(mut self, policy: ChunkPolicy) -> Self {
        self.chunk_policy = policy;
        self
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Run one request end to end and always come back with a response.
    ///
    /// The request workspace is removed on every path out. A failure after
    /// some lectures finished still ships their artifacts: the archive is
    /// delivered with the error attached instead of being discarded.
    pub async fn process(&self, request: StudyRequest) -> StudyResponse {
        let plan = match validate_request(&request) {
            Ok(plan) => plan,
            Err(e) => {
                warn!("Rejected request: {}", e);
                return StudyResponse::Error(ErrorResponse::from(&e));
            }
        };

        let request_id = Uuid::new_v4().to_string();
        info!(
            "Request {}: {} lecture(s), {} questions, {} mode",
            request_id,
            request.uploads.len(),
            plan.total,
            request.language_mode
        );

        let workspace = match Workspace::allocate(&self.data_dir, &request_id).await {
            Ok(ws) => ws,
            Err(e) => {
                warn!("Failed to allocate workspace: {}", e);
                return StudyResponse::Error(ErrorResponse::from(&e));
            }
        };

        let outcome = self.run(&workspace, &request, &plan).await;

        let response = match outcome {
            Ok(()) => match build_archive(workspace.output_dir()).await {
                Ok(bytes) => StudyResponse::Archive(PackagedArchive::complete(bytes)),
                Err(e) => {
                    warn!("Failed to pack archive: {}", e);
                    StudyResponse::Error(ErrorResponse::from(&e))
                }
            },
            Err(e) => {
                warn!("Pipeline failed in {} stage: {}", e.stage(), e);
                if has_artifacts(workspace.output_dir()).await {
                    match build_archive(workspace.output_dir()).await {
                        Ok(bytes) => {
                            StudyResponse::Archive(PackagedArchive::partial(bytes, e.to_string()))
                        }
                        Err(pack_err) => {
                            warn!("Failed to pack partial archive: {}", pack_err);
                            StudyResponse::Error(ErrorResponse::from(&e))
                        }
                    }
                } else {
                    StudyResponse::Error(ErrorResponse::from(&e))
                }
            }
        };

        if let Err(e) = workspace.release().await {
            warn!("Failed to release workspace: {}", e);
        }

        response
    }

    async fn run(
        &self,
        workspace: &Workspace,
        request: &StudyRequest,
        plan: &QuestionPlan,
    ) -> Result<()> {
        let mut course = CourseState::new();
        let total = request.uploads.len();

        for (position, upload) in request.uploads.iter().enumerate() {
            let number = position + 1;
            info!(
                "Processing lecture {}/{}: {}",
                number, total, upload.file_name
            );
            self.process_lecture(workspace, upload, number, request, plan, &mut course)
                .await?;
        }

        Ok(())
    }

    async fn process_lecture(
        &self,
        workspace: &Workspace,
        upload: &VideoUpload,
        number: usize,
        request: &StudyRequest,
        plan: &QuestionPlan,
        course: &mut CourseState,
    ) -> Result<()> {
        let paths = workspace.lecture(number).await?;

        // ═══════════════════════════════════════════════════════════════════
        // Stage 1: Audio Extraction
        // ═══════════════════════════════════════════════════════════════════
        info!("Stage 1/6: Extracting audio from {}", upload.file_name);
        fs::write(&paths.video, &upload.data).await?;
        self.engine
            .extract_audio(&paths.video, &paths.audio)
            .await?;

        // ═══════════════════════════════════════════════════════════════════
        // Stage 2: Transcription
        // ═══════════════════════════════════════════════════════════════════
        info!("Stage 2/6: Transcribing with {}", self.speech.name());
        let report = transcribe_to_file(
            self.speech.as_ref(),
            self.engine.as_ref(),
            &paths.audio,
            &paths.transcript,
            &paths.chunks_dir,
            request.language_mode,
            &self.chunk_policy,
        )
        .await?;
        info!(
            "Transcription complete: {} window(s), estimated cost ${:.4}",
            report.windows, report.estimated_cost_usd
        );

        // ═══════════════════════════════════════════════════════════════════
        // Stage 3: Pagination
        // ═══════════════════════════════════════════════════════════════════
        info!("Stage 3/6: Paginating transcript");
        let transcript = fs::read_to_string(&paths.transcript).await?;
        let geometry = self.geometry;
        let pages = tokio::task::spawn_blocking(move || paginate(&transcript, &geometry))
            .await
            .map_err(|e| {
                StudypackError::Io(std::io::Error::other(format!(
                    "pagination task failed: {e}"
                )))
            })?;
        write_pages(&pages, &paths.pages_dir).await?;
        info!("Laid out {} page(s)", pages.len());

        // ═══════════════════════════════════════════════════════════════════
        // Stage 4: Summarization
        // ═══════════════════════════════════════════════════════════════════
        info!("Stage 4/6: Summarizing {} page(s)", pages.len());
        let summary = summarize_pages(
            self.summarizer.as_ref(),
            &pages,
            &workspace.concise_summary_file(number),
            &workspace.detailed_summary_file(number),
        )
        .await?;

        // ═══════════════════════════════════════════════════════════════════
        // Stage 5: Question Generation
        // ═══════════════════════════════════════════════════════════════════
        info!(
            "Stage 5/6: Generating {} questions across {} backend(s)",
            plan.total,
            self.question_pool.len()
        );
        let questions = generate_question_set(
            &self.question_pool,
            self.selector.as_ref(),
            &summary.concise,
            plan,
        )
        .await?;
        let questions_json = serde_json::to_string_pretty(&questions)?;
        fs::write(workspace.questions_file(number), questions_json).await?;

        // ═══════════════════════════════════════════════════════════════════
        // Stage 6: Course Aggregation
        // ═══════════════════════════════════════════════════════════════════
        info!("Stage 6/6: Folding lecture {} into the course", number);
        let record = LectureRecord {
            number,
            concise_summary: summary.concise,
            detailed_summary: summary.detailed,
            questions,
        };
        course
            .absorb(
                self.combiner.as_ref(),
                record,
                &workspace.combined_summary_file(),
            )
            .await?;

        if course.lecture_count() >= 2 {
            let cumulative = generate_question_set(
                &self.question_pool,
                self.selector.as_ref(),
                &course.combined_summary,
                plan,
            )
            .await?;
            let cumulative_json = serde_json::to_string_pretty(&cumulative)?;
            fs::write(workspace.cumulative_questions_file(number), cumulative_json).await?;
            info!("Cumulative questions cover lectures 1 to {}", number);
        }

        Ok(())
    }
}
