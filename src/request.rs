use crate::config::LanguageMode;
use crate::error::{Result, StudypackError};
use crate::questions::QuestionPlan;
use serde::Serialize;

/// Archive file name presented to the caller.
pub const ARCHIVE_FILE_NAME: &str = "results.zip";

/// Media type the archive is served under.
pub const ARCHIVE_MEDIA_TYPE: &str = "application/x-zip-compressed";

/// The only accepted upload content type.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

pub const INVALID_FILE_TYPE_MESSAGE: &str = "Invalid file type. Please upload a video file.";

/// One uploaded lecture video.
#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A whole course-processing request. Uploads are in course order.
#[derive(Debug, Clone)]
pub struct StudyRequest {
    pub uploads: Vec<VideoUpload>,
    pub total_questions: usize,
    pub language_mode: LanguageMode,
}

/// The packed deliverable. `error` is set when the pipeline failed after
/// producing some artifacts; the archive then carries everything that
/// finished before the failure.
#[derive(Debug)]
pub struct PackagedArchive {
    pub bytes: Vec<u8>,
    pub file_name: &'static str,
    pub media_type: &'static str,
    pub error: Option<String>,
}

impl PackagedArchive {
    pub fn complete(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: ARCHIVE_FILE_NAME,
            media_type: ARCHIVE_MEDIA_TYPE,
            error: None,
        }
    }

    pub fn partial(bytes: Vec<u8>, error: String) -> Self {
        Self {
            bytes,
            file_name: ARCHIVE_FILE_NAME,
            media_type: ARCHIVE_MEDIA_TYPE,
            error: Some(error),
        }
    }

    pub fn status(&self) -> u16 {
        if self.error.is_some() {
            500
        } else {
            200
        }
    }
}

/// Structured error payload for requests that produced nothing to ship.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    pub status: u16,
    pub message: String,
}

impl From<&StudypackError> for ErrorResponse {
    fn from(error: &StudypackError) -> Self {
        Self {
            status: error.status(),
            message: error.to_string(),
        }
    }
}

/// Everything a request can come back as.
#[derive(Debug)]
pub enum StudyResponse {
    Archive(PackagedArchive),
    Error(ErrorResponse),
}

impl StudyResponse {
    pub fn status(&self) -> u16 {
        match self {
            StudyResponse::Archive(archive) => archive.status(),
            StudyResponse::Error(error) => error.status,
        }
    }
}

/// Check a request before any pipeline work happens. Returns the
/// validated question plan.
pub fn validate_request(request: &StudyRequest) -> Result<QuestionPlan> {
    if request.uploads.is_empty() {
        return Err(StudypackError::Validation(
            "No video uploaded. Attach at least one video file.".to_string(),
        ));
    }

    for upload in &request.uploads {
        if upload.content_type != VIDEO_CONTENT_TYPE {
            return Err(StudypackError::Validation(
                INVALID_FILE_TYPE_MESSAGE.to_string(),
            ));
        }
    }

    QuestionPlan::new(request.total_questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str) -> VideoUpload {
        VideoUpload {
            file_name: "lecture.mp4".to_string(),
            content_type: content_type.to_string(),
            data: vec![0u8; 16],
        }
    }

    fn request(uploads: Vec<VideoUpload>, total_questions: usize) -> StudyRequest {
        StudyRequest {
            uploads,
            total_questions,
            language_mode: LanguageMode::Standard,
        }
    }

    #[test]
    fn test_valid_request() {
        let plan = validate_request(&request(vec![upload("video/mp4")], 9)).unwrap();
        assert_eq!(plan.total, 9);
        assert_eq!(plan.per_tier, 3);
    }

    #[test]
    fn test_wrong_content_type_message_is_exact() {
        let err = validate_request(&request(vec![upload("application/pdf")], 9)).unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.to_string(), "Invalid file type. Please upload a video file.");
    }

    #[test]
    fn test_any_bad_upload_rejects_the_request() {
        let err = validate_request(&request(
            vec![upload("video/mp4"), upload("audio/mpeg")],
            9,
        ))
        .unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_empty_uploads_rejected() {
        let err = validate_request(&request(vec![], 9)).unwrap_err();
        assert_eq!(err.status(), 400);
        assert!(err.to_string().contains("No video uploaded"));
    }

    #[test]
    fn test_bad_question_count_rejected() {
        for total in [0, 4, 22] {
            let err = validate_request(&request(vec![upload("video/mp4")], total)).unwrap_err();
            assert_eq!(err.status(), 400, "{total}");
        }
    }

    #[test]
    fn test_error_response_serializes_message_only() {
        let response = ErrorResponse {
            status: 400,
            message: "bad".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"message":"bad"}"#);
    }

    #[test]
    fn test_archive_status_reflects_error_marker() {
        assert_eq!(PackagedArchive::complete(vec![1]).status(), 200);
        assert_eq!(
            PackagedArchive::partial(vec![1], "boom".to_string()).status(),
            500
        );
    }
}
