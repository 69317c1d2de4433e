//! End-to-end merge: concurrent extraction, clause splitting, DOCX assembly

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::clauses::split_clauses;
use crate::config::ExtractionConfig;
use crate::error::{Error, Result};
use crate::extraction::TextExtractor;
use crate::merge::DocumentMerger;
use crate::types::{DocumentRole, MergeInputs, UploadedFile};

/// Result of a successful merge
#[derive(Debug, Clone)]
pub struct MergeOutput {
    /// Serialized DOCX bytes
    pub document: Vec<u8>,
    /// Number of clauses the negotiated-clauses text was split into
    pub clause_count: usize,
}

/// Runs one merge per call; holds no per-request state
#[derive(Debug, Clone, Default)]
pub struct MergePipeline {
    extractor: Arc<TextExtractor>,
}

impl MergePipeline {
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            extractor: Arc::new(TextExtractor::new(config)),
        }
    }

    /// Extract all three inputs concurrently, split the clauses, and build
    /// the merged document. The first failure aborts the merge.
    pub async fn run(&self, inputs: MergeInputs) -> Result<MergeOutput> {
        let start = Instant::now();

        let (fixture_text, base_text, clauses_text) = tokio::try_join!(
            self.extract(inputs.fixture),
            self.extract(inputs.base_cp),
            self.extract(inputs.clauses),
        )?;

        let clauses = split_clauses(&clauses_text);
        let clause_count = clauses.len();
        tracing::debug!("Split negotiated clauses into {} entries", clause_count);

        let document = tokio::task::spawn_blocking(move || {
            DocumentMerger::merge(&base_text, &fixture_text, &clauses)
        })
        .await
        .map_err(|e| Error::Internal(format!("Task join error: {}", e)))??;

        tracing::info!(
            "Merged Charter Party: {} clauses, {} bytes in {:.1}ms",
            clause_count,
            document.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(MergeOutput {
            document,
            clause_count,
        })
    }

    /// Merge three local files. MIME types are guessed from the extensions.
    pub async fn run_files(
        &self,
        fixture: &Path,
        base_cp: &Path,
        clauses: &Path,
    ) -> Result<MergeOutput> {
        let inputs = MergeInputs {
            fixture: read_upload(DocumentRole::Fixture, fixture).await?,
            base_cp: read_upload(DocumentRole::BaseCp, base_cp).await?,
            clauses: read_upload(DocumentRole::Clauses, clauses).await?,
        };
        self.run(inputs).await
    }

    async fn extract(&self, file: UploadedFile) -> Result<String> {
        let extractor = Arc::clone(&self.extractor);
        tokio::task::spawn_blocking(move || extractor.extract(&file))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }
}

async fn read_upload(role: DocumentRole, path: &Path) -> Result<UploadedFile> {
    let data = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    let content_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string());

    Ok(UploadedFile::new(role, filename, content_type, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::extract_docx_text;
    use crate::merge::{BASE_CP_HEADING, CLAUSES_HEADING, FIXTURE_HEADING};

    fn text_upload(role: DocumentRole, text: &str) -> UploadedFile {
        UploadedFile::new(
            role,
            Some(format!("{}.txt", role)),
            Some("text/plain".to_string()),
            text.as_bytes().to_vec(),
        )
    }

    #[tokio::test]
    async fn test_run_with_text_inputs() {
        let pipeline = MergePipeline::default();
        let inputs = MergeInputs {
            fixture: text_upload(DocumentRole::Fixture, "MV OCEAN STAR\nLaycan 10-15 Oct"),
            base_cp: text_upload(DocumentRole::BaseCp, "GENCON 1994"),
            clauses: text_upload(DocumentRole::Clauses, "1. First.\n2. Second.\n3. Third."),
        };

        let output = pipeline.run(inputs).await.unwrap();
        assert_eq!(output.clause_count, 3);

        let text = extract_docx_text(&output.document).unwrap();
        assert_eq!(
            text,
            format!(
                "{}\n\nMV OCEAN STAR\n\nLaycan 10-15 Oct\n\n{}\n\nGENCON 1994\n\n{}\n\n1. First.\n\n2. Second.\n\n3. Third.\n\n",
                FIXTURE_HEADING, BASE_CP_HEADING, CLAUSES_HEADING
            )
        );
    }

    #[tokio::test]
    async fn test_extraction_failure_aborts() {
        let pipeline = MergePipeline::default();
        let inputs = MergeInputs {
            fixture: text_upload(DocumentRole::Fixture, "recap"),
            base_cp: UploadedFile::new(
                DocumentRole::BaseCp,
                Some("base.docx".to_string()),
                None,
                b"not a docx".to_vec(),
            ),
            clauses: text_upload(DocumentRole::Clauses, "1. A"),
        };

        match pipeline.run(inputs).await {
            Err(Error::Extraction { role, .. }) => assert_eq!(role, DocumentRole::BaseCp),
            other => panic!("expected extraction error, got {:?}", other.map(|o| o.clause_count)),
        }
    }

    #[tokio::test]
    async fn test_run_files() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("recap.txt");
        let base = dir.path().join("nype.txt");
        let clauses = dir.path().join("riders.txt");
        std::fs::write(&fixture, "Charterers: ACME").unwrap();
        std::fs::write(&base, "NYPE 2015").unwrap();
        std::fs::write(&clauses, "Rider clauses\n1. BIMCO ISPS").unwrap();

        let output = MergePipeline::default()
            .run_files(&fixture, &base, &clauses)
            .await
            .unwrap();
        assert_eq!(output.clause_count, 2);

        let text = extract_docx_text(&output.document).unwrap();
        assert!(text.contains("Charterers: ACME"));
        assert!(text.contains("NYPE 2015"));
        assert!(text.contains("1. BIMCO ISPS"));
    }

    #[tokio::test]
    async fn test_run_files_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.docx");
        let result = MergePipeline::default()
            .run_files(&missing, &missing, &missing)
            .await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
