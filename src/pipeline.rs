//! Per-document redaction pipeline
//!
//! Dispatches by document kind and assembles multi-page output. One
//! invocation owns all of its intermediate state; the compiled
//! detector and the collaborator handles are read-only, so separate
//! documents can run on separate tasks against clones of the same
//! pipeline handles without locking.

use std::collections::HashSet;
use std::future::Future;
use std::path::Path;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use futures::future::join_all;
use image::RgbImage;
use tracing::{debug, info, instrument, warn};

use crate::{
    config::RedactionConfig,
    detect::{Match, PhiCategory, TextDetector},
    error::{ConfigurationError, Error, RecognitionError, Result},
    ocr::{ImageTextLocator, LocatedPage, OcrEngine},
    pdf::{PdfAssembler, PdfRasterizer},
    render::{self, ImageRenderer},
    types::{
        Document, DocumentKind, Manifest, ManifestEntry, PageStatus, RedactedArtifact,
        RedactionOutcome,
    },
    utils::Metrics,
};

/// Cooperative cancellation handle, checked at page granularity.
/// Cancelling mid-document discards partial pages; the invocation
/// returns `Error::Cancelled` and emits no artifact.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One processed page, carried between recognition and assembly.
struct PageOutcome {
    image: RgbImage,
    status: PageStatus,
    categories: Vec<PhiCategory>,
    redaction_count: usize,
    text: String,
}

/// A page after rasterization and recognition, before redaction.
struct PageScan {
    image: RgbImage,
    located: Option<LocatedPage>,
}

/// Orchestrates detection, coordinate mapping and rendering for one
/// document at a time.
pub struct RedactionPipeline {
    config: RedactionConfig,
    detector: TextDetector,
    locator: ImageTextLocator,
    renderer: ImageRenderer,
    ocr: Option<Arc<dyn OcrEngine>>,
    rasterizer: Option<Arc<dyn PdfRasterizer>>,
    assembler: Option<Arc<dyn PdfAssembler>>,
    metrics: Arc<Metrics>,
    cancel: CancelFlag,
}

impl RedactionPipeline {
    /// Build the pipeline. A malformed configuration or pattern table
    /// is fatal here; the engine never starts half-built.
    pub fn new(config: RedactionConfig) -> Result<Self> {
        config.validate()?;
        let detector = TextDetector::new(&config)?;
        let locator = ImageTextLocator::new(config.min_page_confidence);
        let renderer = ImageRenderer::new(&config);
        Ok(Self {
            config,
            detector,
            locator,
            renderer,
            ocr: None,
            rasterizer: None,
            assembler: None,
            metrics: Arc::new(Metrics::new()),
            cancel: CancelFlag::new(),
        })
    }

    pub fn with_ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.ocr = Some(engine);
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn PdfRasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    pub fn with_assembler(mut self, assembler: Arc<dyn PdfAssembler>) -> Self {
        self.assembler = Some(assembler);
        self
    }

    /// Handle the caller keeps to abandon remaining pages.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    /// Redact a file and write the artifact next to the manifest the
    /// caller gets back.
    #[instrument(skip(self))]
    pub async fn redact_file(&self, input: &Path, output: &Path) -> Result<RedactionOutcome> {
        let document = Document::from_file(input)?;
        let outcome = self.redact_document(document).await?;
        outcome.artifact.write_to(output)?;
        info!(output = %output.display(), "redacted artifact written");
        Ok(outcome)
    }

    pub async fn redact_bytes(&self, kind: DocumentKind, bytes: Vec<u8>) -> Result<RedactionOutcome> {
        self.redact_document(Document::new(kind, bytes)).await
    }

    /// Dispatch one document through the matching flow.
    #[instrument(skip(self, document), fields(id = %document.id, kind = ?document.kind))]
    pub async fn redact_document(&self, document: Document) -> Result<RedactionOutcome> {
        self.metrics.start_timer("document");
        let outcome = match document.kind {
            DocumentKind::Text => self.redact_text_document(&document),
            DocumentKind::Image => self.redact_image_document(&document).await,
            DocumentKind::Pdf => self.redact_pdf_document(&document).await,
        };
        self.metrics.end_timer("document");
        outcome
    }

    // ---------- text ----------

    fn redact_text_document(&self, document: &Document) -> Result<RedactionOutcome> {
        let text = String::from_utf8_lossy(&document.bytes).into_owned();
        let matches = self.detector.detect(&text);
        let redacted = render::text::redact(&text, &matches);

        let status = if matches.is_empty() {
            PageStatus::NoPhiFound
        } else {
            PageStatus::Redacted
        };
        self.metrics.increment_counter("pages_processed");
        self.metrics.add_to_counter("matches_found", matches.len() as u64);

        let mut manifest = Manifest::new(document.id);
        manifest.push(ManifestEntry {
            page_index: 0,
            status,
            categories: categories_of(&matches),
            redaction_count: matches.len(),
        });
        info!(matches = matches.len(), "text document redacted");

        Ok(RedactionOutcome {
            artifact: RedactedArtifact::Text(redacted.clone()),
            manifest,
            redacted_text: redacted,
        })
    }

    // ---------- image ----------

    async fn redact_image_document(&self, document: &Document) -> Result<RedactionOutcome> {
        let page = image::load_from_memory(&document.bytes)?.to_rgb8();
        let outcome = self.process_page(0, page, &HashSet::new()).await?;

        let mut manifest = Manifest::new(document.id);
        manifest.push(ManifestEntry {
            page_index: 0,
            status: outcome.status,
            categories: outcome.categories.clone(),
            redaction_count: outcome.redaction_count,
        });

        Ok(RedactionOutcome {
            artifact: RedactedArtifact::Image(outcome.image),
            manifest,
            redacted_text: outcome.text,
        })
    }

    // ---------- pdf ----------

    async fn redact_pdf_document(&self, document: &Document) -> Result<RedactionOutcome> {
        let rasterizer = self
            .rasterizer
            .clone()
            .ok_or(ConfigurationError::MissingRasterizer)?;
        let assembler = self
            .assembler
            .clone()
            .ok_or(ConfigurationError::MissingAssembler)?;
        if self.ocr.is_none() {
            return Err(ConfigurationError::MissingOcrEngine.into());
        }

        let page_total = rasterizer.page_count(&document.bytes).await?;
        debug!(pages = page_total, "rasterizing pdf");

        // Pass 1: rasterize and recognize every page. Page order only
        // matters at reassembly, so the scans run concurrently.
        let scans = join_all(
            (0..page_total).map(|index| self.scan_pdf_page(&document.bytes, index, &rasterizer)),
        )
        .await
        .into_iter()
        .collect::<Result<Vec<PageScan>>>()?;

        // Names discovered anywhere in the document redact bare
        // mentions on every page.
        let mut known_names = HashSet::new();
        if self.config.propagate_names {
            for scan in scans.iter().filter_map(|s| s.located.as_ref()) {
                let matches = self.detector.detect(&scan.text);
                known_names.extend(self.detector.extract_name_tokens(&matches));
            }
            debug!(names = known_names.len(), "name pool built");
        }

        // Pass 2: redact each page against the pooled names.
        let mut manifest = Manifest::new(document.id);
        let mut images = Vec::with_capacity(scans.len());
        let mut texts = Vec::with_capacity(scans.len());
        for (index, scan) in scans.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let outcome = self.redact_scanned_page(index, scan, &known_names);
            manifest.push(ManifestEntry {
                page_index: index,
                status: outcome.status,
                categories: outcome.categories.clone(),
                redaction_count: outcome.redaction_count,
            });
            texts.push(format!("--- Page {} ---\n{}", index + 1, outcome.text));
            images.push(outcome.image);
        }

        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let bytes = assembler.assemble(&images, self.config.dpi).await?;
        info!(
            pages = images.len(),
            redactions = manifest.total_redactions(),
            failed = manifest.failed_pages().len(),
            "pdf redacted"
        );

        Ok(RedactionOutcome {
            artifact: RedactedArtifact::Pdf(bytes),
            manifest,
            redacted_text: texts.join("\n\n"),
        })
    }

    /// Rasterize and recognize one page. Recognition trouble of any
    /// kind degrades this page to an unlocated scan; only
    /// cancellation aborts the document.
    async fn scan_pdf_page(
        &self,
        pdf: &[u8],
        index: usize,
        rasterizer: &Arc<dyn PdfRasterizer>,
    ) -> Result<PageScan> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let image = match self
            .with_page_timeout(index, rasterizer.rasterize(pdf, index, self.config.dpi))
            .await
        {
            Ok(image) => image,
            Err(err) => {
                warn!(page = index, error = %err, "rasterization failed; emitting blank page");
                self.metrics.increment_counter("pages_failed");
                return Ok(PageScan {
                    image: blank_page(self.config.dpi),
                    located: None,
                });
            }
        };

        let located = self.recognize_page(index, &image).await;
        Ok(PageScan { image, located })
    }

    /// Run the OCR collaborator with the page budget applied. `None`
    /// marks the recognition-failure path; the page will be passed
    /// through unredacted and flagged.
    async fn recognize_page(&self, index: usize, image: &RgbImage) -> Option<LocatedPage> {
        let engine = self.ocr.as_ref()?;
        match self
            .with_page_timeout(index, engine.recognize(image))
            .await
        {
            Ok(words) => {
                let located = self.locator.locate(&words);
                if located.is_empty() {
                    self.metrics.increment_counter("pages_failed");
                    None
                } else {
                    Some(located)
                }
            }
            Err(err) => {
                warn!(page = index, error = %err, "recognition failed");
                self.metrics.increment_counter("pages_failed");
                None
            }
        }
    }

    /// Detect and paint over one scanned page.
    fn redact_scanned_page(
        &self,
        index: usize,
        scan: PageScan,
        known_names: &HashSet<String>,
    ) -> PageOutcome {
        self.metrics.increment_counter("pages_processed");

        let Some(located) = scan.located else {
            return PageOutcome {
                image: scan.image,
                status: PageStatus::RecognitionFailed,
                categories: Vec::new(),
                redaction_count: 0,
                text: String::new(),
            };
        };

        let matches = self
            .detector
            .detect_with_known_names(&located.text, known_names);
        if matches.is_empty() {
            return PageOutcome {
                text: located.text,
                image: scan.image,
                status: PageStatus::NoPhiFound,
                categories: Vec::new(),
                redaction_count: 0,
            };
        }

        let regions = self.locator.resolve(
            &matches,
            &located.words,
            scan.image.width(),
            scan.image.height(),
            self.config.box_padding,
        );
        let image = self.renderer.redact(&scan.image, &regions);
        self.metrics.add_to_counter("matches_found", matches.len() as u64);
        debug!(page = index, matches = matches.len(), regions = regions.len(), "page redacted");

        PageOutcome {
            image,
            status: PageStatus::Redacted,
            categories: categories_of(&matches),
            redaction_count: matches.len(),
            text: render::text::redact(&located.text, &matches),
        }
    }

    /// Single-page flow shared by image documents.
    async fn process_page(
        &self,
        index: usize,
        page: RgbImage,
        known_names: &HashSet<String>,
    ) -> Result<PageOutcome> {
        if self.ocr.is_none() {
            return Err(ConfigurationError::MissingOcrEngine.into());
        }
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let located = self.recognize_page(index, &page).await;
        Ok(self.redact_scanned_page(index, PageScan { image: page, located }, known_names))
    }

    /// Bound a per-page step by the caller's budget; an overrun reads
    /// as a recognition failure rather than a hang.
    async fn with_page_timeout<T>(
        &self,
        page: usize,
        work: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match self.config.page_timeout {
            Some(limit) => match tokio::time::timeout(limit, work).await {
                Ok(result) => result,
                Err(_) => Err(RecognitionError::Timeout {
                    page,
                    timeout_ms: limit.as_millis() as u64,
                }
                .into()),
            },
            None => work.await,
        }
    }
}

/// Letter-sized stand-in for a page that could not be rasterized.
fn blank_page(dpi: u32) -> RgbImage {
    let width = (8.5 * dpi as f32) as u32;
    let height = 11 * dpi;
    RgbImage::from_pixel(width.max(1), height.max(1), image::Rgb([255, 255, 255]))
}

/// Unique categories in priority order for the manifest.
fn categories_of(matches: &[Match]) -> Vec<PhiCategory> {
    let mut categories: Vec<PhiCategory> = matches.iter().map(|m| m.category).collect();
    categories.sort_by_key(|c| (c.priority(), c.label()));
    categories.dedup();
    categories
}
