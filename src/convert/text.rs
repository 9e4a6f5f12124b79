//! Text file to chunked PDF conversion.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::chunk::{ChunkOutput, ChunkPlanner, ChunkScheduler, ProgressSink};
use crate::error::{Error, Result};
use crate::model::{Chunk, ConversionReport};
use crate::pdf::DocumentBuilder;
use crate::text::{LineRenderer, RtlShaper};

use super::ConvertOptions;

/// Log suffix identifying the file and chunk a message belongs to.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub source: &'a str,
    pub chunk: Option<usize>,
}

impl<'a> RenderContext<'a> {
    /// Context for a whole file.
    pub fn file(source: &'a str) -> Self {
        Self {
            source,
            chunk: None,
        }
    }

    /// Context for one chunk of a file.
    pub fn chunk(source: &'a str, index: usize) -> Self {
        Self {
            source,
            chunk: Some(index),
        }
    }
}

impl fmt::Display for RenderContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " | file={}", self.source)?;
        if let Some(index) = self.chunk {
            write!(f, " chunk={}", index)?;
        }
        Ok(())
    }
}

/// Stem used for output names: the source file name without extension.
pub fn output_stem(source_name: &str) -> String {
    Path::new(source_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "output".to_string())
}

/// Converts text buffers and files into one PDF per chunk.
#[derive(Debug, Clone)]
pub struct TextConverter {
    options: ConvertOptions,
    planner: ChunkPlanner,
    scheduler: ChunkScheduler,
    /// Shared by every chunk task, so its shaping cache is too
    renderer: LineRenderer,
}

impl TextConverter {
    /// Create a converter, validating `options` up front.
    pub fn new(options: ConvertOptions) -> Result<Self> {
        options.validate()?;
        let planner = ChunkPlanner::new(options.max_chunk_bytes)?;
        let scheduler =
            ChunkScheduler::new(options.worker_pool_size)?.with_progress(options.progress_config());
        let renderer = LineRenderer::with_shaper(RtlShaper::new())
            .with_style(options.style)
            .with_spacer_height(options.spacer_height);
        Ok(Self {
            options,
            planner,
            scheduler,
            renderer,
        })
    }

    /// Get the options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert an in-memory buffer named `source_name`.
    ///
    /// Writes `<output_dir>/<stem>_<index>.pdf` for every chunk that
    /// renders. Chunk failures are reported in the returned report; only
    /// pool construction fails the call.
    pub fn convert_text(
        &self,
        text: &str,
        source_name: &str,
        output_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<ConversionReport> {
        let ctx = RenderContext::file(source_name);
        let chunks = self.planner.plan(text);
        log::info!(
            "Processing {:.2} MB in {} chunk(s){}",
            text.len() as f64 / (1024.0 * 1024.0),
            chunks.len(),
            ctx
        );

        let stem = output_stem(source_name);
        let results = self.scheduler.run(
            &chunks,
            |chunk| {
                self.render_chunk(text, chunk, source_name, &stem, output_dir)
                    .map_err(|e| {
                        log::warn!(
                            "Chunk render failed: {}{}",
                            e,
                            RenderContext::chunk(source_name, chunk.index)
                        );
                        e
                    })
            },
            sink,
        )?;

        let report = ConversionReport::new(source_name, results);
        let failed = report.failed().count();
        if failed == 0 {
            log::info!("Completed {} chunk(s){}", report.chunk_count, ctx);
        } else {
            log::warn!(
                "Completed with {} of {} chunk(s) failed{}",
                failed,
                report.chunk_count,
                ctx
            );
        }
        Ok(report)
    }

    /// Read `path` as UTF-8 and convert it.
    pub fn convert_file(
        &self,
        path: &Path,
        output_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<ConversionReport> {
        let bytes = fs::read(path)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| Error::Encoding(format!("{}: {}", path.display(), e)))?;
        let source_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.convert_text(&text, &source_name, output_dir, sink)
    }

    /// Run [`convert_file`](Self::convert_file) on tokio's blocking pool.
    #[cfg(feature = "async")]
    pub async fn convert_file_async(
        &self,
        path: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
        sink: std::sync::Arc<dyn ProgressSink>,
    ) -> Result<ConversionReport> {
        let converter = self.clone();
        let path = path.as_ref().to_path_buf();
        let output_dir = output_dir.as_ref().to_path_buf();
        tokio::task::spawn_blocking(move || {
            converter.convert_file(&path, &output_dir, sink.as_ref())
        })
        .await
        .map_err(|e| Error::TaskPanicked(e.to_string()))?
    }

    fn render_chunk(
        &self,
        text: &str,
        chunk: &Chunk,
        source_name: &str,
        stem: &str,
        output_dir: &Path,
    ) -> Result<ChunkOutput> {
        let ctx = RenderContext::chunk(source_name, chunk.index);
        log::info!("Building chunk ({} chars){}", chunk.char_len(), ctx);

        let elements = self
            .renderer
            .render(chunk.slice(text).lines(), &self.options.font)?;
        log::debug!("Rendered {} element(s){}", elements.len(), ctx);

        let font = self.options.font.load()?;
        let output_path = output_dir.join(chunk.file_name(stem));
        let summary = DocumentBuilder::new(font)
            .with_title(format!("{} ({})", source_name, chunk.index))
            .build(&elements, &output_path, &self.options.page)?;

        log::info!(
            "Saved {} ({} bytes){}",
            output_path.display(),
            summary.bytes_written,
            ctx
        );
        Ok(ChunkOutput {
            output_path,
            element_count: summary.element_count,
        })
    }
}
