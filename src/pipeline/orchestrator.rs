use std::sync::Arc;

use image::RgbaImage;
use rayon::prelude::*;

use crate::assets::store::{SourceStore, validate_source_name};
use crate::codec::{CodecBackend, EncodeJob, SourceFrame, SourceGif};
use crate::foundation::core::{Canvas, LoopCount};
use crate::foundation::error::{AvatarGifError, AvatarGifResult};
use crate::foundation::scratch::Scratch;
use crate::mask::circle::MaskCache;
use crate::pipeline::opts::PipelineOpts;
use crate::pipeline::request::AvatarRequest;
use crate::positions::table::{PositionEntry, PositionTable, PositionTables};
use crate::render::composite::{Placement, composite};
use crate::render::rotate::Rotation;

/// Stage reached by one pipeline invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    /// Nothing checked yet.
    Init,
    /// Request fields accepted.
    Validated,
    /// Source GIF decoded into frames.
    Decoded,
    /// One masked avatar per distinct size.
    Masked,
    /// Every frame blended (and rotated).
    Composited,
    /// Output GIF assembled.
    Encoded,
    /// Bytes returned.
    Done,
    /// Terminal error state.
    Failed,
}

impl PipelineStage {
    /// Stable lowercase name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Validated => "validated",
            Self::Decoded => "decoded",
            Self::Masked => "masked",
            Self::Composited => "composited",
            Self::Encoded => "encoded",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

/// Metadata about one known source, as printed by `avatar-gif inspect`.
#[derive(Clone, Debug, serde::Serialize)]
pub struct SourceSummary {
    /// Source name.
    pub name: String,
    /// Logical screen size.
    pub canvas: Canvas,
    /// Number of decoded frames.
    pub frame_count: usize,
    /// Loop behavior declared by the source.
    pub loop_count: LoopCount,
    /// Per-frame delay hints in centiseconds.
    pub frame_delays_cs: Vec<Option<u16>>,
    /// Avatar sizes the pipeline would mask for this source.
    pub distinct_sizes: Vec<u32>,
    /// The source's position table.
    pub positions: Vec<PositionEntry>,
}

/// End-to-end avatar GIF generation.
///
/// Holds only read-only shared state; every call to [`AvatarGifPipeline::run`] is an independent
/// invocation with its own scratch directory, mask cache and thread pool.
#[derive(Clone)]
pub struct AvatarGifPipeline {
    tables: Arc<PositionTables>,
    store: Arc<dyn SourceStore>,
    codec: Arc<dyn CodecBackend>,
    opts: PipelineOpts,
}

impl std::fmt::Debug for AvatarGifPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarGifPipeline")
            .field("sources", &self.tables.len())
            .field("codec", &self.codec.name())
            .field("opts", &self.opts)
            .finish()
    }
}

impl AvatarGifPipeline {
    /// Assemble a pipeline. Fails if `opts` is out of range.
    pub fn new(
        tables: Arc<PositionTables>,
        store: Arc<dyn SourceStore>,
        codec: Arc<dyn CodecBackend>,
        opts: PipelineOpts,
    ) -> AvatarGifResult<Self> {
        opts.validate()?;
        Ok(Self {
            tables,
            store,
            codec,
            opts,
        })
    }

    /// Position tables this pipeline validates sources against.
    pub fn tables(&self) -> &PositionTables {
        &self.tables
    }

    /// Options in effect.
    pub fn opts(&self) -> &PipelineOpts {
        &self.opts
    }

    /// Name of the injected codec backend.
    pub fn codec_name(&self) -> &'static str {
        self.codec.name()
    }

    /// Produce the output GIF for one request.
    #[tracing::instrument(level = "info", skip_all, fields(codec = self.codec.name()))]
    pub fn run(&self, request: &AvatarRequest) -> AvatarGifResult<Vec<u8>> {
        let mut stage = PipelineStage::Init;
        let result = self.run_stages(request, &mut stage);
        match &result {
            Ok(bytes) => tracing::info!(bytes = bytes.len(), "avatar gif produced"),
            Err(e) => {
                tracing::warn!(
                    failed_after = stage.as_str(),
                    kind = e.kind(),
                    error = %e,
                    "pipeline failed"
                );
                advance(&mut stage, PipelineStage::Failed);
            }
        }
        result
    }

    fn run_stages(
        &self,
        request: &AvatarRequest,
        stage: &mut PipelineStage,
    ) -> AvatarGifResult<Vec<u8>> {
        let req = request.validate(&self.tables)?;
        advance(stage, PipelineStage::Validated);

        let scratch = Scratch::acquire(self.opts.scratch_root.as_deref())?;

        let table = self.tables.lookup(&req.source_name)?;
        let source = self.decode_source(&req.source_name)?;
        advance(stage, PipelineStage::Decoded);

        let masks = build_masks(&req.avatar, table, source.frame_count())?;
        advance(stage, PipelineStage::Masked);

        let frames = self.composite_frames(&source, table, &masks, req.rotation)?;
        advance(stage, PipelineStage::Composited);

        let canvas = output_canvas(&frames)?;
        let job = EncodeJob {
            canvas,
            frames: &frames,
            delay: req.delay,
            loop_count: source.loop_count,
            alpha_threshold: self.opts.alpha_threshold,
            quantizer_speed: self.opts.quantizer_speed,
        };
        let bytes = self.codec.encode(&job, &scratch)?;
        advance(stage, PipelineStage::Encoded);

        drop(scratch);
        advance(stage, PipelineStage::Done);
        Ok(bytes)
    }

    /// Composite every frame of `source_name` without encoding.
    ///
    /// Frames come back in source order, each canvas-sized (or rotation-expanded).
    #[tracing::instrument(level = "info", skip(self, avatar), fields(avatar_bytes = avatar.len()))]
    pub fn preview(
        &self,
        source_name: &str,
        avatar: &[u8],
        rotation: Rotation,
    ) -> AvatarGifResult<Vec<RgbaImage>> {
        let name = validate_source_name(source_name)?;
        let table = self.tables.lookup(name)?;
        let source = self.decode_source(name)?;
        let masks = build_masks(avatar, table, source.frame_count())?;
        let frames = self.composite_frames(&source, table, &masks, rotation)?;
        output_canvas(&frames)?;
        Ok(frames)
    }

    /// Decode a known source and summarize it alongside its position table.
    pub fn inspect_source(&self, source_name: &str) -> AvatarGifResult<SourceSummary> {
        let name = validate_source_name(source_name)?;
        let table = self.tables.lookup(name)?;
        let source = self.decode_source(name)?;
        Ok(SourceSummary {
            name: name.to_string(),
            canvas: source.canvas,
            frame_count: source.frame_count(),
            loop_count: source.loop_count,
            frame_delays_cs: source.frames.iter().map(|f| f.delay_cs).collect(),
            distinct_sizes: table
                .distinct_sizes(source.frame_count())
                .into_iter()
                .collect(),
            positions: table.entries().to_vec(),
        })
    }

    fn decode_source(&self, name: &str) -> AvatarGifResult<SourceGif> {
        let bytes = self.store.load(name)?;
        let source = self.codec.decode(&bytes)?;
        tracing::debug!(
            source = name,
            frames = source.frame_count(),
            width = source.canvas.width,
            height = source.canvas.height,
            "source decoded"
        );
        Ok(source)
    }

    fn composite_frames(
        &self,
        source: &SourceGif,
        table: &PositionTable,
        masks: &MaskCache,
        rotation: Rotation,
    ) -> AvatarGifResult<Vec<RgbaImage>> {
        let inset = self.opts.paste_inset;
        let compose_one = |frame: &SourceFrame| -> AvatarGifResult<RgbaImage> {
            let entry = table.entry_for_frame(frame.index);
            let avatar = masks.get(entry.avatar_size).ok_or_else(|| {
                AvatarGifError::internal(format!(
                    "no masked avatar for size {} (frame {})",
                    entry.avatar_size, frame.index
                ))
            })?;
            Ok(composite(
                &frame.image,
                avatar,
                Placement::from_entry(entry, inset),
                rotation,
            ))
        };

        let workers = fan_out_workers(self.opts.workers, source.frame_count());
        if workers <= 1 {
            return source.frames.iter().map(&compose_one).collect();
        }

        let pool = build_thread_pool(workers)?;
        pool.install(|| {
            source
                .frames
                .par_iter()
                .map(&compose_one)
                .collect::<AvatarGifResult<Vec<_>>>()
        })
    }
}

fn advance(stage: &mut PipelineStage, next: PipelineStage) {
    tracing::debug!(from = stage.as_str(), to = next.as_str(), "pipeline stage");
    *stage = next;
}

fn build_masks(
    avatar: &[u8],
    table: &PositionTable,
    frame_count: usize,
) -> AvatarGifResult<MaskCache> {
    let mut masks = MaskCache::new(avatar)?;
    for size in table.distinct_sizes(frame_count) {
        masks.get_or_insert(size)?;
    }
    tracing::debug!(sizes = masks.len(), "avatar masks prepared");
    Ok(masks)
}

/// Size shared by every composited frame.
fn output_canvas(frames: &[RgbaImage]) -> AvatarGifResult<Canvas> {
    let first = frames
        .first()
        .ok_or_else(|| AvatarGifError::internal("compositing produced no frames"))?;
    let canvas = Canvas::of(first);
    if let Some((idx, f)) = frames
        .iter()
        .enumerate()
        .find(|(_, f)| Canvas::of(f) != canvas)
    {
        return Err(AvatarGifError::internal(format!(
            "composited frame {idx} is {}x{}, expected {}x{}",
            f.width(),
            f.height(),
            canvas.width,
            canvas.height
        )));
    }
    Ok(canvas)
}

/// Threads worth spawning: never more than there are frames to composite.
fn fan_out_workers(workers: usize, frame_count: usize) -> usize {
    workers.min(frame_count)
}

fn build_thread_pool(workers: usize) -> AvatarGifResult<rayon::ThreadPool> {
    if workers == 0 {
        return Err(AvatarGifError::validation("pipeline 'workers' must be >= 1"));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("avatar-gif-composite-{i}"))
        .build()
        .map_err(|e| AvatarGifError::internal(format!("failed to build rayon thread pool: {e}")))
}
