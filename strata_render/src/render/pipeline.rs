/// Pipeline builder and compiled render pipelines.
///
/// A pipeline is bound to one stage of a [`FramebufferFormat`]. The builder
/// keeps one [`BlendOptions`] per attachment of that format, indexed by
/// attachment id, plus the fixed-function state. Every optional field is
/// either baked (`MaybeDynamic::Static`) or left dynamic.
///
/// # Example
///
/// ```ignore
/// let pipeline = context
///     .create_pipeline::<Vertex>(&vs, &fs, stage, Topology::Triangles, RasterMode::Fill, false)?
///     .with_depth_test(DepthTest::new(CompareOp::Less, true))
///     .with_standard_blending(color)?
///     .build()?;
/// ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use crate::error::{Error, Result};
use crate::render::backend::{with_backend, SharedBackend};
use crate::render::framebuffer_format::{Attachment, AttachmentType, FramebufferFormat, RenderStage};
use crate::render::handle::{NativeHandle, OwnedHandle};
use crate::render::render_state::{
    BlendEquation, BlendFactor, BlendOp, BlendOptions, ColorComponents, CullMode, DepthBias,
    DepthTest, FrontFace, MaybeDynamic, RasterMode, StencilFaceOp, StencilTest, Topology,
};
use crate::render::shader::{FragmentShader, VertexShader};
use crate::util::{FormatDescriptor, FormatElement, FormatLayout};

/// Instance shape of a non-instanced pipeline
#[derive(Debug, Clone, Copy)]
pub enum NoInstance {}

/// Everything the backend needs to compile a pipeline
#[derive(Debug, Clone, Copy)]
pub struct PipelineDescriptor<'a> {
    pub format: NativeHandle,
    pub stage: u32,
    pub vertex_shader: NativeHandle,
    pub fragment_shader: NativeHandle,
    pub vertex_format: &'a [FormatElement],
    pub vertex_stride: u32,
    /// Empty for non-instanced pipelines
    pub instance_format: &'a [FormatElement],
    pub instance_stride: u32,
    /// One entry per attachment of the format
    pub blend: &'a [BlendOptions],
    pub topology: Topology,
    pub raster_mode: RasterMode,
    pub discard_raster: bool,
    pub line_width: MaybeDynamic<f32>,
    pub depth_bias: MaybeDynamic<DepthBias>,
    pub depth_test: MaybeDynamic<DepthTest>,
    pub stencil_test: MaybeDynamic<StencilTest>,
    pub cull_mode: MaybeDynamic<CullMode>,
    pub front_face: MaybeDynamic<FrontFace>,
}

// ============================================================================
// Builder
// ============================================================================

/// Accumulates pipeline state for vertex shape `V` and instance shape `I`
pub struct RenderPipelineBuilder<V, I = NoInstance> {
    backend: SharedBackend,
    format: Arc<FramebufferFormat>,
    stage: u32,
    vertex_shader: NativeHandle,
    fragment_shader: NativeHandle,
    vertex_format: Arc<FormatDescriptor>,
    instance_format: Arc<FormatDescriptor>,
    blend: Vec<BlendOptions>,
    topology: Topology,
    raster_mode: RasterMode,
    discard_raster: bool,
    line_width: MaybeDynamic<f32>,
    depth_bias: MaybeDynamic<DepthBias>,
    depth_test: MaybeDynamic<DepthTest>,
    stencil_test: MaybeDynamic<StencilTest>,
    cull_mode: MaybeDynamic<CullMode>,
    front_face: MaybeDynamic<FrontFace>,
    _shapes: PhantomData<fn() -> (V, I)>,
}

impl<V: FormatLayout> RenderPipelineBuilder<V, NoInstance> {
    pub(crate) fn new(
        backend: SharedBackend,
        vertex_shader: &VertexShader,
        fragment_shader: &FragmentShader,
        stage: &RenderStage,
        topology: Topology,
        raster_mode: RasterMode,
        discard_raster: bool,
    ) -> Result<Self> {
        let format = stage.framebuffer_format()?;
        Ok(Self {
            backend,
            blend: vec![BlendOptions::default(); format.attachment_count()],
            format,
            stage: stage.id(),
            vertex_shader: vertex_shader.handle(),
            fragment_shader: fragment_shader.handle(),
            vertex_format: FormatDescriptor::of::<V>()?,
            instance_format: Arc::new(FormatDescriptor::empty()),
            topology,
            raster_mode,
            discard_raster,
            line_width: MaybeDynamic::Static(1.0),
            depth_bias: MaybeDynamic::Static(DepthBias::default()),
            depth_test: MaybeDynamic::Static(DepthTest::default()),
            stencil_test: MaybeDynamic::Static(StencilTest::default()),
            cull_mode: MaybeDynamic::Static(CullMode::default()),
            front_face: MaybeDynamic::Static(FrontFace::default()),
            _shapes: PhantomData,
        })
    }

    /// Same state, with instance shape `I` read from a second vertex stream
    pub(crate) fn instanced<I: FormatLayout>(self) -> Result<RenderPipelineBuilder<V, I>> {
        let instance_format = FormatDescriptor::of::<I>()?;
        Ok(RenderPipelineBuilder {
            backend: self.backend,
            format: self.format,
            stage: self.stage,
            vertex_shader: self.vertex_shader,
            fragment_shader: self.fragment_shader,
            vertex_format: self.vertex_format,
            instance_format,
            blend: self.blend,
            topology: self.topology,
            raster_mode: self.raster_mode,
            discard_raster: self.discard_raster,
            line_width: self.line_width,
            depth_bias: self.depth_bias,
            depth_test: self.depth_test,
            stencil_test: self.stencil_test,
            cull_mode: self.cull_mode,
            front_face: self.front_face,
            _shapes: PhantomData,
        })
    }
}

impl<V, I> RenderPipelineBuilder<V, I> {
    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = MaybeDynamic::Static(width);
        self
    }

    pub fn with_dynamic_line_width(mut self) -> Self {
        self.line_width = MaybeDynamic::Dynamic;
        self
    }

    pub fn with_depth_bias(mut self, bias: DepthBias) -> Self {
        self.depth_bias = MaybeDynamic::Static(bias);
        self
    }

    pub fn with_dynamic_depth_bias(mut self) -> Self {
        self.depth_bias = MaybeDynamic::Dynamic;
        self
    }

    pub fn with_depth_test(mut self, test: DepthTest) -> Self {
        self.depth_test = MaybeDynamic::Static(test);
        self
    }

    pub fn with_dynamic_depth_test(mut self) -> Self {
        self.depth_test = MaybeDynamic::Dynamic;
        self
    }

    /// Stencil test with the same operations on both faces
    pub fn with_stencil_test(self, face: StencilFaceOp) -> Self {
        self.with_stencil_test_separate(face, face)
    }

    pub fn with_stencil_test_separate(mut self, front: StencilFaceOp, back: StencilFaceOp) -> Self {
        self.stencil_test = MaybeDynamic::Static(StencilTest::new(front, back));
        self
    }

    pub fn with_dynamic_stencil_test(mut self) -> Self {
        self.stencil_test = MaybeDynamic::Dynamic;
        self
    }

    pub fn with_cull_mode(mut self, mode: CullMode) -> Self {
        self.cull_mode = MaybeDynamic::Static(mode);
        self
    }

    pub fn with_dynamic_cull_mode(mut self) -> Self {
        self.cull_mode = MaybeDynamic::Dynamic;
        self
    }

    pub fn with_front_face(mut self, face: FrontFace) -> Self {
        self.front_face = MaybeDynamic::Static(face);
        self
    }

    pub fn with_dynamic_front_face(mut self) -> Self {
        self.front_face = MaybeDynamic::Dynamic;
        self
    }

    // ===== Blending =====

    /// Replace the blend state of one color attachment
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the attachment is not a color attachment of
    /// this pipeline's format.
    pub fn with_blend_options(mut self, attachment: &Attachment, options: BlendOptions) -> Result<Self> {
        if !attachment.belongs_to(&self.format) {
            return Err(crate::strata_fail!(
                "strata::RenderPipelineBuilder",
                Error::InvalidArgument(format!(
                    "Attachment {} does not belong to format {}",
                    attachment.id(), self.format.handle()
                ))
            ));
        }
        if attachment.attachment_type() != AttachmentType::Color {
            return Err(crate::strata_fail!(
                "strata::RenderPipelineBuilder",
                Error::InvalidArgument(format!("Attachment {} is not a color attachment", attachment.id()))
            ));
        }
        self.blend[attachment.id() as usize] = options;
        Ok(self)
    }

    /// Same factors and operation for color and alpha, all components written
    pub fn with_blending(self, attachment: &Attachment, src: BlendFactor, dst: BlendFactor, op: BlendOp) -> Result<Self> {
        self.with_blending_masked(attachment, src, dst, op, ColorComponents::all())
    }

    /// Same factors and operation for color and alpha, writing `components`
    pub fn with_blending_masked(
        self,
        attachment: &Attachment,
        src: BlendFactor,
        dst: BlendFactor,
        op: BlendOp,
        components: ColorComponents,
    ) -> Result<Self> {
        self.with_blend_options(attachment, BlendOptions::symmetric(src, dst, op, components))
    }

    /// Independent color and alpha equations
    pub fn with_blending_separate(
        self,
        attachment: &Attachment,
        color: BlendEquation,
        alpha: BlendEquation,
        components: ColorComponents,
    ) -> Result<Self> {
        self.with_blend_options(attachment, BlendOptions::separate(color, alpha, components))
    }

    /// `src.a * src + (1 - src.a) * dst`
    pub fn with_standard_blending(self, attachment: &Attachment) -> Result<Self> {
        self.with_blending(attachment, BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha, BlendOp::Add)
    }

    /// `src + (1 - src.a) * dst`
    pub fn with_premultiplied_blending(self, attachment: &Attachment) -> Result<Self> {
        self.with_blending(attachment, BlendFactor::One, BlendFactor::OneMinusSrcAlpha, BlendOp::Add)
    }

    /// `src + src.a * dst`
    pub fn with_premultiplied_inverse_blending(self, attachment: &Attachment) -> Result<Self> {
        self.with_blending(attachment, BlendFactor::One, BlendFactor::SrcAlpha, BlendOp::Add)
    }

    /// Compile the pipeline
    pub fn build(self) -> Result<RenderPipeline<V, I>> {
        let descriptor = PipelineDescriptor {
            format: self.format.handle(),
            stage: self.stage,
            vertex_shader: self.vertex_shader,
            fragment_shader: self.fragment_shader,
            vertex_format: self.vertex_format.elements(),
            vertex_stride: self.vertex_format.stride(),
            instance_format: self.instance_format.elements(),
            instance_stride: self.instance_format.stride(),
            blend: &self.blend,
            topology: self.topology,
            raster_mode: self.raster_mode,
            discard_raster: self.discard_raster,
            line_width: self.line_width,
            depth_bias: self.depth_bias,
            depth_test: self.depth_test,
            stencil_test: self.stencil_test,
            cull_mode: self.cull_mode,
            front_face: self.front_face,
        };

        let raw = with_backend(&self.backend, "strata::RenderPipelineBuilder", |backend| {
            backend.create_pipeline(&descriptor)
        })?;

        crate::strata_debug!(
            "strata::RenderPipelineBuilder",
            "Compiled pipeline {} for stage {} of format {} ({:?}, {} vertex elements{})",
            raw, self.stage, self.format.handle(), self.topology, self.vertex_format.elements().len(),
            if !self.instance_format.is_empty() { ", instanced" } else { "" }
        );

        Ok(RenderPipeline {
            handle: OwnedHandle::new(raw, self.backend),
            format: self.format,
            stage: self.stage,
            blend: self.blend,
            _shapes: PhantomData,
        })
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Compiled pipeline for vertex shape `V` and instance shape `I`
pub struct RenderPipeline<V, I = NoInstance> {
    handle: OwnedHandle,
    format: Arc<FramebufferFormat>,
    stage: u32,
    blend: Vec<BlendOptions>,
    _shapes: PhantomData<fn() -> (V, I)>,
}

impl<V, I> RenderPipeline<V, I> {
    pub fn handle(&self) -> NativeHandle {
        self.handle.raw()
    }

    pub fn format(&self) -> &Arc<FramebufferFormat> {
        &self.format
    }

    /// The stage this pipeline renders in
    pub fn stage(&self) -> &RenderStage {
        &self.format.stages()[self.stage as usize]
    }

    /// Blend state per attachment of the format
    pub fn blend_options(&self) -> &[BlendOptions] {
        &self.blend
    }
}

impl<V, I> fmt::Debug for RenderPipeline<V, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("handle", &self.handle())
            .field("format", &self.format.handle())
            .field("stage", &self.stage)
            .finish()
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
