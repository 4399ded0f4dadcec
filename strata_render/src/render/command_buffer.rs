/// Command buffers and the commit-once command stream encoder.
///
/// A [`CommandBuffer`] is an inert backend object. Work is recorded into it
/// through a [`CommandBufferRecorder`] session: each call appends one
/// [`CommandRecord`] to a pooled arena, and `commit()` hands the whole
/// contiguous stream, with the framebuffer format it targets, to the backend
/// in one call. A buffer has at most one open session; a session commits at
/// most once.
///
/// # Example
///
/// ```ignore
/// let mut recorder = command_buffer.begin_recording(&format, &pool)?;
/// recorder.set_viewport_and_scissor(Extents2D::new(0, 0, 800, 600))?;
/// recorder.bind_uniform(&pipeline, &camera, 0)?;
/// recorder.draw(&pipeline, &vertices)?;
/// recorder.commit(&context)?;
/// context.enqueue(&framebuffer, &command_buffer)?;
/// ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use crate::error::{Error, Result};
use crate::render::backend::with_backend;
use crate::render::context::RenderContext;
use crate::render::framebuffer::RenderTarget;
use crate::render::framebuffer_format::FramebufferFormat;
use crate::render::handle::{NativeHandle, OwnedHandle};
use crate::render::pipeline::{NoInstance, RenderPipeline};
use crate::render::render_state::Extents2D;
use crate::render::texture::TextureBinding;
use crate::render::uniform::UniformBinding;
use crate::render::vertex_buffer::VertexBuffer;
use crate::util::{BufferPool, FormatLayout, PooledBuffer};

// ============================================================================
// Records
// ============================================================================

/// One unit of recorded work
///
/// Holds handles and ids only. Stored packed in the recorder's arena and
/// handed to the backend as one `&[CommandRecord]`.
#[repr(C, u64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandRecord {
    /// Viewport and scissor both cover the whole render target
    SetViewportAndScissorFromTarget { target: NativeHandle },
    SetViewport(Extents2D),
    SetScissor(Extents2D),
    /// Bind element `index` of a uniform binding's buffer
    BindUniform { pipeline: NativeHandle, binding: NativeHandle, index: u32 },
    BindTexture { pipeline: NativeHandle, binding: NativeHandle },
    /// `instance_buffer` is `NULL` for non-instanced draws
    Draw { pipeline: NativeHandle, vertex_buffer: NativeHandle, instance_buffer: NativeHandle },
}

impl Default for CommandRecord {
    fn default() -> Self {
        CommandRecord::SetViewport(Extents2D::default())
    }
}

// ============================================================================
// Command buffer
// ============================================================================

/// Backend command buffer
pub struct CommandBuffer {
    handle: OwnedHandle,
    recording: AtomicBool,
}

impl CommandBuffer {
    pub(crate) fn new(handle: OwnedHandle) -> Self {
        Self { handle, recording: AtomicBool::new(false) }
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle.raw()
    }

    /// Whether a recording session is open
    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Acquire)
    }

    /// Open a recording session targeting `format`
    ///
    /// The record stream lives in an arena checked out from `pool`.
    ///
    /// # Errors
    ///
    /// `AlreadyRecording` if a session is already open on this buffer.
    pub fn begin_recording(&self, format: &Arc<FramebufferFormat>, pool: &BufferPool) -> Result<CommandBufferRecorder<'_>> {
        if self
            .recording
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(crate::strata_fail!("strata::CommandBuffer", Error::AlreadyRecording));
        }

        let records = match pool.request::<CommandRecord>() {
            Ok(records) => records,
            Err(error) => {
                self.recording.store(false, Ordering::Release);
                return Err(error);
            }
        };

        Ok(CommandBufferRecorder {
            command_buffer: self,
            format: format.clone(),
            records: Some(records),
        })
    }
}

impl fmt::Debug for CommandBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuffer")
            .field("handle", &self.handle())
            .field("recording", &self.is_recording())
            .finish()
    }
}

// ============================================================================
// Recorder
// ============================================================================

/// Single-use recording session on a [`CommandBuffer`]
///
/// Recording calls and `commit()` fail with `RecordingAlreadyCommitted`
/// once the session has been committed. Dropping an uncommitted recorder
/// abandons the recording.
pub struct CommandBufferRecorder<'a> {
    command_buffer: &'a CommandBuffer,
    format: Arc<FramebufferFormat>,
    /// `None` once committed
    records: Option<PooledBuffer<CommandRecord>>,
}

impl<'a> CommandBufferRecorder<'a> {
    pub fn command_buffer(&self) -> &'a CommandBuffer {
        self.command_buffer
    }

    pub fn format(&self) -> &Arc<FramebufferFormat> {
        &self.format
    }

    pub fn is_committed(&self) -> bool {
        self.records.is_none()
    }

    /// Records appended so far, in order
    pub fn records(&self) -> Result<&[CommandRecord]> {
        match &self.records {
            Some(records) => records.as_slice(),
            None => Err(Error::RecordingAlreadyCommitted),
        }
    }

    /// Viewport and scissor covering the whole of `target` (one record)
    pub fn set_viewport_and_scissor_to(&mut self, target: &dyn RenderTarget) -> Result<()> {
        self.push(CommandRecord::SetViewportAndScissorFromTarget { target: target.target_handle() })
    }

    /// Viewport and scissor set to `extents` (two records)
    pub fn set_viewport_and_scissor(&mut self, extents: Extents2D) -> Result<()> {
        self.push(CommandRecord::SetViewport(extents))?;
        self.push(CommandRecord::SetScissor(extents))
    }

    pub fn set_viewport(&mut self, extents: Extents2D) -> Result<()> {
        self.push(CommandRecord::SetViewport(extents))
    }

    pub fn set_scissor(&mut self, extents: Extents2D) -> Result<()> {
        self.push(CommandRecord::SetScissor(extents))
    }

    /// Bind element `index` of `binding`'s uniform buffer for `pipeline`
    pub fn bind_uniform<V, I>(&mut self, pipeline: &RenderPipeline<V, I>, binding: &UniformBinding, index: u32) -> Result<()> {
        self.ensure_open()?;
        self.check_pipeline(pipeline)?;
        self.push(CommandRecord::BindUniform {
            pipeline: pipeline.handle(),
            binding: binding.handle(),
            index,
        })
    }

    pub fn bind_texture<V, I>(&mut self, pipeline: &RenderPipeline<V, I>, binding: &TextureBinding) -> Result<()> {
        self.ensure_open()?;
        self.check_pipeline(pipeline)?;
        self.push(CommandRecord::BindTexture {
            pipeline: pipeline.handle(),
            binding: binding.handle(),
        })
    }

    pub fn draw<V: FormatLayout>(&mut self, pipeline: &RenderPipeline<V, NoInstance>, vertex_buffer: &VertexBuffer<V>) -> Result<()> {
        self.ensure_open()?;
        self.check_pipeline(pipeline)?;
        self.push(CommandRecord::Draw {
            pipeline: pipeline.handle(),
            vertex_buffer: vertex_buffer.handle(),
            instance_buffer: NativeHandle::NULL,
        })
    }

    pub fn draw_instanced<V: FormatLayout, I: FormatLayout>(
        &mut self,
        pipeline: &RenderPipeline<V, I>,
        vertex_buffer: &VertexBuffer<V>,
        instance_buffer: &VertexBuffer<I>,
    ) -> Result<()> {
        self.ensure_open()?;
        self.check_pipeline(pipeline)?;
        self.push(CommandRecord::Draw {
            pipeline: pipeline.handle(),
            vertex_buffer: vertex_buffer.handle(),
            instance_buffer: instance_buffer.handle(),
        })
    }

    /// Submit the stream and close the session
    ///
    /// The buffer leaves the recording state and the arena returns to its
    /// pool whether or not the backend accepts the stream.
    pub fn commit(&mut self, context: &RenderContext) -> Result<()> {
        let Some(mut records) = self.records.take() else {
            return Err(crate::strata_fail!("strata::CommandBufferRecorder", Error::RecordingAlreadyCommitted));
        };
        self.command_buffer.recording.store(false, Ordering::Release);

        let command_buffer = self.command_buffer.handle();
        let format = self.format.handle();
        let submitted = records.as_slice().and_then(|stream| {
            crate::strata_trace!(
                "strata::CommandBufferRecorder",
                "Committing {} records to command buffer {} (format {})",
                stream.len(), command_buffer, format
            );
            with_backend(context.backend(), "strata::CommandBufferRecorder", |backend| {
                backend.commit_command_buffer(command_buffer, format, stream)
            })
        });

        let released = records.release();
        submitted.and(released)
    }

    fn push(&mut self, record: CommandRecord) -> Result<()> {
        match &mut self.records {
            Some(records) => records.add(record),
            None => Err(crate::strata_fail!("strata::CommandBufferRecorder", Error::RecordingAlreadyCommitted)),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.records.is_none() {
            return Err(crate::strata_fail!("strata::CommandBufferRecorder", Error::RecordingAlreadyCommitted));
        }
        Ok(())
    }

    fn check_pipeline<V, I>(&self, pipeline: &RenderPipeline<V, I>) -> Result<()> {
        if !Arc::ptr_eq(pipeline.format(), &self.format) {
            let theirs = pipeline.format();
            return Err(crate::strata_fail!(
                "strata::CommandBufferRecorder",
                Error::InvalidArgument(format!(
                    "Pipeline {} was built for a different framebuffer format \
                     ({} attachments, {} stages) than the recording ({} attachments, {} stages)",
                    pipeline.handle(),
                    theirs.attachment_count(), theirs.stages().len(),
                    self.format.attachment_count(), self.format.stages().len()
                ))
            ));
        }
        Ok(())
    }
}

impl Drop for CommandBufferRecorder<'_> {
    fn drop(&mut self) {
        if self.records.is_some() {
            crate::strata_warn!(
                "strata::CommandBufferRecorder",
                "Recording on command buffer {} dropped without commit, discarded",
                self.command_buffer.handle()
            );
            self.command_buffer.recording.store(false, Ordering::Release);
        }
    }
}

impl fmt::Debug for CommandBufferRecorder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBufferRecorder")
            .field("command_buffer", &self.command_buffer.handle())
            .field("format", &self.format.handle())
            .field("committed", &self.is_committed())
            .finish()
    }
}

#[cfg(test)]
#[path = "command_buffer_tests.rs"]
mod tests;
