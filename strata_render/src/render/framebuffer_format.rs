/// Render-pass graph: attachments, stages and stage dependencies.
///
/// A [`FramebufferFormatBuilder`] accumulates the graph and `build()` compiles
/// it into an immutable [`FramebufferFormat`] with a single backend call. The
/// graph crosses the boundary as four flat arrays: attachment descriptors,
/// stage descriptors, and the shared member-id and dependency-id lists the
/// stage descriptors index into.
///
/// # Example
///
/// ```ignore
/// let mut builder = context.create_framebuffer_format();
/// let color = builder.with_color_attachment(TextureFormat::R8G8B8A8Srgb, Vec4::new(0.0, 0.0, 0.0, 1.0));
/// let depth = builder.with_depth_stencil_attachment();
/// let main = builder.with_stage(&[color], Some(depth))?;
/// let post = builder.with_stage(&[color], None)?;
/// builder.with_dependency(post, &[main])?;
/// let format = builder.build()?;
/// let main_stage = format.stage(main)?;
/// ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use glam::Vec4;
use crate::error::{Error, Result};
use crate::render::backend::{with_backend, SharedBackend};
use crate::render::handle::{NativeHandle, OwnedHandle};

/// Source of builder identities, so refs can't cross builders
static NEXT_BUILDER_ID: AtomicU64 = AtomicU64::new(1);

/// Pixel format byte used for depth/stencil attachments
pub const DEPTH_STENCIL_FORMAT: u8 = 0xFF;

/// `depth_stencil_id` of a stage without depth/stencil
pub const NO_DEPTH_STENCIL: u32 = u32::MAX;

// ============================================================================
// Flat descriptors
// ============================================================================

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentType {
    Color,
    DepthStencil,
}

/// Color attachment pixel formats
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    R8G8B8A8Srgb = 0,
    B8G8R8A8Srgb = 1,
}

impl TextureFormat {
    /// Wire id of the format
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(TextureFormat::R8G8B8A8Srgb),
            1 => Some(TextureFormat::B8G8R8A8Srgb),
            _ => None,
        }
    }
}

/// One attachment, as handed to the backend
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentDescriptor {
    pub attachment_type: AttachmentType,
    /// [`TextureFormat::id`], or [`DEPTH_STENCIL_FORMAT`]
    pub format: u8,
}

/// One stage, as handed to the backend
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStageDescriptor {
    pub member_start: u32,
    pub member_count: u32,
    /// Attachment id, or [`NO_DEPTH_STENCIL`]
    pub depth_stencil_id: u32,
    pub dependency_start: u32,
    pub dependency_count: u32,
}

impl RenderStageDescriptor {
    pub fn depth_stencil(&self) -> Option<u32> {
        (self.depth_stencil_id != NO_DEPTH_STENCIL).then_some(self.depth_stencil_id)
    }

    /// This stage's slice of the shared member list
    pub fn members<'a>(&self, members: &'a [u32]) -> Option<&'a [u32]> {
        let start = self.member_start as usize;
        members.get(start..start + self.member_count as usize)
    }

    /// This stage's slice of the shared dependency list
    pub fn dependencies<'a>(&self, dependencies: &'a [u32]) -> Option<&'a [u32]> {
        let start = self.dependency_start as usize;
        dependencies.get(start..start + self.dependency_count as usize)
    }
}

// ============================================================================
// Builder references
// ============================================================================

/// A color attachment declared on a builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorAttachmentRef {
    builder: u64,
    id: u32,
}

/// A depth/stencil attachment declared on a builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilAttachmentRef {
    builder: u64,
    id: u32,
}

/// A stage declared on a builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageRef {
    builder: u64,
    id: u32,
}

impl ColorAttachmentRef {
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl DepthStencilAttachmentRef {
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl StageRef {
    pub fn id(&self) -> u32 {
        self.id
    }
}

// ============================================================================
// Compiled graph
// ============================================================================

/// What an attachment holds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttachmentKind {
    Color {
        format: TextureFormat,
        clear_color: Vec4,
    },
    DepthStencil,
}

/// One attachment of a compiled format
#[derive(Debug)]
pub struct Attachment {
    id: u32,
    kind: AttachmentKind,
    owner: Weak<FramebufferFormat>,
}

impl Attachment {
    /// Position in the format's attachment list
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn kind(&self) -> AttachmentKind {
        self.kind
    }

    pub fn attachment_type(&self) -> AttachmentType {
        match self.kind {
            AttachmentKind::Color { .. } => AttachmentType::Color,
            AttachmentKind::DepthStencil => AttachmentType::DepthStencil,
        }
    }

    /// Clear color (zero for depth/stencil)
    pub fn clear_color(&self) -> Vec4 {
        match self.kind {
            AttachmentKind::Color { clear_color, .. } => clear_color,
            AttachmentKind::DepthStencil => Vec4::ZERO,
        }
    }

    /// The format this attachment belongs to
    pub fn framebuffer_format(&self) -> Result<Arc<FramebufferFormat>> {
        upgrade(&self.owner)
    }

    pub fn belongs_to(&self, format: &FramebufferFormat) -> bool {
        std::ptr::eq(self.owner.as_ptr(), format)
    }
}

/// One stage (sub-pass) of a compiled format
#[derive(Debug)]
pub struct RenderStage {
    id: u32,
    color_attachments: Vec<u32>,
    depth_stencil: Option<u32>,
    dependencies: Vec<u32>,
    owner: Weak<FramebufferFormat>,
}

impl RenderStage {
    /// Position in the format's stage list
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Ids of the color attachments written by this stage
    pub fn color_attachments(&self) -> &[u32] {
        &self.color_attachments
    }

    pub fn depth_stencil(&self) -> Option<u32> {
        self.depth_stencil
    }

    /// Ids of the stages this stage depends on
    pub fn dependencies(&self) -> &[u32] {
        &self.dependencies
    }

    /// The format this stage belongs to
    pub fn framebuffer_format(&self) -> Result<Arc<FramebufferFormat>> {
        upgrade(&self.owner)
    }

    pub fn belongs_to(&self, format: &FramebufferFormat) -> bool {
        std::ptr::eq(self.owner.as_ptr(), format)
    }
}

fn upgrade(owner: &Weak<FramebufferFormat>) -> Result<Arc<FramebufferFormat>> {
    owner
        .upgrade()
        .ok_or_else(|| Error::InvalidResource("Framebuffer format has been dropped".to_string()))
}

/// Compiled, immutable render-pass graph
#[derive(Debug)]
pub struct FramebufferFormat {
    handle: OwnedHandle,
    builder: u64,
    attachments: Vec<Attachment>,
    stages: Vec<RenderStage>,
    attachment_descriptors: Vec<AttachmentDescriptor>,
    stage_descriptors: Vec<RenderStageDescriptor>,
    stage_members: Vec<u32>,
    stage_dependencies: Vec<u32>,
}

impl FramebufferFormat {
    pub fn handle(&self) -> NativeHandle {
        self.handle.raw()
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn stages(&self) -> &[RenderStage] {
        &self.stages
    }

    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }

    /// Compiled attachment for a color ref of the builder that produced this format
    pub fn color_attachment(&self, attachment: ColorAttachmentRef) -> Result<&Attachment> {
        self.check_builder(attachment.builder, "color attachment")?;
        Ok(&self.attachments[attachment.id as usize])
    }

    /// Compiled attachment for a depth/stencil ref of the builder that produced this format
    pub fn depth_stencil_attachment(&self, attachment: DepthStencilAttachmentRef) -> Result<&Attachment> {
        self.check_builder(attachment.builder, "depth/stencil attachment")?;
        Ok(&self.attachments[attachment.id as usize])
    }

    /// Compiled stage for a stage ref of the builder that produced this format
    pub fn stage(&self, stage: StageRef) -> Result<&RenderStage> {
        self.check_builder(stage.builder, "stage")?;
        Ok(&self.stages[stage.id as usize])
    }

    /// The flat arrays the graph was compiled from
    pub fn attachment_descriptors(&self) -> &[AttachmentDescriptor] {
        &self.attachment_descriptors
    }

    pub fn stage_descriptors(&self) -> &[RenderStageDescriptor] {
        &self.stage_descriptors
    }

    pub fn stage_members(&self) -> &[u32] {
        &self.stage_members
    }

    pub fn stage_dependencies(&self) -> &[u32] {
        &self.stage_dependencies
    }

    fn check_builder(&self, builder: u64, what: &str) -> Result<()> {
        if builder != self.builder {
            return Err(crate::strata_fail!(
                "strata::FramebufferFormat",
                Error::InvalidArgument(format!("The {} was declared on another format builder", what))
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Accumulates a render-pass graph; consumed by `build()`
pub struct FramebufferFormatBuilder {
    backend: SharedBackend,
    id: u64,
    kinds: Vec<AttachmentKind>,
    attachment_descriptors: Vec<AttachmentDescriptor>,
    stage_descriptors: Vec<RenderStageDescriptor>,
    stage_members: Vec<u32>,
    stage_dependencies: Vec<u32>,
}

impl FramebufferFormatBuilder {
    pub(crate) fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            id: NEXT_BUILDER_ID.fetch_add(1, Ordering::Relaxed),
            kinds: Vec::new(),
            attachment_descriptors: Vec::new(),
            stage_descriptors: Vec::new(),
            stage_members: Vec::new(),
            stage_dependencies: Vec::new(),
        }
    }

    /// Append a color attachment; ids are assigned sequentially across all attachments
    pub fn with_color_attachment(&mut self, format: TextureFormat, clear_color: Vec4) -> ColorAttachmentRef {
        let id = self.kinds.len() as u32;
        self.kinds.push(AttachmentKind::Color { format, clear_color });
        self.attachment_descriptors.push(AttachmentDescriptor {
            attachment_type: AttachmentType::Color,
            format: format.id(),
        });
        ColorAttachmentRef { builder: self.id, id }
    }

    /// Append a depth/stencil attachment
    pub fn with_depth_stencil_attachment(&mut self) -> DepthStencilAttachmentRef {
        let id = self.kinds.len() as u32;
        self.kinds.push(AttachmentKind::DepthStencil);
        self.attachment_descriptors.push(AttachmentDescriptor {
            attachment_type: AttachmentType::DepthStencil,
            format: DEPTH_STENCIL_FORMAT,
        });
        DepthStencilAttachmentRef { builder: self.id, id }
    }

    /// Append a stage writing `color_attachments` (at least one) and an optional depth/stencil
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `color_attachments` is empty or any ref comes
    /// from another builder.
    pub fn with_stage(
        &mut self,
        color_attachments: &[ColorAttachmentRef],
        depth_stencil: Option<DepthStencilAttachmentRef>,
    ) -> Result<StageRef> {
        if color_attachments.is_empty() {
            return Err(self.invalid("A stage must reference at least one color attachment"));
        }
        if color_attachments.iter().any(|attachment| attachment.builder != self.id) {
            return Err(self.invalid("Color attachment was declared on another format builder"));
        }
        if depth_stencil.is_some_and(|attachment| attachment.builder != self.id) {
            return Err(self.invalid("Depth/stencil attachment was declared on another format builder"));
        }

        let id = self.stage_descriptors.len() as u32;
        self.stage_descriptors.push(RenderStageDescriptor {
            member_start: self.stage_members.len() as u32,
            member_count: color_attachments.len() as u32,
            depth_stencil_id: depth_stencil.map_or(NO_DEPTH_STENCIL, |attachment| attachment.id),
            dependency_start: 0,
            dependency_count: 0,
        });
        self.stage_members.extend(color_attachments.iter().map(|attachment| attachment.id));

        Ok(StageRef { builder: self.id, id })
    }

    /// Declare that `stage` depends on `dependencies`
    ///
    /// The ids are appended to the shared dependency list and the stage's
    /// range points at them. Calling it again for the same stage replaces
    /// its range.
    pub fn with_dependency(&mut self, stage: StageRef, dependencies: &[StageRef]) -> Result<()> {
        if stage.builder != self.id || dependencies.iter().any(|dependency| dependency.builder != self.id) {
            return Err(self.invalid("Stage was declared on another format builder"));
        }

        let start = self.stage_dependencies.len() as u32;
        self.stage_dependencies.extend(dependencies.iter().map(|dependency| dependency.id));

        let descriptor = &mut self.stage_descriptors[stage.id as usize];
        descriptor.dependency_start = start;
        descriptor.dependency_count = dependencies.len() as u32;
        Ok(())
    }

    /// Compile the graph into an immutable format
    pub fn build(self) -> Result<Arc<FramebufferFormat>> {
        let raw = with_backend(&self.backend, "strata::FramebufferFormatBuilder", |backend| {
            backend.create_framebuffer_format(
                &self.attachment_descriptors,
                &self.stage_descriptors,
                &self.stage_members,
                &self.stage_dependencies,
            )
        })?;

        crate::strata_debug!(
            "strata::FramebufferFormatBuilder",
            "Compiled framebuffer format {}: {} attachments, {} stages, {} dependencies",
            raw, self.kinds.len(), self.stage_descriptors.len(), self.stage_dependencies.len()
        );

        let FramebufferFormatBuilder {
            backend,
            id: builder,
            kinds,
            attachment_descriptors,
            stage_descriptors,
            stage_members,
            stage_dependencies,
        } = self;

        Ok(Arc::new_cyclic(|owner| {
            let attachments = kinds
                .iter()
                .enumerate()
                .map(|(id, kind)| Attachment {
                    id: id as u32,
                    kind: *kind,
                    owner: owner.clone(),
                })
                .collect();

            let stages = stage_descriptors
                .iter()
                .enumerate()
                .map(|(id, descriptor)| RenderStage {
                    id: id as u32,
                    color_attachments: descriptor.members(&stage_members).unwrap_or_default().to_vec(),
                    depth_stencil: descriptor.depth_stencil(),
                    dependencies: descriptor.dependencies(&stage_dependencies).unwrap_or_default().to_vec(),
                    owner: owner.clone(),
                })
                .collect();

            FramebufferFormat {
                handle: OwnedHandle::new(raw, backend),
                builder,
                attachments,
                stages,
                attachment_descriptors,
                stage_descriptors,
                stage_members,
                stage_dependencies,
            }
        }))
    }

    fn invalid(&self, message: &str) -> Error {
        crate::strata_fail!(
            "strata::FramebufferFormatBuilder",
            Error::InvalidArgument(message.to_string())
        )
    }
}

#[cfg(test)]
#[path = "framebuffer_format_tests.rs"]
mod tests;
