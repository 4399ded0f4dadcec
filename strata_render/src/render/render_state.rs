/// Fixed-function render state shared by pipelines and command records.

use bitflags::bitflags;

/// A pipeline state field: a value baked at compile time, or left dynamic
#[repr(C, u8)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaybeDynamic<T> {
    Static(T),
    Dynamic,
}

impl<T: Copy> MaybeDynamic<T> {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, MaybeDynamic::Dynamic)
    }

    /// The baked value, if any
    pub fn value(&self) -> Option<T> {
        match self {
            MaybeDynamic::Static(value) => Some(*value),
            MaybeDynamic::Dynamic => None,
        }
    }
}

impl<T> From<T> for MaybeDynamic<T> {
    fn from(value: T) -> Self {
        MaybeDynamic::Static(value)
    }
}

// ============================================================================
// Rasterization
// ============================================================================

/// Primitive topology
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    Points,
    Lines,
    LineStrips,
    Triangles,
    TriangleStrips,
    TriangleFans,
}

/// Polygon rasterization mode
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RasterMode {
    #[default]
    Fill,
    Line,
    Point,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    Front,
    #[default]
    Back,
    FrontAndBack,
    None,
}

/// Vertex winding of front-facing primitives
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrontFace {
    #[default]
    Clockwise,
    CounterClockwise,
}

/// Integer rectangle (viewport / scissor)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extents2D {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Extents2D {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// Depth bias parameters
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DepthBias {
    pub enabled: bool,
    pub constant: f32,
    pub clamp: f32,
    pub slope: f32,
}

impl DepthBias {
    pub fn new(constant: f32, clamp: f32, slope: f32) -> Self {
        Self { enabled: true, constant, clamp, slope }
    }
}

// ============================================================================
// Depth / stencil
// ============================================================================

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Never,
    Less,
    LessOrEqual,
    Equal,
    NotEqual,
    GreaterOrEqual,
    Greater,
    Always,
}

/// Depth test parameters (disabled by default: Always, no write)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthTest {
    pub enabled: bool,
    pub compare: CompareOp,
    pub write: bool,
}

impl DepthTest {
    pub fn new(compare: CompareOp, write: bool) -> Self {
        Self { enabled: true, compare, write }
    }
}

impl Default for DepthTest {
    fn default() -> Self {
        Self { enabled: false, compare: CompareOp::Always, write: false }
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilOp {
    Zero,
    Keep,
    Replace,
    Invert,
    IncrementAndClamp,
    DecrementAndClamp,
    IncrementAndWrap,
    DecrementAndWrap,
}

/// Stencil operations for one face
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilFaceOp {
    pub fail: StencilOp,
    pub depth_fail: StencilOp,
    pub pass: StencilOp,
    pub compare: CompareOp,
    pub compare_mask: u32,
    pub write_mask: u32,
    pub reference: u32,
}

impl Default for StencilFaceOp {
    fn default() -> Self {
        Self {
            fail: StencilOp::Keep,
            depth_fail: StencilOp::Keep,
            pass: StencilOp::Keep,
            compare: CompareOp::Never,
            compare_mask: 0,
            write_mask: 0,
            reference: 0,
        }
    }
}

/// Stencil test parameters for both faces
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StencilTest {
    pub enabled: bool,
    pub front: StencilFaceOp,
    pub back: StencilFaceOp,
}

impl StencilTest {
    pub fn new(front: StencilFaceOp, back: StencilFaceOp) -> Self {
        Self { enabled: true, front, back }
    }
}

// ============================================================================
// Blending
// ============================================================================

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusDstColor,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendOp {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

bitflags! {
    /// Color channels written by an attachment
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorComponents: u8 {
        const R = 1 << 0;
        const G = 1 << 1;
        const B = 1 << 2;
        const A = 1 << 3;
    }
}

impl Default for ColorComponents {
    fn default() -> Self {
        ColorComponents::all()
    }
}

/// `src * factor (op) dst * factor` for one channel group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendEquation {
    pub src: BlendFactor,
    pub dst: BlendFactor,
    pub op: BlendOp,
}

impl BlendEquation {
    pub const fn new(src: BlendFactor, dst: BlendFactor, op: BlendOp) -> Self {
        Self { src, dst, op }
    }
}

/// Blend state of one attachment
///
/// Default: disabled, One/Zero/Add for color and alpha, all components.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendOptions {
    pub enabled: bool,
    pub src_color: BlendFactor,
    pub dst_color: BlendFactor,
    pub color_op: BlendOp,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
    pub alpha_op: BlendOp,
    pub components: ColorComponents,
}

impl BlendOptions {
    /// Enabled blending with independent color and alpha equations
    pub fn separate(color: BlendEquation, alpha: BlendEquation, components: ColorComponents) -> Self {
        Self {
            enabled: true,
            src_color: color.src,
            dst_color: color.dst,
            color_op: color.op,
            src_alpha: alpha.src,
            dst_alpha: alpha.dst,
            alpha_op: alpha.op,
            components,
        }
    }

    /// Enabled blending with the same equation for color and alpha
    pub fn symmetric(src: BlendFactor, dst: BlendFactor, op: BlendOp, components: ColorComponents) -> Self {
        let equation = BlendEquation::new(src, dst, op);
        Self::separate(equation, equation, components)
    }
}

impl Default for BlendOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            src_color: BlendFactor::One,
            dst_color: BlendFactor::Zero,
            color_op: BlendOp::Add,
            src_alpha: BlendFactor::One,
            dst_alpha: BlendFactor::Zero,
            alpha_op: BlendOp::Add,
            components: ColorComponents::all(),
        }
    }
}

#[cfg(test)]
#[path = "render_state_tests.rs"]
mod tests;
