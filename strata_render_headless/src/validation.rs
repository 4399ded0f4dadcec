/// Structural checks on the flat arrays the host hands to the backend,
/// plus per-backend validation statistics with a colored report.

use colored::*;
use rustc_hash::FxHashMap;
use strata_render::strata::render::{
    AttachmentDescriptor, AttachmentType, BindingDescriptor, BlendOptions, RenderStageDescriptor,
    TextureFormat, DEPTH_STENCIL_FORMAT,
};
use strata_render::strata::util::{FormatElement, NumericType};

/// Outcome counters of one backend's validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStats {
    /// Arrays and streams checked
    pub checks: u32,
    /// Checks that failed
    pub failures: u32,
}

/// Validation counters and failure messages, grouped by text
#[derive(Debug, Default)]
pub(crate) struct ValidationTracker {
    stats: ValidationStats,
    messages: FxHashMap<String, u32>,
}

impl ValidationTracker {
    /// Count one check and remember its failure message, if any
    pub(crate) fn record(&mut self, outcome: std::result::Result<(), String>) -> std::result::Result<(), String> {
        self.stats.checks += 1;
        if let Err(message) = &outcome {
            self.stats.failures += 1;
            *self.messages.entry(message.clone()).or_insert(0) += 1;
        }
        outcome
    }

    pub(crate) fn stats(&self) -> ValidationStats {
        self.stats
    }

    pub(crate) fn print_report(&self) {
        if self.stats.failures == 0 {
            println!("\n{} ({} checks)", "✓ No validation failures".green().bold(), self.stats.checks);
            return;
        }

        println!("\n{}", "=== Headless Validation Report ===".bright_blue().bold());
        println!("  {} {}", "Checks:".white().bold(), self.stats.checks);
        println!("  {} {}", "Failures:".red().bold(), self.stats.failures);

        let mut messages: Vec<(&String, &u32)> = self.messages.iter().collect();
        messages.sort();
        for (message, count) in messages {
            if *count > 1 {
                println!("  {} {} {}", "-".red(), message, format!("(x{})", count).bright_black());
            } else {
                println!("  {} {}", "-".red(), message);
            }
        }

        println!("{}\n", "==================================".bright_blue().bold());
    }
}

// ============================================================================
// Render-pass graph
// ============================================================================

/// Check the four arrays of a render-pass graph against each other
pub fn validate_graph(
    attachments: &[AttachmentDescriptor],
    stages: &[RenderStageDescriptor],
    members: &[u32],
    dependencies: &[u32],
) -> std::result::Result<(), String> {
    if stages.is_empty() {
        return Err("Framebuffer format has no stage".to_string());
    }

    for (id, attachment) in attachments.iter().enumerate() {
        match attachment.attachment_type {
            AttachmentType::Color if TextureFormat::from_id(attachment.format).is_none() => {
                return Err(format!("Attachment {}: unknown color format {}", id, attachment.format));
            }
            AttachmentType::DepthStencil if attachment.format != DEPTH_STENCIL_FORMAT => {
                return Err(format!(
                    "Attachment {}: depth/stencil format must be {:#x}, got {:#x}",
                    id, DEPTH_STENCIL_FORMAT, attachment.format
                ));
            }
            _ => {}
        }
    }

    for (id, stage) in stages.iter().enumerate() {
        let stage_members = stage
            .members(members)
            .ok_or_else(|| format!("Stage {}: member range out of bounds", id))?;
        if stage_members.is_empty() {
            return Err(format!("Stage {}: no color attachment", id));
        }
        for &member in stage_members {
            match attachments.get(member as usize) {
                Some(attachment) if attachment.attachment_type == AttachmentType::Color => {}
                Some(_) => return Err(format!("Stage {}: attachment {} is not a color attachment", id, member)),
                None => return Err(format!("Stage {}: attachment {} does not exist", id, member)),
            }
        }

        if let Some(depth) = stage.depth_stencil() {
            match attachments.get(depth as usize) {
                Some(attachment) if attachment.attachment_type == AttachmentType::DepthStencil => {}
                _ => return Err(format!("Stage {}: attachment {} is not a depth/stencil attachment", id, depth)),
            }
        }

        let stage_dependencies = stage
            .dependencies(dependencies)
            .ok_or_else(|| format!("Stage {}: dependency range out of bounds", id))?;
        for &dependency in stage_dependencies {
            if dependency as usize >= stages.len() {
                return Err(format!("Stage {}: depends on unknown stage {}", id, dependency));
            }
            if dependency as usize == id {
                return Err(format!("Stage {}: depends on itself", id));
            }
        }
    }

    Ok(())
}

// ============================================================================
// Shaders and pipelines
// ============================================================================

/// Check that every uniform binding's member range is inside `uniform_members`
pub fn validate_bindings(bindings: &[BindingDescriptor], uniform_members: &[NumericType]) -> std::result::Result<(), String> {
    for (index, binding) in bindings.iter().enumerate() {
        if let BindingDescriptor::Uniform { member_offset, member_count, size } = *binding {
            let end = member_offset as usize + member_count as usize;
            let members = uniform_members
                .get(member_offset as usize..end)
                .ok_or_else(|| format!("Binding {}: member range out of bounds", index))?;
            let packed: u32 = members.iter().map(|member| member.size_bytes()).sum();
            if packed > size {
                return Err(format!("Binding {}: members need {} bytes, block is {}", index, packed, size));
            }
        }
    }
    Ok(())
}

/// Check a vertex/instance layout against its stride
pub fn validate_layout(what: &str, elements: &[FormatElement], stride: u32) -> std::result::Result<(), String> {
    for (index, element) in elements.iter().enumerate() {
        if element.slot != index as u32 {
            return Err(format!("{} element {}: slot {} out of order", what, index, element.slot));
        }
        if element.offset + element.numeric_type.size_bytes() > stride {
            return Err(format!("{} element {}: ends past stride {}", what, index, stride));
        }
    }
    if !elements.is_empty() && stride == 0 {
        return Err(format!("{} layout has elements but no stride", what));
    }
    Ok(())
}

/// Blend array must cover every attachment, and only color attachments may blend
pub fn validate_blend(blend: &[BlendOptions], attachments: &[AttachmentDescriptor]) -> std::result::Result<(), String> {
    if blend.len() != attachments.len() {
        return Err(format!(
            "Blend array has {} entries for {} attachments",
            blend.len(), attachments.len()
        ));
    }
    for (id, (options, attachment)) in blend.iter().zip(attachments).enumerate() {
        if options.enabled && attachment.attachment_type != AttachmentType::Color {
            return Err(format!("Blending enabled on non-color attachment {}", id));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
