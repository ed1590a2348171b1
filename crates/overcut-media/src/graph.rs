//! Compilation of an overlay list into an FFmpeg filter graph.
//!
//! Overlays are chained in list order: each stage consumes the previous
//! stage's output label and produces a new one, so later overlays draw
//! on top of earlier ones.

use std::path::PathBuf;

use overcut_models::{Overlay, OverlayKind};

use crate::assets::AssetResolver;
use crate::error::MediaResult;

/// Pixel box image and video overlays are fitted into before compositing.
const OVERLAY_BOX: u32 = 100;

/// A compiled compositing graph.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayGraph {
    /// The `filter_complex` expression; empty when there are no stages
    pub filter_complex: String,
    /// Extra media inputs in appearance order; input `N` on the FFmpeg
    /// command line is `extra_inputs[N-1]` (the base video is input 0)
    pub extra_inputs: Vec<PathBuf>,
    /// Label of the last stage's video output, `None` for an empty graph
    pub output_label: Option<String>,
}

impl OverlayGraph {
    /// True when no stage was generated and the base stream passes through.
    pub fn is_empty(&self) -> bool {
        self.filter_complex.is_empty()
    }
}

/// Compile an ordered overlay list into a filter graph.
///
/// Asset references are resolved through `resolver`; a missing asset
/// aborts compilation. Overlays of unknown kind are skipped without
/// consuming a label. Assumes overlays were validated at job creation.
pub fn compile(overlays: &[Overlay], resolver: &AssetResolver) -> MediaResult<OverlayGraph> {
    let mut extra_inputs: Vec<PathBuf> = Vec::new();
    let mut chains: Vec<String> = Vec::new();

    let mut current_label = "[0:v]".to_string();
    let mut label_index = 0usize;

    for overlay in overlays {
        let out_label = format!("[v{label_index}]");

        let chain = match overlay.kind {
            OverlayKind::Text => draw_text_stage(overlay, &current_label, &out_label),
            OverlayKind::Image | OverlayKind::Video => {
                let asset_path = resolver.resolve(&overlay.content)?;
                extra_inputs.push(asset_path);
                composite_stage(
                    overlay,
                    extra_inputs.len(),
                    label_index,
                    &current_label,
                    &out_label,
                )
            }
            OverlayKind::Unknown => {
                tracing::warn!(content = %overlay.content, "Skipping overlay of unknown kind");
                continue;
            }
        };

        chains.push(chain);
        current_label = out_label;
        label_index += 1;
    }

    let output_label = if chains.is_empty() {
        None
    } else {
        Some(current_label)
    };

    Ok(OverlayGraph {
        filter_complex: chains.join("; "),
        extra_inputs,
        output_label,
    })
}

/// Visibility gate restricting a stage to `[start_time, end_time]`.
fn time_gate(overlay: &Overlay) -> String {
    format!(
        "enable='between(t,{},{})'",
        overlay.start_time, overlay.end_time
    )
}

/// Escape characters with filter-option meaning in drawtext values.
fn escape(value: &str) -> String {
    value.replace(':', "\\:").replace('\'', "\\'")
}

/// One `drawtext` stage for a text overlay.
fn draw_text_stage(overlay: &Overlay, current_label: &str, out_label: &str) -> String {
    let style = overlay.text_style();

    // In drawtext expressions w/h are the frame dimensions.
    let mut opts = vec![
        format!("text='{}'", escape(&overlay.content)),
        format!("x=w*{}", overlay.x),
        format!("y=h*{}", overlay.y),
        format!("fontcolor={}", escape(style.color.trim())),
        format!("fontsize={}", style.font_size),
        time_gate(overlay),
    ];

    if style.box_enabled {
        opts.push("box=1".to_string());
        opts.push(format!("boxcolor={}", escape(style.box_color.trim())));
        opts.push(format!("boxborderw={}", style.box_borderw));
    }

    format!("{current_label}drawtext={}{out_label}", opts.join(":"))
}

/// Scale-pad-overlay chain for an image or video overlay.
///
/// The source is fitted inside a fixed square preserving aspect ratio,
/// padded to exactly that square with a transparent fill, then
/// composited at the fractional position. In the overlay filter W/H are
/// the main frame dimensions.
fn composite_stage(
    overlay: &Overlay,
    input_index: usize,
    label_index: usize,
    current_label: &str,
    out_label: &str,
) -> String {
    let scaled_label = format!("[ov{label_index}]");
    let padded_label = format!("[pad{label_index}]");

    format!(
        "[{input_index}:v]scale={size}:{size}:force_original_aspect_ratio=decrease{scaled_label};\
         {scaled_label}pad={size}:{size}:(ow-iw)/2:(oh-ih)/2:color=black@0.0{padded_label};\
         {current_label}{padded_label}overlay=x=W*{x}:y=H*{y}:{gate}{out_label}",
        size = OVERLAY_BOX,
        x = overlay.x,
        y = overlay.y,
        gate = time_gate(overlay),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn resolver_with_assets(names: &[&str]) -> (TempDir, AssetResolver) {
        let dir = TempDir::new().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let resolver = AssetResolver::new(dir.path());
        (dir, resolver)
    }

    #[test]
    fn test_empty_overlay_list_compiles_to_empty_graph() {
        let (_dir, resolver) = resolver_with_assets(&[]);
        let graph = compile(&[], &resolver).unwrap();

        assert!(graph.is_empty());
        assert!(graph.extra_inputs.is_empty());
        assert_eq!(graph.output_label, None);
    }

    #[test]
    fn test_single_text_overlay() {
        let (_dir, resolver) = resolver_with_assets(&[]);
        let graph = compile(&[Overlay::text("Hi", 0.5, 0.1, 0.0, 3.0)], &resolver).unwrap();

        assert_eq!(
            graph.filter_complex,
            "[0:v]drawtext=text='Hi':x=w*0.5:y=h*0.1:fontcolor=white:fontsize=36:\
             enable='between(t,0,3)':box=1:boxcolor=black@0.5:boxborderw=5[v0]"
        );
        assert!(graph.extra_inputs.is_empty());
        assert_eq!(graph.output_label.as_deref(), Some("[v0]"));
    }

    #[test]
    fn test_box_disabled_drops_box_options() {
        let (_dir, resolver) = resolver_with_assets(&[]);
        let mut overlay = Overlay::text("Hi", 0.5, 0.1, 0.0, 3.0);
        overlay.box_enabled = Some(false);

        let graph = compile(&[overlay], &resolver).unwrap();
        assert!(!graph.filter_complex.contains("box=1"));
        assert!(!graph.filter_complex.contains("boxcolor"));
    }

    #[test]
    fn test_text_escaping() {
        let (_dir, resolver) = resolver_with_assets(&[]);
        let graph = compile(
            &[Overlay::text("It's 12:00", 0.5, 0.1, 0.0, 3.0)],
            &resolver,
        )
        .unwrap();

        assert!(graph.filter_complex.contains("text='It\\'s 12\\:00'"));
    }

    #[test]
    fn test_image_overlay_appends_input_and_composites() {
        let (dir, resolver) = resolver_with_assets(&["logo.png"]);
        let graph = compile(&[Overlay::image("logo.png", 0.25, 0.75, 1.0, 5.0)], &resolver).unwrap();

        assert_eq!(graph.extra_inputs, vec![dir.path().join("logo.png")]);
        assert!(graph
            .filter_complex
            .contains("[1:v]scale=100:100:force_original_aspect_ratio=decrease[ov0]"));
        assert!(graph
            .filter_complex
            .contains("pad=100:100:(ow-iw)/2:(oh-ih)/2:color=black@0.0[pad0]"));
        assert!(graph
            .filter_complex
            .contains("[0:v][pad0]overlay=x=W*0.25:y=H*0.75:enable='between(t,1,5)'[v0]"));
    }

    #[test]
    fn test_stages_chain_across_kinds() {
        let (_dir, resolver) = resolver_with_assets(&["logo.png"]);
        let overlays = vec![
            Overlay::text("Hi", 0.5, 0.1, 0.0, 3.0),
            Overlay::image("logo.png", 0.1, 0.1, 0.0, 3.0),
        ];

        let graph = compile(&overlays, &resolver).unwrap();

        // The image stage consumes the drawtext stage's output.
        assert!(graph.filter_complex.contains("[v0][pad1]overlay"));
        assert_eq!(graph.output_label.as_deref(), Some("[v1]"));
    }

    #[test]
    fn test_compile_is_order_preserving() {
        let (_dir, resolver) = resolver_with_assets(&[]);
        let a = Overlay::text("A", 0.1, 0.1, 0.0, 2.0);
        let b = Overlay::text("B", 0.9, 0.9, 1.0, 4.0);

        let forward = compile(&[a.clone(), b.clone()], &resolver).unwrap();
        let swapped = compile(&[b, a], &resolver).unwrap();

        let forward_stages: Vec<&str> = forward.filter_complex.split("; ").collect();
        let swapped_stages: Vec<&str> = swapped.filter_complex.split("; ").collect();
        assert_eq!(forward_stages.len(), 2);
        assert_eq!(swapped_stages.len(), 2);

        // Same set of stages, only the stacking order flips.
        assert!(forward_stages[0].contains("text='A'"));
        assert!(forward_stages[1].contains("text='B'"));
        assert!(swapped_stages[0].contains("text='B'"));
        assert!(swapped_stages[1].contains("text='A'"));
    }

    #[test]
    fn test_unknown_kind_is_skipped() {
        let (_dir, resolver) = resolver_with_assets(&[]);
        let mut unknown = Overlay::text("?", 0.5, 0.5, 0.0, 1.0);
        unknown.kind = OverlayKind::Unknown;

        let overlays = vec![
            Overlay::text("A", 0.1, 0.1, 0.0, 2.0),
            unknown,
            Overlay::text("B", 0.9, 0.9, 1.0, 4.0),
        ];

        let graph = compile(&overlays, &resolver).unwrap();
        let stages: Vec<&str> = graph.filter_complex.split("; ").collect();
        assert_eq!(stages.len(), 2);
        // Labels stay contiguous across the skip.
        assert!(stages[1].starts_with("[v0]"));
        assert_eq!(graph.output_label.as_deref(), Some("[v1]"));
    }

    #[test]
    fn test_missing_asset_aborts_compilation() {
        let (_dir, resolver) = resolver_with_assets(&[]);
        let err = compile(&[Overlay::image("gone.png", 0.5, 0.5, 0.0, 1.0)], &resolver).unwrap_err();
        assert!(matches!(err, crate::error::MediaError::AssetNotFound { .. }));
    }
}
