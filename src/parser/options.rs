//! Extraction options and configuration.

/// English Metric Units per point.
pub const EMU_PER_POINT: u32 = 12_700;

/// EMU per half-point (the unit of `w:sz`).
pub const EMU_PER_HALF_POINT: u32 = EMU_PER_POINT / 2;

/// Minimum run size for an implicit level-1 heading (~16pt).
pub const LEVEL1_THRESHOLD_EMU: u32 = 200_000;

/// Minimum run size for an implicit level-2 heading (~13pt).
pub const LEVEL2_THRESHOLD_EMU: u32 = 165_000;

/// Font-size thresholds for headings in generically styled paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingThresholds {
    /// Level-1 threshold in EMU
    pub level1_emu: u32,
    /// Level-2 threshold in EMU
    pub level2_emu: u32,
}

impl HeadingThresholds {
    /// Thresholds in points.
    pub fn from_points(level1_pt: f32, level2_pt: f32) -> Self {
        Self {
            level1_emu: points_to_emu(level1_pt),
            level2_emu: points_to_emu(level2_pt),
        }
    }

    /// Set the level-1 threshold in points.
    pub fn with_level1_pt(mut self, points: f32) -> Self {
        self.level1_emu = points_to_emu(points);
        self
    }

    /// Set the level-2 threshold in points.
    pub fn with_level2_pt(mut self, points: f32) -> Self {
        self.level2_emu = points_to_emu(points);
        self
    }

    /// Heading level implied by the largest run size, if any.
    pub fn level_for(&self, max_size_emu: u32) -> Option<u8> {
        if max_size_emu >= self.level1_emu {
            Some(1)
        } else if max_size_emu >= self.level2_emu {
            Some(2)
        } else {
            None
        }
    }
}

impl Default for HeadingThresholds {
    fn default() -> Self {
        Self {
            level1_emu: LEVEL1_THRESHOLD_EMU,
            level2_emu: LEVEL2_THRESHOLD_EMU,
        }
    }
}

fn points_to_emu(points: f32) -> u32 {
    (points.max(0.0) * EMU_PER_POINT as f32).round() as u32
}

/// Options for extracting blocks from an existing document.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Font-size thresholds for generic paragraphs
    pub heading_thresholds: HeadingThresholds,

    /// Rebuild `**`/`*`/`__` markup from run formatting
    pub reconstruct_inline: bool,

    /// Whether to extract tables
    pub include_tables: bool,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set heading thresholds.
    pub fn with_heading_thresholds(mut self, thresholds: HeadingThresholds) -> Self {
        self.heading_thresholds = thresholds;
        self
    }

    /// Set heading thresholds in points.
    pub fn with_heading_thresholds_pt(mut self, level1_pt: f32, level2_pt: f32) -> Self {
        self.heading_thresholds = HeadingThresholds::from_points(level1_pt, level2_pt);
        self
    }

    /// Enable or disable inline markup reconstruction.
    pub fn with_inline_markup(mut self, reconstruct: bool) -> Self {
        self.reconstruct_inline = reconstruct;
        self
    }

    /// Extract plain text only.
    pub fn plain_text(mut self) -> Self {
        self.reconstruct_inline = false;
        self
    }

    /// Enable or disable table extraction.
    pub fn with_tables(mut self, include: bool) -> Self {
        self.include_tables = include;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            heading_thresholds: HeadingThresholds::default(),
            reconstruct_inline: true,
            include_tables: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_options_builder() {
        let options = ExtractOptions::new()
            .plain_text()
            .with_tables(false)
            .with_heading_thresholds_pt(20.0, 14.0);

        assert!(!options.reconstruct_inline);
        assert!(!options.include_tables);
        assert_eq!(options.heading_thresholds.level1_emu, 254_000);
        assert_eq!(options.heading_thresholds.level2_emu, 177_800);
    }

    #[test]
    fn test_default_thresholds() {
        let thresholds = HeadingThresholds::default();
        // w:sz is in half-points
        assert_eq!(thresholds.level_for(32 * EMU_PER_HALF_POINT), Some(1));
        assert_eq!(thresholds.level_for(26 * EMU_PER_HALF_POINT), Some(2));
        assert_eq!(thresholds.level_for(25 * EMU_PER_HALF_POINT), None);
        assert_eq!(thresholds.level_for(22 * EMU_PER_HALF_POINT), None);
        assert_eq!(thresholds.level_for(0), None);
    }

    #[test]
    fn test_per_level_point_setters() {
        let thresholds = HeadingThresholds::default().with_level1_pt(20.0);
        assert_eq!(thresholds.level1_emu, 254_000);
        assert_eq!(thresholds.level2_emu, LEVEL2_THRESHOLD_EMU);

        let thresholds = HeadingThresholds::default().with_level2_pt(-3.0);
        assert_eq!(thresholds.level1_emu, LEVEL1_THRESHOLD_EMU);
        assert_eq!(thresholds.level2_emu, 0);
    }

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert!(options.reconstruct_inline);
        assert!(options.include_tables);
        assert_eq!(options.heading_thresholds, HeadingThresholds::default());
    }
}
