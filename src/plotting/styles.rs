use plotters::style::{RGBAColor, RGBColor};
use std::collections::HashMap;

/// Group codes with a fixed color, in palette order.
pub const GROUP_CODES: [&str; 5] = ["BOT", "THO", "TTC", "TMX", "SET"];

/// Tableau 10 categorical palette.
pub const TABLEAU10: [RGBColor; 10] = [
    RGBColor(0x4e, 0x79, 0xa7),
    RGBColor(0xf2, 0x8e, 0x2c),
    RGBColor(0xe1, 0x57, 0x59),
    RGBColor(0x76, 0xb7, 0xb2),
    RGBColor(0x59, 0xa1, 0x4f),
    RGBColor(0xed, 0xc9, 0x49),
    RGBColor(0xaf, 0x7a, 0xa1),
    RGBColor(0xff, 0x9d, 0xa7),
    RGBColor(0x9c, 0x75, 0x5f),
    RGBColor(0xba, 0xb0, 0xab),
];

/// Chart theme configuration
pub struct ChartTheme {
    pub background_color: RGBAColor,
    pub text_color: RGBAColor,
    pub grid_color: RGBAColor,
    pub axis_color: RGBAColor,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            background_color: RGBAColor(255, 255, 255, 1.0),
            text_color: RGBAColor(33, 33, 33, 0.9),
            grid_color: RGBAColor(0, 0, 0, 0.1),
            axis_color: RGBAColor(0, 0, 0, 0.6),
        }
    }
}

/// Chart style configuration
pub struct ChartStyle {
    pub line_width: u32,
    pub font_size: u32,
    pub margin: u32,
    pub label_area_size: u32,
    /// Room for category names on the axis of horizontal bar charts
    pub category_label_area_size: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            line_width: 2,
            font_size: 13,
            margin: 10,
            label_area_size: 50,
            category_label_area_size: 200,
        }
    }
}

/// Ordinal color scale: known group codes keep their slot, any other
/// category takes the next free color in first-seen order.
#[derive(Debug, Default)]
pub struct ColorScale {
    assigned: HashMap<String, usize>,
    next: usize,
}

impl ColorScale {
    pub fn new() -> Self {
        let assigned = GROUP_CODES
            .iter()
            .enumerate()
            .map(|(i, code)| (code.to_string(), i))
            .collect();
        Self {
            assigned,
            next: GROUP_CODES.len(),
        }
    }

    /// Scale without the reserved group slots, for item-level charts.
    pub fn unreserved() -> Self {
        Self::default()
    }

    pub fn color(&mut self, category: &str) -> RGBColor {
        let slot = match self.assigned.get(category) {
            Some(slot) => *slot,
            None => {
                let slot = self.next;
                self.next += 1;
                self.assigned.insert(category.to_string(), slot);
                slot
            }
        };
        TABLEAU10[slot % TABLEAU10.len()]
    }
}
