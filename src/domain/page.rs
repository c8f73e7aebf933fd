//! A laid-out page (spec §3 "Page"): an ordered run of blocks the layout
//! engine has committed to a specific page number.

use crate::domain::formatting::UsableArea;
use crate::domain::layout_block::LayoutBlock;

#[derive(Debug, Clone)]
pub struct Page {
    pub number: u32,
    pub blocks: Vec<LayoutBlock>,
    pub usable_area: UsableArea,
}

impl Page {
    pub fn new(number: u32, usable_area: UsableArea) -> Self {
        Self { number, blocks: Vec::new(), usable_area }
    }

    pub fn used_height(&self) -> f32 {
        self.blocks.iter().map(LayoutBlock::height).sum()
    }

    pub fn remaining_height(&self) -> f32 {
        self.usable_area.height - self.used_height()
    }
}
