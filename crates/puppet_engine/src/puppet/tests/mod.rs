//! Cross-module tests for the puppet node

mod coordinates;

use image::RgbaImage;

use crate::core::config::PuppetOptions;
use crate::model::ModelAssets;
use crate::puppet::PuppetModel;
use crate::render::ModelTexture;
use crate::testing::MockModel;

/// Node with `model` loaded and `textures` 2x2 textures
fn node_with(model: MockModel, textures: usize) -> PuppetModel {
    let mut node = PuppetModel::new(PuppetOptions::default());
    node.setup(ModelAssets {
        model: Box::new(model),
        textures: (0..textures)
            .map(|i| ModelTexture::new(format!("texture_{i:02}"), RgbaImage::new(2, 2)))
            .collect(),
    })
    .unwrap();
    node
}
