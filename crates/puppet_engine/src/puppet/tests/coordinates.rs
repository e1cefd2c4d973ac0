//! Coordinate pipeline: anchors, model/world conversion, hit testing, focus
//! and bounds

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;

use super::node_with;
use crate::core::config::PuppetOptions;
use crate::foundation::math::{affine, Point2, Vec2};
use crate::model::{HitArea, HitAreas, ModelAssets};
use crate::puppet::{ModelEvent, PuppetModel};
use crate::scene::{BoundsOverride, ParentFrame, SceneNode, Transform2D, TransformRefresh};
use crate::testing::MockModel;

fn body_areas() -> HitAreas {
    HitAreas::new()
        .with(HitArea::new("head", Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0)))
        .with(HitArea::new("body", Vec2::new(0.0, 50.0), Vec2::new(100.0, 200.0)))
}

#[test]
fn test_anchor_derives_pivot() {
    let mut node = node_with(MockModel::new(200.0, 400.0), 0);

    node.set_anchor(0.5, 1.0);

    assert_eq!(node.pivot(), Vec2::new(100.0, 400.0));
}

#[test]
fn test_anchor_set_before_load_applies_at_setup() {
    let mut node = PuppetModel::new(PuppetOptions::default());
    node.set_anchor(0.5, 1.0);
    assert_eq!(node.pivot(), Vec2::zeros());

    node.setup(ModelAssets {
        model: Box::new(MockModel::new(200.0, 400.0)),
        textures: Vec::new(),
    })
    .unwrap();

    assert_eq!(node.pivot(), Vec2::new(100.0, 400.0));
}

#[test]
fn test_model_world_round_trip() {
    let mut model = MockModel::new(200.0, 400.0);
    model.local = affine(0.5, 0.0, 0.0, 0.5, 10.0, 5.0);
    let mut node = node_with(model, 0);
    node.set_anchor(0.5, 0.5);
    node.set_position(300.0, 200.0);
    node.set_rotation(0.3);
    node.set_scale(2.0, 1.5);
    SceneNode::update_transform(&mut node, &ParentFrame::root());

    for (x, y) in [(321.5, 187.25), (0.0, 0.0), (-40.0, 900.0)] {
        let model_point = node.to_model_position(Point2::new(x, y), TransformRefresh::Skip).unwrap();
        let back = node.to_world_position(model_point).unwrap();
        assert_relative_eq!(back.x, x, epsilon = 1e-3);
        assert_relative_eq!(back.y, y, epsilon = 1e-3);
    }
}

#[test]
fn test_refresh_recomputes_from_ancestors() {
    let mut node = node_with(MockModel::new(100.0, 100.0), 0);
    let ancestors = [
        Transform2D::identity().with_position(100.0, 0.0),
        Transform2D::identity().with_scale(2.0, 2.0),
    ];

    let stale = node.to_model_position(Point2::new(150.0, 10.0), TransformRefresh::Skip).unwrap();
    let fresh = node
        .to_model_position(Point2::new(150.0, 10.0), TransformRefresh::Ancestors(&ancestors))
        .unwrap();

    assert_eq!(stale, Point2::new(150.0, 10.0));
    assert_relative_eq!(fresh.x, 25.0);
    assert_relative_eq!(fresh.y, 5.0);
}

#[test]
fn test_unloaded_node_has_no_model_space() {
    let mut node = PuppetModel::default();
    assert!(node.to_model_position(Point2::origin(), TransformRefresh::Skip).is_none());
    assert!(node.hit_test(0.0, 0.0, &[]).is_empty());
}

#[test]
fn test_hit_test_returns_areas_in_definition_order() {
    let mut node = node_with(MockModel::new(100.0, 200.0).with_hit_areas(body_areas()), 0);

    assert_eq!(node.hit_test(50.0, 75.0, &[]), vec!["head", "body"]);
    assert_eq!(node.hit_test(50.0, 10.0, &[]), vec!["head"]);
    assert!(node.hit_test(50.0, 300.0, &[]).is_empty());
}

#[test]
fn test_hit_test_follows_ancestors() {
    let mut node = node_with(MockModel::new(100.0, 200.0).with_hit_areas(body_areas()), 0);
    let parent = [Transform2D::identity().with_position(1000.0, 0.0)];

    assert!(node.hit_test(50.0, 10.0, &parent).is_empty());
    assert_eq!(node.hit_test(1050.0, 10.0, &parent), vec!["head"]);
}

#[test]
fn test_tap_emits_hit_only_on_hit() {
    let hits = Rc::new(RefCell::new(Vec::new()));
    let mut node = node_with(MockModel::new(100.0, 200.0).with_hit_areas(body_areas()), 0);

    let seen = Rc::clone(&hits);
    node.register_handler(Box::new(move |event: &ModelEvent| {
        if let ModelEvent::Hit(names) = event {
            seen.borrow_mut().push(names.clone());
        }
        false
    }));

    node.tap(50.0, 500.0, &[]);
    node.tap(50.0, 150.0, &[]);

    assert_eq!(*hits.borrow(), vec![vec!["body".to_string()]]);
}

#[test]
fn test_focus_normalizes_and_flips_y() {
    let model = MockModel::new(200.0, 200.0);
    let state = model.shared_state();
    let mut node = node_with(model, 0);

    node.focus(200.0, 100.0, false);
    node.focus(100.0, 0.0, true);

    let calls = state.borrow().focus_calls.clone();
    assert_eq!(calls.len(), 2);
    assert_relative_eq!(calls[0].0, 1.0, epsilon = 1e-6);
    assert_relative_eq!(calls[0].1, 0.0, epsilon = 1e-6);
    assert!(!calls[0].2);
    assert_relative_eq!(calls[1].0, 0.0, epsilon = 1e-6);
    assert_relative_eq!(calls[1].1, 1.0, epsilon = 1e-6);
    assert!(calls[1].2);
}

#[test]
fn test_bounds_follow_world_and_override() {
    let mut node = node_with(MockModel::new(200.0, 400.0), 0);
    node.set_position(10.0, 20.0);
    SceneNode::update_transform(&mut node, &ParentFrame::root());

    let bounds = node.calculate_bounds();
    assert_eq!(bounds.min, Vec2::new(10.0, 20.0));
    assert_eq!(bounds.max, Vec2::new(210.0, 420.0));

    node.set_bounds_override(BoundsOverride::new(-10.0, -20.0, 10.0, 20.0));
    let bounds = node.calculate_bounds();
    assert_eq!(bounds.min, Vec2::new(0.0, 0.0));
    assert_eq!(bounds.max, Vec2::new(220.0, 440.0));

    assert!(node.contains_point(Point2::new(0.0, 0.0)));
    assert!(node.contains_point(Point2::new(219.0, 439.0)));
    assert!(!node.contains_point(Point2::new(220.0, 440.0)));
}

#[test]
fn test_bounds_override_from_options() {
    let options = PuppetOptions::new().with_bounds_override(BoundsOverride::new(0.0, 0.0, 50.0, 0.0));
    let mut node = PuppetModel::new(options);
    node.setup(ModelAssets {
        model: Box::new(MockModel::new(100.0, 100.0)),
        textures: Vec::new(),
    })
    .unwrap();

    assert_eq!(node.calculate_bounds().width(), 150.0);
}

#[test]
fn test_unloaded_node_contains_nothing() {
    let node = PuppetModel::default();
    assert!(node.calculate_bounds().is_empty());
    assert!(!node.contains_point(Point2::origin()));
}
