//! Shape generation for 2D primitives
//!
//! Everything is emitted as a triangle list in screen pixels.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, colors};
use crate::Rect;
use crate::consts::*;
use crate::sim::{Cloud, Drone, GameState, Pipe};

/// Pipe lip overhang on each side
const CAP_OVERHANG: f32 = 4.0;
const CAP_HEIGHT: f32 = 20.0;
const ELLIPSE_SEGMENTS: u32 = 20;

/// Generate vertices for a filled axis-aligned rectangle
pub fn rect(r: Rect, color: [f32; 4]) -> Vec<Vertex> {
    let (l, t, rt, b) = (r.left(), r.top(), r.right(), r.bottom());
    vec![
        Vertex::new(l, t, color),
        Vertex::new(l, b, color),
        Vertex::new(rt, t, color),
        Vertex::new(rt, t, color),
        Vertex::new(l, b, color),
        Vertex::new(rt, b, color),
    ]
}

/// Generate vertices for a filled ellipse
pub fn ellipse(center: Vec2, radii: Vec2, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radii.x * theta1.cos(),
            center.y + radii.y * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radii.x * theta2.cos(),
            center.y + radii.y * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    ellipse(center, Vec2::splat(radius), color, segments)
}

/// Top and bottom columns of a pipe, each with a lip at the gap
pub fn pipe_pair(pipe: &Pipe, screen_height: f32) -> Vec<Vertex> {
    let top = pipe.top_rect();
    let bottom = pipe.bottom_rect(screen_height);

    let mut vertices = rect(top, colors::PIPE);
    vertices.extend(rect(bottom, colors::PIPE));

    let cap_w = top.width + CAP_OVERHANG * 2.0;
    let cap_x = top.x - CAP_OVERHANG;
    if top.height > 0.0 {
        let h = CAP_HEIGHT.min(top.height);
        vertices.extend(rect(
            Rect::new(cap_x, top.bottom() - h, cap_w, h),
            colors::PIPE_CAP,
        ));
    }
    if bottom.height > 0.0 {
        let h = CAP_HEIGHT.min(bottom.height);
        vertices.extend(rect(Rect::new(cap_x, bottom.y, cap_w, h), colors::PIPE_CAP));
    }
    vertices
}

/// A puffy cloud: three overlapping ellipses inside the cloud's box
pub fn cloud(c: &Cloud) -> Vec<Vertex> {
    let w = c.width;
    let h = c.height;
    let mut vertices = ellipse(
        Vec2::new(c.x + w * 0.3, c.y + h * 0.6),
        Vec2::new(w * 0.3, h * 0.35),
        colors::CLOUD,
        ELLIPSE_SEGMENTS,
    );
    vertices.extend(ellipse(
        Vec2::new(c.x + w * 0.55, c.y + h * 0.4),
        Vec2::new(w * 0.3, h * 0.4),
        colors::CLOUD,
        ELLIPSE_SEGMENTS,
    ));
    vertices.extend(ellipse(
        Vec2::new(c.x + w * 0.75, c.y + h * 0.65),
        Vec2::new(w * 0.25, h * 0.3),
        colors::CLOUD,
        ELLIPSE_SEGMENTS,
    ));
    vertices
}

/// Rotor blur width for an animation frame (the three frames read as spin)
pub fn rotor_half_width(drone_width: f32, frame: u32) -> f32 {
    let phase = [1.0, 0.6, 0.25];
    drone_width * 0.18 * phase[(frame % ANIM_FRAMES) as usize]
}

/// Quadcopter seen from the side: body, arms, rotors and camera
pub fn drone(d: &Drone, dead: bool) -> Vec<Vertex> {
    let b = d.bounds();
    let body_color = if dead {
        colors::WRECK
    } else {
        colors::DRONE_BODY
    };

    // Arms span the full width a quarter of the way down
    let arm = Rect::new(b.x, b.y + b.height * 0.25, b.width, b.height * 0.08);
    let body = Rect::new(
        b.x + b.width * 0.3,
        b.y + b.height * 0.3,
        b.width * 0.4,
        b.height * 0.35,
    );

    let mut vertices = rect(arm, colors::DRONE_ARM);
    vertices.extend(rect(body, body_color));

    // Camera pod under the body
    vertices.extend(circle(
        Vec2::new(body.center().x, body.bottom() + b.height * 0.08),
        b.height * 0.1,
        colors::CAMERA,
        ELLIPSE_SEGMENTS,
    ));

    // Rotor masts and blurred blades at both ends of the arm
    let blade_half = rotor_half_width(b.width, d.anim.frame);
    for hub_x in [b.x + b.width * 0.1, b.x + b.width * 0.9] {
        vertices.extend(rect(
            Rect::new(hub_x - 2.0, b.y + b.height * 0.12, 4.0, b.height * 0.14),
            colors::DRONE_ARM,
        ));
        vertices.extend(ellipse(
            Vec2::new(hub_x, b.y + b.height * 0.1),
            Vec2::new(blade_half, b.height * 0.05),
            colors::ROTOR,
            ELLIPSE_SEGMENTS,
        ));
    }

    vertices
}

/// The whole frame, back to front: clouds, pipes, drone
pub fn build_scene(state: &GameState) -> Vec<Vertex> {
    let mut vertices = Vec::new();
    for c in &state.clouds {
        vertices.extend(cloud(c));
    }
    for pipe in state.pipes.pipes() {
        vertices.extend(pipe_pair(pipe, state.viewport.height));
    }
    vertices.extend(drone(&state.drone, state.phase.is_dead()));
    vertices
}
