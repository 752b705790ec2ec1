//! Example: Inspecting an MD mesh file
//!
//! Loads a mesh, prints its contents and any diagnostic findings, then
//! evaluates the bind pose and prints each bone's world position.
//!
//! Usage: cargo run --example inspect_mesh -- <path_to_md_file>

use std::env;
use std::process;

use md_mesh::{LoadOptions, SkinnedMesh};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("Usage: inspect_mesh <path_to_md_file>");
        process::exit(1);
    };

    let mesh = match SkinnedMesh::load_from_file(&path, &LoadOptions::default()) {
        Ok(mesh) => mesh,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            process::exit(1);
        }
    };

    let asset = mesh.asset();
    println!("File: {path}");
    println!("  Vertices:  {}", asset.vertices().len());
    println!("  Triangles: {}", asset.triangle_count());
    println!("  Bones:     {}", asset.bones().len());
    println!("  Nodes:     {}", asset.nodes().len());

    let report = mesh.report();
    if report.is_clean() {
        println!("\nNo issues found");
    } else {
        println!("\nFound {} issues:", report.issue_count());
        for warning in &report.weights {
            println!("  Vertex {}: weights sum to {:.4}", warning.vertex, warning.sum);
        }
        for warning in &report.indices {
            println!(
                "  Index {} at position {} is out of range",
                warning.index, warning.position
            );
        }
        for warning in &report.bone_references {
            println!(
                "  Vertex {} slot {}: bone {} does not exist",
                warning.vertex, warning.slot, warning.bone
            );
        }
        if let Some((nodes, bones)) = report.count_mismatch {
            println!("  {nodes} nodes for {bones} bones");
        }
        for degenerate in &report.degenerate_bind_offsets {
            println!("  Bone {}: singular bind offset", degenerate.bone);
        }
    }

    let skeleton = mesh.skeleton();
    let mut evaluator = mesh.pose_evaluator();
    evaluator.update(skeleton, &mesh.animation_state());

    println!("\nSkeleton:");
    for (position, node) in skeleton.nodes().iter().enumerate() {
        let bone = node.bone_index as usize;
        let origin = evaluator.world_pose()[bone].w_axis.truncate();
        println!(
            "  {:indent$}{} (bone {}) at [{:.3}, {:.3}, {:.3}]",
            "",
            node.name,
            bone,
            origin.x,
            origin.y,
            origin.z,
            indent = skeleton.depth(position) * 2
        );
    }
}
