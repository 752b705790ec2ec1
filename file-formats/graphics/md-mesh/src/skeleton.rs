//! Validated bone hierarchy
//!
//! A [`SkeletonModel`] only exists for node sequences in parent-before-child
//! order, which is what lets the pose evaluator walk the hierarchy in a single
//! forward pass.

use glam::Mat4;
use log::debug;

use crate::chunks::{Bone, Node, node::NO_PARENT};
use crate::error::{HierarchyViolation, MdMeshError, Result};

/// Bone hierarchy with validated node ordering
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonModel {
    nodes: Vec<Node>,
    /// Bone index of each node's parent, by node position
    parent_bones: Vec<Option<usize>>,
    /// Node position driving each bone, by bone index
    bone_nodes: Vec<Option<usize>>,
    bind_offsets: Vec<Mat4>,
    inverse_bind: Vec<Mat4>,
}

impl SkeletonModel {
    /// Validate the node hierarchy against the bone array
    ///
    /// Every node's parent must be [`NO_PARENT`] or an earlier node
    /// position, and every node must drive a distinct, existing bone.
    pub fn build(bones: &[Bone], nodes: &[Node]) -> Result<Self> {
        let bone_count = bones.len();
        let mut parent_bones = Vec::with_capacity(nodes.len());
        let mut bone_nodes = vec![None; bone_count];

        for (position, node) in nodes.iter().enumerate() {
            let violation = |reason| MdMeshError::InvalidHierarchy {
                node: position,
                reason,
            };

            let bone = node.bone_index as usize;
            if bone >= bone_count {
                return Err(violation(HierarchyViolation::BoneOutOfRange {
                    bone: node.bone_index,
                    bone_count,
                }));
            }
            if let Some(first_node) = bone_nodes[bone] {
                return Err(violation(HierarchyViolation::DuplicateBone {
                    bone: node.bone_index,
                    first_node,
                }));
            }
            bone_nodes[bone] = Some(position);

            let parent_bone = match node.parent() {
                Some(parent) if parent < position => Some(nodes[parent].bone_index as usize),
                None if node.parent_index == NO_PARENT => None,
                _ => {
                    return Err(violation(HierarchyViolation::ParentNotEarlier {
                        parent: node.parent_index,
                    }));
                }
            };
            parent_bones.push(parent_bone);
        }

        let bind_offsets: Vec<Mat4> = bones.iter().map(|bone| bone.offset_matrix).collect();
        let inverse_bind = bind_offsets.iter().map(Mat4::inverse).collect();

        debug!(
            "Built skeleton: {} nodes over {} bones, {} roots",
            nodes.len(),
            bone_count,
            parent_bones.iter().filter(|p| p.is_none()).count()
        );

        Ok(Self {
            nodes: nodes.to_vec(),
            parent_bones,
            bone_nodes,
            bind_offsets,
            inverse_bind,
        })
    }

    /// Nodes in evaluation order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of bones the skeleton was built over
    pub fn bone_count(&self) -> usize {
        self.bind_offsets.len()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Bone index of the node's parent, `None` for roots or unknown nodes
    pub fn parent_bone(&self, node: usize) -> Option<usize> {
        self.parent_bones.get(node).copied().flatten()
    }

    /// Node position driving a bone, if any node references it
    pub fn node_for_bone(&self, bone: usize) -> Option<usize> {
        self.bone_nodes.get(bone).copied().flatten()
    }

    /// Positions of all root nodes
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_root())
            .map(|(position, _)| position)
    }

    /// Positions of the direct children of a node
    pub fn children_of(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .skip(node.saturating_add(1))
            .filter(move |(_, child)| child.parent() == Some(node))
            .map(|(position, _)| position)
    }

    /// Number of ancestors above a node
    pub fn depth(&self, node: usize) -> usize {
        let mut depth = 0;
        let mut current = self.nodes.get(node).and_then(Node::parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent].parent();
        }
        depth
    }

    /// Find a node by name
    pub fn find_node(&self, name: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| node.name.as_bytes() == name.as_bytes())
    }

    /// Bind offset matrix of a bone
    pub fn bind_offset(&self, bone: usize) -> Option<&Mat4> {
        self.bind_offsets.get(bone)
    }

    /// Inverse of a bone's bind offset matrix
    pub fn inverse_bind(&self, bone: usize) -> Option<&Mat4> {
        self.inverse_bind.get(bone)
    }

    /// Inverse bind offsets for all bones, by bone index
    pub fn inverse_bind_matrices(&self) -> &[Mat4] {
        &self.inverse_bind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn bones(count: usize) -> Vec<Bone> {
        (0..count)
            .map(|i| Bone::new(format!("bone{i}").as_str(), Mat4::IDENTITY, 0))
            .collect()
    }

    fn chain(count: usize) -> Vec<Node> {
        (0..count)
            .map(|i| Node::new(i as u32, i.checked_sub(1), format!("node{i}").as_str()))
            .collect()
    }

    #[test]
    fn test_build_chain() {
        let skeleton = SkeletonModel::build(&bones(3), &chain(3)).unwrap();
        assert_eq!(skeleton.node_count(), 3);
        assert_eq!(skeleton.parent_bone(0), None);
        assert_eq!(skeleton.parent_bone(1), Some(0));
        assert_eq!(skeleton.parent_bone(2), Some(1));
        assert_eq!(skeleton.roots().collect::<Vec<_>>(), vec![0]);
        assert_eq!(skeleton.depth(2), 2);
    }

    #[test]
    fn test_parent_lookup_uses_bone_indices() {
        // Node order differs from bone order
        let nodes = vec![
            Node::new(2, None, "hips"),
            Node::new(0, Some(0), "spine"),
            Node::new(1, Some(1), "head"),
        ];
        let skeleton = SkeletonModel::build(&bones(3), &nodes).unwrap();
        assert_eq!(skeleton.parent_bone(1), Some(2));
        assert_eq!(skeleton.parent_bone(2), Some(0));
        assert_eq!(skeleton.node_for_bone(2), Some(0));
        assert_eq!(skeleton.find_node("head"), Some(2));
        assert_eq!(skeleton.find_node("tail"), None);
    }

    #[test_case(2 ; "self reference")]
    #[test_case(5 ; "forward reference")]
    #[test_case(-2 ; "negative other than none")]
    fn test_rejects_bad_parent(parent: i32) {
        let mut nodes = chain(4);
        nodes[2].parent_index = parent;

        let err = SkeletonModel::build(&bones(4), &nodes).unwrap_err();
        match err {
            MdMeshError::InvalidHierarchy { node, reason } => {
                assert_eq!(node, 2);
                assert_eq!(reason, HierarchyViolation::ParentNotEarlier { parent });
            }
            other => panic!("expected hierarchy error, got {other:?}"),
        }
    }

    #[test]
    fn test_accepts_earlier_parent() {
        let nodes = vec![Node::new(0, None, "root"), Node::new(1, Some(0), "child")];
        assert!(SkeletonModel::build(&bones(2), &nodes).is_ok());
    }

    #[test]
    fn test_rejects_bone_out_of_range() {
        let mut nodes = chain(2);
        nodes[1].bone_index = 2;
        let err = SkeletonModel::build(&bones(2), &nodes).unwrap_err();
        assert!(err.is_hierarchy_error());
        assert!(matches!(
            err,
            MdMeshError::InvalidHierarchy {
                node: 1,
                reason: HierarchyViolation::BoneOutOfRange {
                    bone: 2,
                    bone_count: 2
                }
            }
        ));
    }

    #[test]
    fn test_rejects_duplicate_bone() {
        let nodes = vec![Node::new(0, None, "a"), Node::new(0, Some(0), "b")];
        let err = SkeletonModel::build(&bones(1), &nodes).unwrap_err();
        assert!(matches!(
            err,
            MdMeshError::InvalidHierarchy {
                node: 1,
                reason: HierarchyViolation::DuplicateBone {
                    bone: 0,
                    first_node: 0
                }
            }
        ));
    }

    #[test]
    fn test_children_and_multiple_roots() {
        let nodes = vec![
            Node::new(0, None, "a"),
            Node::new(1, Some(0), "b"),
            Node::new(2, None, "c"),
            Node::new(3, Some(0), "d"),
        ];
        let skeleton = SkeletonModel::build(&bones(4), &nodes).unwrap();
        assert_eq!(skeleton.children_of(0).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(skeleton.roots().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_inverse_bind_matrices() {
        let offset = Mat4::from_translation(glam::Vec3::new(0.0, -2.0, 0.0));
        let bones = vec![Bone::new("root", offset, 0)];
        let skeleton = SkeletonModel::build(&bones, &chain(1)).unwrap();
        assert_eq!(skeleton.bind_offset(0), Some(&offset));
        assert_eq!(
            skeleton.inverse_bind(0),
            Some(&Mat4::from_translation(glam::Vec3::new(0.0, 2.0, 0.0)))
        );
    }

    #[test]
    fn test_children_of_unknown_node_is_empty() {
        let skeleton = SkeletonModel::build(&bones(2), &chain(2)).unwrap();
        assert_eq!(skeleton.children_of(usize::MAX).count(), 0);
        assert_eq!(skeleton.children_of(7).count(), 0);
    }
}
