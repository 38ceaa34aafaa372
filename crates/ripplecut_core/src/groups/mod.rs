//! Group Resolver.
//!
//! Clips on auxiliary tracks may share a `GroupId`; clips sharing a group
//! must move together, and because one clip can bridge two tracks the
//! relation is transitive. This module computes the connected components
//! once, up front, from a snapshot of the project.
//!
//! Traversal is an iterative BFS over a bipartite adjacency list
//! (clip nodes and group nodes) with a visited set, so malformed inputs
//! cannot cause unbounded work.

use std::collections::{HashMap, VecDeque};

use crate::models::{ClipId, GroupId, Project, Timecode, TrackId};

/// Snapshot of one clip taking part in group resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupMember {
    pub clip: ClipId,
    pub track: TrackId,
    /// Index of the track in the project.
    pub track_index: usize,
    /// Index of the clip within its track.
    pub clip_index: usize,
    /// Original start.
    pub start: Timecode,
}

impl GroupMember {
    fn anchor_key(&self) -> (Timecode, usize, usize) {
        (self.start, self.track_index, self.clip_index)
    }
}

/// One connected component.
#[derive(Debug, Clone)]
pub struct ClipGroup {
    members: Vec<GroupMember>,
    anchor: usize,
}

impl ClipGroup {
    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    /// Member with the earliest original start (ties: lower track index,
    /// then lower clip index).
    pub fn anchor(&self) -> &GroupMember {
        &self.members[self.anchor]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether the group has more than one member.
    pub fn is_shared(&self) -> bool {
        self.members.len() > 1
    }
}

/// All groups of the auxiliary clips in a project.
///
/// Ungrouped clips form singleton groups, so every resolved clip belongs
/// to exactly one `ClipGroup`.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    groups: Vec<ClipGroup>,
    by_clip: HashMap<ClipId, usize>,
}

impl GroupIndex {
    /// Resolve groups over every clip outside `primary` and the `excluded`
    /// track names.
    pub fn build(project: &Project, primary: TrackId, excluded: &[String]) -> Self {
        let mut members = Vec::new();
        let mut group_nodes: HashMap<GroupId, usize> = HashMap::new();
        let mut memberships: Vec<Option<GroupId>> = Vec::new();

        for (track_index, track) in project.tracks().iter().enumerate() {
            if track.id() == primary || excluded.iter().any(|name| track.is_named(name)) {
                continue;
            }
            for (clip_index, clip) in track.clips().iter().enumerate() {
                members.push(GroupMember {
                    clip: clip.id(),
                    track: track.id(),
                    track_index,
                    clip_index,
                    start: clip.start,
                });
                memberships.push(clip.group);
                if let Some(group) = clip.group {
                    let next = group_nodes.len();
                    group_nodes.entry(group).or_insert(next);
                }
            }
        }

        // Nodes 0..n are clips, n..n+g are group ids.
        let clip_count = members.len();
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); clip_count + group_nodes.len()];
        for (clip_node, membership) in memberships.iter().enumerate() {
            if let Some(group_node) = membership.and_then(|group| group_nodes.get(&group)) {
                let group_node = clip_count + group_node;
                adjacency[clip_node].push(group_node);
                adjacency[group_node].push(clip_node);
            }
        }

        let mut visited = vec![false; adjacency.len()];
        let mut groups = Vec::new();
        let mut by_clip = HashMap::with_capacity(clip_count);
        let mut queue = VecDeque::new();

        for seed in 0..clip_count {
            if visited[seed] {
                continue;
            }
            visited[seed] = true;
            queue.push_back(seed);

            let mut component = Vec::new();
            while let Some(node) = queue.pop_front() {
                if node < clip_count {
                    component.push(node);
                }
                for &next in &adjacency[node] {
                    if !visited[next] {
                        visited[next] = true;
                        queue.push_back(next);
                    }
                }
            }

            component.sort_unstable();
            let group_members: Vec<GroupMember> = component.iter().map(|&i| members[i]).collect();
            let anchor = group_members
                .iter()
                .enumerate()
                .min_by_key(|(_, member)| member.anchor_key())
                .map(|(index, _)| index)
                .unwrap_or(0);

            let group_index = groups.len();
            for member in &group_members {
                by_clip.insert(member.clip, group_index);
            }
            groups.push(ClipGroup {
                members: group_members,
                anchor,
            });
        }

        tracing::debug!(
            "Resolved {} clip(s) into {} group(s)",
            clip_count,
            groups.len()
        );

        Self { groups, by_clip }
    }

    /// Groups in order of their first member.
    pub fn groups(&self) -> &[ClipGroup] {
        &self.groups
    }

    /// Full group of a clip, or `None` for clips that were not resolved
    /// (primary track, excluded tracks, unknown ids).
    pub fn group_of(&self, clip: ClipId) -> Option<&ClipGroup> {
        self.by_clip.get(&clip).map(|&index| &self.groups[index])
    }

    pub fn anchor_of(&self, clip: ClipId) -> Option<&GroupMember> {
        self.group_of(clip).map(ClipGroup::anchor)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Clip, FrameRate, MediaKind};

    fn excluded() -> Vec<String> {
        vec!["music".to_string()]
    }

    #[test]
    fn groups_are_transitive_across_tracks() {
        let mut project = Project::new(FrameRate::new(25.0));
        let main = project.add_track(Some("main"), MediaKind::Video);
        let overlay = project.add_track(Some("overlay"), MediaKind::Video);
        let sfx = project.add_track(Some("sfx"), MediaKind::Audio);

        project.add_clip(main, Clip::from_ms(0, 1000).with_group(GroupId(1))).unwrap();
        let a = project.add_clip(overlay, Clip::from_ms(300, 100).with_group(GroupId(1))).unwrap();
        let b = project.add_clip(sfx, Clip::from_ms(200, 100).with_group(GroupId(1))).unwrap();
        let c = project.add_clip(sfx, Clip::from_ms(900, 100).with_group(GroupId(2))).unwrap();
        let d = project.add_clip(overlay, Clip::from_ms(800, 50).with_group(GroupId(2))).unwrap();

        let index = GroupIndex::build(&project, main, &excluded());
        assert_eq!(index.len(), 2);

        let first = index.group_of(a).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first.anchor().clip, b);

        let second = index.group_of(c).unwrap();
        assert!(second.members().iter().any(|m| m.clip == d));
        assert_eq!(index.anchor_of(c).unwrap().clip, d);
    }

    #[test]
    fn primary_and_excluded_tracks_are_ignored() {
        let mut project = Project::new(FrameRate::new(25.0));
        let main = project.add_track(Some("Main"), MediaKind::Video);
        let music = project.add_track(Some("MUSIC"), MediaKind::Audio);
        let primary_clip = project.add_clip(main, Clip::from_ms(0, 100)).unwrap();
        let song = project.add_clip(music, Clip::from_ms(0, 100)).unwrap();

        let index = GroupIndex::build(&project, main, &excluded());
        assert!(index.is_empty());
        assert!(index.group_of(primary_clip).is_none());
        assert!(index.group_of(song).is_none());
    }

    #[test]
    fn ungrouped_clips_are_singletons() {
        let mut project = Project::new(FrameRate::new(25.0));
        let main = project.add_track(Some("main"), MediaKind::Video);
        let text = project.add_track(None, MediaKind::Video);
        let a = project.add_clip(text, Clip::from_ms(0, 100)).unwrap();
        let b = project.add_clip(text, Clip::from_ms(100, 100)).unwrap();

        let index = GroupIndex::build(&project, main, &excluded());
        assert_eq!(index.len(), 2);
        assert!(!index.group_of(a).unwrap().is_shared());
        assert_eq!(index.anchor_of(b).unwrap().clip, b);
    }

    #[test]
    fn anchor_tie_prefers_lower_track() {
        let mut project = Project::new(FrameRate::new(25.0));
        let main = project.add_track(Some("main"), MediaKind::Video);
        let upper = project.add_track(Some("a"), MediaKind::Video);
        let lower = project.add_track(Some("b"), MediaKind::Audio);
        let late = project.add_clip(lower, Clip::from_ms(500, 10).with_group(GroupId(7))).unwrap();
        let early = project.add_clip(upper, Clip::from_ms(500, 10).with_group(GroupId(7))).unwrap();

        let index = GroupIndex::build(&project, main, &excluded());
        assert_eq!(index.anchor_of(late).unwrap().clip, early);
    }
}
